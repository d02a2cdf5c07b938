use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crossbeam_channel::Sender;
use serde::Serialize;

use crate::overlay::domain::graphic_overlay::GraphicOverlay;
use crate::overlay::domain::overlay_transform::{OverlayTransform, ViewRect};
use crate::overlay::domain::text_graphic::TextGraphic;
use crate::shared::frame::CameraFacing;

/// Immutable view of the overlay at one generation.
#[derive(Clone, Debug)]
pub struct OverlaySnapshot {
    pub generation: u64,
    pub graphics: Arc<[TextGraphic]>,
}

/// A graphic's text and where it lands in view coordinates.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PlacedText {
    pub text: String,
    pub rect: ViewRect,
}

struct State {
    graphics: Arc<[TextGraphic]>,
    generation: u64,
    transform: OverlayTransform,
}

/// Overlay whose graphic set is swapped as a whole.
///
/// Readers take an `Arc` snapshot and never observe a half-built set.
/// Each mutation bumps the generation and, if a repaint channel is
/// attached, sends the new generation on it.
pub struct SnapshotOverlay {
    view_width: u32,
    view_height: u32,
    state: RwLock<State>,
    repaint_tx: Option<Sender<u64>>,
}

impl SnapshotOverlay {
    pub fn new(view_width: u32, view_height: u32) -> Self {
        Self {
            view_width,
            view_height,
            state: RwLock::new(State {
                graphics: Arc::from(Vec::new()),
                generation: 0,
                transform: OverlayTransform::identity(view_width),
            }),
            repaint_tx: None,
        }
    }

    pub fn with_repaint_notifier(mut self, tx: Sender<u64>) -> Self {
        self.repaint_tx = Some(tx);
        self
    }

    pub fn snapshot(&self) -> OverlaySnapshot {
        let state = self.read();
        OverlaySnapshot {
            generation: state.generation,
            graphics: state.graphics.clone(),
        }
    }

    pub fn generation(&self) -> u64 {
        self.read().generation
    }

    pub fn len(&self) -> usize {
        self.read().graphics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Graphics with a bounding box, mapped into view coordinates.
    pub fn view_boxes(&self) -> Vec<PlacedText> {
        let state = self.read();
        state
            .graphics
            .iter()
            .filter_map(|g| {
                g.bounding_box.map(|b| PlacedText {
                    text: g.text.clone(),
                    rect: state.transform.map_box(&b),
                })
            })
            .collect()
    }

    fn read(&self) -> RwLockReadGuard<'_, State> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, State> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn publish(&self, update: impl FnOnce(&mut State)) {
        let generation = {
            let mut state = self.write();
            update(&mut state);
            state.generation += 1;
            state.generation
        };
        if let Some(tx) = &self.repaint_tx {
            // A receiver that went away just stops caring about repaints.
            let _ = tx.send(generation);
        }
    }
}

impl GraphicOverlay for SnapshotOverlay {
    fn clear(&self) {
        self.publish(|state| state.graphics = Arc::from(Vec::new()));
    }

    fn add(&self, graphic: TextGraphic) {
        self.publish(|state| {
            let mut graphics = state.graphics.to_vec();
            graphics.push(graphic);
            state.graphics = graphics.into();
        });
    }

    fn replace_all(&self, graphics: Vec<TextGraphic>) {
        self.publish(|state| state.graphics = graphics.into());
    }

    fn set_camera_info(&self, preview_width: u32, preview_height: u32, facing: CameraFacing) {
        let transform = OverlayTransform::new(
            self.view_width,
            self.view_height,
            preview_width,
            preview_height,
            facing,
        );
        self.publish(|state| state.transform = transform);
    }
}

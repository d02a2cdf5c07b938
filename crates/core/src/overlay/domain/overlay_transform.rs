use serde::{Deserialize, Serialize};

use crate::shared::bounding_box::BoundingBox;
use crate::shared::frame::CameraFacing;

/// Rectangle in view coordinates, normalized so `left <= right`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ViewRect {
    pub left: f32,
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
}

/// Maps image coordinates onto the view that displays the preview.
///
/// Frames from the front camera are shown mirrored, so x is flipped
/// around the view's vertical center line.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OverlayTransform {
    view_width: u32,
    width_scale: f32,
    height_scale: f32,
    facing: CameraFacing,
}

impl OverlayTransform {
    /// Scale 1, no mirroring.
    pub fn identity(view_width: u32) -> Self {
        Self {
            view_width,
            width_scale: 1.0,
            height_scale: 1.0,
            facing: CameraFacing::Back,
        }
    }

    /// `preview_*` is the upright size of the camera image. A zero preview
    /// dimension leaves that axis unscaled.
    pub fn new(
        view_width: u32,
        view_height: u32,
        preview_width: u32,
        preview_height: u32,
        facing: CameraFacing,
    ) -> Self {
        let scale = |view: u32, preview: u32| {
            if preview == 0 {
                1.0
            } else {
                view as f32 / preview as f32
            }
        };
        Self {
            view_width,
            width_scale: scale(view_width, preview_width),
            height_scale: scale(view_height, preview_height),
            facing,
        }
    }

    pub fn scale_x(&self, x: f32) -> f32 {
        x * self.width_scale
    }

    pub fn scale_y(&self, y: f32) -> f32 {
        y * self.height_scale
    }

    pub fn translate_x(&self, x: f32) -> f32 {
        match self.facing {
            CameraFacing::Front => self.view_width as f32 - self.scale_x(x),
            CameraFacing::Back => self.scale_x(x),
        }
    }

    pub fn translate_y(&self, y: f32) -> f32 {
        self.scale_y(y)
    }

    pub fn map_box(&self, bounding_box: &BoundingBox) -> ViewRect {
        let x1 = self.translate_x(bounding_box.x as f32);
        let x2 = self.translate_x(bounding_box.right() as f32);
        ViewRect {
            left: x1.min(x2),
            top: self.translate_y(bounding_box.y as f32),
            right: x1.max(x2),
            bottom: self.translate_y(bounding_box.bottom() as f32),
        }
    }
}

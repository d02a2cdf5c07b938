use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::overlay::domain::graphic_overlay::GraphicOverlay;
use crate::pipeline::text_recognition_processor::TextRecognitionProcessor;
use crate::shared::constants::DEFAULT_FPS;
use crate::shared::frame::{CameraFacing, Rotation};

#[derive(Error, Debug)]
pub enum CameraError {
    #[error("unable to open camera: {0}")]
    Io(#[from] std::io::Error),
    #[error("no frame processor attached")]
    NoProcessor,
    #[error("camera produced no frames")]
    NoFrames,
    #[error("camera source has been released")]
    Released,
}

/// Capture settings shared by camera implementations.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CameraConfig {
    pub fps: f64,
    pub rotation: Rotation,
    pub facing: CameraFacing,
    /// Restart from the first frame after the last one.
    pub looping: bool,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fps: DEFAULT_FPS,
            rotation: Rotation::Deg0,
            facing: CameraFacing::Back,
            looping: false,
        }
    }
}

/// Supplies frames to a [`TextRecognitionProcessor`] on its own capture
/// thread, calling `process` once per delivered frame.
pub trait CameraSource: Send {
    fn set_frame_processor(&mut self, processor: Arc<TextRecognitionProcessor>);

    /// Opens the camera and begins delivering frames. On error the caller
    /// should release the source and treat the camera as unavailable.
    fn start(&mut self, overlay: Arc<dyn GraphicOverlay>) -> Result<(), CameraError>;

    /// Stops delivering frames. The source can be started again.
    fn stop(&mut self);

    /// Stops the camera and the attached processor. Terminal.
    fn release(&mut self);

    /// Whether frames are still being delivered.
    fn is_running(&self) -> bool;
}

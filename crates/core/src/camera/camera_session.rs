use std::sync::Arc;

use crate::camera::domain::camera_source::CameraSource;
use crate::overlay::domain::graphic_overlay::GraphicOverlay;
use crate::pipeline::text_recognition_processor::TextRecognitionProcessor;

/// Owns a camera across the host's resume/pause/destroy lifecycle.
///
/// If the camera fails to start it is released and the session stays
/// without a camera; later `resume` calls do nothing.
pub struct CameraSession {
    source: Option<Box<dyn CameraSource>>,
    overlay: Arc<dyn GraphicOverlay>,
}

impl CameraSession {
    pub fn new(
        mut source: Box<dyn CameraSource>,
        processor: Arc<TextRecognitionProcessor>,
        overlay: Arc<dyn GraphicOverlay>,
    ) -> Self {
        source.set_frame_processor(processor);
        Self {
            source: Some(source),
            overlay,
        }
    }

    pub fn resume(&mut self) {
        let Some(source) = self.source.as_mut() else {
            log::debug!("resume: no camera source");
            return;
        };
        if let Err(e) = source.start(self.overlay.clone()) {
            log::error!("Unable to start camera source: {e}");
            source.release();
            self.source = None;
        }
    }

    pub fn pause(&mut self) {
        if let Some(source) = self.source.as_mut() {
            source.stop();
        }
    }

    pub fn destroy(&mut self) {
        if let Some(mut source) = self.source.take() {
            source.release();
        }
    }

    pub fn is_available(&self) -> bool {
        self.source.is_some()
    }

    pub fn is_running(&self) -> bool {
        self.source.as_ref().is_some_and(|s| s.is_running())
    }
}

use thiserror::Error;

use crate::recognition::domain::recognized_text::RecognizedText;
use crate::recognition::domain::vision_image::VisionImage;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DetectionError {
    #[error("text recognition model is unavailable: {0}")]
    ModelUnavailable(String),
    #[error("image could not be recognized: {0}")]
    MalformedImage(String),
    #[error("recognizer failed: {0}")]
    Recognizer(String),
    #[error("detector is closed")]
    Closed,
    #[error("recognizer worker panicked")]
    WorkerPanicked,
}

pub type DetectionResult = Result<RecognizedText, DetectionError>;

/// Callback that receives the outcome of one recognition request.
pub type Completion = Box<dyn FnOnce(DetectionResult) + Send + 'static>;

/// Domain interface for asynchronous text detection.
///
/// `submit` returns immediately. The completion is invoked exactly once,
/// on a thread chosen by the implementation, even when the detector has
/// already been closed (with [`DetectionError::Closed`]).
pub trait TextDetector: Send + Sync {
    fn submit(&self, image: VisionImage, on_complete: Completion);

    /// Releases the underlying recognizer. Must not be called from inside a
    /// completion.
    fn close(&self) -> Result<(), DetectionError>;
}

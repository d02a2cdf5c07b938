use crate::recognition::domain::recognized_text::RecognizedText;
use crate::recognition::domain::vision_image::VisionImage;

/// Synchronous recognition backend.
///
/// Implementations may be stateful (e.g. warm model sessions), hence
/// `&mut self`. Wrap one in a `ThreadedTextDetector` to get a
/// [`TextDetector`](super::text_detector::TextDetector).
pub trait TextRecognizer: Send {
    fn recognize(&mut self, image: &VisionImage)
        -> Result<RecognizedText, Box<dyn std::error::Error>>;
}

pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "bmp", "tiff", "tif", "webp"];

/// Preview frame rate used when nothing else is configured.
pub const DEFAULT_FPS: f64 = 15.0;

/// Pending jobs the recognizer worker accepts before `submit` blocks.
/// The throttle keeps at most one in flight, so this only absorbs misuse.
pub const DEFAULT_DETECTOR_QUEUE_CAPACITY: usize = 4;

pub const RECOGNIZER_THREAD_NAME: &str = "text-recognizer";
pub const CAPTURE_THREAD_NAME: &str = "camera-capture";

pub mod recognized_text;
pub mod text_detector;
pub mod text_recognizer;
pub mod vision_image;

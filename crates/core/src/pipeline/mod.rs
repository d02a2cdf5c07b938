pub mod frame_throttle;
pub mod processor_stats;
pub mod text_recognition_processor;

pub mod replay_text_recognizer;
pub mod threaded_text_detector;

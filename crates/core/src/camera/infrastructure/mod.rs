pub mod directory_camera_source;
pub mod nv21_encoder;

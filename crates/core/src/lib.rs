pub mod camera;
pub mod overlay;
pub mod pipeline;
pub mod recognition;
pub mod shared;

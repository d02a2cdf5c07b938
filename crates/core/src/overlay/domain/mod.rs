pub mod graphic_overlay;
pub mod overlay_transform;
pub mod text_graphic;

use crate::overlay::domain::text_graphic::TextGraphic;
use crate::shared::frame::CameraFacing;

/// Surface that draws recognized text on top of the camera preview.
///
/// Called from the detector's completion thread while a render thread may
/// be reading, so implementations must be `Send + Sync`.
pub trait GraphicOverlay: Send + Sync {
    fn clear(&self);

    fn add(&self, graphic: TextGraphic);

    /// Replaces the whole graphic set. The default clears and then adds each
    /// graphic; implementations that can swap atomically should override it.
    fn replace_all(&self, graphics: Vec<TextGraphic>) {
        self.clear();
        for graphic in graphics {
            self.add(graphic);
        }
    }

    /// Tells the overlay the upright size of the camera image and which
    /// camera produced it.
    fn set_camera_info(&self, _preview_width: u32, _preview_height: u32, _facing: CameraFacing) {}
}

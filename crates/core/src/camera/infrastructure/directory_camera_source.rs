use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender};

use crate::camera::domain::camera_source::{CameraConfig, CameraError, CameraSource};
use crate::camera::infrastructure::nv21_encoder::encode_rgb_image;
use crate::overlay::domain::graphic_overlay::GraphicOverlay;
use crate::pipeline::text_recognition_processor::{ProcessOutcome, TextRecognitionProcessor};
use crate::shared::constants::{CAPTURE_THREAD_NAME, IMAGE_EXTENSIONS};
use crate::shared::frame::{Frame, FrameMetadata};

struct Capture {
    stop_tx: Sender<()>,
    handle: JoinHandle<usize>,
}

/// Camera backed by a directory of still images, delivered in file-name
/// order as NV21 frames at the configured frame rate.
pub struct DirectoryCameraSource {
    dir: PathBuf,
    config: CameraConfig,
    processor: Option<Arc<TextRecognitionProcessor>>,
    capture: Option<Capture>,
    released: bool,
}

impl DirectoryCameraSource {
    pub fn new(dir: impl Into<PathBuf>, config: CameraConfig) -> Self {
        Self {
            dir: dir.into(),
            config,
            processor: None,
            capture: None,
            released: false,
        }
    }
}

impl CameraSource for DirectoryCameraSource {
    fn set_frame_processor(&mut self, processor: Arc<TextRecognitionProcessor>) {
        self.processor = Some(processor);
    }

    fn start(&mut self, overlay: Arc<dyn GraphicOverlay>) -> Result<(), CameraError> {
        if self.released {
            return Err(CameraError::Released);
        }
        let processor = self.processor.clone().ok_or(CameraError::NoProcessor)?;
        if self.capture.is_some() {
            log::debug!("Camera already started");
            return Ok(());
        }

        let paths = list_frames(&self.dir)?;
        let first = paths.first().ok_or(CameraError::NoFrames)?;
        let (width, height) = image::image_dimensions(first).map_err(io::Error::other)?;

        let preview = FrameMetadata::new(width, height, self.config.rotation, self.config.facing);
        let (preview_width, preview_height) = preview.upright_size();
        overlay.set_camera_info(preview_width, preview_height, self.config.facing);

        log::info!(
            "Starting {} camera: {} frames from {} at {:.1} fps",
            self.config.facing,
            paths.len(),
            self.dir.display(),
            self.config.fps
        );

        let (stop_tx, stop_rx) = crossbeam_channel::bounded::<()>(1);
        let config = self.config.clone();
        let handle = std::thread::Builder::new()
            .name(CAPTURE_THREAD_NAME.to_string())
            .spawn(move || capture_loop(&paths, &config, &processor, &overlay, &stop_rx))?;

        self.capture = Some(Capture { stop_tx, handle });
        Ok(())
    }

    fn stop(&mut self) {
        let Some(capture) = self.capture.take() else {
            return;
        };
        let _ = capture.stop_tx.send(());
        match capture.handle.join() {
            Ok(delivered) => log::debug!("Camera stopped after {delivered} frames"),
            Err(_) => log::error!("Capture thread panicked"),
        }
    }

    fn release(&mut self) {
        self.stop();
        if let Some(processor) = self.processor.take() {
            processor.stop();
        }
        self.released = true;
    }

    fn is_running(&self) -> bool {
        self.capture
            .as_ref()
            .is_some_and(|c| !c.handle.is_finished())
    }
}

impl Drop for DirectoryCameraSource {
    fn drop(&mut self) {
        self.stop();
    }
}

fn list_frames(dir: &Path) -> io::Result<Vec<PathBuf>> {
    let mut paths: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.is_file() && is_image(path))
        .collect();
    paths.sort();
    Ok(paths)
}

fn is_image(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| IMAGE_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}

fn load_frame(
    path: &Path,
    index: usize,
) -> Result<(Frame, u32, u32), Box<dyn std::error::Error>> {
    let rgb = image::open(path)?.to_rgb8();
    let (width, height) = rgb.dimensions();
    Ok((Frame::new(encode_rgb_image(&rgb)?, index), width, height))
}

fn frame_interval(fps: f64) -> Duration {
    if fps > 0.0 && fps.is_finite() {
        Duration::from_secs_f64(1.0 / fps)
    } else {
        Duration::ZERO
    }
}

/// Delivers frames until the list is exhausted (or forever when looping),
/// the stop signal arrives, or the processor reports it was stopped.
/// Returns the number of frames delivered.
fn capture_loop(
    paths: &[PathBuf],
    config: &CameraConfig,
    processor: &TextRecognitionProcessor,
    overlay: &Arc<dyn GraphicOverlay>,
    stop_rx: &Receiver<()>,
) -> usize {
    let interval = frame_interval(config.fps);
    let mut index = 0;

    loop {
        for path in paths {
            match load_frame(path, index) {
                Ok((frame, width, height)) => {
                    let metadata =
                        FrameMetadata::new(width, height, config.rotation, config.facing);
                    match processor.process(frame, &metadata, overlay.clone()) {
                        Ok(ProcessOutcome::Stopped) => return index,
                        Ok(_) => {}
                        Err(e) => log::warn!("Dropping frame {index}: {e}"),
                    }
                }
                Err(e) => log::warn!("Failed to decode {}: {e}", path.display()),
            }
            index += 1;

            match stop_rx.recv_timeout(interval) {
                Err(RecvTimeoutError::Timeout) => {}
                Ok(()) | Err(RecvTimeoutError::Disconnected) => return index,
            }
        }
        if !config.looping {
            return index;
        }
    }
}

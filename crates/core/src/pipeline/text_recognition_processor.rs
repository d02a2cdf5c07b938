use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::overlay::domain::graphic_overlay::GraphicOverlay;
use crate::overlay::domain::text_graphic::TextGraphic;
use crate::pipeline::frame_throttle::{FrameThrottle, ThrottlePermit};
use crate::pipeline::processor_stats::{ProcessorStats, StatsSnapshot};
use crate::recognition::domain::text_detector::{DetectionResult, TextDetector};
use crate::recognition::domain::vision_image::{ImageBuildError, VisionImage};
use crate::shared::frame::{Frame, FrameMetadata, ImageFormat};

/// What `process` did with a frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProcessOutcome {
    /// Handed to the detector; the overlay updates when it completes.
    Submitted,
    /// Dropped because a previous frame is still being recognized.
    Throttled,
    /// Dropped because the processor was stopped.
    Stopped,
}

/// Feeds camera frames to a text detector, one at a time, and paints each
/// successful result onto the overlay.
///
/// State per instance: idle → submitted (throttle held) → idle on
/// completion. `stop` is terminal.
pub struct TextRecognitionProcessor {
    detector: Arc<dyn TextDetector>,
    throttle: Arc<FrameThrottle>,
    stats: Arc<ProcessorStats>,
    stopped: AtomicBool,
}

impl TextRecognitionProcessor {
    pub fn new(detector: Arc<dyn TextDetector>) -> Self {
        Self {
            detector,
            throttle: Arc::new(FrameThrottle::new()),
            stats: Arc::new(ProcessorStats::new()),
            stopped: AtomicBool::new(false),
        }
    }

    /// Submits `frame` for recognition unless a request is already in flight.
    ///
    /// Only image construction errors are returned; detector failures are
    /// logged from the completion and leave the overlay untouched.
    pub fn process(
        &self,
        frame: Frame,
        metadata: &FrameMetadata,
        overlay: Arc<dyn GraphicOverlay>,
    ) -> Result<ProcessOutcome, ImageBuildError> {
        if self.is_stopped() {
            log::debug!("Ignoring frame {} after stop", frame.index());
            return Ok(ProcessOutcome::Stopped);
        }

        let Some(permit) = ThrottlePermit::try_acquire(&self.throttle) else {
            self.stats.record_throttled();
            return Ok(ProcessOutcome::Throttled);
        };

        // An error here drops the permit, so the next frame is accepted.
        let image = VisionImage::from_frame(frame, metadata, ImageFormat::Nv21).map_err(|e| {
            self.stats.record_rejected();
            e
        })?;

        let frame_index = image.frame_index();
        let stats = self.stats.clone();
        self.stats.record_submitted();
        self.detector.submit(
            image,
            Box::new(move |result| {
                drop(permit);
                on_detection(frame_index, result, overlay.as_ref(), &stats);
            }),
        );

        Ok(ProcessOutcome::Submitted)
    }

    /// Closes the detector. Safe to call more than once; only the first call
    /// does anything. Never fails: close errors are logged.
    pub fn stop(&self) {
        if self.stopped.swap(true, Ordering::AcqRel) {
            return;
        }
        if let Err(e) = self.detector.close() {
            log::error!("Exception thrown while trying to close text detector: {e}");
        }
        if let Some(summary) = self.stats.summary_string() {
            log::info!("\n\n{summary}");
        }
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::Acquire)
    }

    /// Whether a recognition request is outstanding.
    pub fn is_busy(&self) -> bool {
        self.throttle.is_held()
    }

    pub fn stats(&self) -> StatsSnapshot {
        self.stats.snapshot()
    }
}

fn on_detection(
    frame_index: usize,
    result: DetectionResult,
    overlay: &dyn GraphicOverlay,
    stats: &ProcessorStats,
) {
    match result {
        Ok(text) => {
            stats.record_succeeded();
            let graphics = TextGraphic::from_recognized(&text);
            log::debug!(
                "Frame {frame_index}: {} blocks, {} graphics",
                text.blocks.len(),
                graphics.len()
            );
            overlay.replace_all(graphics);
        }
        Err(e) => {
            stats.record_failed();
            log::warn!("Text detection failed for frame {frame_index}: {e}");
        }
    }
}

use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::recognition::domain::recognized_text::RecognizedText;
use crate::recognition::domain::text_detector::DetectionError;
use crate::recognition::domain::text_recognizer::TextRecognizer;
use crate::recognition::domain::vision_image::VisionImage;

/// Recorded outcome for one frame.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReplayEntry {
    Text(RecognizedText),
    Failure(String),
}

/// Replays recorded recognition outcomes by frame index.
///
/// Fixtures are JSON objects keyed by frame index:
///
/// ```json
/// { "0": { "text": { "blocks": [] } }, "3": { "failure": "lens covered" } }
/// ```
///
/// Frames without an entry recognize as empty text.
pub struct ReplayTextRecognizer {
    entries: Arc<HashMap<usize, ReplayEntry>>,
    latency: Duration,
}

impl ReplayTextRecognizer {
    pub fn new(entries: Arc<HashMap<usize, ReplayEntry>>) -> Self {
        Self {
            entries,
            latency: Duration::ZERO,
        }
    }

    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        let entries: HashMap<usize, ReplayEntry> = serde_json::from_str(json)?;
        Ok(Self::new(Arc::new(entries)))
    }

    pub fn from_json_file(path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        let json = fs::read_to_string(path)?;
        Ok(Self::from_json_str(&json)?)
    }

    /// Sleeps this long inside every `recognize` call.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl TextRecognizer for ReplayTextRecognizer {
    fn recognize(
        &mut self,
        image: &VisionImage,
    ) -> Result<RecognizedText, Box<dyn std::error::Error>> {
        if !self.latency.is_zero() {
            std::thread::sleep(self.latency);
        }
        match self.entries.get(&image.frame_index()) {
            Some(ReplayEntry::Text(text)) => Ok(text.clone()),
            Some(ReplayEntry::Failure(message)) => {
                Err(Box::new(DetectionError::Recognizer(message.clone())))
            }
            None => Ok(RecognizedText::empty()),
        }
    }
}

use serde::{Deserialize, Serialize};

use crate::shared::bounding_box::BoundingBox;

/// Smallest recognized unit, roughly a word.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TextElement {
    pub text: String,
    #[serde(default)]
    pub bounding_box: Option<BoundingBox>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TextLine {
    pub text: String,
    #[serde(default)]
    pub bounding_box: Option<BoundingBox>,
    #[serde(default)]
    pub elements: Vec<TextElement>,
}

/// A paragraph-like group of lines.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TextBlock {
    pub text: String,
    #[serde(default)]
    pub bounding_box: Option<BoundingBox>,
    #[serde(default)]
    pub lines: Vec<TextLine>,
}

/// Everything the detector found in one image, in document order.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RecognizedText {
    #[serde(default)]
    pub blocks: Vec<TextBlock>,
}

impl RecognizedText {
    pub fn new(blocks: Vec<TextBlock>) -> Self {
        Self { blocks }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn element_count(&self) -> usize {
        self.elements().count()
    }

    /// Walks every element block by block, line by line.
    pub fn elements(&self) -> impl Iterator<Item = &TextElement> {
        self.blocks
            .iter()
            .flat_map(|block| block.lines.iter())
            .flat_map(|line| line.elements.iter())
    }
}

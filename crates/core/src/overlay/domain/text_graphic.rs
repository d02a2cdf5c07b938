use serde::{Deserialize, Serialize};

use crate::recognition::domain::recognized_text::{RecognizedText, TextElement};
use crate::shared::bounding_box::BoundingBox;

/// Drawable for one recognized element.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TextGraphic {
    pub text: String,
    pub bounding_box: Option<BoundingBox>,
    pub block: usize,
    pub line: usize,
    pub element: usize,
}

impl TextGraphic {
    pub fn new(element: &TextElement, block: usize, line: usize, index: usize) -> Self {
        Self {
            text: element.text.clone(),
            bounding_box: element.bounding_box,
            block,
            line,
            element: index,
        }
    }

    /// One graphic per element, block by block, line by line.
    pub fn from_recognized(text: &RecognizedText) -> Vec<TextGraphic> {
        let mut graphics = Vec::with_capacity(text.element_count());
        for (b, block) in text.blocks.iter().enumerate() {
            for (l, line) in block.lines.iter().enumerate() {
                for (e, element) in line.elements.iter().enumerate() {
                    graphics.push(TextGraphic::new(element, b, l, e));
                }
            }
        }
        graphics
    }
}

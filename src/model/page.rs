//! Page-level types.

use serde::{Deserialize, Serialize};

use super::{BoundingBox, Column, Table, TextBlock};
use crate::error::Result;

/// A single page with its reconstructed layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructuredPage {
    /// Page number (1-indexed)
    pub page_number: u32,

    /// Page width in points (1 point = 1/72 inch)
    pub width: f32,

    /// Page height in points
    pub height: f32,

    /// Text blocks in reading order
    pub blocks: Vec<TextBlock>,

    /// Detected tables
    pub tables: Vec<Table>,

    /// Column regions, left to right
    pub columns: Vec<Column>,

    /// Running header text
    pub header: String,

    /// Running footer text
    pub footer: String,
}

impl StructuredPage {
    /// Create an empty page with the given dimensions.
    pub fn new(page_number: u32, width: f32, height: f32) -> Self {
        Self {
            page_number,
            width,
            height,
            blocks: Vec::new(),
            tables: Vec::new(),
            columns: Vec::new(),
            header: String::new(),
            footer: String::new(),
        }
    }

    /// Build the degraded page used when layout analysis fails: one
    /// paragraph covering the whole page, or nothing if `text` is blank.
    pub fn fallback(page_number: u32, width: f32, height: f32, text: &str) -> Result<Self> {
        let mut page = Self::new(page_number, width, height);
        if !text.trim().is_empty() {
            let bbox = BoundingBox::new(0.0, 0.0, width, height)?;
            page.blocks.push(TextBlock::new(text, bbox));
        }
        Ok(page)
    }

    /// Number of text blocks on the page.
    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    /// Number of tables on the page.
    pub fn table_count(&self) -> usize {
        self.tables.len()
    }

    /// Page content in reading order.
    ///
    /// Block texts and table renderings are interleaved by descending top
    /// edge and separated by blank lines; blank items are skipped.
    pub fn text(&self) -> String {
        let mut items: Vec<(f32, &str)> = self
            .blocks
            .iter()
            .map(|b| (b.bbox.y1(), b.text.as_str()))
            .chain(
                self.tables
                    .iter()
                    .map(|t| (t.bbox.y1(), t.ascii_representation.as_str())),
            )
            .collect();

        items.sort_by(|a, b| b.0.total_cmp(&a.0));

        items
            .into_iter()
            .filter(|(_, text)| !text.trim().is_empty())
            .map(|(_, text)| text)
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

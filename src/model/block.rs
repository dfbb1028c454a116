//! Reconstructed text blocks and column regions.

use serde::{Deserialize, Serialize};

use super::{BoundingBox, Span};

/// Logical role of a text block.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BlockType {
    /// Body text
    #[default]
    Paragraph,
    /// Section heading or title
    Heading,
    /// Bulleted or numbered item
    ListItem,
    Footnote,
    /// Running header
    Header,
    /// Running footer
    Footer,
    /// Figure or table caption
    Caption,
    /// No evidence either way (e.g. no spans)
    Unknown,
}

impl BlockType {
    /// Upper snake case name, as used in JSON output.
    pub fn as_str(&self) -> &'static str {
        match self {
            BlockType::Paragraph => "PARAGRAPH",
            BlockType::Heading => "HEADING",
            BlockType::ListItem => "LIST_ITEM",
            BlockType::Footnote => "FOOTNOTE",
            BlockType::Header => "HEADER",
            BlockType::Footer => "FOOTER",
            BlockType::Caption => "CAPTION",
            BlockType::Unknown => "UNKNOWN",
        }
    }
}

/// Horizontal text alignment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Alignment {
    /// Left alignment
    #[default]
    Left,
    /// Center alignment
    Center,
    /// Right alignment
    Right,
    /// Justified alignment
    Justify,
    Unknown,
}

/// A final, reconstructed unit of text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextBlock {
    /// Assembled text
    pub text: String,

    /// Bounding box covering every source fragment
    pub bbox: BoundingBox,

    /// Classified role
    pub block_type: BlockType,

    /// Source spans (empty only for whole-page fallback blocks)
    pub spans: Vec<Span>,

    /// Detected alignment
    pub alignment: Alignment,

    /// First-line offset from the block's left edge, in points
    pub indentation: f32,

    /// Mean positive gap between consecutive sub-blocks, in points
    pub line_spacing: f32,

    /// Column this block was reconstructed in
    pub column_index: usize,
}

impl TextBlock {
    /// Create a paragraph block with no spans and default geometry metrics.
    pub fn new(text: impl Into<String>, bbox: BoundingBox) -> Self {
        Self {
            text: text.into(),
            bbox,
            block_type: BlockType::Paragraph,
            spans: Vec::new(),
            alignment: Alignment::Left,
            indentation: 0.0,
            line_spacing: 0.0,
            column_index: 0,
        }
    }

    /// Set block type and return self.
    pub fn with_type(mut self, block_type: BlockType) -> Self {
        self.block_type = block_type;
        self
    }

    /// Set column index and return self.
    pub fn in_column(mut self, column_index: usize) -> Self {
        self.column_index = column_index;
        self
    }

    /// Check if this block is a heading.
    pub fn is_heading(&self) -> bool {
        self.block_type == BlockType::Heading
    }

    /// Number of whitespace-separated words.
    pub fn word_count(&self) -> usize {
        self.text.split_whitespace().count()
    }

    /// Mean font size over the block's spans, if it has any.
    pub fn mean_font_size(&self) -> Option<f32> {
        if self.spans.is_empty() {
            return None;
        }
        let total: f32 = self.spans.iter().map(|s| s.font.size).sum();
        Some(total / self.spans.len() as f32)
    }
}

/// A left-to-right band of the page holding one reading flow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    /// Region covered by the column
    pub bbox: BoundingBox,

    /// Position from the left, starting at 0
    pub index: usize,

    /// Blocks reconstructed inside this column, top to bottom
    pub blocks: Vec<TextBlock>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_block_helpers() {
        let bbox = BoundingBox::new(0.0, 0.0, 100.0, 20.0).unwrap();
        let block = TextBlock::new("Three little words", bbox).with_type(BlockType::Heading);

        assert!(block.is_heading());
        assert_eq!(block.word_count(), 3);
        assert_eq!(block.mean_font_size(), None);
    }

    #[test]
    fn test_block_type_serializes_upper_snake() {
        let json = serde_json::to_string(&BlockType::ListItem).unwrap();
        assert_eq!(json, "\"LIST_ITEM\"");
        assert_eq!(json.trim_matches('"'), BlockType::ListItem.as_str());
        assert_eq!(BlockType::Paragraph.as_str(), "PARAGRAPH");
    }
}

//! Positioned text fragments: spans, lines and raw blocks.
//!
//! These are the inputs of layout analysis. Spans are produced once by the
//! extraction boundary and never mutated; lines and raw blocks are rebuilt
//! by the merge passes.

use serde::{Deserialize, Serialize};

use super::BoundingBox;
use crate::error::{Error, Result};

/// Gap (as a fraction of the preceding span's font size) above which a
/// space is inserted between two spans of a line.
pub const SPAN_SPACE_RATIO: f32 = 0.3;

/// An sRGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    /// Unpack a `0xRRGGBB` integer.
    pub fn from_packed(value: u32) -> Self {
        Rgb(
            ((value >> 16) & 0xFF) as u8,
            ((value >> 8) & 0xFF) as u8,
            (value & 0xFF) as u8,
        )
    }
}

/// Font attributes attached to a span.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FontInfo {
    /// Font name (e.g., "Helvetica-Bold")
    pub name: String,
    /// Font size in points, always positive
    pub size: f32,
    /// Whether the font is bold
    pub bold: bool,
    /// Whether the font is italic
    pub italic: bool,
    /// Fill color
    pub color: Rgb,
}

impl FontInfo {
    /// Create font info with regular style and black color.
    pub fn new(name: impl Into<String>, size: f32) -> Result<Self> {
        if !(size.is_finite() && size > 0.0) {
            return Err(Error::MalformedFragment(format!(
                "font size must be positive, got {}",
                size
            )));
        }
        Ok(Self {
            name: name.into(),
            size,
            bold: false,
            italic: false,
            color: Rgb::default(),
        })
    }

    /// Set bold and return self.
    pub fn with_bold(mut self, bold: bool) -> Self {
        self.bold = bold;
        self
    }

    /// Set italic and return self.
    pub fn with_italic(mut self, italic: bool) -> Self {
        self.italic = italic;
        self
    }

    /// Set color and return self.
    pub fn with_color(mut self, color: Rgb) -> Self {
        self.color = color;
        self
    }
}

/// A run of text sharing one font on one line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Span {
    /// The text content, never empty
    pub text: String,
    /// Position on the page
    pub bbox: BoundingBox,
    /// Font attributes
    pub font: FontInfo,
}

impl Span {
    /// Create a span; empty text is rejected.
    pub fn new(text: impl Into<String>, bbox: BoundingBox, font: FontInfo) -> Result<Self> {
        let text = text.into();
        if text.is_empty() {
            return Err(Error::MalformedFragment("span has no text".into()));
        }
        Ok(Self { text, bbox, font })
    }
}

/// One visual text line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Line {
    /// Position on the page
    pub bbox: BoundingBox,
    /// Reconstructed text (see [`Line::from_spans`])
    pub text: String,
    /// Spans in left-to-right order
    pub spans: Vec<Span>,
}

impl Line {
    /// Build a line from spans, inserting a space wherever the horizontal
    /// gap after a span exceeds [`SPAN_SPACE_RATIO`] times its font size.
    pub fn from_spans(bbox: BoundingBox, spans: Vec<Span>) -> Self {
        let mut text = String::new();
        let mut previous: Option<&Span> = None;

        for span in &spans {
            if let Some(prev) = previous {
                let gap = span.bbox.x0() - prev.bbox.x1();
                if gap > prev.font.size * SPAN_SPACE_RATIO {
                    text.push(' ');
                }
            }
            text.push_str(&span.text);
            previous = Some(span);
        }

        Self {
            bbox,
            text: text.trim().to_string(),
            spans,
        }
    }

    /// Check if the line holds no visible text.
    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}

/// A group of lines before layout analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawBlock {
    /// Position on the page
    pub bbox: BoundingBox,
    /// Lines in reading order
    pub lines: Vec<Line>,
}

impl RawBlock {
    /// Create a block from its lines.
    pub fn new(bbox: BoundingBox, lines: Vec<Line>) -> Self {
        Self { bbox, lines }
    }

    /// All spans of the block, line by line.
    pub fn spans(&self) -> impl Iterator<Item = &Span> + '_ {
        self.lines.iter().flat_map(|l| l.spans.iter())
    }

    /// Number of spans in the block.
    pub fn span_count(&self) -> usize {
        self.lines.iter().map(|l| l.spans.len()).sum()
    }

    /// Non-blank line texts joined by newlines.
    pub fn text(&self) -> String {
        self.lines
            .iter()
            .filter(|l| !l.is_blank())
            .map(|l| l.text.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Check if every line is blank (or there are no lines).
    pub fn is_empty(&self) -> bool {
        self.lines.iter().all(Line::is_blank)
    }

    /// Mean size of the block's positive font sizes.
    pub fn mean_font_size(&self) -> Option<f32> {
        let sizes: Vec<f32> = self
            .spans()
            .map(|s| s.font.size)
            .filter(|size| *size > 0.0)
            .collect();
        if sizes.is_empty() {
            None
        } else {
            Some(sizes.iter().sum::<f32>() / sizes.len() as f32)
        }
    }
}

/// True when the text has cased characters and none of them are lowercase.
pub(crate) fn is_all_caps(text: &str) -> bool {
    text.chars().any(char::is_uppercase) && !text.chars().any(char::is_lowercase)
}

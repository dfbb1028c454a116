//! The extraction boundary.
//!
//! An external extractor (a PDF decoder) delivers every page as
//! [`PageFragments`]: blocks of lines of spans, each carrying a loosely
//! typed bounding box. [`ingest`] validates these into the
//! [`RawBlock`](crate::model::RawBlock) model, skipping any unit whose
//! geometry is missing or unusable instead of failing the page.

mod dump;
mod ingest;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::Result;

pub use dump::FragmentDump;
pub use ingest::{ingest, parse_bbox};

/// Default font size for spans that do not report one.
pub const DEFAULT_FONT_SIZE: f32 = 12.0;

/// Flag bit marking a bold span.
pub const FLAG_BOLD: u32 = 16;

/// Flag bit marking an italic span.
pub const FLAG_ITALIC: u32 = 2;

/// A source of positioned text, one page at a time.
///
/// Implementations must be shareable across the worker threads that
/// analyze pages in parallel.
pub trait PageSource: Send + Sync {
    /// Path (or other identifier) of the source document.
    fn source_path(&self) -> &str;

    /// Number of pages in the document.
    fn page_count(&self) -> u32;

    /// Document metadata (title, author, ...).
    fn metadata(&self) -> BTreeMap<String, String> {
        BTreeMap::new()
    }

    /// Page dimensions in points as `(width, height)`.
    fn page_size(&self, page_number: u32) -> Result<(f32, f32)>;

    /// Positioned fragments of a page.
    fn extract_page(&self, page_number: u32) -> Result<PageFragments>;

    /// Unstructured text of a page, used for fallback pages.
    fn plain_text(&self, page_number: u32) -> Result<String>;
}

/// Fragments of one page as delivered by the extractor.
///
/// Coordinates use the page's bottom-left origin.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PageFragments {
    /// Page number (1-indexed)
    pub page_number: u32,

    /// Page width in points
    pub width: f32,

    /// Page height in points
    pub height: f32,

    /// Raw blocks in extraction order
    #[serde(default)]
    pub blocks: Vec<BlockFragment>,

    /// Plain page text, if the extractor provides one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

impl PageFragments {
    /// Create an empty page.
    pub fn new(page_number: u32, width: f32, height: f32) -> Self {
        Self {
            page_number,
            width,
            height,
            blocks: Vec::new(),
            text: None,
        }
    }

    /// Add a block and return self.
    pub fn with_block(mut self, block: BlockFragment) -> Self {
        self.blocks.push(block);
        self
    }
}

/// A raw block: an extractor-delimited group of lines.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BlockFragment {
    /// `[x0, y0, x1, y1]` or `{"x0":..,"y0":..,"x1":..,"y1":..}`
    #[serde(default)]
    pub bbox: Value,

    #[serde(default)]
    pub lines: Vec<LineFragment>,
}

impl BlockFragment {
    /// Create a block with the given bounds.
    pub fn new(bbox: [f32; 4]) -> Self {
        Self {
            bbox: bbox_value(bbox),
            lines: Vec::new(),
        }
    }

    /// Add a line and return self.
    pub fn with_line(mut self, line: LineFragment) -> Self {
        self.lines.push(line);
        self
    }
}

/// One visual line of spans.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LineFragment {
    #[serde(default)]
    pub bbox: Value,

    #[serde(default)]
    pub spans: Vec<SpanFragment>,
}

impl LineFragment {
    /// Create a line with the given bounds.
    pub fn new(bbox: [f32; 4]) -> Self {
        Self {
            bbox: bbox_value(bbox),
            spans: Vec::new(),
        }
    }

    /// Add a span and return self.
    pub fn with_span(mut self, span: SpanFragment) -> Self {
        self.spans.push(span);
        self
    }
}

/// A text run as reported by the extractor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpanFragment {
    #[serde(default)]
    pub text: String,

    #[serde(default)]
    pub bbox: Value,

    /// Font name
    #[serde(default = "default_font_name")]
    pub font: String,

    /// Font size in points; [`DEFAULT_FONT_SIZE`] when absent
    #[serde(default)]
    pub size: Option<f32>,

    /// Style flags ([`FLAG_BOLD`], [`FLAG_ITALIC`])
    #[serde(default)]
    pub flags: u32,

    /// Packed `0xRRGGBB` color
    #[serde(default)]
    pub color: u32,
}

fn default_font_name() -> String {
    "unknown".to_string()
}

impl SpanFragment {
    /// Create a span with the default font.
    pub fn new(text: impl Into<String>, bbox: [f32; 4], size: f32) -> Self {
        Self {
            text: text.into(),
            bbox: bbox_value(bbox),
            font: default_font_name(),
            size: Some(size),
            flags: 0,
            color: 0,
        }
    }

    /// Set the font name and return self.
    pub fn with_font(mut self, font: impl Into<String>) -> Self {
        self.font = font.into();
        self
    }

    /// Set the bold flag and return self.
    pub fn bold(mut self) -> Self {
        self.flags |= FLAG_BOLD;
        self
    }

    /// Set the italic flag and return self.
    pub fn italic(mut self) -> Self {
        self.flags |= FLAG_ITALIC;
        self
    }
}

/// Encode a box as the `[x0, y0, x1, y1]` JSON array form.
pub fn bbox_value(bbox: [f32; 4]) -> Value {
    Value::Array(bbox.iter().map(|v| Value::from(f64::from(*v))).collect())
}

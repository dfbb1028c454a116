//! Document-level types.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::{StructuredPage, Table, TextBlock};

/// Width of the page banner used by [`StructuredDocument::text`].
pub const BANNER_WIDTH: usize = 80;

/// A document with reconstructed layout for every analyzed page.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StructuredDocument {
    /// Pages in document order
    pub pages: Vec<StructuredPage>,

    /// Document metadata (title, author, ...)
    pub metadata: BTreeMap<String, String>,

    /// Path of the source document
    pub source_path: String,
}

/// Page banner: a rule, the centered `PAGE n` label and another rule.
pub(crate) fn page_banner(page_number: u32) -> [String; 3] {
    let rule = "=".repeat(BANNER_WIDTH);
    let label = format!("PAGE {}", page_number);
    [
        rule.clone(),
        format!("{:^width$}", label, width = BANNER_WIDTH),
        rule,
    ]
}

impl StructuredDocument {
    /// Create a new empty document.
    pub fn new(source_path: impl Into<String>) -> Self {
        Self {
            source_path: source_path.into(),
            ..Self::default()
        }
    }

    /// Total number of pages.
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Get a page by 1-indexed number.
    pub fn get_page(&self, page_number: u32) -> Option<&StructuredPage> {
        if page_number == 0 {
            return None;
        }
        self.pages.get(page_number as usize - 1)
    }

    /// Iterate over all pages.
    pub fn iter_pages(&self) -> impl Iterator<Item = &StructuredPage> {
        self.pages.iter()
    }

    /// Iterate over all text blocks as `(page_number, block)` pairs.
    pub fn iter_blocks(&self) -> impl Iterator<Item = (u32, &TextBlock)> {
        self.pages
            .iter()
            .flat_map(|p| p.blocks.iter().map(move |b| (p.page_number, b)))
    }

    /// Iterate over all tables as `(page_number, table)` pairs.
    pub fn iter_tables(&self) -> impl Iterator<Item = (u32, &Table)> {
        self.pages
            .iter()
            .flat_map(|p| p.tables.iter().map(move |t| (p.page_number, t)))
    }

    /// All text with an 80-column `PAGE n` banner before each page.
    pub fn text(&self) -> String {
        let mut parts = Vec::with_capacity(self.pages.len() * 4);
        for page in &self.pages {
            let [top, label, bottom] = page_banner(page.page_number);
            parts.push(format!("\n{}", top));
            parts.push(label);
            parts.push(format!("{}\n", bottom));
            parts.push(page.text());
        }
        parts.join("\n")
    }
}

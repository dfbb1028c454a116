//! # pdflayout
//!
//! Layout reconstruction for extracted PDF text.
//!
//! Given the positioned text fragments an extractor produces for each page,
//! this library recovers the page's logical structure: columns, paragraphs,
//! headings and list items, reading order, running headers and footers, and
//! tables rendered as fixed-width ASCII grids.
//!
//! ## Quick Start
//!
//! ```no_run
//! use pdflayout::{analyze_file, render};
//!
//! fn main() -> pdflayout::Result<()> {
//!     // Analyze a fragment dump written by an extractor
//!     let doc = analyze_file("document.fragments.json")?;
//!
//!     // Convert to Markdown
//!     let options = render::RenderOptions::default();
//!     let markdown = render::to_markdown(&doc, &options)?;
//!     println!("{}", markdown);
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **Column detection**: two-column heuristic with spanning titles, gap
//!   projection for three or more columns
//! - **Paragraph reconstruction**: line merging, hyphen repair, heading and
//!   list item classification
//! - **Tables**: grids from a pluggable table finder, rendered as ASCII or
//!   Markdown
//! - **Graceful degradation**: failed pages fall back to their plain text
//! - **Parallel processing**: uses Rayon for multi-page documents

pub mod error;
pub mod fragments;
pub mod layout;
pub mod model;
pub mod render;
pub mod session;
pub mod table;

// Re-export commonly used types
pub use error::{Error, Result};
pub use fragments::{FragmentDump, PageFragments, PageSource};
pub use layout::{LayoutAnalyzer, LayoutConfig};
pub use model::{
    Alignment, BlockType, BoundingBox, Cell, Column, FontInfo, Line, RawBlock, Span,
    StructuredDocument, StructuredPage, Table, TextBlock,
};
pub use render::{JsonFormat, OutputFormat, PageSelection, RenderOptions};
pub use session::{AnalyzeOptions, LayoutSession};
pub use table::{AsciiTableRenderer, AsciiTableStyle, TableFinder, TableFinderProvider};

use std::path::Path;
use std::sync::Arc;

/// Analyze a fragment dump file with the default configuration.
///
/// Tables recorded in the dump are used as the table finder.
///
/// # Example
///
/// ```no_run
/// use pdflayout::analyze_file;
///
/// let doc = analyze_file("report.fragments.json").unwrap();
/// println!("Pages: {}", doc.page_count());
/// ```
pub fn analyze_file<P: AsRef<Path>>(path: P) -> Result<StructuredDocument> {
    analyze_file_with_config(path, LayoutConfig::default())
}

/// Analyze a fragment dump file with a custom configuration.
///
/// # Example
///
/// ```no_run
/// use pdflayout::{analyze_file_with_config, LayoutConfig};
///
/// let config = LayoutConfig::new().with_margins(54.0, 54.0).without_tables();
/// let doc = analyze_file_with_config("report.fragments.json", config).unwrap();
/// ```
pub fn analyze_file_with_config<P: AsRef<Path>>(
    path: P,
    config: LayoutConfig,
) -> Result<StructuredDocument> {
    let dump = FragmentDump::from_path(path)?;
    analyze_dump(dump, config)
}

/// Analyze an in-memory fragment dump.
pub fn analyze_dump(dump: FragmentDump, config: LayoutConfig) -> Result<StructuredDocument> {
    Ok(PdfLayout::new()
        .with_config(config)
        .analyze_dump(dump)?
        .into_document())
}

/// Convert a fragment dump file to plain text.
///
/// # Example
///
/// ```no_run
/// use pdflayout::to_text;
///
/// let text = to_text("report.fragments.json").unwrap();
/// println!("{}", text);
/// ```
pub fn to_text<P: AsRef<Path>>(path: P) -> Result<String> {
    let doc = analyze_file(path)?;
    render::to_text(&doc, &RenderOptions::default())
}

/// Convert a fragment dump file to Markdown.
pub fn to_markdown<P: AsRef<Path>>(path: P) -> Result<String> {
    let doc = analyze_file(path)?;
    render::to_markdown(&doc, &RenderOptions::default())
}

/// Convert a fragment dump file to JSON.
///
/// # Example
///
/// ```no_run
/// use pdflayout::{to_json, JsonFormat};
///
/// let json = to_json("report.fragments.json", JsonFormat::Compact).unwrap();
/// std::fs::write("report.json", json).unwrap();
/// ```
pub fn to_json<P: AsRef<Path>>(path: P, format: JsonFormat) -> Result<String> {
    let doc = analyze_file(path)?;
    render::to_json(&doc, &RenderOptions::new().with_json_format(format))
}

/// Builder for analyzing and rendering documents.
///
/// # Example
///
/// ```no_run
/// use pdflayout::{PageSelection, PdfLayout};
///
/// let markdown = PdfLayout::new()
///     .sequential()
///     .with_pages(PageSelection::Range(1..=3))
///     .analyze_file("report.fragments.json")?
///     .to_markdown()?;
/// # Ok::<(), pdflayout::Error>(())
/// ```
pub struct PdfLayout {
    config: LayoutConfig,
    analyze_options: AnalyzeOptions,
    render_options: RenderOptions,
}

impl PdfLayout {
    /// Create a new builder with default settings.
    pub fn new() -> Self {
        Self {
            config: LayoutConfig::default(),
            analyze_options: AnalyzeOptions::default(),
            render_options: RenderOptions::default(),
        }
    }

    /// Set the layout configuration.
    pub fn with_config(mut self, config: LayoutConfig) -> Self {
        self.config = config;
        self
    }

    /// Disable table detection.
    pub fn without_tables(mut self) -> Self {
        self.config = self.config.without_tables();
        self
    }

    /// Disable parallel processing.
    pub fn sequential(mut self) -> Self {
        self.analyze_options = self.analyze_options.sequential();
        self
    }

    /// Include coordinates in JSON output.
    pub fn with_coordinates(mut self) -> Self {
        self.render_options = self.render_options.with_coordinates(true);
        self
    }

    /// Set the JSON layout.
    pub fn with_json_format(mut self, format: JsonFormat) -> Self {
        self.render_options = self.render_options.with_json_format(format);
        self
    }

    /// Set page selection for both analysis and rendering.
    pub fn with_pages(mut self, pages: PageSelection) -> Self {
        self.analyze_options = self.analyze_options.with_pages(pages.clone());
        self.render_options = self.render_options.with_pages(pages);
        self
    }

    /// Analyze a fragment dump file.
    pub fn analyze_file<P: AsRef<Path>>(self, path: P) -> Result<LayoutResult> {
        let dump = FragmentDump::from_path(path)?;
        self.analyze_dump(dump)
    }

    /// Analyze an in-memory fragment dump, using its recorded tables.
    pub fn analyze_dump(self, dump: FragmentDump) -> Result<LayoutResult> {
        let dump = Arc::new(dump);
        let session = LayoutSession::with_config(dump.clone(), self.config.clone())?
            .with_tables(dump);
        self.analyze_with(session)
    }

    /// Analyze an arbitrary page source without a table finder.
    pub fn analyze_source(self, source: Arc<dyn PageSource>) -> Result<LayoutResult> {
        let session = LayoutSession::with_config(source, self.config.clone())?;
        self.analyze_with(session)
    }

    fn analyze_with(self, session: LayoutSession) -> Result<LayoutResult> {
        let session = session.with_options(self.analyze_options);
        let document = session.analyze()?;
        session.close();
        Ok(LayoutResult {
            document,
            render_options: self.render_options,
        })
    }
}

impl Default for PdfLayout {
    fn default() -> Self {
        Self::new()
    }
}

/// Result of analyzing a document.
pub struct LayoutResult {
    /// The analyzed document
    pub document: StructuredDocument,
    /// Render options to use
    render_options: RenderOptions,
}

impl LayoutResult {
    /// Convert to Markdown.
    pub fn to_markdown(&self) -> Result<String> {
        render::to_markdown(&self.document, &self.render_options)
    }

    /// Convert to plain text with page banners.
    pub fn to_text(&self) -> Result<String> {
        render::to_text(&self.document, &self.render_options)
    }

    /// Convert to JSON.
    pub fn to_json(&self) -> Result<String> {
        render::to_json(&self.document, &self.render_options)
    }

    /// Render in the given format.
    pub fn render(&self, format: OutputFormat) -> Result<String> {
        render::render(&self.document, format, &self.render_options)
    }

    /// Get the document.
    pub fn document(&self) -> &StructuredDocument {
        &self.document
    }

    /// Take the document.
    pub fn into_document(self) -> StructuredDocument {
        self.document
    }
}

//! Document-level analysis.
//!
//! A [`LayoutSession`] drives a [`LayoutAnalyzer`] over every selected page
//! of a [`PageSource`], optionally in parallel, and owns the table-finder
//! handles opened along the way.

use std::sync::Arc;

use rayon::prelude::*;

use crate::error::{Error, Result};
use crate::fragments::PageSource;
use crate::layout::{LayoutAnalyzer, LayoutConfig};
use crate::model::{StructuredDocument, StructuredPage};
use crate::render::PageSelection;
use crate::table::{SharedTableFinder, TableFinderProvider, TableFinderRegistry};

/// Options for document analysis.
#[derive(Debug, Clone)]
pub struct AnalyzeOptions {
    /// Whether to analyze pages in parallel
    pub parallel: bool,

    /// Pages to analyze
    pub pages: PageSelection,
}

impl AnalyzeOptions {
    /// Create new analyze options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable or disable parallel processing.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Disable parallel processing.
    pub fn sequential(mut self) -> Self {
        self.parallel = false;
        self
    }

    /// Set the pages to analyze.
    pub fn with_pages(mut self, pages: PageSelection) -> Self {
        self.pages = pages;
        self
    }
}

impl Default for AnalyzeOptions {
    fn default() -> Self {
        Self {
            parallel: true,
            pages: PageSelection::All,
        }
    }
}

/// Analysis of one source document.
///
/// Pages whose analysis fails are replaced by a fallback page holding the
/// source's plain text, so the resulting document always has one page per
/// selected page number.
pub struct LayoutSession {
    source: Arc<dyn PageSource>,
    registry: Option<TableFinderRegistry>,
    analyzer: LayoutAnalyzer,
    options: AnalyzeOptions,
}

impl LayoutSession {
    /// Create a session over `source` using `analyzer`.
    pub fn new(source: Arc<dyn PageSource>, analyzer: LayoutAnalyzer) -> Self {
        Self {
            source,
            registry: None,
            analyzer,
            options: AnalyzeOptions::default(),
        }
    }

    /// Create a session with an analyzer built from `config`.
    pub fn with_config(source: Arc<dyn PageSource>, config: LayoutConfig) -> Result<Self> {
        Ok(Self::new(source, LayoutAnalyzer::new(config)?))
    }

    /// Use `provider` to find tables.
    pub fn with_tables(mut self, provider: Arc<dyn TableFinderProvider>) -> Self {
        self.registry = Some(TableFinderRegistry::new(provider));
        self
    }

    /// Set the analyze options.
    pub fn with_options(mut self, options: AnalyzeOptions) -> Self {
        self.options = options;
        self
    }

    /// The page source.
    pub fn source(&self) -> &dyn PageSource {
        self.source.as_ref()
    }

    /// The analyzer used for each page.
    pub fn analyzer(&self) -> &LayoutAnalyzer {
        &self.analyzer
    }

    /// Analyze every selected page.
    pub fn analyze(&self) -> Result<StructuredDocument> {
        let page_count = self.source.page_count();
        let numbers: Vec<u32> = (1..=page_count)
            .filter(|n| self.options.pages.includes(*n))
            .collect();
        log::debug!(
            "Analyzing {} of {} pages of {}",
            numbers.len(),
            page_count,
            self.source.source_path()
        );

        let finder = self.table_finder();
        let finder = finder.as_ref();

        let pages = if self.options.parallel {
            numbers
                .par_iter()
                .map(|n| self.analyze_or_fallback(*n, finder))
                .collect::<Result<Vec<_>>>()?
        } else {
            numbers
                .iter()
                .map(|n| self.analyze_or_fallback(*n, finder))
                .collect::<Result<Vec<_>>>()?
        };

        Ok(StructuredDocument {
            pages,
            metadata: self.source.metadata(),
            source_path: self.source.source_path().to_string(),
        })
    }

    /// Analyze a single page (1-indexed).
    pub fn analyze_page(&self, page_number: u32) -> Result<StructuredPage> {
        let page_count = self.source.page_count();
        if page_number == 0 || page_number > page_count {
            return Err(Error::PageOutOfRange(page_number, page_count));
        }
        let finder = self.table_finder();
        self.analyze_or_fallback(page_number, finder.as_ref())
    }

    /// Close every table-finder handle opened by this session.
    pub fn close(&self) {
        if let Some(registry) = &self.registry {
            registry.close();
        }
    }

    fn table_finder(&self) -> Option<SharedTableFinder> {
        if !self.analyzer.config().detect_tables {
            return None;
        }
        let registry = self.registry.as_ref()?;
        match registry.acquire(self.source.source_path()) {
            Ok(finder) => Some(finder),
            Err(e) => {
                log::warn!("Table detection disabled for this document: {}", e);
                None
            }
        }
    }

    fn analyze_or_fallback(
        &self,
        page_number: u32,
        finder: Option<&SharedTableFinder>,
    ) -> Result<StructuredPage> {
        let analyzed = self
            .source
            .extract_page(page_number)
            .map_err(|e| Error::page_analysis(page_number, e))
            .and_then(|fragments| self.analyzer.analyze_page(&fragments, finder));

        match analyzed {
            Ok(page) => Ok(page),
            Err(e) => {
                log::error!("{}; using plain-text fallback", e);
                self.fallback_page(page_number)
            }
        }
    }

    fn fallback_page(&self, page_number: u32) -> Result<StructuredPage> {
        let (width, height) = self.source.page_size(page_number)?;
        let text = self.source.plain_text(page_number).unwrap_or_else(|e| {
            log::warn!("No plain text for page {}: {}", page_number, e);
            String::new()
        });
        StructuredPage::fallback(page_number, width, height, &text)
    }
}

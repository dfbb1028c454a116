//! Page layout orchestration.

use super::columns::{self, DetectedColumn};
use super::margins;
use super::merge::merge_blocks;
use super::options::LayoutConfig;
use super::paragraphs::ParagraphReconstructor;
use crate::error::{Error, Result};
use crate::fragments::{ingest, PageFragments};
use crate::model::{BoundingBox, Column, RawBlock, StructuredPage, Table, TextBlock};
use crate::table::{AsciiTableRenderer, SharedTableFinder, TableDetector};

/// Turns one page of fragments into a [`StructuredPage`].
///
/// The pipeline runs in a fixed order: ingest, merge aligned fragments,
/// split off header and footer, detect tables and drop the blocks they
/// cover, detect columns, rebuild paragraphs per column, then sort into
/// reading order. Column and table failures degrade to a single column and
/// no tables; any other failure is reported as [`Error::PageAnalysis`].
#[derive(Debug, Clone)]
pub struct LayoutAnalyzer {
    config: LayoutConfig,
    paragraphs: ParagraphReconstructor,
    tables: TableDetector,
    ascii: AsciiTableRenderer,
}

impl LayoutAnalyzer {
    /// Create an analyzer; fails if a configured pattern does not compile.
    pub fn new(config: LayoutConfig) -> Result<Self> {
        Ok(Self {
            paragraphs: ParagraphReconstructor::new(config.paragraphs.clone())?,
            tables: TableDetector::new(config.tables.clone())?,
            ascii: AsciiTableRenderer::new(config.ascii.clone()),
            config,
        })
    }

    /// Create an analyzer with the default configuration.
    pub fn with_defaults() -> Result<Self> {
        Self::new(LayoutConfig::default())
    }

    /// The active configuration.
    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    /// The renderer used for table ASCII representations.
    pub fn ascii_renderer(&self) -> &AsciiTableRenderer {
        &self.ascii
    }

    /// Analyze a page of fragments.
    ///
    /// `finder` is consulted for tables when table detection is enabled.
    pub fn analyze_page(
        &self,
        page: &PageFragments,
        finder: Option<&SharedTableFinder>,
    ) -> Result<StructuredPage> {
        log::debug!("Analyzing page {}", page.page_number);
        let blocks = ingest(page);
        self.analyze_blocks(page.page_number, page.width, page.height, blocks, finder)
            .map_err(|e| match e {
                Error::PageAnalysis { .. } => e,
                other => Error::page_analysis(page.page_number, other),
            })
    }

    /// Analyze already ingested raw blocks.
    pub fn analyze_blocks(
        &self,
        page_number: u32,
        width: f32,
        height: f32,
        blocks: Vec<RawBlock>,
        finder: Option<&SharedTableFinder>,
    ) -> Result<StructuredPage> {
        if !(width.is_finite() && height.is_finite() && width > 0.0 && height > 0.0) {
            return Err(Error::page_analysis(
                page_number,
                format!("invalid page size {}x{}", width, height),
            ));
        }

        let mut page = StructuredPage::new(page_number, width, height);
        if blocks.is_empty() {
            log::debug!("Page {} has no text blocks", page_number);
            return Ok(page);
        }

        let blocks = if self.config.merge_close_blocks {
            merge_blocks(blocks, width, &self.config.merge, &self.config.columns)?
        } else {
            blocks
        };

        let split = margins::split(
            blocks,
            height,
            self.config.header_margin,
            self.config.footer_margin,
        );
        page.header = split.header;
        page.footer = split.footer;
        let mut content = split.content;

        if self.config.detect_tables {
            if let Some(finder) = finder {
                let (tables, remaining) = self.extract_tables(finder, page_number, height, content);
                page.tables = tables;
                content = remaining;
            }
        }

        let detected = match columns::detect(&content, width, &self.config.columns) {
            Ok(detected) => detected,
            Err(e) => {
                log::warn!("Column detection failed on page {}: {}", page_number, e);
                Vec::new()
            }
        };

        let (mut text_blocks, columns) = if detected.is_empty() {
            self.single_column(content)
        } else {
            self.multi_column(detected)
        };

        sort_reading_order(&mut text_blocks, columns.len());
        page.blocks = text_blocks;
        page.columns = columns;

        log::debug!(
            "Page {}: {} blocks, {} tables, {} columns",
            page_number,
            page.block_count(),
            page.table_count(),
            page.columns.len()
        );
        Ok(page)
    }

    /// Detect tables and drop the blocks they cover.
    ///
    /// A failing finder yields no tables and leaves `blocks` untouched.
    fn extract_tables(
        &self,
        finder: &SharedTableFinder,
        page_number: u32,
        page_height: f32,
        blocks: Vec<RawBlock>,
    ) -> (Vec<Table>, Vec<RawBlock>) {
        let tables = match self.tables.detect_tables(finder, page_number, page_height) {
            Ok(tables) => tables,
            Err(e) => {
                log::warn!("Table detection failed on page {}: {}", page_number, e);
                return (Vec::new(), blocks);
            }
        };
        if tables.is_empty() {
            return (tables, blocks);
        }

        let tables: Vec<Table> = tables
            .into_iter()
            .map(|mut table| {
                table.ascii_representation = self.ascii.to_ascii(&table);
                table
            })
            .collect();

        let remaining = blocks
            .into_iter()
            .filter(|b| !tables.iter().any(|t| b.bbox.intersects(&t.bbox)))
            .collect();

        (tables, remaining)
    }

    fn single_column(&self, blocks: Vec<RawBlock>) -> (Vec<TextBlock>, Vec<Column>) {
        let text_blocks = self.paragraphs.reconstruct(blocks, 0);

        let columns = BoundingBox::enclosing(text_blocks.iter().map(|b| &b.bbox))
            .map(|bbox| Column {
                bbox,
                index: 0,
                blocks: text_blocks.clone(),
            })
            .into_iter()
            .collect();

        (text_blocks, columns)
    }

    fn multi_column(&self, detected: Vec<DetectedColumn>) -> (Vec<TextBlock>, Vec<Column>) {
        let mut text_blocks = Vec::new();
        let mut columns = Vec::with_capacity(detected.len());

        for column in detected {
            let blocks = self.paragraphs.reconstruct(column.blocks, column.index);
            text_blocks.extend(blocks.iter().cloned());
            columns.push(Column {
                bbox: column.bbox,
                index: column.index,
                blocks,
            });
        }

        (text_blocks, columns)
    }
}

/// Sort blocks into reading order.
///
/// With at most one column, blocks run top to bottom. Otherwise they run
/// column by column, top to bottom within each.
pub fn sort_reading_order(blocks: &mut [TextBlock], column_count: usize) {
    if column_count <= 1 {
        blocks.sort_by(|a, b| b.bbox.y1().total_cmp(&a.bbox.y1()));
    } else {
        blocks.sort_by(|a, b| {
            a.column_index
                .cmp(&b.column_index)
                .then_with(|| b.bbox.y1().total_cmp(&a.bbox.y1()))
        });
    }
}

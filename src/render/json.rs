//! JSON rendering for structured documents.
//!
//! The output is built from borrowed view structs rather than the model's
//! own serde representation, so the coordinate fields can be switched on and
//! off per call.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::error::{Error, Result};
use crate::model::{
    BlockType, BoundingBox, Cell, Column, StructuredDocument, StructuredPage, Table, TextBlock,
};

use super::{JsonFormat, RenderOptions};

/// Convert a document to JSON.
pub fn to_json(doc: &StructuredDocument, options: &RenderOptions) -> Result<String> {
    let view = DocumentView::new(doc, options);
    let result = match options.json_format {
        JsonFormat::Pretty => serde_json::to_string_pretty(&view),
        JsonFormat::Compact => serde_json::to_string(&view),
    };

    result.map_err(|e| Error::Render(format!("JSON serialization error: {}", e)))
}

#[derive(Serialize)]
struct DocumentView<'a> {
    source_path: &'a str,
    page_count: usize,
    metadata: &'a BTreeMap<String, String>,
    pages: Vec<PageView<'a>>,
}

impl<'a> DocumentView<'a> {
    fn new(doc: &'a StructuredDocument, options: &RenderOptions) -> Self {
        let pages: Vec<PageView<'a>> = doc
            .pages
            .iter()
            .filter(|p| options.page_selection.includes(p.page_number))
            .map(|p| PageView::new(p, options.include_coordinates))
            .collect();

        Self {
            source_path: &doc.source_path,
            page_count: pages.len(),
            metadata: &doc.metadata,
            pages,
        }
    }
}

#[derive(Serialize)]
struct PageView<'a> {
    page_number: u32,
    width: f32,
    height: f32,
    block_count: usize,
    table_count: usize,
    header: &'a str,
    footer: &'a str,
    blocks: Vec<BlockView<'a>>,
    tables: Vec<TableView<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    columns: Option<Vec<ColumnView>>,
}

impl<'a> PageView<'a> {
    fn new(page: &'a StructuredPage, coords: bool) -> Self {
        Self {
            page_number: page.page_number,
            width: page.width,
            height: page.height,
            block_count: page.block_count(),
            table_count: page.table_count(),
            header: &page.header,
            footer: &page.footer,
            blocks: page.blocks.iter().map(|b| BlockView::new(b, coords)).collect(),
            tables: page.tables.iter().map(|t| TableView::new(t, coords)).collect(),
            columns: coords.then(|| page.columns.iter().map(ColumnView::from).collect()),
        }
    }
}

#[derive(Serialize)]
struct BlockView<'a> {
    text: &'a str,
    #[serde(rename = "type")]
    block_type: BlockType,
    column_index: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    bbox: Option<BoxView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    indentation: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    line_spacing: Option<f32>,
}

impl<'a> BlockView<'a> {
    fn new(block: &'a TextBlock, coords: bool) -> Self {
        Self {
            text: &block.text,
            block_type: block.block_type,
            column_index: block.column_index,
            bbox: coords.then(|| BoxView::from(&block.bbox)),
            indentation: coords.then_some(block.indentation),
            line_spacing: coords.then_some(block.line_spacing),
        }
    }
}

#[derive(Serialize)]
struct TableView<'a> {
    num_rows: usize,
    num_cols: usize,
    has_header: bool,
    ascii_representation: &'a str,
    cells: Vec<CellView<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    bbox: Option<BoxView>,
}

impl<'a> TableView<'a> {
    fn new(table: &'a Table, coords: bool) -> Self {
        Self {
            num_rows: table.num_rows,
            num_cols: table.num_cols,
            has_header: table.has_header,
            ascii_representation: &table.ascii_representation,
            cells: table.cells.iter().map(|c| CellView::new(c, coords)).collect(),
            bbox: coords.then(|| BoxView::from(&table.bbox)),
        }
    }
}

#[derive(Serialize)]
struct CellView<'a> {
    text: &'a str,
    row: usize,
    col: usize,
    rowspan: usize,
    colspan: usize,
    is_header: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    bbox: Option<BoxView>,
}

impl<'a> CellView<'a> {
    fn new(cell: &'a Cell, coords: bool) -> Self {
        Self {
            text: &cell.text,
            row: cell.row,
            col: cell.col,
            rowspan: cell.rowspan,
            colspan: cell.colspan,
            is_header: cell.is_header,
            bbox: coords.then(|| BoxView::from(&cell.bbox)),
        }
    }
}

#[derive(Serialize)]
struct ColumnView {
    index: usize,
    bbox: BoxView,
}

impl From<&Column> for ColumnView {
    fn from(column: &Column) -> Self {
        Self {
            index: column.index,
            bbox: BoxView::from(&column.bbox),
        }
    }
}

#[derive(Serialize)]
struct BoxView {
    x0: f32,
    y0: f32,
    x1: f32,
    y1: f32,
    width: f32,
    height: f32,
}

impl From<&BoundingBox> for BoxView {
    fn from(bbox: &BoundingBox) -> Self {
        Self {
            x0: bbox.x0(),
            y0: bbox.y0(),
            x1: bbox.x1(),
            y1: bbox.y1(),
            width: bbox.width(),
            height: bbox.height(),
        }
    }
}

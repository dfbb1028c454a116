//! Table types.

use serde::{Deserialize, Serialize};

use super::{Alignment, BoundingBox};

/// A table cell with its grid position and geometry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cell {
    /// Cell text, trimmed
    pub text: String,

    /// Cell bounds on the page
    pub bbox: BoundingBox,

    /// Row index (0-based)
    pub row: usize,

    /// Column index (0-based)
    pub col: usize,

    /// Number of rows this cell spans
    pub rowspan: usize,

    /// Number of columns this cell spans
    pub colspan: usize,

    /// Whether this cell belongs to the header row
    pub is_header: bool,

    /// Cell alignment
    pub alignment: Alignment,
}

impl Cell {
    /// Create a single-span, left-aligned cell.
    pub fn new(text: impl Into<String>, bbox: BoundingBox, row: usize, col: usize) -> Self {
        Self {
            text: text.into(),
            bbox,
            row,
            col,
            rowspan: 1,
            colspan: 1,
            is_header: false,
            alignment: Alignment::Left,
        }
    }

    /// Set rowspan and return self. Spans below 1 are raised to 1.
    pub fn rowspan(mut self, span: usize) -> Self {
        self.rowspan = span.max(1);
        self
    }

    /// Set colspan and return self. Spans below 1 are raised to 1.
    pub fn colspan(mut self, span: usize) -> Self {
        self.colspan = span.max(1);
        self
    }

    /// Mark as header cell and return self.
    pub fn header(mut self, is_header: bool) -> Self {
        self.is_header = is_header;
        self
    }

    /// Check if this cell spans multiple rows or columns.
    pub fn is_merged(&self) -> bool {
        self.rowspan > 1 || self.colspan > 1
    }

    /// Check if this cell covers grid position `(row, col)`.
    pub fn covers(&self, row: usize, col: usize) -> bool {
        (self.row..self.row + self.rowspan).contains(&row)
            && (self.col..self.col + self.colspan).contains(&col)
    }
}

/// A detected table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Table {
    /// Cells in row-major order
    pub cells: Vec<Cell>,

    /// Table bounds on the page
    pub bbox: BoundingBox,

    /// Number of grid rows
    pub num_rows: usize,

    /// Number of grid columns
    pub num_cols: usize,

    /// Whether row 0 is a header row
    pub has_header: bool,

    /// Bordered fixed-width rendering
    pub ascii_representation: String,
}

impl Table {
    /// Create a table without a rendering.
    pub fn new(cells: Vec<Cell>, bbox: BoundingBox, num_rows: usize, num_cols: usize) -> Self {
        Self {
            cells,
            bbox,
            num_rows,
            num_cols,
            has_header: false,
            ascii_representation: String::new(),
        }
    }

    /// Set the header flag and return self.
    pub fn with_header(mut self, has_header: bool) -> Self {
        self.has_header = has_header;
        self
    }

    /// Check if the table has no renderable content.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty() || self.num_rows == 0 || self.num_cols == 0
    }

    /// The cell covering `(row, col)`, taking spans into account.
    pub fn get_cell(&self, row: usize, col: usize) -> Option<&Cell> {
        self.cells.iter().find(|c| c.covers(row, col))
    }

    /// Cells covering `row`, sorted by column.
    pub fn get_row(&self, row: usize) -> Vec<&Cell> {
        let mut cells: Vec<&Cell> = self
            .cells
            .iter()
            .filter(|c| (c.row..c.row + c.rowspan).contains(&row))
            .collect();
        cells.sort_by_key(|c| c.col);
        cells
    }

    /// Cells covering `col`, sorted by row.
    pub fn get_column(&self, col: usize) -> Vec<&Cell> {
        let mut cells: Vec<&Cell> = self
            .cells
            .iter()
            .filter(|c| (c.col..c.col + c.colspan).contains(&col))
            .collect();
        cells.sort_by_key(|c| c.row);
        cells
    }

    /// Iterate rows top to bottom.
    pub fn iter_rows(&self) -> impl Iterator<Item = Vec<&Cell>> + '_ {
        (0..self.num_rows).map(move |r| self.get_row(r))
    }

    /// Check if the table has complex structure (merged cells).
    pub fn has_merged_cells(&self) -> bool {
        self.cells.iter().any(Cell::is_merged)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit(x: f32, y: f32) -> BoundingBox {
        BoundingBox::new(x, y, x + 10.0, y + 10.0).unwrap()
    }

    fn sample() -> Table {
        // +---------+---+
        // | wide        |
        // +---------+---+
        // | a       | b |
        let cells = vec![
            Cell::new("wide", unit(0.0, 10.0), 0, 0).colspan(2),
            Cell::new("a", unit(0.0, 0.0), 1, 0),
            Cell::new("b", unit(10.0, 0.0), 1, 1),
        ];
        let bbox = BoundingBox::new(0.0, 0.0, 20.0, 20.0).unwrap();
        Table::new(cells, bbox, 2, 2)
    }

    #[test]
    fn test_get_cell_honors_spans() {
        let table = sample();
        assert_eq!(table.get_cell(0, 1).map(|c| c.text.as_str()), Some("wide"));
        assert_eq!(table.get_cell(1, 1).map(|c| c.text.as_str()), Some("b"));
        assert!(table.get_cell(2, 0).is_none());
    }

    #[test]
    fn test_rows_and_columns() {
        let table = sample();
        let row: Vec<&str> = table.get_row(1).iter().map(|c| c.text.as_str()).collect();
        assert_eq!(row, vec!["a", "b"]);

        let col: Vec<&str> = table.get_column(1).iter().map(|c| c.text.as_str()).collect();
        assert_eq!(col, vec!["wide", "b"]);

        assert_eq!(table.iter_rows().count(), 2);
    }

    #[test]
    fn test_merged_cells() {
        let table = sample();
        assert!(table.has_merged_cells());
        assert!(table.cells[0].is_merged());
        assert!(!table.cells[1].is_merged());
        assert_eq!(Cell::new("x", unit(0.0, 0.0), 0, 0).rowspan(0).rowspan, 1);
    }
}

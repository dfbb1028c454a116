//! Cell synthesis: from a raw string grid to a geometric [`Table`].

use regex::Regex;

use super::RawTable;
use crate::error::{Error, Result};
use crate::model::{is_all_caps, BoundingBox, Cell, Table};

/// Row-0 average cell length below this fraction of the data rows'
/// average marks a header.
const HEADER_LENGTH_RATIO: f32 = 0.7;

/// Builds [`Table`]s from raw grids and decides whether row 0 is a header.
#[derive(Debug, Clone)]
pub struct CellSynthesizer {
    numeric: Regex,
}

impl CellSynthesizer {
    /// Create a synthesizer; `numeric_pattern` recognizes numeric content.
    pub fn new(numeric_pattern: &str) -> Result<Self> {
        let numeric = Regex::new(numeric_pattern)
            .map_err(|e| Error::InvalidConfig(format!("invalid numeric pattern: {}", e)))?;
        Ok(Self { numeric })
    }

    /// Convert a raw grid into a table with uniform cell geometry.
    ///
    /// The table box is flipped from the finder's top-left origin; every
    /// cell gets `width / cols` by `height / rows`, row 0 at the top. Row 0
    /// cells are always flagged as header cells; `has_header` on the table
    /// records whether the header heuristic agreed.
    pub fn synthesize(&self, raw: &RawTable, page_height: f32) -> Result<Table> {
        let [x0, top, x1, bottom] = raw.bbox;
        let bbox = BoundingBox::from_top_left(x0, top, x1, bottom, page_height)?;

        let num_rows = raw.rows.len();
        let num_cols = raw.rows.iter().map(Vec::len).max().unwrap_or(0);
        if num_rows == 0 || num_cols == 0 {
            return Err(Error::TableDetection("empty table grid".into()));
        }

        let cell_width = bbox.width() / num_cols as f32;
        let cell_height = bbox.height() / num_rows as f32;
        let has_header = self.detect_header(&raw.rows);

        let mut cells = Vec::with_capacity(num_rows * num_cols);
        for (row_idx, row) in raw.rows.iter().enumerate() {
            let cell_y1 = bbox.y1() - row_idx as f32 * cell_height;
            for (col_idx, text) in row.iter().enumerate() {
                let cell_x0 = bbox.x0() + col_idx as f32 * cell_width;
                let cell_bbox =
                    BoundingBox::new(cell_x0, cell_y1 - cell_height, cell_x0 + cell_width, cell_y1)?;
                let text = text.as_deref().unwrap_or("").trim();

                cells.push(Cell::new(text, cell_bbox, row_idx, col_idx).header(row_idx == 0));
            }
        }

        Ok(Table::new(cells, bbox, num_rows, num_cols).with_header(has_header))
    }

    /// Decide whether row 0 of a grid is a header.
    ///
    /// Any one of these confirms it: row 0 is all uppercase (longer than 3
    /// chars); row 0's mean cell length is under 0.7x the data rows' mean;
    /// row 0 has no numbers while some data row does.
    pub fn detect_header(&self, rows: &[Vec<Option<String>>]) -> bool {
        if rows.len() < 2 {
            return false;
        }
        let first = &rows[0];
        if first.is_empty() {
            return false;
        }

        let first_text = first
            .iter()
            .map(|c| c.as_deref().unwrap_or(""))
            .collect::<Vec<_>>()
            .join(" ");
        if is_all_caps(&first_text) && first_text.chars().count() > 3 {
            return true;
        }

        let first_avg = mean_cell_length(first);
        let others: Vec<f32> = rows[1..]
            .iter()
            .filter(|r| !r.is_empty())
            .map(|r| mean_cell_length(r))
            .collect();
        if !others.is_empty() {
            let others_avg = others.iter().sum::<f32>() / others.len() as f32;
            if first_avg < others_avg * HEADER_LENGTH_RATIO {
                return true;
            }
        }

        let first_has_numbers = self.row_has_numbers(first);
        let data_has_numbers = rows[1..].iter().any(|r| self.row_has_numbers(r));
        !first_has_numbers && data_has_numbers
    }

    fn row_has_numbers(&self, row: &[Option<String>]) -> bool {
        row.iter()
            .flatten()
            .any(|text| self.numeric.is_match(text))
    }
}

fn mean_cell_length(row: &[Option<String>]) -> f32 {
    let total: usize = row
        .iter()
        .map(|c| c.as_deref().map_or(0, |s| s.chars().count()))
        .sum();
    total as f32 / row.len() as f32
}

#[cfg(test)]
mod tests {
    use super::*;

    fn synth() -> CellSynthesizer {
        CellSynthesizer::new(r"\d+\.?\d*").unwrap()
    }

    fn grid(rows: &[&[&str]]) -> Vec<Vec<Option<String>>> {
        rows.iter()
            .map(|r| r.iter().map(|c| Some(c.to_string())).collect())
            .collect()
    }

    #[test]
    fn test_uniform_geometry_and_flip() {
        let raw = RawTable::new(
            [100.0, 92.0, 300.0, 192.0],
            vec![
                vec![Some(" Name "), Some("Qty")],
                vec![Some("Widget"), None],
            ],
        );
        let table = synth().synthesize(&raw, 792.0).unwrap();

        assert_eq!(table.bbox, BoundingBox::new(100.0, 600.0, 300.0, 700.0).unwrap());
        assert_eq!(table.num_rows, 2);
        assert_eq!(table.num_cols, 2);

        let name = table.get_cell(0, 0).unwrap();
        assert_eq!(name.text, "Name");
        assert_eq!(name.bbox, BoundingBox::new(100.0, 650.0, 200.0, 700.0).unwrap());

        let empty = table.get_cell(1, 1).unwrap();
        assert_eq!(empty.text, "");
        assert_eq!(empty.bbox, BoundingBox::new(200.0, 600.0, 300.0, 650.0).unwrap());
    }

    #[test]
    fn test_ragged_rows_use_widest_row() {
        let raw = RawTable::new(
            [0.0, 0.0, 90.0, 20.0],
            vec![vec![Some("a"), Some("b"), Some("c")], vec![Some("d")]],
        );
        let table = synth().synthesize(&raw, 100.0).unwrap();
        assert_eq!(table.num_cols, 3);
        assert_eq!(table.cells.len(), 4);
        assert!(table.get_cell(1, 2).is_none());
    }

    #[test]
    fn test_empty_grid_is_an_error() {
        let raw = RawTable::new::<String>([0.0, 0.0, 90.0, 20.0], vec![]);
        assert!(synth().synthesize(&raw, 100.0).is_err());
    }

    #[test]
    fn test_header_all_caps() {
        assert!(synth().detect_header(&grid(&[&["NAME", "CITY"], &["Ann", "Oslo"]])));
    }

    #[test]
    fn test_header_short_first_row() {
        let rows = grid(&[
            &["Id", "Note"],
            &["first entry", "a much longer description"],
        ]);
        assert!(synth().detect_header(&rows));
    }

    #[test]
    fn test_header_numbers_only_in_data() {
        let rows = grid(&[&["Item", "Price"], &["Tea", "4.50"]]);
        assert!(synth().detect_header(&rows));
    }

    #[test]
    fn test_no_header_signal() {
        let rows = grid(&[&["alpha 1", "beta 2"], &["gamma 3", "delta 4"]]);
        assert!(!synth().detect_header(&rows));
        assert!(!synth().detect_header(&grid(&[&["ONLY", "ROW"]])));
    }

    #[test]
    fn test_header_flag_marks_row_zero() {
        let raw = RawTable::new(
            [0.0, 0.0, 100.0, 40.0],
            vec![vec![Some("NAME"), Some("AGE")], vec![Some("Bo"), Some("7")]],
        );
        let table = synth().synthesize(&raw, 100.0).unwrap();
        assert!(table.has_header);
        assert!(table.get_row(0).iter().all(|c| c.is_header));
        assert!(table.get_row(1).iter().all(|c| !c.is_header));

        let plain = RawTable::new(
            [0.0, 0.0, 100.0, 40.0],
            vec![vec![Some("alpha 1"), Some("beta 2")], vec![Some("gamma 3"), Some("delta 4")]],
        );
        let table = synth().synthesize(&plain, 100.0).unwrap();
        assert!(!table.has_header);
        assert!(table.get_row(0).iter().all(|c| c.is_header));
        assert!(table.get_row(1).iter().all(|c| !c.is_header));
    }
}

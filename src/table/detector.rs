//! Table detection over a shared table-finder handle.

use serde::{Deserialize, Serialize};

use super::{CellSynthesizer, SharedTableFinder};
use crate::error::{Error, Result};
use crate::model::Table;

/// Thresholds a synthesized table must meet to be kept.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TableSettings {
    /// Minimum number of rows
    pub min_rows: usize,

    /// Minimum number of columns
    pub min_cols: usize,

    /// Minimum cell width in points; tables narrower than two cells are dropped
    pub min_cell_width: f32,

    /// Minimum cell height in points; tables shorter than two cells are dropped
    pub min_cell_height: f32,

    /// Minimum fraction of cells with non-blank text
    pub min_filled_ratio: f32,

    /// Pattern that marks a cell as numeric when detecting header rows
    pub numeric_pattern: String,
}

impl Default for TableSettings {
    fn default() -> Self {
        Self {
            min_rows: 2,
            min_cols: 2,
            min_cell_width: 10.0,
            min_cell_height: 5.0,
            min_filled_ratio: 0.3,
            numeric_pattern: r"\d+\.?\d*".to_string(),
        }
    }
}

impl TableSettings {
    /// Set the minimum grid size and return self.
    pub fn with_min_grid(mut self, rows: usize, cols: usize) -> Self {
        self.min_rows = rows;
        self.min_cols = cols;
        self
    }

    /// Set the minimum filled-cell ratio and return self.
    pub fn with_min_filled_ratio(mut self, ratio: f32) -> Self {
        self.min_filled_ratio = ratio;
        self
    }
}

/// Finds, synthesizes and validates the tables of a page.
#[derive(Debug, Clone)]
pub struct TableDetector {
    settings: TableSettings,
    synthesizer: CellSynthesizer,
}

impl TableDetector {
    /// Create a detector; fails if the numeric pattern does not compile.
    pub fn new(settings: TableSettings) -> Result<Self> {
        let synthesizer = CellSynthesizer::new(&settings.numeric_pattern)?;
        Ok(Self {
            settings,
            synthesizer,
        })
    }

    /// The active settings.
    pub fn settings(&self) -> &TableSettings {
        &self.settings
    }

    /// Detect the tables on a page.
    ///
    /// The finder is locked for the duration of the lookup. Grids that fail
    /// to synthesize are skipped; the rest are kept if they pass
    /// [`validate`](Self::validate).
    pub fn detect_tables(
        &self,
        finder: &SharedTableFinder,
        page_number: u32,
        page_height: f32,
    ) -> Result<Vec<Table>> {
        let raw_tables = {
            let mut finder = finder
                .lock()
                .map_err(|_| Error::TableDetection("table finder lock poisoned".into()))?;
            finder.find_tables(page_number)?
        };

        let found = raw_tables.len();
        let tables: Vec<Table> = raw_tables
            .iter()
            .filter_map(|raw| match self.synthesizer.synthesize(raw, page_height) {
                Ok(table) => Some(table),
                Err(e) => {
                    log::debug!("Page {}: skipping table grid: {}", page_number, e);
                    None
                }
            })
            .filter(|table| self.validate(table))
            .collect();

        log::debug!(
            "Page {}: kept {} of {} table candidates",
            page_number,
            tables.len(),
            found
        );
        Ok(tables)
    }

    /// Check a table against the size and fill thresholds.
    pub fn validate(&self, table: &Table) -> bool {
        let s = &self.settings;
        if table.num_rows < s.min_rows || table.num_cols < s.min_cols {
            return false;
        }
        if table.bbox.width() < 2.0 * s.min_cell_width
            || table.bbox.height() < 2.0 * s.min_cell_height
        {
            return false;
        }

        // ragged grids only count the cells that were synthesized
        let total = table.cells.len();
        if total == 0 {
            return false;
        }
        let filled = table
            .cells
            .iter()
            .filter(|c| !c.text.trim().is_empty())
            .count();
        filled as f32 / total as f32 >= s.min_filled_ratio
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::{RawTable, TableFinder};
    use std::sync::{Arc, Mutex};

    struct FixedFinder(Vec<RawTable>);

    impl TableFinder for FixedFinder {
        fn find_tables(&mut self, page_number: u32) -> Result<Vec<RawTable>> {
            if page_number == 1 {
                Ok(self.0.clone())
            } else {
                Err(Error::TableDetection("no such page".into()))
            }
        }
    }

    fn shared(tables: Vec<RawTable>) -> SharedTableFinder {
        let finder: Box<dyn TableFinder> = Box::new(FixedFinder(tables));
        Arc::new(Mutex::new(finder))
    }

    fn grid(bbox: [f32; 4], rows: &[&[&str]]) -> RawTable {
        RawTable::new(
            bbox,
            rows.iter()
                .map(|r| {
                    r.iter()
                        .map(|c| if c.is_empty() { None } else { Some(*c) })
                        .collect()
                })
                .collect(),
        )
    }

    fn synthesized(bbox: [f32; 4], rows: &[&[&str]]) -> Table {
        CellSynthesizer::new(&TableSettings::default().numeric_pattern)
            .unwrap()
            .synthesize(&grid(bbox, rows), 100.0)
            .unwrap()
    }

    fn detector() -> TableDetector {
        TableDetector::new(TableSettings::default()).unwrap()
    }

    #[test]
    fn test_detects_valid_table() {
        let finder = shared(vec![grid(
            [72.0, 100.0, 272.0, 160.0],
            &[&["Name", "Qty"], &["Bolt", "4"], &["Nut", "9"]],
        )]);
        let tables = detector().detect_tables(&finder, 1, 792.0).unwrap();

        assert_eq!(tables.len(), 1);
        assert_eq!(tables[0].num_rows, 3);
        assert_eq!(tables[0].num_cols, 2);
        assert!(tables[0].has_header);
        assert_eq!(tables[0].bbox.y1(), 692.0);
    }

    #[test]
    fn test_rejects_small_and_sparse_tables() {
        let finder = shared(vec![
            // one row
            grid([72.0, 100.0, 272.0, 160.0], &[&["a", "b"]]),
            // 15pt wide
            grid([72.0, 100.0, 87.0, 160.0], &[&["a", "b"], &["c", "d"]]),
            // 8pt tall for two rows
            grid([72.0, 100.0, 272.0, 108.0], &[&["a", "b"], &["c", "d"]]),
            // one of four cells filled
            grid([72.0, 100.0, 272.0, 160.0], &[&["a", ""], &["", " "]]),
            // empty grid fails synthesis
            RawTable::new::<String>([72.0, 100.0, 272.0, 160.0], vec![]),
        ]);
        assert!(detector().detect_tables(&finder, 1, 792.0).unwrap().is_empty());
    }

    #[test]
    fn test_filled_ratio_boundary() {
        // 3 of 10 cells filled is exactly 30%
        let rows: &[&[&str]] = &[
            &["a", "b", "c", "", ""],
            &["", "", "", "", ""],
        ];
        let finder = shared(vec![grid([0.0, 0.0, 200.0, 40.0], rows)]);
        assert_eq!(detector().detect_tables(&finder, 1, 792.0).unwrap().len(), 1);
    }

    #[test]
    fn test_size_floor_is_two_cells_regardless_of_grid() {
        let rows: &[&[&str]] = &[&["1", "2", "3"], &["4", "5", "6"]];

        let kept = synthesized([0.0, 0.0, 20.0, 10.0], rows);
        assert_eq!(kept.num_cols, 3);
        assert!(detector().validate(&kept));

        let narrow = synthesized([0.0, 0.0, 19.9, 10.0], rows);
        assert!(!detector().validate(&narrow));

        let short = synthesized([0.0, 0.0, 20.0, 9.9], rows);
        assert!(!detector().validate(&short));
    }

    #[test]
    fn test_fill_ratio_counts_synthesized_cells_only() {
        // 2 of 5 cells filled; the missing ragged cells do not count
        let table = synthesized([0.0, 0.0, 200.0, 40.0], &[&["a", "", "", ""], &["b"]]);
        assert_eq!(table.cells.len(), 5);
        assert!(detector().validate(&table));
    }

    #[test]
    fn test_finder_errors_propagate() {
        let finder = shared(Vec::new());
        assert!(matches!(
            detector().detect_tables(&finder, 2, 792.0),
            Err(Error::TableDetection(_))
        ));
    }

    #[test]
    fn test_bad_numeric_pattern() {
        let settings = TableSettings {
            numeric_pattern: "(".into(),
            ..TableSettings::default()
        };
        assert!(TableDetector::new(settings).is_err());
    }
}

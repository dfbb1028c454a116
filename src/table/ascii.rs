//! Fixed-width rendering of tables as bordered ASCII and Markdown.
//!
//! ```text
//! +------------+----------+--------+
//! | Product    | Quantity | Price  |
//! +------------+----------+--------+
//! | Widget A   | 100      | $10.00 |
//! | Widget B   | 250      | $15.50 |
//! +------------+----------+--------+
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::model::Table;

/// Characters and sizing for ASCII tables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AsciiTableStyle {
    /// Character for horizontal rules
    pub horizontal: char,
    /// Character for vertical borders
    pub vertical: char,
    /// Character for corners and intersections
    pub corner: char,
    /// Draw a rule under the header row of tables that have one
    pub header_separator: bool,
    /// Spaces on each side of cell content
    pub padding: usize,
    /// Widest a column may grow before its text wraps
    pub max_cell_width: usize,
    /// Narrowest column width
    pub min_cell_width: usize,
}

impl Default for AsciiTableStyle {
    fn default() -> Self {
        Self {
            horizontal: '-',
            vertical: '|',
            corner: '+',
            header_separator: true,
            padding: 1,
            max_cell_width: 40,
            min_cell_width: 3,
        }
    }
}

impl AsciiTableStyle {
    /// Set the maximum cell width and return self.
    pub fn with_max_cell_width(mut self, width: usize) -> Self {
        self.max_cell_width = width;
        self
    }

    /// Set the padding and return self.
    pub fn with_padding(mut self, padding: usize) -> Self {
        self.padding = padding;
        self
    }
}

/// Renders [`Table`]s as text.
#[derive(Debug, Clone, Default)]
pub struct AsciiTableRenderer {
    style: AsciiTableStyle,
}

impl AsciiTableRenderer {
    /// Create a renderer with the given style.
    pub fn new(style: AsciiTableStyle) -> Self {
        Self { style }
    }

    /// The active style.
    pub fn style(&self) -> &AsciiTableStyle {
        &self.style
    }

    /// Render a bordered ASCII table.
    ///
    /// Empty tables render as an empty string. If the table cannot be laid
    /// out, the plain [`fallback`](Self::fallback) form is returned instead.
    pub fn to_ascii(&self, table: &Table) -> String {
        if table.is_empty() {
            return String::new();
        }
        match self.try_to_ascii(table) {
            Ok(text) => text,
            Err(e) => {
                log::warn!("Failed to render table as ASCII: {}", e);
                self.fallback(table)
            }
        }
    }

    /// Render a bordered ASCII table, reporting layout failures.
    pub fn try_to_ascii(&self, table: &Table) -> Result<String> {
        if table.is_empty() {
            return Ok(String::new());
        }
        let grid = build_grid(table)?;
        let widths = self.column_widths(&grid, table.num_cols);
        let separator = self.separator(&widths);
        let draw_header_rule = table.has_header && self.style.header_separator;

        let mut lines = vec![separator.clone()];
        for (row_idx, row) in grid.iter().enumerate() {
            lines.extend(self.render_row(row, &widths));
            if row_idx == 0 && draw_header_rule {
                lines.push(separator.clone());
            }
        }
        lines.push(separator);

        Ok(lines.join("\n"))
    }

    /// Render a pipe table; a `---` row always follows row 0.
    pub fn to_markdown(&self, table: &Table) -> String {
        if table.is_empty() {
            return String::new();
        }
        let grid = match build_grid(table) {
            Ok(grid) => grid,
            Err(e) => {
                log::warn!("Failed to render table as Markdown: {}", e);
                return self.fallback(table);
            }
        };
        let widths = self.column_widths(&grid, table.num_cols);

        let mut lines = Vec::with_capacity(grid.len() + 1);
        for (row_idx, row) in grid.iter().enumerate() {
            let cells: Vec<String> = widths
                .iter()
                .enumerate()
                .map(|(i, w)| pad_markdown_cell(row.get(i).map_or("", String::as_str), *w))
                .collect();
            lines.push(format!("| {} |", cells.join(" | ")));

            if row_idx == 0 {
                let rules: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
                lines.push(format!("| {} |", rules.join(" | ")));
            }
        }
        lines.join("\n")
    }

    /// Each row's cell texts joined by `" | "`, one row per line.
    pub fn fallback(&self, table: &Table) -> String {
        (0..table.num_rows)
            .map(|r| {
                table
                    .get_row(r)
                    .iter()
                    .map(|c| c.text.as_str())
                    .collect::<Vec<_>>()
                    .join(" | ")
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn column_widths(&self, grid: &[Vec<String>], num_cols: usize) -> Vec<usize> {
        (0..num_cols)
            .map(|col| {
                let widest = grid
                    .iter()
                    .filter_map(|row| row.get(col))
                    .flat_map(|text| text.split('\n'))
                    .map(|line| line.chars().count())
                    .fold(self.style.min_cell_width, usize::max);
                widest.min(self.style.max_cell_width)
            })
            .collect()
    }

    fn separator(&self, widths: &[usize]) -> String {
        let mut line = String::new();
        line.push(self.style.corner);
        for width in widths {
            let run = width + self.style.padding * 2;
            line.extend(std::iter::repeat(self.style.horizontal).take(run));
            line.push(self.style.corner);
        }
        line
    }

    fn render_row(&self, row: &[String], widths: &[usize]) -> Vec<String> {
        let wrapped: Vec<Vec<String>> = widths
            .iter()
            .enumerate()
            .map(|(i, w)| wrap_text(row.get(i).map_or("", String::as_str), *w))
            .collect();
        let height = wrapped.iter().map(Vec::len).max().unwrap_or(1);
        let pad = " ".repeat(self.style.padding);

        (0..height)
            .map(|line_idx| {
                let mut line = String::new();
                line.push(self.style.vertical);
                for (cell, width) in wrapped.iter().zip(widths) {
                    let text = cell.get(line_idx).map_or("", String::as_str);
                    line.push_str(&pad);
                    line.push_str(&format!("{:<width$}", text, width = *width));
                    line.push_str(&pad);
                    line.push(self.style.vertical);
                }
                line
            })
            .collect()
    }
}

/// Lay the table's cells out on its grid; positions without a cell are empty.
fn build_grid(table: &Table) -> Result<Vec<Vec<String>>> {
    for cell in &table.cells {
        if cell.row + cell.rowspan > table.num_rows || cell.col + cell.colspan > table.num_cols {
            return Err(Error::Render(format!(
                "cell ({}, {}) lies outside the {}x{} grid",
                cell.row, cell.col, table.num_rows, table.num_cols
            )));
        }
    }

    Ok((0..table.num_rows)
        .map(|r| {
            (0..table.num_cols)
                .map(|c| table.get_cell(r, c).map(|cell| cell.text.clone()).unwrap_or_default())
                .collect()
        })
        .collect())
}

fn pad_markdown_cell(text: &str, width: usize) -> String {
    let flat = text.replace('\n', " ");
    format!("{:<width$}", flat, width = width)
        .chars()
        .take(width)
        .collect()
}

/// Wrap cell text to `width` characters.
///
/// Existing newlines are kept; longer lines break at word boundaries and
/// words longer than the width are hard-split with a trailing `-`.
pub fn wrap_text(text: &str, width: usize) -> Vec<String> {
    if text.is_empty() {
        return vec![String::new()];
    }

    let mut lines = Vec::new();
    for paragraph in text.split('\n') {
        if paragraph.chars().count() <= width {
            lines.push(paragraph.to_string());
        } else {
            lines.extend(wrap_line(paragraph, width));
        }
    }
    lines
}

fn wrap_line(line: &str, width: usize) -> Vec<String> {
    let chunk = width.saturating_sub(1).max(1);
    let mut lines = Vec::new();
    let mut current: Vec<String> = Vec::new();
    let mut current_len = 0;

    for word in line.split_whitespace() {
        let word_len = word.chars().count();
        if current_len + word_len + current.len() <= width {
            current.push(word.to_string());
            current_len += word_len;
            continue;
        }

        if !current.is_empty() {
            lines.push(current.join(" "));
        }

        if word_len > width {
            let mut rest: Vec<char> = word.chars().collect();
            while rest.len() > width {
                let tail = rest.split_off(chunk.min(rest.len()));
                let mut piece: String = rest.into_iter().collect();
                piece.push('-');
                lines.push(piece);
                rest = tail;
            }
            current_len = rest.len();
            current = if rest.is_empty() {
                Vec::new()
            } else {
                vec![rest.into_iter().collect()]
            };
        } else {
            current = vec![word.to_string()];
            current_len = word_len;
        }
    }

    if !current.is_empty() {
        lines.push(current.join(" "));
    }
    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{BoundingBox, Cell};

    fn table(rows: &[&[&str]], has_header: bool) -> Table {
        let bbox = BoundingBox::new(0.0, 0.0, 100.0, 100.0).unwrap();
        let num_cols = rows.iter().map(|r| r.len()).max().unwrap_or(0);
        let cells = rows
            .iter()
            .enumerate()
            .flat_map(|(r, row)| {
                row.iter()
                    .enumerate()
                    .map(move |(c, text)| Cell::new(*text, bbox, r, c))
            })
            .collect();
        Table::new(cells, bbox, rows.len(), num_cols).with_header(has_header)
    }

    #[test]
    fn test_single_cell_is_three_lines() {
        let out = AsciiTableRenderer::default().to_ascii(&table(&[&["X"]], false));
        assert_eq!(out, "+-----+\n| X   |\n+-----+");
        assert_eq!(out.lines().count(), 3);
    }

    #[test]
    fn test_header_separator() {
        let renderer = AsciiTableRenderer::default();
        let with_header = renderer.to_ascii(&table(&[&["Name"], &["Ann"]], true));
        assert_eq!(with_header.lines().count(), 5);
        assert_eq!(
            with_header,
            "+------+\n| Name |\n+------+\n| Ann  |\n+------+"
        );

        let without = renderer.to_ascii(&table(&[&["Name"], &["Ann"]], false));
        assert_eq!(without.lines().count(), 4);

        let header_only = renderer.to_ascii(&table(&[&["Name"]], true));
        assert_eq!(header_only.lines().count(), 4);
    }

    #[test]
    fn test_wrapped_cells_align_rows() {
        let style = AsciiTableStyle::default().with_max_cell_width(5);
        let out = AsciiTableRenderer::new(style).to_ascii(&table(&[&["aaa bbb ccc", "x"]], false));
        let lines: Vec<&str> = out.lines().collect();

        assert_eq!(lines.len(), 5);
        assert_eq!(lines[1], "| aaa   | x   |");
        assert_eq!(lines[2], "| bbb   |     |");
        assert_eq!(lines[3], "| ccc   |     |");
        assert!(lines.iter().all(|l| l.chars().count() == lines[0].chars().count()));
    }

    #[test]
    fn test_wrap_long_text() {
        let text = "lorem ipsum dolor sit amet consectetur adipiscing";
        assert_eq!(text.len(), 49);
        let text = format!("{}!", text);
        let lines = wrap_text(&text, 20);
        assert!(lines.len() >= 3);
        assert!(lines.iter().all(|l| l.chars().count() <= 20));
    }

    #[test]
    fn test_hard_split_long_word() {
        let word = "a".repeat(30);
        let lines = wrap_text(&word, 20);
        assert_eq!(lines.len(), 2);
        assert!(lines[0].ends_with('-'));
        assert_eq!(lines[0].chars().count(), 20);
        assert!(lines.iter().all(|l| l.chars().count() <= 20));
        assert_eq!(lines[1], "a".repeat(11));
    }

    #[test]
    fn test_wrap_keeps_newlines() {
        assert_eq!(wrap_text("a\nb", 10), vec!["a", "b"]);
        assert_eq!(wrap_text("", 10), vec![""]);
    }

    #[test]
    fn test_markdown_always_has_rule_after_first_row() {
        let md = AsciiTableRenderer::default().to_markdown(&table(&[&["a", "bb"], &["c", "d"]], false));
        assert_eq!(md, "| a   | bb  |\n| --- | --- |\n| c   | d   |");
    }

    #[test]
    fn test_markdown_flattens_and_truncates() {
        let style = AsciiTableStyle::default().with_max_cell_width(4);
        let md = AsciiTableRenderer::new(style).to_markdown(&table(&[&["ab\ncdef"]], false));
        assert_eq!(md, "| ab c |\n| ---- |");
    }

    #[test]
    fn test_out_of_grid_cell_falls_back() {
        let mut broken = table(&[&["a", "b"], &["c", "d"]], false);
        broken.cells.push(Cell::new("stray", broken.bbox, 5, 0));

        let renderer = AsciiTableRenderer::default();
        assert!(matches!(renderer.try_to_ascii(&broken), Err(Error::Render(_))));
        assert_eq!(renderer.to_ascii(&broken), "a | b\nc | d");
    }

    #[test]
    fn test_empty_table_renders_nothing() {
        let renderer = AsciiTableRenderer::default();
        let empty = table(&[], false);
        assert_eq!(renderer.to_ascii(&empty), "");
        assert_eq!(renderer.to_markdown(&empty), "");
    }
}

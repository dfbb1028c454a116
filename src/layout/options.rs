//! Layout analysis configuration.
//!
//! Every threshold the heuristics use is a named field here. All structs
//! deserialize with `#[serde(default)]`, so a JSON config only needs to
//! name the values it overrides.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::table::{AsciiTableStyle, TableSettings};

/// Thresholds for the alignment merger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MergeConfig {
    /// Vertical overlap, as a fraction of the shorter box, that aligns two boxes
    pub min_overlap_ratio: f32,

    /// Vertical centre distance (points) under which two boxes are aligned
    pub center_tolerance: f32,

    /// Horizontal gap (points) above which merged line texts get a space
    pub word_gap: f32,

    /// Upper bound on merge passes run while looking for a fixpoint
    pub max_passes: usize,
}

impl Default for MergeConfig {
    fn default() -> Self {
        Self {
            min_overlap_ratio: 0.2,
            center_tolerance: 5.0,
            word_gap: 5.0,
            max_passes: 16,
        }
    }
}

/// Thresholds for column detection and region partitioning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnConfig {
    /// Minimum horizontal gap (points) between projected column bands
    pub gap_threshold: f32,

    /// Minimum gutter (points) between the two halves of a two-column page
    pub min_gutter: f32,

    /// Assumed left and right page margin (points) of two-column bands
    pub page_margin: f32,

    /// How far (points) past the centre on both sides a block must reach to span it
    pub spanning_margin: f32,

    /// Centre distance (points) under which a one-line spanning block is a title
    pub title_center_tolerance: f32,

    /// Minimum number of blocks before a two-column split is attempted
    pub min_blocks: usize,

    /// Minimum number of blocks on each side of a two-column split
    pub min_blocks_per_side: usize,
}

impl Default for ColumnConfig {
    fn default() -> Self {
        Self {
            gap_threshold: 20.0,
            min_gutter: 10.0,
            page_margin: 50.0,
            spanning_margin: 30.0,
            title_center_tolerance: 50.0,
            min_blocks: 4,
            min_blocks_per_side: 2,
        }
    }
}

/// Thresholds for paragraph grouping and classification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParagraphConfig {
    /// Minimum horizontal overlap between consecutive blocks
    pub min_horizontal_overlap: f32,

    /// Minimum narrower/wider width ratio between consecutive blocks
    pub min_width_ratio: f32,

    /// Largest vertical gap, in multiples of the font size
    pub max_gap_factor: f32,

    /// Largest left-edge drift, in multiples of the font size
    pub max_indent_factor: f32,

    /// Font size assumed for blocks without usable spans
    pub default_font_size: f32,

    /// Text at least this long is never a heading
    pub heading_max_chars: usize,

    /// Mean font size from which text reads as a heading
    pub heading_min_size: f32,

    /// Margin standard deviation (points) under which an edge counts as aligned
    pub alignment_tolerance: f32,

    /// Pattern that starts a list item
    pub list_marker_pattern: String,
}

impl Default for ParagraphConfig {
    fn default() -> Self {
        Self {
            min_horizontal_overlap: 0.8,
            min_width_ratio: 0.7,
            max_gap_factor: 1.2,
            max_indent_factor: 1.5,
            default_font_size: 12.0,
            heading_max_chars: 100,
            heading_min_size: 14.0,
            alignment_tolerance: 5.0,
            list_marker_pattern: r"^[•\-*\d]+[.)]\s".to_string(),
        }
    }
}

/// Configuration for page layout analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Alignment merger thresholds
    pub merge: MergeConfig,

    /// Column detection thresholds
    pub columns: ColumnConfig,

    /// Paragraph reconstruction thresholds
    pub paragraphs: ParagraphConfig,

    /// Table validation thresholds
    pub tables: TableSettings,

    /// ASCII table rendering style
    pub ascii: AsciiTableStyle,

    /// Height (points) of the band at the top of the page holding the header
    pub header_margin: f32,

    /// Height (points) of the band at the bottom of the page holding the footer
    pub footer_margin: f32,

    /// Whether to ask the table finder for tables
    pub detect_tables: bool,

    /// Whether to run the alignment merger before analysis
    pub merge_close_blocks: bool,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            merge: MergeConfig::default(),
            columns: ColumnConfig::default(),
            paragraphs: ParagraphConfig::default(),
            tables: TableSettings::default(),
            ascii: AsciiTableStyle::default(),
            header_margin: 72.0,
            footer_margin: 72.0,
            detect_tables: true,
            merge_close_blocks: true,
        }
    }
}

impl LayoutConfig {
    /// Create a config with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a config from JSON; missing fields keep their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Set the header and footer band heights.
    pub fn with_margins(mut self, header: f32, footer: f32) -> Self {
        self.header_margin = header;
        self.footer_margin = footer;
        self
    }

    /// Enable or disable table detection.
    pub fn with_tables(mut self, detect: bool) -> Self {
        self.detect_tables = detect;
        self
    }

    /// Disable table detection.
    pub fn without_tables(mut self) -> Self {
        self.detect_tables = false;
        self
    }

    /// Enable or disable the alignment merger.
    pub fn with_merge(mut self, merge: bool) -> Self {
        self.merge_close_blocks = merge;
        self
    }

    /// Set column thresholds.
    pub fn with_columns(mut self, columns: ColumnConfig) -> Self {
        self.columns = columns;
        self
    }

    /// Set paragraph thresholds.
    pub fn with_paragraphs(mut self, paragraphs: ParagraphConfig) -> Self {
        self.paragraphs = paragraphs;
        self
    }

    /// Set table validation thresholds.
    pub fn with_table_settings(mut self, tables: TableSettings) -> Self {
        self.tables = tables;
        self
    }

    /// Set the ASCII table style.
    pub fn with_ascii_style(mut self, ascii: AsciiTableStyle) -> Self {
        self.ascii = ascii;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_config_builder() {
        let config = LayoutConfig::new()
            .with_margins(50.0, 40.0)
            .without_tables()
            .with_merge(false);

        assert_eq!(config.header_margin, 50.0);
        assert_eq!(config.footer_margin, 40.0);
        assert!(!config.detect_tables);
        assert!(!config.merge_close_blocks);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = LayoutConfig::from_json(
            r#"{"header_margin": 36, "columns": {"gap_threshold": 30}, "ascii": {"corner": "*"}}"#,
        )
        .unwrap();

        assert_eq!(config.header_margin, 36.0);
        assert_eq!(config.footer_margin, 72.0);
        assert_eq!(config.columns.gap_threshold, 30.0);
        assert_eq!(config.columns.min_gutter, 10.0);
        assert_eq!(config.ascii.corner, '*');
        assert_eq!(config.ascii.horizontal, '-');
        assert_eq!(config.paragraphs, ParagraphConfig::default());
    }

    #[test]
    fn test_rejects_malformed_json() {
        assert!(LayoutConfig::from_json("{not json").is_err());
    }
}

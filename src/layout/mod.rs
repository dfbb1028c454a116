//! Layout reconstruction: merging, columns, paragraphs and page assembly.

pub mod analyzer;
pub mod columns;
pub mod margins;
pub mod merge;
pub mod options;
pub mod paragraphs;

pub use analyzer::{sort_reading_order, LayoutAnalyzer};
pub use columns::{partition_regions, DetectedColumn, Regions};
pub use margins::MarginSplit;
pub use merge::{merge_blocks, vertically_overlaps, Positioned};
pub use options::{ColumnConfig, LayoutConfig, MergeConfig, ParagraphConfig};
pub use paragraphs::{BlockFeatures, ParagraphReconstructor};

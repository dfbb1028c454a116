//! Data model for layout reconstruction.
//!
//! Fragments ([`Span`], [`Line`], [`RawBlock`]) are the input of the
//! analysis; [`StructuredDocument`] and everything it contains are
//! immutable value objects handed to the caller.

mod block;
mod document;
mod fragment;
mod geometry;
mod page;
mod table;

pub use block::{Alignment, BlockType, Column, TextBlock};
pub use document::{StructuredDocument, BANNER_WIDTH};
pub(crate) use document::page_banner;
pub use fragment::{FontInfo, Line, RawBlock, Rgb, Span, SPAN_SPACE_RATIO};
pub(crate) use fragment::is_all_caps;
pub use geometry::BoundingBox;
pub use page::StructuredPage;
pub use table::{Cell, Table};

#[cfg(test)]
pub(crate) use fragment::test_support;

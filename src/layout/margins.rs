//! Running header and footer separation.

use crate::model::RawBlock;

/// Blocks split into running header, running footer and body content.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MarginSplit {
    /// Text of the blocks in the header band, space-joined
    pub header: String,
    /// Text of the blocks in the footer band, space-joined
    pub footer: String,
    /// Everything else, in input order
    pub content: Vec<RawBlock>,
}

/// Separate header and footer blocks from body content.
///
/// A block whose top edge is inside the top `header_margin` points is part
/// of the header; otherwise a block whose bottom edge is inside the bottom
/// `footer_margin` points is part of the footer.
pub fn split(
    blocks: Vec<RawBlock>,
    page_height: f32,
    header_margin: f32,
    footer_margin: f32,
) -> MarginSplit {
    let mut header = Vec::new();
    let mut footer = Vec::new();
    let mut content = Vec::with_capacity(blocks.len());

    for block in blocks {
        if block.bbox.y1() > page_height - header_margin {
            header.push(block.text());
        } else if block.bbox.y0() < footer_margin {
            footer.push(block.text());
        } else {
            content.push(block);
        }
    }

    MarginSplit {
        header: header.join(" ").trim().to_string(),
        footer: footer.join(" ").trim().to_string(),
        content,
    }
}

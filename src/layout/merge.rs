//! Alignment merger.
//!
//! Extraction often splits one visual row (a table row, a heading set in
//! two fonts) into several blocks that sit side by side. This pass folds
//! vertically aligned neighbours back together, first the lines inside each
//! block and then the blocks of each page region.

use super::columns::partition_regions;
use super::options::{ColumnConfig, MergeConfig};
use crate::error::Result;
use crate::model::{BoundingBox, Line, RawBlock};

/// Anything with a position on the page.
pub trait Positioned {
    /// The item's bounding box.
    fn bbox(&self) -> &BoundingBox;
}

impl Positioned for Line {
    fn bbox(&self) -> &BoundingBox {
        &self.bbox
    }
}

impl Positioned for RawBlock {
    fn bbox(&self) -> &BoundingBox {
        &self.bbox
    }
}

/// Check whether two boxes sit on the same visual row.
pub fn vertically_overlaps(a: &BoundingBox, b: &BoundingBox, config: &MergeConfig) -> bool {
    let min_height = a.height().min(b.height());
    if min_height <= 0.0 {
        return false;
    }
    if a.vertical_overlap(b) > min_height * config.min_overlap_ratio {
        return true;
    }
    (a.center_y() - b.center_y()).abs() < config.center_tolerance
}

/// Sort items top-first and fold runs of vertically overlapping neighbours.
///
/// Each run of two or more items is handed to `combine`; single items pass
/// through untouched.
pub fn merge_by_vertical_overlap<T, F>(mut items: Vec<T>, config: &MergeConfig, mut combine: F) -> Vec<T>
where
    T: Positioned,
    F: FnMut(Vec<T>) -> T,
{
    items.sort_by(|a, b| b.bbox().y1().total_cmp(&a.bbox().y1()));

    let mut merged = Vec::with_capacity(items.len());
    let mut group: Vec<T> = Vec::new();

    for item in items {
        let aligned = group
            .last()
            .map_or(true, |last| vertically_overlaps(last.bbox(), item.bbox(), config));
        if !aligned {
            merged.extend(flush(std::mem::take(&mut group), &mut combine));
        }
        group.push(item);
    }
    merged.extend(flush(group, &mut combine));

    merged
}

fn flush<T, F: FnMut(Vec<T>) -> T>(mut group: Vec<T>, combine: &mut F) -> Option<T> {
    if group.len() > 1 {
        Some(combine(group))
    } else {
        group.pop()
    }
}

/// Merge vertically aligned lines into single lines.
pub fn merge_lines(lines: Vec<Line>, config: &MergeConfig) -> Vec<Line> {
    merge_by_vertical_overlap(lines, config, |group| combine_lines(group, config))
}

/// Join side-by-side lines left to right, with a space across wide gaps.
fn combine_lines(mut lines: Vec<Line>, config: &MergeConfig) -> Line {
    lines.sort_by(|a, b| a.bbox.x0().total_cmp(&b.bbox.x0()));

    let mut bbox = lines[0].bbox;
    let mut text = String::new();
    let mut spans = Vec::new();
    let mut last_x1: Option<f32> = None;

    for line in lines {
        bbox = bbox.union(&line.bbox);
        if let Some(x1) = last_x1 {
            if line.bbox.x0() - x1 > config.word_gap {
                text.push(' ');
            }
        }
        text.push_str(&line.text);
        last_x1 = Some(line.bbox.x1());
        spans.extend(line.spans);
    }

    Line { bbox, text, spans }
}

/// Union a group of blocks into one, re-merging their lines.
fn combine_blocks(mut blocks: Vec<RawBlock>, config: &MergeConfig) -> RawBlock {
    blocks.sort_by(|a, b| a.bbox.x0().total_cmp(&b.bbox.x0()));

    let mut bbox = blocks[0].bbox;
    let mut lines = Vec::new();
    for block in blocks {
        bbox = bbox.union(&block.bbox);
        lines.extend(block.lines);
    }

    RawBlock::new(bbox, merge_lines(lines, config))
}

/// Merge the blocks of one region: lines within blocks, then the blocks.
pub fn merge_region(blocks: Vec<RawBlock>, config: &MergeConfig) -> Vec<RawBlock> {
    let blocks = blocks
        .into_iter()
        .map(|block| {
            if block.lines.len() > 1 {
                let line_count = block.lines.len();
                let lines = merge_lines(block.lines.clone(), config);
                if lines.len() < line_count {
                    return RawBlock::new(block.bbox, lines);
                }
            }
            block
        })
        .collect();

    merge_by_vertical_overlap(blocks, config, |group| combine_blocks(group, config))
}

/// Merge a page's blocks.
///
/// Blocks are partitioned into centre, left and right regions around the
/// page centre, each region is merged on its own, and the result is the
/// centre region followed by the left and the right. The whole pass is
/// repeated until it changes nothing, so merging merged output is a no-op.
pub fn merge_blocks(
    blocks: Vec<RawBlock>,
    page_width: f32,
    merge: &MergeConfig,
    columns: &ColumnConfig,
) -> Result<Vec<RawBlock>> {
    let boundary = page_width / 2.0;
    let mut current = blocks;

    for pass in 0..merge.max_passes.max(1) {
        let regions = partition_regions(current.clone(), boundary, columns)?;

        let mut next = merge_region(regions.center, merge);
        next.extend(merge_region(regions.left, merge));
        next.extend(merge_region(regions.right, merge));

        if next == current {
            log::debug!("Merge reached a fixpoint after {} passes", pass + 1);
            return Ok(next);
        }
        current = next;
    }

    log::debug!("Merge stopped after {} passes", merge.max_passes);
    Ok(current)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::test_support::{block, span};

    fn config() -> MergeConfig {
        MergeConfig::default()
    }

    fn bbox(x0: f32, y0: f32, x1: f32, y1: f32) -> BoundingBox {
        BoundingBox::new(x0, y0, x1, y1).unwrap()
    }

    #[test]
    fn test_vertically_overlaps() {
        let c = config();
        // 5pt shared out of 10pt
        assert!(vertically_overlaps(&bbox(0.0, 0.0, 10.0, 10.0), &bbox(20.0, 5.0, 30.0, 15.0), &c));
        // 1pt shared out of 10pt, centres 9pt apart
        assert!(!vertically_overlaps(&bbox(0.0, 0.0, 10.0, 10.0), &bbox(20.0, 9.0, 30.0, 19.0), &c));
        // no overlap but centres 4pt apart
        assert!(vertically_overlaps(&bbox(0.0, 0.0, 10.0, 2.0), &bbox(20.0, 3.0, 30.0, 7.0), &c));
        // zero height never aligns
        assert!(!vertically_overlaps(&bbox(0.0, 5.0, 10.0, 5.0), &bbox(0.0, 0.0, 10.0, 10.0), &c));
    }

    #[test]
    fn test_split_row_merges_left_to_right() {
        let blocks = vec![
            block("$10.00", 300.0, 700.0, 340.0, 712.0, 10.0),
            block("Widget A", 72.0, 700.0, 130.0, 712.0, 10.0),
            block("100", 200.0, 701.0, 220.0, 713.0, 10.0),
            block("Next row", 72.0, 680.0, 130.0, 692.0, 10.0),
        ];
        let merged = merge_region(blocks, &config());

        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].text(), "Widget A 100 $10.00");
        assert_eq!(merged[0].bbox, bbox(72.0, 700.0, 340.0, 713.0));
        assert_eq!(merged[0].span_count(), 3);
        assert_eq!(merged[1].text(), "Next row");
    }

    #[test]
    fn test_close_fragments_join_without_space() {
        let lines = vec![
            Line::from_spans(bbox(72.0, 700.0, 100.0, 712.0), vec![span("Hyph", 72.0, 700.0, 100.0, 712.0, 10.0)]),
            Line::from_spans(bbox(102.0, 700.0, 130.0, 712.0), vec![span("enated", 102.0, 700.0, 130.0, 712.0, 10.0)]),
        ];
        let merged = merge_lines(lines, &config());
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].text, "Hyphenated");
    }

    #[test]
    fn test_regions_keep_columns_apart() {
        let blocks = vec![
            block("left column", 72.0, 700.0, 290.0, 712.0, 10.0),
            block("right column", 322.0, 700.0, 540.0, 712.0, 10.0),
            block("Title Across", 200.0, 740.0, 412.0, 760.0, 18.0),
        ];
        let merged = merge_blocks(blocks, 612.0, &config(), &ColumnConfig::default()).unwrap();

        let texts: Vec<String> = merged.iter().map(RawBlock::text).collect();
        assert_eq!(texts, vec!["Title Across", "left column", "right column"]);
    }

    #[test]
    fn test_merge_is_idempotent() {
        let blocks = vec![
            block("Name", 72.0, 700.0, 110.0, 712.0, 10.0),
            block("Qty", 200.0, 700.0, 230.0, 712.0, 10.0),
            block("Body text line", 72.0, 650.0, 290.0, 662.0, 10.0),
            block("Other column", 330.0, 652.0, 540.0, 664.0, 10.0),
            block("Heading", 250.0, 760.0, 362.0, 780.0, 16.0),
            block("below", 330.0, 600.0, 380.0, 612.0, 10.0),
        ];
        let once = merge_blocks(blocks, 612.0, &config(), &ColumnConfig::default()).unwrap();
        let twice = merge_blocks(once.clone(), 612.0, &config(), &ColumnConfig::default()).unwrap();

        assert_eq!(once, twice);
        assert!(once.len() <= 6);
    }

    #[test]
    fn test_merge_preserves_text() {
        let blocks = vec![
            block("alpha", 72.0, 700.0, 110.0, 712.0, 10.0),
            block("beta", 150.0, 700.0, 190.0, 712.0, 10.0),
            block("gamma", 72.0, 600.0, 110.0, 612.0, 10.0),
        ];
        let merged = merge_blocks(blocks, 612.0, &config(), &ColumnConfig::default()).unwrap();

        let all: String = merged.iter().map(RawBlock::text).collect::<Vec<_>>().join(" ");
        for word in ["alpha", "beta", "gamma"] {
            assert!(all.contains(word));
        }
        assert_eq!(merged.len(), 2);
    }

    #[test]
    fn test_empty_input() {
        assert!(merge_blocks(Vec::new(), 612.0, &config(), &ColumnConfig::default())
            .unwrap()
            .is_empty());
    }
}

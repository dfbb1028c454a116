//! Column detection.
//!
//! Two strategies run in order. The centre split handles the common
//! two-column article layout; gap projection handles everything else by
//! projecting blocks onto the x-axis and cutting at wide empty bands.

use super::options::ColumnConfig;
use crate::error::{Error, Result};
use crate::model::{BoundingBox, Line, RawBlock, Span};

/// A column region with the raw blocks assigned to it.
#[derive(Debug, Clone, PartialEq)]
pub struct DetectedColumn {
    /// Region covered by the column
    pub bbox: BoundingBox,
    /// Position from the left, contiguous from 0
    pub index: usize,
    /// Blocks assigned to the column
    pub blocks: Vec<RawBlock>,
}

/// Blocks partitioned around a vertical boundary.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Regions {
    /// Blocks kept whole across the boundary (titles, banners)
    pub center: Vec<RawBlock>,
    /// Blocks left of the boundary
    pub left: Vec<RawBlock>,
    /// Blocks right of the boundary
    pub right: Vec<RawBlock>,
}

/// Check whether a box reaches past `boundary` by more than `margin` on both sides.
pub fn spans_boundary(bbox: &BoundingBox, boundary: f32, margin: f32) -> bool {
    bbox.x0() < boundary - margin && bbox.x1() > boundary + margin
}

/// Partition blocks into centre, left and right regions around `boundary`.
///
/// A block reaching across the boundary stays whole in the centre region
/// when it is a single line centred near the boundary, or when its spans
/// all sit on one side. Otherwise it is cut at span level into a left and
/// a right part, each line keeping its vertical extent.
pub fn partition_regions(
    blocks: Vec<RawBlock>,
    boundary: f32,
    config: &ColumnConfig,
) -> Result<Regions> {
    let mut regions = Regions::default();

    for block in blocks {
        if spans_boundary(&block.bbox, boundary, config.spanning_margin) {
            if should_split(&block, boundary, config) {
                let (left, right) = split_block(&block, boundary)?;
                regions.left.extend(left);
                regions.right.extend(right);
            } else {
                regions.center.push(block);
            }
        } else if block.bbox.center_x() < boundary {
            regions.left.push(block);
        } else {
            regions.right.push(block);
        }
    }

    Ok(regions)
}

fn should_split(block: &RawBlock, boundary: f32, config: &ColumnConfig) -> bool {
    if block.lines.len() <= 1
        && (block.bbox.center_x() - boundary).abs() < config.title_center_tolerance
    {
        return false;
    }

    let mut has_left = false;
    let mut has_right = false;
    for span in block.spans() {
        if span.bbox.center_x() < boundary {
            has_left = true;
        } else {
            has_right = true;
        }
        if has_left && has_right {
            return true;
        }
    }
    false
}

fn split_block(block: &RawBlock, boundary: f32) -> Result<(Option<RawBlock>, Option<RawBlock>)> {
    let mut left_lines = Vec::new();
    let mut right_lines = Vec::new();

    for line in &block.lines {
        let (left, right): (Vec<Span>, Vec<Span>) = line
            .spans
            .iter()
            .cloned()
            .partition(|s| s.bbox.center_x() < boundary);

        if let Some(part) = line_part(line, left)? {
            left_lines.push(part);
        }
        if let Some(part) = line_part(line, right)? {
            right_lines.push(part);
        }
    }

    Ok((block_part(left_lines), block_part(right_lines)))
}

/// The spans of one side of a line, spanning the line's full height.
fn line_part(line: &Line, spans: Vec<Span>) -> Result<Option<Line>> {
    let Some(extent) = BoundingBox::enclosing(spans.iter().map(|s| &s.bbox)) else {
        return Ok(None);
    };
    let bbox = BoundingBox::new(extent.x0(), line.bbox.y0(), extent.x1(), line.bbox.y1())?;
    let text = spans
        .iter()
        .map(|s| s.text.as_str())
        .collect::<Vec<_>>()
        .join(" ");
    Ok(Some(Line { bbox, text, spans }))
}

fn block_part(lines: Vec<Line>) -> Option<RawBlock> {
    let bbox = BoundingBox::enclosing(lines.iter().map(|l| &l.bbox))?;
    Some(RawBlock::new(bbox, lines))
}

/// Detect the column regions of a page.
///
/// Returns an empty list for single-column pages. Column indices are
/// contiguous from 0, left to right. Fails with [`Error::ColumnDetection`]
/// when a region would have an impossible geometry, for instance a page
/// too narrow for its margins.
pub fn detect(
    blocks: &[RawBlock],
    page_width: f32,
    config: &ColumnConfig,
) -> Result<Vec<DetectedColumn>> {
    if blocks.is_empty() {
        return Ok(Vec::new());
    }

    if let Some(columns) = detect_two_columns(blocks, page_width, config)? {
        log::debug!("Detected 2 columns by centre split");
        return Ok(columns);
    }

    let gaps = find_gaps(blocks, config.gap_threshold);
    if gaps.is_empty() {
        log::debug!("No column gaps found, single column layout");
        return Ok(Vec::new());
    }

    let columns = columns_from_gaps(&gaps, blocks, page_width)?;
    if columns.len() <= 1 {
        return Ok(Vec::new());
    }

    log::debug!("Detected {} columns by gap projection", columns.len());
    Ok(columns)
}

/// Estimate how many columns a page has from a quick centre count.
pub fn estimate_column_count(blocks: &[RawBlock], page_width: f32, config: &ColumnConfig) -> usize {
    let center = page_width / 2.0;
    let left = blocks
        .iter()
        .filter(|b| b.bbox.center_x() < center)
        .count();
    let right = blocks.len() - left;

    if left >= config.min_blocks_per_side && right >= config.min_blocks_per_side {
        2
    } else {
        1
    }
}

fn detect_two_columns(
    blocks: &[RawBlock],
    page_width: f32,
    config: &ColumnConfig,
) -> Result<Option<Vec<DetectedColumn>>> {
    if blocks.len() < config.min_blocks {
        return Ok(None);
    }

    let center = page_width / 2.0;
    let mut spanning = Vec::new();
    let mut left = Vec::new();
    let mut right = Vec::new();

    for block in blocks {
        if spans_boundary(&block.bbox, center, config.spanning_margin) {
            spanning.push(block.clone());
        } else if block.bbox.center_x() < center {
            left.push(block.clone());
        } else {
            right.push(block.clone());
        }
    }

    if left.len() < config.min_blocks_per_side || right.len() < config.min_blocks_per_side {
        return Ok(None);
    }

    let left_edge = left.iter().map(|b| b.bbox.x1()).fold(f32::MIN, f32::max);
    let right_edge = right.iter().map(|b| b.bbox.x0()).fold(f32::MAX, f32::min);
    if right_edge - left_edge < config.min_gutter {
        return Ok(None);
    }

    let half_gap = config.gap_threshold / 2.0;
    let left_bbox = band(config.page_margin, center - half_gap, &left)?;
    let right_bbox = band(center + half_gap, page_width - config.page_margin, &right)?;

    spanning.extend(left);
    Ok(Some(vec![
        DetectedColumn {
            bbox: left_bbox,
            index: 0,
            blocks: spanning,
        },
        DetectedColumn {
            bbox: right_bbox,
            index: 1,
            blocks: right,
        },
    ]))
}

/// A column box from `x0` to `x1` covering the vertical extent of `blocks`.
fn band(x0: f32, x1: f32, blocks: &[RawBlock]) -> Result<BoundingBox> {
    let extent = BoundingBox::enclosing(blocks.iter().map(|b| &b.bbox))
        .ok_or_else(|| Error::ColumnDetection("column without blocks".into()))?;
    BoundingBox::new(x0, extent.y0(), x1, extent.y1())
        .map_err(|e| Error::ColumnDetection(format!("invalid column band: {}", e)))
}

/// Empty x-ranges at least `threshold` wide between the blocks' projections.
fn find_gaps(blocks: &[RawBlock], threshold: f32) -> Vec<(f32, f32)> {
    let mut coverage: Vec<(f32, f32)> = blocks.iter().map(|b| (b.bbox.x0(), b.bbox.x1())).collect();
    coverage.sort_by(|a, b| a.0.total_cmp(&b.0));

    let mut merged: Vec<(f32, f32)> = Vec::with_capacity(coverage.len());
    for (start, end) in coverage {
        match merged.last_mut() {
            Some(last) if start <= last.1 + threshold => last.1 = last.1.max(end),
            _ => merged.push((start, end)),
        }
    }

    merged
        .windows(2)
        .map(|pair| (pair[0].1, pair[1].0))
        .filter(|(start, end)| end - start >= threshold)
        .collect()
}

fn columns_from_gaps(
    gaps: &[(f32, f32)],
    blocks: &[RawBlock],
    page_width: f32,
) -> Result<Vec<DetectedColumn>> {
    let (Some(first), Some(last)) = (gaps.first(), gaps.last()) else {
        return Ok(Vec::new());
    };

    let mut boundaries = vec![(0.0, first.0)];
    boundaries.extend(gaps.windows(2).map(|pair| (pair[0].1, pair[1].0)));
    boundaries.push((last.1, page_width));

    let mut columns = Vec::with_capacity(boundaries.len());
    for (left, right) in boundaries {
        let members: Vec<RawBlock> = blocks
            .iter()
            .filter(|b| (left..=right).contains(&b.bbox.center_x()))
            .cloned()
            .collect();
        if members.is_empty() {
            continue;
        }

        columns.push(DetectedColumn {
            bbox: band(left, right, &members)?,
            index: columns.len(),
            blocks: members,
        });
    }
    Ok(columns)
}

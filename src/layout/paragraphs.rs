//! Paragraph reconstruction.
//!
//! Within a column, consecutive merged blocks are grouped into paragraphs
//! when they line up and sit close together. Each group becomes one
//! [`TextBlock`] with its type, alignment, indentation and line spacing.

use regex::Regex;

use super::options::ParagraphConfig;
use crate::error::{Error, Result};
use crate::model::{is_all_caps, Alignment, BlockType, BoundingBox, RawBlock, TextBlock};

/// The inputs block classification looks at.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlockFeatures<'a> {
    /// Assembled text of the block
    pub text: &'a str,
    /// Mean font size over all spans, `None` without spans
    pub mean_font_size: Option<f32>,
    /// Whether any span is bold
    pub any_bold: bool,
}

/// Groups raw blocks into paragraphs and classifies them.
#[derive(Debug, Clone)]
pub struct ParagraphReconstructor {
    config: ParagraphConfig,
    list_marker: Regex,
}

impl ParagraphReconstructor {
    /// Create a reconstructor; fails if the list marker pattern is invalid.
    pub fn new(config: ParagraphConfig) -> Result<Self> {
        let list_marker = Regex::new(&config.list_marker_pattern)
            .map_err(|e| Error::InvalidConfig(format!("invalid list marker pattern: {}", e)))?;
        Ok(Self {
            config,
            list_marker,
        })
    }

    /// The active configuration.
    pub fn config(&self) -> &ParagraphConfig {
        &self.config
    }

    /// Rebuild the paragraphs of one column, top to bottom.
    ///
    /// Groups without spans or with blank text are dropped.
    pub fn reconstruct(&self, mut blocks: Vec<RawBlock>, column_index: usize) -> Vec<TextBlock> {
        blocks.sort_by(|a, b| b.bbox.y1().total_cmp(&a.bbox.y1()));

        let mut groups: Vec<Vec<RawBlock>> = Vec::new();
        for block in blocks {
            match groups.last_mut() {
                Some(group) if group.last().is_some_and(|prev| self.should_merge(prev, &block)) => {
                    group.push(block)
                }
                _ => groups.push(vec![block]),
            }
        }

        groups
            .iter()
            .filter_map(|group| self.build_block(group, column_index))
            .collect()
    }

    /// Decide whether `curr` continues the paragraph ending in `prev`.
    ///
    /// All of these must hold: the boxes overlap horizontally by at least
    /// 80% of the narrower one; their widths are within a 0.7 ratio; `curr`
    /// starts below `prev` within 1.2 font sizes; their left edges are
    /// within 1.5 font sizes. The font size is `prev`'s mean span size.
    pub fn should_merge(&self, prev: &RawBlock, curr: &RawBlock) -> bool {
        let c = &self.config;

        if prev.bbox.horizontal_overlap(&curr.bbox) < c.min_horizontal_overlap {
            return false;
        }

        let (prev_width, curr_width) = (prev.bbox.width(), curr.bbox.width());
        if prev_width > 0.0 && curr_width > 0.0 {
            let ratio = prev_width.min(curr_width) / prev_width.max(curr_width);
            if ratio < c.min_width_ratio {
                return false;
            }
        }

        let font_size = prev.mean_font_size().unwrap_or(c.default_font_size);
        let gap = prev.bbox.y0() - curr.bbox.y1();
        if gap < 0.0 || gap > font_size * c.max_gap_factor {
            return false;
        }

        (prev.bbox.x0() - curr.bbox.x0()).abs() <= font_size * c.max_indent_factor
    }

    /// Classify a block from its features.
    ///
    /// Short text that is bold, large or all caps is a heading; text that
    /// starts with a list marker is a list item; the rest are paragraphs.
    pub fn classify(&self, features: &BlockFeatures<'_>) -> BlockType {
        let Some(mean_size) = features.mean_font_size else {
            return BlockType::Unknown;
        };

        let text = features.text.trim();
        let length = text.chars().count();
        let is_short = length < self.config.heading_max_chars;
        let all_caps = is_all_caps(text) && length > 3;
        let large = mean_size >= self.config.heading_min_size;

        if is_short && (features.any_bold || large || all_caps) {
            BlockType::Heading
        } else if self.list_marker.is_match(text) {
            BlockType::ListItem
        } else {
            BlockType::Paragraph
        }
    }

    fn build_block(&self, group: &[RawBlock], column_index: usize) -> Option<TextBlock> {
        let spans: Vec<_> = group.iter().flat_map(RawBlock::spans).cloned().collect();
        if spans.is_empty() {
            return None;
        }

        let text = assemble_text(group);
        if text.trim().is_empty() {
            return None;
        }

        let bbox = BoundingBox::enclosing(group.iter().map(|b| &b.bbox))?;
        let mean_font_size = Some(spans.iter().map(|s| s.font.size).sum::<f32>() / spans.len() as f32);
        let block_type = self.classify(&BlockFeatures {
            text: &text,
            mean_font_size,
            any_bold: spans.iter().any(|s| s.font.bold),
        });

        let indentation = match group {
            [first, _, ..] => (first.bbox.x0() - bbox.x0()).max(0.0),
            _ => 0.0,
        };

        Some(TextBlock {
            text,
            bbox,
            block_type,
            spans,
            alignment: detect_alignment(group, &bbox, self.config.alignment_tolerance),
            indentation,
            line_spacing: line_spacing(group),
            column_index,
        })
    }
}

/// Join the lines of a paragraph's blocks into one string.
///
/// Lines are trimmed and joined by single spaces. A line ending in `-` is
/// treated as a hyphenated break: the hyphen is dropped and the next line
/// is appended directly.
pub fn assemble_text(blocks: &[RawBlock]) -> String {
    let mut text = String::new();
    let lines = blocks
        .iter()
        .flat_map(|b| b.lines.iter())
        .map(|l| l.text.trim())
        .filter(|t| !t.is_empty());

    for line in lines {
        if text.is_empty() {
            text.push_str(line);
        } else if text.ends_with('-') {
            text.pop();
            text.push_str(line);
        } else {
            text.push(' ');
            text.push_str(line);
        }
    }
    text
}

/// Infer alignment from how much the blocks' left and right margins vary
/// inside `container`.
pub fn detect_alignment(blocks: &[RawBlock], container: &BoundingBox, tolerance: f32) -> Alignment {
    if blocks.len() < 2 {
        return Alignment::Left;
    }

    let left: Vec<f32> = blocks.iter().map(|b| b.bbox.x0() - container.x0()).collect();
    let right: Vec<f32> = blocks.iter().map(|b| container.x1() - b.bbox.x1()).collect();
    let left_aligned = std_dev(&left) < tolerance;
    let right_aligned = std_dev(&right) < tolerance;

    match (left_aligned, right_aligned) {
        (true, true) => Alignment::Justify,
        (false, true) => Alignment::Right,
        _ => Alignment::Left,
    }
}

fn std_dev(values: &[f32]) -> f32 {
    if values.len() < 2 {
        return 0.0;
    }
    let n = values.len() as f32;
    let mean = values.iter().sum::<f32>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f32>() / n;
    variance.sqrt()
}

/// Mean of the positive vertical gaps between consecutive blocks.
fn line_spacing(blocks: &[RawBlock]) -> f32 {
    let mut sorted: Vec<&RawBlock> = blocks.iter().collect();
    sorted.sort_by(|a, b| b.bbox.y1().total_cmp(&a.bbox.y1()));

    let gaps: Vec<f32> = sorted
        .windows(2)
        .map(|pair| pair[0].bbox.y0() - pair[1].bbox.y1())
        .filter(|gap| *gap > 0.0)
        .collect();

    if gaps.is_empty() {
        0.0
    } else {
        gaps.iter().sum::<f32>() / gaps.len() as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::test_support::{block, span};
    use crate::model::{FontInfo, Line, Span};

    fn reconstructor() -> ParagraphReconstructor {
        ParagraphReconstructor::new(ParagraphConfig::default()).unwrap()
    }

    fn features(text: &str, size: f32, bold: bool) -> BlockFeatures<'_> {
        BlockFeatures {
            text,
            mean_font_size: Some(size),
            any_bold: bold,
        }
    }

    #[test]
    fn test_should_merge_overlap_boundary() {
        let r = reconstructor();
        let prev = block("prev", 0.0, 100.0, 100.0, 120.0, 20.0);
        // 80 of 100 points shared
        let curr = block("curr", 20.0, 80.0, 120.0, 100.0, 20.0);
        assert!(r.should_merge(&prev, &curr));

        let shifted = block("curr", 21.0, 80.0, 121.0, 100.0, 20.0);
        assert!(!r.should_merge(&prev, &shifted));
    }

    #[test]
    fn test_should_merge_width_ratio() {
        let r = reconstructor();
        let prev = block("prev", 0.0, 100.0, 100.0, 112.0, 12.0);
        assert!(r.should_merge(&prev, &block("curr", 0.0, 88.0, 70.0, 100.0, 12.0)));
        assert!(!r.should_merge(&prev, &block("curr", 0.0, 88.0, 69.0, 100.0, 12.0)));
    }

    #[test]
    fn test_should_merge_vertical_gap() {
        let r = reconstructor();
        let prev = block("prev", 0.0, 100.0, 100.0, 110.0, 10.0);
        // 1.2 x 10pt = 12pt allowed
        assert!(r.should_merge(&prev, &block("curr", 0.0, 78.0, 100.0, 88.0, 10.0)));
        assert!(!r.should_merge(&prev, &block("curr", 0.0, 77.9, 100.0, 87.9, 10.0)));
        // curr above prev's bottom
        assert!(!r.should_merge(&prev, &block("curr", 0.0, 95.0, 100.0, 105.0, 10.0)));
    }

    #[test]
    fn test_should_merge_indent_drift() {
        let r = reconstructor();
        let prev = block("prev", 0.0, 100.0, 200.0, 110.0, 10.0);
        assert!(r.should_merge(&prev, &block("curr", 15.0, 90.0, 200.0, 100.0, 10.0)));
        assert!(!r.should_merge(&prev, &block("curr", 16.0, 90.0, 200.0, 100.0, 10.0)));
    }

    #[test]
    fn test_assemble_text_repairs_hyphens() {
        let blocks = vec![
            block("The recon-", 0.0, 100.0, 100.0, 110.0, 10.0),
            block("struction of", 0.0, 88.0, 100.0, 98.0, 10.0),
            block("  text  ", 0.0, 76.0, 100.0, 86.0, 10.0),
        ];
        assert_eq!(assemble_text(&blocks), "The reconstruction of text");
    }

    #[test]
    fn test_classify() {
        let r = reconstructor();
        assert_eq!(r.classify(&features("Introduction", 11.0, true)), BlockType::Heading);
        assert_eq!(r.classify(&features("Results", 14.0, false)), BlockType::Heading);
        assert_eq!(r.classify(&features("METHODS", 10.0, false)), BlockType::Heading);
        assert_eq!(r.classify(&features("1. First step", 10.0, false)), BlockType::ListItem);
        assert_eq!(r.classify(&features("- dash item", 10.0, false)), BlockType::Paragraph);
        assert_eq!(r.classify(&features("Plain body text.", 10.0, false)), BlockType::Paragraph);
        assert_eq!(
            r.classify(&BlockFeatures {
                text: "anything",
                mean_font_size: None,
                any_bold: true,
            }),
            BlockType::Unknown
        );
    }

    #[test]
    fn test_long_bold_text_is_not_a_heading() {
        let long = "word ".repeat(30);
        assert_eq!(reconstructor().classify(&features(&long, 16.0, true)), BlockType::Paragraph);
    }

    #[test]
    fn test_reconstruct_groups_and_measures() {
        let r = reconstructor();
        let blocks = vec![
            block("second line of the para-", 72.0, 688.0, 300.0, 698.0, 10.0),
            block("First line of", 85.0, 700.0, 300.0, 710.0, 10.0),
            block("graph ends here.", 72.0, 676.0, 300.0, 686.0, 10.0),
            block("A new paragraph", 72.0, 620.0, 300.0, 630.0, 10.0),
        ];
        let paragraphs = r.reconstruct(blocks, 1);

        assert_eq!(paragraphs.len(), 2);
        let first = &paragraphs[0];
        assert_eq!(first.text, "First line of second line of the paragraph ends here.");
        assert_eq!(first.block_type, BlockType::Paragraph);
        assert_eq!(first.bbox, BoundingBox::new(72.0, 676.0, 300.0, 710.0).unwrap());
        assert_eq!(first.indentation, 13.0);
        assert_eq!(first.line_spacing, 2.0);
        assert_eq!(first.alignment, Alignment::Right);
        assert_eq!(first.column_index, 1);
        assert_eq!(first.spans.len(), 3);

        assert_eq!(paragraphs[1].text, "A new paragraph");
        assert_eq!(paragraphs[1].indentation, 0.0);
        assert_eq!(paragraphs[1].line_spacing, 0.0);
    }

    #[test]
    fn test_justified_block() {
        let blocks = vec![
            block("line one", 72.0, 700.0, 300.0, 710.0, 10.0),
            block("line two", 72.0, 688.0, 300.0, 698.0, 10.0),
        ];
        let bbox = BoundingBox::new(72.0, 688.0, 300.0, 710.0).unwrap();
        assert_eq!(detect_alignment(&blocks, &bbox, 5.0), Alignment::Justify);
        assert_eq!(detect_alignment(&blocks[..1], &bbox, 5.0), Alignment::Left);
    }

    #[test]
    fn test_bold_span_makes_heading() {
        let bbox = BoundingBox::new(72.0, 700.0, 200.0, 712.0).unwrap();
        let font = FontInfo::new("Helvetica-Bold", 11.0).unwrap().with_bold(true);
        let bold = Span::new("Overview", bbox, font).unwrap();
        let heading = RawBlock::new(bbox, vec![Line::from_spans(bbox, vec![bold])]);

        let blocks = reconstructor().reconstruct(vec![heading], 0);
        assert_eq!(blocks.len(), 1);
        assert!(blocks[0].is_heading());
    }

    #[test]
    fn test_blank_groups_dropped() {
        let bbox = BoundingBox::new(72.0, 700.0, 200.0, 712.0).unwrap();
        let blank = RawBlock::new(
            bbox,
            vec![Line::from_spans(bbox, vec![span("   ", 72.0, 700.0, 200.0, 712.0, 10.0)])],
        );
        let no_lines = RawBlock::new(bbox, Vec::new());
        assert!(reconstructor().reconstruct(vec![blank, no_lines], 0).is_empty());
    }
}

//! Validation of extractor output into the fragment model.

use serde_json::Value;

use super::{PageFragments, SpanFragment, DEFAULT_FONT_SIZE, FLAG_BOLD, FLAG_ITALIC};
use crate::error::{Error, Result};
use crate::model::{BoundingBox, FontInfo, Line, RawBlock, Rgb, Span};

/// Parse a loosely typed bounding box.
///
/// Accepts `[x0, y0, x1, y1]` or an object with `x0`, `y0`, `x1`, `y1`.
/// Missing or non-numeric fields yield [`Error::MalformedFragment`];
/// inverted boxes yield [`Error::InvalidGeometry`].
pub fn parse_bbox(value: &Value) -> Result<BoundingBox> {
    let coords: Vec<Option<f64>> = match value {
        Value::Array(items) if items.len() >= 4 => items[..4].iter().map(Value::as_f64).collect(),
        Value::Object(map) => ["x0", "y0", "x1", "y1"]
            .iter()
            .map(|k| map.get(*k).and_then(Value::as_f64))
            .collect(),
        Value::Null => return Err(Error::MalformedFragment("missing bbox".into())),
        other => {
            return Err(Error::MalformedFragment(format!(
                "unsupported bbox value: {}",
                other
            )))
        }
    };

    match coords.as_slice() {
        [Some(x0), Some(y0), Some(x1), Some(y1)] => {
            BoundingBox::new(*x0 as f32, *y0 as f32, *x1 as f32, *y1 as f32)
        }
        _ => Err(Error::MalformedFragment(format!(
            "non-numeric bbox: {}",
            value
        ))),
    }
}

fn has_style(name: &str, markers: &[&str]) -> bool {
    let lower = name.to_lowercase();
    markers.iter().any(|m| lower.contains(m))
}

fn convert_span(fragment: &SpanFragment) -> Result<Span> {
    if fragment.text.is_empty() {
        return Err(Error::MalformedFragment("span has no text".into()));
    }
    let bbox = parse_bbox(&fragment.bbox)?;

    let size = fragment.size.unwrap_or(DEFAULT_FONT_SIZE);
    let bold = fragment.flags & FLAG_BOLD != 0 || has_style(&fragment.font, &["bold", "black", "heavy"]);
    let italic =
        fragment.flags & FLAG_ITALIC != 0 || has_style(&fragment.font, &["italic", "oblique"]);

    let font = FontInfo::new(fragment.font.clone(), size)?
        .with_bold(bold)
        .with_italic(italic)
        .with_color(Rgb::from_packed(fragment.color));

    Span::new(fragment.text.clone(), bbox, font)
}

/// Convert a page's fragments into raw blocks.
///
/// A block, line or span with a bad bounding box (or a span with no text or
/// an invalid font size) is skipped and logged. Lines whose text is blank
/// and blocks left without lines are dropped.
pub fn ingest(page: &PageFragments) -> Vec<RawBlock> {
    let mut blocks = Vec::with_capacity(page.blocks.len());

    for (block_idx, block) in page.blocks.iter().enumerate() {
        let block_bbox = match parse_bbox(&block.bbox) {
            Ok(bbox) => bbox,
            Err(e) => {
                log::debug!(
                    "Page {}: skipping block {}: {}",
                    page.page_number,
                    block_idx,
                    e
                );
                continue;
            }
        };

        let mut lines = Vec::with_capacity(block.lines.len());
        for line in &block.lines {
            let line_bbox = match parse_bbox(&line.bbox) {
                Ok(bbox) => bbox,
                Err(e) => {
                    log::debug!("Page {}: skipping line: {}", page.page_number, e);
                    continue;
                }
            };

            let spans: Vec<Span> = line
                .spans
                .iter()
                .filter_map(|s| match convert_span(s) {
                    Ok(span) => Some(span),
                    Err(e) => {
                        log::debug!("Page {}: skipping span: {}", page.page_number, e);
                        None
                    }
                })
                .collect();

            if spans.is_empty() {
                continue;
            }

            let line = Line::from_spans(line_bbox, spans);
            if !line.is_blank() {
                lines.push(line);
            }
        }

        let raw = RawBlock::new(block_bbox, lines);
        if raw.lines.is_empty() || raw.is_empty() {
            continue;
        }
        blocks.push(raw);
    }

    log::debug!(
        "Page {}: ingested {} of {} blocks",
        page.page_number,
        blocks.len(),
        page.blocks.len()
    );

    blocks
}

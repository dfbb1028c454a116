//! Markdown rendering for structured documents.

use crate::error::Result;
use crate::model::{BlockType, StructuredDocument, StructuredPage, TextBlock};
use crate::table::AsciiTableRenderer;

use super::RenderOptions;

/// Characters stripped from the front of list items before the `- ` marker.
const BULLET_CHARS: &[char] = &['•', '·', '-', '*', ' '];

/// Convert a document to Markdown.
///
/// The title and author from the document metadata become a level-one
/// heading and an italic byline. Pages after the first are separated by a
/// horizontal rule and an italic page label.
pub fn to_markdown(doc: &StructuredDocument, options: &RenderOptions) -> Result<String> {
    let tables = AsciiTableRenderer::default();
    let mut lines = Vec::new();

    if let Some(title) = doc.metadata.get("title").filter(|t| !t.is_empty()) {
        lines.push(format!("# {}", title));
        lines.push(String::new());
    }
    if let Some(author) = doc.metadata.get("author").filter(|a| !a.is_empty()) {
        lines.push(format!("*Author: {}*", author));
        lines.push(String::new());
    }

    for page in &doc.pages {
        if options.page_selection.includes(page.page_number) {
            render_page(&mut lines, page, &tables);
        }
    }

    Ok(lines.join("\n"))
}

fn render_page(lines: &mut Vec<String>, page: &StructuredPage, tables: &AsciiTableRenderer) {
    if page.page_number > 1 {
        lines.push(String::new());
        lines.push("---".into());
        lines.push(String::new());
        lines.push(format!("*Page {}*", page.page_number));
        lines.push(String::new());
    }

    let mut items: Vec<(f32, String)> = page
        .blocks
        .iter()
        .map(|b| (b.bbox.y1(), block_markdown(b)))
        .chain(page.tables.iter().map(|t| (t.bbox.y1(), tables.to_markdown(t))))
        .collect();
    items.sort_by(|a, b| b.0.total_cmp(&a.0));

    for (_, content) in items {
        if content.trim().is_empty() {
            continue;
        }
        lines.push(content);
        lines.push(String::new());
    }
}

fn block_markdown(block: &TextBlock) -> String {
    let text = block.text.trim();
    match block.block_type {
        BlockType::Heading => format!("{} {}", heading_marker(block), text),
        BlockType::ListItem => format!("- {}", text.trim_start_matches(BULLET_CHARS)),
        _ => text.to_string(),
    }
}

/// Heading level from the mean font size of the block's spans.
fn heading_marker(block: &TextBlock) -> &'static str {
    match block.mean_font_size() {
        Some(size) if size >= 18.0 => "##",
        Some(size) if size >= 14.0 => "###",
        Some(_) => "####",
        None => "###",
    }
}

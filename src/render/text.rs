//! Plain text rendering for structured documents.

use crate::error::Result;
use crate::model::{page_banner, BlockType, StructuredDocument, StructuredPage, TextBlock};
use crate::table::AsciiTableRenderer;

use super::RenderOptions;

/// Convert a document to plain text.
///
/// Every selected page starts with an 80-column `PAGE n` banner, followed by
/// the running header, the page content in top-down order and the running
/// footer.
pub fn to_text(doc: &StructuredDocument, options: &RenderOptions) -> Result<String> {
    let tables = AsciiTableRenderer::default();
    let mut lines = Vec::new();

    for page in &doc.pages {
        if options.page_selection.includes(page.page_number) {
            render_page(&mut lines, page, &tables);
        }
    }

    Ok(lines.join("\n"))
}

fn render_page(lines: &mut Vec<String>, page: &StructuredPage, tables: &AsciiTableRenderer) {
    let [top, label, bottom] = page_banner(page.page_number);
    lines.push(String::new());
    lines.extend([top, label, bottom]);
    lines.push(String::new());

    if !page.header.is_empty() {
        lines.push(format!("[Header: {}]", page.header));
        lines.push(String::new());
    }

    let mut items: Vec<(f32, String)> = page
        .blocks
        .iter()
        .map(|b| (b.bbox.y1(), block_text(b)))
        .chain(page.tables.iter().map(|t| {
            let ascii = if t.ascii_representation.is_empty() {
                tables.to_ascii(t)
            } else {
                t.ascii_representation.clone()
            };
            (t.bbox.y1(), ascii)
        }))
        .collect();
    items.sort_by(|a, b| b.0.total_cmp(&a.0));

    for (_, content) in items {
        if content.trim().is_empty() {
            continue;
        }
        lines.push(content);
        lines.push(String::new());
    }

    if !page.footer.is_empty() {
        lines.push(String::new());
        lines.push(format!("[Footer: {}]", page.footer));
    }
}

fn block_text(block: &TextBlock) -> String {
    match block.block_type {
        BlockType::Heading => format!("\n{}\n", block.text.trim().to_uppercase()),
        BlockType::ListItem => format!("  {}", block.text.trim()),
        _ => block.text.trim().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{BoundingBox, Cell, Table};
    use crate::render::PageSelection;

    fn bbox(x0: f32, y0: f32, x1: f32, y1: f32) -> BoundingBox {
        BoundingBox::new(x0, y0, x1, y1).unwrap()
    }

    fn sample() -> StructuredDocument {
        let mut page = StructuredPage::new(1, 612.0, 792.0);
        page.header = "Running head".into();
        page.footer = "7".into();
        page.blocks.push(TextBlock::new("Body text.", bbox(72.0, 500.0, 540.0, 520.0)));
        page.blocks.push(
            TextBlock::new("Introduction", bbox(72.0, 600.0, 300.0, 620.0))
                .with_type(BlockType::Heading),
        );
        page.blocks.push(
            TextBlock::new("• first", bbox(72.0, 450.0, 300.0, 462.0))
                .with_type(BlockType::ListItem),
        );

        let mut doc = StructuredDocument::new("sample.pdf");
        doc.pages.push(page);
        doc
    }

    #[test]
    fn test_to_text_layout() {
        let text = to_text(&sample(), &RenderOptions::default()).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], "");
        assert_eq!(lines[1], "=".repeat(80));
        assert_eq!(lines[2].trim(), "PAGE 1");
        assert_eq!(lines[2].len(), 80);
        assert_eq!(lines[5], "[Header: Running head]");
        assert!(text.ends_with("\n[Footer: 7]"));

        let heading = text.find("INTRODUCTION").unwrap();
        let body = text.find("Body text.").unwrap();
        let item = text.find("  • first").unwrap();
        assert!(heading < body && body < item);
    }

    #[test]
    fn test_tables_render_on_the_fly() {
        let mut doc = sample();
        let cell_box = bbox(72.0, 300.0, 100.0, 320.0);
        let table = Table::new(vec![Cell::new("X", cell_box, 0, 0)], cell_box, 1, 1);
        doc.pages[0].tables.push(table);

        let text = to_text(&doc, &RenderOptions::default()).unwrap();
        assert!(text.contains("+-----+\n| X   |\n+-----+"));
    }

    #[test]
    fn test_page_selection_filters_pages() {
        let mut doc = sample();
        doc.pages.push(StructuredPage::new(2, 612.0, 792.0));

        let options = RenderOptions::new().with_pages(PageSelection::Pages(vec![2]));
        let text = to_text(&doc, &options).unwrap();
        assert!(text.contains("PAGE 2"));
        assert!(!text.contains("PAGE 1"));
        assert!(!text.contains("Body text."));
    }
}

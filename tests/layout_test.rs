//! End-to-end layout reconstruction over fragment dumps.

use std::io::Write;

use pdflayout::fragments::{BlockFragment, LineFragment, SpanFragment};
use pdflayout::render::{self, RenderOptions};
use pdflayout::{
    analyze_dump, analyze_file, BlockType, FragmentDump, LayoutConfig, PageFragments, PdfLayout,
};

/// A block of `lines` 10pt lines starting at `top`, 12pt apart.
fn paragraph(words: &str, x0: f32, x1: f32, top: f32, lines: usize) -> BlockFragment {
    let bottom = top - 12.0 * (lines as f32 - 1.0) - 10.0;
    let mut block = BlockFragment::new([x0, bottom, x1, top]);
    for i in 0..lines {
        let line_top = top - 12.0 * i as f32;
        let bbox = [x0, line_top - 10.0, x1, line_top];
        let text = format!("{} line {}", words, i + 1);
        block = block.with_line(LineFragment::new(bbox).with_span(SpanFragment::new(text, bbox, 10.0)));
    }
    block
}

fn single_line(text: &str, bbox: [f32; 4], size: f32) -> BlockFragment {
    BlockFragment::new(bbox)
        .with_line(LineFragment::new(bbox).with_span(SpanFragment::new(text, bbox, size)))
}

/// Letter page: a centred title over a two-column body with three
/// paragraphs on the left and two on the right, plus a page number.
fn two_column_page() -> PageFragments {
    PageFragments::new(1, 612.0, 792.0)
        .with_block(single_line("A Study of Layout", [206.0, 690.0, 406.0, 710.0], 20.0))
        .with_block(paragraph("Left one", 72.0, 290.0, 660.0, 3))
        .with_block(paragraph("Right one", 322.0, 540.0, 660.0, 4))
        .with_block(paragraph("Left two", 72.0, 290.0, 560.0, 3))
        .with_block(paragraph("Right two", 322.0, 540.0, 540.0, 4))
        .with_block(paragraph("Left three", 72.0, 290.0, 460.0, 3))
        .with_block(single_line("1", [300.0, 30.0, 312.0, 40.0], 9.0))
}

fn two_column_dump() -> FragmentDump {
    FragmentDump::new("paper.pdf")
        .with_metadata("title", "Layout Paper")
        .with_page(two_column_page())
}

#[test]
fn test_two_column_page_with_spanning_title() {
    let doc = analyze_dump(two_column_dump(), LayoutConfig::default()).unwrap();
    let page = &doc.pages[0];

    assert_eq!(page.columns.len(), 2);
    assert_eq!(page.columns[0].index, 0);
    assert_eq!(page.columns[1].index, 1);
    assert_eq!(page.columns[0].blocks[0].text, "A Study of Layout");
    assert_eq!(page.columns[0].blocks.len(), 4);
    assert_eq!(page.columns[1].blocks.len(), 2);

    let firsts: Vec<&str> = page
        .blocks
        .iter()
        .map(|b| b.text.split(" line ").next().unwrap_or(""))
        .collect();
    assert_eq!(
        firsts,
        vec![
            "A Study of Layout",
            "Left one",
            "Left two",
            "Left three",
            "Right one",
            "Right two"
        ]
    );

    assert_eq!(page.blocks[0].block_type, BlockType::Heading);
    assert!(page.blocks[1..]
        .iter()
        .all(|b| b.block_type == BlockType::Paragraph));
    assert_eq!(page.footer, "1");
    assert!(page.header.is_empty());
}

#[test]
fn test_paragraph_lines_are_joined() {
    let doc = analyze_dump(two_column_dump(), LayoutConfig::default()).unwrap();
    let left_one = &doc.pages[0].blocks[1];
    assert_eq!(
        left_one.text,
        "Left one line 1 Left one line 2 Left one line 3"
    );
    assert_eq!(left_one.column_index, 0);
}

#[test]
fn test_single_column_page_reads_top_down() {
    let page = PageFragments::new(1, 612.0, 792.0)
        .with_block(paragraph("Third", 72.0, 540.0, 300.0, 2))
        .with_block(paragraph("First", 72.0, 540.0, 600.0, 2))
        .with_block(paragraph("Second", 72.0, 540.0, 450.0, 2));
    let doc = analyze_dump(FragmentDump::new("plain.pdf").with_page(page), LayoutConfig::default())
        .unwrap();

    let page = &doc.pages[0];
    assert_eq!(page.columns.len(), 1);
    let firsts: Vec<&str> = page
        .blocks
        .iter()
        .map(|b| b.text.split(' ').next().unwrap_or(""))
        .collect();
    assert_eq!(firsts, vec!["First", "Second", "Third"]);
}

#[test]
fn test_analyze_file_and_render() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(serde_json::to_string(&two_column_dump()).unwrap().as_bytes())
        .unwrap();

    let doc = analyze_file(file.path()).unwrap();
    assert_eq!(doc.source_path, "paper.pdf");
    assert_eq!(doc.metadata.get("title").map(String::as_str), Some("Layout Paper"));

    let text = render::to_text(&doc, &RenderOptions::default()).unwrap();
    assert!(text.contains("PAGE 1"));
    assert!(text.contains("\nA STUDY OF LAYOUT\n"));
    assert!(text.ends_with("[Footer: 1]"));

    let markdown = render::to_markdown(&doc, &RenderOptions::default()).unwrap();
    assert!(markdown.starts_with("# Layout Paper\n"));
    assert!(markdown.contains("## A Study of Layout"));
}

#[test]
fn test_builder_with_page_selection() {
    let dump = two_column_dump().with_page({
        let mut page = two_column_page();
        page.page_number = 2;
        page
    });

    let result = PdfLayout::new()
        .sequential()
        .with_pages(pdflayout::PageSelection::Pages(vec![2]))
        .analyze_dump(dump)
        .unwrap();

    assert_eq!(result.document().page_count(), 1);
    assert_eq!(result.document().pages[0].page_number, 2);

    let json: serde_json::Value = serde_json::from_str(&result.to_json().unwrap()).unwrap();
    assert_eq!(json["pages"][0]["page_number"], 2);
    assert_eq!(json["pages"][0]["blocks"][0]["type"], "HEADING");
}

//! Rendering module for converting structured documents to output formats.

mod json;
mod markdown;
mod options;
mod text;

pub use json::to_json;
pub use markdown::to_markdown;
pub use options::{JsonFormat, OutputFormat, PageSelection, RenderOptions};
pub use text::to_text;

use crate::error::Result;
use crate::model::StructuredDocument;

/// Render a document in the given output format.
pub fn render(
    doc: &StructuredDocument,
    format: OutputFormat,
    options: &RenderOptions,
) -> Result<String> {
    match format {
        OutputFormat::Text => to_text(doc, options),
        OutputFormat::Markdown => to_markdown(doc, options),
        OutputFormat::Json => to_json(doc, options),
    }
}

//! In-memory fragment dumps.
//!
//! A dump is the JSON an external extractor writes for a whole document:
//! pages of fragments plus, optionally, the table grids found on each page.
//! It serves as both the [`PageSource`] and the table-finding collaborator.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::{ingest, PageFragments, PageSource};
use crate::error::{Error, Result};
use crate::table::{RawTable, TableFinder, TableFinderProvider};

/// A document's worth of extractor output.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FragmentDump {
    /// Path of the document the fragments came from
    #[serde(default)]
    pub source_path: String,

    /// Document metadata
    #[serde(default)]
    pub metadata: BTreeMap<String, String>,

    /// Pages in document order
    pub pages: Vec<PageFragments>,

    /// Table grids keyed by page number
    #[serde(default)]
    pub tables: BTreeMap<u32, Vec<RawTable>>,
}

impl FragmentDump {
    /// Create an empty dump.
    pub fn new(source_path: impl Into<String>) -> Self {
        Self {
            source_path: source_path.into(),
            ..Self::default()
        }
    }

    /// Parse a dump from JSON text.
    pub fn from_json(json: &str) -> Result<Self> {
        let dump: FragmentDump = serde_json::from_str(json)?;
        dump.validate()?;
        Ok(dump)
    }

    /// Read a dump from a JSON file.
    ///
    /// The file path becomes the source path when the dump names none.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let data = std::fs::read_to_string(path)?;
        let mut dump = Self::from_json(&data)?;
        if dump.source_path.is_empty() {
            dump.source_path = path.display().to_string();
        }
        Ok(dump)
    }

    /// Add a page and return self.
    pub fn with_page(mut self, page: PageFragments) -> Self {
        self.pages.push(page);
        self
    }

    /// Register a table grid on a page and return self.
    pub fn with_table(mut self, page_number: u32, table: RawTable) -> Self {
        self.tables.entry(page_number).or_default().push(table);
        self
    }

    /// Set a metadata entry and return self.
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    fn validate(&self) -> Result<()> {
        for (idx, page) in self.pages.iter().enumerate() {
            let expected = idx as u32 + 1;
            if page.page_number != expected {
                return Err(Error::DocumentLoad(format!(
                    "page {} listed at position {}",
                    page.page_number, expected
                )));
            }
        }
        Ok(())
    }

    fn page(&self, page_number: u32) -> Result<&PageFragments> {
        if page_number == 0 {
            return Err(Error::PageOutOfRange(page_number, self.page_count()));
        }
        self.pages
            .get(page_number as usize - 1)
            .ok_or(Error::PageOutOfRange(page_number, self.page_count()))
    }
}

impl PageSource for FragmentDump {
    fn source_path(&self) -> &str {
        &self.source_path
    }

    fn page_count(&self) -> u32 {
        self.pages.len() as u32
    }

    fn metadata(&self) -> BTreeMap<String, String> {
        self.metadata
            .iter()
            .filter(|(_, v)| !v.is_empty())
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    fn page_size(&self, page_number: u32) -> Result<(f32, f32)> {
        let page = self.page(page_number)?;
        Ok((page.width, page.height))
    }

    fn extract_page(&self, page_number: u32) -> Result<PageFragments> {
        self.page(page_number).cloned()
    }

    fn plain_text(&self, page_number: u32) -> Result<String> {
        let page = self.page(page_number)?;
        if let Some(text) = &page.text {
            return Ok(text.clone());
        }
        Ok(ingest(page)
            .iter()
            .map(|b| b.text())
            .collect::<Vec<_>>()
            .join("\n"))
    }
}

/// Table finder over the grids recorded in a dump.
struct DumpTableFinder {
    tables: BTreeMap<u32, Vec<RawTable>>,
}

impl TableFinder for DumpTableFinder {
    fn find_tables(&mut self, page_number: u32) -> Result<Vec<RawTable>> {
        Ok(self.tables.get(&page_number).cloned().unwrap_or_default())
    }

    fn close(&mut self) {
        self.tables.clear();
    }
}

impl TableFinderProvider for FragmentDump {
    fn open(&self, source_path: &str) -> Result<Box<dyn TableFinder>> {
        if source_path != self.source_path {
            return Err(Error::TableDetection(format!(
                "no table data for {}",
                source_path
            )));
        }
        Ok(Box::new(DumpTableFinder {
            tables: self.tables.clone(),
        }))
    }
}

//! Table-finding collaborators and the per-document handle registry.
//!
//! Finding table grids is delegated to an external service. Opening a
//! handle to it is comparatively expensive, so the [`TableFinderRegistry`]
//! opens one handle per source path, shares it between page workers behind
//! a mutex, and closes every handle when the owning session closes.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// A table grid as reported by a table finder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawTable {
    /// `[x0, top, x1, bottom]` with a top-left page origin
    pub bbox: [f32; 4],

    /// Row-major cell strings; `None` marks an empty or merged-away cell
    pub rows: Vec<Vec<Option<String>>>,
}

impl RawTable {
    /// Create a raw table from string rows.
    pub fn new<S: Into<String>>(bbox: [f32; 4], rows: Vec<Vec<Option<S>>>) -> Self {
        Self {
            bbox,
            rows: rows
                .into_iter()
                .map(|r| r.into_iter().map(|c| c.map(Into::into)).collect())
                .collect(),
        }
    }
}

/// An open handle to a table-finding service for one document.
pub trait TableFinder: Send {
    /// Find the table grids on a page (1-indexed).
    fn find_tables(&mut self, page_number: u32) -> Result<Vec<RawTable>>;

    /// Release resources held by the handle.
    fn close(&mut self) {}
}

/// Opens [`TableFinder`] handles for documents.
pub trait TableFinderProvider: Send + Sync {
    /// Open a finder for the document at `source_path`.
    fn open(&self, source_path: &str) -> Result<Box<dyn TableFinder>>;
}

/// A finder handle shared by the workers of one document.
pub type SharedTableFinder = Arc<Mutex<Box<dyn TableFinder>>>;

/// Registry of open table-finder handles, keyed by source path.
pub struct TableFinderRegistry {
    provider: Arc<dyn TableFinderProvider>,
    handles: Mutex<HashMap<String, SharedTableFinder>>,
}

impl TableFinderRegistry {
    /// Create an empty registry backed by `provider`.
    pub fn new(provider: Arc<dyn TableFinderProvider>) -> Self {
        Self {
            provider,
            handles: Mutex::new(HashMap::new()),
        }
    }

    /// Get the handle for `source_path`, opening it on first use.
    pub fn acquire(&self, source_path: &str) -> Result<SharedTableFinder> {
        let mut handles = self
            .handles
            .lock()
            .map_err(|_| Error::TableDetection("table finder registry poisoned".into()))?;

        if let Some(handle) = handles.get(source_path) {
            return Ok(Arc::clone(handle));
        }

        log::debug!("Opening table finder for {}", source_path);
        let finder = self.provider.open(source_path)?;
        let handle: SharedTableFinder = Arc::new(Mutex::new(finder));
        handles.insert(source_path.to_string(), Arc::clone(&handle));
        Ok(handle)
    }

    /// Number of open handles.
    pub fn open_count(&self) -> usize {
        self.handles.lock().map(|h| h.len()).unwrap_or(0)
    }

    /// Close and forget every handle.
    pub fn close(&self) {
        let drained: Vec<(String, SharedTableFinder)> = match self.handles.lock() {
            Ok(mut handles) => handles.drain().collect(),
            Err(poisoned) => poisoned.into_inner().drain().collect(),
        };

        for (path, handle) in drained {
            match handle.lock() {
                Ok(mut finder) => finder.close(),
                Err(poisoned) => poisoned.into_inner().close(),
            }
            log::debug!("Closed table finder for {}", path);
        }
    }
}

impl Drop for TableFinderRegistry {
    fn drop(&mut self) {
        self.close();
    }
}

//! Raw-value suppliers.
//!
//! A supplier produces the current raw table of a symbol. It is invoked anew
//! on every request and may return different data each time.

use periodic_core::{RawTable, Result};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use tracing::trace;

/// Source of a symbol's raw observations.
pub trait ValuesSupplier: Send + Sync {
    /// Produce the current raw table.
    fn fetch(&self) -> Result<RawTable>;
}

impl<F> ValuesSupplier for F
where
    F: Fn() -> Result<RawTable> + Send + Sync,
{
    fn fetch(&self) -> Result<RawTable> {
        self()
    }
}

/// Supplier returning a fixed table.
#[derive(Debug, Clone)]
pub struct StaticValues(RawTable);

impl StaticValues {
    pub fn new(raw: RawTable) -> Self {
        Self(raw)
    }
}

impl ValuesSupplier for StaticValues {
    fn fetch(&self) -> Result<RawTable> {
        Ok(self.0.clone())
    }
}

/// Supplier reading a JSON array of records from disk on every fetch.
#[derive(Debug, Clone)]
pub struct JsonFileValues {
    path: PathBuf,
}

impl JsonFileValues {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ValuesSupplier for JsonFileValues {
    fn fetch(&self) -> Result<RawTable> {
        trace!(path = %self.path.display(), "reading raw values");
        let file = File::open(&self.path)?;
        RawTable::from_reader(BufReader::new(file))
    }
}

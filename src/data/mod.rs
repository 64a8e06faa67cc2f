// ============================================
// HAPPYHOUR - Tabular Data Loading
// ============================================

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;

/// Directory holding the bundled datasets, relative to the crate root
pub const DATA_DIR: &str = "data";

/// Resolve a file inside the bundled data directory
pub fn data_path(file: impl AsRef<Path>) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join(DATA_DIR).join(file)
}

/// Parse CSV text with a header row into typed rows.
///
/// Every field is trimmed and blank lines are skipped. Rows come back in file
/// order.
pub fn parse_csv<T: DeserializeOwned>(contents: &str) -> Result<Vec<T>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(contents.as_bytes());

    reader
        .deserialize::<T>()
        .enumerate()
        .map(|(i, row)| row.with_context(|| format!("Invalid CSV record {}", i + 1)))
        .collect()
}

use anyhow::{Context, Result};
use querykit_protocol::SearchItem;
use std::fs;
use std::path::Path;

/// Reads a JSON array of catalog entries.
pub fn load_entries(path: &Path) -> Result<Vec<SearchItem<String>>> {
    let bytes = fs::read(path)
        .with_context(|| format!("Failed to read catalog file {}", path.display()))?;
    let entries: Vec<SearchItem<String>> = serde_json::from_slice(&bytes)
        .with_context(|| format!("Invalid catalog file {}", path.display()))?;
    log::debug!("Loaded {} catalog entries from {}", entries.len(), path.display());
    Ok(entries)
}

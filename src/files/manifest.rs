use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

use super::FileDescriptor;

/// Writes the manifest as 2-space indented JSON, creating its directory.
pub fn save_manifest(path: &Path, files: &[FileDescriptor]) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create manifest directory {:?}", parent))?;
    }

    let json = serde_json::to_string_pretty(files)?;
    fs::write(path, json).with_context(|| format!("Failed to write manifest {:?}", path))?;
    Ok(())
}

pub fn load_manifest(path: &Path) -> Result<Vec<FileDescriptor>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read manifest {:?}", path))?;
    serde_json::from_str(&content).with_context(|| format!("Invalid manifest {:?}", path))
}

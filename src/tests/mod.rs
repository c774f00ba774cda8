use crate::files::{save_manifest, FileDescriptor};
use crate::path_mirror::PathMirror;
use anyhow::Result;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;


// Test utilities and helpers
pub(crate) struct TestUtils {
    temp_dir: TempDir,
}

impl TestUtils {
    pub fn new() -> Result<Self> {
        Ok(Self {
            temp_dir: TempDir::new()?,
        })
    }

    pub fn repos_root(&self) -> PathBuf {
        self.temp_dir.path().join("repos")
    }

    pub fn data_root(&self) -> PathBuf {
        self.temp_dir.path().join("data")
    }

    pub fn manifest_path(&self) -> PathBuf {
        self.data_root().join("files_list.json")
    }

    pub fn mirror(&self) -> PathMirror {
        PathMirror::new(self.repos_root(), self.data_root(), ".json")
    }

    /// Writes `content` at `relative` under the repos root.
    pub fn add_source(&self, relative: &str, content: &str) -> Result<PathBuf> {
        let path = self.repos_root().join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, content)?;
        Ok(path)
    }

    pub fn outside_file(&self, name: &str, content: &str) -> Result<PathBuf> {
        let path = self.temp_dir.path().join("elsewhere").join(name);
        fs::create_dir_all(path.parent().unwrap())?;
        fs::write(&path, content)?;
        Ok(path)
    }

    pub fn write_manifest(&self, paths: &[&Path]) -> Result<()> {
        let descriptors: Vec<FileDescriptor> = paths
            .iter()
            .map(|path| descriptor_for(path))
            .collect();
        save_manifest(&self.manifest_path(), &descriptors)
    }
}

/// A descriptor that does not require the file to exist.
pub(crate) fn descriptor_for(path: &Path) -> FileDescriptor {
    FileDescriptor {
        file_path: path.to_path_buf(),
        file_name: path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default(),
        extension: path
            .extension()
            .map(|e| format!(".{}", e.to_string_lossy()))
            .unwrap_or_default(),
        created_at: "2024-01-31T09:05:00Z".to_string(),
        last_modified: "2024-01-31T09:05:00Z".to_string(),
    }
}

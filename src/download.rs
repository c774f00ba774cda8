use anyhow::{Context, Result};
use std::path::PathBuf;
use tracing::info;

use crate::config::Config;
use crate::files::{enumerate_files, save_manifest};
use crate::git::GitManager;

#[derive(Debug, Clone)]
pub struct DownloadSummary {
    pub repo_path: PathBuf,
    pub branch: Option<String>,
    pub manifest_path: PathBuf,
    pub file_count: usize,
}

/// Clones (or updates) the configured repository, enumerates its files with
/// the configured extensions and persists the manifest.
pub fn download_and_list(config: &Config) -> Result<DownloadSummary> {
    let url = config.repo_url()?;
    let repo_path = config.local_repo_path()?;

    let repo = GitManager::clone_or_update(url, &repo_path)?;
    let branch = repo.get_current_branch().ok();

    let files = enumerate_files(repo.path(), &config.repository.extensions)
        .with_context(|| format!("Failed to list files in {:?}", repo_path))?;
    info!("Found {} matching files", files.len());

    let manifest_path = config.manifest_path();
    save_manifest(&manifest_path, &files)?;
    info!("Saved file list to {:?}", manifest_path);

    Ok(DownloadSummary {
        repo_path,
        branch,
        manifest_path,
        file_count: files.len(),
    })
}

use anyhow::{anyhow, Context, Result};
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::{debug, info};

/// A local checkout of a remote repository, driven through the `git` CLI.
pub struct GitManager {
    repo_path: PathBuf,
}

impl GitManager {
    pub fn new(path: impl AsRef<Path>) -> Result<Self> {
        let repo_path = path.as_ref().to_path_buf();
        if !repo_path.join(".git").exists() {
            return Err(anyhow!("Not a git repository: {:?}", repo_path));
        }
        Ok(Self { repo_path })
    }

    /// Pulls `origin` when `path` already holds a checkout, otherwise clones
    /// `url` into it.
    pub fn clone_or_update(url: &str, path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        if path.exists() {
            info!("Updating existing repo at {:?}...", path);
            let manager = Self::new(path)?;
            manager.pull()?;
            return Ok(manager);
        }

        info!("Cloning repo {} into {:?}...", url, path);
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {:?}", parent))?;
        }

        let output = Command::new("git")
            .arg("clone")
            .arg(url)
            .arg(path)
            .output()
            .context("Failed to run git; is it installed?")?;

        if !output.status.success() {
            return Err(anyhow!(
                "git clone {} failed: {}",
                url,
                String::from_utf8_lossy(&output.stderr).trim()
            ));
        }

        Self::new(path)
    }

    pub fn pull(&self) -> Result<()> {
        let output = Command::new("git")
            .args(["pull", "origin"])
            .current_dir(&self.repo_path)
            .output()
            .context("Failed to run git; is it installed?")?;

        if output.status.success() {
            debug!("{}", String::from_utf8_lossy(&output.stdout).trim());
            Ok(())
        } else {
            Err(anyhow!(
                "git pull failed in {:?}: {}",
                self.repo_path,
                String::from_utf8_lossy(&output.stderr).trim()
            ))
        }
    }

    pub fn get_current_branch(&self) -> Result<String> {
        let output = Command::new("git")
            .arg("rev-parse")
            .arg("--abbrev-ref")
            .arg("HEAD")
            .current_dir(&self.repo_path)
            .output()?;

        if output.status.success() {
            Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
        } else {
            Err(anyhow!("Failed to get current branch"))
        }
    }

    pub fn path(&self) -> &Path {
        &self.repo_path
    }
}

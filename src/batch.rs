use anyhow::Result;
use indicatif::{ProgressBar, ProgressStyle};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info};

use crate::ai::InferenceBackend;
use crate::analysis::FrameworkClassifier;
use crate::files::{load_manifest, read_file_lines, FileDescriptor};
use crate::path_mirror::PathMirror;

/// The metadata sidecar written for each processed source file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputRecord {
    pub file_name: String,
    pub original_path: String,
    pub extension: String,
    pub framework: Option<String>,
    pub dependencies: Vec<String>,
    pub code: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchReport {
    pub total: usize,
    pub written: usize,
    pub skipped_missing: usize,
    pub skipped_outside_root: usize,
    pub fallbacks: usize,
    pub failed: usize,
}

impl fmt::Display for BatchReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} listed, {} written, {} missing, {} outside root, {} AI fallbacks, {} failed",
            self.total,
            self.written,
            self.skipped_missing,
            self.skipped_outside_root,
            self.fallbacks,
            self.failed
        )
    }
}

/// Runs the classification over every manifest entry, one file at a time.
pub struct BatchRunner<'a> {
    classifier: FrameworkClassifier<'a>,
    mirror: PathMirror,
    show_progress: bool,
}

impl<'a> BatchRunner<'a> {
    pub fn new(backend: &'a dyn InferenceBackend, mirror: PathMirror) -> Self {
        Self {
            classifier: FrameworkClassifier::new(backend),
            mirror,
            show_progress: false,
        }
    }

    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    /// Processes the manifest at `manifest_path` in order. A missing manifest
    /// yields an empty report; an unreadable one is the only error returned.
    pub async fn run(&self, manifest_path: &Path) -> Result<BatchReport> {
        let mut report = BatchReport::default();

        if !manifest_path.exists() {
            error!("{:?} does not exist; run the download stage first", manifest_path);
            return Ok(report);
        }

        let descriptors = load_manifest(manifest_path)?;
        report.total = descriptors.len();

        info!("Repos root: {:?}", self.mirror.source_root());
        info!("Data root: {:?}", self.mirror.dest_root());

        let progress = self.progress_bar(descriptors.len() as u64);
        for descriptor in &descriptors {
            progress.set_message(descriptor.file_name.clone());
            self.process(descriptor, &mut report).await;
            progress.inc(1);
        }
        progress.finish_and_clear();

        info!("JSON files generated respecting repository structure ({})", report);
        Ok(report)
    }

    async fn process(&self, descriptor: &FileDescriptor, report: &mut BatchReport) {
        let source = &descriptor.file_path;

        if !source.exists() {
            debug!("Skipping {:?}: file no longer exists", source);
            report.skipped_missing += 1;
            return;
        }

        let dest = match self.mirror.mirror(source) {
            Ok(Some(dest)) => dest,
            Ok(None) => {
                debug!("Skipping {:?}: not under {:?}", source, self.mirror.source_root());
                report.skipped_outside_root += 1;
                return;
            }
            Err(e) => {
                error!("Error preparing output for {:?}: {:#}", source, e);
                report.failed += 1;
                return;
            }
        };

        let code = match read_file_lines(source) {
            Ok(lines) => lines,
            Err(e) => {
                error!("Error reading {:?}: {}", source, e);
                report.failed += 1;
                return;
            }
        };

        let outcome = self.classifier.classify(&code, &descriptor.file_name).await;
        if outcome.is_fallback() {
            report.fallbacks += 1;
        }
        let classification = outcome.into_result();

        let record = OutputRecord {
            file_name: descriptor.file_name.clone(),
            original_path: source.to_string_lossy().into_owned(),
            extension: descriptor.extension.clone(),
            framework: classification.framework,
            dependencies: classification.dependencies,
            code,
        };

        match write_record(&dest, &record) {
            Ok(()) => report.written += 1,
            Err(e) => {
                error!("Error saving {:?}: {}", dest, e);
                report.failed += 1;
            }
        }
    }

    fn progress_bar(&self, len: u64) -> ProgressBar {
        if !self.show_progress {
            return ProgressBar::hidden();
        }

        let bar = ProgressBar::new(len);
        bar.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} Processing AI files [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar()),
        );
        bar
    }
}

/// 2-space indented JSON; serde_json leaves non-ASCII characters unescaped.
fn write_record(dest: &Path, record: &OutputRecord) -> Result<()> {
    let json = serde_json::to_string_pretty(record)?;
    fs::write(dest, json)?;
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CleanupStatus {
    Removed(PathBuf),
    NothingToRemove,
    Failed(String),
}

/// Deletes the whole repositories directory. Failures are logged, not returned.
pub fn cleanup_repos(repos_path: &Path) -> CleanupStatus {
    if !repos_path.is_dir() {
        info!("No repositories to delete");
        return CleanupStatus::NothingToRemove;
    }

    info!("Deleting repositories in {:?}...", repos_path);
    match fs::remove_dir_all(repos_path) {
        Ok(()) => {
            info!("Repositories deleted successfully");
            CleanupStatus::Removed(repos_path.to_path_buf())
        }
        Err(e) => {
            error!("Error deleting repositories: {}", e);
            CleanupStatus::Failed(e.to_string())
        }
    }
}

pub mod ai;
pub mod analysis;
pub mod batch;
pub mod config;
pub mod download;
pub mod files;
pub mod git;
pub mod path_mirror;

#[cfg(test)]
mod tests;

// Re-export commonly used types
pub use ai::{ClassificationResult, InferenceBackend, OllamaClient};
pub use analysis::{ClassificationOutcome, FrameworkClassifier};
pub use batch::{BatchReport, BatchRunner, OutputRecord};
pub use config::Config;
pub use files::FileDescriptor;
pub use path_mirror::PathMirror;

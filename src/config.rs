use anyhow::{anyhow, Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use validator::{Validate, ValidationError};

pub const DEFAULT_MODEL: &str = "deepseek-coder:1.3b";
pub const DEFAULT_ENDPOINT: &str = "http://localhost:11434";

#[derive(Debug, Default, Serialize, Deserialize, Clone, Validate)]
pub struct Config {
    #[serde(default)]
    #[validate]
    pub repository: RepositoryConfig,
    #[serde(default)]
    #[validate]
    pub ai: AIConfig,
    #[serde(default)]
    #[validate]
    pub output: OutputConfig,
}

#[derive(Debug, Serialize, Deserialize, Clone, Validate)]
#[serde(default)]
pub struct RepositoryConfig {
    pub url: Option<String>,
    pub repos_path: PathBuf,
    pub data_path: PathBuf,
    #[validate(
        length(min = 1, message = "At least one file extension is required"),
        custom = "validate_extensions"
    )]
    pub extensions: Vec<String>,
}

impl Default for RepositoryConfig {
    fn default() -> Self {
        Self {
            url: None,
            repos_path: PathBuf::from("repos"),
            data_path: PathBuf::from("data"),
            extensions: [".ts", ".tsx", ".js", ".jsx", ".html", ".css", ".xml", ".java"]
                .iter()
                .map(|ext| ext.to_string())
                .collect(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Validate)]
#[serde(default)]
pub struct AIConfig {
    #[validate(length(min = 1, message = "Model name cannot be empty"))]
    pub model: String,
    #[validate(url(message = "Endpoint must be a valid URL"))]
    pub endpoint: String,
    // Loaded and reported only; every request carries a single file.
    #[validate(range(min = 1, message = "Batch size must be at least 1"))]
    pub batch_size: u32,
    pub timeout_secs: Option<u64>,
}

impl Default for AIConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            batch_size: 3,
            timeout_secs: None,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Validate)]
#[serde(default)]
pub struct OutputConfig {
    #[validate(length(min = 1, message = "Manifest file name cannot be empty"))]
    pub manifest_file: String,
    #[validate(length(min = 1, message = "Output suffix cannot be empty"))]
    pub suffix: String,
    pub cleanup_repos: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            manifest_file: "files_list.json".to_string(),
            suffix: ".json".to_string(),
            cleanup_repos: true,
        }
    }
}

fn validate_extensions(extensions: &Vec<String>) -> Result<(), ValidationError> {
    if extensions.iter().all(|ext| ext.len() > 1 && ext.starts_with('.')) {
        Ok(())
    } else {
        let mut error = ValidationError::new("extension_format");
        error.message = Some("Extensions must start with '.' (e.g. \".ts\")".into());
        Err(error)
    }
}

impl Config {
    pub fn create_default(path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(&Config::default())?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory {:?}", parent))?;
        }
        fs::write(path, content).with_context(|| format!("Failed to write config {:?}", path))?;
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {:?}", path))?;
        toml::from_str(&content).with_context(|| format!("Invalid config file {:?}", path))
    }

    /// Resolves the effective configuration: defaults, then the TOML file
    /// (explicit path, or the per-user one when present), then `.env` and
    /// process environment overrides. The result is validated.
    pub fn resolve(explicit_path: Option<&Path>) -> Result<Self> {
        let mut config = match explicit_path {
            Some(path) => Self::load(path)?,
            None => match get_config_path() {
                Ok(path) if path.exists() => Self::load(&path)?,
                _ => Self::default(),
            },
        };

        // A missing .env file is not an error.
        dotenv::dotenv().ok();
        config.apply_env_overrides(|key| std::env::var(key).ok());
        config.check()?;
        Ok(config)
    }

    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        if let Some(url) = non_empty("REPO_URL") {
            self.repository.url = Some(url.trim().to_string());
        }
        if let Some(path) = non_empty("CODE_SCRAPER_REPOS_PATH") {
            self.repository.repos_path = PathBuf::from(path);
        }
        if let Some(path) = non_empty("CODE_SCRAPER_DATA_PATH") {
            self.repository.data_path = PathBuf::from(path);
        }
        if let Some(list) = non_empty("CODE_SCRAPER_EXTENSIONS") {
            self.repository.extensions = list
                .split(',')
                .map(|ext| ext.trim().to_string())
                .filter(|ext| !ext.is_empty())
                .collect();
        }
        if let Some(model) = non_empty("CODE_SCRAPER_MODEL") {
            self.ai.model = model;
        }
        if let Some(host) = non_empty("OLLAMA_HOST") {
            self.ai.endpoint = host.trim_end_matches('/').to_string();
        }
    }

    pub fn check(&self) -> Result<()> {
        self.validate()
            .map_err(|e| anyhow!("Invalid configuration: {}", e))
    }

    /// The repository URL, required by every stage that clones.
    pub fn repo_url(&self) -> Result<&str> {
        self.repository
            .url
            .as_deref()
            .ok_or_else(|| anyhow!("REPO_URL is not set (use .env, the environment or the config file)"))
    }

    pub fn repo_name(&self) -> Result<String> {
        repo_name_from_url(self.repo_url()?)
    }

    pub fn local_repo_path(&self) -> Result<PathBuf> {
        Ok(self.repository.repos_path.join(self.repo_name()?))
    }

    pub fn manifest_path(&self) -> PathBuf {
        self.repository.data_path.join(&self.output.manifest_file)
    }
}

/// Extracts the repository name from a clone URL: the stem of the last path
/// segment, so `https://github.com/org/app.git` yields `app`.
pub fn repo_name_from_url(url: &str) -> Result<String> {
    let without_query = url.split(['?', '#']).next().unwrap_or_default();
    let trimmed = without_query.trim().trim_end_matches('/');
    let last_segment = trimmed
        .rsplit(['/', ':'])
        .next()
        .filter(|segment| !segment.is_empty())
        .ok_or_else(|| anyhow!("Cannot derive repository name from URL {:?}", url))?;

    Path::new(last_segment)
        .file_stem()
        .and_then(|stem| stem.to_str())
        .filter(|stem| !stem.is_empty())
        .map(String::from)
        .ok_or_else(|| anyhow!("Cannot derive repository name from URL {:?}", url))
}

pub fn get_config_path() -> Result<PathBuf> {
    let proj_dirs = ProjectDirs::from("com", "code-scraper", "code-scraper")
        .ok_or_else(|| anyhow!("Could not determine config directory"))?;

    Ok(proj_dirs.config_dir().join("config.toml"))
}

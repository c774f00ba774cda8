use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::*;
use std::env;
use std::path::PathBuf;
use tracing::debug;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use code_scraper::batch::{cleanup_repos, CleanupStatus};
use code_scraper::config::{get_config_path, Config};
use code_scraper::download::download_and_list;
use code_scraper::{BatchRunner, OllamaClient, PathMirror};

#[derive(Debug, Parser)]
#[command(name = "code-scraper", version, about = "Per-file AI framework/dependency metadata for a repository")]
struct CliArgs {
    #[command(subcommand)]
    command: Commands,

    /// Config file (defaults to the per-user config when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Debug output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Errors only
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    /// trace, debug, info, warn or error
    #[arg(long, global = true)]
    log_level: Option<String>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Clone or update the repository and write the file manifest
    Download,
    /// Classify every file in the manifest and write the JSON sidecars
    Analyze {
        /// Keep the cloned repositories after the run
        #[arg(long)]
        keep_repos: bool,
    },
    /// Download, then analyze
    Run {
        #[arg(long)]
        keep_repos: bool,
    },
    /// Delete the cloned repositories
    Cleanup,
    /// Check that the model server is reachable
    Health,
    /// Write a default config file
    InitConfig {
        path: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() {
    let args = CliArgs::parse();
    init_logging(&args);
    debug!("Arguments: {:?}", args);

    if let Err(e) = run(args).await {
        eprintln!("{}: {:#}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

async fn run(args: CliArgs) -> Result<()> {
    if let Commands::InitConfig { path } = &args.command {
        let path = match path {
            Some(path) => path.clone(),
            None => get_config_path()?,
        };
        Config::create_default(&path)?;
        println!("Created default config file at {:?}", path);
        return Ok(());
    }

    let config = Config::resolve(args.config.as_deref())?;

    match args.command {
        Commands::Download => download(&config),
        Commands::Analyze { keep_repos } => analyze(&config, keep_repos).await,
        Commands::Run { keep_repos } => {
            download(&config)?;
            analyze(&config, keep_repos).await
        }
        Commands::Cleanup => {
            cleanup(&config);
            Ok(())
        }
        Commands::Health => health(&config).await,
        Commands::InitConfig { .. } => Ok(()),
    }
}

fn download(config: &Config) -> Result<()> {
    let summary = download_and_list(config)?;
    println!(
        "{} {} frontend files in {:?}{}",
        "Found".green().bold(),
        summary.file_count,
        summary.repo_path,
        summary
            .branch
            .map(|b| format!(" ({})", b))
            .unwrap_or_default()
    );
    println!("Manifest: {:?}", summary.manifest_path);
    Ok(())
}

async fn analyze(config: &Config, keep_repos: bool) -> Result<()> {
    println!("{}", "Starting analysis...".green().bold());
    println!(
        "Model: {} @ {} (batch size {})",
        config.ai.model.blue(),
        config.ai.endpoint,
        config.ai.batch_size
    );

    let client = OllamaClient::from_config(&config.ai)?;
    let mirror = PathMirror::new(
        &config.repository.repos_path,
        &config.repository.data_path,
        &config.output.suffix,
    );
    let runner = BatchRunner::new(&client, mirror).with_progress(true);
    let report = runner.run(&config.manifest_path()).await?;

    println!("{} {}", "Done:".green().bold(), report);
    if report.fallbacks > 0 || report.failed > 0 {
        println!(
            "{}",
            format!(
                "{} files fell back to an empty classification, {} could not be written",
                report.fallbacks, report.failed
            )
            .yellow()
        );
    }

    if config.output.cleanup_repos && !keep_repos {
        cleanup(config);
    }
    println!("{}", "Pipeline completed".green().bold());
    Ok(())
}

fn cleanup(config: &Config) {
    match cleanup_repos(&config.repository.repos_path) {
        CleanupStatus::Removed(path) => println!("Removed {:?}", path),
        CleanupStatus::NothingToRemove => println!("No repositories to delete"),
        CleanupStatus::Failed(reason) => {
            eprintln!("{}: {}", "Cleanup failed".red().bold(), reason)
        }
    }
}

async fn health(config: &Config) -> Result<()> {
    let client = OllamaClient::from_config(&config.ai)?;
    if client.health_check().await? {
        println!("{} {}", "Ollama is available at".green(), config.ai.endpoint);
        Ok(())
    } else {
        Err(anyhow::anyhow!("Ollama is not responding at {}", config.ai.endpoint))
    }
}

fn init_logging(args: &CliArgs) {
    // RUST_LOG replaces the computed directives entirely.
    let filter = match env::var("RUST_LOG") {
        Ok(directives) => EnvFilter::new(directives),
        Err(_) => EnvFilter::builder()
            .with_default_directive(LevelFilter::ERROR.into())
            .parse_lossy(format!(
                "code_scraper={},hyper=warn,reqwest=warn",
                log_level(args)
            )),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
        .init();
}

/// `--log-level` wins, then `-v`/`-q`, then CODE_SCRAPER_LOG.
fn log_level(args: &CliArgs) -> LevelFilter {
    let requested = match (&args.log_level, args.verbose, args.quiet) {
        (Some(level), _, _) => level.clone(),
        (None, true, _) => return LevelFilter::DEBUG,
        (None, _, true) => return LevelFilter::ERROR,
        (None, false, false) => match env::var("CODE_SCRAPER_LOG") {
            Ok(level) => level,
            Err(_) => return LevelFilter::INFO,
        },
    };

    requested.parse().unwrap_or_else(|_| {
        eprintln!(
            "Invalid log level '{}', using info (expected off, trace, debug, info, warn or error)",
            requested
        );
        LevelFilter::INFO
    })
}

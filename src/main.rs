use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};
use gutendex_dataset::config::{find_config_file, get_config, load_config, Config};
use gutendex_dataset::harvest::{HarvestOptions, Harvester};
use gutendex_dataset::models::SearchQuery;
use gutendex_dataset::sources::GutendexSource;
use gutendex_dataset::ui::{print_failures, print_summary};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Collects data about books from the Gutendex API and saves it to a CSV file.
#[derive(Parser, Debug)]
#[command(name = "gutendex-dataset")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Collects data about books from the Gutendex API and saves it to a CSV file.", long_about = None)]
struct Cli {
    /// The topic query for the books (e.g. "science fiction")
    #[arg(value_name = "QUERY")]
    query: Option<String>,

    /// The name of the CSV file to save the dataset to
    #[arg(value_name = "CSV_FILENAME")]
    csv_filename: Option<String>,

    /// Enable verbose logging (can be used multiple times for more verbosity: -v, -vv)
    #[arg(long, short, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(long, short)]
    quiet: bool,

    /// Configuration file path
    #[arg(long)]
    config: Option<PathBuf>,

    /// Seconds to pause after each saved book
    #[arg(long)]
    delay: Option<u64>,

    /// Extra attempts for requests that fail transiently (network errors, 429, 5xx)
    #[arg(long)]
    retries: Option<u32>,

    /// Stop after this many listing pages
    #[arg(long)]
    max_pages: Option<usize>,

    /// Alternative API root (a Gutendex mirror)
    #[arg(long)]
    base_url: Option<String>,

    /// Show all environment variables
    #[arg(long)]
    env: bool,
}

impl Cli {
    /// The query and dataset path, or `None` when either is missing or the
    /// file name is empty
    fn targets(&self) -> Option<(String, PathBuf)> {
        let query = self.query.clone()?;
        let csv_filename = self.csv_filename.as_deref().filter(|f| !f.is_empty())?;
        Some((query, PathBuf::from(csv_filename)))
    }

    /// Apply command-line overrides on top of the loaded configuration
    fn apply_overrides(&self, config: &mut Config) {
        if let Some(delay) = self.delay {
            config.harvest.delay_secs = delay;
        }
        if let Some(retries) = self.retries {
            config.retry.max_attempts = retries.saturating_add(1);
        }
        if let Some(max_pages) = self.max_pages {
            config.harvest.max_pages = Some(max_pages);
        }
        if let Some(base_url) = &self.base_url {
            config.api.base_url = base_url.clone();
        }
    }
}

/// Print all available environment variables
fn print_env_vars() {
    println!("Gutendex Dataset - Environment Variables");
    println!();
    println!("API:");
    println!("  GUTENDEX_DATASET_API__BASE_URL              API root (default: https://gutendex.com)");
    println!("  GUTENDEX_DATASET_API__USER_AGENT            Custom User-Agent header");
    println!("  GUTENDEX_DATASET_API__TIMEOUT_SECS          Request timeout in seconds (default: 120)");
    println!("  GUTENDEX_DATASET_API__CONNECT_TIMEOUT_SECS  Connect timeout in seconds (default: 10)");
    println!();
    println!("Harvest:");
    println!("  GUTENDEX_DATASET_HARVEST__DELAY_SECS        Pause after each saved book (default: 3)");
    println!("  GUTENDEX_DATASET_HARVEST__MAX_PAGES         Stop after this many pages (default: unlimited)");
    println!();
    println!("Retry:");
    println!("  GUTENDEX_DATASET_RETRY__MAX_ATTEMPTS        Attempts per request (default: 1)");
    println!("  GUTENDEX_DATASET_RETRY__INITIAL_DELAY_MS    First backoff delay (default: 2000)");
    println!("  GUTENDEX_DATASET_RETRY__MAX_DELAY_SECS      Backoff ceiling (default: 60)");
    println!();
    println!("Other Settings:");
    println!("  RUST_LOG                    Rust logging level (e.g., debug, info, warn, error)");
    println!();
    println!("Example:");
    println!("  export GUTENDEX_DATASET_HARVEST__DELAY_SECS=\"5\"");
    println!("  gutendex-dataset \"science fiction\" /tmp/sci-fi-books.csv");
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.env {
        print_env_vars();
        return Ok(());
    }

    let Some((query, csv_filename)) = cli.targets() else {
        Cli::command().print_help()?;
        println!();
        return Ok(());
    };

    let log_level = match cli.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };

    let env_filter = if cli.quiet { "error" } else { log_level };

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG")
                .unwrap_or_else(|_| format!("gutendex_dataset={}", env_filter)),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let mut config = if let Some(config_path) = &cli.config {
        load_config(config_path)
            .with_context(|| format!("Failed to load config {}", config_path.display()))?
    } else if let Some(config_path) = find_config_file() {
        tracing::info!("Using config file: {}", config_path.display());
        load_config(&config_path)
            .with_context(|| format!("Failed to load config {}", config_path.display()))?
    } else {
        get_config().context("Failed to read configuration from environment")?
    };
    cli.apply_overrides(&mut config);

    let source = GutendexSource::from_config(&config.api, &config.retry)?;
    let options = HarvestOptions {
        quiet: cli.quiet,
        ..HarvestOptions::from(&config.harvest)
    };

    let summary = Harvester::new(source, options)
        .run(&SearchQuery::new(query), &csv_filename)
        .await?;

    if cli.quiet {
        print_failures(&summary);
    } else {
        print_summary(&summary, &csv_filename);
    }

    Ok(())
}

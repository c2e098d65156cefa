//! Listing-Harvest main entry point
//!
//! This is the command-line interface for the Listing-Harvest extractor.

use anyhow::{bail, Context};
use clap::Parser;
use listing_harvest::config::{load_config_with_hash, CategoryEntry, Config};
use listing_harvest::crawler::Orchestrator;
use listing_harvest::output::{print_statistics, write_envelope};
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

/// Listing-Harvest: a paginated listing extractor
///
/// Listing-Harvest walks every page of the configured listing URLs, extracts
/// business-for-sale records, normalizes their amounts and writes them to a
/// single JSON file grouped by category.
#[derive(Parser, Debug)]
#[command(name = "listing-harvest")]
#[command(version = "1.0.0")]
#[command(about = "A paginated listing extractor", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Write the JSON result here instead of the configured path
    #[arg(short, long, value_name = "PATH")]
    output: Option<PathBuf>,

    /// Only harvest the named category (repeatable)
    #[arg(long = "category", value_name = "NAME", conflicts_with = "url")]
    categories: Vec<String>,

    /// Harvest a single listing URL instead of the category table
    #[arg(long, value_name = "URL")]
    url: Option<String>,

    /// Category name used for --url
    #[arg(long, value_name = "NAME", requires = "url", default_value = "single_url")]
    label: String,

    /// Validate config and show what would be harvested without fetching anything
    #[arg(long)]
    dry_run: bool,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, hash) = load_config_with_hash(&cli.config)
        .with_context(|| format!("failed to load {}", cli.config.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", hash);

    let categories = select_categories(&config, &cli)?;
    let output = cli
        .output
        .clone()
        .unwrap_or_else(|| PathBuf::from(&config.output.json_path));

    if cli.dry_run {
        handle_dry_run(&config, &categories, &output);
        return Ok(());
    }

    handle_harvest(&config, &categories, output, cli.quiet).await
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("listing_harvest=info,warn"),
            1 => EnvFilter::new("listing_harvest=debug,info"),
            2 => EnvFilter::new("listing_harvest=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Resolves which categories this run covers from the command line
fn select_categories(config: &Config, cli: &Cli) -> anyhow::Result<Vec<CategoryEntry>> {
    if let Some(url) = &cli.url {
        return Ok(vec![CategoryEntry {
            name: cli.label.clone(),
            urls: vec![url.clone()],
        }]);
    }

    if cli.categories.is_empty() {
        return Ok(config.categories.clone());
    }

    for name in &cli.categories {
        if !config.categories.iter().any(|c| &c.name == name) {
            bail!("unknown category '{}'", name);
        }
    }

    Ok(config
        .categories
        .iter()
        .filter(|c| cli.categories.contains(&c.name))
        .cloned()
        .collect())
}

/// Handles the --dry-run mode: shows the resolved configuration and planned URLs
fn handle_dry_run(config: &Config, categories: &[CategoryEntry], output: &std::path::Path) {
    println!("=== Listing-Harvest Dry Run ===\n");

    println!("HTTP:");
    println!("  User agent: {}", config.http.user_agent);
    println!("  Accept-Language: {}", config.http.accept_language);
    println!("  Timeout: {}s", config.http.timeout_secs);
    println!("  Cookies: {}", config.http.cookies);

    println!("\nFetching:");
    println!("  Max attempts: {}", config.fetch.max_attempts);
    println!(
        "  Politeness delay: {}ms (+{}ms per retry)",
        config.fetch.politeness_delay_ms, config.fetch.politeness_step_ms
    );

    println!("\nPagination:");
    println!("  Max pages: {}", config.pagination.max_pages);
    println!("  Page delay: {}ms", config.pagination.page_delay_ms);
    println!(
        "  Terminal markers: {}",
        config.pagination.terminal_markers.join(", ")
    );
    println!(
        "  Max items per page: {}",
        config.extraction.max_items_per_page
    );

    println!("\nOutput:");
    println!("  JSON: {}", output.display());

    println!("\nCategories ({}):", categories.len());
    for category in categories {
        println!("  - {} ({} URLs)", category.name, category.urls.len());
        for url in &category.urls {
            println!("    * {}", url);
        }
    }

    println!("\n✓ Configuration is valid");
    println!(
        "✓ Would start harvesting with {} listing URLs",
        categories.iter().map(|c| c.urls.len()).sum::<usize>()
    );
}

/// Handles the main harvest operation
async fn handle_harvest(
    config: &Config,
    categories: &[CategoryEntry],
    output: PathBuf,
    quiet: bool,
) -> anyhow::Result<()> {
    let cancel = CancellationToken::new();
    let on_signal = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupt received, finishing with partial results");
            on_signal.cancel();
        }
    });

    tracing::info!(
        "Categories: {}, listing URLs: {}",
        categories.len(),
        categories.iter().map(|c| c.urls.len()).sum::<usize>()
    );

    let orchestrator = Orchestrator::from_config(config, cancel.clone())?;
    let run = orchestrator.run_with_statistics(categories).await;

    write_envelope(&run.envelope, &output)
        .with_context(|| format!("failed to write {}", output.display()))?;

    if !quiet {
        print_statistics(&run.envelope, &run.statistics);
    }

    if cancel.is_cancelled() {
        tracing::warn!("Harvest was interrupted; results are partial");
    }

    Ok(())
}

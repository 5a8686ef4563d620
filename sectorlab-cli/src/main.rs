//! SectorLab CLI — sector classification, trade planning and news summaries.
//!
//! Commands:
//! - `classify` — refresh the ticker/sector snapshot when it is stale
//! - `trade` — print long/short decisions for the configured sector baskets
//! - `news` — scrape headlines and print an LLM summary
//! - `status` — list snapshots and their freshness

use anyhow::Result;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use sectorlab_core::config::{ApiKey, AppConfig};
use sectorlab_core::data::{
    Collaborators, DatasetCache, DatasetError, DirectoryStore, Freshness, OpenAiClient,
    StdoutProgress, WikipediaUniverse,
};
use sectorlab_core::news::{summarize_news, HtmlHeadlineSource};
use sectorlab_core::trade::plan_trades;
use std::path::PathBuf;
use tracing_subscriber::filter::Targets;
use tracing_subscriber::prelude::*;

#[derive(Parser)]
#[command(
    name = "sectorlab",
    about = "SectorLab CLI — sector-classified S&P 500 snapshots and recession baskets"
)]
struct Cli {
    /// TOML config file. Defaults to ./sectorlab.toml when present.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log at debug level.
    #[arg(short, long, global = true, default_value_t = false)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scrape and classify the S&P 500 unless the current snapshot is fresh.
    Classify,
    /// Print which tickers would be longed or shorted.
    Trade,
    /// Scrape news headlines and print a summary.
    News,
    /// List snapshots with their dates and freshness.
    Status,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = AppConfig::load(cli.config.as_deref())?;
    let today = chrono::Local::now().date_naive();

    match cli.command {
        Commands::Classify => run_classify(&config, today),
        Commands::Trade => run_trade(&config, today),
        Commands::News => run_news(&config),
        Commands::Status => run_status(&config, today),
    }
}

fn init_tracing(verbose: bool) {
    let level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_filter(
            Targets::new()
                .with_target("reqwest", tracing::Level::WARN)
                .with_target("html5ever", tracing::Level::WARN)
                .with_default(level),
        );
    tracing_subscriber::registry().with(fmt_layer).init();
}

fn open_cache(config: &AppConfig) -> DatasetCache<DirectoryStore> {
    DatasetCache::new(
        DirectoryStore::new(&config.storage.dir),
        config.storage.policy(),
    )
}

/// Credential first, then clients: nothing touches the network without a key.
fn connect(config: &AppConfig) -> Result<Collaborators, DatasetError> {
    let api_key = ApiKey::from_env(&config.openai.api_key_env)?;
    Ok(Collaborators {
        tickers: Box::new(WikipediaUniverse::new(&config.universe)?),
        classifier: Box::new(OpenAiClient::new(&config.openai, api_key)?),
    })
}

fn run_classify(config: &AppConfig, today: NaiveDate) -> Result<()> {
    let cache = open_cache(config);

    if !cache.needs_update(today)? {
        println!(
            "File not older than {} months. Skipping update",
            cache.policy().max_age_months
        );
        return Ok(());
    }

    let snapshot = cache.current_dataset(today, || connect(config), &StdoutProgress)?;
    tracing::info!(
        snapshot = %snapshot.name(),
        records = snapshot.len(),
        "classification complete"
    );
    Ok(())
}

fn run_trade(config: &AppConfig, today: NaiveDate) -> Result<()> {
    let cache = open_cache(config);
    let snapshot = cache.current_dataset(today, || connect(config), &StdoutProgress)?;
    tracing::debug!(snapshot = %snapshot.name(), "planning trades");
    if snapshot.is_empty() {
        tracing::warn!(snapshot = %snapshot.name(), "snapshot has no records; nothing to trade");
        return Ok(());
    }

    for intent in plan_trades(&snapshot.records, &config.baskets) {
        println!("{intent}");
    }
    Ok(())
}

fn run_news(config: &AppConfig) -> Result<()> {
    let api_key = ApiKey::from_env(&config.openai.api_key_env)?;
    let summarizer = OpenAiClient::new(&config.openai, api_key)?;
    let fetcher = HtmlHeadlineSource::new(&config.news)?;
    tracing::debug!(
        model = summarizer.model(),
        sources = config.news.sources.len(),
        "summarizing news"
    );

    let summary = summarize_news(&fetcher, &summarizer, &config.news.sources)?;
    println!("{summary}");
    Ok(())
}

fn run_status(config: &AppConfig, today: NaiveDate) -> Result<()> {
    let cache = open_cache(config);
    let dir = cache.store().dir().display();

    let statuses = cache.status(today)?;
    if statuses.is_empty() {
        println!("No snapshots in {dir}");
        return Ok(());
    }

    println!("Snapshots in {dir} (newest first):");
    for s in &statuses {
        let date = s
            .date
            .map(|d| d.to_string())
            .unwrap_or_else(|| "invalid date".into());
        let state = if s.stale { "stale" } else { "fresh" };
        let marker = if s.current { "*" } else { " " };
        println!("{marker} {:<45} {date:<12} {state}", s.name);
    }

    match cache.freshness(today)? {
        Freshness::Fresh { name, .. } => println!("\nCurrent snapshot {name} is fresh."),
        Freshness::Stale { name, date } => {
            println!("\nCurrent snapshot {name} ({date}) is stale; `classify` will refresh it.")
        }
        Freshness::Unparsable { name } => {
            println!("\nCurrent snapshot {name} has no valid date; `classify` will refresh it.")
        }
        Freshness::Missing => {}
    }
    Ok(())
}

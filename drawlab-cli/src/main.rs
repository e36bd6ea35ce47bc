//! DrawLab CLI — scrape, reconcile, and export draw records.
//!
//! Commands:
//! - `scrape` — fetch the most recent draws from every source, reconcile,
//!   and write the fixed-column CSV dataset
//! - `probe` — parse a single issue from every source and print the partial
//!   records (parser debugging aid)

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use serde::Deserialize;

use drawlab_core::crosscheck;
use drawlab_core::export;
use drawlab_core::fetch::{FetchConfig, HttpFetcher, PageFetcher};
use drawlab_core::reconcile::SourcePriority;
use drawlab_core::scrape::{scrape_recent, StdoutProgress};
use drawlab_core::sources::default_sources;

#[derive(Parser)]
#[command(
    name = "drawlab",
    about = "DrawLab CLI — multi-source draw-record scraper"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scrape the most recent draws and write the dataset as CSV.
    Scrape {
        /// Maximum number of most-recent issues to process.
        #[arg(long, default_value_t = 50)]
        limit: usize,

        /// Output CSV path.
        #[arg(long)]
        out: PathBuf,

        /// Politeness delay between per-issue fetches, in milliseconds.
        #[arg(long, default_value_t = 150)]
        delay_ms: u64,

        /// Optional TOML config file (fetch settings, source priorities).
        #[arg(long)]
        config: Option<PathBuf>,

        /// Disable the mirror-transport fallback.
        #[arg(long, default_value_t = false)]
        no_mirror: bool,

        /// Skip the specialist first-tier cross-check page.
        #[arg(long, default_value_t = false)]
        no_cross_check: bool,
    },
    /// Fetch one issue from every source and print the partial records.
    Probe {
        /// Issue id (7-digit year+sequence code, e.g. 2025088).
        issue: String,

        /// Optional TOML config file.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Disable the mirror-transport fallback.
        #[arg(long, default_value_t = false)]
        no_mirror: bool,
    },
}

/// Optional config file contents; every knob falls back to a default.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileConfig {
    #[serde(default)]
    fetch: FetchSection,
    priority: Option<SourcePriority>,
    cross_check_url: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FetchSection {
    user_agent: Option<String>,
    timeout_secs: Option<u64>,
    mirror_prefix: Option<String>,
    mirror_timeout_secs: Option<u64>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Scrape {
            limit,
            out,
            delay_ms,
            config,
            no_mirror,
            no_cross_check,
        } => run_scrape(limit, &out, delay_ms, config.as_deref(), no_mirror, no_cross_check),
        Commands::Probe {
            issue,
            config,
            no_mirror,
        } => run_probe(&issue, config.as_deref(), no_mirror),
    }
}

fn load_config(path: Option<&Path>) -> Result<FileConfig> {
    let Some(path) = path else {
        return Ok(FileConfig::default());
    };
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config file: {}", path.display()))?;
    toml::from_str(&content)
        .with_context(|| format!("failed to parse config file: {}", path.display()))
}

fn build_fetch_config(section: &FetchSection, no_mirror: bool) -> FetchConfig {
    let mut config = FetchConfig::default();
    if let Some(ua) = &section.user_agent {
        config.user_agent = ua.clone();
    }
    if let Some(secs) = section.timeout_secs {
        config.timeout = Duration::from_secs(secs);
    }
    if let Some(prefix) = &section.mirror_prefix {
        config.mirror_prefix = Some(prefix.clone());
    }
    if let Some(secs) = section.mirror_timeout_secs {
        config.mirror_timeout = Duration::from_secs(secs);
    }
    if no_mirror {
        config.mirror_prefix = None;
    }
    config
}

fn run_scrape(
    limit: usize,
    out: &Path,
    delay_ms: u64,
    config_path: Option<&Path>,
    no_mirror: bool,
    no_cross_check: bool,
) -> Result<()> {
    let file_config = load_config(config_path)?;
    let fetcher: Arc<dyn PageFetcher> =
        Arc::new(HttpFetcher::new(build_fetch_config(&file_config.fetch, no_mirror)));
    let sources = default_sources(fetcher.clone());
    let priority = file_config.priority.unwrap_or_default();

    let cross_check = if no_cross_check {
        None
    } else {
        let url = file_config
            .cross_check_url
            .as_deref()
            .unwrap_or(crosscheck::DEFAULT_TOTALS_URL);
        match crosscheck::fetch_first_tier_totals(fetcher.as_ref(), url) {
            Ok(totals) => Some(totals),
            Err(e) => {
                eprintln!("WARNING: cross-check page unavailable: {e}");
                None
            }
        }
    };

    let summary = scrape_recent(
        &sources,
        &priority,
        cross_check.as_ref(),
        limit,
        Duration::from_millis(delay_ms),
        &StdoutProgress,
    )?;

    for warning in &summary.warnings {
        eprintln!("WARNING: {warning}");
    }

    let csv = export::export_csv(&summary.records)?;
    if let Some(parent) = out.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create output dir: {}", parent.display()))?;
    }
    std::fs::write(out, &csv)
        .with_context(|| format!("failed to write dataset: {}", out.display()))?;

    println!(
        "Saved: {} rows={} ({}/{} requested issues recovered)",
        out.display(),
        summary.recovered,
        summary.recovered,
        summary.requested
    );
    Ok(())
}

fn run_probe(issue: &str, config_path: Option<&Path>, no_mirror: bool) -> Result<()> {
    if issue.len() != 7 || !issue.starts_with("20") || !issue.bytes().all(|b| b.is_ascii_digit()) {
        bail!("'{issue}' does not look like an issue id (expected a 7-digit code like 2025088)");
    }

    let file_config = load_config(config_path)?;
    let fetcher: Arc<dyn PageFetcher> =
        Arc::new(HttpFetcher::new(build_fetch_config(&file_config.fetch, no_mirror)));

    for source in default_sources(fetcher) {
        println!("=== {} ===", source.name());
        match source.parse_issue(issue) {
            Some(partial) => println!("{partial:#?}"),
            None => println!("(page unavailable or format not recognized)"),
        }
    }
    Ok(())
}

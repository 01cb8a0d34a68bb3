//! Leaguemine main entry point
//!
//! Command-line interface for running crawl cycles and inspecting standings.

use anyhow::Context;
use clap::Parser;
use leaguemine::config::load_config_with_hash;
use leaguemine::crawler::crawl;
use leaguemine::ranking::{self, RankedEntry};
use leaguemine::snapshot;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Leaguemine: a league standings miner
///
/// Crawls the configured profile pages, merges the results into the
/// persisted snapshot, and reports the ranked standings with per-player
/// movement since the previous run.
#[derive(Parser, Debug)]
#[command(name = "leaguemine")]
#[command(version = "1.0.0")]
#[command(about = "A league standings miner", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and show what would be crawled without crawling
    #[arg(long, conflicts_with = "standings")]
    dry_run: bool,

    /// Print the persisted snapshot's standings and exit
    #[arg(long, conflicts_with = "dry_run")]
    standings: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, config_hash) = load_config_with_hash(&cli.config)
        .with_context(|| format!("loading {}", cli.config.display()))?;
    tracing::info!("Configuration loaded (hash: {})", config_hash);

    if cli.dry_run {
        handle_dry_run(&config)?;
    } else if cli.standings {
        handle_standings(&config);
    } else {
        handle_crawl(config).await?;
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("leaguemine=info,warn"),
            1 => EnvFilter::new("leaguemine=debug,info"),
            2 => EnvFilter::new("leaguemine=trace,debug"),
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

/// Handles --dry-run: validates config and shows what would be crawled
fn handle_dry_run(config: &leaguemine::Config) -> anyhow::Result<()> {
    println!("=== Leaguemine Dry Run ===\n");

    println!("Crawler:");
    println!("  Workers: {}", config.crawler.concurrency);
    println!("  Mode settle: {}s", config.crawler.mode_settle_secs);

    println!("\nSession pool:");
    println!("  Endpoint: {}", config.session.webdriver_url);
    println!("  Pool size: {}", config.session.pool_size);
    println!("  Usage quota: {}", config.session.usage_quota);
    println!("  Lease timeout: {}s", config.session.lease_timeout_secs);

    println!("\nOutput:");
    println!("  Snapshot: {}", config.output.snapshot_path);
    println!("  Display: {}", config.output.display_path);

    let targets = leaguemine::targets::load_targets(Path::new(&config.targets.list_path))
        .with_context(|| format!("loading {}", config.targets.list_path))?;

    println!("\nTargets ({}):", targets.len());
    for target in &targets {
        if target.annotation.is_empty() {
            println!("  - {}", target.url);
        } else {
            println!("  - {} ({})", target.url, target.annotation);
        }
    }

    println!("\n✓ Configuration is valid");
    println!("✓ Would crawl {} targets", targets.len());

    Ok(())
}

/// Handles --standings: prints the persisted snapshot's ranking and exits
fn handle_standings(config: &leaguemine::Config) {
    let snapshot = snapshot::load_snapshot(Path::new(&config.output.snapshot_path));
    if snapshot.is_empty() {
        println!("No snapshot data at {}", config.output.snapshot_path);
        return;
    }

    // Ranking against its own rank map: standings without movement
    let ranks = ranking::rank_map(&snapshot);
    let ranked = ranking::rank(&snapshot, &ranks);
    print_standings(&ranked);
}

/// Handles the main crawl operation
async fn handle_crawl(config: leaguemine::Config) -> anyhow::Result<()> {
    let report = crawl(config).await?;

    println!(
        "\n{} targets: {} succeeded, {} failed",
        report.summary.total_targets, report.summary.succeeded, report.summary.failed
    );
    print_standings(&report.ranked);

    Ok(())
}

fn print_standings(ranked: &[RankedEntry]) {
    println!(
        "\n{:>4}  {:<12} {:<20} {:>11} {:>6} {:>8}  {}",
        "Rank", "Player", "Owner", "W-D-L", "Eff", "Win%", "Delta"
    );

    for row in ranked {
        let entry = &row.entry;
        let rank = row
            .rank
            .map(|r| r.to_string())
            .unwrap_or_else(|| "-".to_string());
        let owner = entry.owner_name.as_deref().unwrap_or("-");

        match &entry.record {
            Some(record) => println!(
                "{:>4}  {:<12} {:<20} {:>11} {:>6} {:>7.2}%  {}",
                rank,
                entry.player_id,
                owner,
                format!("{}-{}-{}", record.wins, record.draws, record.losses),
                record.efficiency_score,
                record.win_rate_percent,
                row.delta
            ),
            None => println!(
                "{:>4}  {:<12} {:<20} {:>11} {:>6} {:>8}  {}",
                rank,
                entry.player_id,
                owner,
                "-",
                "-",
                "-",
                entry.error_detail.as_deref().unwrap_or("error")
            ),
        }
    }
}

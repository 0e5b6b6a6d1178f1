//! IronMQ Migration CLI
//!
//! CLI tool for moving queues from the v2 service to the v3 service.
//! Pedantic lints relaxed for CLI ergonomics.

// CLI tool - relax pedantic lints for ergonomics
#![allow(clippy::pedantic)]

use clap::Parser;
use std::path::PathBuf;
use tracing::{error, info, Level};
use tracing_subscriber::FmtSubscriber;

use ironmq_migrate::{MigrationConfig, Pipeline};

#[derive(Parser, Debug)]
#[command(name = "ironmq-migrate")]
#[command(version)]
#[command(about = "Move IronMQ queues and their messages from v2 to v3", long_about = None)]
#[command(after_help = "Flags take a double dash, e.g. --v2_project_id instead of -v2_project_id.")]
struct Cli {
    /// v2 (source) project id
    #[arg(long = "v2_project_id", env = "IRON_V2_PROJECT_ID", value_name = "ID")]
    v2_project_id: Option<String>,

    /// v2 (source) token
    #[arg(long = "v2_token", env = "IRON_V2_TOKEN", hide_env_values = true)]
    v2_token: Option<String>,

    /// v3 (destination) project id
    #[arg(long = "v3_project_id", env = "IRON_V3_PROJECT_ID", value_name = "ID")]
    v3_project_id: Option<String>,

    /// v3 (destination) token
    #[arg(long = "v3_token", env = "IRON_V3_TOKEN", hide_env_values = true)]
    v3_token: Option<String>,

    /// Source host [default: mq-aws-us-east-1.iron.io]
    #[arg(long, value_name = "HOST")]
    from: Option<String>,

    /// Destination host [default: mq-aws-us-east-1-1.iron.io]
    #[arg(long, value_name = "HOST")]
    to: Option<String>,

    /// Copy queue metadata only
    #[arg(long = "skip-messages")]
    skip_messages: bool,

    /// Move just this queue
    #[arg(long, value_name = "NAME")]
    queue: Option<String>,

    /// Number of queues to move at a time [default: 1]
    #[arg(long, value_name = "N")]
    threads: Option<usize>,

    /// Configuration file path
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Fetch and log queue definitions without writing anything
    #[arg(long)]
    dry_run: bool,

    /// Per-request timeout in seconds (none by default)
    #[arg(long, value_name = "SECS")]
    timeout: Option<u64>,

    /// Hide the progress bar
    #[arg(long)]
    no_progress: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let config = match build_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            error!(err = %e, "invalid configuration");
            std::process::exit(1);
        }
    };

    let show_progress = !cli.no_progress && config.options.queue.is_none();
    let pipeline = Pipeline::new(config)?.with_progress(show_progress);
    let stats = pipeline.run().await;

    println!("\nMigration summary");
    println!("   Queues:     {}", stats.queues_total);
    println!("   Migrated:   {}", stats.queues_migrated);
    println!("   Failed:     {}", stats.queues_failed);
    println!("   Messages:   {}", stats.messages_moved);
    println!("   Duration:   {:.2}s", stats.duration_secs);
    println!("   Throughput: {:.0} messages/sec", stats.throughput());

    Ok(())
}

/// Layers CLI flags over the config file (or defaults) and validates the result.
fn build_config(cli: &Cli) -> anyhow::Result<MigrationConfig> {
    let mut config = match &cli.config {
        Some(path) => {
            info!("Loading configuration from {:?}", path);
            MigrationConfig::from_file(path)?
        }
        None => MigrationConfig::default(),
    };

    if let Some(id) = &cli.v2_project_id {
        config.source.project_id = id.clone();
    }
    if let Some(token) = &cli.v2_token {
        config.source.token = token.clone();
    }
    if let Some(id) = &cli.v3_project_id {
        config.destination.project_id = id.clone();
    }
    if let Some(token) = &cli.v3_token {
        config.destination.token = token.clone();
    }
    if let Some(host) = &cli.from {
        config.source.host = host.clone();
    }
    if let Some(host) = &cli.to {
        config.destination.host = host.clone();
    }
    if let Some(threads) = cli.threads {
        config.options.threads = threads;
    }
    if cli.queue.is_some() {
        config.options.queue = cli.queue.clone().filter(|q| !q.is_empty());
    }
    if cli.skip_messages {
        config.options.skip_messages = true;
    }
    if cli.dry_run {
        config.options.dry_run = true;
    }
    if cli.timeout.is_some() {
        config.options.request_timeout_secs = cli.timeout;
    }

    config.validate()?;
    Ok(config)
}

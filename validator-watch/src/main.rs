//! Validator Watch - Headless Daemon
//!
//! Polls the local node's consensus API and pages through PagerDuty when:
//! - the validator misses too many precommits in a row
//! - the validator's latest signature is older than allowed
//! - the node API keeps failing
//!
//! Counters and throttle state live in memory only; a restart starts clean.

#![allow(clippy::print_stdout, reason = "CLI commands write results to stdout")]

use anyhow::{Context, Result};
use clap::Parser;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

mod cli;
mod scheduler;

use cli::{Cli, Commands};
use scheduler::Scheduler;
use validator_watch_core::{config, Clock, HealthEvaluator, NodeClient, Pager, SystemClock};
use validator_watch_types::MonitorConfig;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_new(&cli.log_level)
        .with_context(|| format!("Invalid log level {:?}", cli.log_level))?;
    let subscriber = FmtSubscriber::builder().with_env_filter(filter).finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let config = resolve_config(&cli)?;

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => run(config).await,
        Commands::Check => check(config).await,
        Commands::Config => show_config(&config),
    }
}

fn resolve_config(cli: &Cli) -> Result<MonitorConfig> {
    let mut config = config::load_config(cli.config.as_deref())?;
    cli.overrides.apply(&mut config);
    Ok(config)
}

fn build_scheduler(config: MonitorConfig) -> Result<Scheduler<NodeClient>> {
    config.validate()?;

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let node = NodeClient::new(&config.node).context("Failed to build node API client")?;
    let pager = Pager::from_config(&config.pager, clock.clone())
        .context("Failed to build PagerDuty client")?;

    info!("📡 Node API: {}?name={}", node.commit_url(), config.node.name);
    if pager.is_configured() {
        info!("📟 Paging PagerDuty service {}", config.pager.service_id);
    }

    let evaluator = HealthEvaluator::new(config, pager, clock);
    Ok(Scheduler::new(evaluator, node))
}

async fn run(config: MonitorConfig) -> Result<()> {
    info!(
        "🚀 Starting Validator Health Monitor {} (built {})",
        env!("GIT_VERSION"),
        env!("BUILD_TIME")
    );

    let scheduler = build_scheduler(config)?;
    let shutdown_rx = scheduler::shutdown_channel();
    let cycles = scheduler.run(shutdown_rx).await;

    info!("👋 Stopped after {} health checks", cycles);
    Ok(())
}

async fn check(config: MonitorConfig) -> Result<()> {
    let mut scheduler = build_scheduler(config)?;
    let outcome = scheduler.run_once().await;

    println!("{}: {}", outcome.kind(), outcome);
    if !outcome.is_healthy() {
        anyhow::bail!("Health check did not pass ({})", outcome.kind());
    }
    Ok(())
}

fn show_config(config: &MonitorConfig) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(&config.redacted())?);
    if let Err(e) = config.validate() {
        tracing::warn!("{}", e);
    }
    Ok(())
}

//! azcost - month-to-date Azure costs per resource group
//!
//! Queries Cost Management for every resource group in a subscription,
//! prints ranked tables and optionally exports CSV files.
//!
//! ## Usage
//!
//! ```bash
//! # Report for the Azure CLI's current subscription
//! azcost
//!
//! # Another subscription, top 20 resources, write both CSV files
//! azcost --subscription 00000000-0000-0000-0000-000000000000 --top 20 --export both
//!
//! # Four queries in flight, verbose logging
//! azcost --concurrency 4 -v
//! ```

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use azcost_azure::{AccessTokenProvider, AzureClient, detect_session};
use azcost_config::AzcostConfig;
use azcost_core::{AzcostError, LogGuard, init_logging};
use azcost_cost::{CostError, CostOrchestrator, RowParser, SessionProvider};
use azcost_output::{
    ConsoleProgress, ExportSelection, Exporter, configure_colors, print_exports, print_outcome,
    prompt_selection,
};
use clap::Parser;
use tracing::{error, info, warn};

/// Month-to-date Azure cost report per resource group
#[derive(Parser, Debug)]
#[command(name = "azcost")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose logging (increases log level)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Directory for log files (defaults to ~/.azcost/logs/)
    #[arg(long)]
    log_dir: Option<PathBuf>,

    /// Configuration file (defaults to ~/.azcost/config.yaml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Subscription ID to report on instead of the session's default
    #[arg(long)]
    subscription: Option<String>,

    /// Number of most expensive resources to list
    #[arg(long, value_name = "N")]
    top: Option<usize>,

    /// Maximum cost queries in flight
    #[arg(long, value_name = "N")]
    concurrency: Option<usize>,

    /// Directory for exported CSV files
    #[arg(long, value_name = "DIR")]
    output_dir: Option<PathBuf>,

    /// Export without prompting: detailed, summary, both or skip
    #[arg(long, value_name = "CHOICE")]
    export: Option<ExportSelection>,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let _guard = match setup_logging(&cli) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialize logging: {}", e);
            return ExitCode::from(1);
        }
    };

    configure_colors();
    info!("Starting azcost");

    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            error!("azcost error: {:#}", e);
            eprintln!("Error: {:#}", e);
            ExitCode::from(1)
        }
    }
}

/// Set up logging based on CLI arguments.
fn setup_logging(cli: &Cli) -> azcost_core::Result<LogGuard> {
    init_logging(cli.log_dir.clone(), cli.verbose > 0)
}

/// Load configuration and apply command-line overrides.
fn load_config(cli: &Cli) -> azcost_core::Result<AzcostConfig> {
    let mut config = AzcostConfig::load(cli.config.as_deref())?;

    if let Some(subscription) = &cli.subscription {
        config = config.with_subscription_id(subscription);
    }
    if let Some(top) = cli.top {
        config = config.with_top_n(top);
    }
    if let Some(concurrency) = cli.concurrency {
        config = config.with_max_concurrent_queries(concurrency);
    }
    if let Some(dir) = &cli.output_dir {
        config = config.with_output_dir(dir);
    }

    config.validate()?;
    Ok(config)
}

/// User-facing text for an error raised before any Azure call.
fn config_error_message(err: &AzcostError) -> String {
    let label = if err.is_config_error() {
        "Configuration error"
    } else {
        "Error"
    };
    match err.guidance() {
        Some(guidance) => format!("{label}: {err}\n{guidance}"),
        None => format!("{label}: {err}"),
    }
}

fn report_config_error(err: &AzcostError) {
    error!(error = %err, "configuration rejected");
    eprintln!("{}", config_error_message(err));
}

fn report_cost_error(err: &CostError) {
    error!(error = %err, "run aborted");
    eprintln!("Error: {}", err.friendly_message());
}

/// Run one report. Precondition failures return exit code 1.
async fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            report_config_error(&e);
            return Ok(ExitCode::from(1));
        }
    };

    let session = detect_session(
        &config.management_endpoint,
        config.subscription_id.as_deref(),
    );
    info!(session = session.kind(), "resolving Azure session");

    let subscription_id = match session.current_subscription_id().await {
        Ok(id) => id,
        Err(e) => {
            report_cost_error(&e);
            return Ok(ExitCode::from(1));
        }
    };
    let access_token = match session.access_token().await {
        Ok(token) => token,
        Err(e) => {
            report_cost_error(&CostError::from(e));
            return Ok(ExitCode::from(1));
        }
    };

    let client = Arc::new(
        AzureClient::with_endpoint(
            &config.management_endpoint,
            access_token,
            Duration::from_secs(config.timeout_secs),
        )
        .context("failed to create HTTP client")?,
    );

    let orchestrator = CostOrchestrator::new(client.clone(), client)
        .with_parser(RowParser::with_currencies(config.currency_codes.iter().cloned()))
        .with_max_concurrent_queries(config.max_concurrent_queries);

    let outcome = match orchestrator.run(&subscription_id, &ConsoleProgress).await {
        Ok(outcome) => outcome,
        Err(e) => {
            report_cost_error(&e);
            return Ok(ExitCode::from(1));
        }
    };

    if !outcome.is_complete() {
        warn!(
            failed_groups = outcome.failures.len(),
            "some resource groups could not be queried"
        );
    }
    print_outcome(&outcome, config.top_n);

    let selection = match cli.export {
        Some(selection) => selection,
        None => prompt_selection().context("failed to read export choice")?,
    };
    info!(%selection, "export selection");

    let exporter = Exporter::new(config.detailed_path(), config.summary_path());
    let files = exporter
        .export(selection, &outcome.report)
        .context("export failed")?;
    print_exports(&files);

    info!("azcost finished");
    Ok(ExitCode::SUCCESS)
}

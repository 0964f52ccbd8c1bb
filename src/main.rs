use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::error::ErrorKind;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod aggregate;
mod db;
mod error;
mod models;
mod parser;
mod pipeline;
mod report;

use db::PgDocumentStore;
use pipeline::RunOptions;

const INPUT_HELP: &str = "\
Input Files:
  SIGNUPS_FILE          Pipe-delimited file with dates and number of signups
                        per date. The first line is a header.
  ACTIVE_USERS_FILE     Pipe-delimited file with dates and number of active
                        users per date. The first line is a header.

Output is written tab-delimited with one row per month:
  month, total_signups, average_signups, median_signups
and, with --active:
  average_actives, median_actives";

#[derive(Parser, Debug)]
#[command(name = "signup-summary")]
#[command(about = "Output monthly site user statistics", long_about = None)]
#[command(after_help = INPUT_HELP)]
struct Cli {
    /// Pipe-delimited signups file
    #[arg(value_name = "SIGNUPS_FILE")]
    signups: PathBuf,

    /// Read an additional file with information about the active site users
    #[arg(short, long = "active", value_name = "ACTIVE_USERS_FILE")]
    active: Option<PathBuf>,

    /// Where the tab-delimited report is written
    #[arg(short, long, default_value = "output.txt")]
    output: PathBuf,

    /// Postgres URL for keeping inputs and reports; persistence is skipped when unset
    #[arg(long, env = "DATABASE_URL", hide_env_values = true)]
    database_url: Option<String>,

    #[arg(long, env = "SIGNUP_SUMMARY_LOG", default_value = "info")]
    log_level: String,
}

fn setup_logging(log_level: &str) {
    let filter = EnvFilter::try_new(log_level).unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .init();
}

async fn connect_store(url: &str) -> anyhow::Result<PgDocumentStore> {
    PgDocumentStore::connect(url)
        .await
        .context("failed to connect to Postgres")
}

async fn execute(cli: Cli) -> anyhow::Result<()> {
    let options = RunOptions {
        signups: cli.signups,
        actives: cli.active,
        output: cli.output,
    };
    options.validate()?;

    let store = match cli.database_url.as_deref() {
        Some(url) => Some(connect_store(url).await?),
        None => None,
    };

    let outcome = pipeline::run(&options, store.as_ref()).await?;
    if let (Some(input_id), Some(report_id)) = (outcome.input_id, outcome.report_id) {
        tracing::info!(%input_id, %report_id, "documents saved");
    }
    println!(
        "Report written to {} ({} months).",
        outcome.output.display(),
        outcome.summary.rows.len()
    );
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let _ = err.print();
            return match err.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => ExitCode::SUCCESS,
                _ => ExitCode::FAILURE,
            };
        }
    };

    setup_logging(&cli.log_level);
    tracing::debug!(signups = %cli.signups.display(), active = ?cli.active, "starting");

    match execute(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

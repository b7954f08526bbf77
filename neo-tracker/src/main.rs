use neo_tracker::config::{self, TrackerConfig};
use neo_tracker::module::locale::Messages;
use neo_tracker::module::neo::{AsteroidTracker, FeedClient, RunOutcome};
use neo_tracker::module::renderer::DashboardRenderer;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use chrono::{NaiveDate, Utc};
use clap::Parser;
use neo_common::{DateRange, Locale};
use tracing::Instrument;

#[derive(Parser, Debug)]
#[command(name = "neo-tracker", about = "Near-Earth asteroid dashboard from the NASA NeoWs feed")]
struct Cli {
    /// Configuration file (defaults apply when it does not exist)
    #[arg(long, default_value = "config.toml")]
    config: PathBuf,

    /// First approach date, YYYY-MM-DD
    #[arg(long = "from")]
    start_date: Option<NaiveDate>,

    /// Last approach date, YYYY-MM-DD (inclusive)
    #[arg(long = "to")]
    end_date: Option<NaiveDate>,

    /// Language of the report: en or fr
    #[arg(long)]
    locale: Option<Locale>,

    /// Skip the PNG dashboard; `[output] export_csv` still writes the CSV
    #[arg(long)]
    no_image: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    // Load configuration
    let config = TrackerConfig::load_or_default(&cli.config)?;

    // Initialize logging
    let _logging_guard = neo_tracker::logging::init_logging(
        &config.log_dir,
        "neo-tracker",
        &config.log_level,
    )?;

    tracing::info!("NEO tracker starting...");

    // The credential is required before anything is sent
    let api_key = config.resolve_api_key(std::env::var(config::API_KEY_ENV).ok())?;

    let today = Utc::now().date_naive();
    let range = DateRange::new(
        cli.start_date.or(config.query.start_date).unwrap_or(today),
        cli.end_date.or(config.query.end_date).unwrap_or(today),
    );
    let messages = Messages::new(cli.locale.unwrap_or(config.locale));

    let client = FeedClient::new(&config.feed, api_key)?;
    let mut tracker = AsteroidTracker::new(Box::new(client), messages);
    if !cli.no_image || config.output.export_csv {
        tracker = tracker.with_renderer(
            DashboardRenderer::from_config(&config.output),
            config.output.export_csv,
        );
        if cli.no_image {
            tracker = tracker.without_image();
        }
    }

    let run_id = uuid::Uuid::now_v7();
    let outcome = tracker
        .run(&range)
        .instrument(tracing::info_span!("run", id = %run_id))
        .await
        .context("Dashboard run failed")?;

    match outcome {
        RunOutcome::Rendered { report, .. } => {
            print!("{}", report);
            Ok(ExitCode::SUCCESS)
        }
        RunOutcome::Failed { message, .. } => {
            eprintln!("{}", message);
            Ok(ExitCode::FAILURE)
        }
    }
}

//! CLI entry point for the social trends tool.
//!
//! Provides subcommands for fetching posts from Reddit or Twitter into a
//! flat CSV dataset, analysing a dataset into chart-ready tables, and
//! printing the sector performance report.

mod infra;
mod services;

use crate::infra::reddit::client::{RedditClient, RedditCredentials};
use crate::infra::twitter::client::TwitterClient;
use crate::services::source_api::{PostSource, fetch_to_file};
use anyhow::Result;
use clap::{Parser, Subcommand};
use social_trends::analyzers::analyzer::{Analysis, TrendBucket, analyze, load_records};
use social_trends::analyzers::types::Platform;
use social_trends::{config::TargetConfig, output::print_json};
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "social_trends")]
#[command(about = "Fetch social media posts and report on sector performance", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch posts for every sector target into a CSV dataset
    Fetch {
        /// Platform to fetch from
        #[arg(short, long, value_enum)]
        platform: Platform,

        /// JSON file mapping sectors to subreddits or search queries
        #[arg(short, long, default_value = "targets.json")]
        targets: String,

        /// CSV file to write the dataset to
        #[arg(short, long, default_value = "data.csv")]
        output: PathBuf,

        /// Posts per target (Twitter accepts 10 to 100)
        #[arg(short, long, default_value_t = 100)]
        limit: u32,

        /// Reddit top-posts window: hour, day, week, month, year or all
        #[arg(long, default_value = "month")]
        time_filter: String,
    },
    /// Analyse a dataset and write chart-ready tables plus a JSON report
    Analyze {
        /// Platform the dataset was fetched from
        #[arg(short, long, value_enum)]
        platform: Platform,

        /// Dataset CSV to analyse
        #[arg(short, long, default_value = "data.csv")]
        input: PathBuf,

        /// Directory to write tables and report.json into
        #[arg(short = 'd', long, default_value = "reports")]
        output_dir: PathBuf,

        /// Calendar bucket for trend tables
        #[arg(short, long, value_enum, default_value_t = TrendBucket::Week)]
        bucket: TrendBucket,
    },
    /// Print the sector performance report for a dataset
    Report {
        /// Platform the dataset was fetched from
        #[arg(short, long, value_enum)]
        platform: Platform,

        /// Dataset CSV to report on
        #[arg(short, long, default_value = "data.csv")]
        input: PathBuf,

        /// Print the report as JSON instead of text
        #[arg(long, default_value_t = false)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path =
        std::env::var("LOG_FILE_PATH").unwrap_or_else(|_| "logs/social_trends.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("social_trends.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse()?));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse()?));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Fetch {
            platform,
            targets,
            output,
            limit,
            time_filter,
        } => {
            let targets = TargetConfig::load(&targets)?;
            info!(
                %platform,
                targets = targets.target_count(),
                "Fetching posts"
            );

            let source: Box<dyn PostSource> = match platform {
                Platform::Reddit => Box::new(
                    RedditClient::new(RedditCredentials::from_env()?, &time_filter, limit).await?,
                ),
                Platform::Twitter => Box::new(TwitterClient::from_env(limit)?),
            };

            fetch_to_file(source.as_ref(), &targets, &output).await?;
        }
        Commands::Analyze {
            platform,
            input,
            output_dir,
            bucket,
        } => {
            let report = analyze(&input, platform, &output_dir, bucket)?;
            println!("{report}");
        }
        Commands::Report {
            platform,
            input,
            json,
        } => {
            let records = load_records(&input)?;
            let analysis = Analysis::from_raw(&records, platform)?;
            let report = analysis.report();
            if json {
                print_json(std::io::stdout().lock(), &report)?;
            } else {
                println!("{report}");
            }
        }
    }

    Ok(())
}


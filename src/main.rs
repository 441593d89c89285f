//! CLI entry point for the hotel bookings reporting tool.
//!
//! Provides subcommands for cleaning a raw bookings export, producing the
//! active-bookings and guest-totals reports, and running the full analysis.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use hotel_bookings::analysis::occupancy::OccupancyOptions;
use hotel_bookings::analysis::pipeline::{run_active_bookings, run_analysis, run_total_guests};
use hotel_bookings::analysis::types::{IdentityPolicy, StayPolicy};
use hotel_bookings::config::{AnalysisRequest, Settings, ensure_csv_path, parse_selected_date};
use hotel_bookings::output::{print_json, print_pretty};
use hotel_bookings::prepare::import_clean_data;
use tracing::info;
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "hotel_bookings")]
#[command(about = "A tool to report active hotel bookings and guests per day", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Reference date and window shared by the analysis subcommands.
#[derive(Args)]
struct WindowArgs {
    /// Reference date (YYYY-MM-DD)
    #[arg(short, long)]
    date: String,

    /// Number of days after the reference date to analyse [default: HOTEL_TIME_SPAN or 7]
    #[arg(short, long, allow_negative_numbers = true)]
    time_span: Option<i64>,

    /// Log the resulting tables as JSON instead of debug output
    #[arg(long, default_value_t = false)]
    json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Drop columns whose share of missing values reaches the threshold
    Clean {
        /// Raw bookings CSV
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Where to write the cleaned CSV [default: HOTEL_RAW_DATA_PATH/HOTEL_RAW_NAME]
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Maximum share of missing values a column may have [default: 0.8]
        #[arg(long)]
        threshold: Option<f64>,
    },
    /// Write the bookings that occupy rooms within the window
    ActiveBookings {
        /// Cleaned bookings CSV
        #[arg(value_name = "FILE")]
        dataset: PathBuf,

        #[command(flatten)]
        window: WindowArgs,

        /// Report path [default: HOTEL_RESULT_DATA_PATH/HOTEL_RESULT_ACTIVE_BOOKINGS]
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Write the total adults, children and babies in residence per day
    TotalGuests {
        /// Cleaned bookings CSV
        #[arg(value_name = "FILE")]
        dataset: PathBuf,

        #[command(flatten)]
        window: WindowArgs,

        /// Report path [default: HOTEL_RESULT_DATA_PATH/HOTEL_RESULT_TOTAL_GUESTS]
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Do not count the departure day as a stayed day
        #[arg(long, default_value_t = false)]
        exclude_leaving_day: bool,

        /// Treat rows with identical values as one booking
        #[arg(long, default_value_t = false)]
        whole_row_identity: bool,
    },
    /// Clean a raw bookings CSV and write both reports
    Analyze {
        /// Raw bookings CSV
        #[arg(value_name = "FILE")]
        input: PathBuf,

        #[command(flatten)]
        window: WindowArgs,

        /// Maximum share of missing values a column may have [default: 0.8]
        #[arg(long)]
        threshold: Option<f64>,
    },
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path =
        std::env::var("LOG_FILE_PATH").unwrap_or_else(|_| "logs/hotel_bookings.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("hotel_bookings.log"));

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
    let settings = Settings::from_env().context("Invalid configuration")?;

    match cli.command {
        Commands::Clean {
            input,
            output,
            threshold,
        } => {
            ensure_csv_path(&input)?;
            let output = output.unwrap_or_else(|| settings.raw_dataset());
            import_clean_data(
                &input,
                &output,
                threshold.unwrap_or(settings.missing_threshold),
            )
            .with_context(|| format!("Failed to clean {}", input.display()))?;
        }
        Commands::ActiveBookings {
            dataset,
            window,
            output,
        } => {
            let request = build_request(&settings, dataset, &window)?;
            let output = output.unwrap_or_else(|| settings.active_bookings_report());
            let table = run_active_bookings(&request, &output)
                .context("Active bookings could not be analysed")?;
            show(&table, window.json)?;
        }
        Commands::TotalGuests {
            dataset,
            window,
            output,
            exclude_leaving_day,
            whole_row_identity,
        } => {
            let options = OccupancyOptions {
                stay_policy: if exclude_leaving_day {
                    StayPolicy::ExcludeLeavingDay
                } else {
                    StayPolicy::IncludeLeavingDay
                },
                identity_policy: if whole_row_identity {
                    IdentityPolicy::WholeRow
                } else {
                    IdentityPolicy::RowIndex
                },
            };
            let request = build_request(&settings, dataset, &window)?.with_options(options);
            let output = output.unwrap_or_else(|| settings.total_guests_report());
            let totals = run_total_guests(&request, &output)
                .context("Total guests could not be analysed")?;
            show(&totals, window.json)?;
        }
        Commands::Analyze {
            input,
            window,
            threshold,
        } => {
            ensure_csv_path(&input)?;
            let cleaned = settings.raw_dataset();
            import_clean_data(
                &input,
                &cleaned,
                threshold.unwrap_or(settings.missing_threshold),
            )
            .context("There has been an error during preparing the data")?;

            let request = build_request(&settings, cleaned, &window)?;
            let reports = run_analysis(
                &request,
                settings.active_bookings_report(),
                settings.total_guests_report(),
            )
            .context("Bookings could not be analysed")?;

            show(&reports.active_bookings, window.json)?;
            show(&reports.daily_totals, window.json)?;
        }
    }

    Ok(())
}

fn build_request(settings: &Settings, dataset: PathBuf, window: &WindowArgs) -> Result<AnalysisRequest> {
    ensure_csv_path(&dataset)?;
    let selected_date = parse_selected_date(&window.date)?;
    let time_span = window.time_span.unwrap_or(settings.time_span);

    info!(dataset = %dataset.display(), %selected_date, time_span, "Analysis requested");
    Ok(AnalysisRequest::new(dataset, selected_date, time_span)?)
}

fn show<T: std::fmt::Debug + serde::Serialize>(report: &T, json: bool) -> Result<()> {
    if json {
        print_json(report)?;
    } else {
        print_pretty(report);
    }
    Ok(())
}

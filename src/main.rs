use aws_inventory::app::{self, RunOptions};
use aws_inventory::aws::auth::AwsSession;
use aws_inventory::aws::client::AwsClient;
use aws_inventory::config::Config;
use aws_inventory::report::output_filename;
use chrono::Local;
use clap::{Parser, ValueEnum};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::writer::MakeWriterExt;
use tracing_subscriber::EnvFilter;

/// Cross-region AWS resource inventory exported to an Excel workbook
#[derive(Parser, Debug)]
#[command(name = "aws-inventory", version, about, long_about = None)]
struct Args {
    /// Log level for progress and diagnostics
    #[arg(long, value_enum, default_value = "info")]
    log_level: LogLevel,

    /// Also write logs to this file
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Directory the workbook is written to
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Default region (identity check and region-listing fallback)
    #[arg(short, long)]
    region: Option<String>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    fn as_directive(self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

/// Progress goes to stdout; SDK internals stay at warn unless RUST_LOG says otherwise
fn setup_logging(level: LogLevel, log_file: Option<&Path>) -> Vec<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "{},aws_config=warn,aws_smithy_runtime=warn,aws_sdk_sts=warn",
            level.as_directive()
        ))
    });

    let (stdout, stdout_guard) = tracing_appender::non_blocking(std::io::stdout());
    let mut guards = vec![stdout_guard];

    let file = log_file.and_then(|path| {
        if let Some(parent) = path.parent() {
            let _ = std::fs::create_dir_all(parent);
        }
        std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|e| eprintln!("Could not open log file {}: {}", path.display(), e))
            .ok()
    });

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_ansi(file.is_none());

    match file {
        Some(file) => {
            let (file_writer, file_guard) = tracing_appender::non_blocking(file);
            guards.push(file_guard);
            builder.with_writer(stdout.and(file_writer)).init();
        },
        None => builder.with_writer(stdout).init(),
    }

    guards
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let started_at = Local::now();
    let args = Args::parse();

    let _log_guards = setup_logging(args.log_level, args.log_file.as_deref());

    tracing::info!("Starting AWS inventory scan...");

    let config = Config::load();
    let output_path = config
        .effective_output_dir(args.output_dir.as_deref())
        .join(output_filename(started_at.naive_local()));

    let region_override = config.effective_default_region(args.region.as_deref());
    let session = AwsSession::load(region_override.as_deref()).await;

    let options = RunOptions {
        output_path,
        anchor_region: config.effective_anchor_region(),
        default_region: session.default_region(),
    };
    let client = AwsClient::new(session);

    match app::run(&client, &options).await {
        Ok(summary) => {
            tracing::info!(
                "Wrote {} records across {} regions to {}",
                summary.total_records(),
                summary.regions.len(),
                summary.output_path.display()
            );
            ExitCode::SUCCESS
        },
        Err(err) => {
            tracing::error!("{}", err);
            ExitCode::from(err.exit_code())
        },
    }
}

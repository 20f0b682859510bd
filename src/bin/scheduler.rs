//! Runs `erasmus-tracker` periodically as a subprocess.

use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use erasmus_tracker::logging::{self, LogLevel};
use erasmus_tracker::scheduler::{run_tracker, scheduler_loop, SchedulerCfg};

#[derive(Debug, Parser)]
#[command(name = "erasmus-scheduler", about = "Erasmus Tracker Scheduler")]
struct Cli {
    /// Check interval in hours
    #[arg(long, env = "CHECK_INTERVAL_HOURS", default_value_t = 6)]
    interval: u64,

    /// Run once and exit (for testing)
    #[arg(long)]
    run_once: bool,

    /// Wall-clock limit for one tracker run
    #[arg(long, default_value_t = 300)]
    timeout_secs: u64,

    /// Tracker executable; defaults to `erasmus-tracker` next to this binary
    #[arg(long)]
    tracker: Option<PathBuf>,

    #[arg(long, value_enum, env = "LOG_LEVEL", default_value = "INFO")]
    log_level: LogLevel,

    #[arg(long, env = "SCHEDULER_LOG_FILE", default_value = "scheduler.log")]
    log_file: PathBuf,
}

fn default_tracker() -> PathBuf {
    let name = format!("erasmus-tracker{}", std::env::consts::EXE_SUFFIX);
    std::env::current_exe()
        .ok()
        .and_then(|p| p.parent().map(|dir| dir.join(&name)))
        .unwrap_or_else(|| PathBuf::from(name))
}

#[tokio::main]
async fn main() -> ExitCode {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();

    if let Err(e) = logging::init(cli.log_level, Some(&cli.log_file)) {
        eprintln!("logging disabled: {e:#}");
    }

    let mut cfg = SchedulerCfg::new(
        cli.tracker.unwrap_or_else(default_tracker),
        Duration::from_secs(cli.interval.max(1) * 3600),
    );
    cfg.run_timeout = Duration::from_secs(cli.timeout_secs.max(1));

    if cli.run_once {
        tracing::info!("Running tracker once...");
        return if run_tracker(&cfg).await {
            ExitCode::SUCCESS
        } else {
            ExitCode::FAILURE
        };
    }

    tokio::select! {
        _ = scheduler_loop(cfg) => ExitCode::SUCCESS,
        res = tokio::signal::ctrl_c() => {
            match res {
                Ok(()) => {
                    tracing::info!("Scheduler stopped by user");
                    ExitCode::SUCCESS
                }
                Err(e) => {
                    tracing::error!("Scheduler error: {e}");
                    ExitCode::FAILURE
                }
            }
        }
    }
}

// src/scheduler.rs
//! Periodic runner: executes the tracker binary as a subprocess once per interval.
//!
//! Each tick is independent. A run that exits non-zero or exceeds the timeout is
//! logged as failed and the next tick tries again; there is no backoff.

use std::path::PathBuf;
use std::time::Duration;
use tokio::process::Command;
use tokio::time::{self, MissedTickBehavior};

pub const DEFAULT_RUN_TIMEOUT: Duration = Duration::from_secs(300);

#[derive(Debug, Clone)]
pub struct SchedulerCfg {
    pub program: PathBuf,
    pub args: Vec<String>,
    pub interval: Duration,
    pub run_timeout: Duration,
}

impl SchedulerCfg {
    pub fn new(program: impl Into<PathBuf>, interval: Duration) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            interval,
            run_timeout: DEFAULT_RUN_TIMEOUT,
        }
    }
}

/// Run the tracker once; `true` only for a zero exit status within the timeout.
pub async fn run_tracker(cfg: &SchedulerCfg) -> bool {
    tracing::info!(program = %cfg.program.display(), "Running Erasmus Tracker...");

    let mut cmd = Command::new(&cfg.program);
    cmd.args(&cfg.args).kill_on_drop(true);

    match time::timeout(cfg.run_timeout, cmd.output()).await {
        Ok(Ok(out)) if out.status.success() => {
            tracing::info!("Tracker completed successfully");
            tracing::debug!("Output: {}", String::from_utf8_lossy(&out.stdout));
            true
        }
        Ok(Ok(out)) => {
            tracing::error!("Tracker failed with exit code {:?}", out.status.code());
            tracing::error!("Error output: {}", String::from_utf8_lossy(&out.stderr));
            false
        }
        Ok(Err(e)) => {
            tracing::error!("Error running tracker: {e}");
            false
        }
        Err(_) => {
            tracing::error!(
                "Tracker timed out after {} seconds",
                cfg.run_timeout.as_secs()
            );
            false
        }
    }
}

/// Loop forever: first run immediately, then one run per interval.
pub async fn scheduler_loop(cfg: SchedulerCfg) {
    tracing::info!(
        "Starting scheduler with {} hour intervals",
        cfg.interval.as_secs() / 3600
    );

    let mut ticker = time::interval(cfg.interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    loop {
        ticker.tick().await;
        tracing::info!("Starting scheduled run at {}", chrono::Local::now());

        if run_tracker(&cfg).await {
            tracing::info!("Scheduled run completed successfully");
        } else {
            tracing::warn!("Scheduled run failed");
        }

        let next = chrono::Local::now()
            + chrono::Duration::from_std(cfg.interval).unwrap_or_else(|_| chrono::Duration::hours(6));
        tracing::info!("Next run scheduled for: {next}");
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    fn cfg(program: &str, args: &[&str], timeout: Duration) -> SchedulerCfg {
        let mut c = SchedulerCfg::new(program, Duration::from_secs(3600));
        c.args = args.iter().map(|s| s.to_string()).collect();
        c.run_timeout = timeout;
        c
    }

    #[tokio::test]
    async fn zero_exit_is_success() {
        assert!(run_tracker(&cfg("true", &[], Duration::from_secs(10))).await);
    }

    #[tokio::test]
    async fn non_zero_exit_is_failure() {
        assert!(!run_tracker(&cfg("false", &[], Duration::from_secs(10))).await);
    }

    #[tokio::test]
    async fn missing_program_is_failure() {
        let c = cfg("/nonexistent/erasmus-tracker", &[], Duration::from_secs(10));
        assert!(!run_tracker(&c).await);
    }

    #[tokio::test]
    async fn timeout_is_failure() {
        let c = cfg("sleep", &["5"], Duration::from_millis(200));
        assert!(!run_tracker(&c).await);
    }
}

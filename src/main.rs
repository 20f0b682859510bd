//! Erasmus Tracker — CLI entrypoint.
//! Runs one check by default; `--test-email` and `--stats` are maintenance actions.
//!
//! Exit code 0 on success (including "no new posts"), 1 on failure.

use anyhow::Result;
use clap::Parser;
use std::process::ExitCode;
use tracing::{error, info};

use erasmus_tracker::logging::{self, LogLevel};
use erasmus_tracker::notify::{send_test_email, EmailNotifier};
use erasmus_tracker::scrape::HttpPageSource;
use erasmus_tracker::{run_check, PostStore, Settings, Tracker};

#[derive(Debug, Parser)]
#[command(name = "erasmus-tracker", about = "Erasmus Tracker - Monitor new Erasmus posts")]
struct Cli {
    /// Send a test email
    #[arg(long)]
    test_email: bool,

    /// Show statistics
    #[arg(long, conflicts_with = "test_email")]
    stats: bool,

    /// Set logging level
    #[arg(long, value_enum, env = "LOG_LEVEL", default_value = "INFO")]
    log_level: LogLevel,
}

async fn check_once(settings: &Settings) -> Result<usize> {
    // Fail fast on notifier config, before touching the network
    let email = settings.email()?;
    let notifier = EmailNotifier::new(&email)?;
    let source = HttpPageSource::from_settings(settings)?;
    let mut tracker = Tracker::from_settings(source, settings);
    run_check(settings, &mut tracker, &notifier).await
}

async fn test_email(settings: &Settings) -> bool {
    let notifier = match settings.email().and_then(|cfg| EmailNotifier::new(&cfg)) {
        Ok(n) => n,
        Err(e) => {
            error!("Error testing email: {e:#}");
            return false;
        }
    };
    let ok = send_test_email(&notifier).await;
    if ok {
        info!("Test email sent successfully!");
    } else {
        error!("Failed to send test email");
    }
    ok
}

fn show_stats(settings: &Settings) {
    let store = PostStore::load(&settings.data_file);

    println!("\nErasmus Tracker Statistics");
    println!("{}", "=".repeat(40));
    println!("{}", store.stats());
    println!("Target URL: {}", settings.target_url);
    println!(
        "Email recipient: {}",
        settings.email_to.as_deref().unwrap_or("(not configured)")
    );

    let recent = store.recent_posts(5);
    if !recent.is_empty() {
        println!("\nRecent posts (last {}):", recent.len());
        for (i, post) in recent.iter().enumerate() {
            let title: String = post.title.chars().take(50).collect();
            let date = post
                .date
                .map(|d| d.to_string())
                .unwrap_or_else(|| "Unknown date".to_string());
            println!("  {}. {}... ({})", i + 1, title, date);
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    // Load .env in local/dev; no-op when absent.
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();

    let settings = match Settings::from_env() {
        Ok(s) => s,
        Err(e) => {
            eprintln!("configuration error: {e:#}");
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = logging::init(cli.log_level, settings.log_file.as_deref()) {
        eprintln!("logging disabled: {e:#}");
    }
    info!("Starting Erasmus Tracker");

    let ok = if cli.test_email {
        test_email(&settings).await
    } else if cli.stats {
        show_stats(&settings);
        true
    } else {
        match check_once(&settings).await {
            Ok(n) => {
                info!("Check completed successfully. Found {n} new posts.");
                true
            }
            Err(e) => {
                error!("Error during check: {e:#}");
                error!("Check failed");
                false
            }
        }
    };

    if ok {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

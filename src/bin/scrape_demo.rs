//! Demo that scrapes the live page without any e-mail configuration.
//! Prints the first few posts and exercises the store on a throw-away file.

use std::process::ExitCode;

use erasmus_tracker::scrape::{HttpPageSource, PageSource, PostExtractor};
use erasmus_tracker::{PostStore, Settings};

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt().with_target(false).init();
    let _ = dotenvy::dotenv();

    let settings = match Settings::from_env() {
        Ok(s) => s,
        Err(e) => {
            eprintln!("configuration error: {e:#}");
            return ExitCode::FAILURE;
        }
    };

    let source = match HttpPageSource::from_settings(&settings) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Test failed: {e:#}");
            return ExitCode::FAILURE;
        }
    };

    println!("Fetching posts from: {}", source.location());
    let markup = match source.fetch_page().await {
        Ok(body) => body,
        Err(e) => {
            eprintln!("Test failed: {e:#}");
            return ExitCode::FAILURE;
        }
    };

    let posts = PostExtractor::new(settings.site_origin.clone()).extract(&markup);
    println!("Found {} posts", posts.len());
    if posts.is_empty() {
        println!("No posts found: the page layout may have changed or the site blocks automated requests.");
    }
    for (i, post) in posts.iter().take(5).enumerate() {
        let title: String = post.title.chars().take(60).collect();
        println!("  {}. {}...", i + 1, title);
        println!(
            "     Date: {}",
            post.date.map(|d| d.to_string()).unwrap_or_else(|| "No date".into())
        );
        println!("     URL: {}", post.url.as_deref().unwrap_or("No URL"));
    }

    let dir = match tempfile_dir() {
        Ok(d) => d,
        Err(e) => {
            eprintln!("Test failed: {e:#}");
            return ExitCode::FAILURE;
        }
    };
    let path = dir.join("test_data.json");
    let mut store = PostStore::load(&path);
    for post in posts.iter().take(3) {
        if store.is_new_post(post) {
            store.add_post(post.clone());
        }
    }
    println!("Total stored posts: {}", store.stats().total_posts);
    let _ = std::fs::remove_dir_all(&dir);

    println!("Demo completed successfully!");
    ExitCode::SUCCESS
}

fn tempfile_dir() -> std::io::Result<std::path::PathBuf> {
    let dir = std::env::temp_dir().join(format!("erasmus-demo-{}", std::process::id()));
    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}

use anyhow::{Context, Result, bail};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

use fiyat_radar::{
    AppConfig, BatchRunner, BrowserFetcher, BrowserSessionManager, FetchOrchestrator, HttpFetcher,
};

#[derive(Parser)]
#[command(name = "fiyat-radar")]
#[command(about = "Extract prices from e-commerce product pages", long_about = None)]
struct Cli {
    /// Product page URLs to scrape
    urls: Vec<String>,

    /// File with one URL per line ('#' starts a comment)
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Pretty-print JSON results
    #[arg(long)]
    pretty: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("fiyat_radar=debug".parse()?),
        )
        .init();

    let cli = Cli::parse();

    let mut urls = cli.urls;
    if let Some(path) = &cli.input {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        urls.extend(
            content
                .lines()
                .map(str::trim)
                .filter(|l| !l.is_empty() && !l.starts_with('#'))
                .map(String::from),
        );
    }
    if urls.is_empty() {
        bail!("no URLs given; pass them as arguments or via --input");
    }

    let config = AppConfig::from_env()?;
    info!("scraping {} URL(s)", urls.len());

    let manager = Arc::new(BrowserSessionManager::new(config.browser.clone()));
    let http = Arc::new(HttpFetcher::new(&config)?);
    let browser = Arc::new(BrowserFetcher::new(&config, manager.clone()));
    let orchestrator = Arc::new(FetchOrchestrator::new(http, browser));
    let runner = BatchRunner::new(orchestrator, &config);

    let results = runner.run(&urls).await;
    manager.shutdown().await;

    for result in &results {
        let line = if cli.pretty {
            serde_json::to_string_pretty(result)?
        } else {
            serde_json::to_string(result)?
        };
        println!("{line}");
    }

    let succeeded = results.iter().filter(|r| r.success).count();
    info!("{succeeded}/{} URL(s) yielded a price", results.len());
    if succeeded == 0 {
        std::process::exit(1);
    }
    Ok(())
}

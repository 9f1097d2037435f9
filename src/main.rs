//! indico2csv — walks an Indico event chain through a headless browser and
//! exports every contribution to a CSV file.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::Context;
use clap::Parser;
use tokio::sync::watch;
use tracing::{info, warn};
use url::Url;

use indico2csv::{export, Browser, BrowserFetcher, ChainStatus, Traverser};

#[derive(Parser, Debug)]
#[command(
    name = "indico2csv",
    version,
    about = "Scrapes an Indico event chain into a CSV of contributions"
)]
struct Cli {
    /// Event page to start from; "older event" links are followed from here.
    start_url: Url,

    /// Output CSV path.
    #[arg(short, long, default_value = "events_contributions.csv")]
    output: PathBuf,

    /// Run Chrome with a visible window instead of headless.
    #[arg(long)]
    headed: bool,

    /// Path to the Chrome/Chromium executable (autodetected if omitted).
    #[arg(long, env = "CHROME_PATH")]
    chrome: Option<String>,

    /// Seconds to wait for a page to finish rendering.
    #[arg(long, default_value_t = 30)]
    render_timeout: u64,

    /// Stop the crawl after this many seconds, keeping what was gathered.
    #[arg(long)]
    max_runtime: Option<u64>,

    /// Increase log verbosity (-v debug, -vv trace).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn init_tracing(verbose: u8) {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = match verbose {
        0 => "indico2csv=info",
        1 => "indico2csv=debug",
        _ => "indico2csv=trace",
    };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));
    fmt().with_env_filter(env_filter).with_target(false).init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let mut builder = Browser::builder()
        .headless(!cli.headed)
        .render_timeout(Duration::from_secs(cli.render_timeout));
    if let Some(path) = cli.chrome.clone() {
        builder = builder.chrome_path(path);
    }
    let browser = builder.build().await.context("failed to launch browser")?;

    let fetcher = BrowserFetcher::start(browser)
        .await
        .context("failed to open browser tab")?;

    let (cancel_tx, cancel_rx) = watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("interrupt received, stopping after the current event");
            let _ = cancel_tx.send(true);
        }
    });

    let mut traverser = Traverser::new(fetcher).with_cancel(cancel_rx);
    if let Some(secs) = cli.max_runtime {
        traverser = traverser.with_deadline(Instant::now() + Duration::from_secs(secs));
    }

    let outcome = traverser.run(&cli.start_url).await;

    // Chrome must not outlive the crawl, however it ended.
    if let Err(error) = traverser.into_source().close().await {
        warn!(%error, "browser did not shut down cleanly");
    }

    export::write_rows(&cli.output, &outcome.rows)
        .with_context(|| format!("failed to write {}", cli.output.display()))?;
    info!(
        events = outcome.events_visited,
        rows = outcome.rows.len(),
        "crawl finished"
    );

    if let ChainStatus::Failed { url, error } = outcome.status {
        anyhow::bail!("chain ended early at {url}: {error} (partial CSV kept)");
    }
    Ok(())
}

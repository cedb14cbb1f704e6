use anyhow::{Context, Result};
use clap::Parser;
use pagewatch_common::observability::{init_logging, LogConfig};
use pagewatch_config::WatchConfigLoader;
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

use checker::{Checker, HttpFetcher};
use output::{LogOnlySink, ResultSink, ResultsFile};
use state::FileStateStore;

mod checker;
mod output;
mod state;

/// Check a web page for updates and report whether its latest-news block
/// changed since the last run.
#[derive(Parser, Debug)]
#[command(name = "pagewatch", version)]
struct Args {
    /// Optional YAML config file; defaults reproduce the built-in
    /// URL/timeout constants when omitted.
    #[arg(long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // 1) Load config (env wins)
    let mut loader = WatchConfigLoader::new();
    if let Some(path) = &args.config {
        loader = loader.with_file(path);
    }
    let cfg = loader.load().context("loading configuration")?;

    init_logging(LogConfig::default())?;

    let url = Url::parse(&cfg.url).with_context(|| format!("invalid url: {}", cfg.url))?;
    let fetcher = HttpFetcher::new(Duration::from_secs(cfg.timeout_secs))?;
    let store = FileStateStore::new(cfg.state_file.clone());
    let sink: Box<dyn ResultSink> = match ResultsFile::resolve(cfg.output_path.clone()) {
        Some(results) => Box::new(results),
        None => Box::new(LogOnlySink),
    };

    Checker::new(url, &fetcher, &store, sink.as_ref())
        .run()
        .await?;

    Ok(())
}

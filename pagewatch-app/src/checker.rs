//! The check itself: fetch, extract, fingerprint, compare, emit, persist.
//!
//! The network, the state file, and the results channel sit behind trait
//! seams so the flow can be exercised end to end without I/O. Any failure
//! aborts the run uncommitted; there is no partial success. The results
//! are emitted before the new fingerprint is persisted, so a failed emit
//! leaves the state unsaved and the change is re-detected next run.

use crate::output::ResultSink;
use crate::state::StateStore;
use pagewatch_common::{PagewatchError, Result};
use pagewatch_http::HttpClient;
use pagewatch_web::{extract_latest_block, fingerprint};
use std::time::Duration;
use url::Url;

#[async_trait::async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, url: &Url) -> Result<String>;
}

/// Concrete fetcher backed by the reqwest-based client.
pub struct HttpFetcher {
    client: HttpClient,
}

impl HttpFetcher {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = HttpClient::new()
            .map_err(|e| PagewatchError::Fetch(e.to_string()))?
            .with_timeout(timeout);
        Ok(Self { client })
    }
}

#[async_trait::async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &Url) -> Result<String> {
        self.client
            .get_text(url)
            .await
            .map_err(|e| PagewatchError::Fetch(e.to_string()))
    }
}

/// What a single run observed.
#[derive(Debug, Clone)]
pub struct CheckOutcome {
    pub changed: bool,
    pub fingerprint: String,
    pub snippet: String,
}

pub struct Checker<'a> {
    url: Url,
    fetcher: &'a dyn PageFetcher,
    store: &'a dyn StateStore,
    sink: &'a dyn ResultSink,
}

impl<'a> Checker<'a> {
    pub fn new(
        url: Url,
        fetcher: &'a dyn PageFetcher,
        store: &'a dyn StateStore,
        sink: &'a dyn ResultSink,
    ) -> Self {
        Self {
            url,
            fetcher,
            store,
            sink,
        }
    }

    /// Run one check. The outcome is emitted first; only then is the new
    /// fingerprint persisted, and only when it differs from the stored
    /// one. Unchanged runs leave the store byte-identical.
    pub async fn run(&self) -> Result<CheckOutcome> {
        let html = self.fetcher.fetch(&self.url).await?;
        let snippet = extract_latest_block(&html);
        let new = fingerprint(&snippet);
        let prev = self.store.load()?;

        let changed = new != prev;
        self.sink.emit(changed, &snippet)?;
        if changed {
            self.store.save(&new)?;
        }

        tracing::info!(
            url = %self.url,
            changed,
            fingerprint = %new,
            snippet_chars = snippet.chars().count(),
            "check.complete"
        );

        Ok(CheckOutcome {
            changed,
            fingerprint: new,
            snippet,
        })
    }
}

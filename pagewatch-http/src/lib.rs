//! Minimal HTTP client for the page fetch, with safe structured logging.
//!
//! - One bounded-timeout GET per call, body returned as text
//! - Non-2xx responses surface as [`HttpError::Status`]
//! - No retries and no backoff: a failed fetch fails the whole run, so the
//!   scheduler's next invocation is the retry
//!
//! Observability: structured `tracing` events are emitted for request
//! start, response headers, body snippets (truncated), and final errors.

use reqwest::{Client, StatusCode};
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Cap for body snippets that end up in logs and error messages.
const SNIP_MAX: usize = 500;

#[derive(Debug, Error)]
pub enum HttpError {
    #[error("client build failed: {0}")]
    Build(String),
    #[error("network error: {0}")]
    Network(String),
    #[error("server returned error {status}: {body_snippet}")]
    Status {
        status: StatusCode,
        body_snippet: String,
    },
}

/// Client wrapper carrying the per-run timeout.
#[derive(Clone)]
pub struct HttpClient {
    inner: Client,
    pub default_timeout: Duration,
}

impl HttpClient {
    /// Construct a client with the default 30 second request timeout.
    ///
    /// ```no_run
    /// use pagewatch_http::{HttpClient, HttpError};
    /// use std::time::Duration;
    ///
    /// let client = HttpClient::new()?;
    /// assert_eq!(client.default_timeout, Duration::from_secs(30));
    /// # Ok::<(), HttpError>(())
    /// ```
    pub fn new() -> Result<Self, HttpError> {
        let inner = Client::builder()
            .connect_timeout(Duration::from_secs(5))
            .build()
            .map_err(|e| HttpError::Build(e.to_string()))?;
        Ok(Self {
            inner,
            default_timeout: Duration::from_secs(30),
        })
    }

    /// Override the default timeout returned by [`HttpClient::new`].
    ///
    /// ```no_run
    /// use pagewatch_http::{HttpClient, HttpError};
    /// use std::time::Duration;
    ///
    /// let client = HttpClient::new()?.with_timeout(Duration::from_secs(2));
    /// assert_eq!(client.default_timeout, Duration::from_secs(2));
    /// # Ok::<(), HttpError>(())
    /// ```
    pub fn with_timeout(mut self, dur: Duration) -> Self {
        self.default_timeout = dur;
        self
    }

    /// Single-attempt GET returning the response body as text.
    ///
    /// Any failure mode (timeout, connect error, non-success status, body
    /// read error) is final; callers decide whether the process dies.
    pub async fn get_text(&self, url: &Url) -> Result<String, HttpError> {
        // Lightweight request id without extra deps.
        let req_id = format!(
            "r{:x}",
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .unwrap_or_default()
                .as_nanos()
        );

        tracing::debug!(
            req_id = %req_id,
            host_path = %format!("{}{}", url.domain().unwrap_or("-"), url.path()),
            timeout_ms = self.default_timeout.as_millis() as u64,
            "http.request.start"
        );

        let t0 = std::time::Instant::now();
        let resp = self
            .inner
            .get(url.clone())
            .timeout(self.default_timeout)
            .send()
            .await
            .map_err(|err| {
                let message = err.to_string();
                tracing::warn!(req_id = %req_id, message = %message, "http.network_error.send");
                HttpError::Network(message)
            })?;

        let status = resp.status();
        let bytes = resp.bytes().await.map_err(|err| {
            let message = err.to_string();
            tracing::warn!(req_id = %req_id, message = %message, "http.network_error.body");
            HttpError::Network(message)
        })?;
        let dur_ms = t0.elapsed().as_millis() as u64;

        tracing::debug!(
            req_id = %req_id,
            %status,
            duration_ms = dur_ms,
            body_len = bytes.len(),
            "http.response.headers"
        );

        let snippet = snip_body(&bytes);
        tracing::trace!(req_id = %req_id, body_snippet = %snippet, "http.response.body_snippet");

        if !status.is_success() {
            tracing::warn!(
                req_id = %req_id,
                %status,
                body_snippet = %snippet,
                "http.error"
            );
            return Err(HttpError::Status {
                status,
                body_snippet: snippet,
            });
        }

        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}

fn snip_body(body: &[u8]) -> String {
    let mut snip = String::from_utf8_lossy(body).to_string();
    if snip.len() > SNIP_MAX {
        // Walk back to a char boundary before truncating.
        let mut cut = SNIP_MAX;
        while !snip.is_char_boundary(cut) {
            cut -= 1;
        }
        snip.truncate(cut);
        snip.push_str("...");
    }
    snip
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snip_body_passes_short_bodies_through() {
        assert_eq!(snip_body(b"hello"), "hello");
    }

    #[test]
    fn snip_body_truncates_long_bodies() {
        let body = vec![b'x'; 2000];
        let snip = snip_body(&body);
        assert_eq!(snip.len(), SNIP_MAX + 3);
        assert!(snip.ends_with("..."));
    }

    #[test]
    fn snip_body_respects_char_boundaries() {
        // 3-byte chars straddling the cap must not split mid-codepoint.
        let body = "あ".repeat(400);
        let snip = snip_body(body.as_bytes());
        assert!(snip.ends_with("..."));
        assert!(snip.chars().all(|c| c == 'あ' || c == '.'));
    }
}

//! Results channel for the invoking automation.
//!
//! Two `key=value` lines are appended per run: `changed` and a truncated
//! `snippet` preview. Values are raw text; embedded newlines or special
//! characters are not escaped, the consumer must tolerate them.

use pagewatch_common::{PagewatchError, Result};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;

/// Emitted snippet preview length, in characters.
pub const SNIPPET_PREVIEW_CHARS: usize = 300;

/// Seam between the orchestrator and the results channel. Emission runs
/// before the new fingerprint is committed, so a failed emit leaves the
/// change undelivered but re-detectable on the next run.
pub trait ResultSink: Send + Sync {
    fn emit(&self, changed: bool, snippet: &str) -> Result<()>;
}

/// Append-only results file.
pub struct ResultsFile {
    path: PathBuf,
}

impl ResultsFile {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Resolve the destination: explicit config wins, otherwise the
    /// `GITHUB_OUTPUT` path handed down by the calling environment.
    pub fn resolve(configured: Option<PathBuf>) -> Option<Self> {
        configured
            .or_else(|| std::env::var_os("GITHUB_OUTPUT").map(PathBuf::from))
            .map(Self::new)
    }

    /// Append the run outcome as `changed=` and `snippet=` lines.
    pub fn append(&self, changed: bool, snippet: &str) -> Result<()> {
        let preview: String = snippet.chars().take(SNIPPET_PREVIEW_CHARS).collect();

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| {
                PagewatchError::Output(format!("open {}: {e}", self.path.display()))
            })?;
        writeln!(file, "changed={changed}")
            .and_then(|_| writeln!(file, "snippet={preview}"))
            .map_err(|e| {
                PagewatchError::Output(format!("write {}: {e}", self.path.display()))
            })?;

        tracing::debug!(path = %self.path.display(), changed, "results.appended");
        Ok(())
    }
}

impl ResultSink for ResultsFile {
    fn emit(&self, changed: bool, snippet: &str) -> Result<()> {
        self.append(changed, snippet)
    }
}

/// Sink for runs with no results file configured: the outcome is logged
/// and the run still succeeds.
pub struct LogOnlySink;

impl ResultSink for LogOnlySink {
    fn emit(&self, changed: bool, snippet: &str) -> Result<()> {
        tracing::info!(
            changed,
            snippet_chars = snippet.chars().count(),
            "no results file configured; outcome logged only"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn appends_both_lines() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("out.txt");
        let results = ResultsFile::new(path.clone());

        results.append(true, "2024年5月1日 更新情報").unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents, "changed=true\nsnippet=2024年5月1日 更新情報\n");
    }

    #[test]
    fn appends_without_clobbering_earlier_lines() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("out.txt");
        std::fs::write(&path, "existing=1\n").unwrap();

        ResultsFile::new(path.clone()).append(false, "x").unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.starts_with("existing=1\n"));
        assert!(contents.ends_with("changed=false\nsnippet=x\n"));
    }

    #[test]
    fn snippet_is_truncated_to_300_chars() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("out.txt");
        // Multibyte input: truncation counts characters, not bytes.
        let snippet = "あ".repeat(400);

        ResultsFile::new(path.clone()).append(true, &snippet).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        let line = contents
            .lines()
            .find_map(|l| l.strip_prefix("snippet="))
            .unwrap();
        assert_eq!(line.chars().count(), SNIPPET_PREVIEW_CHARS);
    }
}

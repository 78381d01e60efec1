//! Shared fixtures for integration tests: a configurable engine pointed at a
//! stub server and a recording fallback downloader.

use async_trait::async_trait;
use congress_ingest::config::Config;
use congress_ingest::ingestion::FallbackDownloader;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Fallback downloader double: counts invocations and optionally
/// materializes a payload file in the scratch directory
pub struct StubDownloader {
    calls: Arc<AtomicUsize>,
    payload: Option<Vec<u8>>,
}

impl StubDownloader {
    /// A downloader that produces no file
    pub fn empty() -> (Self, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        (
            Self {
                calls: calls.clone(),
                payload: None,
            },
            calls,
        )
    }

    /// A downloader that writes `payload` into the scratch directory
    pub fn with_payload(payload: Vec<u8>) -> (Self, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        (
            Self {
                calls: calls.clone(),
                payload: Some(payload),
            },
            calls,
        )
    }
}

#[async_trait]
impl FallbackDownloader for StubDownloader {
    async fn download(
        &self,
        _url: &str,
        scratch_dir: &Path,
    ) -> congress_ingest::Result<Option<PathBuf>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.payload {
            Some(bytes) => {
                let path = scratch_dir.join("fallback-download.pdf");
                std::fs::write(&path, bytes)?;
                Ok(Some(path))
            }
            None => Ok(None),
        }
    }
}

pub fn call_count(calls: &Arc<AtomicUsize>) -> usize {
    calls.load(Ordering::SeqCst)
}

/// Config pointed at a stub server, with pacing effectively disabled and a
/// minimal retry budget so tests stay fast
pub fn test_config(base_url: &str) -> Config {
    let mut config = Config::default();
    config.api.base_url = format!("{}/", base_url.trim_end_matches('/'));
    config.api.api_key = "test-key".to_string();
    config.api.page_limit = 250;
    config.api.retry_attempts = 1;
    config.api.retry_base_delay_ms = 1;
    config.pacing.requests_per_hour = 3_600_000;
    config
}

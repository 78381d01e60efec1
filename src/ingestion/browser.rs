//! # Browser Fallback Module
//!
//! ## Purpose
//! Headless-browser download path for artifacts whose direct fetch is blocked
//! (HTTP 403) or repeatedly fails at the transport level. Drives a headless
//! Chrome session that downloads the artifact into the shared scratch
//! directory.
//!
//! ## Input/Output Specification
//! - **Input**: artifact URL and scratch directory
//! - **Output**: path of the materialized download, or `None` when nothing
//!   appeared within the settle window
//! - **Bounds**: a fixed settle delay after navigation (Chrome emits no
//!   completion signal) plus an overall session timeout
//!
//! The downloader is a trait so the resolver can be exercised in tests
//! without a browser installation.

use crate::errors::{IngestError, Result};
use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::cdp::browser_protocol::browser::{
    SetDownloadBehaviorBehavior, SetDownloadBehaviorParams,
};
use futures::StreamExt;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, warn};

/// Downloads an artifact that direct HTTP could not reach
#[async_trait]
pub trait FallbackDownloader: Send + Sync {
    /// Attempt to download `url` into `scratch_dir`, returning the path of
    /// the materialized file if one appeared
    async fn download(&self, url: &str, scratch_dir: &Path) -> Result<Option<PathBuf>>;
}

/// Headless Chrome implementation of the fallback downloader
pub struct ChromeDownloader {
    settle: Duration,
    session_timeout: Duration,
}

impl ChromeDownloader {
    pub fn new(settle: Duration, session_timeout: Duration) -> Self {
        Self {
            settle,
            session_timeout,
        }
    }

    async fn run_session(&self, url: &str, scratch_dir: &Path) -> Result<Option<PathBuf>> {
        let config = BrowserConfig::builder()
            .build()
            .map_err(|details| IngestError::Browser { details })?;

        let (mut browser, mut handler) =
            Browser::launch(config)
                .await
                .map_err(|e| IngestError::Browser {
                    details: e.to_string(),
                })?;

        // The handler must be polled for the session to make progress
        let driver = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if event.is_err() {
                    break;
                }
            }
        });

        let outcome = self.drive_download(&browser, url, scratch_dir).await;

        if let Err(err) = browser.close().await {
            debug!(error = %err, "browser close failed");
        }
        driver.abort();

        outcome
    }

    async fn drive_download(
        &self,
        browser: &Browser,
        url: &str,
        scratch_dir: &Path,
    ) -> Result<Option<PathBuf>> {
        let page = browser
            .new_page("about:blank")
            .await
            .map_err(|e| IngestError::Browser {
                details: e.to_string(),
            })?;

        let params = SetDownloadBehaviorParams::builder()
            .behavior(SetDownloadBehaviorBehavior::Allow)
            .download_path(scratch_dir.display().to_string())
            .build()
            .map_err(|details| IngestError::Browser { details })?;
        page.execute(params).await.map_err(|e| IngestError::Browser {
            details: e.to_string(),
        })?;

        // Navigating to a download URL aborts the navigation itself once the
        // download starts; that error is expected
        if let Err(err) = page.goto(url).await {
            debug!(url, error = %err, "navigation ended (download may still proceed)");
        }

        // No completion signal from Chrome: wait a bounded settle delay and
        // look for a fully-written file
        tokio::time::sleep(self.settle).await;
        newest_complete_file(scratch_dir)
    }
}

#[async_trait]
impl FallbackDownloader for ChromeDownloader {
    async fn download(&self, url: &str, scratch_dir: &Path) -> Result<Option<PathBuf>> {
        match tokio::time::timeout(self.session_timeout, self.run_session(url, scratch_dir)).await
        {
            Ok(outcome) => outcome,
            Err(_) => {
                warn!(url, "browser session exceeded its timeout");
                Err(IngestError::Browser {
                    details: format!(
                        "session exceeded {}s timeout",
                        self.session_timeout.as_secs()
                    ),
                })
            }
        }
    }
}

/// Most recently modified complete file in the scratch directory, ignoring
/// Chrome's in-progress `.crdownload` markers
pub(crate) fn newest_complete_file(dir: &Path) -> Result<Option<PathBuf>> {
    let mut newest: Option<(std::time::SystemTime, PathBuf)> = None;

    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        if path
            .extension()
            .map(|ext| ext == "crdownload" || ext == "tmp")
            .unwrap_or(false)
        {
            continue;
        }
        let modified = entry.metadata()?.modified()?;
        if newest.as_ref().map(|(t, _)| modified > *t).unwrap_or(true) {
            newest = Some((modified, path));
        }
    }

    Ok(newest.map(|(_, path)| path))
}

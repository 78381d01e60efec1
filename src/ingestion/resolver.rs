//! # Document Resolver Module
//!
//! ## Purpose
//! Turns a `DocumentArtifact` reference (a URL plus a format label) into
//! extracted text, trying cheap strategies first and escalating only when
//! blocked:
//!
//! 1. Direct authenticated fetch through the shared client (which already
//!    retries transient server errors)
//! 2. Headless-browser download into a scratch directory when the direct
//!    fetch is forbidden or exhausts its retries
//! 3. Text extraction from the fetched body (HTML) or downloaded file (PDF)
//!
//! ## Input/Output Specification
//! - **Input**: a mutable `DocumentArtifact`; already-resolved artifacts are
//!   returned untouched
//! - **Output**: `artifact.text` is always `Some` afterwards. Empty string
//!   marks a terminal failure, reported as a diagnostic, so the artifact is
//!   never re-attempted on a later pass
//! - **Cleanup**: files the fallback path materializes are removed even when
//!   parsing them fails

use crate::config::ResolverConfig;
use crate::errors::{IngestError, Result};
use crate::ingestion::browser::FallbackDownloader;
use crate::ingestion::client::{DownloadOutcome, ResourceClient};
use crate::ingestion::Diagnostic;
use crate::records::{ArtifactFormat, DocumentArtifact};
use scraper::{ElementRef, Html};
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tracing::{debug, info, warn};

/// Resolves document references into extracted text
pub struct DocumentResolver<D: FallbackDownloader> {
    client: ResourceClient,
    downloader: D,
    scratch_dir: PathBuf,
    // Owns the scratch directory's lifetime when none was configured
    _scratch_guard: Option<TempDir>,
}

impl<D: FallbackDownloader> DocumentResolver<D> {
    /// Build a resolver over the shared client session. When no scratch
    /// directory is configured, a temporary one is created and removed when
    /// the resolver is dropped.
    pub fn new(client: ResourceClient, downloader: D, config: &ResolverConfig) -> Result<Self> {
        let (scratch_dir, guard) = match &config.scratch_dir {
            Some(dir) => {
                std::fs::create_dir_all(dir)?;
                (dir.clone(), None)
            }
            None => {
                let tmp = TempDir::new()?;
                (tmp.path().to_path_buf(), Some(tmp))
            }
        };

        Ok(Self {
            client,
            downloader,
            scratch_dir,
            _scratch_guard: guard,
        })
    }

    /// Resolve one artifact in place, returning a diagnostic when the
    /// artifact ends in a terminal failure.
    ///
    /// Idempotent: an artifact whose text is already set (including the
    /// empty-string failure marker) is returned without any network traffic.
    pub async fn resolve(&self, artifact: &mut DocumentArtifact) -> Option<Diagnostic> {
        if artifact.is_resolved() {
            return None;
        }

        match self.client.download(&artifact.url).await {
            Ok(DownloadOutcome::Body(bytes)) => match self.extract(artifact, &bytes) {
                Ok(text) => {
                    artifact.text = Some(text);
                    None
                }
                Err(err) => self.mark_failed(artifact, format!("extraction failed: {}", err)),
            },
            Ok(DownloadOutcome::Forbidden) => {
                info!(url = %artifact.url, "direct fetch forbidden, using browser fallback");
                self.resolve_via_fallback(artifact).await
            }
            Err(err) if err.is_recoverable() => {
                // Retries inside the client are already spent; one browser
                // attempt remains before giving up
                warn!(url = %artifact.url, error = %err, "direct fetch exhausted, using browser fallback");
                self.resolve_via_fallback(artifact).await
            }
            Err(err) => self.mark_failed(artifact, err.to_string()),
        }
    }

    /// Resolve every artifact in a slice, collecting terminal-failure
    /// diagnostics
    pub async fn resolve_all(
        &self,
        artifacts: &mut [DocumentArtifact],
        diagnostics: &mut Vec<Diagnostic>,
    ) {
        for artifact in artifacts.iter_mut() {
            if let Some(diagnostic) = self.resolve(artifact).await {
                diagnostics.push(diagnostic);
            }
        }
    }

    async fn resolve_via_fallback(&self, artifact: &mut DocumentArtifact) -> Option<Diagnostic> {
        let downloaded = match self
            .downloader
            .download(&artifact.url, &self.scratch_dir)
            .await
        {
            Ok(Some(path)) => path,
            Ok(None) => {
                return self.mark_failed(artifact, "browser download produced no file".to_string())
            }
            Err(err) => return self.mark_failed(artifact, err.to_string()),
        };

        let parsed = pdf_text_from_file(&downloaded);

        // The scratch file is removed regardless of parse outcome
        if let Err(err) = std::fs::remove_file(&downloaded) {
            debug!(path = %downloaded.display(), error = %err, "scratch file cleanup failed");
        }

        match parsed {
            Ok(text) => {
                artifact.text = Some(text);
                None
            }
            Err(err) => self.mark_failed(artifact, format!("fallback extraction failed: {}", err)),
        }
    }

    fn extract(&self, artifact: &DocumentArtifact, bytes: &[u8]) -> Result<String> {
        match artifact.format_kind() {
            ArtifactFormat::Html => Ok(html_text(bytes)),
            ArtifactFormat::Pdf => pdf_text_from_bytes(bytes),
        }
    }

    /// Record a terminal failure: the empty-string marker keeps the artifact
    /// from being re-attempted
    fn mark_failed(&self, artifact: &mut DocumentArtifact, reason: String) -> Option<Diagnostic> {
        warn!(url = %artifact.url, reason, "document resolution failed");
        artifact.text = Some(String::new());
        Some(Diagnostic::DocumentFailure {
            url: artifact.url.clone(),
            reason,
        })
    }
}

/// Visible text of an HTML document, whitespace-normalized
pub fn html_text(bytes: &[u8]) -> String {
    let source = String::from_utf8_lossy(bytes);
    let document = Html::parse_document(&source);

    let mut raw = String::new();
    collect_visible_text(document.root_element(), &mut raw);
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn collect_visible_text(element: ElementRef, out: &mut String) {
    for child in element.children() {
        if let Some(el) = ElementRef::wrap(child) {
            let name = el.value().name();
            if name == "script" || name == "style" {
                continue;
            }
            collect_visible_text(el, out);
        } else if let Some(text) = child.value().as_text() {
            out.push_str(text);
            out.push(' ');
        }
    }
}

/// Text of an in-memory PDF, extracted page by page and joined with newlines
pub fn pdf_text_from_bytes(bytes: &[u8]) -> Result<String> {
    let document = lopdf::Document::load_mem(bytes).map_err(|e| IngestError::Pdf {
        details: e.to_string(),
    })?;
    pdf_pages_text(&document)
}

/// Text of a PDF file on disk, extracted page by page
pub fn pdf_text_from_file(path: &Path) -> Result<String> {
    let document = lopdf::Document::load(path).map_err(|e| IngestError::Pdf {
        details: e.to_string(),
    })?;
    pdf_pages_text(&document)
}

fn pdf_pages_text(document: &lopdf::Document) -> Result<String> {
    let mut text = String::new();
    for (page_number, _) in document.get_pages() {
        let page_text = document
            .extract_text(&[page_number])
            .map_err(|e| IngestError::Pdf {
                details: format!("page {}: {}", page_number, e),
            })?;
        if !text.is_empty() {
            text.push('\n');
        }
        text.push_str(&page_text);
    }
    Ok(text)
}

//! # Ingestion Engine
//!
//! ## Purpose
//! Composes the ingestion pipeline: pacing, the authenticated client,
//! pagination, sub-resource enrichment, and document resolution, behind one
//! engine with a gather operation per entity type.
//!
//! ## Input/Output Specification
//! - **Input**: date windows (`YYYY-MM-DD`) or a congress number
//! - **Output**: a `GatherOutcome` carrying fully enriched records plus the
//!   diagnostics accumulated along the way
//!
//! ## Failure semantics
//! A gather fails only when a listing page cannot be fetched. Everything
//! below that — an undecodable item, a failed sub-resource, an unresolvable
//! document — is recorded and skipped so one bad record never costs the rest
//! of the batch.
//!
//! All traffic is sequential: the remote ceiling is account-wide, so
//! parallel workers would only contend for the same budget.

pub mod browser;
pub mod client;
pub mod enrich;
pub mod pacing;
pub mod paginate;
pub mod resolver;

pub use browser::{ChromeDownloader, FallbackDownloader};
pub use client::{ApiBody, DownloadOutcome, EndpointRequest, ResourceClient};
pub use enrich::{Enricher, SubResource, AMENDMENT_SUB_RESOURCES, BILL_SUB_RESOURCES};
pub use pacing::PacingController;
pub use paginate::{decode_items, PaginatedFetcher, PaginationStyle};
pub use resolver::DocumentResolver;

use crate::config::Config;
use crate::errors::{IngestError, Result};
use crate::records::{
    AggregateAmendment, AggregateBill, AmendmentMetadata, BillMetadata, BoundRecordIssue,
    LegislativeClass, RecordIssue, RecordLinkCollection,
};
use chrono::NaiveDate;
use std::time::Duration;
use tracing::info;

/// A non-fatal incident recorded while gathering
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    /// A listing item that failed validation and was skipped
    ValidationSkip {
        context: String,
        index: usize,
        reason: String,
    },
    /// A document artifact whose resolution ended in a terminal failure
    DocumentFailure { url: String, reason: String },
    /// A sub-resource fan-out call that failed for one record; also carried
    /// on the owning aggregate
    SubResource {
        record: String,
        sub_resource: String,
        reason: String,
    },
}

/// The product of one gather operation
#[derive(Debug)]
pub struct GatherOutcome<T> {
    /// Enriched records in listing order
    pub records: Vec<T>,
    /// Incidents tolerated while gathering
    pub diagnostics: Vec<Diagnostic>,
}

impl<T> GatherOutcome<T> {
    fn new() -> Self {
        Self {
            records: Vec::new(),
            diagnostics: Vec::new(),
        }
    }

    /// True when every record was gathered without incident
    pub fn is_clean(&self) -> bool {
        self.diagnostics.is_empty()
    }

    /// Number of failures tolerated during the gather
    pub fn soft_failure_count(&self) -> usize {
        self.diagnostics.len()
    }
}

/// Mirror a bill's recorded sub-resource failures into the gather-level
/// diagnostics
fn report_bill_failures(aggregate: &AggregateBill, diagnostics: &mut Vec<Diagnostic>) {
    let record = format!(
        "bill/{}/{}/{}",
        aggregate.metadata.congress,
        aggregate.metadata.bill_type.url_segment(),
        aggregate.metadata.number
    );
    for failure in &aggregate.failures {
        diagnostics.push(Diagnostic::SubResource {
            record: record.clone(),
            sub_resource: failure.sub_resource.clone(),
            reason: failure.reason.clone(),
        });
    }
}

fn report_amendment_failures(aggregate: &AggregateAmendment, diagnostics: &mut Vec<Diagnostic>) {
    let record = format!(
        "amendment/{}/{}/{}",
        aggregate.metadata.congress,
        aggregate.metadata.amendment_type.url_segment(),
        aggregate.metadata.number
    );
    for failure in &aggregate.failures {
        diagnostics.push(Diagnostic::SubResource {
            record: record.clone(),
            sub_resource: failure.sub_resource.clone(),
            reason: failure.reason.clone(),
        });
    }
}

/// Convert a `YYYY-MM-DD` date into the timestamp form the listing
/// endpoints filter on
fn to_api_datetime(date: &str) -> Result<String> {
    let parsed = NaiveDate::parse_from_str(date, "%Y-%m-%d").map_err(|e| IngestError::Config {
        message: format!("Invalid date '{}': {} (expected YYYY-MM-DD)", date, e),
    })?;
    Ok(parsed.format("%Y-%m-%dT00:00:00Z").to_string())
}

/// Sequential ingestion engine over one API credential
pub struct IngestionEngine<D: FallbackDownloader> {
    client: ResourceClient,
    pacer: PacingController,
    resolver: DocumentResolver<D>,
    page_limit: u32,
}

impl IngestionEngine<ChromeDownloader> {
    /// Build an engine with the headless-browser fallback
    pub fn new(config: &Config) -> Result<Self> {
        let downloader = ChromeDownloader::new(
            Duration::from_secs(config.resolver.download_settle_seconds),
            Duration::from_secs(config.resolver.fallback_timeout_seconds),
        );
        Self::with_downloader(config, downloader)
    }
}

impl<D: FallbackDownloader> IngestionEngine<D> {
    /// Build an engine with a caller-supplied fallback downloader
    pub fn with_downloader(config: &Config, downloader: D) -> Result<Self> {
        let client = ResourceClient::new(&config.api)?;
        let resolver = DocumentResolver::new(client.clone(), downloader, &config.resolver)?;
        Ok(Self {
            client,
            pacer: PacingController::new(config.pacing.requests_per_hour),
            resolver,
            page_limit: config.api.page_limit,
        })
    }

    /// Requests issued against the current pacing budget
    pub fn requests_issued(&self) -> u64 {
        self.pacer.requests_issued()
    }

    /// Gather every bill updated inside the date window, fully enriched.
    ///
    /// # Errors
    /// `IngestError::PageFetch` when a listing page cannot be retrieved.
    pub async fn gather_bills(&mut self, from: &str, to: &str) -> Result<GatherOutcome<AggregateBill>> {
        let request = self.windowed_request("bill", from, to)?;
        let raw = self
            .fetch_listing(&request, &PaginationStyle::Standard { items_path: &["bills"] })
            .await?;

        let mut outcome = GatherOutcome::new();
        let cores: Vec<BillMetadata> = decode_items(raw, "bill listing", &mut outcome.diagnostics);

        info!(count = cores.len(), "enriching bills");
        for metadata in cores {
            let aggregate = self.enrich_one_bill(metadata, LegislativeClass::Bill).await;
            let aggregate = self.resolve_bill_documents(aggregate, &mut outcome.diagnostics).await;
            report_bill_failures(&aggregate, &mut outcome.diagnostics);
            outcome.records.push(aggregate);
        }

        Ok(outcome)
    }

    /// Gather enacted laws of one congress updated inside the date window.
    /// Laws are bills carrying the `Law` discriminant; the listing endpoint
    /// differs but the enrichment fan-out is identical.
    pub async fn gather_laws(
        &mut self,
        congress: u32,
        from: &str,
        to: &str,
    ) -> Result<GatherOutcome<AggregateBill>> {
        let request = self.windowed_request(&format!("law/{}", congress), from, to)?;
        let raw = self
            .fetch_listing(&request, &PaginationStyle::Standard { items_path: &["bills"] })
            .await?;

        let mut outcome = GatherOutcome::new();
        let cores: Vec<BillMetadata> = decode_items(raw, "law listing", &mut outcome.diagnostics);

        info!(count = cores.len(), congress, "enriching laws");
        for metadata in cores {
            let aggregate = self.enrich_one_bill(metadata, LegislativeClass::Law).await;
            let aggregate = self.resolve_bill_documents(aggregate, &mut outcome.diagnostics).await;
            report_bill_failures(&aggregate, &mut outcome.diagnostics);
            outcome.records.push(aggregate);
        }

        Ok(outcome)
    }

    /// Gather every amendment updated inside the date window, fully enriched
    pub async fn gather_amendments(
        &mut self,
        from: &str,
        to: &str,
    ) -> Result<GatherOutcome<AggregateAmendment>> {
        let request = self.windowed_request("amendment", from, to)?;
        let raw = self
            .fetch_listing(
                &request,
                &PaginationStyle::Standard { items_path: &["amendments"] },
            )
            .await?;

        let mut outcome = GatherOutcome::new();
        let cores: Vec<AmendmentMetadata> =
            decode_items(raw, "amendment listing", &mut outcome.diagnostics);

        info!(count = cores.len(), "enriching amendments");
        for metadata in cores {
            let mut aggregate = {
                let mut enricher = Enricher::new(&self.client, &mut self.pacer, self.page_limit);
                enricher.enrich_amendment(metadata).await
            };
            for version in &mut aggregate.text_versions {
                self.resolver
                    .resolve_all(&mut version.formats, &mut outcome.diagnostics)
                    .await;
            }
            report_amendment_failures(&aggregate, &mut outcome.diagnostics);
            outcome.records.push(aggregate);
        }

        Ok(outcome)
    }

    /// Gather daily Congressional Record issues published inside the date
    /// window, with section text resolved and assembled
    pub async fn gather_record_issues(
        &mut self,
        from: &str,
        to: &str,
    ) -> Result<GatherOutcome<RecordIssue>> {
        let request = self.windowed_request("congressional-record", from, to)?;
        let raw = self
            .fetch_listing(&request, &PaginationStyle::RecordResults)
            .await?;

        let mut outcome = GatherOutcome::new();
        let mut issues: Vec<RecordIssue> =
            decode_items(raw, "congressional record listing", &mut outcome.diagnostics);

        info!(count = issues.len(), "resolving record issue sections");
        for issue in &mut issues {
            self.resolve_sections(&mut issue.links, &mut outcome.diagnostics)
                .await;
        }
        outcome.records = issues;

        Ok(outcome)
    }

    /// Gather bound Congressional Record issues published inside the date
    /// window
    pub async fn gather_bound_record_issues(
        &mut self,
        from: &str,
        to: &str,
    ) -> Result<GatherOutcome<BoundRecordIssue>> {
        let request = self.windowed_request("bound-congressional-record", from, to)?;
        let raw = self
            .fetch_listing(&request, &PaginationStyle::RecordResults)
            .await?;

        let mut outcome = GatherOutcome::new();
        let mut issues: Vec<BoundRecordIssue> = decode_items(
            raw,
            "bound congressional record listing",
            &mut outcome.diagnostics,
        );

        info!(count = issues.len(), "resolving bound record issue sections");
        for issue in &mut issues {
            self.resolve_sections(&mut issue.links, &mut outcome.diagnostics)
                .await;
        }
        outcome.records = issues;

        Ok(outcome)
    }

    /// Build a listing request filtered to a date window
    fn windowed_request(&self, path: &str, from: &str, to: &str) -> Result<EndpointRequest> {
        Ok(EndpointRequest::get(path)
            .with_query("fromDateTime", to_api_datetime(from)?)
            .with_query("toDateTime", to_api_datetime(to)?)
            .with_query("limit", self.page_limit.to_string()))
    }

    /// Walk one listing to exhaustion under a fresh pacing budget
    async fn fetch_listing(
        &mut self,
        request: &EndpointRequest,
        style: &PaginationStyle,
    ) -> Result<Vec<serde_json::Value>> {
        self.pacer.reset();
        let mut fetcher = PaginatedFetcher::new(&self.client, &mut self.pacer);
        fetcher.fetch_all(request, style).await
    }

    async fn enrich_one_bill(
        &mut self,
        metadata: BillMetadata,
        class: LegislativeClass,
    ) -> AggregateBill {
        let mut enricher = Enricher::new(&self.client, &mut self.pacer, self.page_limit);
        enricher.enrich_bill(metadata, class).await
    }

    /// Resolve the text artifacts attached to a bill's text versions
    async fn resolve_bill_documents(
        &self,
        mut aggregate: AggregateBill,
        diagnostics: &mut Vec<Diagnostic>,
    ) -> AggregateBill {
        for version in &mut aggregate.text_versions {
            self.resolver
                .resolve_all(&mut version.formats, diagnostics)
                .await;
        }
        aggregate
    }

    /// Resolve every PDF part of every present section, then assemble each
    /// section's full text
    async fn resolve_sections(
        &self,
        links: &mut RecordLinkCollection,
        diagnostics: &mut Vec<Diagnostic>,
    ) {
        for section in links.sections_mut() {
            for link in section.pdf.iter_mut() {
                let mut artifact = link.to_artifact();
                if let Some(diagnostic) = self.resolver.resolve(&mut artifact).await {
                    diagnostics.push(diagnostic);
                }
                link.text = artifact.text;
            }
            section.assemble_full_text();
        }
    }
}

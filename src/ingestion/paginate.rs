//! # Paginated Fetcher Module
//!
//! ## Purpose
//! Walks an offset-based cursor across one listing endpoint until exhausted,
//! pacing between pages and accumulating raw items in offset order.
//!
//! ## Input/Output Specification
//! - **Input**: an `EndpointRequest` template (without offset) and a
//!   `PaginationStyle` describing the response shape
//! - **Output**: every raw item from every page, concatenated in fetch order
//! - **Progress**: item count versus the total-count hint is logged per page;
//!   listing walks for a full congress can span tens of thousands of items
//!
//! ## Failure semantics
//! A page fetch failure is fatal to the enclosing gather call — there is no
//! partial-page recovery at this layer. Per-item decode failures are handled
//! above the fetcher by `decode_items`, which skips the offending item and
//! records a diagnostic while keeping the rest of the page.

use crate::errors::{IngestError, Result};
use crate::ingestion::client::{EndpointRequest, ResourceClient};
use crate::ingestion::pacing::PacingController;
use crate::ingestion::Diagnostic;
use reqwest::Url;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{info, warn};

/// Response shape of a paginated listing
#[derive(Debug, Clone)]
pub enum PaginationStyle {
    /// `{ <items-key>: [...], pagination: { count, next? } }`; the next
    /// offset is carried in the `next` URL's `offset` query parameter. The
    /// items key is a path because some sub-resources nest their array one
    /// level down (e.g. `subjects.legislativeSubjects`).
    Standard {
        items_path: &'static [&'static str],
    },
    /// `{ Results: { Issues: [...], TotalCount, IndexStart } }`; the next
    /// offset is `IndexStart + Issues.len()`, terminal once it reaches
    /// `TotalCount`
    RecordResults,
}

/// One decoded page of a paginated walk
#[derive(Debug)]
pub struct Page {
    /// Raw items in response order
    pub items: Vec<Value>,
    /// Offset of the next page; `None` is the terminal sentinel
    pub next_offset: Option<u64>,
    /// Total-count hint, stable once observed within one walk
    pub total_count: Option<u64>,
}

/// Extract the `offset` query parameter from a pagination `next` URL
pub fn extract_offset(url: &str) -> Option<u64> {
    let parsed = Url::parse(url).ok()?;
    parsed
        .query_pairs()
        .find(|(key, _)| key == "offset")
        .and_then(|(_, value)| value.parse().ok())
}

/// Parse one raw listing response into a `Page`
pub fn parse_page(body: &Value, style: &PaginationStyle) -> Result<Page> {
    match style {
        PaginationStyle::Standard { items_path } => {
            let mut node = Some(body);
            for key in *items_path {
                node = node.and_then(|n| n.get(*key));
            }
            let items = node
                .and_then(Value::as_array)
                .cloned()
                .unwrap_or_default();
            let pagination = body.get("pagination");
            let total_count = pagination
                .and_then(|p| p.get("count"))
                .and_then(Value::as_u64);
            let next_offset = pagination
                .and_then(|p| p.get("next"))
                .and_then(Value::as_str)
                .and_then(extract_offset);
            Ok(Page {
                items,
                next_offset,
                total_count,
            })
        }
        PaginationStyle::RecordResults => {
            let results = body.get("Results").ok_or_else(|| IngestError::Decode {
                context: "congressional record listing".to_string(),
                details: "missing 'Results' object".to_string(),
            })?;
            let items = results
                .get("Issues")
                .and_then(Value::as_array)
                .cloned()
                .unwrap_or_default();
            let total_count = results.get("TotalCount").and_then(Value::as_u64);
            let index_start = results
                .get("IndexStart")
                .and_then(Value::as_u64)
                .unwrap_or(0);

            let consumed = index_start + items.len() as u64;
            let next_offset = match total_count {
                Some(total) if consumed < total && !items.is_empty() => Some(consumed),
                _ => None,
            };
            Ok(Page {
                items,
                next_offset,
                total_count,
            })
        }
    }
}

/// Walks one paginated endpoint to exhaustion
pub struct PaginatedFetcher<'a> {
    client: &'a ResourceClient,
    pacer: &'a mut PacingController,
}

impl<'a> PaginatedFetcher<'a> {
    pub fn new(client: &'a ResourceClient, pacer: &'a mut PacingController) -> Self {
        Self { client, pacer }
    }

    /// Fetch every page of `template`, returning all raw items in offset
    /// order.
    ///
    /// # Errors
    /// `IngestError::PageFetch` when any page cannot be retrieved; items
    /// gathered so far are discarded with the error (finer-grained recovery
    /// belongs to enrichment).
    pub async fn fetch_all(
        &mut self,
        template: &EndpointRequest,
        style: &PaginationStyle,
    ) -> Result<Vec<Value>> {
        let mut items = Vec::new();
        let mut offset: u64 = 0;
        let mut total_count: Option<u64> = None;

        loop {
            self.pacer.wait().await;

            let mut request = template.clone();
            if offset > 0 {
                request = request.with_query("offset", offset.to_string());
            }

            let body = self.client.call_json(&request).await.map_err(|source| {
                IngestError::PageFetch {
                    endpoint: template.endpoint().to_string(),
                    offset,
                    source: Box::new(source),
                }
            })?;

            let page = parse_page(&body, style)?;

            // The total-count hint is stable once observed
            if total_count.is_none() {
                total_count = page.total_count;
            }

            items.extend(page.items);
            info!(
                endpoint = template.endpoint(),
                fetched = items.len(),
                total = total_count.unwrap_or(0),
                "retrieved page"
            );

            match page.next_offset {
                Some(next) if next > offset => offset = next,
                Some(next) => {
                    // A stalled cursor would loop forever; treat as terminal
                    warn!(
                        endpoint = template.endpoint(),
                        offset, next, "non-advancing pagination cursor, stopping walk"
                    );
                    break;
                }
                None => break,
            }
        }

        Ok(items)
    }
}

/// Decode raw items into typed records, skipping items that fail validation.
///
/// A page is never discarded for one bad item: the offending item is skipped
/// and recorded as a diagnostic carrying its index and endpoint context.
pub fn decode_items<T: DeserializeOwned>(
    items: Vec<Value>,
    context: &str,
    diagnostics: &mut Vec<Diagnostic>,
) -> Vec<T> {
    let mut decoded = Vec::with_capacity(items.len());
    for (index, item) in items.into_iter().enumerate() {
        match serde_json::from_value::<T>(item) {
            Ok(record) => decoded.push(record),
            Err(err) => {
                warn!(context, index, error = %err, "skipping undecodable item");
                diagnostics.push(Diagnostic::ValidationSkip {
                    context: context.to_string(),
                    index,
                    reason: err.to_string(),
                });
            }
        }
    }
    decoded
}

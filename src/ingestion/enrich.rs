//! # Enrichment Module
//!
//! ## Purpose
//! Fans out from one top-level metadata record to its declared set of
//! sub-resource endpoints and merges the results into one aggregate record.
//! This is the dominant cost driver of a gather: one network call per
//! sub-resource per record.
//!
//! ## Input/Output Specification
//! - **Input**: a `BillMetadata` or `AmendmentMetadata` core
//! - **Output**: the aggregate record with every collection populated or
//!   explicitly marked failed
//! - **Policy**: a sub-resource fetch or decode failure never aborts
//!   enrichment of the remaining sub-resources; the failed collection stays
//!   empty and the failure is recorded on the owning record
//!
//! ## Key Features
//! - Declarative sub-resource tables (name → path segment → items key);
//!   no runtime endpoint dispatch
//! - Nested sub-resources are themselves paginated and walked to exhaustion
//! - Explicit per-sub-resource outcome instead of silent catch-and-continue

use crate::errors::Result;
use crate::ingestion::client::{EndpointRequest, ResourceClient};
use crate::ingestion::pacing::PacingController;
use crate::ingestion::paginate::{PaginatedFetcher, PaginationStyle};
use crate::records::{
    AggregateAmendment, AggregateBill, AmendmentMetadata, BillMetadata, LegislativeClass,
    SubResourceFailure,
};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::warn;

/// One row of a sub-resource table
#[derive(Debug, Clone, Copy)]
pub struct SubResource {
    /// Stable name recorded in diagnostics
    pub name: &'static str,
    /// Path segment appended to the parent record's detail path
    pub path_segment: &'static str,
    /// Location of the item array inside the response body
    pub items_path: &'static [&'static str],
}

/// Sub-resources fetched for every bill (and law)
pub const BILL_SUB_RESOURCES: [SubResource; 9] = [
    SubResource {
        name: "actions",
        path_segment: "actions",
        items_path: &["actions"],
    },
    SubResource {
        name: "amendments",
        path_segment: "amendments",
        items_path: &["amendments"],
    },
    SubResource {
        name: "committees",
        path_segment: "committees",
        items_path: &["committees"],
    },
    SubResource {
        name: "cosponsors",
        path_segment: "cosponsors",
        items_path: &["cosponsors"],
    },
    SubResource {
        name: "relatedbills",
        path_segment: "relatedbills",
        items_path: &["relatedBills"],
    },
    SubResource {
        name: "subjects",
        path_segment: "subjects",
        items_path: &["subjects", "legislativeSubjects"],
    },
    SubResource {
        name: "summaries",
        path_segment: "summaries",
        items_path: &["summaries"],
    },
    SubResource {
        name: "text",
        path_segment: "text",
        items_path: &["textVersions"],
    },
    SubResource {
        name: "titles",
        path_segment: "titles",
        items_path: &["titles"],
    },
];

/// Reduced sub-resource set fetched for every amendment
pub const AMENDMENT_SUB_RESOURCES: [SubResource; 3] = [
    SubResource {
        name: "actions",
        path_segment: "actions",
        items_path: &["actions"],
    },
    SubResource {
        name: "cosponsors",
        path_segment: "cosponsors",
        items_path: &["cosponsors"],
    },
    SubResource {
        name: "text",
        path_segment: "text",
        items_path: &["textVersions"],
    },
];

/// Fans out to sub-resource endpoints and merges results onto metadata cores
pub struct Enricher<'a> {
    client: &'a ResourceClient,
    pacer: &'a mut PacingController,
    page_limit: u32,
}

impl<'a> Enricher<'a> {
    pub fn new(client: &'a ResourceClient, pacer: &'a mut PacingController, page_limit: u32) -> Self {
        Self {
            client,
            pacer,
            page_limit,
        }
    }

    /// Enrich one bill metadata core into a full aggregate.
    ///
    /// Never fails: sub-resource failures are recorded on the returned
    /// aggregate instead of propagating.
    pub async fn enrich_bill(
        &mut self,
        metadata: BillMetadata,
        class: LegislativeClass,
    ) -> AggregateBill {
        let base = format!(
            "bill/{}/{}/{}",
            metadata.congress,
            metadata.bill_type.url_segment(),
            metadata.number
        );
        let mut aggregate = AggregateBill::new(metadata, class);

        for sub in &BILL_SUB_RESOURCES {
            let outcome = self.fetch_sub_resource(&base, sub).await;
            match sub.name {
                "actions" => assign(&mut aggregate.actions, outcome, sub, &mut aggregate.failures),
                "amendments" => assign(
                    &mut aggregate.amendments,
                    outcome,
                    sub,
                    &mut aggregate.failures,
                ),
                "committees" => assign(
                    &mut aggregate.committees,
                    outcome,
                    sub,
                    &mut aggregate.failures,
                ),
                "cosponsors" => assign(
                    &mut aggregate.cosponsors,
                    outcome,
                    sub,
                    &mut aggregate.failures,
                ),
                "relatedbills" => assign(
                    &mut aggregate.related_bills,
                    outcome,
                    sub,
                    &mut aggregate.failures,
                ),
                "subjects" => assign(
                    &mut aggregate.subjects,
                    outcome,
                    sub,
                    &mut aggregate.failures,
                ),
                "summaries" => assign(
                    &mut aggregate.summaries,
                    outcome,
                    sub,
                    &mut aggregate.failures,
                ),
                "text" => assign(
                    &mut aggregate.text_versions,
                    outcome,
                    sub,
                    &mut aggregate.failures,
                ),
                "titles" => assign(&mut aggregate.titles, outcome, sub, &mut aggregate.failures),
                _ => unreachable!("sub-resource table names are fixed"),
            }
        }

        aggregate
    }

    /// Enrich one amendment metadata core into a full aggregate
    pub async fn enrich_amendment(&mut self, metadata: AmendmentMetadata) -> AggregateAmendment {
        let base = format!(
            "amendment/{}/{}/{}",
            metadata.congress,
            metadata.amendment_type.url_segment(),
            metadata.number
        );
        let mut aggregate = AggregateAmendment::new(metadata);

        for sub in &AMENDMENT_SUB_RESOURCES {
            let outcome = self.fetch_sub_resource(&base, sub).await;
            match sub.name {
                "actions" => assign(&mut aggregate.actions, outcome, sub, &mut aggregate.failures),
                "cosponsors" => assign(
                    &mut aggregate.cosponsors,
                    outcome,
                    sub,
                    &mut aggregate.failures,
                ),
                "text" => assign(
                    &mut aggregate.text_versions,
                    outcome,
                    sub,
                    &mut aggregate.failures,
                ),
                _ => unreachable!("sub-resource table names are fixed"),
            }
        }

        aggregate
    }

    /// Fetch every item of one sub-resource, walking nested pagination
    async fn fetch_sub_resource(&mut self, base: &str, sub: &SubResource) -> Result<Vec<Value>> {
        let template = EndpointRequest::get(format!("{}/{}", base, sub.path_segment))
            .with_query("limit", self.page_limit.to_string());
        let style = PaginationStyle::Standard {
            items_path: sub.items_path,
        };
        let mut fetcher = PaginatedFetcher::new(self.client, self.pacer);
        fetcher.fetch_all(&template, &style).await
    }
}

/// Decode a fetched sub-resource into its typed collection, or record the
/// failure and leave the collection empty
fn assign<T: DeserializeOwned>(
    target: &mut Vec<T>,
    outcome: Result<Vec<Value>>,
    sub: &SubResource,
    failures: &mut Vec<SubResourceFailure>,
) {
    let reason = match outcome {
        Ok(items) => match serde_json::from_value::<Vec<T>>(Value::Array(items)) {
            Ok(decoded) => {
                *target = decoded;
                return;
            }
            Err(err) => format!("decode failed: {}", err),
        },
        Err(err) => err.to_string(),
    };

    warn!(sub_resource = sub.name, reason, "sub-resource enrichment failed");
    failures.push(SubResourceFailure {
        sub_resource: sub.name.to_string(),
        reason,
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::IngestError;
    use crate::records::bills::Action;
    use serde_json::json;

    #[test]
    fn test_bill_table_covers_all_collections() {
        let names: Vec<&str> = BILL_SUB_RESOURCES.iter().map(|s| s.name).collect();
        assert_eq!(
            names,
            [
                "actions",
                "amendments",
                "committees",
                "cosponsors",
                "relatedbills",
                "subjects",
                "summaries",
                "text",
                "titles"
            ]
        );
    }

    #[test]
    fn test_assign_records_failure_without_clearing_others() {
        let sub = &BILL_SUB_RESOURCES[0];
        let mut target: Vec<Action> = Vec::new();
        let mut failures = Vec::new();

        assign(
            &mut target,
            Err(IngestError::Http {
                status: 500,
                endpoint: "bill/117/hr/1/actions".to_string(),
            }),
            sub,
            &mut failures,
        );

        assert!(target.is_empty());
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].sub_resource, "actions");
    }

    #[test]
    fn test_assign_decodes_valid_items() {
        let sub = &BILL_SUB_RESOURCES[0];
        let mut target: Vec<Action> = Vec::new();
        let mut failures = Vec::new();

        let items = vec![json!({
            "actionDate": "2022-04-06",
            "text": "Became Public Law No: 117-108.",
            "type": "BecameLaw"
        })];
        assign(&mut target, Ok(items), sub, &mut failures);

        assert_eq!(target.len(), 1);
        assert!(failures.is_empty());
        assert_eq!(target[0].action_type, "BecameLaw");
    }
}

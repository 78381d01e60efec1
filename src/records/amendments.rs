//! # Amendment Records
//!
//! Typed model for amendments: the metadata core from the paginated
//! `amendment` listing and the aggregate assembled from its reduced
//! sub-resource set (actions, cosponsors, text versions).

use crate::records::bills::{string_or_number, Action, LatestAction, TextVersion};
use crate::records::people::Cosponsor;
use crate::records::SubResourceFailure;
use serde::{Deserialize, Serialize};

/// Amendment type codes used by congress.gov
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AmendmentType {
    #[serde(rename = "HAMDT")]
    HouseAmendment,
    #[serde(rename = "SAMDT")]
    SenateAmendment,
    #[serde(rename = "SUAMDT")]
    SenateUnprintedAmendment,
}

impl AmendmentType {
    /// Lowercase URL fragment used in detail and sub-resource paths
    pub fn url_segment(self) -> &'static str {
        match self {
            AmendmentType::HouseAmendment => "hamdt",
            AmendmentType::SenateAmendment => "samdt",
            AmendmentType::SenateUnprintedAmendment => "suamdt",
        }
    }
}

/// Metadata core for one amendment.
///
/// The identity triple (congress, amendment_type, number) is immutable after
/// construction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AmendmentMetadata {
    pub congress: u32,
    #[serde(rename = "type")]
    pub amendment_type: AmendmentType,
    #[serde(deserialize_with = "string_or_number")]
    pub number: String,
    #[serde(default)]
    pub purpose: Option<String>,
    #[serde(rename = "latestAction", default)]
    pub latest_action: Option<LatestAction>,
    #[serde(rename = "updateDate", default)]
    pub update_date: String,
    #[serde(default)]
    pub url: String,
}

/// An amendment merged with its enrichment collections
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AggregateAmendment {
    pub metadata: AmendmentMetadata,
    #[serde(default)]
    pub actions: Vec<Action>,
    #[serde(default)]
    pub cosponsors: Vec<Cosponsor>,
    #[serde(default)]
    pub text_versions: Vec<TextVersion>,
    #[serde(default)]
    pub failures: Vec<SubResourceFailure>,
}

impl AggregateAmendment {
    /// Empty aggregate around a metadata core
    pub fn new(metadata: AmendmentMetadata) -> Self {
        Self {
            metadata,
            actions: Vec::new(),
            cosponsors: Vec::new(),
            text_versions: Vec::new(),
            failures: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_amendment_decode() {
        let raw = serde_json::json!({
            "congress": 117,
            "latestAction": { "actionDate": "2021-08-08", "text": "Amendment SA 2137 agreed to in Senate by Yea-Nay Vote. 69 - 28. Record Vote Number: 312." },
            "number": "2137",
            "purpose": "In the nature of a substitute.",
            "type": "SAMDT",
            "updateDate": "2022-02-25T17:34:49Z",
            "url": "https://api.congress.gov/v3/amendment/117/samdt/2137?format=json"
        });
        let amendment: AmendmentMetadata = serde_json::from_value(raw).unwrap();
        assert_eq!(amendment.amendment_type, AmendmentType::SenateAmendment);
        assert_eq!(amendment.amendment_type.url_segment(), "samdt");
        assert_eq!(amendment.number, "2137");
    }
}

//! # Bill Records
//!
//! ## Purpose
//! Typed model for bills and laws: the metadata core returned by the paginated
//! listing, the nested collections filled in by enrichment fan-out, and the
//! assembled aggregate.
//!
//! ## Input/Output Specification
//! - **Input**: camelCase JSON from `bill` listing and sub-resource endpoints
//! - **Output**: `AggregateBill` records with per-record failure diagnostics
//!
//! A law is not a separate type: it shares the bill core and is distinguished
//! by the `LegislativeClass` discriminant on the aggregate.

use crate::records::people::Cosponsor;
use crate::records::{DocumentArtifact, SubResourceFailure};
use serde::{Deserialize, Deserializer, Serialize};

/// Bill type codes used by congress.gov
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BillType {
    #[serde(rename = "HR")]
    HouseBill,
    #[serde(rename = "HRES")]
    HouseResolution,
    #[serde(rename = "HJRES")]
    HouseJointResolution,
    #[serde(rename = "HCONRES")]
    HouseConcurrentResolution,
    #[serde(rename = "S")]
    SenateBill,
    #[serde(rename = "SRES")]
    SenateResolution,
    #[serde(rename = "SJRES")]
    SenateJointResolution,
    #[serde(rename = "SCONRES")]
    SenateConcurrentResolution,
}

impl BillType {
    /// Lowercase URL fragment used in detail and sub-resource paths.
    ///
    /// Static lookup table; the enum itself carries no derived state.
    pub fn url_segment(self) -> &'static str {
        match self {
            BillType::HouseBill => "hr",
            BillType::HouseResolution => "hres",
            BillType::HouseJointResolution => "hjres",
            BillType::HouseConcurrentResolution => "hconres",
            BillType::SenateBill => "s",
            BillType::SenateResolution => "sres",
            BillType::SenateJointResolution => "sjres",
            BillType::SenateConcurrentResolution => "sconres",
        }
    }

    /// Upper-case code as it appears in API payloads
    pub fn as_code(self) -> &'static str {
        match self {
            BillType::HouseBill => "HR",
            BillType::HouseResolution => "HRES",
            BillType::HouseJointResolution => "HJRES",
            BillType::HouseConcurrentResolution => "HCONRES",
            BillType::SenateBill => "S",
            BillType::SenateResolution => "SRES",
            BillType::SenateJointResolution => "SJRES",
            BillType::SenateConcurrentResolution => "SCONRES",
        }
    }
}

/// Discriminant separating plain bills from enacted laws on the shared
/// aggregate core
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LegislativeClass {
    Bill,
    Law,
}

/// Latest recorded action on a bill
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LatestAction {
    #[serde(rename = "actionDate", default)]
    pub action_date: String,
    #[serde(default)]
    pub text: String,
}

/// Metadata core for one bill, as returned by the paginated `bill` listing.
///
/// The identity triple (congress, bill_type, number) is immutable after
/// construction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BillMetadata {
    pub congress: u32,
    #[serde(rename = "type")]
    pub bill_type: BillType,
    #[serde(deserialize_with = "string_or_number")]
    pub number: String,
    #[serde(default)]
    pub title: String,
    #[serde(rename = "originChamber", default)]
    pub origin_chamber: String,
    #[serde(rename = "originChamberCode", default)]
    pub origin_chamber_code: String,
    #[serde(rename = "latestAction", default)]
    pub latest_action: Option<LatestAction>,
    #[serde(rename = "updateDate", default)]
    pub update_date: String,
    #[serde(rename = "updateDateIncludingText", default)]
    pub update_date_including_text: String,
    #[serde(default)]
    pub url: String,
}

/// Source system attribution for an action
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionSourceSystem {
    #[serde(default)]
    pub code: Option<u32>,
    #[serde(default)]
    pub name: String,
}

/// One recorded vote attached to an action
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordedVote {
    #[serde(default)]
    pub chamber: String,
    #[serde(default)]
    pub congress: Option<u32>,
    #[serde(default)]
    pub date: String,
    #[serde(rename = "rollNumber", default)]
    pub roll_number: Option<u32>,
    #[serde(rename = "sessionNumber", default)]
    pub session_number: Option<u32>,
    #[serde(default)]
    pub url: String,
}

/// One action in a bill's action history
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Action {
    #[serde(default)]
    pub text: String,
    #[serde(rename = "type", default)]
    pub action_type: String,
    #[serde(rename = "actionDate", default)]
    pub action_date: String,
    #[serde(rename = "actionCode", default)]
    pub action_code: Option<String>,
    #[serde(rename = "sourceSystem", default)]
    pub source_system: Option<ActionSourceSystem>,
    #[serde(rename = "recordedVotes", default)]
    pub recorded_votes: Vec<RecordedVote>,
}

/// Committee referral entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommitteeRef {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub chamber: String,
    #[serde(rename = "type", default)]
    pub committee_type: String,
    #[serde(rename = "systemCode", default)]
    pub system_code: String,
    #[serde(default)]
    pub url: String,
}

/// Reference to a related bill
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelatedBill {
    #[serde(default)]
    pub congress: Option<u32>,
    #[serde(rename = "type", default)]
    pub bill_type: String,
    #[serde(default, deserialize_with = "opt_string_or_number")]
    pub number: Option<String>,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub url: String,
}

/// Legislative subject term
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Subject {
    #[serde(default)]
    pub name: String,
    #[serde(rename = "updateDate", default)]
    pub update_date: String,
}

/// One summary version of a bill
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Summary {
    #[serde(rename = "actionDate", default)]
    pub action_date: String,
    #[serde(rename = "actionDesc", default)]
    pub action_desc: String,
    #[serde(default)]
    pub text: String,
    #[serde(rename = "updateDate", default)]
    pub update_date: String,
    #[serde(rename = "versionCode", default)]
    pub version_code: String,
}

/// One published text version with its downloadable formats
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextVersion {
    #[serde(default)]
    pub date: Option<String>,
    #[serde(rename = "type", default)]
    pub version_type: String,
    #[serde(default)]
    pub formats: Vec<DocumentArtifact>,
}

/// One title assigned to a bill
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BillTitle {
    #[serde(default)]
    pub title: String,
    #[serde(rename = "titleType", default)]
    pub title_type: String,
    #[serde(rename = "titleTypeCode", default)]
    pub title_type_code: Option<u32>,
    #[serde(rename = "billTextVersionCode", default)]
    pub bill_text_version_code: Option<String>,
}

/// Reference to an amendment of a bill
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AmendmentRef {
    #[serde(default)]
    pub congress: Option<u32>,
    #[serde(rename = "type", default)]
    pub amendment_type: String,
    #[serde(default, deserialize_with = "opt_string_or_number")]
    pub number: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub url: String,
}

/// A bill (or law) merged with all of its enrichment collections.
///
/// Each collection is populated by exactly one sub-resource fan-out call; a
/// failed call leaves its collection empty and records the failure in
/// `failures` rather than aborting assembly of the rest.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AggregateBill {
    pub metadata: BillMetadata,
    pub class: LegislativeClass,
    #[serde(default)]
    pub actions: Vec<Action>,
    #[serde(default)]
    pub amendments: Vec<AmendmentRef>,
    #[serde(default)]
    pub committees: Vec<CommitteeRef>,
    #[serde(default)]
    pub cosponsors: Vec<Cosponsor>,
    #[serde(default)]
    pub related_bills: Vec<RelatedBill>,
    #[serde(default)]
    pub subjects: Vec<Subject>,
    #[serde(default)]
    pub summaries: Vec<Summary>,
    #[serde(default)]
    pub text_versions: Vec<TextVersion>,
    #[serde(default)]
    pub titles: Vec<BillTitle>,
    #[serde(default)]
    pub failures: Vec<SubResourceFailure>,
}

impl AggregateBill {
    /// Empty aggregate around a metadata core
    pub fn new(metadata: BillMetadata, class: LegislativeClass) -> Self {
        Self {
            metadata,
            class,
            actions: Vec::new(),
            amendments: Vec::new(),
            committees: Vec::new(),
            cosponsors: Vec::new(),
            related_bills: Vec::new(),
            subjects: Vec::new(),
            summaries: Vec::new(),
            text_versions: Vec::new(),
            titles: Vec::new(),
            failures: Vec::new(),
        }
    }
}

/// Bill numbers arrive as either a JSON number or a string; normalize to a
/// string
pub(crate) fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Num(i64),
        Text(String),
    }
    Ok(match Raw::deserialize(deserializer)? {
        Raw::Num(n) => n.to_string(),
        Raw::Text(s) => s,
    })
}

pub(crate) fn opt_string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Num(i64),
        Text(String),
    }
    Ok(Option::<Raw>::deserialize(deserializer)?.map(|raw| match raw {
        Raw::Num(n) => n.to_string(),
        Raw::Text(s) => s,
    }))
}

//! # Member and Sponsor Records
//!
//! Typed model for members of Congress as they appear in sponsor and
//! cosponsor collections. Cosponsors share the member core plus sponsorship
//! fields; the upstream JSON is flat, so the core is flattened in.

use serde::{Deserialize, Serialize};

/// Portrait attribution for a member
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Depiction {
    #[serde(default)]
    pub attribution: String,
    #[serde(rename = "imageUrl", default)]
    pub image_url: String,
}

/// A member of Congress
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Member {
    #[serde(rename = "bioguideId")]
    pub bioguide_id: String,
    #[serde(rename = "firstName", default)]
    pub first_name: String,
    #[serde(rename = "fullName", alias = "name", default)]
    pub full_name: String,
    #[serde(rename = "lastName", default)]
    pub last_name: String,
    #[serde(rename = "middleName", default)]
    pub middle_name: String,
    #[serde(alias = "partyName", default)]
    pub party: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub district: Option<u32>,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub depiction: Option<Depiction>,
}

/// A cosponsor: member core plus sponsorship detail
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cosponsor {
    #[serde(flatten)]
    pub member: Member,
    #[serde(rename = "sponsorshipDate", default)]
    pub sponsorship_date: String,
    #[serde(rename = "isOriginalCosponsor", default)]
    pub is_original_cosponsor: bool,
    #[serde(rename = "sponsorshipWithdrawnDate", default)]
    pub sponsorship_withdrawn_date: Option<String>,
}

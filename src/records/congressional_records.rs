//! # Congressional Record Issues
//!
//! ## Purpose
//! Typed model for daily and bound Congressional Record issues. Each issue
//! links to one or more sections (daily digest, full record, chamber
//! sections), and each section is published as one or more PDF parts whose
//! text is recovered through the document resolver.
//!
//! ## Input/Output Specification
//! - **Input**: PascalCase JSON from the `congressional-record` and
//!   `bound-congressional-record` endpoints
//! - **Output**: `RecordIssue`/`BoundRecordIssue` with assembled section text

use crate::records::DocumentArtifact;
use serde::{Deserialize, Serialize};

/// A link to one PDF part of a record section
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordPdfLink {
    /// Part number; long sections are split across parts
    #[serde(rename = "Part", default)]
    pub part: Option<u32>,
    #[serde(rename = "Url")]
    pub url: String,
    /// Extracted text; `None` until resolved
    #[serde(rename = "Text", default)]
    pub text: Option<String>,
}

impl RecordPdfLink {
    /// View this link as a resolvable document artifact
    pub fn to_artifact(&self) -> DocumentArtifact {
        DocumentArtifact {
            url: self.url.clone(),
            format: "PDF".to_string(),
            text: self.text.clone(),
        }
    }
}

/// One section of a record issue (daily digest, full record, house, senate,
/// extensions of remarks)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordSection {
    #[serde(rename = "Label", default)]
    pub label: String,
    #[serde(rename = "Ordinal", default)]
    pub ordinal: Option<u32>,
    #[serde(rename = "PDF", default)]
    pub pdf: Vec<RecordPdfLink>,
    /// Concatenation of all resolved PDF parts, assembled after resolution
    #[serde(rename = "FullText", default)]
    pub full_text: Option<String>,
}

impl RecordSection {
    /// Assemble `full_text` from the resolved text of the PDF parts
    pub fn assemble_full_text(&mut self) {
        let mut text = String::new();
        for link in &self.pdf {
            if let Some(part_text) = &link.text {
                text.push_str(part_text);
            }
        }
        self.full_text = Some(text);
    }
}

/// The set of section links published with one issue
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RecordLinkCollection {
    #[serde(rename = "Digest", default)]
    pub digest: Option<RecordSection>,
    #[serde(rename = "FullRecord", default)]
    pub full_record: Option<RecordSection>,
    #[serde(rename = "House", default)]
    pub house: Option<RecordSection>,
    #[serde(rename = "Senate", default)]
    pub senate: Option<RecordSection>,
    #[serde(rename = "Remarks", default)]
    pub remarks: Option<RecordSection>,
}

impl RecordLinkCollection {
    /// Mutable iterator over the sections that are present
    pub fn sections_mut(&mut self) -> impl Iterator<Item = &mut RecordSection> {
        [
            self.digest.as_mut(),
            self.full_record.as_mut(),
            self.house.as_mut(),
            self.senate.as_mut(),
            self.remarks.as_mut(),
        ]
        .into_iter()
        .flatten()
    }
}

/// One daily Congressional Record issue
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordIssue {
    #[serde(rename = "Congress")]
    pub congress: u32,
    #[serde(rename = "Id")]
    pub id: u64,
    #[serde(rename = "Issue", default)]
    pub issue: String,
    #[serde(rename = "Volume", default)]
    pub volume: String,
    #[serde(rename = "Session", default)]
    pub session: String,
    #[serde(rename = "PublishDate", default)]
    pub publish_date: String,
    #[serde(rename = "Links", default)]
    pub links: RecordLinkCollection,
}

/// One bound Congressional Record issue; same shape as the daily issue but
/// published from the bound listing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoundRecordIssue {
    #[serde(rename = "Congress")]
    pub congress: u32,
    #[serde(rename = "Id")]
    pub id: u64,
    #[serde(rename = "Issue", default)]
    pub issue: String,
    #[serde(rename = "Volume", default)]
    pub volume: String,
    #[serde(rename = "Session", default)]
    pub session: String,
    #[serde(rename = "PublishDate", default)]
    pub publish_date: String,
    #[serde(rename = "Links", default)]
    pub links: RecordLinkCollection,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_issue_decode() {
        let raw = serde_json::json!({
            "Congress": 117,
            "Id": 26958,
            "Issue": "109",
            "Links": {
                "Digest": {
                    "Label": "Daily Digest",
                    "Ordinal": 1,
                    "PDF": [ { "Part": 1, "Url": "https://www.congress.gov/117/crec/2022/06/23/168/109/CREC-2022-06-23-dailydigest.pdf" } ]
                },
                "FullRecord": {
                    "Label": "Entire Issue",
                    "Ordinal": 5,
                    "PDF": [ { "Part": 1, "Url": "https://www.congress.gov/117/crec/2022/06/23/168/109/CREC-2022-06-23.pdf" } ]
                }
            },
            "PublishDate": "2022-06-23",
            "Session": "2",
            "Volume": "168"
        });
        let issue: RecordIssue = serde_json::from_value(raw).unwrap();
        assert_eq!(issue.congress, 117);
        assert_eq!(issue.links.digest.as_ref().unwrap().pdf.len(), 1);
        assert!(issue.links.house.is_none());
    }

    #[test]
    fn test_section_assembly() {
        let mut section = RecordSection {
            label: "Entire Issue".to_string(),
            ordinal: Some(5),
            pdf: vec![
                RecordPdfLink {
                    part: Some(1),
                    url: "https://example.gov/part1.pdf".to_string(),
                    text: Some("first part\n".to_string()),
                },
                RecordPdfLink {
                    part: Some(2),
                    url: "https://example.gov/part2.pdf".to_string(),
                    text: Some("second part".to_string()),
                },
            ],
            full_text: None,
        };
        section.assemble_full_text();
        assert_eq!(section.full_text.as_deref(), Some("first part\nsecond part"));
    }
}

//! # Legislative Record Types
//!
//! ## Purpose
//! Typed data model for everything the ingestion pipeline produces: bill and
//! amendment aggregates, congressional record issues, member/sponsor records,
//! and the document artifacts whose text is resolved lazily.
//!
//! ## Input/Output Specification
//! - **Input**: Raw JSON items from the congress.gov API
//! - **Output**: Typed aggregate records consumed by persistence and UI layers
//! - **Tolerance**: Unknown fields are ignored; most non-identity fields
//!   default when absent
//!
//! ## Architecture
//! - `bills`: bill metadata, nested collections, and the bill/law aggregate
//! - `amendments`: amendment metadata and aggregate
//! - `people`: members, sponsors, and cosponsors
//! - `congressional_records`: daily and bound record issues with PDF parts

pub mod amendments;
pub mod bills;
pub mod congressional_records;
pub mod people;

pub use amendments::{AggregateAmendment, AmendmentMetadata, AmendmentType};
pub use bills::{AggregateBill, BillMetadata, BillType, LatestAction, LegislativeClass};
pub use congressional_records::{
    BoundRecordIssue, RecordIssue, RecordLinkCollection, RecordPdfLink, RecordSection,
};
pub use people::{Cosponsor, Member};

use serde::{Deserialize, Serialize};

/// Chamber of origin for legislative items
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Chamber {
    House,
    Senate,
}

/// Declared format family of a document artifact, deciding the extraction
/// strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactFormat {
    /// HTML-like formats ("Formatted Text", "HTML"); markup is stripped
    Html,
    /// PDF and anything undeclared; parsed with the PDF extractor
    Pdf,
}

/// A linked document whose text is resolved lazily through the tiered
/// retrieval strategy.
///
/// Resolution is idempotent: once `text` is populated it is final, even when
/// empty (a terminal retrieval failure resolves to an empty string and is
/// never retried).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentArtifact {
    /// Artifact URL
    pub url: String,
    /// Declared format label, e.g. "PDF" or "Formatted Text"
    #[serde(rename = "type", default)]
    pub format: String,
    /// Extracted text; `None` until resolved
    #[serde(default)]
    pub text: Option<String>,
}

impl DocumentArtifact {
    /// Build an artifact from a bare URL and format label
    pub fn new(url: impl Into<String>, format: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            format: format.into(),
            text: None,
        }
    }

    /// Which extraction strategy the declared format routes through
    pub fn format_kind(&self) -> ArtifactFormat {
        let label = self.format.to_ascii_lowercase();
        if label.contains("formatted text") || label.contains("html") {
            ArtifactFormat::Html
        } else {
            ArtifactFormat::Pdf
        }
    }

    /// Whether text has been resolved (possibly to an empty string)
    pub fn is_resolved(&self) -> bool {
        self.text.is_some()
    }
}

/// A recorded failure of one sub-resource fan-out call, carried on the owning
/// aggregate record instead of being silently discarded
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubResourceFailure {
    /// Sub-resource name, e.g. "cosponsors"
    pub sub_resource: String,
    /// Human-readable failure reason
    pub reason: String,
}

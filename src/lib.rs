//! A library for normalizing publication, clinical-trial and drug records and
//! linking journals to the drugs mentioned by the articles that reference them.
//!
//! `druglink` loads heterogeneous record sets, canonicalizes their titles and
//! dates, merges duplicate rows, and derives a linkage graph: for every journal,
//! which drugs appear in the titles of its PubMed articles and clinical trials.
//!
//! # Features
//!
//! - `csv` - Enable CSV record sources (enabled by default)
//! - `json` - Enable JSON record sources with broken-JSON recovery (enabled by default)
//! - `cli` - Build the `druglink` command-line binary (enabled by default)
//! - `parallel` - Link journals in parallel with rayon
//! - `diagnostics` - Render source errors with ariadne
//!
//! # Pipeline
//!
//! Load → Clean → Merge → Allocate ids → Tag channel → Build graph → Serialize.
//! Every stage fails fast: a malformed date, a missing column or an unknown
//! channel aborts the whole batch.
//!
//! # Basic Usage
//!
//! ```rust
//! use druglink::{build_graph, Article, Channel, Drug};
//! use chrono::NaiveDate;
//!
//! let articles = vec![Article {
//!     id: "1".into(),
//!     title: "Atropine Saves Lives".to_string(),
//!     journal: "J1".to_string(),
//!     date: NaiveDate::from_ymd_opt(2020, 1, 1).unwrap(),
//!     channel: Channel::Literature,
//! }];
//! let drugs = vec![Drug::new("A03BA", "ATROPINE")];
//!
//! let graph = build_graph(&articles, &drugs).unwrap();
//! let journal = graph.journal("J1").unwrap();
//! assert_eq!(journal.referenced_by.pubmed_articles[0].mentioned_drug_name, "Atropine");
//! assert!(journal.referenced_by.clinical_trials.is_empty());
//! ```
//!
//! # Logging
//!
//! The library never installs a subscriber. Stages emit [`tracing`] events and
//! spans; the caller decides where they go.

use chrono::NaiveDate;
use compact_str::CompactString;

pub mod config;
#[cfg(feature = "csv")]
pub mod csv;
pub mod dedupe;
#[cfg(feature = "diagnostics")]
pub mod diagnostics;
pub mod error;
pub mod graph;
pub mod ids;
#[cfg(feature = "json")]
pub mod json;
pub mod mention;
pub mod normalize;
pub mod output;
pub mod pipeline;
pub mod query;
pub mod source;

// Reexports
pub use config::{IdPolicy, PipelineConfig, SourceConfig};
#[cfg(feature = "csv")]
pub use crate::csv::CsvParser;
pub use dedupe::{dedupe_by_id, merge_duplicates};
#[cfg(feature = "diagnostics")]
pub use diagnostics::parse_with_diagnostics;
pub use error::{
    DateParseError, DruglinkError, InvalidIdDomainError, ParseError, SchemaError, SourceSpan,
    UnknownChannelError, ValueError,
};
pub use graph::{GraphBuilder, GraphConfig, JournalLinkage, LinkageEntry, LinkageGraph, build_graph};
pub use ids::allocate_missing_ids;
#[cfg(feature = "json")]
pub use crate::json::JsonParser;
pub use mention::extract_mentions;
pub use normalize::{normalize_date, normalize_title};
pub use output::{read_graph, write_graph};
pub use pipeline::Pipeline;
pub use query::{DrugKey, co_mentioned_drugs, top_journal_by_distinct_drugs};
pub use source::{RawRecord, RecordSet};

/// Input formats supported by the record sources.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    Csv,
    Json,
}

impl SourceFormat {
    /// Convert the format to a string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceFormat::Csv => "CSV",
            SourceFormat::Json => "JSON",
        }
    }
}

impl std::fmt::Display for SourceFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Publication channel of an article.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Channel {
    /// Academic literature indexed by PubMed.
    Literature,
    /// Clinical-trial registry record.
    ClinicalTrial,
    /// A channel tag that is neither of the above. Rejected by the graph builder.
    Unrecognized(CompactString),
}

impl Channel {
    /// Parse a channel tag such as `"PubMed"` or `"ClinicalTrial"`.
    ///
    /// Matching is case-insensitive and ignores `_`, `-` and spaces. Unknown
    /// tags are preserved as [`Channel::Unrecognized`].
    pub fn from_tag(tag: &str) -> Self {
        let folded: String = tag
            .chars()
            .filter(|c| !matches!(c, '_' | '-' | ' '))
            .flat_map(char::to_lowercase)
            .collect();
        match folded.as_str() {
            "pubmed" | "literature" => Channel::Literature,
            "clinicaltrial" | "clinicaltrials" => Channel::ClinicalTrial,
            _ => Channel::Unrecognized(CompactString::from(tag.trim())),
        }
    }

    /// The canonical tag of this channel.
    pub fn as_tag(&self) -> &str {
        match self {
            Channel::Literature => "PubMed",
            Channel::ClinicalTrial => "ClinicalTrial",
            Channel::Unrecognized(tag) => tag.as_str(),
        }
    }
}

impl std::fmt::Display for Channel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_tag())
    }
}

/// Records carrying an identifier that may still be missing.
pub trait Identified {
    /// The record identifier, if present.
    fn record_id(&self) -> Option<&str>;

    /// Overwrite the record identifier.
    fn assign_id(&mut self, id: CompactString);
}

/// An article after cleaning but before merging: fields other than the merge
/// key may be missing.
#[derive(Debug, Clone, PartialEq)]
pub struct PartialArticle {
    /// Identifier, missing when the source row had none
    pub id: Option<CompactString>,
    /// Canonical title, possibly empty
    pub title: String,
    /// Canonical journal name
    pub journal: Option<String>,
    /// Publication date
    pub date: NaiveDate,
    /// Publication channel
    pub channel: Channel,
}

impl PartialArticle {
    /// Fill every missing field from `other`, keeping values already present.
    pub fn fill_from(&mut self, other: PartialArticle) {
        if self.id.is_none() {
            self.id = other.id;
        }
        if self.journal.is_none() {
            self.journal = other.journal;
        }
    }

    /// Whether the article can appear in the graph: non-empty title and journal.
    pub fn is_linkable(&self) -> bool {
        !self.title.is_empty() && self.journal.as_deref().is_some_and(|j| !j.is_empty())
    }
}

impl Identified for PartialArticle {
    fn record_id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    fn assign_id(&mut self, id: CompactString) {
        self.id = Some(id);
    }
}

/// A fully cleaned article, ready for linkage.
#[derive(Debug, Clone, PartialEq)]
pub struct Article {
    /// Unique identifier
    pub id: CompactString,
    /// Canonical title
    pub title: String,
    /// Canonical journal name
    pub journal: String,
    /// Publication date
    pub date: NaiveDate,
    /// Publication channel
    pub channel: Channel,
}

impl TryFrom<PartialArticle> for Article {
    type Error = SchemaError;

    fn try_from(partial: PartialArticle) -> Result<Self, Self::Error> {
        let id = partial.id.ok_or_else(|| SchemaError::MissingIdentifier {
            record: partial.title.clone(),
        })?;
        let journal = partial.journal.ok_or_else(|| SchemaError::MissingValue {
            field: error::fields::JOURNAL,
            record: partial.title.clone(),
        })?;
        Ok(Self {
            id,
            title: partial.title,
            journal,
            date: partial.date,
            channel: partial.channel,
        })
    }
}

impl Identified for Article {
    fn record_id(&self) -> Option<&str> {
        Some(&self.id)
    }

    fn assign_id(&mut self, id: CompactString) {
        self.id = id;
    }
}

/// An entry of the drug catalog.
#[derive(Debug, Clone, PartialEq)]
pub struct Drug {
    /// Catalog key, e.g. an ATC code
    pub id: CompactString,
    /// Canonical name
    pub name: String,
}

impl Drug {
    /// Create a catalog entry, canonicalizing the name with [`normalize_title`].
    pub fn new(id: impl Into<CompactString>, name: &str) -> Self {
        Self {
            id: id.into(),
            name: normalize_title(name),
        }
    }

    /// The name used for matching against title tokens.
    pub fn folded_name(&self) -> String {
        self.name.to_lowercase()
    }
}

impl Identified for Drug {
    fn record_id(&self) -> Option<&str> {
        Some(&self.id)
    }

    fn assign_id(&mut self, id: CompactString) {
        self.id = id;
    }
}

/// Trait for implementing record parsers.
pub trait RecordParser {
    /// Parse a string containing one or more records.
    ///
    /// # Errors
    ///
    /// Returns `ParseError` if the input is malformed
    fn parse(&self, input: &str) -> Result<RecordSet, ParseError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::*;

    #[rstest]
    #[case("PubMed", Channel::Literature)]
    #[case("pubmed", Channel::Literature)]
    #[case("Literature", Channel::Literature)]
    #[case("ClinicalTrial", Channel::ClinicalTrial)]
    #[case("clinical_trials", Channel::ClinicalTrial)]
    #[case("Clinical Trial", Channel::ClinicalTrial)]
    #[case(" Preprint ", Channel::Unrecognized("Preprint".into()))]
    fn test_channel_from_tag(#[case] tag: &str, #[case] expected: Channel) {
        assert_eq!(Channel::from_tag(tag), expected);
    }

    #[test]
    fn test_channel_display() {
        assert_eq!(Channel::Literature.to_string(), "PubMed");
        assert_eq!(Channel::ClinicalTrial.to_string(), "ClinicalTrial");
    }

    #[test]
    fn test_fill_from_keeps_existing_values() {
        let date = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
        let mut first = PartialArticle {
            id: None,
            title: "A".to_string(),
            journal: Some("J1".to_string()),
            date,
            channel: Channel::Literature,
        };
        first.fill_from(PartialArticle {
            id: Some("7".into()),
            title: "A".to_string(),
            journal: Some("J2".to_string()),
            date,
            channel: Channel::Literature,
        });
        assert_eq!(first.id.as_deref(), Some("7"));
        assert_eq!(first.journal.as_deref(), Some("J1"));
    }

    #[test]
    fn test_article_requires_identifier() {
        let partial = PartialArticle {
            id: None,
            title: "Orphan".to_string(),
            journal: Some("J1".to_string()),
            date: NaiveDate::from_ymd_opt(2020, 1, 1).unwrap(),
            channel: Channel::ClinicalTrial,
        };
        let err = Article::try_from(partial).unwrap_err();
        assert!(matches!(err, SchemaError::MissingIdentifier { .. }));
    }

    #[test]
    fn test_drug_name_is_canonical() {
        let drug = Drug::new("A03BA", "  ATROPINE ");
        assert_eq!(drug.name, "Atropine");
        assert_eq!(drug.folded_name(), "atropine");
    }
}

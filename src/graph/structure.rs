//! Serialized shape of the linkage graph.
//!
//! ```json
//! { "journals": [ { "title": "...", "referencedBy": {
//!     "pubmedArticles": [ { "articleId": "...", "articleTitle": "...",
//!                           "mentionDate": "YYYY-MM-DD",
//!                           "mentionedDrugID": "...", "mentionedDrugName": "..." } ],
//!     "clinicalTrials": [ ... ] } } ] }
//! ```

use crate::{Article, Channel, Drug};
use chrono::NaiveDate;
use compact_str::CompactString;
use serde::{Deserialize, Serialize};

/// The journal-keyed drug mention graph produced by one run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LinkageGraph {
    /// Journals in order of first appearance among the input articles
    pub journals: Vec<JournalLinkage>,
}

impl LinkageGraph {
    /// Wrap already-built journal linkages.
    pub fn new(journals: Vec<JournalLinkage>) -> Self {
        Self { journals }
    }

    /// Look up a journal by its canonical title.
    pub fn journal(&self, title: &str) -> Option<&JournalLinkage> {
        self.journals.iter().find(|j| j.title == title)
    }

    /// Total number of linkage entries across journals and channels.
    pub fn mention_count(&self) -> usize {
        self.journals
            .iter()
            .map(|j| j.referenced_by.pubmed_articles.len() + j.referenced_by.clinical_trials.len())
            .sum()
    }
}

/// Mentions referencing one journal, split by channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JournalLinkage {
    /// Canonical journal name
    pub title: String,
    /// Articles referencing the journal
    pub referenced_by: ReferencedBy,
}

impl JournalLinkage {
    /// An empty linkage for `title`.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            referenced_by: ReferencedBy::default(),
        }
    }

    /// Returns the linkage extended with `entry` in the list of `channel`.
    ///
    /// Returns `None` for [`Channel::Unrecognized`].
    pub(crate) fn with_entry(mut self, channel: &Channel, entry: LinkageEntry) -> Option<Self> {
        match channel {
            Channel::Literature => self.referenced_by.pubmed_articles.push(entry),
            Channel::ClinicalTrial => self.referenced_by.clinical_trials.push(entry),
            Channel::Unrecognized(_) => return None,
        }
        Some(self)
    }
}

/// Literature and clinical-trial mentions of a journal.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReferencedBy {
    pub pubmed_articles: Vec<LinkageEntry>,
    pub clinical_trials: Vec<LinkageEntry>,
}

/// One (article, drug) mention.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkageEntry {
    pub article_id: CompactString,
    pub article_title: String,
    /// Serialized as `YYYY-MM-DD`
    pub mention_date: NaiveDate,
    #[serde(rename = "mentionedDrugID")]
    pub mentioned_drug_id: CompactString,
    pub mentioned_drug_name: String,
}

impl LinkageEntry {
    pub fn new(article: &Article, drug: &Drug) -> Self {
        Self {
            article_id: article.id.clone(),
            article_title: article.title.clone(),
            mention_date: article.date,
            mentioned_drug_id: drug.id.clone(),
            mentioned_drug_name: drug.name.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sample_graph() -> LinkageGraph {
        let entry = LinkageEntry {
            article_id: "1".into(),
            article_title: "Atropine Saves Lives".to_string(),
            mention_date: NaiveDate::from_ymd_opt(2020, 1, 1).unwrap(),
            mentioned_drug_id: "A03BA".into(),
            mentioned_drug_name: "Atropine".to_string(),
        };
        let mut trial = entry.clone();
        trial.article_id = "NCT01".into();
        LinkageGraph::new(vec![
            JournalLinkage {
                title: "J1".to_string(),
                referenced_by: ReferencedBy {
                    pubmed_articles: vec![entry],
                    clinical_trials: vec![trial],
                },
            },
            JournalLinkage::new("J2"),
        ])
    }

    #[test]
    fn test_serialized_field_names() {
        let value = serde_json::to_value(sample_graph()).unwrap();
        let entry = &value["journals"][0]["referencedBy"]["pubmedArticles"][0];
        assert_eq!(entry["articleId"], "1");
        assert_eq!(entry["articleTitle"], "Atropine Saves Lives");
        assert_eq!(entry["mentionDate"], "2020-01-01");
        assert_eq!(entry["mentionedDrugID"], "A03BA");
        assert_eq!(entry["mentionedDrugName"], "Atropine");
        assert_eq!(value["journals"][1]["referencedBy"]["clinicalTrials"], serde_json::json!([]));
    }

    #[test]
    fn test_round_trip_preserves_structure() {
        let graph = sample_graph();
        let text = serde_json::to_string(&graph).unwrap();
        let parsed: LinkageGraph = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed, graph);
    }

    #[test]
    fn test_lookup_and_count() {
        let graph = sample_graph();
        assert!(graph.journal("J2").is_some());
        assert!(graph.journal("J3").is_none());
        assert_eq!(graph.mention_count(), 2);
    }

    #[test]
    fn test_unrecognized_channel_rejects_entry() {
        let entry = sample_graph().journals[0].referenced_by.pubmed_articles[0].clone();
        let linkage = JournalLinkage::new("J");
        assert!(linkage.with_entry(&Channel::Unrecognized("Preprint".into()), entry).is_none());
    }
}

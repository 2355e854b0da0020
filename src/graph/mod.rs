//! Journal linkage graph construction.
//!
//! Articles are grouped by their canonical journal name; for each journal the
//! titles of its articles are scanned for drug mentions and every mention
//! becomes a [`LinkageEntry`] in the literature or clinical-trial list.
//!
//! # Example
//!
//! ```
//! use druglink::{Article, Channel, Drug, GraphBuilder, GraphConfig};
//! use chrono::NaiveDate;
//!
//! let date = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
//! let articles = vec![
//!     Article {
//!         id: "1".into(),
//!         title: "Atropine Saves Lives".to_string(),
//!         journal: "J1".to_string(),
//!         date,
//!         channel: Channel::Literature,
//!     },
//!     Article {
//!         id: "NCT01".into(),
//!         title: "Atropine In Trauma".to_string(),
//!         journal: "J2".to_string(),
//!         date,
//!         channel: Channel::ClinicalTrial,
//!     },
//! ];
//! let drugs = vec![Drug::new("A03BA", "ATROPINE")];
//!
//! let graph = GraphBuilder::new()
//!     .with_config(GraphConfig { run_in_parallel: false })
//!     .build(&articles, &drugs)
//!     .unwrap();
//! assert_eq!(graph.journals.len(), 2);
//! assert_eq!(graph.journal("J2").unwrap().referenced_by.clinical_trials.len(), 1);
//! ```

mod structure;

pub use structure::{JournalLinkage, LinkageEntry, LinkageGraph, ReferencedBy};

use crate::error::UnknownChannelError;
use crate::mention::extract_mentions;
use crate::{Article, Channel, Drug};
use std::collections::HashMap;
use tracing::{debug, info_span};

/// Options for [`GraphBuilder`].
#[derive(Debug, Default, Clone)]
pub struct GraphConfig {
    /// Link journals on the rayon thread pool. Only honored when the crate is
    /// built with the `parallel` feature; the output is identical either way.
    pub run_in_parallel: bool,
}

/// Builds a [`LinkageGraph`] from cleaned articles and the drug catalog.
#[derive(Debug, Default, Clone)]
pub struct GraphBuilder {
    config: GraphConfig,
}

impl GraphBuilder {
    /// Creates a sequential builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the builder configuration.
    #[must_use]
    pub fn with_config(mut self, config: GraphConfig) -> Self {
        self.config = config;
        self
    }

    /// Links every journal referenced by `articles` to the drugs mentioned in
    /// the titles of those articles.
    ///
    /// Journals appear in order of first appearance; within a journal, entries
    /// follow article order, then catalog order. A journal whose articles
    /// mention no drug is still present, with empty lists.
    ///
    /// # Errors
    ///
    /// Returns [`UnknownChannelError`] for the first article whose channel is
    /// [`Channel::Unrecognized`]. Nothing is built in that case.
    pub fn build(
        &self,
        articles: &[Article],
        drugs: &[Drug],
    ) -> Result<LinkageGraph, UnknownChannelError> {
        let _span = info_span!("build_graph", articles = articles.len(), drugs = drugs.len()).entered();

        articles.iter().try_for_each(check_channel)?;
        let groups = group_by_journal(articles);

        let journals = if self.config.run_in_parallel {
            link_parallel(&groups, drugs)?
        } else {
            groups
                .iter()
                .map(|(journal, articles)| link_journal(journal, articles, drugs))
                .collect::<Result<Vec<_>, _>>()?
        };

        let graph = LinkageGraph::new(journals);
        debug!(
            journals = graph.journals.len(),
            mentions = graph.mention_count(),
            "Built linkage graph"
        );
        Ok(graph)
    }
}

/// Builds the linkage graph with the default sequential configuration.
///
/// See [`GraphBuilder::build`].
pub fn build_graph(
    articles: &[Article],
    drugs: &[Drug],
) -> Result<LinkageGraph, UnknownChannelError> {
    GraphBuilder::new().build(articles, drugs)
}

#[cfg(feature = "parallel")]
fn link_parallel(
    groups: &[(&str, Vec<&Article>)],
    drugs: &[Drug],
) -> Result<Vec<JournalLinkage>, UnknownChannelError> {
    use rayon::prelude::*;

    groups
        .par_iter()
        .map(|(journal, articles)| link_journal(journal, articles, drugs))
        .collect()
}

#[cfg(not(feature = "parallel"))]
fn link_parallel(
    groups: &[(&str, Vec<&Article>)],
    drugs: &[Drug],
) -> Result<Vec<JournalLinkage>, UnknownChannelError> {
    groups
        .iter()
        .map(|(journal, articles)| link_journal(journal, articles, drugs))
        .collect()
}

fn check_channel(article: &Article) -> Result<(), UnknownChannelError> {
    match &article.channel {
        Channel::Unrecognized(tag) => Err(unknown_channel(article, tag)),
        Channel::Literature | Channel::ClinicalTrial => Ok(()),
    }
}

fn unknown_channel(article: &Article, tag: &str) -> UnknownChannelError {
    UnknownChannelError {
        article_id: article.id.to_string(),
        title: article.title.clone(),
        tag: tag.to_string(),
    }
}

/// Groups articles by exact journal name, keeping first-appearance order.
fn group_by_journal(articles: &[Article]) -> Vec<(&str, Vec<&Article>)> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut groups: Vec<(&str, Vec<&Article>)> = Vec::new();

    for article in articles {
        let journal = article.journal.as_str();
        match index.get(journal) {
            Some(&slot) => groups[slot].1.push(article),
            None => {
                index.insert(journal, groups.len());
                groups.push((journal, vec![article]));
            }
        }
    }
    groups
}

/// Folds the articles of one journal into its linkage record.
fn link_journal(
    journal: &str,
    articles: &[&Article],
    drugs: &[Drug],
) -> Result<JournalLinkage, UnknownChannelError> {
    articles
        .iter()
        .try_fold(JournalLinkage::new(journal), |linkage, article| {
            extract_mentions(&article.title, drugs)
                .into_iter()
                .try_fold(linkage, |linkage, drug| {
                    linkage
                        .with_entry(&article.channel, LinkageEntry::new(article, drug))
                        .ok_or_else(|| unknown_channel(article, article.channel.as_tag()))
                })
        })
}

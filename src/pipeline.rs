//! The batch driver: Load → Clean → Merge → Allocate ids → Combine → Build graph.
//!
//! Every stage fails fast. No partial graph is ever returned or written.

use crate::config::{IdPolicy, PipelineConfig, SourceConfig};
use crate::dedupe::{dedupe_by_id, merge_duplicates};
use crate::error::DruglinkError;
use crate::graph::{GraphBuilder, LinkageGraph};
use crate::ids::allocate_missing_ids;
use crate::output::write_graph;
use crate::source::{ARTICLE_COLUMNS, DRUG_COLUMNS, RawRecord, load_all};
use crate::{Article, Drug, PartialArticle};
use tracing::{debug, info, info_span};

/// Runs a configured linkage job.
///
/// # Examples
///
/// ```no_run
/// use druglink::{Pipeline, PipelineConfig};
///
/// let mut config = PipelineConfig::new();
/// config
///     .add_pubmed(["data/pubmed.csv", "data/pubmed.json"])
///     .add_clinical_trials(["data/clinical_trials.csv"])
///     .set_drugs(["data/drugs.csv"])
///     .set_output("output/graph.json");
///
/// let graph = Pipeline::new(config).run_and_write()?;
/// println!("{} journals linked", graph.journals.len());
/// # Ok::<(), druglink::DruglinkError>(())
/// ```
#[derive(Debug, Clone)]
pub struct Pipeline {
    config: PipelineConfig,
}

impl Pipeline {
    #[must_use]
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Loads and cleans every source and builds the linkage graph.
    ///
    /// # Errors
    ///
    /// Returns the first error of any stage: invalid configuration, unreadable
    /// or malformed file, missing column, unparseable date, missing identifier
    /// or unknown channel.
    pub fn run(&self) -> Result<LinkageGraph, DruglinkError> {
        self.config.validate().map_err(DruglinkError::Config)?;
        let _span = info_span!("pipeline").entered();

        let drugs = load_drugs(&self.config)?;

        let mut articles = Vec::new();
        for source in self.config.sources() {
            articles.extend(load_source(source)?);
        }
        let articles = dedupe_by_id(articles);
        info!(articles = articles.len(), drugs = drugs.len(), "Cleaned all sources");

        let graph = GraphBuilder::new()
            .with_config(self.config.graph().clone())
            .build(&articles, &drugs)?;
        info!(
            journals = graph.journals.len(),
            mentions = graph.mention_count(),
            "Built linkage graph"
        );
        Ok(graph)
    }

    /// Runs the job and writes the graph to the configured output, if any.
    ///
    /// # Errors
    ///
    /// See [`Pipeline::run`]; additionally fails when the output cannot be
    /// written.
    pub fn run_and_write(&self) -> Result<LinkageGraph, DruglinkError> {
        let graph = self.run()?;
        if let Some(path) = self.config.output() {
            write_graph(&graph, path)?;
        }
        Ok(graph)
    }
}

fn load_drugs(config: &PipelineConfig) -> Result<Vec<Drug>, DruglinkError> {
    let _span = info_span!("drugs").entered();
    let drugs = load_all(config.drugs(), DRUG_COLUMNS, RawRecord::into_drug)?;
    Ok(clean_drugs(drugs))
}

fn load_source(source: &SourceConfig) -> Result<Vec<Article>, DruglinkError> {
    let _span = info_span!("source", channel = %source.channel).entered();
    let partials = load_all(&source.paths, ARTICLE_COLUMNS, |record| {
        record.into_partial_article(&source.channel)
    })?;
    clean_articles(partials, source.id_policy)
}

/// Merges duplicates, drops rows without title or journal, then completes
/// identifiers according to `id_policy`.
///
/// # Errors
///
/// [`DruglinkError::InvalidIdDomain`] when identifiers cannot be allocated and
/// [`DruglinkError::Schema`] when a row still lacks an identifier under
/// [`IdPolicy::Require`].
pub fn clean_articles(
    partials: Vec<PartialArticle>,
    id_policy: IdPolicy,
) -> Result<Vec<Article>, DruglinkError> {
    let loaded = partials.len();
    let merged = merge_duplicates(partials);

    let linkable: Vec<PartialArticle> = merged.into_iter().filter(PartialArticle::is_linkable).collect();
    debug!(
        loaded,
        kept = linkable.len(),
        "Dropped merged rows without title or journal"
    );

    let identified = match id_policy {
        IdPolicy::AllocateNumeric => allocate_missing_ids(linkable)?,
        IdPolicy::Require => linkable,
    };

    let articles = identified
        .into_iter()
        .map(Article::try_from)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(articles)
}

/// Removes catalog entries duplicated by identifier, keeping the first.
pub fn clean_drugs(drugs: Vec<Drug>) -> Vec<Drug> {
    let drugs = dedupe_by_id(drugs);
    let unnamed = drugs.iter().filter(|drug| drug.name.is_empty()).count();
    if unnamed > 0 {
        debug!(unnamed, "Catalog entries without a name will never match");
    }
    drugs
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Channel;
    use crate::error::SchemaError;
    use chrono::NaiveDate;
    use compact_str::CompactString;
    use pretty_assertions::assert_eq;

    fn partial(id: Option<&str>, title: &str, journal: Option<&str>, channel: Channel) -> PartialArticle {
        PartialArticle {
            id: id.map(CompactString::from),
            title: title.to_string(),
            journal: journal.map(String::from),
            date: NaiveDate::from_ymd_opt(2020, 1, 1).unwrap(),
            channel,
        }
    }

    #[test]
    fn test_clean_articles_merges_drops_and_allocates() {
        let articles = clean_articles(
            vec![
                partial(Some("3"), "Atropine Saves Lives", Some("J1"), Channel::Literature),
                partial(None, "", Some("J1"), Channel::Literature),
                partial(None, "Ethanol Study", None, Channel::Literature),
                partial(None, "Ethanol Study", Some("J2"), Channel::Literature),
                partial(None, "No Journal", None, Channel::Literature),
            ],
            IdPolicy::AllocateNumeric,
        )
        .unwrap();

        let summary: Vec<(&str, &str, &str)> = articles
            .iter()
            .map(|a| (a.id.as_str(), a.title.as_str(), a.journal.as_str()))
            .collect();
        assert_eq!(
            summary,
            vec![("3", "Atropine Saves Lives", "J1"), ("4", "Ethanol Study", "J2")]
        );
    }

    #[test]
    fn test_require_policy_rejects_missing_id() {
        let err = clean_articles(
            vec![
                partial(Some("NCT01"), "Trial", Some("J1"), Channel::ClinicalTrial),
                partial(None, "Orphan Trial", Some("J1"), Channel::ClinicalTrial),
            ],
            IdPolicy::Require,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            DruglinkError::Schema(SchemaError::MissingIdentifier { ref record }) if record == "Orphan Trial"
        ));
    }

    #[test]
    fn test_require_policy_keeps_text_ids() {
        let articles = clean_articles(
            vec![
                partial(Some("NCT01"), "Trial", None, Channel::ClinicalTrial),
                partial(None, "Trial", Some("J1"), Channel::ClinicalTrial),
            ],
            IdPolicy::Require,
        )
        .unwrap();
        assert_eq!(articles.len(), 1);
        assert_eq!(articles[0].id, "NCT01");
        assert_eq!(articles[0].journal, "J1");
    }

    #[test]
    fn test_allocation_without_numeric_id_fails() {
        let err = clean_articles(
            vec![
                partial(Some("abc"), "A", Some("J"), Channel::Literature),
                partial(None, "B", Some("J"), Channel::Literature),
            ],
            IdPolicy::AllocateNumeric,
        )
        .unwrap_err();
        assert!(matches!(err, DruglinkError::InvalidIdDomain(_)));
    }

    #[test]
    fn test_clean_drugs_dedupes_by_id() {
        let drugs = clean_drugs(vec![
            Drug::new("A04AD", "DIPHENHYDRAMINE"),
            Drug::new("A04AD", "DIPHENHYDRAMINE"),
            Drug::new("6302001", "ISOPRENALINE"),
        ]);
        assert_eq!(drugs.len(), 2);
    }

    #[test]
    fn test_invalid_config_is_reported() {
        let err = Pipeline::new(PipelineConfig::new()).run().unwrap_err();
        assert!(matches!(err, DruglinkError::Config(_)));
    }
}

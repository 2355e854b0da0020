//! Run configuration.
//!
//! A run reads one or more article sources (each tagged with a channel and an
//! identifier policy) and one drug catalog, and optionally writes the graph to
//! an output file.
//!
//! ```
//! use druglink::PipelineConfig;
//!
//! let mut config = PipelineConfig::new();
//! config
//!     .add_pubmed(["data/pubmed.csv", "data/pubmed.json"])
//!     .add_clinical_trials(["data/clinical_trials.csv"])
//!     .set_drugs(["data/drugs.csv"])
//!     .set_output("output/graph.json");
//! assert!(config.validate().is_ok());
//! ```

use crate::Channel;
use crate::graph::GraphConfig;
use std::path::PathBuf;

/// What to do with article rows that have no identifier after merging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IdPolicy {
    /// Number them after the largest numeric identifier of the source.
    #[default]
    AllocateNumeric,
    /// Fail with a schema error.
    Require,
}

/// One article source: its files, channel and identifier policy.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceConfig {
    /// Files concatenated in order before cleaning
    pub paths: Vec<PathBuf>,
    /// Channel assigned to rows without a channel column
    pub channel: Channel,
    pub id_policy: IdPolicy,
}

impl SourceConfig {
    /// A literature source whose missing identifiers are allocated.
    pub fn pubmed<I, P>(paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Self {
            paths: paths.into_iter().map(Into::into).collect(),
            channel: Channel::Literature,
            id_policy: IdPolicy::AllocateNumeric,
        }
    }

    /// A clinical-trial source whose rows must carry an identifier.
    pub fn clinical_trials<I, P>(paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Self {
            paths: paths.into_iter().map(Into::into).collect(),
            channel: Channel::ClinicalTrial,
            id_policy: IdPolicy::Require,
        }
    }

    #[must_use]
    pub fn with_id_policy(mut self, id_policy: IdPolicy) -> Self {
        self.id_policy = id_policy;
        self
    }
}

/// Configuration of a pipeline run.
#[derive(Debug, Clone, Default)]
pub struct PipelineConfig {
    /// Article sources, combined in this order
    pub(crate) sources: Vec<SourceConfig>,
    /// Drug catalog files
    pub(crate) drugs: Vec<PathBuf>,
    /// Where to write the graph, if anywhere
    pub(crate) output: Option<PathBuf>,
    pub(crate) graph: GraphConfig,
}

impl PipelineConfig {
    /// Creates an empty configuration
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an article source
    pub fn add_source(&mut self, source: SourceConfig) -> &mut Self {
        self.sources.push(source);
        self
    }

    /// Adds a literature source
    pub fn add_pubmed<I, P>(&mut self, paths: I) -> &mut Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        self.add_source(SourceConfig::pubmed(paths))
    }

    /// Adds a clinical-trial source
    pub fn add_clinical_trials<I, P>(&mut self, paths: I) -> &mut Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        self.add_source(SourceConfig::clinical_trials(paths))
    }

    /// Sets the drug catalog files
    pub fn set_drugs<I, P>(&mut self, paths: I) -> &mut Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        self.drugs = paths.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the output file
    pub fn set_output(&mut self, path: impl Into<PathBuf>) -> &mut Self {
        self.output = Some(path.into());
        self
    }

    /// Links journals in parallel (requires the `parallel` feature)
    pub fn set_parallel(&mut self, run_in_parallel: bool) -> &mut Self {
        self.graph.run_in_parallel = run_in_parallel;
        self
    }

    pub fn sources(&self) -> &[SourceConfig] {
        &self.sources
    }

    pub fn drugs(&self) -> &[PathBuf] {
        &self.drugs
    }

    pub fn output(&self) -> Option<&PathBuf> {
        self.output.as_ref()
    }

    pub fn graph(&self) -> &GraphConfig {
        &self.graph
    }

    /// Validates the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.sources.is_empty() {
            return Err("No article source configured".to_string());
        }
        for source in &self.sources {
            if source.paths.is_empty() {
                return Err(format!("The {} source has no input file", source.channel));
            }
            if let Channel::Unrecognized(tag) = &source.channel {
                return Err(format!("Unknown channel '{}' for an article source", tag));
            }
        }
        if self.drugs.is_empty() {
            return Err("No drug catalog file configured".to_string());
        }

        let all_paths = self.sources.iter().flat_map(|s| &s.paths).chain(&self.drugs);
        for path in all_paths {
            if path.as_os_str().is_empty() {
                return Err("Empty input path".to_string());
            }
        }
        if self.output.as_ref().is_some_and(|p| p.as_os_str().is_empty()) {
            return Err("Empty output path".to_string());
        }
        if self.graph.run_in_parallel && !cfg!(feature = "parallel") {
            tracing::warn!("Parallel linking requested but the `parallel` feature is disabled");
        }

        Ok(())
    }
}

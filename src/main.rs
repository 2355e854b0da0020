use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use druglink::output::read_document;
use druglink::query::{co_mentioned_drugs, top_journal_by_distinct_drugs};
use druglink::{Pipeline, PipelineConfig, SchemaError, normalize_title};
use serde_json::Value;
use std::collections::BTreeSet;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::error;
use tracing_subscriber::EnvFilter;

/// Link journals to the drugs mentioned by their articles and clinical trials.
#[derive(Debug, Parser)]
#[command(name = "druglink", version, about)]
struct Cli {
    /// Log filter (e.g. "info" or "druglink=debug"); falls back to RUST_LOG
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Build the linkage graph from the source files
    Build {
        /// PubMed article files (CSV or JSON)
        #[arg(long, num_args = 1.., required = true, env = "DRUGLINK_PUBMED", value_delimiter = ',')]
        pubmed: Vec<PathBuf>,

        /// Clinical-trial files (CSV or JSON)
        #[arg(long, num_args = 1.., required = true, env = "DRUGLINK_CLINICAL_TRIALS", value_delimiter = ',')]
        clinical_trials: Vec<PathBuf>,

        /// Drug catalog files (CSV or JSON)
        #[arg(long, num_args = 1.., required = true, env = "DRUGLINK_DRUGS", value_delimiter = ',')]
        drugs: Vec<PathBuf>,

        /// Where to write the graph
        #[arg(long, env = "DRUGLINK_OUTPUT")]
        output: PathBuf,

        /// Link journals in parallel
        #[arg(long)]
        parallel: bool,
    },

    /// Run an ad hoc query against a written graph
    Query {
        #[command(subcommand)]
        query: Query,
    },
}

#[derive(Debug, Subcommand)]
enum Query {
    /// Journal(s) mentioning the most distinct drugs
    TopJournal {
        /// Graph file written by `druglink build`
        #[arg(long, env = "DRUGLINK_OUTPUT")]
        graph: PathBuf,
    },

    /// Drugs mentioned by the same journals as a given drug
    CoMentions {
        /// Graph file written by `druglink build`
        #[arg(long, env = "DRUGLINK_OUTPUT")]
        graph: PathBuf,

        /// Drug name in any casing, e.g. "TETRACYCLINE"
        #[arg(long)]
        drug: String,

        /// Also consider journals referenced by clinical trials
        #[arg(long)]
        include_clinical_trials: bool,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = match &cli.log_level {
        Some(level) => EnvFilter::new(level),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    };
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();

    match run(cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{:#}", err);
            if let Some(report) = render_source_error(&err) {
                eprintln!("{}", report);
            }
            ExitCode::FAILURE
        }
    }
}

fn run(command: Command) -> Result<()> {
    match command {
        Command::Build {
            pubmed,
            clinical_trials,
            drugs,
            output,
            parallel,
        } => {
            let mut config = PipelineConfig::new();
            config
                .add_pubmed(pubmed)
                .add_clinical_trials(clinical_trials)
                .set_drugs(drugs)
                .set_output(&output)
                .set_parallel(parallel);

            let graph = Pipeline::new(config).run_and_write()?;
            println!(
                "Linked {} journals ({} mentions) into {}",
                graph.journals.len(),
                graph.mention_count(),
                output.display()
            );
        }
        Command::Query { query } => match query {
            Query::TopJournal { graph } => {
                let document = read_document(&graph)?;
                let titles = top_journal_by_distinct_drugs(&document)
                    .with_context(|| format!("Malformed graph {}", graph.display()))?;
                for title in titles {
                    println!("{}", title);
                }
            }
            Query::CoMentions {
                graph,
                drug,
                include_clinical_trials,
            } => {
                let document = read_document(&graph)?;
                let drugs = co_mentions(&document, &drug, include_clinical_trials)
                    .with_context(|| format!("Malformed graph {}", graph.display()))?;
                for name in drugs {
                    println!("{}", name);
                }
            }
        },
    }
    Ok(())
}

/// Co-mentioned drugs for a name given on the command line, which is
/// canonicalized like catalog names before matching.
fn co_mentions(
    document: &Value,
    drug: &str,
    include_clinical_trials: bool,
) -> Result<BTreeSet<String>, SchemaError> {
    co_mentioned_drugs(document, &normalize_title(drug), !include_clinical_trials)
}

/// Re-reads the offending file to show the failing record in context.
#[cfg(feature = "diagnostics")]
fn render_source_error(err: &anyhow::Error) -> Option<String> {
    use druglink::DruglinkError;

    match err.downcast_ref::<DruglinkError>()? {
        DruglinkError::Source { path, source } => {
            let text = std::fs::read_to_string(path).ok()?;
            Some(source.to_diagnostic(&path.display().to_string(), &text))
        }
        _ => None,
    }
}

#[cfg(not(feature = "diagnostics"))]
fn render_source_error(_err: &anyhow::Error) -> Option<String> {
    None
}

//! Ad hoc queries over a written linkage graph.
//!
//! The queries read the output document as untyped JSON, so they accept graphs
//! written by other tools as long as each journal has the `referencedBy`,
//! `pubmedArticles` and `clinicalTrials` keys. Entries may lack any key other
//! than the drug key being collected; a missing drug key or journal title is
//! a [`SchemaError::MissingKey`].

use crate::error::SchemaError;
use itertools::Itertools;
use serde_json::Value;
use std::collections::BTreeSet;
use tracing::info;

/// Which drug attribute to collect from linkage entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrugKey {
    Id,
    Name,
}

impl DrugKey {
    fn as_key(self) -> &'static str {
        match self {
            DrugKey::Id => "mentionedDrugID",
            DrugKey::Name => "mentionedDrugName",
        }
    }
}

/// The journals of an output document.
///
/// # Errors
///
/// [`SchemaError::MissingKey`] when `journals` is absent or not an array.
pub fn journals(document: &Value) -> Result<&[Value], SchemaError> {
    document
        .get("journals")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .ok_or_else(|| SchemaError::MissingKey {
            key: "journals",
            context: "graph document".to_string(),
        })
}

/// The PubMed and clinical-trial entries referencing `journal`.
///
/// # Errors
///
/// [`SchemaError::MissingKey`] naming the first of `referencedBy`,
/// `pubmedArticles` or `clinicalTrials` that is absent (or not of the
/// expected type).
pub fn journal_references(journal: &Value) -> Result<(&[Value], &[Value]), SchemaError> {
    let missing = |key: &'static str| SchemaError::MissingKey {
        key,
        context: describe(journal),
    };

    let referenced_by = journal.get("referencedBy").filter(|v| v.is_object()).ok_or_else(|| missing("referencedBy"))?;
    let list = |key: &'static str| {
        referenced_by
            .get(key)
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .ok_or_else(|| missing(key))
    };
    Ok((list("pubmedArticles")?, list("clinicalTrials")?))
}

/// Distinct drugs mentioned by the entries of one journal.
///
/// # Errors
///
/// [`SchemaError::MissingKey`] for the first entry without the drug key.
pub fn drugs_mentioned_by_journal(
    pubmed: &[Value],
    trials: &[Value],
    key: DrugKey,
) -> Result<BTreeSet<String>, SchemaError> {
    pubmed
        .iter()
        .chain(trials)
        .enumerate()
        .map(|(i, entry)| {
            entry
                .get(key.as_key())
                .and_then(Value::as_str)
                .map(String::from)
                .ok_or_else(|| SchemaError::MissingKey {
                    key: key.as_key(),
                    context: format!("entry {} {}", i + 1, entry),
                })
        })
        .collect()
}

/// Titles of the journal(s) mentioning the most distinct drugs, in document
/// order. Empty for a document without journals.
///
/// # Errors
///
/// [`SchemaError::MissingKey`] for a malformed document, journal or entry.
pub fn top_journal_by_distinct_drugs(document: &Value) -> Result<Vec<String>, SchemaError> {
    let counts = journals(document)?
        .iter()
        .map(|journal| {
            let title = journal_title(journal)?;
            let (pubmed, trials) = journal_references(journal)?;
            let count = drugs_mentioned_by_journal(pubmed, trials, DrugKey::Id)?.len();
            Ok((title, count))
        })
        .collect::<Result<Vec<_>, SchemaError>>()?;

    let top = counts.into_iter().max_set_by_key(|(_, count)| *count);
    let best = top.first().map_or(0, |(_, count)| *count);
    let titles: Vec<String> = top.into_iter().map(|(title, _)| title).collect();

    info!(journals = ?titles, distinct_drugs = best, "Top journal by distinct drug mentions");
    Ok(titles)
}

/// Drug names mentioned by the journals that also mention `drug_name`.
///
/// The queried drug itself is part of the result whenever any journal
/// mentions it. With `skip_clinical_trials`, journals that have at least one
/// clinical-trial reference are ignored.
///
/// # Errors
///
/// [`SchemaError::MissingKey`] for a malformed document, journal or entry.
pub fn co_mentioned_drugs(
    document: &Value,
    drug_name: &str,
    skip_clinical_trials: bool,
) -> Result<BTreeSet<String>, SchemaError> {
    let mut drugs = BTreeSet::new();
    let mut matching_journals = Vec::new();

    for journal in journals(document)? {
        let title = journal_title(journal)?;
        let (pubmed, trials) = journal_references(journal)?;
        if skip_clinical_trials && !trials.is_empty() {
            continue;
        }

        let mentioned = drugs_mentioned_by_journal(pubmed, trials, DrugKey::Name)?;
        if mentioned.contains(drug_name) {
            drugs.extend(mentioned);
            matching_journals.push(title);
        }
    }

    info!(
        drug = drug_name,
        co_mentioned = ?drugs,
        journals = ?matching_journals,
        "Collected co-mentioned drugs"
    );
    Ok(drugs)
}

fn journal_title(journal: &Value) -> Result<String, SchemaError> {
    journal
        .get("title")
        .and_then(Value::as_str)
        .map(String::from)
        .ok_or_else(|| SchemaError::MissingKey {
            key: "title",
            context: describe(journal),
        })
}

fn describe(journal: &Value) -> String {
    match journal.get("title").and_then(Value::as_str) {
        Some(title) => format!("journal \"{}\"", title),
        None => format!("journal {}", journal),
    }
}

#![cfg(all(feature = "csv", feature = "json"))]

use druglink::output::{read_document, read_graph};
use druglink::query::{co_mentioned_drugs, top_journal_by_distinct_drugs};
use druglink::{DruglinkError, Pipeline, PipelineConfig, SchemaError};
use pretty_assertions::assert_eq;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

const PUBMED_CSV: &str = "\
id,title,date,journal
1,\"A 44-year-old man with erythema of the face diphenhydramine, neck, and chest, weakness, and palpitations\",01/01/2019,Journal of emergency nursing
2,An evaluation of benadryl and other remedies,01/01/2019,Journal of emergency nursing
3,Atropine saves lives,1 January 2020,J1
,,01/01/2020,J1
";

// Trailing commas, as found in real exports
const PUBMED_JSON: &str = r#"[
  {
    "id": 9,
    "title": "Gold nanoparticles alleviate isoprenaline hydrochloride induced myocardial infarction in rats.",
    "date": "01/01/2020",
    "journal": "Journal of photochemistry and photobiology. B, Biology"
  },
  {
    "id": "",
    "title": "Tetracycline and ethanol helps symptoms of ciguatera fish poisoning",
    "date": "2020-01-01",
    "journal": "Journal of food protection",
  },
]"#;

const CLINICAL_TRIALS_CSV: &str = "\
id,scientific_title,date,journal
NCT01,Tetracycline in emergency rooms,1 January 2020,Journal of emergency nursing
NCT02,Diphenhydramine sleep study,27 April 2020,
,Diphenhydramine sleep study,27 April 2020,Journal of food protection
NCT03,No drug here,1 January 2020,J1
";

const DRUGS_CSV: &str = "\
atccode,drug
A04AD,DIPHENHYDRAMINE
S03AA,TETRACYCLINE
V03AB,ETHANOL
A03BA,ATROPINE
6302001,ISOPRENALINE
";

struct Fixture {
    dir: TempDir,
}

impl Fixture {
    fn new() -> Self {
        let fixture = Self {
            dir: tempfile::tempdir().unwrap(),
        };
        fixture.write("pubmed.csv", PUBMED_CSV);
        fixture.write("pubmed.json", PUBMED_JSON);
        fixture.write("clinical_trials.csv", CLINICAL_TRIALS_CSV);
        fixture.write("drugs.csv", DRUGS_CSV);
        fixture
    }

    fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    fn write(&self, name: &str, content: &str) -> PathBuf {
        let path = self.path(name);
        fs::write(&path, content).unwrap();
        path
    }

    fn config(&self) -> PipelineConfig {
        let mut config = PipelineConfig::new();
        config
            .add_pubmed([self.path("pubmed.csv"), self.path("pubmed.json")])
            .add_clinical_trials([self.path("clinical_trials.csv")])
            .set_drugs([self.path("drugs.csv")])
            .set_output(self.path("output").join("graph.json"));
        config
    }
}

fn article_ids(entries: &[druglink::LinkageEntry]) -> Vec<(&str, &str)> {
    entries
        .iter()
        .map(|e| (e.article_id.as_str(), e.mentioned_drug_id.as_str()))
        .collect()
}

// J1 is referenced by a literature article naming Atropine, a clinical trial
// naming no drug and a row with an empty title.
#[test]
fn test_j1_links_atropine_only() {
    let fixture = Fixture::new();
    let graph = Pipeline::new(fixture.config()).run().unwrap();

    let j1 = graph.journal("J1").unwrap();
    assert_eq!(j1.referenced_by.pubmed_articles.len(), 1);
    let entry = &j1.referenced_by.pubmed_articles[0];
    assert_eq!(entry.article_id, "3");
    assert_eq!(entry.article_title, "Atropine Saves Lives");
    assert_eq!(entry.mention_date.to_string(), "2020-01-01");
    assert_eq!(entry.mentioned_drug_id, "A03BA");
    assert_eq!(entry.mentioned_drug_name, "Atropine");
    assert!(j1.referenced_by.clinical_trials.is_empty());
}

#[test]
fn test_full_graph() {
    let fixture = Fixture::new();
    let graph = Pipeline::new(fixture.config()).run().unwrap();

    let titles: Vec<&str> = graph.journals.iter().map(|j| j.title.as_str()).collect();
    assert_eq!(
        titles,
        vec![
            "Journal Of Emergency Nursing",
            "J1",
            "Journal Of Photochemistry And Photobiology B Biology",
            "Journal Of Food Protection",
        ]
    );

    let nursing = graph.journal("Journal Of Emergency Nursing").unwrap();
    assert_eq!(article_ids(&nursing.referenced_by.pubmed_articles), vec![("1", "A04AD")]);
    assert_eq!(article_ids(&nursing.referenced_by.clinical_trials), vec![("NCT01", "S03AA")]);

    let photochemistry = graph
        .journal("Journal Of Photochemistry And Photobiology B Biology")
        .unwrap();
    assert_eq!(
        article_ids(&photochemistry.referenced_by.pubmed_articles),
        vec![("9", "6302001")]
    );

    // the JSON row without id gets the next number after the largest one
    let food = graph.journal("Journal Of Food Protection").unwrap();
    assert_eq!(
        article_ids(&food.referenced_by.pubmed_articles),
        vec![("10", "S03AA"), ("10", "V03AB")]
    );
    // merged trial: id from the first row, journal from the second
    assert_eq!(article_ids(&food.referenced_by.clinical_trials), vec![("NCT02", "A04AD")]);

    assert_eq!(graph.mention_count(), 7);
}

#[test]
fn test_written_output_round_trips_and_answers_queries() {
    let fixture = Fixture::new();
    let graph = Pipeline::new(fixture.config()).run_and_write().unwrap();

    let output = fixture.path("output").join("graph.json");
    assert_eq!(read_graph(&output).unwrap(), graph);

    let text = fs::read_to_string(&output).unwrap();
    assert!(text.contains("\"mentionedDrugID\": \"A03BA\""));

    let document = read_document(&output).unwrap();
    assert_eq!(
        top_journal_by_distinct_drugs(&document).unwrap(),
        vec!["Journal Of Food Protection"]
    );

    let co_mentioned: Vec<String> = co_mentioned_drugs(&document, "Tetracycline", true)
        .unwrap()
        .into_iter()
        .collect();
    assert!(co_mentioned.is_empty());

    let co_mentioned: Vec<String> = co_mentioned_drugs(&document, "Tetracycline", false)
        .unwrap()
        .into_iter()
        .collect();
    assert_eq!(co_mentioned, vec!["Diphenhydramine", "Ethanol", "Tetracycline"]);
}

#[test]
fn test_parallel_build_matches_sequential() {
    let fixture = Fixture::new();
    let sequential = Pipeline::new(fixture.config()).run().unwrap();

    let mut config = fixture.config();
    config.set_parallel(true);
    assert_eq!(Pipeline::new(config).run().unwrap(), sequential);
}

#[test]
fn test_bad_date_names_the_file() {
    let fixture = Fixture::new();
    let broken = fixture.write(
        "pubmed.csv",
        "id,title,date,journal\n1,Atropine saves lives,sometime in 2020,J1\n",
    );

    let err = Pipeline::new(fixture.config()).run().unwrap_err();
    match err {
        DruglinkError::Source { path, source } => {
            assert_eq!(path, broken);
            assert_eq!(source.line, Some(2));
        }
        other => panic!("unexpected error {other:?}"),
    }
}

#[test]
fn test_unrepairable_json_is_reported() {
    let fixture = Fixture::new();
    fixture.write("pubmed.json", "[{\"id\": 1, \"title\" \"Atropine\"}]");

    let err = Pipeline::new(fixture.config()).run().unwrap_err();
    assert!(matches!(err, DruglinkError::Source { ref path, .. } if path.ends_with("pubmed.json")));
}

#[test]
fn test_missing_column_names_the_file() {
    let fixture = Fixture::new();
    let broken = fixture.write("drugs_b.csv", "atccode,label\nR01AD,BETAMETHASONE\n");
    let mut config = fixture.config();
    config.set_drugs([fixture.path("drugs.csv"), broken.clone()]);

    let err = Pipeline::new(config).run().unwrap_err();
    assert!(err.to_string().contains("drugs_b.csv"));
    match err {
        DruglinkError::SourceSchema { path, source } => {
            assert_eq!(path, broken);
            assert!(matches!(source, SchemaError::MissingColumn { column: "name", .. }));
        }
        other => panic!("unexpected error {other:?}"),
    }
}

#[test]
fn test_trial_without_id_is_rejected() {
    let fixture = Fixture::new();
    fixture.write(
        "clinical_trials.csv",
        "id,scientific_title,date,journal\n,Orphan trial,1 January 2020,J1\n",
    );

    let err = Pipeline::new(fixture.config()).run().unwrap_err();
    assert!(matches!(
        err,
        DruglinkError::Schema(SchemaError::MissingIdentifier { .. })
    ));
}

#[test]
fn test_unsupported_extension() {
    let fixture = Fixture::new();
    let xml = fixture.write("drugs.xml", "<drugs/>");
    let mut config = fixture.config();
    config.set_drugs([xml.as_path()]);

    let err = Pipeline::new(config).run().unwrap_err();
    assert!(matches!(err, DruglinkError::UnsupportedFormat(ref p) if *p == xml));
}

#[test]
fn test_nothing_is_written_on_failure() {
    let fixture = Fixture::new();
    fixture.write("drugs.csv", "atccode,class\nA04AD,antihistamine\n");

    assert!(Pipeline::new(fixture.config()).run_and_write().is_err());
    assert!(!fixture.path("output").exists());
}

//! Integration tests for loading raw metadata.

use std::fs;
use std::io::Write;
use std::path::Path;

use tempfile::{NamedTempFile, TempDir};

use micoreca::collection::{DeletionMode, DeletionPlan, OutputPaths, TOOL_OUTPUT_DIR};
use micoreca::input;
use micoreca::record::RecordDetails;
use micoreca::{CurationStatus, KeywordConfig, KeywordRuleSet, MatchEngine, RecordKind};

/// Helper to create a temporary file with given content.
fn create_test_file(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("Failed to create temp file");
    file.write_all(content.as_bytes())
        .expect("Failed to write to temp file");
    file
}

fn create_tool_folder(root: &Path, name: &str, files: &[(&str, &str)]) {
    let folder = root.join(name);
    fs::create_dir_all(&folder).unwrap();
    for (file, content) in files {
        fs::write(folder.join(file), content).unwrap();
    }
}

// =============================================================================
// Workflows
// =============================================================================

#[test]
fn test_load_workflows_skips_malformed_entries() {
    let file = create_test_file(
        r#"[
            {"source": "WorkflowHub", "id": 1, "link": "https://workflowhub.eu/workflows/1",
             "name": "MAGs", "tags": ["mags"], "edam_topic": ["Metagenomics"]},
            {"id": 2, "name": "no link"},
            {"id": 3, "link": "", "name": "empty link"},
            "not an object"
        ]"#,
    );

    let batch = input::load_workflows(file.path()).unwrap();
    assert_eq!(batch.collection.len(), 1);
    assert_eq!(batch.failures.len(), 3);
    assert_eq!(batch.failures[0].index, 1);
    assert_eq!(batch.failures[1].origin.as_deref(), Some(""));
}

#[test]
fn test_load_non_array_is_fatal() {
    let file = create_test_file(r#"{"workflows": []}"#);
    assert!(input::load_workflows(file.path()).is_err());
}

#[test]
fn test_load_workflowhub_responses() {
    let file = create_test_file(
        r#"[
            {"data": {"id": "7", "links": {"self": "/workflows/7"},
                      "attributes": {"title": "16S pipeline", "tags": ["Amplicon"],
                                     "created_at": "2023-01-02T03:04:05Z",
                                     "workflow_class": {"title": "Nextflow"},
                                     "tools": [{"name": "dada2"}]}}},
            {"data": {"id": "8"}}
        ]"#,
    );

    let (workflows, failures) = input::load_workflowhub_responses(file.path(), "WorkflowHub").unwrap();
    assert_eq!(workflows.len(), 1);
    assert_eq!(failures.len(), 1);
    assert_eq!(workflows[0].link, "https://workflowhub.eu/workflows/7");
    assert_eq!(workflows[0].tags, vec!["amplicon"]);
    assert_eq!(workflows[0].tools, vec!["dada2"]);
    assert_eq!(workflows[0].create_time, "2023-01-02");
}

// =============================================================================
// Recipes
// =============================================================================

#[test]
fn test_duplicate_recipes_last_wins() {
    let file = create_test_file(
        r#"[
            {"package": {"name": "qiime2", "version": "2023.9"}, "about": {"summary": "old"}},
            {"package": {"name": "kraken2"}, "about": {"summary": "classifier"}},
            {"package": {"name": "qiime2", "version": "2024.2"}, "about": {"summary": "new"}},
            {"package": {"name": ""}}
        ]"#,
    );

    let batch = input::load_recipes(file.path()).unwrap();
    let records = batch.collection.records();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].id(), "qiime2");
    match &records[0].details {
        RecordDetails::Recipe(recipe) => assert_eq!(recipe.about.summary, "new"),
        other => panic!("unexpected details: {:?}", other),
    }
    assert_eq!(batch.failures.len(), 1);
}

// =============================================================================
// Tool folders
// =============================================================================

#[test]
fn test_load_tools_sorted_and_output_dir_skipped() {
    let root = TempDir::new().unwrap();
    create_tool_folder(root.path(), "zeta", &[]);
    create_tool_folder(
        root.path(),
        "alpha",
        &[("alpha.galaxy.json", r#"{"description": "Profiles microbiome samples"}"#)],
    );
    fs::create_dir_all(root.path().join(TOOL_OUTPUT_DIR)).unwrap();

    let batch = input::load(RecordKind::Tool, root.path()).unwrap();
    let ids: Vec<&str> = batch.collection.records().iter().map(|r| r.id()).collect();
    assert_eq!(ids, vec!["alpha", "zeta"]);
}

#[test]
fn test_malformed_tool_folder_excluded_and_never_pruned() {
    let root = TempDir::new().unwrap();
    create_tool_folder(
        root.path(),
        "broken",
        &[("broken.biocontainers.yaml", "description: [unclosed")],
    );
    create_tool_folder(
        root.path(),
        "irrelevant",
        &[("irrelevant.galaxy.json", r#"{"description": "Sorts BAM files"}"#)],
    );

    let batch = input::load(RecordKind::Tool, root.path()).unwrap();
    assert_eq!(batch.failures.len(), 1);
    assert_eq!(batch.collection.len(), 1);

    let rules = KeywordRuleSet::compile(&KeywordConfig::new().with_keywords(["microbio.*"])).unwrap();
    let outcome = batch
        .collection
        .filter(&MatchEngine::new(rules), &CurationStatus::new());
    let plan = DeletionPlan::new(root.path(), &outcome.discarded);
    assert_eq!(plan.folders(), &[root.path().join("irrelevant")]);

    let report = plan.execute(DeletionMode::Commit);
    assert_eq!(report.deleted.len(), 1);
    assert!(root.path().join("broken").exists());
    assert!(!root.path().join("irrelevant").exists());
}

#[test]
fn test_tool_outputs_land_in_infos() {
    let root = TempDir::new().unwrap();
    create_tool_folder(
        root.path(),
        "metaphlan",
        &[(
            "metaphlan.biotools.json",
            r#"{"biotoolsID": "metaphlan", "topic": [{"term": "Metagenomics"}], "function": []}"#,
        )],
    );
    let rules = KeywordRuleSet::compile(&KeywordConfig::new().with_topics(["Metagenomics"])).unwrap();

    let batch = input::load(RecordKind::Tool, root.path()).unwrap();
    let outcome = batch
        .collection
        .filter(&MatchEngine::new(rules), &CurationStatus::new());
    let paths = OutputPaths::for_tools(root.path());
    outcome.write_all(&paths).unwrap();

    assert!(root.path().join("infos/validated_tools_metadata.json").exists());
    let reloaded = input::load(RecordKind::Tool, root.path()).unwrap();
    assert_eq!(reloaded.collection.len(), 1);
}

#[test]
fn test_output_dir_inside_root_survives_pruning() {
    let root = TempDir::new().unwrap();
    create_tool_folder(
        root.path(),
        "metaphlan",
        &[(
            "metaphlan.biotools.json",
            r#"{"biotoolsID": "metaphlan", "topic": [{"term": "Metagenomics"}], "function": []}"#,
        )],
    );
    let paths = OutputPaths::new(root.path().join("results"), RecordKind::Tool);

    for _ in 0..2 {
        create_tool_folder(
            root.path(),
            "samtools",
            &[("samtools.galaxy.json", r#"{"description": "Sorts BAM files"}"#)],
        );
        let rules =
            KeywordRuleSet::compile(&KeywordConfig::new().with_topics(["Metagenomics"])).unwrap();
        let batch = input::load_excluding_outputs(RecordKind::Tool, root.path(), &paths).unwrap();
        let ids: Vec<&str> = batch.collection.records().iter().map(|r| r.id()).collect();
        assert_eq!(ids, vec!["metaphlan", "samtools"]);

        let status = CurationStatus::load(&paths.status_table, RecordKind::Tool);
        let outcome = batch.collection.filter(&MatchEngine::new(rules), &status);
        outcome.write_all(&paths).unwrap();

        let report = DeletionPlan::new(root.path(), &outcome.discarded)
            .protect(paths.files())
            .execute(DeletionMode::Commit);
        assert_eq!(report.deleted, vec![root.path().join("samtools")]);
        assert!(paths.kept_json.exists());
        assert!(paths.status_table.exists());
    }
}

#[test]
fn test_output_folders_within_root() {
    let root = TempDir::new().unwrap();
    let mut paths = OutputPaths::new(root.path().join("results"), RecordKind::Tool);
    paths.status_table = root.path().join("curation/status.tsv");

    assert_eq!(paths.folders_within(root.path()), vec!["results", "curation"]);
    assert!(OutputPaths::new("/elsewhere", RecordKind::Tool)
        .folders_within(root.path())
        .is_empty());
}

//! JSON, TSV and text exports of a filtering run.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use log::info;
use serde::Serialize;
use serde_json::Value;

use crate::error::{MicorecaError, Result};
use crate::record::{Record, RecordDetails, RecordKind, Workflow};

use super::batch::{CurateOutcome, FilterCounts, FilterOutcome};

/// Rendered for absent values in tabular exports.
pub const MISSING: &str = "N/A";

/// Output directory used for tool runs, relative to the scanned root.
pub const TOOL_OUTPUT_DIR: &str = "infos";

/// Where a run writes its files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputPaths {
    pub kept_json: PathBuf,
    pub discarded_json: PathBuf,
    pub summary_tsv: PathBuf,
    pub details_tsv: PathBuf,
    pub report: PathBuf,
    pub status_table: PathBuf,
    pub deletion_plan: PathBuf,
    pub curated_json: PathBuf,
    pub curated_tsv: PathBuf,
    pub curated_details_tsv: PathBuf,
}

impl OutputPaths {
    /// Default file names for `kind` inside `dir`.
    pub fn new(dir: impl AsRef<Path>, kind: RecordKind) -> Self {
        let dir = dir.as_ref();
        let plural = kind.plural();
        Self {
            kept_json: dir.join(format!("validated_{}_metadata.json", plural)),
            discarded_json: dir.join(format!("failed_{}_metadata.json", plural)),
            summary_tsv: dir.join(format!("validated_{}_summary.tsv", plural)),
            details_tsv: dir.join(format!("validated_{}.tsv", plural)),
            report: dir.join("filtering_report.txt"),
            status_table: dir.join(format!("{}_status.tsv", plural)),
            deletion_plan: dir.join("deletion_plan.txt"),
            curated_json: dir.join(format!("curated_{}.json", plural)),
            curated_tsv: dir.join(format!("curated_{}_summary.tsv", plural)),
            curated_details_tsv: dir.join(format!("curated_{}.tsv", plural)),
        }
    }

    /// Every file this layout may write or read back.
    pub fn files(&self) -> Vec<&Path> {
        vec![
            self.kept_json.as_path(),
            self.discarded_json.as_path(),
            self.summary_tsv.as_path(),
            self.details_tsv.as_path(),
            self.report.as_path(),
            self.status_table.as_path(),
            self.deletion_plan.as_path(),
            self.curated_json.as_path(),
            self.curated_tsv.as_path(),
            self.curated_details_tsv.as_path(),
        ]
    }

    /// Names of the sub-folders of `root` that hold any of these files.
    ///
    /// A tool scan of `root` must skip them: they are not tool folders and
    /// must never be pruned.
    pub fn folders_within(&self, root: impl AsRef<Path>) -> Vec<String> {
        let root = resolve_path(root.as_ref());
        let mut names: Vec<String> = Vec::new();
        for file in self.files() {
            let file = resolve_path(file);
            let Ok(relative) = file.strip_prefix(&root) else {
                continue;
            };
            let mut components = relative.components();
            if let (Some(first), Some(_)) = (components.next(), components.next()) {
                let name = first.as_os_str().to_string_lossy().into_owned();
                if !names.contains(&name) {
                    names.push(name);
                }
            }
        }
        names
    }

    /// Default layout for a tool scan of `root`.
    pub fn for_tools(root: impl AsRef<Path>) -> Self {
        Self::new(root.as_ref().join(TOOL_OUTPUT_DIR), RecordKind::Tool)
    }
}

/// Absolute form of `path` with symlinks resolved, as far as it exists.
pub(crate) fn resolve_path(path: &Path) -> PathBuf {
    if let Ok(resolved) = fs::canonicalize(path) {
        return resolved;
    }
    match (path.parent(), path.file_name()) {
        (Some(parent), Some(name)) if !parent.as_os_str().is_empty() => {
            resolve_path(parent).join(name)
        }
        _ => std::env::current_dir()
            .map(|cwd| cwd.join(path))
            .unwrap_or_else(|_| path.to_path_buf()),
    }
}

/// Open `path` for writing, creating parent directories as needed.
pub(crate) fn create_output(path: &Path) -> Result<BufWriter<File>> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent).map_err(|e| {
                MicorecaError::Persistence(format!(
                    "Failed to create directory '{}': {}",
                    parent.display(),
                    e
                ))
            })?;
        }
    }
    let file = File::create(path).map_err(|e| {
        MicorecaError::Persistence(format!(
            "Failed to create file '{}': {}",
            path.display(),
            e
        ))
    })?;
    Ok(BufWriter::new(file))
}

/// Write any serializable value as pretty JSON.
pub fn write_json<T: Serialize + ?Sized>(value: &T, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let mut writer = create_output(path)?;
    serde_json::to_writer_pretty(&mut writer, value).map_err(|e| {
        MicorecaError::Persistence(format!("Failed to serialize '{}': {}", path.display(), e))
    })?;
    writer
        .flush()
        .map_err(|e| MicorecaError::Persistence(format!("Failed to write '{}': {}", path.display(), e)))
}

/// Full-fidelity JSON array of records (metadata plus keep state).
pub fn write_records_json(records: &[Record], path: impl AsRef<Path>) -> Result<()> {
    let documents = records
        .iter()
        .map(Record::to_document)
        .collect::<Result<Vec<_>>>()?;
    write_json(&documents, path)
}

#[derive(Debug, Serialize)]
struct SummaryRow<'a> {
    id: &'a str,
    name: &'a str,
    source: &'a str,
    filtered_on: &'a str,
    reason: &'a str,
    to_keep: &'static str,
    curation_date: &'a str,
    #[serde(rename = "EDAM_operations")]
    edam_operations: String,
    #[serde(rename = "EDAM_topics")]
    edam_topics: String,
    description: &'a str,
    has_biotools_infos: &'static str,
    has_biocontainers_infos: &'static str,
    has_galaxy_infos: &'static str,
}

impl<'a> SummaryRow<'a> {
    fn from_record(record: &'a Record) -> Self {
        let presence = record.presence();
        let matched = record.matched();
        Self {
            id: or_missing(record.id()),
            name: or_missing(record.name()),
            source: or_missing(record.source()),
            filtered_on: matched.map(|m| m.field.key()).unwrap_or(MISSING),
            reason: or_missing(record.filtered_on()),
            to_keep: py_bool(record.keep()),
            curation_date: or_missing(&record.state.curation_date),
            edam_operations: join_sorted(record.edam_operations()),
            edam_topics: join_sorted(record.edam_topics()),
            description: record.best_description().unwrap_or(MISSING),
            has_biotools_infos: py_bool(presence.biotools),
            has_biocontainers_infos: py_bool(presence.biocontainers),
            has_galaxy_infos: py_bool(presence.galaxy),
        }
    }
}

fn or_missing(value: &str) -> &str {
    if value.trim().is_empty() {
        MISSING
    } else {
        value
    }
}

fn py_bool(value: bool) -> &'static str {
    if value { "True" } else { "False" }
}

fn join_sorted(terms: &[String]) -> String {
    if terms.is_empty() {
        return MISSING.to_string();
    }
    let mut sorted: Vec<&str> = terms.iter().map(String::as_str).collect();
    sorted.sort_unstable();
    sorted.dedup();
    sorted.join(", ")
}

/// One row per record: identity, match, EDAM terms, source presence and
/// best description.
pub fn write_summary_tsv(records: &[Record], path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let mut writer = csv::WriterBuilder::new()
        .delimiter(b'\t')
        .from_writer(create_output(path)?);
    for record in records {
        writer.serialize(SummaryRow::from_record(record))?;
    }
    writer
        .flush()
        .map_err(|e| MicorecaError::Persistence(format!("Failed to write '{}': {}", path.display(), e)))
}

/// The table curators edit; read back by `CurationStatus::load`.
///
/// Workflow tables also carry projects, creators and dates so curators can
/// judge a workflow without opening it.
pub fn write_status_table(
    records: &[Record],
    kind: RecordKind,
    path: impl AsRef<Path>,
) -> Result<()> {
    let path = path.as_ref();
    let mut writer = csv::WriterBuilder::new()
        .delimiter(b'\t')
        .from_writer(create_output(path)?);

    let mut header = vec![kind.identity_column(), "Name", "Source"];
    if kind == RecordKind::Workflow {
        header.extend(["Projects", "Creators", "Creation time", "Update time"]);
    }
    header.extend(["Filtered on", "Curation date", "To keep"]);
    writer.write_record(&header)?;

    for record in records {
        let mut row = vec![
            record.id().to_string(),
            record.name().to_string(),
            record.source().to_string(),
        ];
        if kind == RecordKind::Workflow {
            match &record.details {
                RecordDetails::Workflow(w) => row.extend([
                    w.projects.join(", "),
                    w.creators.join(", "),
                    w.create_time.clone(),
                    w.update_time.clone(),
                ]),
                _ => row.extend(std::iter::repeat_n(String::new(), 4)),
            }
        }
        row.extend([
            record.filtered_on().to_string(),
            record.state.curation_date.clone(),
            py_bool(record.keep()).to_string(),
        ]);
        writer.write_record(&row)?;
    }
    writer
        .flush()
        .map_err(|e| MicorecaError::Persistence(format!("Failed to write '{}': {}", path.display(), e)))
}

const WORKFLOW_COLUMNS: [&str; 20] = [
    "Name",
    "Source",
    "ID",
    "Link",
    "Creators",
    "Type",
    "Tags",
    "Creation time",
    "Update time",
    "Latest version",
    "Versions",
    "Number of steps",
    "Tools",
    "EDAM operations",
    "EDAM topics",
    "License",
    "DOI",
    "Projects",
    "Filtered on",
    "To keep",
];

fn workflow_row(workflow: &Workflow, record: &Record) -> [String; 20] {
    [
        workflow.name.clone(),
        workflow.source.clone(),
        workflow.id.to_string(),
        workflow.link.clone(),
        workflow.creators.join(", "),
        workflow.workflow_type.clone(),
        workflow.tags.join(", "),
        workflow.create_time.clone(),
        workflow.update_time.clone(),
        workflow.latest_version.to_string(),
        workflow.versions.to_string(),
        workflow.number_of_steps.to_string(),
        workflow.tools.join(", "),
        workflow.edam_operation.join(", "),
        workflow.edam_topic.join(", "),
        workflow.license.clone().unwrap_or_default(),
        workflow.doi.clone().unwrap_or_default(),
        workflow.projects.join(", "),
        record.filtered_on().to_string(),
        py_bool(record.keep()).to_string(),
    ]
}

/// Nested objects become dotted columns (`about.summary`); anything else is
/// a single cell.
fn flatten_into(prefix: &str, value: &Value, cells: &mut IndexMap<String, String>) {
    match value {
        Value::Object(map) => {
            for (key, inner) in map {
                let column = if prefix.is_empty() {
                    key.clone()
                } else {
                    format!("{}.{}", prefix, key)
                };
                flatten_into(&column, inner, cells);
            }
        }
        Value::Null => {
            cells.insert(prefix.to_string(), String::new());
        }
        Value::Bool(b) => {
            cells.insert(prefix.to_string(), py_bool(*b).to_string());
        }
        Value::String(text) => {
            cells.insert(prefix.to_string(), text.clone());
        }
        other => {
            cells.insert(prefix.to_string(), other.to_string());
        }
    }
}

/// Every field of every record, one column per field.
///
/// Workflows get the curator-facing columns, sorted by project. Recipes and
/// tools are flattened section by section, keyed by `package.name` or
/// `tool_id`.
pub fn write_details_tsv(
    records: &[Record],
    kind: RecordKind,
    path: impl AsRef<Path>,
) -> Result<()> {
    let path = path.as_ref();
    let mut writer = csv::WriterBuilder::new()
        .delimiter(b'\t')
        .from_writer(create_output(path)?);

    if kind == RecordKind::Workflow {
        let mut rows: Vec<[String; 20]> = records
            .iter()
            .filter_map(|record| match &record.details {
                RecordDetails::Workflow(w) => Some(workflow_row(w, record)),
                _ => None,
            })
            .collect();
        rows.sort_by(|a, b| a[17].cmp(&b[17]));
        writer.write_record(WORKFLOW_COLUMNS)?;
        for row in &rows {
            writer.write_record(row)?;
        }
    } else {
        let key = match kind {
            RecordKind::Recipe => "package.name",
            _ => "tool_id",
        };
        let mut columns: Vec<String> = vec![key.to_string()];
        let mut rows = Vec::with_capacity(records.len());
        for record in records {
            let mut cells = IndexMap::new();
            flatten_into("", &record.to_document()?, &mut cells);
            for column in cells.keys() {
                if !columns.contains(column) {
                    columns.push(column.clone());
                }
            }
            rows.push(cells);
        }
        writer.write_record(&columns)?;
        for cells in &rows {
            writer.write_record(
                columns
                    .iter()
                    .map(|c| cells.get(c).map(String::as_str).unwrap_or("")),
            )?;
        }
    }
    writer
        .flush()
        .map_err(|e| MicorecaError::Persistence(format!("Failed to write '{}': {}", path.display(), e)))
}

pub fn write_report(counts: &FilterCounts, kind: RecordKind, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let mut writer = create_output(path)?;
    writer
        .write_all(counts.report(kind).as_bytes())
        .and_then(|_| writer.flush())
        .map_err(|e| MicorecaError::Persistence(format!("Failed to write '{}': {}", path.display(), e)))
}

impl FilterOutcome {
    /// Write kept/discarded JSON, the TSV summary and full table, the counts
    /// report and the status table.
    pub fn write_all(&self, paths: &OutputPaths) -> Result<()> {
        write_records_json(&self.kept, &paths.kept_json)?;
        write_records_json(&self.discarded, &paths.discarded_json)?;
        write_summary_tsv(&self.kept, &paths.summary_tsv)?;
        write_details_tsv(&self.kept, self.kind, &paths.details_tsv)?;
        write_report(&self.counts, self.kind, &paths.report)?;

        let mut all: Vec<Record> = self.kept.iter().chain(&self.discarded).cloned().collect();
        all.sort_by(|a, b| a.id().cmp(b.id()));
        write_status_table(&all, self.kind, &paths.status_table)?;

        info!(
            "Wrote {} kept and {} discarded {} to {}",
            self.kept.len(),
            self.discarded.len(),
            self.kind.plural(),
            paths.kept_json.display()
        );
        Ok(())
    }
}

impl CurateOutcome {
    pub fn write_all(&self, paths: &OutputPaths) -> Result<()> {
        write_records_json(&self.kept, &paths.curated_json)?;
        write_summary_tsv(&self.kept, &paths.curated_tsv)?;
        write_details_tsv(&self.kept, self.kind, &paths.curated_details_tsv)?;
        info!(
            "Wrote {} curated {} to {}",
            self.kept.len(),
            self.kind.plural(),
            paths.curated_json.display()
        );
        Ok(())
    }
}

//! Parse boundary: raw metadata files into typed records.
//!
//! A malformed entry never aborts a load. It is reported as a
//! [`ParseFailure`] and left out of the batch.

use std::fs;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use log::{info, warn};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::collection::{Collection, OutputPaths, TOOL_OUTPUT_DIR};
use crate::error::{MicorecaError, Result};
use crate::record::{Document, Recipe, Record, RecordKind, Tool, Workflow, WorkflowHubResponse};

/// An entry that could not be turned into a record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseFailure {
    /// Position in the input array, or in the sorted folder listing.
    pub index: usize,
    /// Identity hint (link, package name or folder), when one is known.
    pub origin: Option<String>,
    pub message: String,
}

impl ParseFailure {
    fn new(index: usize, origin: Option<String>, message: impl Into<String>) -> Self {
        let failure = Self {
            index,
            origin,
            message: message.into(),
        };
        warn!("Skipping entry {}: {}", failure.describe(), failure.message);
        failure
    }

    fn describe(&self) -> String {
        match &self.origin {
            Some(origin) => format!("#{} ({})", self.index, origin),
            None => format!("#{}", self.index),
        }
    }
}

impl From<ParseFailure> for MicorecaError {
    fn from(failure: ParseFailure) -> Self {
        MicorecaError::Parse {
            index: failure.index,
            message: failure.message,
        }
    }
}

/// Records that parsed, plus the entries that did not.
#[derive(Debug, Clone)]
pub struct LoadedBatch {
    pub collection: Collection,
    pub failures: Vec<ParseFailure>,
}

/// Load records of `kind` from `path`: a JSON array for workflows and
/// recipes, a folder of tool folders for tools.
pub fn load(kind: RecordKind, path: impl AsRef<Path>) -> Result<LoadedBatch> {
    match kind {
        RecordKind::Workflow => load_workflows(path),
        RecordKind::Recipe => load_recipes(path),
        RecordKind::Tool => load_tools(path, &[TOOL_OUTPUT_DIR]),
    }
}

/// Like [`load`], but a tool scan also skips every sub-folder of `path`
/// that holds one of `outputs`.
pub fn load_excluding_outputs(
    kind: RecordKind,
    path: impl AsRef<Path>,
    outputs: &OutputPaths,
) -> Result<LoadedBatch> {
    let path = path.as_ref();
    if kind != RecordKind::Tool {
        return load(kind, path);
    }
    let mut skip = outputs.folders_within(path);
    if !skip.iter().any(|s| s == TOOL_OUTPUT_DIR) {
        skip.push(TOOL_OUTPUT_DIR.to_string());
    }
    let skip: Vec<&str> = skip.iter().map(String::as_str).collect();
    load_tools(path, &skip)
}

/// Load a workflow JSON array (raw export or a previous run's output).
pub fn load_workflows(path: impl AsRef<Path>) -> Result<LoadedBatch> {
    load_array::<Workflow>(path.as_ref(), RecordKind::Workflow, |doc| {
        doc.details.validate()
    })
}

/// Load a recipe JSON array. Later duplicates of a package name replace
/// earlier ones.
pub fn load_recipes(path: impl AsRef<Path>) -> Result<LoadedBatch> {
    load_array::<Recipe>(path.as_ref(), RecordKind::Recipe, |doc| {
        doc.details.validate()
    })
}

/// Load a JSON array of records previously exported by this crate,
/// whatever its kind.
pub fn load_exported(kind: RecordKind, path: impl AsRef<Path>) -> Result<LoadedBatch> {
    match kind {
        RecordKind::Workflow => load_workflows(path),
        RecordKind::Recipe => load_recipes(path),
        RecordKind::Tool => load_array::<Tool>(path.as_ref(), RecordKind::Tool, |doc| {
            if doc.details.tool_id.trim().is_empty() {
                Err("tool has no tool_id".to_string())
            } else {
                Ok(())
            }
        }),
    }
}

fn read_array(path: &Path) -> Result<Vec<Value>> {
    let content = fs::read_to_string(path).map_err(|e| MicorecaError::io(path, e))?;
    match serde_json::from_str::<Value>(&content)? {
        Value::Array(items) => Ok(items),
        other => Err(MicorecaError::Parse {
            index: 0,
            message: format!(
                "expected a JSON array in '{}', found {}",
                path.display(),
                json_type(&other)
            ),
        }),
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

fn load_array<D>(
    path: &Path,
    kind: RecordKind,
    validate: impl Fn(&Document<D>) -> std::result::Result<(), String>,
) -> Result<LoadedBatch>
where
    D: DeserializeOwned,
    Record: From<Document<D>>,
{
    let items = read_array(path)?;
    let mut failures = Vec::new();
    let mut records: Vec<Record> = Vec::with_capacity(items.len());

    for (index, item) in items.into_iter().enumerate() {
        let origin = identity_hint(&item);
        let parsed = serde_json::from_value::<Document<D>>(item)
            .map_err(|e| e.to_string())
            .and_then(|doc| validate(&doc).map(|_| doc));
        match parsed {
            Ok(doc) => records.push(Record::from(doc)),
            Err(message) => failures.push(ParseFailure::new(index, origin, message)),
        }
    }

    let records = deduplicate(records);
    info!(
        "Loaded {} {} from {} ({} skipped)",
        records.len(),
        kind.plural(),
        path.display(),
        failures.len()
    );
    Ok(LoadedBatch {
        collection: Collection::from_records(kind, records),
        failures,
    })
}

fn identity_hint(item: &Value) -> Option<String> {
    item.get("link")
        .or_else(|| item.get("package").and_then(|p| p.get("name")))
        .or_else(|| item.get("tool_id"))
        .and_then(Value::as_str)
        .map(String::from)
}

/// Keep one record per identity; the last one wins, at the first position.
fn deduplicate(records: Vec<Record>) -> Vec<Record> {
    let mut by_id: IndexMap<String, Record> = IndexMap::with_capacity(records.len());
    for record in records {
        if let Some(previous) = by_id.insert(record.id().to_string(), record) {
            warn!("Duplicate {} '{}': keeping the last entry", previous.kind(), previous.id());
        }
    }
    by_id.into_values().collect()
}

/// Scan `root` for tool folders, sorted by name. Folders named in `skip`
/// (the output directory) are ignored.
pub fn load_tools(root: impl AsRef<Path>, skip: &[&str]) -> Result<LoadedBatch> {
    let root = root.as_ref();
    let mut folders: Vec<PathBuf> = fs::read_dir(root)
        .map_err(|e| MicorecaError::io(root, e))?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.is_dir())
        .filter(|p| {
            p.file_name()
                .map(|n| !skip.iter().any(|s| n == *s))
                .unwrap_or(false)
        })
        .collect();
    folders.sort();

    let mut records = Vec::with_capacity(folders.len());
    let mut failures = Vec::new();
    for (index, folder) in folders.iter().enumerate() {
        match Tool::from_folder(folder) {
            Ok(tool) => records.push(Record::from(tool)),
            Err(e) => failures.push(ParseFailure::new(
                index,
                Some(folder.display().to_string()),
                e.to_string(),
            )),
        }
    }

    info!(
        "Loaded {} tool folders from {} ({} skipped)",
        records.len(),
        root.display(),
        failures.len()
    );
    Ok(LoadedBatch {
        collection: Collection::from_records(RecordKind::Tool, records),
        failures,
    })
}

/// Convert a JSON array of WorkflowHub API responses into workflows.
pub fn load_workflowhub_responses(
    path: impl AsRef<Path>,
    source: &str,
) -> Result<(Vec<Workflow>, Vec<ParseFailure>)> {
    let items = read_array(path.as_ref())?;
    let mut workflows = Vec::with_capacity(items.len());
    let mut failures = Vec::new();

    for (index, item) in items.into_iter().enumerate() {
        let parsed = serde_json::from_value::<WorkflowHubResponse>(item)
            .map_err(|e| e.to_string())
            .and_then(|response| Workflow::from_workflowhub(&response, source));
        match parsed {
            Ok(workflow) => workflows.push(workflow),
            Err(message) => failures.push(ParseFailure::new(index, None, message)),
        }
    }
    Ok((workflows, failures))
}

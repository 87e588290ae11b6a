//! RSEC tool folders: bio.tools, BioContainers and Galaxy metadata merged
//! into one record.

use std::fs;
use std::path::{Path, PathBuf};

use indexmap::IndexSet;
use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::{MicorecaError, Result};

use super::nullable;

const BIOTOOLS_SUFFIX: &str = "biotools.json";
const BIOCONTAINERS_SUFFIX: &str = ".biocontainers.yaml";
const GALAXY_SUFFIX: &str = ".galaxy.json";

/// A tool, with its three optional metadata sources flattened.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Tool {
    pub tool_id: String,
    #[serde(default, deserialize_with = "nullable")]
    pub biotools_id: String,
    #[serde(default, deserialize_with = "nullable")]
    pub edam_topics: Vec<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub edam_operations: Vec<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub biocontainers_keywords: Vec<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub biotools_description: String,
    #[serde(default, deserialize_with = "nullable")]
    pub biocontainers_description: String,
    #[serde(default, deserialize_with = "nullable")]
    pub galaxy_description: String,
    #[serde(default)]
    pub has_biotools_infos: bool,
    #[serde(default)]
    pub has_biocontainers_infos: bool,
    #[serde(default)]
    pub has_galaxy_infos: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub folder: Option<PathBuf>,
}

#[derive(Debug, Default, Deserialize)]
struct BiotoolsEntry {
    #[serde(rename = "biotoolsID", default, deserialize_with = "nullable")]
    biotools_id: String,
    #[serde(default, deserialize_with = "nullable")]
    description: String,
    #[serde(default, deserialize_with = "nullable")]
    topic: Vec<TermRef>,
    #[serde(default, deserialize_with = "nullable")]
    function: Vec<BiotoolsFunction>,
}

#[derive(Debug, Default, Deserialize)]
struct BiotoolsFunction {
    #[serde(default, deserialize_with = "nullable")]
    operation: Vec<TermRef>,
}

#[derive(Debug, Default, Deserialize)]
struct TermRef {
    #[serde(default)]
    term: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct BiocontainersEntry {
    #[serde(default)]
    description: Option<serde_yaml::Value>,
    #[serde(default)]
    keywords: Option<serde_yaml::Value>,
}

#[derive(Debug, Default, Deserialize)]
struct GalaxyEntry {
    #[serde(default)]
    description: Option<serde_json::Value>,
}

impl Tool {
    pub fn new(tool_id: impl Into<String>) -> Self {
        Self {
            tool_id: tool_id.into(),
            ..Default::default()
        }
    }

    pub fn with_topics<I, S>(mut self, topics: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.edam_topics.extend(topics.into_iter().map(Into::into));
        self
    }

    pub fn with_operations<I, S>(mut self, operations: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.edam_operations
            .extend(operations.into_iter().map(Into::into));
        self
    }

    pub fn with_keywords<I, S>(mut self, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.biocontainers_keywords
            .extend(keywords.into_iter().map(Into::into));
        self
    }

    pub fn with_biotools_description(mut self, description: impl Into<String>) -> Self {
        self.biotools_description = description.into();
        self.has_biotools_infos = true;
        self
    }

    pub fn with_biocontainers_description(mut self, description: impl Into<String>) -> Self {
        self.biocontainers_description = description.into();
        self.has_biocontainers_infos = true;
        self
    }

    pub fn with_galaxy_description(mut self, description: impl Into<String>) -> Self {
        self.galaxy_description = description.into();
        self.has_galaxy_infos = true;
        self
    }

    pub fn with_folder(mut self, folder: impl Into<PathBuf>) -> Self {
        self.folder = Some(folder.into());
        self
    }

    /// Read a tool folder. The folder name is the tool id.
    ///
    /// Missing metadata files are fine; a present but unreadable one fails
    /// the whole folder.
    pub fn from_folder(folder: &Path) -> Result<Self> {
        let tool_id = folder
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let mut tool = Tool::new(tool_id).with_folder(folder);

        let mut files: Vec<PathBuf> = fs::read_dir(folder)
            .map_err(|e| MicorecaError::io(folder, e))?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|p| p.is_file())
            .collect();
        files.sort();

        if let Some(path) = find_with_suffix(&files, BIOTOOLS_SUFFIX) {
            tool.merge_biotools(path)?;
        }
        if let Some(path) = find_with_suffix(&files, BIOCONTAINERS_SUFFIX) {
            tool.merge_biocontainers(path)?;
        }
        if let Some(path) = find_with_suffix(&files, GALAXY_SUFFIX) {
            tool.merge_galaxy(path)?;
        }

        Ok(tool)
    }

    fn merge_biotools(&mut self, path: &Path) -> Result<()> {
        let content = fs::read_to_string(path).map_err(|e| MicorecaError::io(path, e))?;
        let value: serde_json::Value = serde_json::from_str(&content)?;
        if !value.is_object() {
            debug!("Ignoring non-object bio.tools file {}", path.display());
            return Ok(());
        }
        let entry: BiotoolsEntry = serde_json::from_value(value)?;

        self.has_biotools_infos = true;
        self.biotools_id = entry.biotools_id;
        self.biotools_description = entry.description;
        self.edam_topics = unique_terms(entry.topic.iter());
        self.edam_operations =
            unique_terms(entry.function.iter().flat_map(|f| f.operation.iter()));
        Ok(())
    }

    fn merge_biocontainers(&mut self, path: &Path) -> Result<()> {
        let content = fs::read_to_string(path).map_err(|e| MicorecaError::io(path, e))?;
        let value: serde_yaml::Value = serde_yaml::from_str(&content)?;
        if !value.is_mapping() {
            debug!("Ignoring non-mapping BioContainers file {}", path.display());
            return Ok(());
        }
        let entry: BiocontainersEntry = serde_yaml::from_value(value)?;

        self.has_biocontainers_infos = true;
        self.biocontainers_description = entry
            .description
            .as_ref()
            .and_then(yaml_scalar)
            .unwrap_or_default();
        self.biocontainers_keywords = entry.keywords.map(split_keywords).unwrap_or_default();
        Ok(())
    }

    fn merge_galaxy(&mut self, path: &Path) -> Result<()> {
        let content = fs::read_to_string(path).map_err(|e| MicorecaError::io(path, e))?;
        let value: serde_json::Value = serde_json::from_str(&content)?;
        if !value.is_object() {
            debug!("Ignoring non-object Galaxy file {}", path.display());
            return Ok(());
        }
        let entry: GalaxyEntry = serde_json::from_value(value)?;

        self.has_galaxy_infos = true;
        self.galaxy_description = match entry.description {
            Some(serde_json::Value::String(s)) => s,
            Some(serde_json::Value::Null) | None => String::new(),
            Some(other) => other.to_string(),
        };
        Ok(())
    }
}

fn find_with_suffix<'a>(files: &'a [PathBuf], suffix: &str) -> Option<&'a Path> {
    files
        .iter()
        .find(|p| {
            p.file_name()
                .map(|n| n.to_string_lossy().ends_with(suffix))
                .unwrap_or(false)
        })
        .map(PathBuf::as_path)
}

fn unique_terms<'a>(terms: impl Iterator<Item = &'a TermRef>) -> Vec<String> {
    terms
        .filter_map(|t| t.term.as_deref())
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(String::from)
        .collect::<IndexSet<_>>()
        .into_iter()
        .collect()
}

fn yaml_scalar(value: &serde_yaml::Value) -> Option<String> {
    match value {
        serde_yaml::Value::String(s) => Some(s.clone()),
        serde_yaml::Value::Number(n) => Some(n.to_string()),
        serde_yaml::Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Keywords come either as a list or as one comma/semicolon separated string.
fn split_keywords(value: serde_yaml::Value) -> Vec<String> {
    match value {
        serde_yaml::Value::Sequence(items) => items
            .iter()
            .filter_map(yaml_scalar)
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty())
            .collect(),
        serde_yaml::Value::String(s) => s
            .split([',', ';'])
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .map(String::from)
            .collect(),
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write(dir: &Path, name: &str, content: &str) {
        fs::write(dir.join(name), content).unwrap();
    }

    #[test]
    fn test_merge_all_sources() {
        let root = TempDir::new().unwrap();
        let folder = root.path().join("kraken2");
        fs::create_dir(&folder).unwrap();
        write(
            &folder,
            "kraken2.biotools.json",
            r#"{"biotoolsID": "kraken2", "description": "Taxonomic classifier",
                "topic": [{"term": "Metagenomics"}, {"term": "Metagenomics"}],
                "function": [{"operation": [{"term": "Taxonomic classification"}]}]}"#,
        );
        write(
            &folder,
            "kraken2.biocontainers.yaml",
            "description: k-mer classifier\nkeywords: [metagenomics, OTU]\n",
        );
        write(&folder, "kraken2.galaxy.json", r#"{"description": "Assign taxonomy"}"#);

        let tool = Tool::from_folder(&folder).unwrap();

        assert_eq!(tool.tool_id, "kraken2");
        assert_eq!(tool.biotools_id, "kraken2");
        assert_eq!(tool.edam_topics, vec!["Metagenomics"]);
        assert_eq!(tool.edam_operations, vec!["Taxonomic classification"]);
        assert_eq!(tool.biocontainers_keywords, vec!["metagenomics", "OTU"]);
        assert_eq!(tool.galaxy_description, "Assign taxonomy");
        assert!(tool.has_biotools_infos && tool.has_biocontainers_infos && tool.has_galaxy_infos);
        assert_eq!(tool.folder.as_deref(), Some(folder.as_path()));
    }

    #[test]
    fn test_missing_sources() {
        let root = TempDir::new().unwrap();
        let folder = root.path().join("bare");
        fs::create_dir(&folder).unwrap();

        let tool = Tool::from_folder(&folder).unwrap();
        assert!(!tool.has_biotools_infos);
        assert!(tool.edam_topics.is_empty());
    }

    #[test]
    fn test_string_keywords_split() {
        assert_eq!(
            split_keywords(serde_yaml::Value::String("a, b;c ,".to_string())),
            vec!["a", "b", "c"]
        );
    }

    #[test]
    fn test_malformed_file_fails_folder() {
        let root = TempDir::new().unwrap();
        let folder = root.path().join("broken");
        fs::create_dir(&folder).unwrap();
        write(&folder, "broken.biotools.json", "{not json");

        assert!(Tool::from_folder(&folder).is_err());
    }
}

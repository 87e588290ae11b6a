//! Keyword configuration document (`keywords.yml`).

use std::fs;
use std::path::Path;

use log::warn;
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{MicorecaError, Result};

/// EDAM vocabulary section of the keyword configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EdamTerms {
    /// EDAM operation labels to keep.
    #[serde(default, deserialize_with = "string_list")]
    pub operations: Vec<String>,
    /// EDAM topic labels to keep.
    #[serde(default, deserialize_with = "string_list")]
    pub topics: Vec<String>,
}

/// Raw filtering criteria, as written by the curators.
///
/// ```yaml
/// edam:
///   operations: [Taxonomic classification]
///   topics: [Metagenomics, Microbial ecology]
/// keywords: [microbiome, "metage.*", MAGS]
/// acronyms: [OTU, ASV]
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KeywordConfig {
    #[serde(default, deserialize_with = "edam_section")]
    pub edam: EdamTerms,
    /// Free-text regex fragments (case-insensitive, partial match).
    #[serde(default, deserialize_with = "string_list")]
    pub keywords: Vec<String>,
    /// Strict whole-word terms.
    #[serde(default, deserialize_with = "string_list")]
    pub acronyms: Vec<String>,
}

impl KeywordConfig {
    /// Create an empty configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add target EDAM topics.
    pub fn with_topics<I, S>(mut self, topics: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.edam.topics.extend(topics.into_iter().map(Into::into));
        self
    }

    /// Add target EDAM operations.
    pub fn with_operations<I, S>(mut self, operations: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.edam
            .operations
            .extend(operations.into_iter().map(Into::into));
        self
    }

    /// Add free-text keywords.
    pub fn with_keywords<I, S>(mut self, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.keywords.extend(keywords.into_iter().map(Into::into));
        self
    }

    /// Add strict acronyms.
    pub fn with_acronyms<I, S>(mut self, acronyms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.acronyms.extend(acronyms.into_iter().map(Into::into));
        self
    }

    /// Parse a configuration from YAML text.
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        // An empty document is a valid, empty configuration.
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Option<KeywordConfig> = serde_yaml::from_str(content).map_err(|e| {
            MicorecaError::Config(format!("Failed to parse keyword configuration: {}", e))
        })?;
        Ok(config.unwrap_or_default())
    }

    /// Load a configuration file. A missing file is fatal.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(MicorecaError::Config(format!(
                "Keywords file not found at '{}'",
                path.display()
            )));
        }
        let content = fs::read_to_string(path).map_err(|e| MicorecaError::io(path, e))?;
        Self::from_yaml_str(&content)
    }
}

/// Accept a missing/null section, keep string items and drop anything else.
fn string_list<'de, D>(deserializer: D) -> std::result::Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<Vec<serde_yaml::Value>> = Option::deserialize(deserializer)?;
    Ok(raw
        .unwrap_or_default()
        .into_iter()
        .filter_map(|value| match value {
            serde_yaml::Value::String(s) => Some(s),
            other => {
                warn!("Ignoring non-string keyword entry: {:?}", other);
                None
            }
        })
        .collect())
}

fn edam_section<'de, D>(deserializer: D) -> std::result::Result<EdamTerms, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<EdamTerms>::deserialize(deserializer)?.unwrap_or_default())
}

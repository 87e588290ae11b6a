//! Bioconda recipes.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::nullable;

/// The `package` section of a recipe.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecipePackage {
    #[serde(default, deserialize_with = "nullable")]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// The `about` section of a recipe.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecipeAbout {
    #[serde(default, deserialize_with = "nullable")]
    pub summary: String,
    #[serde(default, deserialize_with = "nullable")]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub home: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A recipe; sections other than `package` and `about` are carried verbatim.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Recipe {
    pub package: RecipePackage,
    #[serde(default, deserialize_with = "nullable")]
    pub about: RecipeAbout,
    #[serde(rename = "source", default, skip_serializing_if = "Option::is_none")]
    pub source_section: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub build: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requirements: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub test: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extra: Option<Value>,
}

impl Recipe {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            package: RecipePackage {
                name: name.into(),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    pub fn with_summary(mut self, summary: impl Into<String>) -> Self {
        self.about.summary = summary.into();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.about.description = description.into();
        self
    }

    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.package.name.trim().is_empty() {
            return Err("recipe has no package name".to_string());
        }
        Ok(())
    }
}

//! WorkflowHub workflows, in export form and as raw API responses.

use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use super::nullable;

/// WorkflowHub identifier; exports carry it as a number, older dumps as text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum WorkflowId {
    Number(u64),
    Text(String),
}

impl Default for WorkflowId {
    fn default() -> Self {
        WorkflowId::Number(0)
    }
}

impl fmt::Display for WorkflowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WorkflowId::Number(n) => write!(f, "{}", n),
            WorkflowId::Text(s) => write!(f, "{}", s),
        }
    }
}

/// A workflow as exported by the ingestion step.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Workflow {
    #[serde(default, deserialize_with = "nullable")]
    pub source: String,
    #[serde(default)]
    pub id: WorkflowId,
    pub link: String,
    #[serde(default, deserialize_with = "nullable")]
    pub name: String,
    #[serde(default, deserialize_with = "nullable")]
    pub creators: Vec<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub tags: Vec<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub create_time: String,
    #[serde(default, deserialize_with = "nullable")]
    pub update_time: String,
    #[serde(default, deserialize_with = "nullable")]
    pub latest_version: u64,
    #[serde(default, deserialize_with = "nullable")]
    pub versions: u64,
    #[serde(default, deserialize_with = "nullable")]
    pub number_of_steps: u64,
    #[serde(default, deserialize_with = "nullable")]
    pub tools: Vec<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub edam_operation: Vec<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub edam_topic: Vec<String>,
    #[serde(default)]
    pub license: Option<String>,
    #[serde(default)]
    pub doi: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub projects: Vec<String>,
    #[serde(rename = "type", default, deserialize_with = "nullable")]
    pub workflow_type: String,
    #[serde(default, deserialize_with = "nullable")]
    pub description: String,
}

impl Workflow {
    pub fn new(link: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            source: "WorkflowHub".to_string(),
            link: link.into(),
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags.extend(tags.into_iter().map(Into::into));
        self
    }

    pub fn with_topics<I, S>(mut self, topics: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.edam_topic.extend(topics.into_iter().map(Into::into));
        self
    }

    pub fn with_operations<I, S>(mut self, operations: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.edam_operation
            .extend(operations.into_iter().map(Into::into));
        self
    }

    pub fn with_tools<I, S>(mut self, tools: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tools.extend(tools.into_iter().map(Into::into));
        self
    }

    /// Reject entries that cannot be identified.
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.link.trim().is_empty() {
            return Err("workflow has no link".to_string());
        }
        Ok(())
    }

    /// Build a workflow from a WorkflowHub API response.
    ///
    /// `source` is the hub name, e.g. `WorkflowHub`. It is lower-cased to
    /// form the link host.
    pub fn from_workflowhub(
        response: &WorkflowHubResponse,
        source: &str,
    ) -> std::result::Result<Self, String> {
        let data = &response.data;
        let attrs = &data.attributes;

        let creators = if !attrs.creators.is_empty() {
            attrs
                .creators
                .iter()
                .map(|c| {
                    format!(
                        "{} {}",
                        c.given_name.as_deref().unwrap_or(""),
                        c.family_name.as_deref().unwrap_or("")
                    )
                    .trim()
                    .to_string()
                })
                .filter(|c| !c.is_empty())
                .collect()
        } else {
            attrs
                .other_creators
                .as_deref()
                .map(|others| {
                    others
                        .split(',')
                        .map(str::trim)
                        .filter(|c| !c.is_empty())
                        .map(String::from)
                        .collect()
                })
                .unwrap_or_default()
        };

        let workflow_type = attrs
            .workflow_class
            .as_ref()
            .and_then(|c| c.title.clone())
            .unwrap_or_default();

        let steps = attrs
            .internals
            .as_ref()
            .and_then(|i| i.steps.as_deref())
            .unwrap_or(&[]);

        let mut tools: Vec<String> = attrs
            .tools
            .iter()
            .filter_map(|t| t.name.clone())
            .collect();
        if tools.is_empty() || workflow_type == "Galaxy" {
            tools = steps
                .iter()
                .filter_map(|s| s.description.as_deref().or(s.name.as_deref()))
                .map(shorten_tool_id)
                .collect();
        }

        let workflow = Self {
            source: source.to_string(),
            id: data.id.clone(),
            link: format!("https://{}.eu{}", source.to_lowercase(), data.links.self_link),
            name: attrs.title.clone().unwrap_or_default(),
            creators,
            tags: attrs.tags.iter().map(|t| t.to_lowercase()).collect(),
            create_time: normalize_date(attrs.created_at.as_deref().unwrap_or(""))?,
            update_time: normalize_date(attrs.updated_at.as_deref().unwrap_or(""))?,
            latest_version: attrs.latest_version.unwrap_or_default(),
            versions: attrs.versions.len() as u64,
            number_of_steps: steps.len() as u64,
            tools,
            edam_operation: attrs
                .operation_annotations
                .iter()
                .filter_map(|a| a.label.clone())
                .collect(),
            edam_topic: attrs
                .topic_annotations
                .iter()
                .filter_map(|a| a.label.clone())
                .collect(),
            license: attrs.license.clone(),
            doi: attrs.doi.clone(),
            projects: response.project_ids(),
            workflow_type,
            description: attrs.description.clone().unwrap_or_default(),
        };
        workflow.validate()?;
        Ok(workflow)
    }
}

/// Toolshed ids keep only the tool name (`.../repos/owner/name/tool/1.0` → `tool`).
pub fn shorten_tool_id(tool: &str) -> String {
    if tool.contains("toolshed") {
        let parts: Vec<&str> = tool.split('/').collect();
        if parts.len() >= 2 {
            return parts[parts.len() - 2].to_string();
        }
    }
    tool.to_string()
}

/// Reduce an ISO timestamp to `YYYY-MM-DD`. Empty input stays empty.
pub fn normalize_date(raw: &str) -> std::result::Result<String, String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(String::new());
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.format("%Y-%m-%d").to_string());
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return Ok(dt.format("%Y-%m-%d").to_string());
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map(|d| d.format("%Y-%m-%d").to_string())
        .map_err(|e| format!("invalid date '{}': {}", raw, e))
}

/// `GET /workflows/{id}` response body.
#[derive(Debug, Clone, Deserialize)]
pub struct WorkflowHubResponse {
    pub data: WorkflowHubData,
}

impl WorkflowHubResponse {
    /// Project ids the workflow belongs to. Names need a separate lookup,
    /// so workflows built from a response list the ids.
    pub fn project_ids(&self) -> Vec<String> {
        self.data
            .relationships
            .as_ref()
            .and_then(|r| r.projects.as_ref())
            .map(|p| p.data.iter().map(|d| d.id.to_string()).collect())
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct WorkflowHubData {
    #[serde(default)]
    pub id: WorkflowId,
    pub links: WorkflowHubLinks,
    pub attributes: WorkflowHubAttributes,
    #[serde(default)]
    pub relationships: Option<WorkflowHubRelationships>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WorkflowHubLinks {
    #[serde(rename = "self")]
    pub self_link: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct WorkflowHubAttributes {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub tags: Vec<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
    #[serde(default)]
    pub latest_version: Option<u64>,
    #[serde(default, deserialize_with = "nullable")]
    pub versions: Vec<serde_json::Value>,
    #[serde(default)]
    pub internals: Option<WorkflowHubInternals>,
    #[serde(default)]
    pub license: Option<String>,
    #[serde(default)]
    pub doi: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub topic_annotations: Vec<Annotation>,
    #[serde(default, deserialize_with = "nullable")]
    pub operation_annotations: Vec<Annotation>,
    #[serde(default)]
    pub workflow_class: Option<WorkflowClass>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub creators: Vec<Creator>,
    #[serde(default)]
    pub other_creators: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub tools: Vec<ToolRef>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct WorkflowHubInternals {
    #[serde(default)]
    pub steps: Option<Vec<Step>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Step {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Annotation {
    #[serde(default)]
    pub label: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct WorkflowClass {
    #[serde(default)]
    pub title: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Creator {
    #[serde(default)]
    pub given_name: Option<String>,
    #[serde(default)]
    pub family_name: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ToolRef {
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct WorkflowHubRelationships {
    #[serde(default)]
    pub projects: Option<RelationshipList>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RelationshipList {
    #[serde(default)]
    pub data: Vec<RelationshipRef>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RelationshipRef {
    pub id: WorkflowId,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn galaxy_response() -> WorkflowHubResponse {
        serde_json::from_str(
            r#"{
                "data": {
                    "id": "456",
                    "links": {"self": "/workflows/456"},
                    "attributes": {
                        "title": "MAGs building",
                        "tags": ["Metagenomics", "MAGs"],
                        "created_at": "2024-03-01T10:15:00.000Z",
                        "updated_at": "2024-05-02T08:00:00Z",
                        "latest_version": 2,
                        "versions": [{}, {}],
                        "internals": {"steps": [
                            {"name": "1", "description": "toolshed.g2.bx.psu.edu/repos/iuc/megahit/megahit/1.2.9"},
                            {"name": "fastp", "description": null}
                        ]},
                        "license": "MIT",
                        "doi": null,
                        "topic_annotations": [{"label": "Metagenomics"}],
                        "operation_annotations": [],
                        "workflow_class": {"title": "Galaxy"},
                        "description": "Assemble and bin MAGs",
                        "creators": [{"given_name": "Ada", "family_name": "Lovelace"}],
                        "other_creators": null,
                        "tools": []
                    },
                    "relationships": {"projects": {"data": [{"id": "12"}]}}
                }
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn test_from_workflowhub() {
        let workflow = Workflow::from_workflowhub(&galaxy_response(), "WorkflowHub").unwrap();

        assert_eq!(workflow.link, "https://workflowhub.eu/workflows/456");
        assert_eq!(workflow.id, WorkflowId::Text("456".to_string()));
        assert_eq!(workflow.tags, vec!["metagenomics", "mags"]);
        assert_eq!(workflow.create_time, "2024-03-01");
        assert_eq!(workflow.update_time, "2024-05-02");
        assert_eq!(workflow.versions, 2);
        assert_eq!(workflow.number_of_steps, 2);
        assert_eq!(workflow.tools, vec!["megahit", "fastp"]);
        assert_eq!(workflow.creators, vec!["Ada Lovelace"]);
        assert_eq!(workflow.workflow_type, "Galaxy");
        assert_eq!(workflow.edam_topic, vec!["Metagenomics"]);
        assert_eq!(workflow.projects, vec!["12"]);
        assert!(workflow.doi.is_none());
    }

    #[test]
    fn test_other_creators_split() {
        let mut response = galaxy_response();
        response.data.attributes.creators.clear();
        response.data.attributes.other_creators = Some("Alice, Bob,".to_string());

        let workflow = Workflow::from_workflowhub(&response, "WorkflowHub").unwrap();
        assert_eq!(workflow.creators, vec!["Alice", "Bob"]);
    }

    #[test]
    fn test_project_ids() {
        assert_eq!(galaxy_response().project_ids(), vec!["12"]);
    }

    #[test]
    fn test_shorten_tool_id() {
        assert_eq!(
            shorten_tool_id("toolshed.g2.bx.psu.edu/repos/iuc/kraken2/kraken2/2.1.1"),
            "kraken2"
        );
        assert_eq!(shorten_tool_id("Cut1"), "Cut1");
    }

    #[test]
    fn test_normalize_date() {
        assert_eq!(normalize_date("2023-11-05T12:00:00+01:00").unwrap(), "2023-11-05");
        assert_eq!(normalize_date("2023-11-05").unwrap(), "2023-11-05");
        assert_eq!(normalize_date("").unwrap(), "");
        assert!(normalize_date("yesterday").is_err());
    }

    #[test]
    fn test_numeric_and_text_ids() {
        let numeric: Workflow =
            serde_json::from_str(r#"{"id": 42, "link": "https://x/42", "name": "a"}"#).unwrap();
        let text: Workflow =
            serde_json::from_str(r#"{"id": "42", "link": "https://x/42", "name": "a"}"#).unwrap();

        assert_eq!(numeric.id.to_string(), "42");
        assert_eq!(text.id.to_string(), "42");
    }

    #[test]
    fn test_null_fields_tolerated() {
        let workflow: Workflow = serde_json::from_str(
            r#"{"link": "https://x/1", "name": "a", "description": null, "tags": null}"#,
        )
        .unwrap();

        assert!(workflow.description.is_empty());
        assert!(workflow.tags.is_empty());
    }

    #[test]
    fn test_validate_requires_link() {
        assert!(Workflow::new("", "unnamed").validate().is_err());
        assert!(Workflow::new("https://x/1", "a").validate().is_ok());
    }
}

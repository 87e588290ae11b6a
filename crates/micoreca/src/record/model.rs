//! Uniform record representation shared by workflows, recipes and tools.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::Result;

use super::recipe::Recipe;
use super::tool::Tool;
use super::workflow::Workflow;

/// Curation date used when no curator has looked at a record yet.
pub const UNSET_CURATION_DATE: &str = "0000-00-00";

/// Kind of catalog entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordKind {
    /// WorkflowHub workflow.
    Workflow,
    /// Bioconda recipe.
    Recipe,
    /// RSEC tool folder.
    Tool,
}

impl RecordKind {
    /// Plural name, used in output file names.
    pub fn plural(&self) -> &'static str {
        match self {
            RecordKind::Workflow => "workflows",
            RecordKind::Recipe => "recipes",
            RecordKind::Tool => "tools",
        }
    }

    /// Origin system of this kind of record.
    pub fn default_source(&self) -> &'static str {
        match self {
            RecordKind::Workflow => "WorkflowHub",
            RecordKind::Recipe => "Bioconda",
            RecordKind::Tool => "RSEC",
        }
    }

    /// Column holding the record identity in status tables.
    pub fn identity_column(&self) -> &'static str {
        self.identity_columns()[0]
    }

    /// Accepted identity column headers, preferred first.
    pub fn identity_columns(&self) -> &'static [&'static str] {
        match self {
            RecordKind::Workflow => &["Link", "link"],
            RecordKind::Recipe => &["package.name", "name", "Name"],
            RecordKind::Tool => &["tool_id", "Tool ID"],
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordKind::Workflow => write!(f, "workflow"),
            RecordKind::Recipe => write!(f, "recipe"),
            RecordKind::Tool => write!(f, "tool"),
        }
    }
}

impl FromStr for RecordKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "workflow" | "workflows" | "workflowhub" => Ok(RecordKind::Workflow),
            "recipe" | "recipes" | "bioconda" => Ok(RecordKind::Recipe),
            "tool" | "tools" | "rsec" => Ok(RecordKind::Tool),
            _ => Err(format!(
                "Unknown record kind: {}. Use workflows, recipes, or tools.",
                s
            )),
        }
    }
}

/// Check level of the filtering cascade, in priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterLevel {
    /// EDAM topics and operations.
    Vocabulary,
    /// Discrete tag/keyword lists.
    KeywordList,
    /// Descriptions and other free text.
    FreeText,
}

impl FilterLevel {
    /// 1-based position in the cascade.
    pub fn number(&self) -> u8 {
        match self {
            FilterLevel::Vocabulary => 1,
            FilterLevel::KeywordList => 2,
            FilterLevel::FreeText => 3,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            FilterLevel::Vocabulary => "Op/Topic EDAM",
            FilterLevel::KeywordList => "Keywords",
            FilterLevel::FreeText => "Description Match",
        }
    }
}

/// A searchable field of a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    EdamTopics,
    EdamOperations,
    Tags,
    BiocontainersKeywords,
    Name,
    Description,
    Summary,
    BiotoolsDescription,
    BiocontainersDescription,
    GalaxyDescription,
}

impl Field {
    /// Stable machine key, used in the TSV `filtered_on` column.
    pub fn key(&self) -> &'static str {
        match self {
            Field::EdamTopics => "EDAM_topics",
            Field::EdamOperations => "EDAM_operation",
            Field::Tags => "tags",
            Field::BiocontainersKeywords => "biocontainers_keywords",
            Field::Name => "name",
            Field::Description => "description",
            Field::Summary => "summary",
            Field::BiotoolsDescription => "biotools_description",
            Field::BiocontainersDescription => "biocontainers_description",
            Field::GalaxyDescription => "galaxy_description",
        }
    }

    /// Human-readable label, used in match reasons.
    pub fn label(&self) -> &'static str {
        match self {
            Field::EdamTopics => "EDAM Topics",
            Field::EdamOperations => "EDAM Operations",
            Field::Tags => "tags",
            Field::BiocontainersKeywords => "BioContainers keywords",
            Field::Name => "name",
            Field::Description => "description",
            Field::Summary => "summary",
            Field::BiotoolsDescription => "bio.tools description",
            Field::BiocontainersDescription => "BioContainers description",
            Field::GalaxyDescription => "Galaxy description",
        }
    }

    /// Cascade level this field is checked at.
    pub fn level(&self) -> FilterLevel {
        match self {
            Field::EdamTopics | Field::EdamOperations => FilterLevel::Vocabulary,
            Field::Tags | Field::BiocontainersKeywords => FilterLevel::KeywordList,
            _ => FilterLevel::FreeText,
        }
    }

    /// Whether the field can stand in as the record's description.
    pub fn is_description(&self) -> bool {
        matches!(
            self,
            Field::Description
                | Field::Summary
                | Field::BiotoolsDescription
                | Field::BiocontainersDescription
                | Field::GalaxyDescription
        )
    }
}

/// Which rule fired, on which field, with which value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchReason {
    pub field: Field,
    pub value: String,
}

impl MatchReason {
    pub fn new(field: Field, value: impl Into<String>) -> Self {
        Self {
            field,
            value: value.into(),
        }
    }

    pub fn level(&self) -> FilterLevel {
        self.field.level()
    }
}

impl fmt::Display for MatchReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} in {}", self.value, self.field.label())
    }
}

/// A discrete list of keywords exposed by a record.
#[derive(Debug, Clone, Copy)]
pub struct KeywordField<'a> {
    pub field: Field,
    pub terms: &'a [String],
}

/// A free-text field exposed by a record.
#[derive(Debug, Clone, Copy)]
pub struct TextField<'a> {
    pub field: Field,
    pub content: &'a str,
}

/// Presence of the RSEC metadata files behind a record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SourcePresence {
    pub biotools: bool,
    pub biocontainers: bool,
    pub galaxy: bool,
}

/// Mutable keep/discard state of a record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordState {
    #[serde(default)]
    pub keep: bool,
    #[serde(default)]
    pub filtered_on: String,
    #[serde(default = "unset_curation_date")]
    pub curation_date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub matched: Option<MatchReason>,
}

impl Default for RecordState {
    fn default() -> Self {
        Self {
            keep: false,
            filtered_on: String::new(),
            curation_date: unset_curation_date(),
            matched: None,
        }
    }
}

fn unset_curation_date() -> String {
    UNSET_CURATION_DATE.to_string()
}

/// Kind-specific metadata behind a record.
#[derive(Debug, Clone, PartialEq)]
pub enum RecordDetails {
    Workflow(Workflow),
    Recipe(Recipe),
    Tool(Tool),
}

/// Serialized form of a record: its metadata with the state merged in.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document<D> {
    #[serde(flatten)]
    pub details: D,
    #[serde(flatten)]
    pub state: RecordState,
}

/// One candidate entity with its searchable fields and keep state.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub details: RecordDetails,
    pub state: RecordState,
}

impl Record {
    /// Wrap metadata with a fresh (undecided) state.
    pub fn new(details: RecordDetails) -> Self {
        Self {
            details,
            state: RecordState::default(),
        }
    }

    pub fn with_state(mut self, state: RecordState) -> Self {
        self.state = state;
        self
    }

    pub fn kind(&self) -> RecordKind {
        match &self.details {
            RecordDetails::Workflow(_) => RecordKind::Workflow,
            RecordDetails::Recipe(_) => RecordKind::Recipe,
            RecordDetails::Tool(_) => RecordKind::Tool,
        }
    }

    /// Identity used to look up curation decisions.
    pub fn id(&self) -> &str {
        match &self.details {
            RecordDetails::Workflow(w) => &w.link,
            RecordDetails::Recipe(r) => &r.package.name,
            RecordDetails::Tool(t) => &t.tool_id,
        }
    }

    pub fn name(&self) -> &str {
        match &self.details {
            RecordDetails::Workflow(w) => &w.name,
            RecordDetails::Recipe(r) => &r.package.name,
            RecordDetails::Tool(t) => {
                if t.biotools_id.is_empty() {
                    &t.tool_id
                } else {
                    &t.biotools_id
                }
            }
        }
    }

    pub fn source(&self) -> &str {
        match &self.details {
            RecordDetails::Workflow(w) if !w.source.is_empty() => &w.source,
            _ => self.kind().default_source(),
        }
    }

    pub fn edam_topics(&self) -> &[String] {
        match &self.details {
            RecordDetails::Workflow(w) => &w.edam_topic,
            RecordDetails::Recipe(_) => &[],
            RecordDetails::Tool(t) => &t.edam_topics,
        }
    }

    pub fn edam_operations(&self) -> &[String] {
        match &self.details {
            RecordDetails::Workflow(w) => &w.edam_operation,
            RecordDetails::Recipe(_) => &[],
            RecordDetails::Tool(t) => &t.edam_operations,
        }
    }

    /// Keyword lists, in check order.
    pub fn keyword_fields(&self) -> Vec<KeywordField<'_>> {
        match &self.details {
            RecordDetails::Workflow(w) => vec![KeywordField {
                field: Field::Tags,
                terms: &w.tags,
            }],
            RecordDetails::Recipe(_) => Vec::new(),
            RecordDetails::Tool(t) => vec![KeywordField {
                field: Field::BiocontainersKeywords,
                terms: &t.biocontainers_keywords,
            }],
        }
    }

    /// Free-text fields, in priority order.
    pub fn text_fields(&self) -> Vec<TextField<'_>> {
        match &self.details {
            RecordDetails::Workflow(w) => vec![
                TextField {
                    field: Field::Name,
                    content: &w.name,
                },
                TextField {
                    field: Field::Description,
                    content: &w.description,
                },
            ],
            RecordDetails::Recipe(r) => vec![
                TextField {
                    field: Field::Description,
                    content: &r.about.description,
                },
                TextField {
                    field: Field::Summary,
                    content: &r.about.summary,
                },
            ],
            RecordDetails::Tool(t) => vec![
                TextField {
                    field: Field::BiotoolsDescription,
                    content: &t.biotools_description,
                },
                TextField {
                    field: Field::BiocontainersDescription,
                    content: &t.biocontainers_description,
                },
                TextField {
                    field: Field::GalaxyDescription,
                    content: &t.galaxy_description,
                },
            ],
        }
    }

    /// First non-empty description by field priority.
    pub fn best_description(&self) -> Option<&str> {
        self.text_fields()
            .into_iter()
            .filter(|t| t.field.is_description())
            .map(|t| t.content.trim())
            .find(|c| !c.is_empty())
    }

    pub fn presence(&self) -> SourcePresence {
        match &self.details {
            RecordDetails::Tool(t) => SourcePresence {
                biotools: t.has_biotools_infos,
                biocontainers: t.has_biocontainers_infos,
                galaxy: t.has_galaxy_infos,
            },
            _ => SourcePresence::default(),
        }
    }

    /// Folder backing the record on disk, if any.
    pub fn storage(&self) -> Option<&Path> {
        match &self.details {
            RecordDetails::Tool(t) => t.folder.as_deref(),
            _ => None,
        }
    }

    pub fn keep(&self) -> bool {
        self.state.keep
    }

    pub fn filtered_on(&self) -> &str {
        &self.state.filtered_on
    }

    pub fn matched(&self) -> Option<&MatchReason> {
        self.state.matched.as_ref()
    }

    /// Full-fidelity JSON document (metadata plus state).
    pub fn to_document(&self) -> Result<Value> {
        let state = self.state.clone();
        let value = match &self.details {
            RecordDetails::Workflow(w) => serde_json::to_value(Document { details: w, state })?,
            RecordDetails::Recipe(r) => serde_json::to_value(Document { details: r, state })?,
            RecordDetails::Tool(t) => serde_json::to_value(Document { details: t, state })?,
        };
        Ok(value)
    }
}

impl From<Workflow> for Record {
    fn from(workflow: Workflow) -> Self {
        Record::new(RecordDetails::Workflow(workflow))
    }
}

impl From<Recipe> for Record {
    fn from(recipe: Recipe) -> Self {
        Record::new(RecordDetails::Recipe(recipe))
    }
}

impl From<Tool> for Record {
    fn from(tool: Tool) -> Self {
        Record::new(RecordDetails::Tool(tool))
    }
}

impl From<Document<Workflow>> for Record {
    fn from(doc: Document<Workflow>) -> Self {
        Record::from(doc.details).with_state(doc.state)
    }
}

impl From<Document<Recipe>> for Record {
    fn from(doc: Document<Recipe>) -> Self {
        Record::from(doc.details).with_state(doc.state)
    }
}

impl From<Document<Tool>> for Record {
    fn from(doc: Document<Tool>) -> Self {
        Record::from(doc.details).with_state(doc.state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_match_reason_display() {
        let reason = MatchReason::new(Field::EdamTopics, "Metagenomics");
        assert_eq!(reason.to_string(), "Metagenomics in EDAM Topics");
        assert_eq!(reason.level(), FilterLevel::Vocabulary);

        let reason = MatchReason::new(Field::BiotoolsDescription, "OTU");
        assert_eq!(reason.to_string(), "OTU in bio.tools description");
        assert_eq!(reason.level().number(), 3);
    }

    #[test]
    fn test_record_kind_parse() {
        assert_eq!("workflows".parse::<RecordKind>(), Ok(RecordKind::Workflow));
        assert_eq!("Bioconda".parse::<RecordKind>(), Ok(RecordKind::Recipe));
        assert_eq!("tools".parse::<RecordKind>(), Ok(RecordKind::Tool));
        assert!("galaxy".parse::<RecordKind>().is_err());
    }

    #[test]
    fn test_default_state() {
        let state = RecordState::default();
        assert!(!state.keep);
        assert!(state.filtered_on.is_empty());
        assert_eq!(state.curation_date, UNSET_CURATION_DATE);
    }

    #[test]
    fn test_state_deserializes_with_defaults() {
        let state: RecordState = serde_json::from_str("{}").unwrap();
        assert_eq!(state, RecordState::default());
    }

    #[test]
    fn test_field_levels() {
        assert_eq!(Field::EdamOperations.level(), FilterLevel::Vocabulary);
        assert_eq!(Field::Tags.level(), FilterLevel::KeywordList);
        assert_eq!(Field::GalaxyDescription.level(), FilterLevel::FreeText);
        assert!(!Field::Name.is_description());
        assert!(Field::Summary.is_description());
    }
}

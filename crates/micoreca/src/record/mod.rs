//! Candidate records: workflows, recipes and tools behind one searchable view.

mod model;
mod recipe;
mod tool;
mod workflow;

pub use model::{
    Document, Field, FilterLevel, KeywordField, MatchReason, Record, RecordDetails, RecordKind,
    RecordState, SourcePresence, TextField, UNSET_CURATION_DATE,
};
pub use recipe::{Recipe, RecipeAbout, RecipePackage};
pub use tool::Tool;
pub use workflow::{
    normalize_date, shorten_tool_id, Workflow, WorkflowHubAttributes, WorkflowHubData,
    WorkflowHubResponse, WorkflowId,
};

use serde::{Deserialize, Deserializer};

/// Treat an explicit `null` like a missing field.
pub(crate) fn nullable<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

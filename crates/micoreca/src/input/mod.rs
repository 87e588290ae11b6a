//! Loading metadata into record batches.

mod loader;

pub use loader::{
    load, load_excluding_outputs, load_exported, load_recipes, load_tools,
    load_workflowhub_responses, load_workflows, LoadedBatch, ParseFailure,
};

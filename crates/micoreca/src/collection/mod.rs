//! Batch orchestration: filtering, curation, exports and pruning.

mod batch;
mod export;
mod prune;
mod usage;

pub use batch::{Collection, CurateOutcome, FilterCounts, FilterOutcome};
pub use export::{
    write_details_tsv, write_json, write_records_json, write_report, write_status_table,
    write_summary_tsv, OutputPaths, MISSING, TOOL_OUTPUT_DIR,
};
pub use prune::{DeletionFailure, DeletionMode, DeletionPlan, DeletionReport};
pub use usage::tool_usage;

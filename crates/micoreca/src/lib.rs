//! micoreca: microbiome-related workflow, recipe and tool curation.
//!
//! micoreca filters catalogs of WorkflowHub workflows, Bioconda recipes and
//! RSEC tool folders against curated EDAM terms and keywords, then merges
//! the result with a human-edited status table.
//!
//! # Core Principles
//!
//! - **First match wins**: EDAM terms, then keyword lists, then free text
//! - **Curators decide**: a stored `keep=true` is never re-evaluated
//! - **Nothing is deleted by default**: pruning is a separate, opt-in step
//!
//! # Example
//!
//! ```no_run
//! use micoreca::{input, CurationStatus, KeywordRuleSet, MatchEngine, OutputPaths, RecordKind};
//!
//! let rules = KeywordRuleSet::load("keywords.yml").unwrap();
//! let engine = MatchEngine::new(rules);
//! let status = CurationStatus::load("workflows_status.tsv", RecordKind::Workflow);
//!
//! let batch = input::load_workflows("workflows.json").unwrap();
//! let outcome = batch.collection.filter(&engine, &status);
//! outcome.write_all(&OutputPaths::new("results", RecordKind::Workflow)).unwrap();
//!
//! println!("Kept: {}", outcome.counts.kept());
//! ```

pub mod collection;
pub mod curation;
pub mod error;
pub mod input;
pub mod matching;
pub mod record;
pub mod rules;

pub use collection::{
    Collection, CurateOutcome, DeletionMode, DeletionPlan, DeletionReport, FilterCounts,
    FilterOutcome, OutputPaths,
};
pub use curation::{CurationStatus, StatusEntry};
pub use error::{MicorecaError, Result};
pub use input::{LoadedBatch, ParseFailure};
pub use matching::MatchEngine;
pub use record::{Field, FilterLevel, MatchReason, Record, RecordKind, RecordState};
pub use rules::{KeywordConfig, KeywordRuleSet};

//! CLI argument definitions using clap.

use clap::{Parser, Subcommand};
use micoreca::RecordKind;
use std::path::PathBuf;

/// micoreca: filter and curate microbiome-related workflows, recipes and tools
#[derive(Parser)]
#[command(name = "micoreca")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Filter records against keyword and EDAM criteria
    Filter {
        /// Workflow/recipe JSON array, or RSEC root folder for tools
        #[arg(value_name = "INPUT")]
        input: PathBuf,

        /// Kind of records: workflows, recipes or tools
        #[arg(short, long)]
        kind: RecordKind,

        /// Keyword configuration (YAML)
        #[arg(long, value_name = "YAML")]
        keywords: PathBuf,

        /// Curation status table, read then rewritten (default: <output-dir>/<kind>_status.tsv)
        #[arg(short, long, value_name = "TSV")]
        status: Option<PathBuf>,

        /// Output directory (default: current directory, or <INPUT>/infos for tools)
        #[arg(short, long)]
        output_dir: Option<PathBuf>,

        /// Delete the folders of discarded tools instead of writing a dry-run plan
        #[arg(long)]
        commit: bool,
    },

    /// Apply curator decisions to a filtered JSON export
    Curate {
        /// JSON array written by `filter`
        #[arg(value_name = "INPUT")]
        input: PathBuf,

        /// Kind of records: workflows, recipes or tools
        #[arg(short, long)]
        kind: RecordKind,

        /// Curation status table
        #[arg(short, long, value_name = "TSV")]
        status: PathBuf,

        /// Output directory (default: current directory)
        #[arg(short, long)]
        output_dir: Option<PathBuf>,
    },

    /// Show the compiled filtering criteria
    Criteria {
        /// Keyword configuration (YAML)
        #[arg(value_name = "YAML")]
        keywords: PathBuf,
    },

    /// Map tools to the workflows that use them
    ToolUsage {
        /// Workflow JSON array
        #[arg(value_name = "WORKFLOWS_JSON")]
        workflows: PathBuf,

        /// Output JSON path
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Convert saved WorkflowHub API responses into the workflow JSON format
    ImportWorkflowhub {
        /// JSON array of `/workflows/{id}` responses
        #[arg(value_name = "RESPONSES_JSON")]
        responses: PathBuf,

        /// Output JSON path
        #[arg(short, long)]
        output: PathBuf,

        /// Hub name, used for the link host
        #[arg(long, default_value = "WorkflowHub")]
        source: String,
    },
}

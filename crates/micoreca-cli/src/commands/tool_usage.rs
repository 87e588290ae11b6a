//! Tool-usage command - which workflows use which tools.

use std::path::PathBuf;

use colored::Colorize;
use micoreca::collection::{tool_usage, write_json};
use micoreca::input;

use super::print_failures;

pub fn run(
    workflows: PathBuf,
    output: PathBuf,
    verbose: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let batch = input::load_workflows(&workflows)?;
    print_failures(&batch.failures, verbose);

    let usage = tool_usage(batch.collection.records());
    write_json(&usage, &output)?;

    println!(
        "{} {} tools used by {} workflows, written to {}",
        "Tool usage:".cyan().bold(),
        usage.len(),
        batch.collection.len(),
        output.display()
    );
    Ok(())
}

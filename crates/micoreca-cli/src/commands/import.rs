//! Import command - WorkflowHub API responses to the workflow JSON format.

use std::path::PathBuf;

use colored::Colorize;
use micoreca::collection::write_json;
use micoreca::input;

use super::print_failures;

pub fn run(
    responses: PathBuf,
    output: PathBuf,
    source: String,
    verbose: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let (workflows, failures) = input::load_workflowhub_responses(&responses, &source)?;
    print_failures(&failures, verbose);

    write_json(&workflows, &output)?;

    println!(
        "{} {} workflows from {} written to {}",
        "Imported".cyan().bold(),
        workflows.len(),
        source,
        output.display()
    );
    Ok(())
}

//! Curate command - apply curator decisions to a filtered export.

use std::path::PathBuf;

use colored::Colorize;
use micoreca::{input, CurationStatus, OutputPaths, RecordKind};

use super::print_failures;

pub fn run(
    input_path: PathBuf,
    kind: RecordKind,
    status_path: PathBuf,
    output_dir: Option<PathBuf>,
    verbose: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let status = CurationStatus::load(&status_path, kind);
    if status.is_empty() {
        println!(
            "{} no curation decisions in {}; keeping current decisions",
            "Warning:".yellow().bold(),
            status_path.display()
        );
    }

    let batch = input::load_exported(kind, &input_path)?;
    print_failures(&batch.failures, verbose);

    let paths = OutputPaths::new(output_dir.unwrap_or_else(|| PathBuf::from(".")), kind);
    let outcome = batch.collection.curate(&status);
    outcome.write_all(&paths)?;

    println!(
        "{} {} kept, {} dropped",
        "Curated:".cyan().bold(),
        outcome.kept.len().to_string().green(),
        outcome.dropped.len().to_string().red()
    );
    if verbose {
        for record in &outcome.dropped {
            println!("  {} {}", "-".red(), record.id());
        }
    }
    println!("{} {}", "Curated records:".green().bold(), paths.curated_json.display());

    Ok(())
}

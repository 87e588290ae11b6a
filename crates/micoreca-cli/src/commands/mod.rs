//! CLI command implementations.

pub mod criteria;
pub mod curate;
pub mod filter;
pub mod import;
pub mod tool_usage;

use colored::Colorize;
use micoreca::ParseFailure;

/// Print skipped entries; all of them with `verbose`, else a count.
pub(crate) fn print_failures(failures: &[ParseFailure], verbose: bool) {
    if failures.is_empty() {
        return;
    }
    println!(
        "{} {} malformed entr{} skipped",
        "Warning:".yellow().bold(),
        failures.len(),
        if failures.len() == 1 { "y" } else { "ies" }
    );
    if verbose {
        for failure in failures {
            let origin = failure.origin.as_deref().unwrap_or("-");
            println!("  #{} {}: {}", failure.index, origin.dimmed(), failure.message);
        }
    }
}

//! Filter command - run the matching cascade over a batch.

use std::path::PathBuf;

use colored::Colorize;
use log::warn;
use micoreca::{
    input, CurationStatus, DeletionMode, DeletionPlan, FilterCounts, KeywordRuleSet, MatchEngine,
    OutputPaths, RecordKind,
};

use super::print_failures;

pub fn run(
    input_path: PathBuf,
    kind: RecordKind,
    keywords: PathBuf,
    status: Option<PathBuf>,
    output_dir: Option<PathBuf>,
    commit: bool,
    verbose: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    // Rules first: a bad configuration aborts before any input is read.
    let rules = KeywordRuleSet::load(&keywords)?;
    let summary = rules.summary();
    println!(
        "{} {} topics, {} operations, {} keywords, {} strict terms",
        "Criteria:".cyan().bold(),
        summary.topics,
        summary.operations,
        summary.fragments,
        summary.strict_terms
    );

    let mut paths = match (&output_dir, kind) {
        (Some(dir), _) => OutputPaths::new(dir, kind),
        (None, RecordKind::Tool) => OutputPaths::for_tools(&input_path),
        (None, _) => OutputPaths::new(".", kind),
    };
    if let Some(status) = status {
        paths.status_table = status;
    }
    let status = CurationStatus::load(&paths.status_table, kind);

    let batch = input::load_excluding_outputs(kind, &input_path, &paths)?;
    print_failures(&batch.failures, verbose);

    println!(
        "{} {} {} from {}",
        "Filtering".cyan().bold(),
        batch.collection.len(),
        kind.plural(),
        input_path.display().to_string().white()
    );

    let outcome = batch.collection.filter(&MatchEngine::new(rules), &status);
    outcome.write_all(&paths)?;
    print_counts(&outcome.counts);

    if kind == RecordKind::Tool {
        let plan = DeletionPlan::new(&input_path, &outcome.discarded)
            .protect(paths.files().into_iter().chain([keywords.as_path()]));
        if commit {
            let report = plan.execute(DeletionMode::Commit);
            println!(
                "{} {} folder(s) deleted",
                "Pruned:".red().bold(),
                report.deleted.len()
            );
            for failure in &report.failures {
                println!("  {} {}: {}", "✗".red(), failure.path.display(), failure.message);
            }
        } else {
            plan.write(&paths.deletion_plan)?;
            println!(
                "{} {} folder(s) would be deleted; plan written to {} (rerun with --commit to delete)",
                "Dry run:".yellow().bold(),
                plan.folders().len(),
                paths.deletion_plan.display()
            );
            if verbose {
                print!("{}", plan.render());
            }
        }
    } else if commit {
        warn!("--commit only applies to tool folders; nothing deleted");
    }

    println!();
    println!("{} {}", "Kept records:".green().bold(), paths.kept_json.display());
    println!("{} {}", "Summary:".green().bold(), paths.summary_tsv.display());
    println!("{} {}", "Full table:".green().bold(), paths.details_tsv.display());
    println!("{} {}", "Status table:".green().bold(), paths.status_table.display());

    Ok(())
}

fn print_counts(counts: &FilterCounts) {
    println!();
    println!("{}", "Results:".yellow().bold());
    println!("  Total:            {}", counts.total.to_string().white());
    println!("  Filter 1 (EDAM):  {}", counts.validated_filter_1.to_string().green());
    println!("  Filter 2 (tags):  {}", counts.validated_filter_2.to_string().green());
    println!("  Filter 3 (text):  {}", counts.validated_filter_3.to_string().green());
    println!("  Curated keep:     {}", counts.kept_by_curation.to_string().blue());
    println!("  No match:         {}", counts.did_not_pass_any.to_string().red());
}

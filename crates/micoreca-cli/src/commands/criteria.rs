//! Criteria command - show what a keyword configuration compiles to.

use std::path::PathBuf;

use colored::Colorize;
use micoreca::KeywordRuleSet;

pub fn run(keywords: PathBuf, verbose: bool) -> Result<(), Box<dyn std::error::Error>> {
    let rules = KeywordRuleSet::load(&keywords)?;
    let summary = rules.summary();

    println!(
        "{} {}",
        "Criteria from".cyan().bold(),
        keywords.display().to_string().white()
    );
    println!();

    println!("{} ({})", "EDAM topics:".yellow().bold(), summary.topics);
    for topic in rules.target_topics() {
        println!("  {}", topic);
    }
    println!("{} ({})", "EDAM operations:".yellow().bold(), summary.operations);
    for operation in rules.target_operations() {
        println!("  {}", operation);
    }
    println!("{} ({})", "Strict terms:".yellow().bold(), summary.strict_terms);
    for strict in rules.strict_terms() {
        println!("  {}", strict.term.green());
    }
    println!("{} ({})", "Keyword patterns:".yellow().bold(), summary.fragments);
    if verbose {
        for pattern in rules.fragment_patterns() {
            println!("  {}", pattern.as_str().dimmed());
        }
    }

    if rules.is_empty() {
        println!();
        println!("{} no criteria defined; every record will be discarded", "Warning:".yellow().bold());
    }

    Ok(())
}

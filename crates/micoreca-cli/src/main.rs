//! micoreca CLI - keyword-based catalog filtering and curation.

mod cli;
mod commands;

use clap::Parser;
use cli::{Cli, Commands};

/// Configures the logging system; `RUST_LOG` overrides the default level.
fn setup_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format(|buf, record| {
            use std::io::Write;

            match record.level() {
                log::Level::Warn | log::Level::Error => {
                    writeln!(buf, "[{}] {}", record.level(), record.args())
                }
                _ => writeln!(buf, "{}", record.args()),
            }
        })
        .init();
}

fn main() {
    let cli = Cli::parse();
    setup_logging(cli.verbose);

    let result = match cli.command {
        Commands::Filter {
            input,
            kind,
            keywords,
            status,
            output_dir,
            commit,
        } => commands::filter::run(input, kind, keywords, status, output_dir, commit, cli.verbose),

        Commands::Curate {
            input,
            kind,
            status,
            output_dir,
        } => commands::curate::run(input, kind, status, output_dir, cli.verbose),

        Commands::Criteria { keywords } => commands::criteria::run(keywords, cli.verbose),

        Commands::ToolUsage { workflows, output } => {
            commands::tool_usage::run(workflows, output, cli.verbose)
        }

        Commands::ImportWorkflowhub {
            responses,
            output,
            source,
        } => commands::import::run(responses, output, source, cli.verbose),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

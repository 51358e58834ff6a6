use anyhow::Context;
use clap::Parser;
use std::process;
use tmax_merge::cli::Args;
use tmax_merge::logging::setup_logging;
use tmax_merge::models::ProcessingStats;
use tmax_merge::processor::{StateMerger, print_summary};

fn main() {
    let args = Args::parse();
    if let Err(error) = setup_logging(&args) {
        eprintln!("Error: {}", error);
        process::exit(1);
    }

    match run(&args) {
        Ok(stats) => {
            if args.show_progress() {
                print_summary(&stats);
            }
            process::exit(0);
        }
        Err(error) => {
            eprintln!("Error: {:#}", error);
            process::exit(1);
        }
    }
}

fn run(args: &Args) -> anyhow::Result<ProcessingStats> {
    args.validate().context("Invalid arguments")?;

    let merger = StateMerger::new(args.data_path.clone(), args.to_config())
        .context("Failed to prepare merge")?;

    merger
        .run()
        .with_context(|| format!("Failed to merge {}", args.data_path.display()))
}

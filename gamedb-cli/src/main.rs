//! gamedb CLI
//!
//! Converts an upstream GameIndex document to the current schema and merges
//! it with the original-schema reference and local override documents.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;

use gamedb_merge::{LogProgress, MergeOptions, MergeReport, run};

#[derive(Parser)]
#[command(name = "gamedb")]
#[command(about = "Convert and merge GameDB compatibility databases", long_about = None)]
struct Cli {
    /// Path to the upstream GameIndex.yaml to convert and merge
    input: PathBuf,
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp(None)
        .format_target(false)
        .init();

    let cli = Cli::parse();
    let options = MergeOptions::new(cli.input);

    match run(&options, &LogProgress) {
        Ok(report) => {
            print_report(&report);
            ExitCode::SUCCESS
        }
        Err(e) => {
            log::error!(
                "{} {}",
                "\u{2718}".if_supports_color(Stdout, |t| t.red()),
                e,
            );
            log::error!("Usage: gamedb <GameIndex.yaml>");
            ExitCode::FAILURE
        }
    }
}

fn print_report(report: &MergeReport) {
    log::info!(
        "{}",
        "Merge summary:".if_supports_color(Stdout, |t| t.bold()),
    );
    log::info!(
        "  Converted: {} entries, Merged: {} entries",
        report.converted_entries,
        report.merged_entries,
    );
    log::info!(
        "  Upgrade pass: {} blocks added, {} modes migrated, {} flags added, {} corrections",
        report.upgrade.blocks_added,
        report.upgrade.modes_migrated,
        report.upgrade.flags_added,
        report.upgrade.corrections_applied,
    );
    if report.upgrade.review_mismatches > 0 {
        log::warn!(
            "  {} name/region mismatches kept for review",
            report.upgrade.review_mismatches,
        );
    }
    log::info!(
        "  Final pass: {} corrections applied to merged entries",
        report.finalize.corrections_applied,
    );
}

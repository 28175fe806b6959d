use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use originals_sdk::verify as verify_log;

use crate::output;

/// `originals-cel verify --log <path>`
///
/// Prints a per-event ✅/❌ breakdown to stdout and returns the process exit
/// code: 0 if the log verified, 1 if it did not (or parsing/IO failed).
pub fn run(log_path: PathBuf) -> Result<ExitCode> {
    let log = output::read_log(&log_path)?;
    let result = verify_log(&log)?;

    for event in &result.events {
        let marker = if event.proof_valid && event.chain_valid { "\u{2705}" } else { "\u{274c}" };
        println!("{marker} event {} ({:?})", event.index, event.event_type);
        for error in &event.errors {
            println!("    - {error}");
        }
    }
    for error in &result.errors {
        println!("\u{274c} {error}");
    }

    if result.verified {
        println!("verified");
        Ok(ExitCode::SUCCESS)
    } else {
        println!("not verified");
        Ok(ExitCode::FAILURE)
    }
}

use std::path::PathBuf;

use anyhow::Result;
use originals_sdk::{current_state, verify as verify_log};

use crate::output;

/// `originals-cel inspect --log <path>`
///
/// Prints the asset's current state plus a verification summary as JSON.
pub fn run(log_path: PathBuf) -> Result<()> {
    let log = output::read_log(&log_path)?;
    let state = current_state(&log);
    let verification = verify_log(&log)?;

    let witness_attestations: Vec<_> = log
        .events
        .iter()
        .flat_map(|e| e.proof.iter().skip(1))
        .collect();

    let summary = serde_json::json!({
        "state": state,
        "verified": verification.verified,
        "eventCount": log.events.len(),
        "witnessAttestationCount": witness_attestations.len(),
    });
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}

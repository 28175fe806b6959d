//! `originals-cel`: create, verify, inspect, and migrate Cryptographic Event
//! Logs from the command line.
//!
//! A thin `clap`-derived parser over the `originals-sdk` facade; it owns no
//! business logic of its own — each subcommand builds a `Config` or an
//! inscriber and delegates immediately.

mod commands;
mod keys;
mod output;
mod wallet;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use crate::commands::migrate::Target as MigrateTarget;
use crate::output::Format;

#[derive(Parser)]
#[command(name = "originals-cel", about = "Create, verify, inspect, and migrate Cryptographic Event Logs")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Begin a new asset log at the `did:peer` layer.
    Create {
        /// Human-readable asset name recorded in the create event.
        #[arg(long)]
        name: String,
        /// File whose content is referenced as the asset's sole resource.
        #[arg(long)]
        file: PathBuf,
        /// Signing key file. Without this, a fresh keypair is generated and
        /// printed to stderr.
        #[arg(long)]
        key: Option<PathBuf>,
        /// Where to write the log. Without this, writes to stdout.
        #[arg(long)]
        output: Option<PathBuf>,
        #[arg(long, value_enum, default_value = "json")]
        format: Format,
    },
    /// Verify every proof and hash-chain link in a log.
    Verify {
        /// Path to the CEL-JSON or CEL-CBOR log file.
        #[arg(long)]
        log: PathBuf,
    },
    /// Print a log's current state and verification summary.
    Inspect {
        /// Path to the CEL-JSON or CEL-CBOR log file.
        #[arg(long)]
        log: PathBuf,
    },
    /// Migrate a log to the next layer (`webvh` or `btco`).
    Migrate {
        /// Path to the CEL-JSON or CEL-CBOR log file.
        #[arg(long)]
        log: PathBuf,
        /// Target layer.
        #[arg(long, value_enum)]
        to: MigrateTarget,
        /// Domain to publish under. Required for `--to webvh`.
        #[arg(long)]
        domain: Option<String>,
        /// Local signing wallet file. Required for `--to btco`.
        #[arg(long)]
        wallet: Option<PathBuf>,
        /// Where to write the migrated log. Without this, writes to stdout.
        #[arg(long)]
        output: Option<PathBuf>,
        #[arg(long, value_enum, default_value = "json")]
        format: Format,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Create { name, file, key, output, format } => {
            commands::create::run(name, file, key, output, format).await.map(|()| ExitCode::SUCCESS)
        }
        Command::Verify { log } => commands::verify::run(log),
        Command::Inspect { log } => commands::inspect::run(log).map(|()| ExitCode::SUCCESS),
        Command::Migrate { log, to, domain, wallet, output, format } => {
            commands::migrate::run(log, to, domain, wallet, output, format).await.map(|()| ExitCode::SUCCESS)
        }
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

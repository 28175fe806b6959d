//! Shared output formatting for commands that emit an [`EventLog`].

use std::fs;
use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use clap::ValueEnum;
use originals_sdk::EventLog;

/// Wire format an emitted log is encoded in.
#[derive(Clone, Copy, Debug, ValueEnum)]
#[value(rename_all = "lowercase")]
pub enum Format {
    /// Pretty-printed JSON, sorted keys at every depth.
    Json,
    /// Deterministic CBOR.
    Cbor,
}

/// Serialize `log` per `format` and write it to `output`, or stdout if
/// `output` is `None`.
pub fn emit(log: &EventLog, format: Format, output: Option<&Path>) -> Result<()> {
    let bytes = match format {
        Format::Json => {
            // `serde_json::Value`'s `Map` is a `BTreeMap` (the `preserve_order`
            // feature is not enabled anywhere in this workspace), so
            // round-tripping through `Value` sorts keys at every depth for
            // free before pretty-printing.
            let value = serde_json::to_value(log).context("serializing log")?;
            let mut pretty =
                serde_json::to_string_pretty(&value).context("pretty-printing log")?;
            pretty.push('\n');
            pretty.into_bytes()
        }
        Format::Cbor => originals_codec::encode_cbor(log).context("encoding log as cbor")?,
    };

    match output {
        Some(path) => {
            fs::write(path, &bytes).with_context(|| format!("writing {}", path.display()))
        }
        None => std::io::stdout().write_all(&bytes).context("writing to stdout"),
    }
}

/// Read and parse a CEL-JSON or CEL-CBOR log from `path`, detecting the
/// format by extension (`.cbor` is CBOR; anything else is treated as JSON).
pub fn read_log(path: &Path) -> Result<EventLog> {
    let bytes = fs::read(path).with_context(|| format!("reading log file {}", path.display()))?;
    if path.extension().is_some_and(|ext| ext == "cbor") {
        originals_codec::decode_cbor(&bytes).context("parsing log as cbor")
    } else {
        serde_json::from_slice(&bytes).context("parsing log as json")
    }
}

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use originals_sdk::{Config, EphemeralSigner, MemoryStorage};

use crate::keys;
use crate::output::{self, Format};

/// `originals-cel create --name <name> --file <path> [--key <path>] [--output <path>] [--format json|cbor]`
pub async fn run(
    name: String, file: PathBuf, key: Option<PathBuf>, output_path: Option<PathBuf>,
    format: Format,
) -> Result<()> {
    let signer = match &key {
        Some(path) => keys::load(path)?,
        None => keys::generate_and_report(),
    };

    let resource = resource_reference(&file)?;
    let config: Config<EphemeralSigner, MemoryStorage> =
        Config::new("cli:create", signer, MemoryStorage::new());

    let log = config.create_asset(&name, vec![resource], "did:cli:local").await?;
    output::emit(&log, format, output_path.as_deref())
}

fn resource_reference(file: &Path) -> Result<serde_json::Value> {
    let bytes =
        fs::read(file).with_context(|| format!("reading resource file {}", file.display()))?;
    let digest = originals_sdk::digest_bytes(&bytes);
    let media_type = media_type_for(file);
    Ok(serde_json::json!({"digest": digest.as_str(), "mediaType": media_type}))
}

fn media_type_for(file: &Path) -> &'static str {
    match file.extension().and_then(|e| e.to_str()) {
        Some("json") => "application/json",
        Some("txt" | "md") => "text/plain",
        Some("png") => "image/png",
        Some("jpg" | "jpeg") => "image/jpeg",
        _ => "application/octet-stream",
    }
}

//! Key file parsing and fresh-keypair generation for `create`.

use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};
use originals_sdk::{EphemeralSigner, KeyType, Multikey};

/// Load a signing key from `path`. Accepts either a raw multibase Ed25519
/// private key (a string starting `z`) or a JSON object
/// `{"privateKey": "z..."}`. Any other content is rejected.
pub fn load(path: &Path) -> Result<EphemeralSigner> {
    let content =
        fs::read_to_string(path).with_context(|| format!("reading key file {}", path.display()))?;
    let trimmed = content.trim();

    let multikey_str = if trimmed.starts_with('z') {
        trimmed.to_string()
    } else if trimmed.starts_with('{') {
        let parsed: serde_json::Value =
            serde_json::from_str(trimmed).context("key file is not valid JSON")?;
        parsed
            .get("privateKey")
            .and_then(|v| v.as_str())
            .map(str::to_string)
            .context("key file JSON must have a string \"privateKey\" field")?
    } else {
        bail!(
            "key file must be a multibase private key (starting 'z') or {{\"privateKey\": \"z...\"}}"
        );
    };

    let multikey = Multikey::from(multikey_str);
    let raw = multikey
        .decode(KeyType::Ed25519Private)
        .context("key file does not contain an Ed25519 private key")?;
    let bytes: [u8; 32] =
        raw.try_into().map_err(|_| anyhow::anyhow!("private key must be 32 bytes"))?;
    Ok(EphemeralSigner::from_bytes(&bytes))
}

/// Generate a fresh Ed25519 keypair and print both keys to stderr, never
/// stdout, so piping `create`'s stdout to a file never leaks the private key.
pub fn generate_and_report() -> EphemeralSigner {
    let signer = EphemeralSigner::generate();
    eprintln!("generated signing key (keep this secret): {}", signer.private_key_multikey());
    eprintln!("public key: {}", signer.public_key_multikey());
    signer
}

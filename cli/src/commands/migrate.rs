use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::ValueEnum;
use originals_sdk::{Config, EphemeralSigner, MemoryStorage};

use crate::keys;
use crate::output::{self, Format};
use crate::wallet::LocalInscriber;

/// The layer a log is migrated to. `did:peer` is never a migration target —
/// it's only ever the starting layer a log is created at.
#[derive(Clone, Copy, Debug, ValueEnum)]
#[value(rename_all = "lowercase")]
pub enum Target {
    Webvh,
    Btco,
}

/// `originals-cel migrate --log <path> --to webvh|btco [--domain ...] [--wallet ...] [--output ...] [--format ...]`
///
/// The migration event is signed by a freshly generated Ed25519 keypair,
/// printed to stderr exactly as `create`'s does when run without `--key` —
/// there is no `--key` flag here because the external surface doesn't carry
/// a persistent keystore; a controller who needs continuity across
/// migrations should drive this through `originals-sdk` directly instead.
pub async fn run(
    log_path: PathBuf, to: Target, domain: Option<String>, wallet: Option<PathBuf>,
    output_path: Option<PathBuf>, format: Format,
) -> Result<()> {
    let log = output::read_log(&log_path)?;
    let signer = keys::generate_and_report();

    let migrated = match to {
        Target::Webvh => {
            let domain = domain.context("--to webvh requires --domain")?;
            let config: Config<EphemeralSigner, MemoryStorage> =
                Config::new("cli:migrate", signer, MemoryStorage::new());
            config.publish(&log, &domain).await?
        }
        Target::Btco => {
            let wallet_path = wallet.context("--to btco requires --wallet")?;
            let inscriber = LocalInscriber::load(&wallet_path)?;
            let request = inscriber.request_template();
            originals_did::btco::migrate(&log, &inscriber, request, &signer).await?
        }
    };

    output::emit(&migrated, format, output_path.as_deref())
}

//! Layer managers implementing the peer → webvh → btco identifier lifecycle.
//!
//! Migration between layers is monotone (`peer < webvh < btco`) and `btco`
//! is terminal; attempting to skip or revert a layer, or to migrate to the
//! current layer, is rejected before any side effect runs.

pub mod btco;
pub mod peer;
pub mod webvh;

use originals_cel::Layer;
use thiserror::Error;

/// Errors raised by layer managers.
#[derive(Debug, Error)]
pub enum LayerError {
    /// Attempted to migrate to a layer that does not directly follow the
    /// current one (e.g. peer → btco, or webvh → peer).
    #[error("invalid migration path: {0}")]
    InvalidMigrationPath(String),

    /// Attempted to migrate to the layer the asset is already at.
    #[error("asset is already at the {0:?} layer")]
    NoOpMigration(Layer),

    /// Underlying CEL construction failed.
    #[error(transparent)]
    Cel(#[from] originals_cel::CelError),

    /// Canonicalization/digest failed.
    #[error(transparent)]
    Codec(#[from] originals_codec::CodecError),

    /// A storage or inscription side effect failed.
    #[error(transparent)]
    Io(#[from] anyhow::Error),
}

/// Result alias for layer manager operations.
pub type Result<T> = std::result::Result<T, LayerError>;

fn require_layer(current: Layer, expected: Layer) -> Result<()> {
    if current == expected {
        return Ok(());
    }
    Err(LayerError::InvalidMigrationPath(format!(
        "must be at {expected:?} layer to perform this migration, found {current:?}"
    )))
}

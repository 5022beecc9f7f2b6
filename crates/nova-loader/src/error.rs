//! Error types for loading snapshots.

use std::io;
use std::path::PathBuf;

use nova_core::{BlockError, BlockIndex};
use nova_products::{CodecError, ProductsError};
use thiserror::Error;

/// Why conserved-to-primitive recovery failed in one zone.
#[derive(Clone, Copy, Debug, PartialEq, Error)]
pub enum RecoveryFailure {
    /// Lab-frame mass density is negative.
    #[error("negative lab-frame density {0}")]
    NegativeDensity(f64),

    /// Energy density is negative.
    #[error("negative energy density {0}")]
    NegativeEnergy(f64),

    /// The pressure root finder did not converge.
    #[error("root finder did not converge after {iterations} iterations")]
    RootFinderFailed {
        /// Iterations performed.
        iterations: usize,
    },
}

/// Recovery failed for a specific zone of a specific block.
#[derive(Clone, Debug, PartialEq, Error)]
#[error("primitive recovery failed in block {block} zone {zone:?}: {failure}")]
pub struct RecoveryError {
    /// The block containing the zone.
    pub block: BlockIndex,
    /// `(radial, polar)` zone within the block.
    pub zone: (usize, usize),
    /// What went wrong.
    pub failure: RecoveryFailure,
}

/// Errors loading, converting, or writing snapshots.
#[derive(Debug, Error)]
pub enum LoadError {
    /// A file could not be opened, read, or written.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// A file could not be decoded or encoded.
    #[error(transparent)]
    Codec(#[from] CodecError),

    /// Converted blocks did not form valid products.
    #[error(transparent)]
    Products(#[from] ProductsError),

    /// A recovered block could not be assembled.
    #[error(transparent)]
    Block(#[from] BlockError),

    /// Conserved-to-primitive recovery failed.
    #[error(transparent)]
    Recovery(#[from] RecoveryError),
}

/// Writing the products cache failed.
///
/// Non-fatal: [`SnapshotCache::load`](crate::SnapshotCache::load) logs it
/// and still returns the snapshot it built.
#[derive(Debug, Error)]
#[error("failed to write products cache {}: {source}", path.display())]
pub struct CacheWriteError {
    /// The cache path that was being written.
    pub path: PathBuf,
    /// The underlying failure.
    #[source]
    pub source: LoadError,
}

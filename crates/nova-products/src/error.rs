//! Error types for building and decoding products.

use std::io;

use nova_core::{BlockError, BlockIndex, ConfigError, ShapeMismatchError};
use thiserror::Error;

use crate::codec::FileKind;

/// Structural problems assembling a [`Products`](crate::Products).
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ProductsError {
    /// Two blocks were supplied with the same index.
    #[error("duplicate block {index}")]
    DuplicateBlock {
        /// The repeated index.
        index: BlockIndex,
    },

    /// A block's polar zone count differs from others in its polar row.
    #[error("block {index} has {found} polar zones but its row has {expected}")]
    InconsistentPolarLayout {
        /// The offending block.
        index: BlockIndex,
        /// Polar zone count of the first block in the row.
        expected: usize,
        /// Polar zone count of the offending block.
        found: usize,
    },

    /// A synthetic block could not be assembled.
    #[error(transparent)]
    Block(#[from] BlockError),
}

/// Errors reading or writing the binary products format.
#[derive(Debug, Error)]
pub enum CodecError {
    /// An I/O error occurred during read or write.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The file does not start with `b"NOVA"`.
    #[error("invalid magic bytes (expected b\"NOVA\")")]
    InvalidMagic,

    /// The format version is not supported by this build.
    #[error("unsupported format version {found}")]
    UnsupportedVersion {
        /// The version found in the file.
        found: u8,
    },

    /// The file holds a different kind of data than requested.
    #[error("expected a {expected} file, found kind tag {found}")]
    WrongKind {
        /// The kind the caller asked for.
        expected: FileKind,
        /// The tag found in the file.
        found: u8,
    },

    /// The data is truncated or internally inconsistent.
    #[error("malformed data: {detail}")]
    Malformed {
        /// Human-readable description of what went wrong.
        detail: String,
    },

    /// The embedded configuration is invalid.
    #[error("embedded configuration: {0}")]
    Config(#[from] ConfigError),

    /// Decoded arrays have inconsistent shapes.
    #[error("decoded arrays: {0}")]
    Shape(#[from] ShapeMismatchError),

    /// A decoded block is incomplete or has inconsistent array shapes.
    #[error("decoded block: {0}")]
    Block(#[from] BlockError),

    /// The decoded blocks do not form valid products.
    #[error("decoded products: {0}")]
    Products(#[from] ProductsError),
}

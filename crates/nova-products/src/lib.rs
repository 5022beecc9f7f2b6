//! Snapshot products for nova runs.
//!
//! A [`Products`] value is one time slice of a run expressed in primitive
//! variables: the configuration it was produced with and every mesh
//! [`Block`](nova_core::Block), keyed by [`BlockIndex`](nova_core::BlockIndex).
//! It is immutable once built; derived views such as the
//! [radial profile](Products::radial_profile) are computed lazily.
//!
//! # Architecture
//!
//! - [`Products`] owns the blocks and the shared configuration
//! - [`ProductsWriter`] and [`ProductsReader`] stream the binary format
//! - [`products_hash`] gives a quick identity for a snapshot;
//!   [`compare_products`] checks array by array that two snapshots hold
//!   bit-identical data
//! - [`codec`] exposes [`Encoder`](codec::Encoder) and
//!   [`Decoder`](codec::Decoder) so other file kinds (checkpoints) share
//!   the same framing
//!
//! # Format
//!
//! ```text
//! [MAGIC "NOVA"] [VERSION u8] [KIND u8]
//! [version str] [time f64] [fingerprint flag u8 (+ u64)] [config YAML str]
//! [block count u32] [Block 1] ... [Block N]
//! ```
//!
//! Each block carries its index (`i32`, `u32`), both vertex arrays, and the
//! five primitive arrays, every array as `u32` dimensions followed by
//! little-endian `f64` data.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod codec;
pub mod compare;
pub mod error;
pub mod hash;
pub mod products;
pub mod profile;
pub mod reader;
pub mod writer;

pub use codec::FileKind;
pub use compare::{compare_products, BlockDivergence, DivergenceKind, DivergenceReport};
pub use error::{CodecError, ProductsError};
pub use hash::{fingerprint_bytes, fingerprint_reader, products_hash};
pub use products::Products;
pub use reader::{ProductsHeader, ProductsReader};
pub use writer::ProductsWriter;

/// Magic bytes at the start of every nova data file.
pub const MAGIC: [u8; 4] = *b"NOVA";

/// Current binary format version.
pub const FORMAT_VERSION: u8 = 1;

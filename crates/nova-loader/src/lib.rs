//! Snapshot loading for nova runs.
//!
//! Two on-disk sources hold a snapshot: a *checkpoint* (conserved totals,
//! expensive to convert) and a *products* file (primitives, cheap to
//! read). [`load`] accepts either. For a checkpoint it first looks for a
//! products file at the derived cache path whose recorded source
//! fingerprint matches the checkpoint; otherwise it converts the
//! checkpoint and caches the result there.
//!
//! # Architecture
//!
//! - [`SnapshotLoader`] and [`Run`] are the loader seam;
//!   [`NativeLoader`] implements them with the nova binary formats
//! - [`SnapshotCache`] drives the cache policy over any loader
//! - [`Markers`] derives cache paths from file names
//! - [`Checkpoint`] holds conserved state and recovers primitives via
//!   [`srhd`]

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod cache;
pub mod checkpoint;
pub mod error;
pub mod loader;
pub mod srhd;

pub use cache::{Markers, SourceKind};
pub use checkpoint::{BlockState, Checkpoint};
pub use error::{CacheWriteError, LoadError, RecoveryError, RecoveryFailure};
pub use loader::{load, NativeLoader, Run, SnapshotCache, SnapshotLoader};

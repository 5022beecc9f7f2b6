//! Core types for nova snapshot products.
//!
//! This is the leaf crate of the workspace. It defines the run
//! configuration model, the [`Block`] of primitive fluid variables on a
//! polar mesh patch, the [`BlockIndex`] that locates a block in the global
//! block grid, and the physical constants shared by field derivation and
//! primitive recovery.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod block;
pub mod config;
pub mod error;
pub mod id;
pub mod physics;

pub use block::{Block, BlockBuilder, Dimensionality, Primitive};
pub use config::{
    Configuration, Control, Hydro, Mesh, ModelSetup, RiemannSolver, RungeKuttaOrder,
    REQUIRED_SECTIONS,
};
pub use error::{BlockError, ConfigError, ShapeMismatchError};
pub use id::BlockIndex;

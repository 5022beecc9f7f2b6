//! Derived-field engine for nova snapshot blocks.
//!
//! Every field is a pure function of one [`Block`](nova_core::Block)'s
//! primitive arrays and returns an array of the block's `(Nr, Nq)` shape.
//! The set of fields is closed: names are parsed into a [`Field`] at the
//! boundary, and an unknown name is the engine's only error.
//!
//! ```
//! use ndarray::array;
//! use nova_core::Block;
//! use nova_fields::{derive, derive_by_name, Field};
//!
//! let block = Block::builder(array![1.0e18, 1.1e18], array![0.0, 1.0])
//!     .comoving_mass_density(array![[1.0e-20]])
//!     .gas_pressure(array![[1.0e-10]])
//!     .radial_four_velocity(array![[3.0]])
//!     .polar_four_velocity(array![[4.0]])
//!     .scalar(array![[0.0]])
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(derive(&block, Field::GammaBeta)[[0, 0]], 5.0);
//! assert!(derive_by_name(&block, "nonexistent").is_err());
//! ```

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod derive;
pub mod error;
pub mod field;

pub use derive::{derive, derive_by_name};
pub use error::UnknownFieldError;
pub use field::Field;

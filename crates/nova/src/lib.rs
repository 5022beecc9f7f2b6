//! Nova: snapshot post-processing for relativistic polar-mesh hydrodynamics.
//!
//! This is the top-level facade crate that re-exports the public API from
//! all nova sub-crates. Most users only need `nova` as a dependency.
//!
//! # Quick start
//!
//! ```rust
//! use nova::prelude::*;
//! use nova_test_utils::{block_grid, sample_configuration, GridSpec};
//!
//! // A 2D snapshot: three radial blocks by two polar blocks.
//! let spec = GridSpec::default();
//! let products = Products::new(
//!     1.0,
//!     sample_configuration(spec.num_polar_zones()),
//!     block_grid(&spec),
//! )
//! .unwrap();
//! assert_eq!(products.dimensionality(), Dimensionality::TwoDimensional);
//!
//! // Derive a field by name for every block.
//! let field: Field = "gamma_beta".parse().unwrap();
//! let per_block = mesh_field(&products, field, FieldTransform::Identity);
//! assert_eq!(per_block.len(), products.len());
//!
//! // Or hand the whole thing to a renderer.
//! let plot = PlotData::assemble(&products, Field::Rho, FieldTransform::Log10).unwrap();
//! assert!(plot.title().starts_with("Setup: kinetic-bomb"));
//! ```
//!
//! # Modules
//!
//! Each module corresponds to a sub-crate. Use them for types not in the
//! prelude:
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `nova-core` | Configuration, blocks, block indices, physical constants |
//! | [`fields`] | `nova-fields` | The derived-field engine |
//! | [`products`] | `nova-products` | Snapshots, radial profiles, products codec, hashing, comparison |
//! | [`geometry`] | `nova-geometry` | Cartesian vertices, mesh fields, plot data |
//! | [`loader`] | `nova-loader` | Checkpoints, primitive recovery, the products cache |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Configuration, blocks, and physical constants (`nova-core`).
pub use nova_core as types;

/// The derived-field engine (`nova-fields`).
///
/// [`fields::derive`] computes a [`fields::Field`] for one block.
pub use nova_fields as fields;

/// Snapshots and the products file format (`nova-products`).
///
/// [`products::Products`] is the snapshot; [`products::compare_products`]
/// locates the first differences between two of them.
pub use nova_products as products;

/// Plot geometry (`nova-geometry`).
pub use nova_geometry as geometry;

/// Checkpoint loading and the products cache (`nova-loader`).
///
/// [`loader::load`] accepts either a checkpoint or a products path.
pub use nova_loader as loader;

/// Common imports for typical nova usage.
///
/// ```rust
/// use nova::prelude::*;
/// ```
pub mod prelude {
    // Core types
    pub use nova_core::{Block, BlockIndex, Configuration, Dimensionality, Primitive};

    // Errors
    pub use nova_core::{BlockError, ConfigError, ShapeMismatchError};
    pub use nova_fields::UnknownFieldError;
    pub use nova_loader::{CacheWriteError, LoadError};
    pub use nova_products::{CodecError, ProductsError};

    // Fields
    pub use nova_fields::{derive, derive_by_name, Field};

    // Snapshots
    pub use nova_products::{compare_products, Products};

    // Geometry
    pub use nova_geometry::{
        block_vertices, mesh_field, mesh_vertices, FieldTransform, PlotData, PlotGeometry,
    };

    // Loading
    pub use nova_loader::{load, SnapshotCache};
}

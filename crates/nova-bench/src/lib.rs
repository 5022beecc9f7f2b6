//! Benchmark profiles for nova snapshot post-processing.
//!
//! - [`reference_spec`]: 8 × 4 blocks of 64 × 16 zones (~131K cells), 2D
//! - [`profile_spec`]: 16 blocks of 32 × 1 zones, 1D
//! - [`products_for`]: the snapshot for a profile

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use nova_products::Products;
use nova_test_utils::{block_grid, sample_configuration, GridSpec};

/// A 2D grid: 8 radial by 4 polar blocks of 64 × 16 zones.
pub fn reference_spec() -> GridSpec {
    GridSpec {
        radial_blocks: 0..8,
        polar_blocks: 4,
        radial_zones: 64,
        polar_zones: 16,
        inner_radius: 1.0e10,
    }
}

/// A 1D grid: 16 radial blocks of 32 zones in a single polar zone.
pub fn profile_spec() -> GridSpec {
    GridSpec {
        radial_blocks: 0..16,
        polar_blocks: 1,
        radial_zones: 32,
        polar_zones: 1,
        inner_radius: 1.0e10,
    }
}

/// The snapshot for `spec` at `t = 1`.
///
/// # Panics
///
/// Never for grids built by [`block_grid`].
pub fn products_for(spec: &GridSpec) -> Products {
    Products::new(
        1.0,
        sample_configuration(spec.num_polar_zones()),
        block_grid(spec),
    )
    .expect("generated grids have unique indices")
}

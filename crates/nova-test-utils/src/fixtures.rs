//! Block fixtures.
//!
//! - [`uniform_block`]: every zone holds the same state.
//! - [`random_block`]: seeded, physically admissible random state.
//! - [`block_grid`]: a contiguous grid of blocks whose density encodes
//!   each zone's global position (see [`marked_value`]).

use std::f64::consts::PI;
use std::ops::Range;

use ndarray::{Array1, Array2};
use nova_core::{Block, BlockIndex};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Radial vertex ratio between neighbouring zones in generated grids.
const RADIAL_RATIO: f64 = 1.1;

/// A block over `[r0, r1] × [q0, q1]` holding a uniform state at rest,
/// with a zero scalar.
pub fn uniform_block(
    (r0, r1, nr): (f64, f64, usize),
    (q0, q1, nq): (f64, f64, usize),
    rho: f64,
    pre: f64,
) -> Block {
    Block::builder(Array1::linspace(r0, r1, nr + 1), Array1::linspace(q0, q1, nq + 1))
        .comoving_mass_density(Array2::from_elem((nr, nq), rho))
        .gas_pressure(Array2::from_elem((nr, nq), pre))
        .radial_four_velocity(Array2::zeros((nr, nq)))
        .polar_four_velocity(Array2::zeros((nr, nq)))
        .scalar(Array2::zeros((nr, nq)))
        .build()
        .expect("uniform block shapes are consistent")
}

/// A block over `[1e10, 2e10] × [0, π]` with seeded random primitives.
///
/// Density and pressure are positive, the four-velocity spans both
/// directions, and the scalar lies in `[0, 1)`.
pub fn random_block(seed: u64, nr: usize, nq: usize) -> Block {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut fill = |lo: f64, hi: f64| {
        Array2::from_shape_simple_fn((nr, nq), || rng.random_range(lo..hi))
    };
    let rho = fill(1.0e-3, 1.0);
    let pre = fill(1.0e-4, 1.0e-1);
    let ur = fill(-2.0, 2.0);
    let uq = fill(-0.5, 0.5);
    let scalar = fill(0.0, 1.0);

    Block::builder(
        Array1::linspace(1.0e10, 2.0e10, nr + 1),
        Array1::linspace(0.0, PI, nq + 1),
    )
    .comoving_mass_density(rho)
    .gas_pressure(pre)
    .radial_four_velocity(ur)
    .polar_four_velocity(uq)
    .scalar(scalar)
    .build()
    .expect("random block shapes are consistent")
}

/// Layout of a generated block grid.
#[derive(Clone, Debug)]
pub struct GridSpec {
    /// Radial block indices to generate, in order.
    pub radial_blocks: Range<i32>,
    /// Number of polar block rows covering `[0, π]`.
    pub polar_blocks: u32,
    /// Radial zones per block.
    pub radial_zones: usize,
    /// Polar zones per block.
    pub polar_zones: usize,
    /// Radius of global radial vertex 0.
    pub inner_radius: f64,
}

impl Default for GridSpec {
    fn default() -> Self {
        Self {
            radial_blocks: 0..3,
            polar_blocks: 2,
            radial_zones: 4,
            polar_zones: 3,
            inner_radius: 1.0e10,
        }
    }
}

impl GridSpec {
    /// Total polar zones across all rows.
    pub fn num_polar_zones(&self) -> usize {
        self.polar_blocks as usize * self.polar_zones
    }

    /// Radius of global radial vertex `k` (may be negative).
    pub fn radius(&self, k: i64) -> f64 {
        self.inner_radius * RADIAL_RATIO.powi(k as i32)
    }
}

/// Density value planted at global zone `(radial, polar)` by [`block_grid`].
pub fn marked_value(radial: i64, polar: usize) -> f64 {
    1.0e6 + 1.0e3 * polar as f64 + radial as f64
}

/// Contiguous grid of blocks, in ascending index order.
///
/// Density carries [`marked_value`] of each zone's global position;
/// pressure is `1e-3` of density, `u_r = 0.5`, `u_θ = 0`, scalar `0.25`.
pub fn block_grid(spec: &GridSpec) -> Vec<(BlockIndex, Block)> {
    let nr = spec.radial_zones;
    let nq = spec.polar_zones;
    let dq = PI / spec.num_polar_zones() as f64;
    let mut blocks = Vec::new();

    for i in spec.radial_blocks.clone() {
        let first_radial = i as i64 * nr as i64;
        for p in 0..spec.polar_blocks {
            let first_polar = p as usize * nq;
            let radial_vertices =
                Array1::from_shape_fn(nr + 1, |k| spec.radius(first_radial + k as i64));
            let polar_vertices =
                Array1::from_shape_fn(nq + 1, |k| (first_polar + k) as f64 * dq);
            let rho = Array2::from_shape_fn((nr, nq), |(a, b)| {
                marked_value(first_radial + a as i64, first_polar + b)
            });
            let block = Block::builder(radial_vertices, polar_vertices)
                .gas_pressure(rho.mapv(|d| 1.0e-3 * d))
                .comoving_mass_density(rho)
                .radial_four_velocity(Array2::from_elem((nr, nq), 0.5))
                .polar_four_velocity(Array2::zeros((nr, nq)))
                .scalar(Array2::from_elem((nr, nq), 0.25))
                .build()
                .expect("grid block shapes are consistent");
            blocks.push((BlockIndex::new(i, p), block));
        }
    }
    blocks
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn random_block_is_reproducible() {
        assert_eq!(random_block(7, 3, 2), random_block(7, 3, 2));
        assert_ne!(random_block(7, 3, 2), random_block(8, 3, 2));
    }

    #[test]
    fn grid_blocks_share_edges() {
        let spec = GridSpec::default();
        let blocks = block_grid(&spec);
        assert_eq!(blocks.len(), 6);
        let (_, first) = &blocks[0];
        let (_, next) = &blocks[2];
        assert_eq!(first.radial_vertices()[4], next.radial_vertices()[0]);
    }
}

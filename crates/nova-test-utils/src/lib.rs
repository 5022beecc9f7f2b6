//! Test utilities for nova development.
//!
//! Provides sample configuration documents and block fixtures (uniform,
//! seeded-random, and full block grids with position-marked values) so
//! that tests across the workspace build snapshots the same way.

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod fixtures;

pub use fixtures::{block_grid, marked_value, random_block, uniform_block, GridSpec};

use nova_core::Configuration;

/// YAML text of a valid `kinetic_bomb` configuration with the given
/// polar zone count.
pub fn config_yaml(num_polar_zones: usize) -> String {
    format!(
        "\
hydro:
  gamma_law_index: 1.3333333333333333
  plm_theta: 1.5
  cfl_number: 0.3
  runge_kutta_order: RK2
  riemann_solver: HLLE
model:
  kinetic_bomb:
    external_medium_density: 1.0e-20
    launch_radius: 1.0e10
    shell_thickness: 1.0e9
    kinetic_energy: 1.0e51
    shell_mass: 1.0e30
mesh:
  inner_radius: 1.0e10
  outer_radius: 1.0e12
  inner_excision_speed: 0.0
  outer_excision_speed: 0.0
  reference_radius: 1.0e10
  num_polar_zones: {num_polar_zones}
  num_radial_zones: 64
  block_size: 4
control:
  start_time: 0.0
  final_time: 10.0
  checkpoint_interval: 1.0
  fold: 10
  num_threads: 2
"
    )
}

/// A parsed [`config_yaml`] configuration.
///
/// # Panics
///
/// Never for valid `num_polar_zones >= 1`.
pub fn sample_configuration(num_polar_zones: usize) -> Configuration {
    Configuration::from_yaml(&config_yaml(num_polar_zones)).expect("sample configuration is valid")
}

//! Physical constants (cgs) and small kinematic helpers.

use std::f64::consts::PI;

/// Speed of light, cm/s.
pub const LIGHT_SPEED: f64 = 3e10;

/// Stefan-Boltzmann constant, erg cm⁻² s⁻¹ K⁻⁴.
pub const STEFAN_BOLTZMANN: f64 = 5.670374419e-5;

/// Radiation constant `a = 4σ/c`, erg cm⁻³ K⁻⁴.
pub const RADIATION_CONSTANT: f64 = 4.0 * STEFAN_BOLTZMANN / LIGHT_SPEED;

/// Adiabatic index assumed by derived fields (radiation-dominated gas).
pub const GAMMA_EOS: f64 = 4.0 / 3.0;

/// Lorentz factor from the four-velocity components.
#[inline]
pub fn lorentz_factor(ur: f64, uq: f64) -> f64 {
    (1.0 + ur * ur + uq * uq).sqrt()
}

/// Volume of the spherical-polar cell `[r0, r1] × [q0, q1]`, integrated
/// over the full azimuth.
#[inline]
pub fn cell_volume(r0: f64, r1: f64, q0: f64, q1: f64) -> f64 {
    2.0 * PI / 3.0 * (r1.powi(3) - r0.powi(3)) * (q0.cos() - q1.cos())
}

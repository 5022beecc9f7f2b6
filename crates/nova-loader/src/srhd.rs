//! Special-relativistic hydrodynamics state conversions (c = 1).
//!
//! Primitive state is `(ρ, u_r, u_θ, p)` with `u` the spatial
//! four-velocity; conserved state is `(D, S_r, S_θ, τ)` per unit volume,
//! where `τ` excludes the rest-mass energy. The equation of state is a
//! gamma law with index `γ`.

use crate::error::RecoveryFailure;

const NEWTON_ITER_MAX: usize = 50;
const RELATIVE_TOLERANCE: f64 = 1e-13;
const ABSOLUTE_TOLERANCE: f64 = 1e-15;
const MAX_BETA_SQUARED: f64 = 1.0 - 1e-10;

/// Pressure floor, as a fraction of density, used when recovery yields a
/// negative pressure.
pub const PRESSURE_FLOOR: f64 = 1e-3;

/// Primitive variables of one zone.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Primitive {
    /// Comoving mass density.
    pub mass_density: f64,
    /// Radial four-velocity.
    pub radial_four_velocity: f64,
    /// Polar four-velocity.
    pub polar_four_velocity: f64,
    /// Gas pressure.
    pub gas_pressure: f64,
}

/// Conserved densities of one zone.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Conserved {
    /// Lab-frame mass density `D = ρΓ`.
    pub lab_frame_density: f64,
    /// Radial momentum density.
    pub radial_momentum: f64,
    /// Polar momentum density.
    pub polar_momentum: f64,
    /// Energy density without rest mass, `τ = ρhΓ² - p - D`.
    pub energy_density: f64,
}

impl Primitive {
    /// Lorentz factor.
    pub fn lorentz_factor(&self) -> f64 {
        nova_core::physics::lorentz_factor(self.radial_four_velocity, self.polar_four_velocity)
    }

    /// Specific enthalpy `h = 1 + e + p/ρ`.
    pub fn enthalpy(&self, gamma_law_index: f64) -> f64 {
        let e = self.gas_pressure / (self.mass_density * (gamma_law_index - 1.0));
        1.0 + e + self.gas_pressure / self.mass_density
    }

    /// Conserved densities for this state.
    pub fn to_conserved(&self, gamma_law_index: f64) -> Conserved {
        let w = self.lorentz_factor();
        let rho_h = self.mass_density * self.enthalpy(gamma_law_index);
        let d = self.mass_density * w;
        Conserved {
            lab_frame_density: d,
            radial_momentum: rho_h * w * self.radial_four_velocity,
            polar_momentum: rho_h * w * self.polar_four_velocity,
            energy_density: rho_h * w * w - self.gas_pressure - d,
        }
    }
}

impl Conserved {
    /// Scale every component, e.g. to convert totals to densities.
    pub fn scaled(self, factor: f64) -> Self {
        Self {
            lab_frame_density: self.lab_frame_density * factor,
            radial_momentum: self.radial_momentum * factor,
            polar_momentum: self.polar_momentum * factor,
            energy_density: self.energy_density * factor,
        }
    }

    /// Recover primitives by Newton iteration on the pressure.
    ///
    /// A negative recovered pressure is replaced by
    /// [`PRESSURE_FLOOR`]` · ρ`.
    pub fn to_primitive(&self, gamma_law_index: f64) -> Result<Primitive, RecoveryFailure> {
        let d = self.lab_frame_density;
        let tau = self.energy_density;
        let (sr, sq) = (self.radial_momentum, self.polar_momentum);
        let ss = sr * sr + sq * sq;

        if d < 0.0 {
            return Err(RecoveryFailure::NegativeDensity(d));
        }
        if tau < 0.0 {
            return Err(RecoveryFailure::NegativeEnergy(tau));
        }

        let gm = gamma_law_index;
        let mut p = (ss.sqrt() - tau - d).abs().max(ABSOLUTE_TOLERANCE * (d + tau));
        let mut converged = false;

        for _ in 0..NEWTON_ITER_MAX {
            let et = tau + p + d;
            let b2 = (ss / (et * et)).min(MAX_BETA_SQUARED);
            let w2 = 1.0 / (1.0 - b2);
            let w = w2.sqrt();
            let rho = d / w;
            let e = (tau + d * (1.0 - w) + p * (1.0 - w2)) / (d * w);
            let h = 1.0 + e + p / rho;
            let cs2 = gm * p / (rho * h);
            let f = rho * e * (gm - 1.0) - p;
            let g = b2 * cs2 - 1.0;
            let step = f / g;
            p -= step;

            if step.abs() <= RELATIVE_TOLERANCE * p.abs() + ABSOLUTE_TOLERANCE * (d + tau) {
                converged = true;
                break;
            }
        }
        if !converged || !p.is_finite() {
            return Err(RecoveryFailure::RootFinderFailed {
                iterations: NEWTON_ITER_MAX,
            });
        }

        let et = tau + p + d;
        let w = 1.0 / (1.0 - (ss / (et * et)).min(MAX_BETA_SQUARED)).sqrt();
        let mass_density = d / w;
        let gas_pressure = if p < 0.0 {
            PRESSURE_FLOOR * mass_density
        } else {
            p
        };

        Ok(Primitive {
            mass_density,
            radial_four_velocity: w * sr / et,
            polar_four_velocity: w * sq / et,
            gas_pressure,
        })
    }
}

//! Per-block field derivation.

use ndarray::{Array2, Zip};
use nova_core::physics::{lorentz_factor, GAMMA_EOS, LIGHT_SPEED, RADIATION_CONSTANT};
use nova_core::Block;

use crate::error::UnknownFieldError;
use crate::field::Field;

/// Compute `field` over every zone of `block`.
///
/// The result has the block's `(Nr, Nq)` shape. The block is not modified.
pub fn derive(block: &Block, field: Field) -> Array2<f64> {
    let rho = block.comoving_mass_density();
    let pre = block.gas_pressure();
    let ur = block.radial_four_velocity();
    let uq = block.polar_four_velocity();
    let scalar = block.scalar();

    match field {
        Field::Rho => rho.clone(),
        Field::Pre => pre.clone(),
        Field::Ur => ur.clone(),
        Field::Uq => uq.clone(),
        Field::ScalarConcentration => scalar.clone(),
        Field::ScalarDensity => Zip::from(scalar)
            .and(rho)
            .and(ur)
            .and(uq)
            .map_collect(|&s, &d, &ur, &uq| s * d * lorentz_factor(ur, uq)),
        Field::GammaBeta => Zip::from(ur)
            .and(uq)
            .map_collect(|&ur, &uq| (ur * ur + uq * uq).sqrt()),
        Field::Energy => Zip::from(rho)
            .and(pre)
            .and(ur)
            .and(uq)
            .map_collect(|&d, &pre, &ur, &uq| energy_density(d, pre, lorentz_factor(ur, uq))),
        Field::Temperature => pre.mapv(temperature),
        Field::Entropy => Zip::from(pre)
            .and(rho)
            .map_collect(|&pre, &d| pre / d.powf(GAMMA_EOS)),
    }
}

/// Parse `name` and compute the field.
///
/// # Errors
///
/// Returns [`UnknownFieldError`] before any computation if `name` is not a
/// known field.
pub fn derive_by_name(block: &Block, name: &str) -> Result<Array2<f64>, UnknownFieldError> {
    let field: Field = name.parse()?;
    Ok(derive(block, field))
}

/// Lab-frame energy density with the rest-mass contribution removed.
fn energy_density(d: f64, pre: f64, gamma: f64) -> f64 {
    let c2 = LIGHT_SPEED * LIGHT_SPEED;
    let p = pre * c2;
    let e = p / d / (GAMMA_EOS - 1.0);
    let h = c2 + e + p / d;
    d * h * gamma * gamma - p - gamma * d * c2
}

fn temperature(pre: f64) -> f64 {
    (3.0 * pre * LIGHT_SPEED * LIGHT_SPEED / RADIATION_CONSTANT).powf(0.25)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::{array, Array1};
    use proptest::prelude::*;

    fn uniform_block(nr: usize, nq: usize, rho: f64, pre: f64, ur: f64, uq: f64) -> Block {
        let r = Array1::linspace(1.0e10, 2.0e10, nr + 1);
        let q = Array1::linspace(0.0, std::f64::consts::PI, nq + 1);
        Block::builder(r, q)
            .comoving_mass_density(Array2::from_elem((nr, nq), rho))
            .gas_pressure(Array2::from_elem((nr, nq), pre))
            .radial_four_velocity(Array2::from_elem((nr, nq), ur))
            .polar_four_velocity(Array2::from_elem((nr, nq), uq))
            .scalar(Array2::from_elem((nr, nq), 0.5))
            .build()
            .unwrap()
    }

    #[test]
    fn single_zone_at_rest_has_zero_gamma_beta() {
        let block = Block::builder(
            array![1.0e18, 1.1e18],
            array![0.0, std::f64::consts::FRAC_PI_2],
        )
        .comoving_mass_density(array![[1.0e-20]])
        .gas_pressure(array![[1.0e-10]])
        .radial_four_velocity(array![[0.0]])
        .polar_four_velocity(array![[0.0]])
        .scalar(array![[0.0]])
        .build()
        .unwrap();
        assert_eq!(derive(&block, Field::GammaBeta), array![[0.0]]);
    }

    #[test]
    fn fluid_at_rest_has_only_thermal_energy() {
        let block = uniform_block(2, 2, 1.0, 1.0e-3, 0.0, 0.0);
        let energy = derive(&block, Field::Energy);
        let c2 = LIGHT_SPEED * LIGHT_SPEED;
        let expected = 1.0e-3 * c2 / (GAMMA_EOS - 1.0);
        for value in energy.iter() {
            assert_relative_eq!(*value, expected, max_relative = 1e-9);
        }
    }

    #[test]
    fn scalar_density_includes_lorentz_factor() {
        let block = uniform_block(1, 1, 2.0, 0.0, 3.0, 0.0);
        let value = derive(&block, Field::ScalarDensity)[[0, 0]];
        assert_relative_eq!(value, 0.5 * 2.0 * 10f64.sqrt());
    }

    #[test]
    fn entropy_uses_eos_index() {
        let block = uniform_block(1, 1, 8.0, 2.0, 0.0, 0.0);
        assert_relative_eq!(derive(&block, Field::Entropy)[[0, 0]], 2.0 / 16.0);
    }

    #[test]
    fn passthrough_fields_copy_primitives() {
        let block = uniform_block(3, 2, 1.5, 0.1, 0.2, 0.3);
        assert_eq!(&derive(&block, Field::Rho), block.comoving_mass_density());
        assert_eq!(&derive(&block, Field::Pre), block.gas_pressure());
        assert_eq!(&derive(&block, Field::Ur), block.radial_four_velocity());
        assert_eq!(&derive(&block, Field::Uq), block.polar_four_velocity());
        assert_eq!(&derive(&block, Field::ScalarConcentration), block.scalar());
    }

    #[test]
    fn unknown_name_produces_no_array() {
        let block = uniform_block(1, 1, 1.0, 1.0, 0.0, 0.0);
        let err = derive_by_name(&block, "nonexistent").unwrap_err();
        assert_eq!(err.name, "nonexistent");
        assert!(derive_by_name(&block, "scalar").is_ok());
    }

    proptest! {
        #[test]
        fn every_field_has_block_shape(nr in 1usize..8, nq in 1usize..8) {
            let block = uniform_block(nr, nq, 1.0, 0.1, 0.5, 0.0);
            for field in Field::ALL {
                prop_assert_eq!(derive(&block, field).dim(), (nr, nq));
            }
        }

        #[test]
        fn gamma_beta_is_magnitude(ur in -1.0e3f64..1.0e3, uq in -1.0e3f64..1.0e3) {
            let block = uniform_block(1, 1, 1.0, 1.0, ur, uq);
            let value = derive(&block, Field::GammaBeta)[[0, 0]];
            prop_assert!(value >= 0.0);
            prop_assert!((value - (ur * ur + uq * uq).sqrt()).abs() <= 1e-12 * value.max(1.0));
        }

        #[test]
        fn gamma_beta_monotonic_in_radial_speed(a in 0.0f64..1.0e3, b in 0.0f64..1.0e3) {
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            let slow = derive(&uniform_block(1, 1, 1.0, 1.0, -lo, 0.0), Field::GammaBeta)[[0, 0]];
            let fast = derive(&uniform_block(1, 1, 1.0, 1.0, hi, 0.0), Field::GammaBeta)[[0, 0]];
            prop_assert!(slow <= fast);
        }

        #[test]
        fn temperature_satisfies_radiation_law(pre in 1.0e-30f64..1.0e10) {
            let block = uniform_block(1, 1, 1.0, pre, 0.0, 0.0);
            let t = derive(&block, Field::Temperature)[[0, 0]];
            let lhs = t.powi(4) * RADIATION_CONSTANT;
            let rhs = 3.0 * pre * LIGHT_SPEED * LIGHT_SPEED;
            prop_assert!((lhs - rhs).abs() <= 1e-10 * rhs);
        }
    }
}

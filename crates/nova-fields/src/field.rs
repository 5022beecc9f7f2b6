//! The closed set of derivable fields.

use std::fmt;
use std::str::FromStr;

use crate::error::UnknownFieldError;

/// A derived field that can be computed from a block's primitives.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Field {
    /// Comoving mass density `ρ`.
    Rho,
    /// Gas pressure.
    Pre,
    /// Radial four-velocity `u_r`.
    Ur,
    /// Polar four-velocity `u_θ`.
    Uq,
    /// Passive scalar concentration.
    ScalarConcentration,
    /// Lab-frame scalar density `s ρ Γ`.
    ScalarDensity,
    /// Spatial four-velocity magnitude `Γβ`.
    GammaBeta,
    /// Lab-frame energy density excluding rest mass.
    Energy,
    /// Radiation temperature, assuming radiation-dominated pressure.
    Temperature,
    /// Entropy proxy `p / ρ^Γ`.
    Entropy,
}

impl Field {
    /// Every field, in the order listed to users.
    pub const ALL: [Field; 10] = [
        Field::Rho,
        Field::Pre,
        Field::Ur,
        Field::Uq,
        Field::ScalarConcentration,
        Field::ScalarDensity,
        Field::GammaBeta,
        Field::Energy,
        Field::Temperature,
        Field::Entropy,
    ];

    /// Canonical field name.
    pub fn name(self) -> &'static str {
        match self {
            Self::Rho => "rho",
            Self::Pre => "pre",
            Self::Ur => "ur",
            Self::Uq => "uq",
            Self::ScalarConcentration => "scalar_concentration",
            Self::ScalarDensity => "scalar_density",
            Self::GammaBeta => "gamma_beta",
            Self::Energy => "energy",
            Self::Temperature => "temperature",
            Self::Entropy => "entropy",
        }
    }

    /// cgs unit label, empty for dimensionless fields.
    pub fn units(self) -> &'static str {
        match self {
            Self::Rho | Self::ScalarDensity => "g/cm^3",
            Self::Pre => "g/cm^3 c^2",
            Self::Energy => "erg/cm^3",
            Self::Temperature => "K",
            Self::Ur | Self::Uq | Self::ScalarConcentration | Self::GammaBeta | Self::Entropy => "",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Field {
    type Err = UnknownFieldError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        if name == "scalar" {
            return Ok(Self::ScalarConcentration);
        }
        Self::ALL
            .into_iter()
            .find(|field| field.name() == name)
            .ok_or_else(|| UnknownFieldError {
                name: name.to_string(),
            })
    }
}

//! Error types for configuration parsing and block construction.
//!
//! Both are structural: the input is wrong, and reading it again would
//! fail the same way. Callers surface them immediately.

use thiserror::Error;

/// Errors detected while building a [`Configuration`](crate::Configuration).
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The document is not a mapping at the top level.
    #[error("configuration document must be a mapping")]
    NotAMapping,

    /// One of the required top-level sections is absent.
    #[error("missing required configuration section '{section}'")]
    MissingSection {
        /// Name of the missing section.
        section: &'static str,
    },

    /// The `model` section must name exactly one setup.
    #[error("model section must contain exactly one entry, found {found}")]
    ModelCount {
        /// Number of entries in the `model` section.
        found: usize,
    },

    /// A section is present but does not have the expected shape.
    #[error("malformed configuration: {0}")]
    Malformed(#[from] serde_yaml::Error),

    /// A parameter is outside its admissible range.
    #[error("invalid parameter {name}: {reason}")]
    InvalidParameter {
        /// Dotted path of the offending parameter, e.g. `hydro.cfl_number`.
        name: &'static str,
        /// What the admissible range is.
        reason: String,
    },

    /// The configuration file could not be read.
    #[error("failed to read configuration: {0}")]
    Io(#[from] std::io::Error),
}

/// A block field array does not match the shape implied by the vertices.
///
/// Raised at construction so that field derivation never runs over
/// inconsistent data.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("array '{array}' has shape {actual:?}, expected {expected:?} from the vertex counts")]
pub struct ShapeMismatchError {
    /// Name of the offending array.
    pub array: &'static str,
    /// Shape implied by `(len(radial_vertices) - 1, len(polar_vertices) - 1)`.
    pub expected: (usize, usize),
    /// Shape actually supplied.
    pub actual: (usize, usize),
}

/// A [`Block`](crate::Block) could not be built.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum BlockError {
    /// A primitive array was never supplied to the builder.
    #[error("primitive array '{array}' was not supplied")]
    MissingPrimitive {
        /// Name of the missing array.
        array: &'static str,
    },

    /// A vertex or primitive array has the wrong shape.
    #[error(transparent)]
    Shape(#[from] ShapeMismatchError),
}

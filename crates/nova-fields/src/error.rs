//! Field lookup error.

use thiserror::Error;

/// A field name that does not match any known derived field.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("unknown field '{name}'")]
pub struct UnknownFieldError {
    /// The identifier that was requested.
    pub name: String,
}

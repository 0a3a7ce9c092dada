//! Error types for input validation and configuration loading

use thiserror::Error;

/// Structurally invalid input. Raised before any geometry runs.
///
/// A layout that merely breaks design rules is not an error; those
/// breaches are reported as [`ConstraintViolation`](crate::layout::ConstraintViolation)s.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum InputError {
    /// Room dimensions must be finite and strictly positive
    #[error("invalid room dimensions {width} x {height}: both must be finite and > 0")]
    InvalidRoom { width: f64, height: f64 },

    /// Object width/height must be finite and strictly positive
    #[error("object '{id}' has invalid size {width} x {height}: both must be finite and > 0")]
    InvalidSize { id: String, width: f64, height: f64 },

    /// Object position is NaN or infinite
    #[error("object '{id}' has a non-finite position ({x}, {y})")]
    NonFiniteCoordinate { id: String, x: f64, y: f64 },

    /// Orientation outside 0..360 degrees
    #[error("object '{id}' has orientation {orientation}, expected 0-359 degrees")]
    InvalidOrientation { id: String, orientation: u16 },

    /// A required field is empty
    #[error("object #{index} is missing required field '{field}'")]
    MissingField { index: usize, field: &'static str },

    /// Two objects share an id
    #[error("duplicate object id '{id}'")]
    DuplicateId { id: String },
}

impl InputError {
    /// Create an invalid size error
    pub fn invalid_size(id: impl Into<String>, width: f64, height: f64) -> Self {
        Self::InvalidSize {
            id: id.into(),
            width,
            height,
        }
    }

    /// Create a non-finite coordinate error
    pub fn non_finite(id: impl Into<String>, x: f64, y: f64) -> Self {
        Self::NonFiniteCoordinate {
            id: id.into(),
            x,
            y,
        }
    }

    /// Create a duplicate id error
    pub fn duplicate(id: impl Into<String>) -> Self {
        Self::DuplicateId { id: id.into() }
    }
}

/// Errors that can occur when loading or validating an engine configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config value for '{field}': {reason}")]
    Invalid { field: &'static str, reason: String },
}

impl ConfigError {
    /// Create an invalid field error
    pub fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            field,
            reason: reason.into(),
        }
    }
}

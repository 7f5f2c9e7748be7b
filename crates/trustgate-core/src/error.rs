//! # Error Types
//!
//! Errors raised by the foundational types and the configuration loader.
//! Component errors (persona switching, escrow transitions, location
//! resolution) live in their own crates and carry their own context.

use thiserror::Error;

/// Error constructing or parsing a core value.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoreError {
    /// Role name is neither `guest` nor a catalog persona.
    #[error("unknown persona \"{0}\"")]
    UnknownPersona(String),

    /// Coordinate component outside the WGS-84 range or not finite.
    #[error("invalid coordinate: {axis} = {value}")]
    InvalidCoordinate {
        /// `"lat"` or `"lng"`.
        axis: &'static str,
        /// The rejected value.
        value: f64,
    },
}

/// Error loading or validating engine configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Configuration file could not be read.
    #[error("failed to read config {path}: {source}")]
    Io {
        /// Path that failed.
        path: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Configuration document is not valid YAML for the schema.
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_yaml::Error),

    /// A value parsed but violates a constraint.
    #[error("invalid config value {key}: {reason}")]
    Invalid {
        /// Dotted key of the offending value.
        key: &'static str,
        /// Why it was rejected.
        reason: String,
    },
}

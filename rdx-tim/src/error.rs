//! Typed errors for user input.
//!
//! Everything past argument parsing is reported through `anyhow`; only the
//! malformed-input class needs a type of its own so the binary can answer it
//! with the usage text and exit status 1.

use thiserror::Error;

/// Why a time option such as `30,45` could not be read.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DurationError {
    /// Nothing was given at all.
    #[error("empty time option")]
    Empty,

    /// More than one comma.
    #[error("problematic time format: {0}")]
    TooManyParts(String),

    /// A part that is not a non-negative whole number.
    #[error("'{0}' is not a whole number")]
    InvalidNumber(String),

    /// The total does not fit into a countdown.
    #[error("time option '{0}' is too large")]
    Overflow(String),
}

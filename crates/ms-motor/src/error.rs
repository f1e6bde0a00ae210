//! Error types for motor and load characteristics.

use crate::grid::Column;
use ms_core::MsError;
use thiserror::Error;

/// Malformed operating grid. Raised before any simulation starts.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GridError {
    #[error("Grid needs at least 2 breakpoints, got {count}")]
    TooFewPoints { count: usize },

    #[error("Grid speeds must be strictly increasing: breakpoint {index} at {speed}% follows {prev}%")]
    NonMonotonic { index: usize, prev: f64, speed: f64 },

    #[error("Grid must span 0-100% speed: {which} breakpoint is at {speed}%")]
    NotAnchored { which: &'static str, speed: f64 },

    #[error("Negative {column} at breakpoint {index}: {value}")]
    Negative {
        column: Column,
        index: usize,
        value: f64,
    },

    #[error("Non-finite value at breakpoint {index}")]
    NonFinite { index: usize },

    #[error("Column {column} has {got} values, expected {expected}")]
    LengthMismatch {
        column: Column,
        expected: usize,
        got: usize,
    },
}

/// Errors for motor, load and start-method parameters.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MotorError {
    #[error("Invalid grid: {0}")]
    Grid(#[from] GridError),

    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },

    #[error(transparent)]
    Core(#[from] MsError),
}

pub type MotorResult<T> = Result<T, MotorError>;

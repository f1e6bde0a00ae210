//! Error types for simulation operations.

use ms_core::MsError;
use ms_motor::MotorError;
use thiserror::Error;

/// Errors encountered before or during a start simulation.
///
/// Stall, thermal trip and timeout are outcomes, not errors; they are
/// reported through [`crate::StartStatus`].
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SimError {
    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },

    #[error("Invalid motor data: {0}")]
    Motor(#[from] MotorError),

    #[error(transparent)]
    Core(#[from] MsError),

    #[error("Simulation cancelled at t = {time_s:.3} s")]
    Cancelled { time_s: f64 },
}

pub type SimResult<T> = Result<T, SimError>;

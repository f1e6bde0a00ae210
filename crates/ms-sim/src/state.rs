//! Run state and terminal result.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Terminal outcome of a start attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StartStatus {
    /// Reached running speed.
    Running,
    /// Net accelerating torque vanished below near-synchronous speed.
    Stalled,
    /// Thermal capacity exhausted.
    ThermalTrip,
    /// Hit the time ceiling while still accelerating.
    Timeout,
}

impl StartStatus {
    pub fn is_success(&self) -> bool {
        matches!(self, StartStatus::Running)
    }
}

impl fmt::Display for StartStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            StartStatus::Running => "RUNNING",
            StartStatus::Stalled => "STALL",
            StartStatus::ThermalTrip => "THERMAL TRIP",
            StartStatus::Timeout => "TIMEOUT",
        };
        f.write_str(label)
    }
}

/// Mutable state of one run, owned by the integrator.
#[derive(Clone, Debug, PartialEq)]
pub struct SimulationState {
    pub step: usize,
    pub time_s: f64,
    pub speed_pct: f64,
    pub thermal_capacity_used_pct: f64,
    pub min_torque_margin_pct: f64,
    pub peak_current_pct: f64,
}

impl Default for SimulationState {
    fn default() -> Self {
        Self {
            step: 0,
            time_s: 0.0,
            speed_pct: 0.0,
            thermal_capacity_used_pct: 0.0,
            min_torque_margin_pct: f64::INFINITY,
            peak_current_pct: 0.0,
        }
    }
}

/// Outcome of one run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SimulationResult {
    /// Start method label ("DOL" / "SS")
    pub method: String,
    pub status: StartStatus,
    pub elapsed_time_s: f64,
    pub thermal_capacity_used_pct: f64,
    /// Lowest net torque seen below near-synchronous speed (% FLT)
    pub min_torque_margin_pct: f64,
    pub peak_current_pct: f64,
    /// Lowest constant limit able to start the load (soft start only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minimum_starting_current_pct: Option<f64>,
    pub final_speed_pct: f64,
    pub steps: usize,
}

impl SimulationResult {
    pub(crate) fn from_state(method: &str, status: StartStatus, state: &SimulationState) -> Self {
        Self {
            method: method.to_string(),
            status,
            elapsed_time_s: state.time_s,
            thermal_capacity_used_pct: state.thermal_capacity_used_pct,
            min_torque_margin_pct: state.min_torque_margin_pct,
            peak_current_pct: state.peak_current_pct,
            minimum_starting_current_pct: None,
            final_speed_pct: state.speed_pct,
            steps: state.step,
        }
    }
}

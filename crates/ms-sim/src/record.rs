//! Decimated per-step trajectory for time-indexed charts.

use crate::integrator::OperatingPoint;
use crate::state::SimulationState;
use serde::{Deserialize, Serialize};

/// Operating point at the start of one integration step.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct StepSample {
    pub time_s: f64,
    pub speed_pct: f64,
    pub torque_pct: f64,
    pub current_pct: f64,
    pub load_torque_pct: f64,
    pub net_torque_pct: f64,
    pub voltage_ratio: f64,
    pub thermal_capacity_used_pct: f64,
}

impl StepSample {
    pub(crate) fn new(state: &SimulationState, point: &OperatingPoint) -> Self {
        Self {
            time_s: state.time_s,
            speed_pct: state.speed_pct,
            torque_pct: point.applied.torque_pct,
            current_pct: point.applied.current_pct,
            load_torque_pct: point.load_torque_pct,
            net_torque_pct: point.net_torque_pct,
            voltage_ratio: point.applied.voltage_ratio,
            thermal_capacity_used_pct: state.thermal_capacity_used_pct,
        }
    }
}

/// Record of a run: every N-th step plus the terminal step.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SimRecord {
    pub samples: Vec<StepSample>,
}

impl SimRecord {
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn times(&self) -> Vec<f64> {
        self.samples.iter().map(|s| s.time_s).collect()
    }

    pub fn last(&self) -> Option<&StepSample> {
        self.samples.last()
    }
}

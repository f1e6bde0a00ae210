//! Run limits and engine tuning constants.

use crate::error::{SimError, SimResult};
use ms_core::units::constants::LOCKED_ROTOR_REFERENCE_PCT;
use ms_core::{ensure_non_negative, ensure_positive};
use serde::{Deserialize, Serialize};

/// Integration step, time ceiling and thermal rating for one run.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SimLimits {
    /// Fixed time step (seconds)
    pub dt_s: f64,
    /// Hard time ceiling (seconds)
    pub max_time_s: f64,
    /// Permissible locked-rotor time (seconds)
    pub stall_time_rating_s: f64,
    /// Current basis of the stall-time rating (% FLC)
    pub locked_rotor_reference_pct: f64,
}

impl SimLimits {
    pub const DEFAULT_DT_S: f64 = 0.01;
    pub const DEFAULT_MAX_TIME_S: f64 = 60.0;

    /// Defaults for everything except the motor's stall-time rating.
    pub fn new(stall_time_rating_s: f64) -> Self {
        Self {
            dt_s: Self::DEFAULT_DT_S,
            max_time_s: Self::DEFAULT_MAX_TIME_S,
            stall_time_rating_s,
            locked_rotor_reference_pct: LOCKED_ROTOR_REFERENCE_PCT,
        }
    }

    pub fn with_dt(mut self, dt_s: f64) -> Self {
        self.dt_s = dt_s;
        self
    }

    pub fn with_max_time(mut self, max_time_s: f64) -> Self {
        self.max_time_s = max_time_s;
        self
    }

    pub fn validate(&self) -> SimResult<()> {
        ensure_positive(self.dt_s, "time step")?;
        ensure_positive(self.max_time_s, "max time")?;
        ensure_positive(self.stall_time_rating_s, "stall time rating")?;
        ensure_positive(self.locked_rotor_reference_pct, "locked-rotor reference")?;
        if self.dt_s > self.max_time_s {
            return Err(SimError::InvalidArg {
                what: "dt must not exceed max time",
            });
        }
        Ok(())
    }

    /// Step ceiling, `ceil(max_time / dt)`.
    pub fn max_steps(&self) -> usize {
        // Absorb representation error in e.g. 60 / 0.01.
        ((self.max_time_s / self.dt_s) - 1e-9).ceil().max(1.0) as usize
    }
}

/// Decision thresholds of the start engine.
///
/// Speeds in % of rated speed, torques in % of full-load torque.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineTuning {
    /// Net torque at or below this counts as zero for stall detection.
    pub stall_epsilon_pct: f64,
    /// No stall is declared before this much time has elapsed.
    pub settling_guard_s: f64,
    /// Stall detection and the margin minimum only apply below this speed.
    pub near_sync_speed_pct: f64,
    /// Speed at which the start counts as complete.
    pub running_speed_pct: f64,
    /// Current-limit resolution of the minimum-starting-current search.
    pub search_step_pct: f64,
    /// Speed resolution of the minimum-starting-current search.
    pub search_speed_step_pct: f64,
}

impl Default for EngineTuning {
    fn default() -> Self {
        Self {
            stall_epsilon_pct: 0.01,
            settling_guard_s: 0.3,
            near_sync_speed_pct: 95.0,
            running_speed_pct: 98.0,
            search_step_pct: 0.5,
            search_speed_step_pct: 0.5,
        }
    }
}

impl EngineTuning {
    pub fn validate(&self) -> SimResult<()> {
        ensure_non_negative(self.stall_epsilon_pct, "stall epsilon")?;
        ensure_non_negative(self.settling_guard_s, "settling guard")?;
        ensure_positive(self.near_sync_speed_pct, "near-synchronous speed")?;
        ensure_positive(self.running_speed_pct, "running speed")?;
        ensure_positive(self.search_step_pct, "search step")?;
        ensure_positive(self.search_speed_step_pct, "search speed step")?;
        if self.near_sync_speed_pct > self.running_speed_pct {
            return Err(SimError::InvalidArg {
                what: "near-synchronous speed must not exceed running speed",
            });
        }
        if self.running_speed_pct > 100.0 {
            return Err(SimError::InvalidArg {
                what: "running speed must not exceed 100%",
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn limits_defaults() {
        let limits = SimLimits::new(12.0);
        assert_eq!(limits.dt_s, 0.01);
        assert_eq!(limits.max_time_s, 60.0);
        assert_eq!(limits.locked_rotor_reference_pct, 600.0);
        assert_eq!(limits.max_steps(), 6000);
        assert!(limits.validate().is_ok());
    }

    #[test]
    fn max_steps_rounds_up() {
        let limits = SimLimits::new(10.0).with_dt(0.007).with_max_time(1.0);
        assert_eq!(limits.max_steps(), 143);
    }

    #[test]
    fn limits_invalid() {
        assert!(SimLimits::new(10.0).with_dt(0.0).validate().is_err());
        assert!(SimLimits::new(10.0).with_max_time(-1.0).validate().is_err());
        assert!(SimLimits::new(0.0).validate().is_err());
        assert!(SimLimits::new(10.0).with_dt(2.0).with_max_time(1.0).validate().is_err());
    }

    #[test]
    fn tuning_defaults_are_valid() {
        assert!(EngineTuning::default().validate().is_ok());
    }

    #[test]
    fn tuning_thresholds_ordered() {
        let tuning = EngineTuning {
            near_sync_speed_pct: 99.0,
            running_speed_pct: 98.0,
            ..EngineTuning::default()
        };
        assert!(tuning.validate().is_err());
    }

    #[test]
    fn tuning_partial_deserialize() {
        let tuning: EngineTuning = serde_json::from_str(r#"{"settling_guard_s": 0.5}"#).unwrap();
        assert_eq!(tuning.settling_guard_s, 0.5);
        assert_eq!(tuning.near_sync_speed_pct, 95.0);
    }
}

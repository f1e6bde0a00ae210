//! I²t thermal-capacity accounting during a start.

use crate::error::MotorResult;
use ms_core::ensure_positive;
use ms_core::units::constants::LOCKED_ROTOR_REFERENCE_PCT;

/// Thermal capacity reaches 100% when the motor carries its reference
/// locked-rotor current for its rated stall time:
///
/// ```text
/// Δcapacity[%] = (I / I_ref)^2 / t_stall * 100 * dt
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ThermalModel {
    /// Permissible locked-rotor time (s)
    pub stall_time_rating_s: f64,
    /// Current basis of the stall-time rating (% FLC)
    pub reference_current_pct: f64,
}

impl ThermalModel {
    /// Model using the conventional 600% locked-rotor basis.
    pub fn new(stall_time_rating_s: f64) -> MotorResult<Self> {
        Self::with_reference(stall_time_rating_s, LOCKED_ROTOR_REFERENCE_PCT)
    }

    pub fn with_reference(stall_time_rating_s: f64, reference_current_pct: f64) -> MotorResult<Self> {
        ensure_positive(stall_time_rating_s, "stall time rating")?;
        ensure_positive(reference_current_pct, "thermal reference current")?;
        Ok(Self {
            stall_time_rating_s,
            reference_current_pct,
        })
    }

    /// Capacity consumed by carrying `current_pct` for `dt` seconds.
    pub fn increment(&self, current_pct: f64, dt: f64) -> f64 {
        let ratio = current_pct / self.reference_current_pct;
        (ratio * ratio / self.stall_time_rating_s * 100.0 * dt).max(0.0)
    }

    /// New capacity-used figure after one step.
    pub fn accumulate(&self, used_pct: f64, current_pct: f64, dt: f64) -> f64 {
        used_pct + self.increment(current_pct, dt)
    }

    pub fn is_tripped(used_pct: f64) -> bool {
        used_pct >= 100.0
    }
}

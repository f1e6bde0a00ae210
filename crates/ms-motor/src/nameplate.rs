//! Motor nameplate and drive-train inertia.

use crate::error::{MotorError, MotorResult};
use ms_core::units::{Inertia, Torque, constants, kgm2, kw, rpm};
use ms_core::{ensure_non_negative, ensure_positive};
use serde::{Deserialize, Serialize};

/// Nameplate data plus the rotating inertia seen by the shaft.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MotorNameplate {
    /// Rated output power (kW)
    pub rated_power_kw: f64,
    /// Rated (full-load) speed (rpm)
    pub rated_speed_rpm: f64,
    /// Full-load current (A)
    pub rated_full_load_current_a: f64,
    /// Rotor inertia (kg·m²)
    pub motor_inertia_kgm2: f64,
    /// Driven-load inertia referred to the motor shaft (kg·m²)
    pub load_inertia_kgm2: f64,
}

impl MotorNameplate {
    /// Create a validated nameplate.
    ///
    /// # Errors
    /// Power, speed and full-load current must be positive, inertias
    /// non-negative with a positive sum.
    pub fn new(
        rated_power_kw: f64,
        rated_speed_rpm: f64,
        rated_full_load_current_a: f64,
        motor_inertia_kgm2: f64,
        load_inertia_kgm2: f64,
    ) -> MotorResult<Self> {
        let nameplate = Self {
            rated_power_kw,
            rated_speed_rpm,
            rated_full_load_current_a,
            motor_inertia_kgm2,
            load_inertia_kgm2,
        };
        nameplate.validate()?;
        Ok(nameplate)
    }

    /// Check a nameplate built by struct literal or deserialization.
    pub fn validate(&self) -> MotorResult<()> {
        ensure_positive(self.rated_power_kw, "rated power")?;
        ensure_positive(self.rated_speed_rpm, "rated speed")?;
        ensure_positive(self.rated_full_load_current_a, "full-load current")?;
        ensure_non_negative(self.motor_inertia_kgm2, "motor inertia")?;
        ensure_non_negative(self.load_inertia_kgm2, "load inertia")?;
        if self.total_inertia_kgm2() <= 0.0 {
            return Err(MotorError::InvalidArg {
                what: "total inertia must be positive",
            });
        }
        Ok(())
    }

    /// Full-load torque, `9550 · P[kW] / n[rpm]`.
    pub fn rated_torque(&self) -> Torque {
        constants::rated_torque(kw(self.rated_power_kw), rpm(self.rated_speed_rpm))
    }

    pub fn rated_torque_nm(&self) -> f64 {
        use uom::si::torque::newton_meter;
        self.rated_torque().get::<newton_meter>()
    }

    pub fn total_inertia(&self) -> Inertia {
        kgm2(self.total_inertia_kgm2())
    }

    pub fn total_inertia_kgm2(&self) -> f64 {
        self.motor_inertia_kgm2 + self.load_inertia_kgm2
    }

    /// Convert a percent-of-FLC figure into amperes.
    pub fn amps_from_pct(&self, current_pct: f64) -> f64 {
        self.rated_full_load_current_a * current_pct / 100.0
    }
}

//! Rotor dynamics of the motor-load shaft.

use crate::error::{SimError, SimResult};
use ms_core::units::rad_s_to_rpm;
use ms_motor::MotorNameplate;
use uom::si::moment_of_inertia::kilogram_square_meter;
use uom::si::torque::newton_meter;

/// Rigid shaft carrying motor and load inertia.
///
/// Models the rotational dynamics with torques expressed in % of full-load
/// torque and speed in % of rated speed:
///
/// ```text
/// J * dω/dt = T_net
/// T_net     = (net% / 100) * T_rated
/// Δn[rpm]   = dω * 60 / 2π
/// Δspeed%   = Δn / n_rated * 100
/// ```
///
/// where:
/// - J is the total moment of inertia (kg·m²)
/// - T_rated is nameplate full-load torque (N·m)
/// - n_rated is nameplate speed (rpm)
#[derive(Clone, Copy, Debug)]
pub struct Shaft {
    /// Moment of inertia (kg·m²)
    pub inertia: f64,
    /// Full-load torque (N·m)
    pub rated_torque_nm: f64,
    /// Rated speed (rpm), the 100% speed basis
    pub rated_speed_rpm: f64,
}

impl Shaft {
    /// Create a new shaft.
    ///
    /// # Errors
    /// Returns error if any parameter is not positive.
    pub fn new(inertia: f64, rated_torque_nm: f64, rated_speed_rpm: f64) -> SimResult<Self> {
        if !(inertia > 0.0) {
            return Err(SimError::InvalidArg {
                what: "shaft inertia must be positive",
            });
        }
        if !(rated_torque_nm > 0.0) {
            return Err(SimError::InvalidArg {
                what: "rated torque must be positive",
            });
        }
        if !(rated_speed_rpm > 0.0) {
            return Err(SimError::InvalidArg {
                what: "rated speed must be positive",
            });
        }

        Ok(Self {
            inertia,
            rated_torque_nm,
            rated_speed_rpm,
        })
    }

    pub fn from_nameplate(nameplate: &MotorNameplate) -> SimResult<Self> {
        Self::new(
            nameplate.total_inertia().get::<kilogram_square_meter>(),
            nameplate.rated_torque().get::<newton_meter>(),
            nameplate.rated_speed_rpm,
        )
    }

    /// Net torque in N·m from a % FLT figure.
    pub fn net_torque_nm(&self, net_torque_pct: f64) -> f64 {
        net_torque_pct / 100.0 * self.rated_torque_nm
    }

    /// Angular acceleration dω/dt (rad/s²).
    pub fn angular_acceleration(&self, net_torque_pct: f64) -> f64 {
        self.net_torque_nm(net_torque_pct) / self.inertia
    }

    /// Speed change (% of rated) over one forward-Euler step.
    pub fn speed_increment_pct(&self, net_torque_pct: f64, dt: f64) -> f64 {
        let delta_rpm = rad_s_to_rpm(self.angular_acceleration(net_torque_pct) * dt);
        delta_rpm / self.rated_speed_rpm * 100.0
    }

    /// Seconds to reach `speed_pct` from rest under constant `net_torque_pct`.
    pub fn time_to_speed(&self, speed_pct: f64, net_torque_pct: f64) -> Option<f64> {
        let rate = self.speed_increment_pct(net_torque_pct, 1.0);
        (rate > 0.0).then(|| speed_pct / rate)
    }
}

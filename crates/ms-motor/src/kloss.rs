//! Characteristic synthesis from datasheet setpoints (modified Kloss model).
//!
//! When only the four headline figures of a datasheet are known (locked-rotor
//! torque, pull-up torque, breakdown torque, locked-rotor current) a full
//! torque/current curve is synthesized and sampled onto an [`OperatingGrid`].
//!
//! ## Torque
//!
//! ```text
//! T(s) = 2 T_bd / (s / s_k + s_k / s)
//! ```
//!
//! `s_k` is chosen so `T(1) = T_lr`, and the synchronous point is placed so
//! that `T = 100%` at 100% (rated) speed. Below 60% speed a half-sine weight
//! pulls the curve toward the pull-up torque (at most 40% of the gap), which
//! reproduces the saddle of deep-bar rotors.
//!
//! ## Current
//!
//! ```text
//! I(s) = sqrt((I_a * s^0.4)^2 + I_m^2),   I_a = sqrt(I_lr^2 - I_m^2)
//! ```
//!
//! with a 30% magnetizing component `I_m`. `I(1) = I_lr` exactly.

use crate::error::{MotorError, MotorResult};
use crate::grid::{Breakpoint, OperatingGrid};
use crate::load::LoadProfile;
use ms_core::ensure_positive;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Magnetizing current (per unit of FLC)
const MAGNETIZING_PU: f64 = 0.30;
/// Breakdown slip used when locked-rotor torque is not below breakdown torque
const FALLBACK_BREAKDOWN_SLIP: f64 = 0.18;
/// Slip floor near synchronous speed
const MIN_SLIP: f64 = 1e-4;
/// Upper speed of the pull-up saddle (%)
const SADDLE_END_SPEED_PCT: f64 = 60.0;
/// Largest fraction of the gap to pull-up torque removed at the saddle centre
const SADDLE_DEPTH: f64 = 0.4;

/// Breakpoints used when a synthesized curve is tabulated.
pub const STANDARD_BREAKPOINTS: [f64; 13] = [
    0.0, 10.0, 20.0, 30.0, 40.0, 50.0, 60.0, 70.0, 80.0, 85.0, 90.0, 95.0, 100.0,
];

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct KlossCurve {
    pub locked_rotor_torque_pct: f64,
    pub pull_up_torque_pct: f64,
    pub breakdown_torque_pct: f64,
    pub locked_rotor_current_pct: f64,
}

impl KlossCurve {
    pub fn new(
        locked_rotor_torque_pct: f64,
        pull_up_torque_pct: f64,
        breakdown_torque_pct: f64,
        locked_rotor_current_pct: f64,
    ) -> MotorResult<Self> {
        let curve = Self {
            locked_rotor_torque_pct,
            pull_up_torque_pct,
            breakdown_torque_pct,
            locked_rotor_current_pct,
        };
        curve.validate()?;
        Ok(curve)
    }

    pub fn validate(&self) -> MotorResult<()> {
        ensure_positive(self.locked_rotor_torque_pct, "locked-rotor torque")?;
        ensure_positive(self.pull_up_torque_pct, "pull-up torque")?;
        ensure_positive(self.breakdown_torque_pct, "breakdown torque")?;
        ensure_positive(self.locked_rotor_current_pct, "locked-rotor current")?;
        if self.breakdown_torque_pct <= 100.0 {
            return Err(MotorError::InvalidArg {
                what: "breakdown torque must exceed full-load torque",
            });
        }
        if self.locked_rotor_current_pct <= MAGNETIZING_PU * 100.0 {
            return Err(MotorError::InvalidArg {
                what: "locked-rotor current must exceed magnetizing current",
            });
        }
        Ok(())
    }

    /// Slip at breakdown torque.
    pub fn breakdown_slip(&self) -> f64 {
        let b = self.breakdown_torque_pct / self.locked_rotor_torque_pct;
        if b > 1.0 {
            b - (b * b - 1.0).sqrt()
        } else {
            FALLBACK_BREAKDOWN_SLIP
        }
    }

    /// Slip at which the Kloss curve delivers full-load torque.
    pub fn rated_slip(&self) -> f64 {
        let tb = self.breakdown_torque_pct / 100.0;
        self.breakdown_slip() * (tb - (tb * tb - 1.0).sqrt())
    }

    /// Synchronous speed expressed in % of rated speed.
    pub fn synchronous_speed_pct(&self) -> f64 {
        100.0 / (1.0 - self.rated_slip())
    }

    fn slip_at(&self, speed_pct: f64) -> f64 {
        let sync = self.synchronous_speed_pct();
        ((sync - speed_pct) / sync).max(MIN_SLIP)
    }

    /// Motor torque (% FLT) at `speed_pct`.
    pub fn torque_pct(&self, speed_pct: f64) -> f64 {
        let s = self.slip_at(speed_pct);
        let sk = self.breakdown_slip();
        let tb = self.breakdown_torque_pct / 100.0;
        let mut torque = 2.0 * tb / (s / sk + sk / s);

        if speed_pct > 0.0 && speed_pct < SADDLE_END_SPEED_PCT {
            let weight = (speed_pct / SADDLE_END_SPEED_PCT * PI).sin();
            let sag = (self.pull_up_torque_pct / 100.0) / torque;
            if sag < 1.0 {
                torque *= 1.0 - (1.0 - sag) * weight * SADDLE_DEPTH;
            }
        }
        torque * 100.0
    }

    /// Line current (% FLC) at `speed_pct`.
    pub fn current_pct(&self, speed_pct: f64) -> f64 {
        let s = self.slip_at(speed_pct);
        let i_lr = self.locked_rotor_current_pct / 100.0;
        let i_active = (i_lr * i_lr - MAGNETIZING_PU * MAGNETIZING_PU).sqrt() * s.powf(0.4);
        (i_active * i_active + MAGNETIZING_PU * MAGNETIZING_PU).sqrt() * 100.0
    }

    /// Tabulate onto `breakpoints`. The load column holds the unscaled load
    /// shape; a grid-direct load has nothing to tabulate and is rejected.
    pub fn to_grid(&self, breakpoints: &[f64], load: &LoadProfile) -> MotorResult<OperatingGrid> {
        let mut points = Vec::with_capacity(breakpoints.len());
        for &speed in breakpoints {
            let load_torque = load.shape_torque(speed).ok_or(MotorError::InvalidArg {
                what: "synthesized characteristic needs a centrifugal or constant load",
            })?;
            points.push(Breakpoint::new(
                speed,
                self.torque_pct(speed),
                self.current_pct(speed),
                load_torque,
            ));
        }
        Ok(OperatingGrid::new(points)?)
    }
}

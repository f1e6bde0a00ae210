//! Start methods and the voltage-limited torque/current transform.
//!
//! A soft starter limits line current by reducing terminal voltage. In the
//! lumped model current scales linearly and torque with the square of the
//! voltage ratio:
//!
//! ```text
//! v       = min(1, I_limit / I_raw)      (v = 1 when I_raw = 0)
//! I_app   = I_raw * v
//! T_app   = T_raw * v^2
//! ```
//!
//! Direct-on-line starting is the same transform with an unbounded limit, so
//! both methods share one code path.

use crate::error::MotorResult;
use ms_core::{ensure_non_negative, ensure_positive};
use serde::{Deserialize, Serialize};

/// Current-limit ramp of a soft starter, in % of full-load current.
///
/// ```text
/// limit(t) = min(final, initial + (final - initial) * min(1, t / ramp))
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SoftStartRamp {
    pub initial_current_limit_pct: f64,
    pub final_current_limit_pct: f64,
    pub ramp_duration_s: f64,
}

impl SoftStartRamp {
    pub fn new(
        initial_current_limit_pct: f64,
        final_current_limit_pct: f64,
        ramp_duration_s: f64,
    ) -> MotorResult<Self> {
        let ramp = Self {
            initial_current_limit_pct,
            final_current_limit_pct,
            ramp_duration_s,
        };
        ramp.validate()?;
        Ok(ramp)
    }

    /// Fixed limit from t = 0.
    pub fn constant(limit_pct: f64) -> MotorResult<Self> {
        Self::new(limit_pct, limit_pct, 0.0)
    }

    pub fn validate(&self) -> MotorResult<()> {
        ensure_positive(self.initial_current_limit_pct, "initial current limit")?;
        ensure_positive(self.final_current_limit_pct, "final current limit")?;
        ensure_non_negative(self.ramp_duration_s, "ramp duration")?;
        Ok(())
    }

    pub fn limit_at(&self, t: f64) -> f64 {
        let progress = if self.ramp_duration_s > 0.0 {
            (t / self.ramp_duration_s).clamp(0.0, 1.0)
        } else {
            1.0
        };
        let ramped = self.initial_current_limit_pct
            + (self.final_current_limit_pct - self.initial_current_limit_pct) * progress;
        ramped.min(self.final_current_limit_pct)
    }
}

/// Energization strategy.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum StartMethod {
    /// Direct-on-line: full voltage, no limiting.
    Direct,
    /// Voltage-controlled current limiting.
    SoftStart(SoftStartRamp),
}

impl StartMethod {
    pub fn validate(&self) -> MotorResult<()> {
        match self {
            StartMethod::Direct => Ok(()),
            StartMethod::SoftStart(ramp) => ramp.validate(),
        }
    }

    /// Current limit (% FLC) in force at time `t`. Unbounded for DOL.
    pub fn current_limit_at(&self, t: f64) -> f64 {
        match self {
            StartMethod::Direct => f64::INFINITY,
            StartMethod::SoftStart(ramp) => ramp.limit_at(t),
        }
    }

    /// Limit once any ramp has completed.
    pub fn steady_limit(&self) -> f64 {
        match self {
            StartMethod::Direct => f64::INFINITY,
            StartMethod::SoftStart(ramp) => ramp.final_current_limit_pct,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            StartMethod::Direct => "DOL",
            StartMethod::SoftStart(_) => "SS",
        }
    }

    pub fn is_soft_start(&self) -> bool {
        matches!(self, StartMethod::SoftStart(_))
    }
}

/// Motor operating point after the start-method transform.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AppliedPoint {
    /// Applied torque (% FLT)
    pub torque_pct: f64,
    /// Applied line current (% FLC)
    pub current_pct: f64,
    /// Terminal voltage ratio in [0, 1]
    pub voltage_ratio: f64,
}

/// Voltage ratio needed to hold `raw_current_pct` at `current_limit_pct`.
pub fn voltage_ratio(raw_current_pct: f64, current_limit_pct: f64) -> f64 {
    if raw_current_pct <= 0.0 {
        return 1.0;
    }
    (current_limit_pct / raw_current_pct).clamp(0.0, 1.0)
}

/// Apply a current limit to a raw (full-voltage) operating point.
pub fn apply(raw_torque_pct: f64, raw_current_pct: f64, current_limit_pct: f64) -> AppliedPoint {
    let v = voltage_ratio(raw_current_pct, current_limit_pct);
    AppliedPoint {
        torque_pct: raw_torque_pct * v * v,
        current_pct: raw_current_pct * v,
        voltage_ratio: v,
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn unbounded_limit_is_identity(t in 0.001_f64..500.0, c in 0.001_f64..1000.0) {
            let p = apply(t, c, f64::INFINITY);
            prop_assert_eq!(p.torque_pct, t);
            prop_assert_eq!(p.current_pct, c);
        }

        #[test]
        fn lowering_limit_never_raises_output(
            t in 0.0_f64..500.0,
            c in 0.0_f64..1000.0,
            hi in 1.0_f64..1000.0,
            frac in 0.0_f64..1.0,
        ) {
            let lo = hi * frac;
            let a = apply(t, c, hi);
            let b = apply(t, c, lo);
            prop_assert!(b.torque_pct <= a.torque_pct);
            prop_assert!(b.current_pct <= a.current_pct);
        }

        #[test]
        fn applied_current_never_exceeds_limit(c in 0.0_f64..1000.0, limit in 1.0_f64..800.0) {
            let p = apply(100.0, c, limit);
            prop_assert!(p.current_pct <= limit + 1e-9);
            prop_assert!(p.current_pct <= c + 1e-12);
        }
    }
}

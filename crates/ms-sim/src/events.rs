//! Per-step terminal-condition checks.

use crate::options::EngineTuning;
use crate::state::StartStatus;
use ms_motor::ThermalModel;

/// Stall: no usable torque below near-synchronous speed, once settled.
pub(crate) fn is_stalled(
    tuning: &EngineTuning,
    speed_pct: f64,
    net_torque_pct: f64,
    time_s: f64,
) -> bool {
    speed_pct < tuning.near_sync_speed_pct
        && net_torque_pct <= tuning.stall_epsilon_pct
        && time_s > tuning.settling_guard_s
}

/// Post-integration checks, in precedence order.
pub(crate) fn after_step(
    tuning: &EngineTuning,
    thermal_used_pct: f64,
    step: usize,
    max_steps: usize,
    speed_pct: f64,
) -> Option<StartStatus> {
    if ThermalModel::is_tripped(thermal_used_pct) {
        Some(StartStatus::ThermalTrip)
    } else if step >= max_steps {
        Some(StartStatus::Timeout)
    } else if speed_pct >= tuning.running_speed_pct {
        Some(StartStatus::Running)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_stall_during_settling() {
        let tuning = EngineTuning::default();
        assert!(!is_stalled(&tuning, 0.0, -10.0, 0.1));
        assert!(is_stalled(&tuning, 0.0, -10.0, 0.31));
    }

    #[test]
    fn no_stall_near_synchronous_speed() {
        let tuning = EngineTuning::default();
        assert!(!is_stalled(&tuning, 96.0, 0.0, 5.0));
        assert!(is_stalled(&tuning, 94.0, 0.0, 5.0));
    }

    #[test]
    fn small_positive_net_counts_as_stall() {
        let tuning = EngineTuning::default();
        assert!(is_stalled(&tuning, 0.0, 0.005, 0.31));
        assert!(!is_stalled(&tuning, 0.0, 0.02, 0.31));
    }

    #[test]
    fn thermal_trip_takes_precedence() {
        let tuning = EngineTuning::default();
        assert_eq!(
            after_step(&tuning, 100.0, 6000, 6000, 99.0),
            Some(StartStatus::ThermalTrip)
        );
        assert_eq!(
            after_step(&tuning, 50.0, 6000, 6000, 99.0),
            Some(StartStatus::Timeout)
        );
        assert_eq!(
            after_step(&tuning, 50.0, 10, 6000, 98.0),
            Some(StartStatus::Running)
        );
        assert_eq!(after_step(&tuning, 50.0, 10, 6000, 50.0), None);
    }
}

//! Static minimum-starting-current search.
//!
//! Finds the lowest constant current limit at which the reduced-voltage motor
//! torque stays above the load torque over the whole acceleration range.
//! Start capability is monotonic in the limit (higher limit, higher voltage
//! ratio, more torque), so the trial index is bisected.

use ms_motor::{CharacteristicTable, LoadProfile, apply};

use crate::options::EngineTuning;

/// Lowest trial limit lies at full-load current.
const SEARCH_FLOOR_PCT: f64 = 100.0;

/// Lowest limit `100 + k * step` able to start the load, or `None` when the
/// load cannot be started even at full voltage.
pub fn minimum_starting_current(
    table: &CharacteristicTable,
    load: &LoadProfile,
    tuning: &EngineTuning,
) -> Option<f64> {
    let speeds = sample_speeds(tuning);
    let top = top_trial_index(table, tuning);
    let passes = |k: usize| starts_at(table, load, tuning, &speeds, trial_limit(k, tuning));

    if !passes(top) {
        return None;
    }

    // Invariant: passes(hi), and every index below lo fails.
    let (mut lo, mut hi) = (0usize, top);
    while lo < hi {
        let mid = lo + (hi - lo) / 2;
        if passes(mid) {
            hi = mid;
        } else {
            lo = mid + 1;
        }
    }
    Some(trial_limit(hi, tuning))
}

fn trial_limit(k: usize, tuning: &EngineTuning) -> f64 {
    SEARCH_FLOOR_PCT + k as f64 * tuning.search_step_pct
}

/// First trial index whose limit reaches the table's peak current.
fn top_trial_index(table: &CharacteristicTable, tuning: &EngineTuning) -> usize {
    let excess = (table.max_current() - SEARCH_FLOOR_PCT).max(0.0);
    (excess / tuning.search_step_pct).ceil() as usize
}

/// Speeds in `[0, near_sync)` at the search resolution.
fn sample_speeds(tuning: &EngineTuning) -> Vec<f64> {
    (0..)
        .map(|i| i as f64 * tuning.search_speed_step_pct)
        .take_while(|s| *s < tuning.near_sync_speed_pct)
        .collect()
}

fn starts_at(
    table: &CharacteristicTable,
    load: &LoadProfile,
    tuning: &EngineTuning,
    speeds: &[f64],
    limit_pct: f64,
) -> bool {
    speeds.iter().all(|&s| {
        let applied = apply(table.motor_torque(s), table.motor_current(s), limit_pct);
        applied.torque_pct - load.torque_at(table, s) > tuning.stall_epsilon_pct
    })
}

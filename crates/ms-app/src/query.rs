//! Query helpers for loaded runs and case curves.

use std::fmt::Write as _;

use ms_project::schema::CaseDef;
use ms_results::RunMethod;
use ms_sim::{CurveSampler, CurveSet, Domain, StepSample};
use tracing::warn;

use crate::case_compile;
use crate::error::{AppError, AppResult};

/// Summary of a recorded trajectory.
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub time_range: (f64, f64),
    pub record_count: usize,
    pub final_speed_pct: f64,
    pub peak_current_pct: f64,
    pub min_net_torque_pct: f64,
    pub thermal_capacity_used_pct: f64,
}

/// Get run summary from trace samples.
pub fn get_run_summary(trace: &[StepSample]) -> AppResult<RunSummary> {
    let (Some(first), Some(last)) = (trace.first(), trace.last()) else {
        return Err(AppError::InvalidInput("No samples in run".to_string()));
    };

    let peak_current_pct = trace
        .iter()
        .map(|s| s.current_pct)
        .fold(f64::NEG_INFINITY, f64::max);
    let min_net_torque_pct = trace
        .iter()
        .map(|s| s.net_torque_pct)
        .fold(f64::INFINITY, f64::min);

    Ok(RunSummary {
        time_range: (first.time_s, last.time_s),
        record_count: trace.len(),
        final_speed_pct: last.speed_pct,
        peak_current_pct,
        min_net_torque_pct,
        thermal_capacity_used_pct: last.thermal_capacity_used_pct,
    })
}

/// Extract `(time, value)` pairs for one trace column.
pub fn extract_trace_series(trace: &[StepSample], variable: &str) -> AppResult<Vec<(f64, f64)>> {
    let pick: fn(&StepSample) -> f64 = match variable {
        "speed" | "speed_pct" => |s| s.speed_pct,
        "torque" | "torque_pct" => |s| s.torque_pct,
        "current" | "current_pct" => |s| s.current_pct,
        "load" | "load_torque_pct" => |s| s.load_torque_pct,
        "net" | "net_torque_pct" => |s| s.net_torque_pct,
        "voltage" | "voltage_ratio" => |s| s.voltage_ratio,
        "thermal" | "thermal_capacity_used_pct" => |s| s.thermal_capacity_used_pct,
        _ => {
            return Err(AppError::InvalidInput(format!(
                "Unknown trace variable: {variable}"
            )));
        }
    };
    Ok(trace.iter().map(|s| (s.time_s, pick(s))).collect())
}

/// Sample chart series for one case and start method.
pub fn sample_curves(case: &CaseDef, method: RunMethod, domain: Domain) -> AppResult<CurveSet> {
    let inputs = case_compile::compile_case(case, method)?;
    let sampler = CurveSampler::from_inputs(&inputs)?;
    Ok(sampler.sample(domain)?)
}

/// Render a curve set as CSV with a header row. Time-indexed sets lead with
/// a `time_s` column.
pub fn curves_to_csv(curves: &CurveSet) -> String {
    let time_axis = matches!(curves.domain, Domain::Time { .. });
    let mut out = String::new();
    if time_axis {
        out.push_str(curves.domain.axis_label());
        out.push(',');
    }
    out.push_str(
        "speed_pct,applied_torque_pct,applied_current_pct,load_torque_pct,direct_torque_pct,direct_current_pct\n",
    );
    for i in 0..curves.len() {
        if time_axis {
            let _ = write!(out, "{:.6},", curves.x[i]);
        }
        let _ = writeln!(
            out,
            "{:.6},{:.6},{:.6},{:.6},{:.6},{:.6}",
            curves.speed_pct[i],
            curves.applied_torque_pct[i],
            curves.applied_current_pct[i],
            curves.load_torque_pct[i],
            curves.direct_torque_pct[i],
            curves.direct_current_pct[i],
        );
    }
    out
}

/// Lowest constant soft-start limit able to start the case's load.
pub fn minimum_current(case: &CaseDef) -> AppResult<Option<f64>> {
    let inputs = case_compile::compile_case(case, RunMethod::Direct)?;
    let limit = ms_sim::minimum_starting_current(&inputs.table, &inputs.load, &inputs.tuning);
    if limit.is_none() {
        warn!(case = %case.id, "load cannot be started at any current limit");
    }
    Ok(limit)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(time_s: f64, speed_pct: f64, current_pct: f64, net: f64) -> StepSample {
        StepSample {
            time_s,
            speed_pct,
            torque_pct: 150.0,
            current_pct,
            load_torque_pct: 150.0 - net,
            net_torque_pct: net,
            voltage_ratio: 1.0,
            thermal_capacity_used_pct: time_s,
        }
    }

    #[test]
    fn summary_of_empty_trace_is_an_error() {
        assert!(matches!(
            get_run_summary(&[]),
            Err(AppError::InvalidInput(_))
        ));
    }

    #[test]
    fn summary_tracks_extremes() {
        let trace = vec![
            sample(0.0, 0.0, 600.0, 40.0),
            sample(0.5, 30.0, 580.0, 5.0),
            sample(1.0, 60.0, 520.0, 25.0),
        ];
        let summary = get_run_summary(&trace).unwrap();
        assert_eq!(summary.time_range, (0.0, 1.0));
        assert_eq!(summary.record_count, 3);
        assert_eq!(summary.peak_current_pct, 600.0);
        assert_eq!(summary.min_net_torque_pct, 5.0);
        assert_eq!(summary.final_speed_pct, 60.0);
        assert_eq!(summary.thermal_capacity_used_pct, 1.0);
    }

    #[test]
    fn unknown_trace_variable_rejected() {
        let trace = vec![sample(0.0, 0.0, 600.0, 40.0)];
        assert!(extract_trace_series(&trace, "slip").is_err());
        let speed = extract_trace_series(&trace, "speed").unwrap();
        assert_eq!(speed, vec![(0.0, 0.0)]);
    }
}

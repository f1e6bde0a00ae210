//! Fixed-step start transient integrator.
//!
//! Each step evaluates the characteristic at the present speed, applies the
//! start-method current limit, advances the shaft by forward Euler and checks
//! the terminal conditions:
//!
//! ```text
//! Accelerating ──▶ Running      (speed >= running threshold)
//!              ├─▶ Stalled      (net torque ~ 0 below near-sync, after settling)
//!              ├─▶ ThermalTrip  (thermal capacity >= 100%)
//!              └─▶ Timeout      (step ceiling reached)
//! ```
//!
//! A run is bounded by `ceil(max_time / dt)` steps.

use std::sync::atomic::{AtomicBool, Ordering};

use ms_motor::{
    AppliedPoint, CharacteristicTable, LoadProfile, MotorNameplate, StartMethod, ThermalModel,
    apply,
};
use tracing::{debug, warn};

use crate::error::{SimError, SimResult};
use crate::events;
use crate::options::{EngineTuning, SimLimits};
use crate::record::{SimRecord, StepSample};
use crate::search;
use crate::shaft::Shaft;
use crate::state::{SimulationResult, SimulationState, StartStatus};

/// Emit a progress event every this many steps.
const PROGRESS_INTERVAL_STEPS: usize = 50;

/// Immutable snapshot of everything one run reads.
#[derive(Clone, Debug)]
pub struct EngineInputs {
    pub nameplate: MotorNameplate,
    pub table: CharacteristicTable,
    pub method: StartMethod,
    pub load: LoadProfile,
    pub limits: SimLimits,
    pub tuning: EngineTuning,
}

impl EngineInputs {
    /// Bundle and validate run inputs with default tuning.
    pub fn new(
        nameplate: MotorNameplate,
        table: CharacteristicTable,
        method: StartMethod,
        load: LoadProfile,
        limits: SimLimits,
    ) -> SimResult<Self> {
        let inputs = Self {
            nameplate,
            table,
            method,
            load,
            limits,
            tuning: EngineTuning::default(),
        };
        inputs.validate()?;
        Ok(inputs)
    }

    pub fn with_tuning(mut self, tuning: EngineTuning) -> SimResult<Self> {
        tuning.validate()?;
        self.tuning = tuning;
        Ok(self)
    }

    /// Same inputs under a different start method.
    pub fn with_method(&self, method: StartMethod) -> SimResult<Self> {
        method.validate()?;
        Ok(Self {
            method,
            ..self.clone()
        })
    }

    pub fn validate(&self) -> SimResult<()> {
        self.nameplate.validate()?;
        self.method.validate()?;
        self.load.validate()?;
        self.limits.validate()?;
        self.tuning.validate()?;
        Ok(())
    }

    pub fn operating_point(&self, speed_pct: f64, time_s: f64) -> OperatingPoint {
        operating_point(&self.table, &self.method, &self.load, speed_pct, time_s)
    }
}

/// Raw and applied motor quantities at one speed and time.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OperatingPoint {
    pub raw_torque_pct: f64,
    pub raw_current_pct: f64,
    pub applied: AppliedPoint,
    pub load_torque_pct: f64,
    pub net_torque_pct: f64,
}

/// Characteristic lookup + start-method transform. Shared by the integrator
/// and the curve sampler.
pub fn operating_point(
    table: &CharacteristicTable,
    method: &StartMethod,
    load: &LoadProfile,
    speed_pct: f64,
    time_s: f64,
) -> OperatingPoint {
    operating_point_at_limit(table, load, speed_pct, method.current_limit_at(time_s))
}

pub fn operating_point_at_limit(
    table: &CharacteristicTable,
    load: &LoadProfile,
    speed_pct: f64,
    current_limit_pct: f64,
) -> OperatingPoint {
    let raw_torque_pct = table.motor_torque(speed_pct);
    let raw_current_pct = table.motor_current(speed_pct);
    let load_torque_pct = load.torque_at(table, speed_pct);
    let applied = apply(raw_torque_pct, raw_current_pct, current_limit_pct);
    OperatingPoint {
        raw_torque_pct,
        raw_current_pct,
        applied,
        load_torque_pct,
        net_torque_pct: applied.torque_pct - load_torque_pct,
    }
}

/// Progress snapshot for long-running callers.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SimProgress {
    pub step: usize,
    pub max_steps: usize,
    pub time_s: f64,
    pub speed_pct: f64,
    pub thermal_capacity_used_pct: f64,
}

impl SimProgress {
    pub fn fraction_complete(&self) -> f64 {
        (self.step as f64 / self.max_steps.max(1) as f64).min(1.0)
    }
}

/// Optional observers of a run.
#[derive(Default)]
pub struct RunHooks<'h> {
    pub progress: Option<&'h mut dyn FnMut(SimProgress)>,
    pub cancel: Option<&'h AtomicBool>,
    /// Destination and decimation (record every N-th step).
    pub record: Option<(&'h mut SimRecord, usize)>,
}

/// Start transient state machine over one input snapshot.
pub struct TransientIntegrator<'a> {
    inputs: &'a EngineInputs,
    shaft: Shaft,
    thermal: ThermalModel,
    max_steps: usize,
}

impl<'a> TransientIntegrator<'a> {
    pub fn new(inputs: &'a EngineInputs) -> SimResult<Self> {
        inputs.validate()?;
        let shaft = Shaft::from_nameplate(&inputs.nameplate)?;
        let thermal = ThermalModel::with_reference(
            inputs.limits.stall_time_rating_s,
            inputs.limits.locked_rotor_reference_pct,
        )?;
        Ok(Self {
            inputs,
            shaft,
            thermal,
            max_steps: inputs.limits.max_steps(),
        })
    }

    pub fn max_steps(&self) -> usize {
        self.max_steps
    }

    /// Advance `state` by one step. Returns the operating point the step was
    /// evaluated at and the terminal status, if one fired.
    pub fn step(&self, state: &mut SimulationState) -> (StepSample, Option<StartStatus>) {
        let tuning = &self.inputs.tuning;
        let dt = self.inputs.limits.dt_s;

        let point = self.inputs.operating_point(state.speed_pct, state.time_s);
        let net = point.net_torque_pct;

        if state.speed_pct < tuning.near_sync_speed_pct {
            state.min_torque_margin_pct = state.min_torque_margin_pct.min(net);
        }
        state.peak_current_pct = state.peak_current_pct.max(point.applied.current_pct);

        let sample = StepSample::new(state, &point);

        if events::is_stalled(tuning, state.speed_pct, net, state.time_s) {
            return (sample, Some(StartStatus::Stalled));
        }

        // A passive load cannot drive the rotor backwards.
        state.speed_pct = (state.speed_pct + self.shaft.speed_increment_pct(net, dt)).max(0.0);
        state.thermal_capacity_used_pct =
            self.thermal
                .accumulate(state.thermal_capacity_used_pct, point.applied.current_pct, dt);
        state.step += 1;
        state.time_s = state.step as f64 * dt;

        let terminal = events::after_step(
            tuning,
            state.thermal_capacity_used_pct,
            state.step,
            self.max_steps,
            state.speed_pct,
        );
        (sample, terminal)
    }

    /// Sample of `state` as it stands, after the last update.
    fn sample_at(&self, state: &SimulationState) -> StepSample {
        let point = self.inputs.operating_point(state.speed_pct, state.time_s);
        StepSample::new(state, &point)
    }

    /// Run from rest to a terminal status.
    pub fn run(&self, mut hooks: RunHooks<'_>) -> SimResult<SimulationResult> {
        let inputs = self.inputs;
        debug!(
            method = inputs.method.label(),
            dt_s = inputs.limits.dt_s,
            max_steps = self.max_steps,
            "starting run"
        );

        let mut state = SimulationState::default();
        let status = loop {
            if hooks.cancel.is_some_and(|flag| flag.load(Ordering::Relaxed)) {
                debug!(time_s = state.time_s, "run cancelled");
                return Err(SimError::Cancelled {
                    time_s: state.time_s,
                });
            }

            let step_index = state.step;
            let (sample, terminal) = self.step(&mut state);

            if let Some((record, every)) = hooks.record.as_mut() {
                let keep = step_index % (*every).max(1) == 0;
                match terminal {
                    None if keep => record.samples.push(sample),
                    None => {}
                    // A stall leaves the state where the sample found it.
                    Some(StartStatus::Stalled) => record.samples.push(sample),
                    Some(_) => {
                        if keep {
                            record.samples.push(sample);
                        }
                        record.samples.push(self.sample_at(&state));
                    }
                }
            }

            if let Some(cb) = hooks.progress.as_deref_mut() {
                if terminal.is_some() || state.step % PROGRESS_INTERVAL_STEPS == 0 {
                    cb(SimProgress {
                        step: state.step,
                        max_steps: self.max_steps,
                        time_s: state.time_s,
                        speed_pct: state.speed_pct,
                        thermal_capacity_used_pct: state.thermal_capacity_used_pct,
                    });
                }
            }

            if let Some(status) = terminal {
                break status;
            }
        };

        let mut result = SimulationResult::from_state(inputs.method.label(), status, &state);
        if inputs.method.is_soft_start() {
            result.minimum_starting_current_pct =
                search::minimum_starting_current(&inputs.table, &inputs.load, &inputs.tuning);
            if result.minimum_starting_current_pct.is_none() {
                warn!("load cannot be started even at full voltage");
            }
        }

        debug!(
            method = inputs.method.label(),
            status = %result.status,
            elapsed_s = result.elapsed_time_s,
            min_margin_pct = result.min_torque_margin_pct,
            peak_current_pct = result.peak_current_pct,
            thermal_pct = result.thermal_capacity_used_pct,
            "run finished"
        );
        Ok(result)
    }
}

/// Simulate one start from rest.
pub fn simulate(inputs: &EngineInputs) -> SimResult<SimulationResult> {
    TransientIntegrator::new(inputs)?.run(RunHooks::default())
}

/// Simulate with an optional progress callback and cancellation flag.
pub fn simulate_with_progress<'a>(
    inputs: &EngineInputs,
    progress: Option<&'a mut dyn FnMut(SimProgress)>,
    cancel: Option<&'a AtomicBool>,
) -> SimResult<SimulationResult> {
    TransientIntegrator::new(inputs)?.run(RunHooks {
        progress,
        cancel,
        record: None,
    })
}

/// Simulate and keep every `record_every`-th step plus the terminal state.
pub fn simulate_traced(
    inputs: &EngineInputs,
    record_every: usize,
) -> SimResult<(SimulationResult, SimRecord)> {
    let mut record = SimRecord::default();
    let result = TransientIntegrator::new(inputs)?.run(RunHooks {
        progress: None,
        cancel: None,
        record: Some((&mut record, record_every)),
    })?;
    Ok((result, record))
}


#[cfg(test)]
mod tests {
    use super::test_support::pump_inputs;
    use super::*;
    use ms_motor::SoftStartRamp;

    #[test]
    fn direct_start_reaches_running() {
        let result = simulate(&pump_inputs(StartMethod::Direct)).unwrap();
        assert_eq!(result.status, StartStatus::Running);
        assert!(result.elapsed_time_s > 0.0 && result.elapsed_time_s < 60.0);
        assert!(result.final_speed_pct >= 98.0);
        assert_eq!(result.peak_current_pct, 600.0);
        assert!(result.min_torque_margin_pct > 0.0);
        assert!(result.minimum_starting_current_pct.is_none());
    }

    #[test]
    fn step_updates_state_once() {
        let inputs = pump_inputs(StartMethod::Direct);
        let integrator = TransientIntegrator::new(&inputs).unwrap();
        let mut state = SimulationState::default();
        let (sample, terminal) = integrator.step(&mut state);
        assert!(terminal.is_none());
        assert_eq!(sample.time_s, 0.0);
        assert_eq!(sample.net_torque_pct, 170.0);
        assert_eq!(state.step, 1);
        assert!((state.time_s - 0.01).abs() < 1e-15);
        assert!(state.speed_pct > 0.0);
        assert_eq!(state.min_torque_margin_pct, 170.0);
    }

    #[test]
    fn soft_start_reports_minimum_current() {
        let ramp = SoftStartRamp::constant(350.0).unwrap();
        let result = simulate(&pump_inputs(StartMethod::SoftStart(ramp))).unwrap();
        let min_current = result.minimum_starting_current_pct.unwrap();
        assert!(min_current >= 100.0 && min_current <= 600.0);
        assert!(result.peak_current_pct <= 350.0 + 1e-9);
    }

    #[test]
    fn traced_run_records_decimated_steps() {
        let inputs = pump_inputs(StartMethod::Direct);
        let (result, record) = simulate_traced(&inputs, 10).unwrap();
        assert!(!record.is_empty());
        assert_eq!(record.samples[0].time_s, 0.0);
        let expected = result.steps.div_ceil(10);
        assert!(record.len() == expected || record.len() == expected + 1);
        let times = record.times();
        assert!(times.windows(2).all(|w| w[1] > w[0]));
    }

    #[test]
    fn trace_ends_at_final_state() {
        let inputs = pump_inputs(StartMethod::Direct);
        let (result, record) = simulate_traced(&inputs, 7).unwrap();
        assert_eq!(result.status, StartStatus::Running);
        let last = record.last().unwrap();
        assert_eq!(last.time_s, result.elapsed_time_s);
        assert_eq!(last.speed_pct, result.final_speed_pct);
        assert!(last.speed_pct >= 98.0);
        assert_eq!(last.thermal_capacity_used_pct, result.thermal_capacity_used_pct);
    }

    #[test]
    fn tripped_trace_ends_over_capacity() {
        let mut inputs = pump_inputs(StartMethod::Direct);
        inputs.limits.stall_time_rating_s = 0.2;
        let (result, record) = simulate_traced(&inputs, 5).unwrap();
        assert_eq!(result.status, StartStatus::ThermalTrip);
        let last = record.last().unwrap();
        assert!(last.thermal_capacity_used_pct >= 100.0);
        assert_eq!(last.thermal_capacity_used_pct, result.thermal_capacity_used_pct);
        assert_eq!(last.speed_pct, result.final_speed_pct);
        assert!(record.times().windows(2).all(|w| w[1] > w[0]));
    }

    #[test]
    fn margin_keeps_raw_net_torque() {
        let mut inputs = pump_inputs(StartMethod::Direct);
        let tuning = inputs.tuning;
        inputs = inputs
            .with_tuning(EngineTuning {
                stall_epsilon_pct: 200.0,
                ..tuning
            })
            .unwrap();
        let integrator = TransientIntegrator::new(&inputs).unwrap();
        let mut state = SimulationState::default();
        integrator.step(&mut state);
        assert_eq!(state.min_torque_margin_pct, 170.0);
    }

    #[test]
    fn progress_reaches_completion() {
        let inputs = pump_inputs(StartMethod::Direct);
        let mut events = Vec::new();
        let mut cb = |p: SimProgress| events.push(p);
        let result = simulate_with_progress(&inputs, Some(&mut cb), None).unwrap();
        let last = events.last().unwrap();
        assert_eq!(last.step, result.steps);
        assert!(last.fraction_complete() > 0.0 && last.fraction_complete() <= 1.0);
    }

    #[test]
    fn cancelled_before_first_step() {
        let inputs = pump_inputs(StartMethod::Direct);
        let flag = AtomicBool::new(true);
        let err = simulate_with_progress(&inputs, None, Some(&flag)).unwrap_err();
        assert_eq!(err, SimError::Cancelled { time_s: 0.0 });
    }

    #[test]
    fn invalid_limits_rejected_before_run() {
        let mut inputs = pump_inputs(StartMethod::Direct);
        inputs.limits.dt_s = 0.0;
        assert!(simulate(&inputs).is_err());
    }

    #[test]
    fn with_method_keeps_other_inputs() {
        let dol = pump_inputs(StartMethod::Direct);
        let ss = dol
            .with_method(StartMethod::SoftStart(SoftStartRamp::constant(300.0).unwrap()))
            .unwrap();
        assert_eq!(ss.nameplate, dol.nameplate);
        assert!(ss.method.is_soft_start());
    }
}

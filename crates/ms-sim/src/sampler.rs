//! Chart series for a start method.
//!
//! Speed-indexed series evaluate the characteristic under the method's steady
//! limit. Time-indexed series run a private Euler trajectory with no terminal
//! conditions, so the chart always covers the full requested window.

use ms_core::linspace;
use ms_motor::{CharacteristicTable, LoadProfile, StartMethod};
use serde::{Deserialize, Serialize};

use crate::error::{SimError, SimResult};
use crate::integrator::{
    EngineInputs, OperatingPoint, operating_point, operating_point_at_limit,
};
use crate::shaft::Shaft;

/// Independent axis of a curve set.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Domain {
    Speed { points: usize },
    Time { t_max_s: f64, points: usize },
}

impl Domain {
    pub fn points(&self) -> usize {
        match self {
            Domain::Speed { points } | Domain::Time { points, .. } => *points,
        }
    }

    pub fn axis_label(&self) -> &'static str {
        match self {
            Domain::Speed { .. } => "speed_pct",
            Domain::Time { .. } => "time_s",
        }
    }
}

/// Column-oriented series, all of length `x.len()`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CurveSet {
    pub domain: Domain,
    pub x: Vec<f64>,
    pub speed_pct: Vec<f64>,
    pub applied_torque_pct: Vec<f64>,
    pub applied_current_pct: Vec<f64>,
    pub load_torque_pct: Vec<f64>,
    /// Full-voltage reference
    pub direct_torque_pct: Vec<f64>,
    pub direct_current_pct: Vec<f64>,
}

impl CurveSet {
    fn with_capacity(domain: Domain) -> Self {
        let n = domain.points();
        Self {
            domain,
            x: Vec::with_capacity(n),
            speed_pct: Vec::with_capacity(n),
            applied_torque_pct: Vec::with_capacity(n),
            applied_current_pct: Vec::with_capacity(n),
            load_torque_pct: Vec::with_capacity(n),
            direct_torque_pct: Vec::with_capacity(n),
            direct_current_pct: Vec::with_capacity(n),
        }
    }

    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }
}

/// Time-domain integration parameters.
#[derive(Clone, Copy, Debug)]
struct Dynamics {
    shaft: Shaft,
    dt_s: f64,
}

pub struct CurveSampler<'a> {
    table: &'a CharacteristicTable,
    method: &'a StartMethod,
    load: &'a LoadProfile,
    dynamics: Option<Dynamics>,
}

impl<'a> CurveSampler<'a> {
    /// Sampler for speed-indexed series. Call [`with_dynamics`](Self::with_dynamics)
    /// before sampling the time domain.
    pub fn new(
        table: &'a CharacteristicTable,
        method: &'a StartMethod,
        load: &'a LoadProfile,
    ) -> Self {
        Self {
            table,
            method,
            load,
            dynamics: None,
        }
    }

    pub fn with_dynamics(mut self, shaft: Shaft, dt_s: f64) -> SimResult<Self> {
        ms_core::ensure_positive(dt_s, "time step")?;
        self.dynamics = Some(Dynamics { shaft, dt_s });
        Ok(self)
    }

    pub fn from_inputs(inputs: &'a EngineInputs) -> SimResult<Self> {
        let shaft = Shaft::from_nameplate(&inputs.nameplate)?;
        Self::new(&inputs.table, &inputs.method, &inputs.load)
            .with_dynamics(shaft, inputs.limits.dt_s)
    }

    pub fn sample(&self, domain: Domain) -> SimResult<CurveSet> {
        if domain.points() < 2 {
            return Err(SimError::InvalidArg {
                what: "curve needs at least 2 points",
            });
        }
        match domain {
            Domain::Speed { points } => Ok(self.sample_speed(domain, points)),
            Domain::Time { t_max_s, points } => {
                ms_core::ensure_positive(t_max_s, "curve time window")?;
                let dynamics = self.dynamics.ok_or(SimError::InvalidArg {
                    what: "time-domain curves need shaft dynamics",
                })?;
                Ok(self.sample_time(domain, dynamics, t_max_s, points))
            }
        }
    }

    fn sample_speed(&self, domain: Domain, points: usize) -> CurveSet {
        let limit = self.method.steady_limit();
        let mut set = CurveSet::with_capacity(domain);
        for speed in linspace(0.0, 100.0, points) {
            let p = operating_point_at_limit(self.table, self.load, speed, limit);
            push(&mut set, speed, speed, &p);
        }
        set
    }

    fn sample_time(
        &self,
        domain: Domain,
        dynamics: Dynamics,
        t_max_s: f64,
        points: usize,
    ) -> CurveSet {
        let mut set = CurveSet::with_capacity(domain);
        let mut speed = 0.0_f64;
        let mut step = 0usize;
        for t in linspace(0.0, t_max_s, points) {
            let target = (t / dynamics.dt_s).round() as usize;
            while step < target {
                let p = operating_point(
                    self.table,
                    self.method,
                    self.load,
                    speed,
                    step as f64 * dynamics.dt_s,
                );
                let dv = dynamics.shaft.speed_increment_pct(p.net_torque_pct, dynamics.dt_s);
                speed = (speed + dv).clamp(0.0, 100.0);
                step += 1;
            }
            let p = operating_point(self.table, self.method, self.load, speed, t);
            push(&mut set, t, speed, &p);
        }
        set
    }
}

fn push(set: &mut CurveSet, x: f64, speed: f64, p: &OperatingPoint) {
    set.x.push(x);
    set.speed_pct.push(speed);
    set.applied_torque_pct.push(p.applied.torque_pct);
    set.applied_current_pct.push(p.applied.current_pct);
    set.load_torque_pct.push(p.load_torque_pct);
    set.direct_torque_pct.push(p.raw_torque_pct);
    set.direct_current_pct.push(p.raw_current_pct);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::integrator::test_support::pump_inputs;
    use ms_motor::SoftStartRamp;

    #[test]
    fn direct_speed_curves_match_table() {
        let inputs = pump_inputs(StartMethod::Direct);
        let set = CurveSampler::from_inputs(&inputs)
            .unwrap()
            .sample(Domain::Speed { points: 11 })
            .unwrap();
        assert_eq!(set.len(), 11);
        assert_eq!(set.x[0], 0.0);
        assert_eq!(set.x[10], 100.0);
        assert_eq!(set.applied_torque_pct, set.direct_torque_pct);
        assert_eq!(set.applied_current_pct[0], 600.0);
        assert_eq!(set.load_torque_pct[10], 100.0);
    }

    #[test]
    fn soft_start_current_is_capped() {
        let inputs = pump_inputs(StartMethod::SoftStart(SoftStartRamp::constant(300.0).unwrap()));
        let set = CurveSampler::new(&inputs.table, &inputs.method, &inputs.load)
            .sample(Domain::Speed { points: 21 })
            .unwrap();
        assert!(set.applied_current_pct.iter().all(|&c| c <= 300.0 + 1e-9));
        // 300 / 600 => v = 0.5 => torque quartered at standstill.
        assert!((set.applied_torque_pct[0] - 45.0).abs() < 1e-9);
        assert_eq!(set.direct_torque_pct[0], 180.0);
    }

    #[test]
    fn time_curves_reach_and_hold_full_speed() {
        let inputs = pump_inputs(StartMethod::Direct);
        let set = CurveSampler::from_inputs(&inputs)
            .unwrap()
            .sample(Domain::Time {
                t_max_s: 20.0,
                points: 41,
            })
            .unwrap();
        assert_eq!(set.x[40], 20.0);
        assert_eq!(set.speed_pct[0], 0.0);
        assert!(set.speed_pct.windows(2).all(|w| w[1] >= w[0]));
        assert!(set.speed_pct.iter().all(|&s| (0.0..=100.0).contains(&s)));
        assert!(set.speed_pct[40] > 98.0);
    }

    #[test]
    fn time_domain_requires_dynamics() {
        let inputs = pump_inputs(StartMethod::Direct);
        let sampler = CurveSampler::new(&inputs.table, &inputs.method, &inputs.load);
        assert!(sampler
            .sample(Domain::Time {
                t_max_s: 5.0,
                points: 10
            })
            .is_err());
    }

    #[test]
    fn too_few_points_rejected() {
        let inputs = pump_inputs(StartMethod::Direct);
        let sampler = CurveSampler::new(&inputs.table, &inputs.method, &inputs.load);
        assert!(sampler.sample(Domain::Speed { points: 1 }).is_err());
    }
}

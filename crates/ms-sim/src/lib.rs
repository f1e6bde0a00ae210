//! Start transient engine: fixed-step integration of a motor start from
//! rest, chart sampling and the static minimum-starting-current search.

pub mod error;
mod events;
pub mod integrator;
pub mod options;
pub mod record;
pub mod sampler;
pub mod search;
pub mod shaft;
pub mod state;

pub use error::{SimError, SimResult};
pub use integrator::{
    EngineInputs, OperatingPoint, RunHooks, SimProgress, TransientIntegrator, operating_point,
    operating_point_at_limit, simulate, simulate_traced, simulate_with_progress,
};
pub use options::{EngineTuning, SimLimits};
pub use record::{SimRecord, StepSample};
pub use sampler::{CurveSampler, CurveSet, Domain};
pub use search::minimum_starting_current;
pub use shaft::Shaft;
pub use state::{SimulationResult, SimulationState, StartStatus};

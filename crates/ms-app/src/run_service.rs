//! Run execution and caching service.

use std::path::Path;
use std::time::Instant;

use ms_project::schema::CaseDef;
use ms_results::{RunManifest, RunMethod, RunStore};
use ms_sim::{
    RunHooks, SimProgress, SimRecord, SimulationResult, StepSample, TransientIntegrator,
};
use tracing::info;

use crate::case_compile;
use crate::error::AppResult;
use crate::progress::{RunProgressEvent, RunStage, StartProgress};
use crate::project_service;

/// Version string folded into every run ID.
pub const ENGINE_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default trace decimation (keep every N-th step).
pub const DEFAULT_RECORD_EVERY: usize = 5;

/// Options for running simulations.
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub use_cache: bool,
    pub engine_version: String,
    pub record_every: usize,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            use_cache: true,
            engine_version: ENGINE_VERSION.to_string(),
            record_every: DEFAULT_RECORD_EVERY,
        }
    }
}

/// Request to execute a run.
pub struct RunRequest<'a> {
    pub project_path: &'a Path,
    pub case_id: &'a str,
    pub method: RunMethod,
    pub options: RunOptions,
}

/// Wall-clock breakdown of a run.
#[derive(Debug, Clone, Default)]
pub struct RunTimingSummary {
    pub compile_time_s: f64,
    pub simulate_time_s: f64,
    pub save_time_s: f64,
    pub load_cache_time_s: f64,
    pub total_time_s: f64,
}

/// Response from a run execution.
#[derive(Debug, Clone)]
pub struct RunResponse {
    pub run_id: String,
    pub manifest: RunManifest,
    pub result: SimulationResult,
    pub loaded_from_cache: bool,
    pub timing: RunTimingSummary,
}

/// DOL and soft start of the same case.
#[derive(Debug, Clone)]
pub struct Comparison {
    pub direct: RunResponse,
    pub soft: RunResponse,
}

fn emit_progress(
    progress_cb: &mut Option<&mut dyn FnMut(RunProgressEvent)>,
    method: RunMethod,
    stage: RunStage,
    started: Instant,
    message: &str,
) {
    if let Some(cb) = progress_cb.as_deref_mut() {
        cb(RunProgressEvent::stage(
            method,
            stage,
            started.elapsed().as_secs_f64(),
            Some(message.to_string()),
        ));
    }
}

/// Execute or load a run based on request.
pub fn ensure_run(request: &RunRequest) -> AppResult<RunResponse> {
    ensure_run_with_progress(request, None)
}

/// Execute or load a run and stream progress events.
pub fn ensure_run_with_progress(
    request: &RunRequest,
    mut progress_cb: Option<&mut dyn FnMut(RunProgressEvent)>,
) -> AppResult<RunResponse> {
    let started = Instant::now();
    emit_progress(
        &mut progress_cb,
        request.method,
        RunStage::LoadingProject,
        started,
        "Loading project",
    );

    let project = project_service::load_project(request.project_path)?;
    let case = project_service::get_case(&project, request.case_id)?;
    let store = RunStore::for_project(request.project_path)?;

    run_case(
        &store,
        case,
        request.method,
        &request.options,
        progress_cb,
        started,
    )
}

/// Run DOL and soft start of one case in parallel.
pub fn compare(project_path: &Path, case_id: &str, options: &RunOptions) -> AppResult<Comparison> {
    let started = Instant::now();
    let project = project_service::load_project(project_path)?;
    let case = project_service::get_case(&project, case_id)?;
    let store = RunStore::for_project(project_path)?;

    let (direct, soft) = rayon::join(
        || run_case(&store, case, RunMethod::Direct, options, None, started),
        || run_case(&store, case, RunMethod::SoftStart, options, None, started),
    );
    Ok(Comparison {
        direct: direct?,
        soft: soft?,
    })
}

fn run_case(
    store: &RunStore,
    case: &CaseDef,
    method: RunMethod,
    options: &RunOptions,
    mut progress_cb: Option<&mut dyn FnMut(RunProgressEvent)>,
    started: Instant,
) -> AppResult<RunResponse> {
    let mut timing = RunTimingSummary::default();

    emit_progress(
        &mut progress_cb,
        method,
        RunStage::CheckingCache,
        started,
        "Checking run cache",
    );
    let run_id = ms_results::compute_run_id(case, method, &options.engine_version);

    if options.use_cache && store.has_run(&run_id) {
        info!(case = %case.id, %method, %run_id, "loading cached run");
        emit_progress(
            &mut progress_cb,
            method,
            RunStage::LoadingCachedResult,
            started,
            "Loading cached run",
        );

        let load_started = Instant::now();
        let manifest = store.load_manifest(&run_id)?;
        let result = store.load_result(&run_id)?;
        timing.load_cache_time_s = load_started.elapsed().as_secs_f64();
        timing.total_time_s = started.elapsed().as_secs_f64();

        emit_progress(
            &mut progress_cb,
            method,
            RunStage::Completed,
            started,
            "Loaded cached run",
        );
        return Ok(RunResponse {
            run_id,
            manifest,
            result,
            loaded_from_cache: true,
            timing,
        });
    }

    info!(case = %case.id, %method, %run_id, use_cache = options.use_cache, "executing run");
    emit_progress(
        &mut progress_cb,
        method,
        RunStage::CompilingCase,
        started,
        "Compiling case",
    );
    let compile_started = Instant::now();
    let inputs = case_compile::compile_case(case, method)?;
    timing.compile_time_s = compile_started.elapsed().as_secs_f64();

    emit_progress(
        &mut progress_cb,
        method,
        RunStage::Simulating,
        started,
        "Simulating start",
    );
    let simulate_started = Instant::now();
    let max_time_s = inputs.limits.max_time_s;
    let mut record = SimRecord::default();
    let result = {
        let mut on_step = |p: SimProgress| {
            if let Some(cb) = progress_cb.as_deref_mut() {
                cb(RunProgressEvent {
                    method,
                    stage: RunStage::Simulating,
                    elapsed_wall_s: started.elapsed().as_secs_f64(),
                    message: None,
                    start: Some(StartProgress {
                        sim_time_s: p.time_s,
                        max_time_s,
                        fraction_complete: p.fraction_complete(),
                        step: p.step,
                        speed_pct: p.speed_pct,
                        thermal_capacity_used_pct: p.thermal_capacity_used_pct,
                    }),
                });
            }
        };
        TransientIntegrator::new(&inputs)?.run(RunHooks {
            progress: Some(&mut on_step),
            cancel: None,
            record: Some((&mut record, options.record_every)),
        })?
    };
    timing.simulate_time_s = simulate_started.elapsed().as_secs_f64();

    emit_progress(
        &mut progress_cb,
        method,
        RunStage::SavingResults,
        started,
        "Saving run output",
    );
    let save_started = Instant::now();
    let manifest = RunManifest::new(
        run_id.clone(),
        &case.id,
        &case.name,
        method,
        &options.engine_version,
        &result,
        record.len(),
    );
    store.save_run(&manifest, &result, &record.samples)?;
    timing.save_time_s = save_started.elapsed().as_secs_f64();
    timing.total_time_s = started.elapsed().as_secs_f64();

    info!(
        case = %case.id,
        %method,
        status = %result.status,
        elapsed_s = result.elapsed_time_s,
        "run saved"
    );
    emit_progress(
        &mut progress_cb,
        method,
        RunStage::Completed,
        started,
        "Run completed",
    );

    Ok(RunResponse {
        run_id,
        manifest,
        result,
        loaded_from_cache: false,
        timing,
    })
}

/// List stored runs, newest first.
pub fn list_runs(project_path: &Path, case_id: Option<&str>) -> AppResult<Vec<RunManifest>> {
    let store = RunStore::for_project(project_path)?;
    Ok(store.list_runs(case_id)?)
}

/// Load a specific run.
pub fn load_run(
    project_path: &Path,
    run_id: &str,
) -> AppResult<(RunManifest, SimulationResult, Vec<StepSample>)> {
    let store = RunStore::for_project(project_path)?;

    let manifest = store.load_manifest(run_id)?;
    let result = store.load_result(run_id)?;
    let trace = store.load_trace(run_id)?;

    Ok((manifest, result, trace))
}

//! Shared application service layer for motorstart.
//!
//! Frontends go through this crate for project management, case compilation,
//! cached run execution and curve queries.

pub mod case_compile;
pub mod error;
pub mod progress;
pub mod project_service;
pub mod query;
pub mod run_service;

pub use case_compile::compile_case;
pub use error::{AppError, AppResult};
pub use progress::{RunProgressEvent, RunStage, StartProgress};
pub use project_service::{
    CaseSummary, get_case, list_cases, load_project, save_project, validate_project,
};
pub use query::{
    RunSummary, curves_to_csv, extract_trace_series, get_run_summary, minimum_current,
    sample_curves,
};
pub use run_service::{
    Comparison, ENGINE_VERSION, RunOptions, RunRequest, RunResponse, RunTimingSummary, compare,
    ensure_run, ensure_run_with_progress, list_runs, load_run,
};

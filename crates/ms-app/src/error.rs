//! Error types for the ms-app service layer.

use std::path::PathBuf;

/// Application error type that wraps errors from the backend crates and
/// gives the frontends one error interface.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Project error: {0}")]
    Project(String),

    #[error("Failed to read project file: {path}")]
    ProjectFileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Project validation failed: {0}")]
    Validation(String),

    #[error("Case not found: {0}")]
    CaseNotFound(String),

    #[error("Case compilation failed: {0}")]
    Compile(String),

    #[error("Simulation error: {0}")]
    Simulation(String),

    #[error("Results error: {0}")]
    Results(String),

    #[error("Run not found: {0}")]
    RunNotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for ms-app operations.
pub type AppResult<T> = Result<T, AppError>;

impl From<ms_project::ProjectError> for AppError {
    fn from(err: ms_project::ProjectError) -> Self {
        match err {
            ms_project::ProjectError::Validation(e) => AppError::Validation(e.to_string()),
            ms_project::ProjectError::UnknownCase { id, .. } => AppError::CaseNotFound(id),
            other => AppError::Project(other.to_string()),
        }
    }
}

impl From<ms_motor::MotorError> for AppError {
    fn from(err: ms_motor::MotorError) -> Self {
        AppError::Compile(err.to_string())
    }
}

impl From<ms_motor::GridError> for AppError {
    fn from(err: ms_motor::GridError) -> Self {
        AppError::Compile(err.to_string())
    }
}

impl From<ms_sim::SimError> for AppError {
    fn from(err: ms_sim::SimError) -> Self {
        AppError::Simulation(err.to_string())
    }
}

impl From<ms_results::ResultsError> for AppError {
    fn from(err: ms_results::ResultsError) -> Self {
        match err {
            ms_results::ResultsError::RunNotFound { run_id } => AppError::RunNotFound(run_id),
            other => AppError::Results(other.to_string()),
        }
    }
}

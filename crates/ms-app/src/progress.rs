//! Progress events streamed by the run service.

use ms_results::RunMethod;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunStage {
    LoadingProject,
    CheckingCache,
    LoadingCachedResult,
    CompilingCase,
    Simulating,
    SavingResults,
    Completed,
}

impl RunStage {
    pub fn label(&self) -> &'static str {
        match self {
            RunStage::LoadingProject => "Loading project",
            RunStage::CheckingCache => "Checking cache",
            RunStage::LoadingCachedResult => "Loading cached result",
            RunStage::CompilingCase => "Compiling case",
            RunStage::Simulating => "Simulating",
            RunStage::SavingResults => "Saving results",
            RunStage::Completed => "Completed",
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct StartProgress {
    pub sim_time_s: f64,
    pub max_time_s: f64,
    pub fraction_complete: f64,
    pub step: usize,
    pub speed_pct: f64,
    pub thermal_capacity_used_pct: f64,
}

#[derive(Debug, Clone)]
pub struct RunProgressEvent {
    pub method: RunMethod,
    pub stage: RunStage,
    pub elapsed_wall_s: f64,
    pub message: Option<String>,
    pub start: Option<StartProgress>,
}

impl RunProgressEvent {
    pub fn stage(
        method: RunMethod,
        stage: RunStage,
        elapsed_wall_s: f64,
        message: Option<String>,
    ) -> Self {
        Self {
            method,
            stage,
            elapsed_wall_s,
            message,
            start: None,
        }
    }
}

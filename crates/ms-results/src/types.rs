//! Stored run data types.

use ms_sim::{SimulationResult, StartStatus};
use serde::{Deserialize, Serialize};
use std::fmt;

pub type RunId = String;

/// Start method a stored run was made with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunMethod {
    Direct,
    SoftStart,
}

impl RunMethod {
    pub const BOTH: [RunMethod; 2] = [RunMethod::Direct, RunMethod::SoftStart];

    pub fn label(&self) -> &'static str {
        match self {
            RunMethod::Direct => "DOL",
            RunMethod::SoftStart => "SS",
        }
    }
}

impl fmt::Display for RunMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunManifest {
    pub run_id: RunId,
    pub case_id: String,
    pub case_name: String,
    pub method: RunMethod,
    pub timestamp: String,
    pub engine_version: String,
    pub status: StartStatus,
    pub elapsed_time_s: f64,
    pub trace_len: usize,
}

impl RunManifest {
    /// Manifest for a freshly computed run, stamped with the current UTC time.
    pub fn new(
        run_id: RunId,
        case_id: &str,
        case_name: &str,
        method: RunMethod,
        engine_version: &str,
        result: &SimulationResult,
        trace_len: usize,
    ) -> Self {
        Self {
            run_id,
            case_id: case_id.to_string(),
            case_name: case_name.to_string(),
            method,
            timestamp: chrono::Utc::now().to_rfc3339(),
            engine_version: engine_version.to_string(),
            status: result.status,
            elapsed_time_s: result.elapsed_time_s,
            trace_len,
        }
    }
}

//! Content-based hashing for run IDs.

use crate::types::RunMethod;
use ms_project::schema::CaseDef;
use sha2::{Digest, Sha256};

/// SHA-256 over the case definition, the start method and the engine
/// version. Any edit to the case yields a new run.
pub fn compute_run_id(case: &CaseDef, method: RunMethod, engine_version: &str) -> String {
    let mut hasher = Sha256::new();

    let case_json = serde_json::to_string(case).unwrap_or_default();
    hasher.update(case_json.as_bytes());

    let method_json = serde_json::to_string(&method).unwrap_or_default();
    hasher.update(method_json.as_bytes());

    hasher.update(engine_version.as_bytes());

    let result = hasher.finalize();
    format!("{:x}", result)
}

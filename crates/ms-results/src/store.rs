//! Run storage API.
//!
//! Layout under the project directory:
//!
//! ```text
//! .motorstart/runs/<run_id>/manifest.json
//!                          /result.json
//!                          /trace.jsonl
//! ```

use crate::types::RunManifest;
use crate::{ResultsError, ResultsResult};
use ms_sim::{SimulationResult, StepSample};
use std::fs;
use std::path::{Path, PathBuf};

const MANIFEST_FILE: &str = "manifest.json";
const RESULT_FILE: &str = "result.json";
const TRACE_FILE: &str = "trace.jsonl";

#[derive(Clone, Debug)]
pub struct RunStore {
    root_dir: PathBuf,
}

impl RunStore {
    pub fn new(root_dir: PathBuf) -> ResultsResult<Self> {
        fs::create_dir_all(&root_dir)?;
        Ok(Self { root_dir })
    }

    /// Store next to a project file.
    pub fn for_project(project_path: &Path) -> ResultsResult<Self> {
        let project_dir = project_path
            .parent()
            .ok_or_else(|| ResultsError::InvalidPath {
                message: "project path has no parent directory".to_string(),
            })?;
        let runs_dir = project_dir.join(".motorstart").join("runs");
        Self::new(runs_dir)
    }

    pub fn root_dir(&self) -> &Path {
        &self.root_dir
    }

    fn run_dir(&self, run_id: &str) -> PathBuf {
        self.root_dir.join(run_id)
    }

    pub fn has_run(&self, run_id: &str) -> bool {
        let dir = self.run_dir(run_id);
        dir.join(MANIFEST_FILE).exists() && dir.join(RESULT_FILE).exists()
    }

    pub fn save_run(
        &self,
        manifest: &RunManifest,
        result: &SimulationResult,
        trace: &[StepSample],
    ) -> ResultsResult<()> {
        let run_dir = self.run_dir(&manifest.run_id);
        fs::create_dir_all(&run_dir)?;

        let result_json = serde_json::to_string_pretty(result)?;
        fs::write(run_dir.join(RESULT_FILE), result_json)?;

        let mut trace_content = String::new();
        for sample in trace {
            let line = serde_json::to_string(sample)?;
            trace_content.push_str(&line);
            trace_content.push('\n');
        }
        fs::write(run_dir.join(TRACE_FILE), trace_content)?;

        // Manifest last: its presence marks a complete run.
        let manifest_json = serde_json::to_string_pretty(manifest)?;
        fs::write(run_dir.join(MANIFEST_FILE), manifest_json)?;

        Ok(())
    }

    fn existing_file(&self, run_id: &str, name: &str) -> ResultsResult<PathBuf> {
        let path = self.run_dir(run_id).join(name);
        if !path.exists() {
            return Err(ResultsError::RunNotFound {
                run_id: run_id.to_string(),
            });
        }
        Ok(path)
    }

    pub fn load_manifest(&self, run_id: &str) -> ResultsResult<RunManifest> {
        let content = fs::read_to_string(self.existing_file(run_id, MANIFEST_FILE)?)?;
        Ok(serde_json::from_str(&content)?)
    }

    pub fn load_result(&self, run_id: &str) -> ResultsResult<SimulationResult> {
        let content = fs::read_to_string(self.existing_file(run_id, RESULT_FILE)?)?;
        Ok(serde_json::from_str(&content)?)
    }

    pub fn load_trace(&self, run_id: &str) -> ResultsResult<Vec<StepSample>> {
        let content = fs::read_to_string(self.existing_file(run_id, TRACE_FILE)?)?;
        let mut samples = Vec::new();
        for line in content.lines() {
            if !line.trim().is_empty() {
                samples.push(serde_json::from_str(line)?);
            }
        }
        Ok(samples)
    }

    /// Stored runs, newest first, optionally limited to one case.
    pub fn list_runs(&self, case_id: Option<&str>) -> ResultsResult<Vec<RunManifest>> {
        let mut runs = Vec::new();

        if !self.root_dir.exists() {
            return Ok(runs);
        }

        for entry in fs::read_dir(&self.root_dir)? {
            let entry = entry?;
            if !entry.path().is_dir() {
                continue;
            }
            let run_id = entry.file_name().to_string_lossy().to_string();
            // Half-written or foreign directories are skipped.
            let Ok(manifest) = self.load_manifest(&run_id) else {
                continue;
            };
            if case_id.is_none_or(|id| manifest.case_id == id) {
                runs.push(manifest);
            }
        }

        runs.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        Ok(runs)
    }

    pub fn delete_run(&self, run_id: &str) -> ResultsResult<()> {
        let run_dir = self.run_dir(run_id);
        if run_dir.exists() {
            fs::remove_dir_all(run_dir)?;
        }
        Ok(())
    }
}

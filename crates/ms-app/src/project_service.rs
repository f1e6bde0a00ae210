//! Project loading, saving, validation, and introspection.

use ms_project::schema::{CaseDef, CharacteristicDef, Project};
use std::path::Path;

use crate::error::{AppError, AppResult};

/// Summary of a case for listing.
#[derive(Debug, Clone)]
pub struct CaseSummary {
    pub id: String,
    pub name: String,
    pub rated_power_kw: f64,
    pub rated_speed_rpm: f64,
    /// "table" or "kloss"
    pub characteristic: &'static str,
    pub soft_start_limit_pct: f64,
}

/// Load a YAML or JSON project, picked by extension.
pub fn load_project(path: &Path) -> AppResult<Project> {
    if !path.exists() {
        return Err(AppError::ProjectFileRead {
            path: path.to_path_buf(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "no such file"),
        });
    }
    Ok(ms_project::load_project(path)?)
}

pub fn save_project(path: &Path, project: &Project) -> AppResult<()> {
    Ok(ms_project::save_project(path, project)?)
}

/// Validate project structure.
pub fn validate_project(project: &Project) -> AppResult<()> {
    if project.cases.is_empty() {
        return Err(AppError::Validation(
            "Project must have at least one case".to_string(),
        ));
    }
    ms_project::validate_project(project).map_err(|e| AppError::Validation(e.to_string()))
}

/// List all cases in the project with summaries.
pub fn list_cases(project: &Project) -> Vec<CaseSummary> {
    project
        .cases
        .iter()
        .map(|case| CaseSummary {
            id: case.id.clone(),
            name: case.name.clone(),
            rated_power_kw: case.nameplate.rated_power_kw,
            rated_speed_rpm: case.nameplate.rated_speed_rpm,
            characteristic: match case.characteristic {
                CharacteristicDef::Table { .. } => "table",
                CharacteristicDef::Kloss { .. } => "kloss",
            },
            soft_start_limit_pct: case.soft_start.final_current_limit_pct,
        })
        .collect()
}

/// Get a specific case by ID.
pub fn get_case<'a>(project: &'a Project, case_id: &str) -> AppResult<&'a CaseDef> {
    project
        .case(case_id)
        .ok_or_else(|| AppError::CaseNotFound(case_id.to_string()))
}

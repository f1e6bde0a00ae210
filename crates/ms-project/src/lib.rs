//! ms-project: case-file format and validation.

pub mod schema;
pub mod validate;

use std::path::Path;

pub use schema::*;
pub use validate::{ValidationError, validate_case, validate_project};

pub type ProjectResult<T> = Result<T, ProjectError>;

#[derive(thiserror::Error, Debug)]
pub enum ProjectError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Unknown case '{id}' in project '{project}'")]
    UnknownCase { id: String, project: String },

    #[error("Unsupported file extension: {path}")]
    UnsupportedFormat { path: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// File encoding, picked from the extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Yaml,
    Json,
}

impl Format {
    pub fn from_path(path: &Path) -> ProjectResult<Self> {
        match path.extension().and_then(|e| e.to_str()) {
            Some("yaml") | Some("yml") => Ok(Format::Yaml),
            Some("json") => Ok(Format::Json),
            _ => Err(ProjectError::UnsupportedFormat {
                path: path.display().to_string(),
            }),
        }
    }
}

pub fn load_yaml(path: &Path) -> ProjectResult<Project> {
    let content = std::fs::read_to_string(path)?;
    let project: Project = serde_yaml::from_str(&content)?;
    validate_project(&project)?;
    Ok(project)
}

pub fn save_yaml(path: &Path, project: &Project) -> ProjectResult<()> {
    validate_project(project)?;
    let content = serde_yaml::to_string(project)?;
    std::fs::write(path, content)?;
    Ok(())
}

pub fn load_json(path: &Path) -> ProjectResult<Project> {
    let content = std::fs::read_to_string(path)?;
    let project: Project = serde_json::from_str(&content)?;
    validate_project(&project)?;
    Ok(project)
}

pub fn save_json(path: &Path, project: &Project) -> ProjectResult<()> {
    validate_project(project)?;
    let content = serde_json::to_string_pretty(project)?;
    std::fs::write(path, content)?;
    Ok(())
}

/// Load by extension (`.yaml`/`.yml` or `.json`).
pub fn load_project(path: &Path) -> ProjectResult<Project> {
    match Format::from_path(path)? {
        Format::Yaml => load_yaml(path),
        Format::Json => load_json(path),
    }
}

pub fn save_project(path: &Path, project: &Project) -> ProjectResult<()> {
    match Format::from_path(path)? {
        Format::Yaml => save_yaml(path, project),
        Format::Json => save_json(path, project),
    }
}

/// Look up a case by id.
pub fn find_case<'p>(project: &'p Project, id: &str) -> ProjectResult<&'p CaseDef> {
    project.case(id).ok_or_else(|| ProjectError::UnknownCase {
        id: id.to_string(),
        project: project.name.clone(),
    })
}

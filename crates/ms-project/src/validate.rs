//! Structural validation of case files.
//!
//! Checks what can be decided from the file alone: identifiers, array
//! alignment, signs and finiteness. Grid shape (monotonic, anchored speeds)
//! is checked when a case is compiled into engine inputs.

use crate::schema::{CaseDef, CharacteristicDef, LoadShapeDef, Project};
use std::collections::HashSet;

#[derive(thiserror::Error, Debug)]
pub enum ValidationError {
    #[error("Duplicate ID: {id} in {context}")]
    DuplicateId { id: String, context: String },

    #[error("Invalid value: {field} = {value} ({reason})")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Column length mismatch in case '{case}': {column} has {got} entries, expected {expected}")]
    ColumnLength {
        case: String,
        column: &'static str,
        expected: usize,
        got: usize,
    },

    #[error("Case '{case}': {reason}")]
    Inconsistent { case: String, reason: String },

    #[error("Unsupported version: {version}")]
    UnsupportedVersion { version: u32 },
}

pub fn validate_project(project: &Project) -> Result<(), ValidationError> {
    if project.version == 0 || project.version > crate::schema::LATEST_VERSION {
        return Err(ValidationError::UnsupportedVersion {
            version: project.version,
        });
    }

    let mut case_ids = HashSet::new();
    for case in &project.cases {
        if case.id.trim().is_empty() {
            return Err(ValidationError::InvalidValue {
                field: format!("case '{}' id", case.name),
                value: case.id.clone(),
                reason: "must not be empty".to_string(),
            });
        }
        if !case_ids.insert(&case.id) {
            return Err(ValidationError::DuplicateId {
                id: case.id.clone(),
                context: "cases".to_string(),
            });
        }
        validate_case(case)?;
    }

    Ok(())
}

pub fn validate_case(case: &CaseDef) -> Result<(), ValidationError> {
    let np = &case.nameplate;
    positive(case, "rated_power_kw", np.rated_power_kw)?;
    positive(case, "rated_speed_rpm", np.rated_speed_rpm)?;
    positive(case, "rated_full_load_current_a", np.rated_full_load_current_a)?;
    non_negative(case, "motor_inertia_kgm2", np.motor_inertia_kgm2)?;
    non_negative(case, "load_inertia_kgm2", np.load_inertia_kgm2)?;
    positive(
        case,
        "total inertia",
        np.motor_inertia_kgm2 + np.load_inertia_kgm2,
    )?;

    validate_characteristic(case)?;

    non_negative(case, "load scale", case.load.scale)?;
    match case.load.shape {
        LoadShapeDef::Table => {}
        LoadShapeDef::Centrifugal {
            breakaway_pct,
            rated_pct,
        } => {
            non_negative(case, "breakaway_pct", breakaway_pct)?;
            non_negative(case, "rated_pct", rated_pct)?;
        }
        LoadShapeDef::Constant { rated_pct } => non_negative(case, "rated_pct", rated_pct)?,
    }

    let ss = &case.soft_start;
    positive(case, "final_current_limit_pct", ss.final_current_limit_pct)?;
    positive(case, "initial_current_limit_pct", ss.initial_limit())?;
    non_negative(case, "ramp_duration_s", ss.ramp_duration_s)?;

    let limits = &case.limits;
    positive(case, "stall_time_rating_s", limits.stall_time_rating_s)?;
    positive(case, "dt_s", limits.dt_s)?;
    positive(case, "max_time_s", limits.max_time_s)?;
    positive(
        case,
        "locked_rotor_reference_pct",
        limits.locked_rotor_reference_pct,
    )?;
    if limits.dt_s > limits.max_time_s {
        return Err(ValidationError::Inconsistent {
            case: case.id.clone(),
            reason: "dt_s exceeds max_time_s".to_string(),
        });
    }

    for (field, value) in case.tuning.values() {
        if let Some(v) = value {
            non_negative(case, field, v)?;
        }
    }

    Ok(())
}

fn validate_characteristic(case: &CaseDef) -> Result<(), ValidationError> {
    match &case.characteristic {
        CharacteristicDef::Table {
            speed_pct,
            motor_torque_pct,
            motor_current_pct,
            load_torque_pct,
        } => {
            let expected = speed_pct.len();
            if expected < 2 {
                return Err(ValidationError::Inconsistent {
                    case: case.id.clone(),
                    reason: format!("table needs at least 2 speed breakpoints, got {expected}"),
                });
            }
            column_len(case, "motor_torque_pct", expected, motor_torque_pct.len())?;
            column_len(case, "motor_current_pct", expected, motor_current_pct.len())?;
            match case.load.shape {
                LoadShapeDef::Table => {
                    column_len(case, "load_torque_pct", expected, load_torque_pct.len())?;
                }
                _ if !load_torque_pct.is_empty() => {
                    column_len(case, "load_torque_pct", expected, load_torque_pct.len())?;
                }
                _ => {}
            }
            Ok(())
        }
        CharacteristicDef::Kloss {
            locked_rotor_torque_pct,
            pull_up_torque_pct,
            breakdown_torque_pct,
            locked_rotor_current_pct,
            speed_pct,
        } => {
            if matches!(case.load.shape, LoadShapeDef::Table) {
                return Err(ValidationError::Inconsistent {
                    case: case.id.clone(),
                    reason: "a kloss characteristic has no load column; use a centrifugal or constant load"
                        .to_string(),
                });
            }
            positive(case, "locked_rotor_torque_pct", *locked_rotor_torque_pct)?;
            positive(case, "pull_up_torque_pct", *pull_up_torque_pct)?;
            positive(case, "breakdown_torque_pct", *breakdown_torque_pct)?;
            positive(case, "locked_rotor_current_pct", *locked_rotor_current_pct)?;
            if let Some(speeds) = speed_pct {
                if speeds.len() < 2 {
                    return Err(ValidationError::Inconsistent {
                        case: case.id.clone(),
                        reason: "kloss speed list needs at least 2 breakpoints".to_string(),
                    });
                }
            }
            Ok(())
        }
    }
}

fn column_len(
    case: &CaseDef,
    column: &'static str,
    expected: usize,
    got: usize,
) -> Result<(), ValidationError> {
    if got != expected {
        return Err(ValidationError::ColumnLength {
            case: case.id.clone(),
            column,
            expected,
            got,
        });
    }
    Ok(())
}

fn positive(case: &CaseDef, field: &str, value: f64) -> Result<(), ValidationError> {
    if !value.is_finite() || value <= 0.0 {
        return Err(ValidationError::InvalidValue {
            field: format!("case '{}' {}", case.id, field),
            value: value.to_string(),
            reason: "must be positive and finite".to_string(),
        });
    }
    Ok(())
}

fn non_negative(case: &CaseDef, field: &str, value: f64) -> Result<(), ValidationError> {
    if !value.is_finite() || value < 0.0 {
        return Err(ValidationError::InvalidValue {
            field: format!("case '{}' {}", case.id, field),
            value: value.to_string(),
            reason: "must be non-negative and finite".to_string(),
        });
    }
    Ok(())
}

//! Case definition -> engine input snapshot.
//!
//! All engine-level validation (grid shape, nameplate, ramp, tuning) happens
//! here, before any simulation starts.

use ms_motor::{
    CharacteristicTable, KlossCurve, LoadProfile, MotorNameplate, OperatingGrid, STANDARD_BREAKPOINTS,
    SoftStartRamp, StartMethod,
};
use ms_project::schema::{CaseDef, CharacteristicDef, LimitsDef, LoadDef, LoadShapeDef, TuningDef};
use ms_results::RunMethod;
use ms_sim::{EngineInputs, EngineTuning, SimLimits};

use crate::error::AppResult;

pub fn build_nameplate(case: &CaseDef) -> AppResult<MotorNameplate> {
    let np = &case.nameplate;
    Ok(MotorNameplate::new(
        np.rated_power_kw,
        np.rated_speed_rpm,
        np.rated_full_load_current_a,
        np.motor_inertia_kgm2,
        np.load_inertia_kgm2,
    )?)
}

pub fn build_load(def: &LoadDef) -> LoadProfile {
    let profile = match def.shape {
        LoadShapeDef::Table => LoadProfile::grid_direct(),
        LoadShapeDef::Centrifugal {
            breakaway_pct,
            rated_pct,
        } => LoadProfile::centrifugal(breakaway_pct, rated_pct),
        LoadShapeDef::Constant { rated_pct } => LoadProfile::constant(rated_pct),
    };
    profile.with_scale(def.scale)
}

/// Build the characteristic table. A synthesized characteristic carries the
/// load shape in its load column.
pub fn build_table(case: &CaseDef, load: &LoadProfile) -> AppResult<CharacteristicTable> {
    let grid = match &case.characteristic {
        CharacteristicDef::Table {
            speed_pct,
            motor_torque_pct,
            motor_current_pct,
            load_torque_pct,
        } => {
            // An explicit load shape makes the load column optional.
            let zeros;
            let load_column = if load_torque_pct.is_empty() {
                zeros = vec![0.0; speed_pct.len()];
                &zeros
            } else {
                load_torque_pct
            };
            OperatingGrid::from_columns(speed_pct, motor_torque_pct, motor_current_pct, load_column)?
        }
        CharacteristicDef::Kloss {
            locked_rotor_torque_pct,
            pull_up_torque_pct,
            breakdown_torque_pct,
            locked_rotor_current_pct,
            speed_pct,
        } => {
            let curve = KlossCurve::new(
                *locked_rotor_torque_pct,
                *pull_up_torque_pct,
                *breakdown_torque_pct,
                *locked_rotor_current_pct,
            )?;
            let breakpoints = speed_pct.as_deref().unwrap_or(&STANDARD_BREAKPOINTS);
            curve.to_grid(breakpoints, load)?
        }
    };
    Ok(CharacteristicTable::new(grid))
}

pub fn build_method(case: &CaseDef, method: RunMethod) -> AppResult<StartMethod> {
    match method {
        RunMethod::Direct => Ok(StartMethod::Direct),
        RunMethod::SoftStart => {
            let ss = &case.soft_start;
            let ramp = SoftStartRamp::new(
                ss.initial_limit(),
                ss.final_current_limit_pct,
                ss.ramp_duration_s,
            )?;
            Ok(StartMethod::SoftStart(ramp))
        }
    }
}

pub fn build_limits(def: &LimitsDef) -> SimLimits {
    SimLimits {
        dt_s: def.dt_s,
        max_time_s: def.max_time_s,
        stall_time_rating_s: def.stall_time_rating_s,
        locked_rotor_reference_pct: def.locked_rotor_reference_pct,
    }
}

/// Defaults overlaid with the case's overrides.
pub fn build_tuning(def: &TuningDef) -> EngineTuning {
    let d = EngineTuning::default();
    EngineTuning {
        stall_epsilon_pct: def.stall_epsilon_pct.unwrap_or(d.stall_epsilon_pct),
        settling_guard_s: def.settling_guard_s.unwrap_or(d.settling_guard_s),
        near_sync_speed_pct: def.near_sync_speed_pct.unwrap_or(d.near_sync_speed_pct),
        running_speed_pct: def.running_speed_pct.unwrap_or(d.running_speed_pct),
        search_step_pct: def.search_step_pct.unwrap_or(d.search_step_pct),
        search_speed_step_pct: def.search_speed_step_pct.unwrap_or(d.search_speed_step_pct),
    }
}

/// Compile one case for one start method.
pub fn compile_case(case: &CaseDef, method: RunMethod) -> AppResult<EngineInputs> {
    let load = build_load(&case.load);
    let table = build_table(case, &load)?;
    let inputs = EngineInputs::new(
        build_nameplate(case)?,
        table,
        build_method(case, method)?,
        load,
        build_limits(&case.limits),
    )?
    .with_tuning(build_tuning(&case.tuning))?;
    Ok(inputs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use ms_project::schema::*;

    fn table_case() -> CaseDef {
        CaseDef {
            id: "pump".to_string(),
            name: "Pump".to_string(),
            description: None,
            nameplate: NameplateDef {
                rated_power_kw: 75.0,
                rated_speed_rpm: 1480.0,
                rated_full_load_current_a: 130.0,
                motor_inertia_kgm2: 1.2,
                load_inertia_kgm2: 3.8,
            },
            characteristic: CharacteristicDef::Table {
                speed_pct: vec![0.0, 40.0, 80.0, 100.0],
                motor_torque_pct: vec![180.0, 150.0, 240.0, 100.0],
                motor_current_pct: vec![600.0, 560.0, 450.0, 100.0],
                load_torque_pct: vec![10.0, 20.0, 66.0, 100.0],
            },
            load: LoadDef::default(),
            soft_start: SoftStartDef {
                initial_current_limit_pct: Some(250.0),
                final_current_limit_pct: 350.0,
                ramp_duration_s: 2.0,
            },
            limits: LimitsDef {
                stall_time_rating_s: 15.0,
                dt_s: 0.01,
                max_time_s: 60.0,
                locked_rotor_reference_pct: 600.0,
            },
            tuning: TuningDef::default(),
        }
    }

    #[test]
    fn table_case_compiles_for_both_methods() {
        let case = table_case();
        let dol = compile_case(&case, RunMethod::Direct).unwrap();
        assert_eq!(dol.method, StartMethod::Direct);
        assert_eq!(dol.table.grid().len(), 4);
        assert_eq!(dol.table.load_torque(80.0), 66.0);

        let ss = compile_case(&case, RunMethod::SoftStart).unwrap();
        assert_eq!(ss.method.current_limit_at(0.0), 250.0);
        assert_eq!(ss.method.steady_limit(), 350.0);
    }

    #[test]
    fn non_monotonic_speeds_fail_before_simulation() {
        let mut case = table_case();
        if let CharacteristicDef::Table { speed_pct, .. } = &mut case.characteristic {
            speed_pct.swap(1, 2);
        }
        assert!(matches!(
            compile_case(&case, RunMethod::Direct),
            Err(AppError::Compile(_))
        ));
    }

    #[test]
    fn explicit_load_shape_overrides_table_column() {
        let mut case = table_case();
        if let CharacteristicDef::Table {
            load_torque_pct, ..
        } = &mut case.characteristic
        {
            load_torque_pct.clear();
        }
        case.load = LoadDef {
            shape: LoadShapeDef::Constant { rated_pct: 30.0 },
            scale: 0.5,
        };
        let inputs = compile_case(&case, RunMethod::Direct).unwrap();
        assert_eq!(inputs.load.torque_at(&inputs.table, 50.0), 15.0);
    }

    #[test]
    fn kloss_case_uses_standard_breakpoints() {
        let mut case = table_case();
        case.characteristic = CharacteristicDef::Kloss {
            locked_rotor_torque_pct: 200.0,
            pull_up_torque_pct: 170.0,
            breakdown_torque_pct: 260.0,
            locked_rotor_current_pct: 650.0,
            speed_pct: None,
        };
        case.load.shape = LoadShapeDef::Centrifugal {
            breakaway_pct: 10.0,
            rated_pct: 100.0,
        };
        let inputs = compile_case(&case, RunMethod::Direct).unwrap();
        assert_eq!(inputs.table.grid().len(), STANDARD_BREAKPOINTS.len());
        assert!((inputs.table.motor_current(0.0) - 650.0).abs() < 1e-9);
    }

    #[test]
    fn tuning_overrides_merge_with_defaults() {
        let tuning = build_tuning(&TuningDef {
            running_speed_pct: Some(99.0),
            ..TuningDef::default()
        });
        assert_eq!(tuning.running_speed_pct, 99.0);
        assert_eq!(tuning.near_sync_speed_pct, 95.0);
    }
}

use ms_project::*;

fn pump_case() -> CaseDef {
    CaseDef {
        id: "pump".to_string(),
        name: "Pump".to_string(),
        description: Some("roundtrip fixture".to_string()),
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
        tuning: TuningDef {
            near_sync_speed_pct: Some(96.0),
            ..TuningDef::default()
        },
    }
}

fn kloss_case() -> CaseDef {
    CaseDef {
        id: "conveyor".to_string(),
        name: "Conveyor".to_string(),
        description: None,
        characteristic: CharacteristicDef::Kloss {
            locked_rotor_torque_pct: 200.0,
            pull_up_torque_pct: 170.0,
            breakdown_torque_pct: 260.0,
            locked_rotor_current_pct: 650.0,
            speed_pct: None,
        },
        load: LoadDef {
            shape: LoadShapeDef::Constant { rated_pct: 45.0 },
            scale: 1.1,
        },
        tuning: TuningDef::default(),
        ..pump_case()
    }
}

fn project() -> Project {
    Project {
        cases: vec![pump_case(), kloss_case()],
        ..Project::new("Roundtrip")
    }
}

#[test]
fn roundtrip_yaml_empty_project() {
    let project = Project::new("Empty Project");
    validate_project(&project).unwrap();

    let path = std::env::temp_dir().join("ms_project_roundtrip_empty.yaml");
    save_yaml(&path, &project).unwrap();
    let loaded = load_yaml(&path).unwrap();

    assert_eq!(project, loaded);
}

#[test]
fn roundtrip_yaml_cases() {
    let project = project();
    let path = std::env::temp_dir().join("ms_project_roundtrip_cases.yaml");

    save_yaml(&path, &project).unwrap();
    let loaded = load_yaml(&path).unwrap();

    assert_eq!(project, loaded);
}

#[test]
fn roundtrip_json_by_extension() {
    let project = project();
    let path = std::env::temp_dir().join("ms_project_roundtrip_cases.json");

    save_project(&path, &project).unwrap();
    let text = std::fs::read_to_string(&path).unwrap();
    assert!(text.contains("\"type\": \"kloss\""));

    let loaded = load_project(&path).unwrap();
    assert_eq!(project, loaded);
}

#[test]
fn save_rejects_invalid_project() {
    let mut project = project();
    project.cases[1].id = "pump".to_string();
    let path = std::env::temp_dir().join("ms_project_invalid.yaml");
    assert!(matches!(
        save_yaml(&path, &project),
        Err(ProjectError::Validation(ValidationError::DuplicateId { .. }))
    ));
}

#[test]
fn unknown_extension_rejected() {
    let path = std::path::Path::new("cases.toml");
    assert!(matches!(
        load_project(path),
        Err(ProjectError::UnsupportedFormat { .. })
    ));
}

#[test]
fn find_case_reports_missing_id() {
    let project = project();
    assert_eq!(find_case(&project, "conveyor").unwrap().name, "Conveyor");
    assert!(matches!(
        find_case(&project, "nope"),
        Err(ProjectError::UnknownCase { .. })
    ));
}

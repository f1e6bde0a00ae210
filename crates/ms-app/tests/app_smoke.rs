//! Smoke test for ms-app service layer.

use std::path::PathBuf;

use ms_app::{list_cases, load_project, minimum_current, sample_curves, validate_project};
use ms_results::RunMethod;
use ms_sim::Domain;

fn bundled_project(name: &str) -> PathBuf {
    let mut project_path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    project_path.pop(); // go to crates
    project_path.pop(); // go to repo root
    project_path.push("projects");
    project_path.push(name);
    project_path
}

#[test]
fn bundled_projects_load_and_validate() {
    for name in ["01_pump_and_fan.yaml", "02_crusher.json"] {
        let project = load_project(&bundled_project(name)).expect("Failed to load project");
        validate_project(&project).expect("Validation should succeed");
        assert!(!list_cases(&project).is_empty(), "Should list cases");
    }
}

#[test]
fn case_summaries_describe_characteristics() {
    let project = load_project(&bundled_project("01_pump_and_fan.yaml")).unwrap();
    let cases = list_cases(&project);
    let ids: Vec<&str> = cases.iter().map(|c| c.id.as_str()).collect();
    assert_eq!(ids, ["pump", "fan-overloaded", "conveyor"]);
    assert_eq!(cases[0].characteristic, "table");
    assert_eq!(cases[2].characteristic, "kloss");
    assert_eq!(cases[2].soft_start_limit_pct, 400.0);
}

#[test]
fn missing_project_reports_path() {
    let err = load_project(&bundled_project("no_such_project.yaml")).unwrap_err();
    assert!(matches!(err, ms_app::AppError::ProjectFileRead { .. }));
}

#[test]
fn soft_start_curves_stay_under_direct() {
    let project = load_project(&bundled_project("01_pump_and_fan.yaml")).unwrap();
    let case = ms_app::get_case(&project, "pump").unwrap();

    let curves = sample_curves(case, RunMethod::SoftStart, Domain::Speed { points: 51 }).unwrap();
    assert_eq!(curves.len(), 51);
    for i in 0..curves.len() {
        assert!(curves.applied_current_pct[i] <= 350.0 + 1e-9);
        assert!(curves.applied_torque_pct[i] <= curves.direct_torque_pct[i] + 1e-9);
    }

    let csv = ms_app::curves_to_csv(&curves);
    let mut lines = csv.lines();
    assert!(lines.next().unwrap().starts_with("speed_pct,applied_torque_pct"));
    assert_eq!(lines.count(), 51);
}

#[test]
fn minimum_current_found_for_pump_and_not_for_overloaded_fan() {
    let project = load_project(&bundled_project("01_pump_and_fan.yaml")).unwrap();

    let pump = ms_app::get_case(&project, "pump").unwrap();
    let limit = minimum_current(pump).unwrap().expect("pump should start");
    assert!(limit > 100.0 && limit < 600.0);

    let fan = ms_app::get_case(&project, "fan-overloaded").unwrap();
    assert_eq!(minimum_current(fan).unwrap(), None);
}

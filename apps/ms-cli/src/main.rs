use clap::{Parser, Subcommand, ValueEnum};
use ms_app::{
    AppError, AppResult, RunOptions, RunProgressEvent, RunRequest, RunStage, project_service,
    query, run_service,
};
use ms_results::RunMethod;
use ms_sim::{Domain, SimulationResult};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "motorstart")]
#[command(about = "Motor start transient simulator: DOL and soft-start studies", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum MethodArg {
    /// Direct-on-line
    Direct,
    /// Current-limited soft start
    Soft,
    /// Both, side by side
    Both,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum DomainArg {
    Speed,
    Time,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate project file syntax and structure
    Validate {
        /// Path to the project YAML/JSON file
        project_path: PathBuf,
    },
    /// List cases in a project
    Cases {
        /// Path to the project YAML/JSON file
        project_path: PathBuf,
    },
    /// Simulate a motor start
    Run {
        /// Path to the project YAML/JSON file
        project_path: PathBuf,
        /// Case ID to simulate
        case_id: String,
        #[arg(long, value_enum, default_value = "both")]
        method: MethodArg,
        /// Skip cache and force re-run
        #[arg(long)]
        no_cache: bool,
    },
    /// Export torque/current/load curves as CSV
    Curves {
        /// Path to the project YAML/JSON file
        project_path: PathBuf,
        /// Case ID
        case_id: String,
        #[arg(long, value_enum, default_value = "soft")]
        method: MethodArg,
        #[arg(long, value_enum, default_value = "speed")]
        domain: DomainArg,
        /// Number of samples
        #[arg(long, default_value_t = 101)]
        points: usize,
        /// Time window in seconds (time domain; defaults to the case's max time)
        #[arg(long)]
        t_max: Option<f64>,
        /// Output CSV file path (optional, defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Find the lowest constant current limit that starts the load
    MinCurrent {
        /// Path to the project YAML/JSON file
        project_path: PathBuf,
        /// Case ID
        case_id: String,
    },
    /// List cached runs for a project
    Runs {
        /// Path to the project YAML/JSON file
        project_path: PathBuf,
        /// Only list runs of this case
        case_id: Option<String>,
    },
    /// Show details of a cached run
    ShowRun {
        /// Path to the project YAML/JSON file
        project_path: PathBuf,
        /// Run ID to display
        run_id: String,
    },
    /// Export one trace column of a cached run
    ExportSeries {
        /// Path to the project YAML/JSON file
        project_path: PathBuf,
        /// Run ID
        run_id: String,
        /// Variable name (speed, torque, current, load, net, voltage, thermal)
        variable: String,
        /// Output CSV file path (optional, defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() -> AppResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Validate { project_path } => cmd_validate(&project_path),
        Commands::Cases { project_path } => cmd_cases(&project_path),
        Commands::Run {
            project_path,
            case_id,
            method,
            no_cache,
        } => {
            let options = RunOptions {
                use_cache: !no_cache,
                ..RunOptions::default()
            };
            match method {
                MethodArg::Direct => cmd_run(&project_path, &case_id, RunMethod::Direct, options),
                MethodArg::Soft => {
                    cmd_run(&project_path, &case_id, RunMethod::SoftStart, options)
                }
                MethodArg::Both => cmd_compare(&project_path, &case_id, &options),
            }
        }
        Commands::Curves {
            project_path,
            case_id,
            method,
            domain,
            points,
            t_max,
            output,
        } => cmd_curves(
            &project_path,
            &case_id,
            method,
            domain,
            points,
            t_max,
            output.as_deref(),
        ),
        Commands::MinCurrent {
            project_path,
            case_id,
        } => cmd_min_current(&project_path, &case_id),
        Commands::Runs {
            project_path,
            case_id,
        } => cmd_runs(&project_path, case_id.as_deref()),
        Commands::ShowRun {
            project_path,
            run_id,
        } => cmd_show_run(&project_path, &run_id),
        Commands::ExportSeries {
            project_path,
            run_id,
            variable,
            output,
        } => cmd_export_series(&project_path, &run_id, &variable, output.as_deref()),
    }
}

fn cmd_validate(project_path: &Path) -> AppResult<()> {
    println!("Validating project: {}", project_path.display());
    let project = project_service::load_project(project_path)?;
    project_service::validate_project(&project)?;
    println!("✓ Project is valid ({} cases)", project.cases.len());
    Ok(())
}

fn cmd_cases(project_path: &Path) -> AppResult<()> {
    let project = project_service::load_project(project_path)?;
    let cases = project_service::list_cases(&project);

    if cases.is_empty() {
        println!("No cases found in project");
    } else {
        println!("Cases in project '{}':", project.name);
        for case in cases {
            println!(
                "  {} - {} ({:.1} kW, {:.0} rpm, {} characteristic, SS limit {:.0}%)",
                case.id,
                case.name,
                case.rated_power_kw,
                case.rated_speed_rpm,
                case.characteristic,
                case.soft_start_limit_pct
            );
        }
    }
    Ok(())
}

fn cmd_run(
    project_path: &Path,
    case_id: &str,
    method: RunMethod,
    options: RunOptions,
) -> AppResult<()> {
    println!("Simulating {} start for case: {}", method.label(), case_id);

    let request = RunRequest {
        project_path,
        case_id,
        method,
        options,
    };

    let mut last_emit = Instant::now();
    let mut last_stage = RunStage::LoadingProject;
    let response = run_service::ensure_run_with_progress(
        &request,
        Some(&mut |event| {
            let emit_now = event.stage != last_stage || last_emit.elapsed().as_millis() >= 100;
            if emit_now {
                render_cli_progress(&event);
                last_stage = event.stage.clone();
                last_emit = Instant::now();
            }
        }),
    )?;
    clear_progress_line();
    info!(
        run_id = %response.run_id,
        cached = response.loaded_from_cache,
        total_s = response.timing.total_time_s,
        "run ready"
    );

    if response.loaded_from_cache {
        println!("✓ Loaded from cache: {}", response.run_id);
    } else {
        println!("✓ Simulation completed: {}", response.run_id);
    }
    print_result(&response.result);
    print_timing_summary(&response.timing);
    Ok(())
}

fn cmd_compare(project_path: &Path, case_id: &str, options: &RunOptions) -> AppResult<()> {
    println!("Simulating DOL and SS starts for case: {}", case_id);
    let cmp = run_service::compare(project_path, case_id, options)?;
    info!(
        direct = %cmp.direct.run_id,
        direct_cached = cmp.direct.loaded_from_cache,
        soft = %cmp.soft.run_id,
        soft_cached = cmp.soft.loaded_from_cache,
        "comparison ready"
    );

    let rows: [(&str, fn(&SimulationResult) -> String); 7] = [
        ("Status", |r| r.status.to_string()),
        ("Start time (s)", |r| format!("{:.2}", r.elapsed_time_s)),
        ("Final speed (%)", |r| format!("{:.1}", r.final_speed_pct)),
        ("Peak current (%)", |r| format!("{:.1}", r.peak_current_pct)),
        ("Min margin (%)", |r| format!("{:.2}", r.min_torque_margin_pct)),
        ("Thermal used (%)", |r| {
            format!("{:.1}", r.thermal_capacity_used_pct)
        }),
        ("Min SS limit (%)", |r| match r.minimum_starting_current_pct {
            Some(limit) => format!("{:.1}", limit),
            None => "-".to_string(),
        }),
    ];

    println!("\n{:<18} {:>12} {:>12}", "", "DOL", "SS");
    for (label, cell) in rows {
        println!(
            "{:<18} {:>12} {:>12}",
            label,
            cell(&cmp.direct.result),
            cell(&cmp.soft.result)
        );
    }
    println!("\nRuns: DOL {}  SS {}", cmp.direct.run_id, cmp.soft.run_id);
    Ok(())
}

fn cmd_curves(
    project_path: &Path,
    case_id: &str,
    method: MethodArg,
    domain: DomainArg,
    points: usize,
    t_max: Option<f64>,
    output: Option<&Path>,
) -> AppResult<()> {
    let project = project_service::load_project(project_path)?;
    let case = project_service::get_case(&project, case_id)?;

    let method = match method {
        MethodArg::Direct => RunMethod::Direct,
        MethodArg::Soft => RunMethod::SoftStart,
        MethodArg::Both => {
            return Err(AppError::InvalidInput(
                "curves take a single method: direct or soft".to_string(),
            ));
        }
    };
    let domain = match domain {
        DomainArg::Speed => Domain::Speed { points },
        DomainArg::Time => Domain::Time {
            t_max_s: t_max.unwrap_or(case.limits.max_time_s),
            points,
        },
    };

    let curves = query::sample_curves(case, method, domain)?;
    let csv = query::curves_to_csv(&curves);

    if let Some(path) = output {
        std::fs::write(path, csv)?;
        println!("✓ Exported {} points to {}", curves.len(), path.display());
    } else {
        print!("{}", csv);
    }
    Ok(())
}

fn cmd_min_current(project_path: &Path, case_id: &str) -> AppResult<()> {
    let project = project_service::load_project(project_path)?;
    let case = project_service::get_case(&project, case_id)?;

    match query::minimum_current(case)? {
        Some(limit) => println!("Minimum starting current for '{}': {:.1}% FLC", case_id, limit),
        None => println!(
            "Case '{}' cannot be started at any current limit (load exceeds full-voltage torque)",
            case_id
        ),
    }
    Ok(())
}

fn clear_progress_line() {
    print!("\r{}\r", " ".repeat(120));
    let _ = io::stdout().flush();
}

fn render_cli_progress(event: &RunProgressEvent) {
    match (&event.stage, &event.start) {
        (RunStage::Simulating, Some(p)) => {
            let width = 28usize;
            let filled = ((p.fraction_complete * width as f64).round() as usize).min(width);
            let bar = format!(
                "{}{}",
                "#".repeat(filled),
                "-".repeat(width.saturating_sub(filled))
            );
            print!(
                "\r[{}] t={:.2}/{:.0}s  speed={:>5.1}%  thermal={:>5.1}%  step={}",
                bar, p.sim_time_s, p.max_time_s, p.speed_pct, p.thermal_capacity_used_pct, p.step
            );
        }
        _ => {
            let spinner = ['|', '/', '-', '\\'];
            let spin_idx = ((event.elapsed_wall_s * 10.0) as usize) % spinner.len();
            let mut line = format!(
                "\r{} [{}] {}  elapsed={:.2}s",
                spinner[spin_idx],
                event.method,
                event.stage.label(),
                event.elapsed_wall_s
            );
            if let Some(msg) = &event.message {
                line.push_str(&format!("  {}", msg));
            }
            print!("{}", line);
        }
    }
    let _ = io::stdout().flush();
}

fn print_result(result: &SimulationResult) {
    println!("  Status:        {}", result.status);
    println!("  Start time:    {:.2} s", result.elapsed_time_s);
    println!("  Final speed:   {:.1} %", result.final_speed_pct);
    println!("  Peak current:  {:.1} % FLC", result.peak_current_pct);
    println!("  Min margin:    {:.2} % FLT", result.min_torque_margin_pct);
    println!("  Thermal used:  {:.1} %", result.thermal_capacity_used_pct);
    if let Some(limit) = result.minimum_starting_current_pct {
        println!("  Min SS limit:  {:.1} % FLC", limit);
    }
}

fn print_timing_summary(timing: &ms_app::RunTimingSummary) {
    let total = timing.total_time_s.max(1.0e-12);

    println!("\nTiming summary:");
    println!(
        "  Compile:  {:.3}s ({:.1}%)",
        timing.compile_time_s,
        100.0 * timing.compile_time_s / total
    );
    println!(
        "  Simulate: {:.3}s ({:.1}%)",
        timing.simulate_time_s,
        100.0 * timing.simulate_time_s / total
    );
    println!(
        "  Save:     {:.3}s ({:.1}%)",
        timing.save_time_s,
        100.0 * timing.save_time_s / total
    );
    if timing.load_cache_time_s > 0.0 {
        println!("  Cache load: {:.3}s", timing.load_cache_time_s);
    }
    println!("  Total:    {:.3}s", timing.total_time_s);
}

fn cmd_runs(project_path: &Path, case_id: Option<&str>) -> AppResult<()> {
    let runs = run_service::list_runs(project_path, case_id)?;

    if runs.is_empty() {
        println!("No cached runs found");
    } else {
        println!("Cached runs:");
        for manifest in runs {
            println!(
                "  {}  {:<10} {:<4} {:<8} {}",
                manifest.run_id,
                manifest.case_id,
                manifest.method.label(),
                manifest.status,
                manifest.timestamp
            );
        }
    }
    Ok(())
}

fn cmd_show_run(project_path: &Path, run_id: &str) -> AppResult<()> {
    println!("Loading run: {}", run_id);

    let (manifest, result, trace) = run_service::load_run(project_path, run_id)?;

    println!("\nCase: {} ({})", manifest.case_name, manifest.case_id);
    println!("Method: {}", manifest.method.label());
    println!("Engine: {}  Created: {}", manifest.engine_version, manifest.timestamp);
    print_result(&result);

    if let Ok(summary) = query::get_run_summary(&trace) {
        println!("\nTrace:");
        println!("  Samples: {}", summary.record_count);
        println!(
            "  Time range: {:.3} - {:.3} s",
            summary.time_range.0, summary.time_range.1
        );
        println!("  Lowest net torque: {:.2} %", summary.min_net_torque_pct);
    }
    Ok(())
}

fn cmd_export_series(
    project_path: &Path,
    run_id: &str,
    variable: &str,
    output: Option<&Path>,
) -> AppResult<()> {
    let (_manifest, _result, trace) = run_service::load_run(project_path, run_id)?;
    let series = query::extract_trace_series(&trace, variable)?;

    let mut csv = String::from("time_s,value\n");
    for (t, val) in &series {
        csv.push_str(&format!("{},{}\n", t, val));
    }

    if let Some(path) = output {
        std::fs::write(path, csv)?;
        println!(
            "✓ Exported {} data points to {}",
            series.len(),
            path.display()
        );
    } else {
        print!("{}", csv);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_defaults_to_both_methods_with_cache() {
        let cli = Cli::try_parse_from(["motorstart", "run", "p.yaml", "pump"]).unwrap();
        match cli.command {
            Commands::Run {
                case_id,
                method,
                no_cache,
                ..
            } => {
                assert_eq!(case_id, "pump");
                assert!(matches!(method, MethodArg::Both));
                assert!(!no_cache);
            }
            _ => panic!("expected run"),
        }
    }

    #[test]
    fn curves_accept_time_domain_options() {
        let cli = Cli::try_parse_from([
            "motorstart",
            "curves",
            "p.yaml",
            "fan",
            "--method",
            "direct",
            "--domain",
            "time",
            "--points",
            "11",
            "--t-max",
            "4.5",
            "-o",
            "out.csv",
        ])
        .unwrap();
        match cli.command {
            Commands::Curves {
                method,
                domain,
                points,
                t_max,
                output,
                ..
            } => {
                assert!(matches!(method, MethodArg::Direct));
                assert!(matches!(domain, DomainArg::Time));
                assert_eq!(points, 11);
                assert_eq!(t_max, Some(4.5));
                assert_eq!(output, Some(PathBuf::from("out.csv")));
            }
            _ => panic!("expected curves"),
        }
    }

    #[test]
    fn unknown_method_is_rejected() {
        assert!(
            Cli::try_parse_from(["motorstart", "run", "p.yaml", "pump", "--method", "star-delta"])
                .is_err()
        );
    }

    #[test]
    fn runs_case_filter_is_optional() {
        let cli = Cli::try_parse_from(["motorstart", "runs", "p.yaml"]).unwrap();
        assert!(matches!(cli.command, Commands::Runs { case_id: None, .. }));
    }
}

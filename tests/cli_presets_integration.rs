use std::fs;
use std::process::{Command, Output};

#[derive(Debug)]
struct Totals {
    cost: f64,
    emissions_kg: f64,
}

fn run_cli(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_flexkit-sim"))
        .args(args)
        .env("RUST_LOG", "warn")
        .output()
        .expect("flexkit-sim process should run")
}

fn run_and_parse_totals(args: &[&str]) -> Totals {
    let output = run_cli(args);
    assert!(
        output.status.success(),
        "run failed for {args:?}: stderr={}",
        String::from_utf8_lossy(&output.stderr)
    );

    let stdout = String::from_utf8(output.stdout).expect("stdout should be valid UTF-8");
    Totals {
        cost: parse_metric(&stdout, "Total cost:", ""),
        emissions_kg: parse_metric(&stdout, "Total emissions:", "kg CO2"),
    }
}

fn parse_metric(stdout: &str, label: &str, unit: &str) -> f64 {
    let line = stdout
        .lines()
        .find(|line| line.trim_start().starts_with(label))
        .unwrap_or_else(|| panic!("missing summary line `{label}` in output: {stdout}"));

    let raw = line
        .split_once(':')
        .map(|(_, right)| right.trim())
        .unwrap_or_else(|| panic!("invalid summary format for line `{line}`"));

    let numeric = raw.strip_suffix(unit).unwrap_or(raw).trim();
    numeric
        .parse::<f64>()
        .unwrap_or_else(|_| panic!("failed parsing `{numeric}` from summary line `{line}`"))
}

#[test]
fn region_presets_run_via_cli_and_produce_distinct_totals() {
    let uk = run_and_parse_totals(&["--preset", "uk", "--quiet"]);
    let texas = run_and_parse_totals(&["--preset", "texas", "--quiet"]);
    let france = run_and_parse_totals(&["--preset", "france", "--quiet"]);

    assert!(
        (uk.cost - texas.cost).abs() > 1e-3 || (uk.emissions_kg - texas.emissions_kg).abs() > 1e-3,
        "expected uk and texas totals to differ: uk={uk:?}, texas={texas:?}"
    );
    assert!(
        (uk.emissions_kg - france.emissions_kg).abs() > 1e-3,
        "expected uk and france emissions to differ: uk={uk:?}, france={france:?}"
    );
}

#[test]
fn scenario_file_matches_its_preset() {
    let file = run_and_parse_totals(&["--scenario", "scenarios/grid_support.toml", "--quiet"]);
    let preset = run_and_parse_totals(&["--preset", "grid_support", "--quiet"]);
    assert_eq!(file.cost, preset.cost);
    assert_eq!(file.emissions_kg, preset.emissions_kg);
}

#[test]
fn output_contains_summary_and_comparison() {
    let output = run_cli(&["--preset", "baseline", "--strategy", "carbon_minimizer", "--quiet"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Strategy: Carbon Minimizer"));
    assert!(stdout.contains("--- Strategy Summary ---"));
    assert!(stdout.contains("--- Strategy Comparison ---"));
    assert!(!stdout.contains("price="), "--quiet should suppress interval lines");
}

#[test]
fn unknown_preset_exits_non_zero() {
    let output = run_cli(&["--preset", "atlantis"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("atlantis"), "stderr: {stderr}");
}

#[test]
fn repeated_seed_exits_non_zero() {
    let output = run_cli(&["--seed", "1", "--seed", "2"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("more than once"), "stderr: {stderr}");
}

#[test]
fn unknown_strategy_exits_non_zero() {
    let output = run_cli(&["--strategy", "yolo"]);
    assert!(!output.status.success());
}

#[test]
fn telemetry_and_comparison_csv_are_written() {
    let dir = std::env::temp_dir().join(format!("flexkit-cli-{}", std::process::id()));
    fs::create_dir_all(&dir).unwrap();
    let schedule_path = dir.join("schedule.csv");
    let comparison_path = dir.join("comparison.csv");

    let output = run_cli(&[
        "--preset",
        "baseline",
        "--quiet",
        "--telemetry-out",
        schedule_path.to_str().unwrap(),
        "--comparison-out",
        comparison_path.to_str().unwrap(),
    ]);
    assert!(output.status.success());

    let schedule = fs::read_to_string(&schedule_path).unwrap();
    let mut lines = schedule.lines();
    assert!(lines.next().unwrap().starts_with("timestep,time_hr,action"));
    assert_eq!(lines.count(), 96);

    let comparison = fs::read_to_string(&comparison_path).unwrap();
    assert_eq!(comparison.lines().count(), 5);

    let _ = fs::remove_dir_all(&dir);
}

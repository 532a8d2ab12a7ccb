//! flexkit-sim entry point: CLI wiring and config-driven scenario execution.

use std::process;

use tracing_subscriber::EnvFilter;

use flexkit_sim::cli::{self, CliOptions};
use flexkit_sim::config::ScenarioConfig;
use flexkit_sim::io::export::{export_comparison_csv, export_schedule_csv};
use flexkit_sim::runner::run_scenario;

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
}

/// Loads the scenario named by the CLI and applies overrides.
///
/// `--scenario` takes priority, then `--preset`.
fn load_scenario(cli: &CliOptions) -> Result<ScenarioConfig, String> {
    let mut scenario = match (&cli.scenario, &cli.preset) {
        (Some(path), _) => ScenarioConfig::from_toml_file(path),
        (None, Some(name)) => ScenarioConfig::from_preset(name),
        (None, None) => Ok(ScenarioConfig::baseline()),
    }
    .map_err(|e| e.to_string())?;

    if let Some(seed) = cli.seed {
        scenario.simulation.seed = seed;
    }
    if let Some(strategy) = cli.strategy {
        scenario.simulation.strategy = strategy;
    }
    Ok(scenario)
}

fn main() {
    let cli = match cli::parse_args() {
        Ok(cli) => cli,
        Err(e) => {
            eprintln!("error: {e}");
            cli::print_usage();
            process::exit(1);
        }
    };
    if cli.help {
        cli::print_usage();
        return;
    }

    init_tracing();

    let scenario = load_scenario(&cli).unwrap_or_else(|e| {
        eprintln!("{e}");
        process::exit(1);
    });

    #[cfg(feature = "tui")]
    if cli.tui {
        let label = cli
            .preset
            .clone()
            .unwrap_or_else(|| "custom".to_string());
        if let Err(e) = flexkit_sim::tui::run(scenario, label) {
            eprintln!("error: {e}");
            process::exit(1);
        }
        return;
    }

    let result = run_scenario(&scenario).unwrap_or_else(|e| {
        eprintln!("error: {e}");
        process::exit(1);
    });

    for warning in &result.warnings {
        eprintln!("warning: {warning}");
    }

    if !cli.quiet {
        for r in &result.run.schedule {
            println!("{r}");
        }
        println!();
    }

    println!("Strategy: {}", result.strategy);
    println!("{}", result.run.summary);
    println!();
    println!("{}", result.comparison);

    if let Some(ref path) = cli.telemetry_out {
        if let Err(e) = export_schedule_csv(&result.run.schedule, path) {
            eprintln!("error: failed to write CSV: {e}");
            process::exit(1);
        }
        eprintln!("Schedule written to {}", path.display());
    }
    if let Some(ref path) = cli.comparison_out {
        if let Err(e) = export_comparison_csv(&result.comparison.rows, path) {
            eprintln!("error: failed to write CSV: {e}");
            process::exit(1);
        }
        eprintln!("Comparison written to {}", path.display());
    }

    #[cfg(feature = "api")]
    if cli.serve {
        use std::net::SocketAddr;
        use std::sync::Arc;

        let state = Arc::new(flexkit_sim::api::AppState::new(result));
        let addr = SocketAddr::from(([0, 0, 0, 0], cli.port));
        let rt = tokio::runtime::Runtime::new().unwrap_or_else(|e| {
            eprintln!("error: failed to create tokio runtime: {e}");
            process::exit(1);
        });
        if let Err(e) = rt.block_on(flexkit_sim::api::serve(state, addr)) {
            eprintln!("error: API server failed: {e}");
            process::exit(1);
        }
    }
}

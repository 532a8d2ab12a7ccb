//! Command-line argument parsing.

use std::env;
use std::path::PathBuf;

use crate::sim::policy::Strategy;

/// Default port for `--serve`.
#[cfg(feature = "api")]
pub const DEFAULT_PORT: u16 = 3000;

/// Parsed command-line options.
#[derive(Debug, Clone, PartialEq)]
pub struct CliOptions {
    pub scenario: Option<PathBuf>,
    pub preset: Option<String>,
    pub seed: Option<u64>,
    pub strategy: Option<Strategy>,
    pub telemetry_out: Option<PathBuf>,
    pub comparison_out: Option<PathBuf>,
    /// Suppress per-interval output lines.
    pub quiet: bool,
    pub help: bool,
    #[cfg(feature = "api")]
    pub serve: bool,
    #[cfg(feature = "api")]
    pub port: u16,
    #[cfg(feature = "tui")]
    pub tui: bool,
}

impl Default for CliOptions {
    fn default() -> Self {
        Self {
            scenario: None,
            preset: None,
            seed: None,
            strategy: None,
            telemetry_out: None,
            comparison_out: None,
            quiet: false,
            help: false,
            #[cfg(feature = "api")]
            serve: false,
            #[cfg(feature = "api")]
            port: DEFAULT_PORT,
            #[cfg(feature = "tui")]
            tui: false,
        }
    }
}

pub fn parse_args() -> Result<CliOptions, String> {
    parse_args_from(env::args().skip(1))
}

/// Parses options from an argument list that excludes the program name.
///
/// `--scenario` and `--preset` are mutually exclusive; when neither is given
/// the `baseline` preset is selected.
pub fn parse_args_from<I, S>(args: I) -> Result<CliOptions, String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let args: Vec<String> = args.into_iter().map(Into::into).collect();
    let mut opts = CliOptions::default();
    let mut i = 0usize;

    while i < args.len() {
        match args[i].as_str() {
            "--help" | "-h" => {
                opts.help = true;
                return Ok(opts);
            }
            "--scenario" => {
                i += 1;
                let path = args.next_or_err(i, "missing value for --scenario (expected a TOML file path)")?;
                if opts.scenario.replace(PathBuf::from(path)).is_some() {
                    return Err("--scenario provided more than once".to_string());
                }
            }
            "--preset" => {
                i += 1;
                let name = args.next_or_err(i, "missing value for --preset (expected a preset name)")?;
                if opts.preset.replace(name.to_string()).is_some() {
                    return Err("--preset provided more than once".to_string());
                }
            }
            "--seed" => {
                i += 1;
                let raw = args.next_or_err(i, "missing value for --seed (expected a u64)")?;
                let seed = raw
                    .parse::<u64>()
                    .map_err(|_| format!("--seed value \"{raw}\" is not a valid u64"))?;
                if opts.seed.replace(seed).is_some() {
                    return Err("--seed provided more than once".to_string());
                }
            }
            "--strategy" => {
                i += 1;
                let raw = args.next_or_err(i, "missing value for --strategy (expected a strategy name)")?;
                let strategy = raw.parse::<Strategy>().map_err(|e| e.message)?;
                if opts.strategy.replace(strategy).is_some() {
                    return Err("--strategy provided more than once".to_string());
                }
            }
            "--telemetry-out" => {
                i += 1;
                let path = args.next_or_err(i, "missing value for --telemetry-out (expected a file path)")?;
                if opts.telemetry_out.replace(PathBuf::from(path)).is_some() {
                    return Err("--telemetry-out provided more than once".to_string());
                }
            }
            "--comparison-out" => {
                i += 1;
                let path = args.next_or_err(i, "missing value for --comparison-out (expected a file path)")?;
                if opts.comparison_out.replace(PathBuf::from(path)).is_some() {
                    return Err("--comparison-out provided more than once".to_string());
                }
            }
            "--quiet" | "-q" => opts.quiet = true,
            #[cfg(feature = "api")]
            "--serve" => opts.serve = true,
            #[cfg(feature = "api")]
            "--port" => {
                i += 1;
                let raw = args.next_or_err(i, "missing value for --port (expected a u16)")?;
                opts.port = raw
                    .parse::<u16>()
                    .map_err(|_| format!("--port value \"{raw}\" is not a valid u16"))?;
            }
            #[cfg(feature = "tui")]
            "--tui" => opts.tui = true,
            other => return Err(format!("unknown argument: {other}")),
        }
        i += 1;
    }

    if opts.scenario.is_some() && opts.preset.is_some() {
        return Err(
            "arguments `--scenario` and `--preset` are mutually exclusive; choose one source"
                .to_string(),
        );
    }

    if opts.scenario.is_none() && opts.preset.is_none() {
        opts.preset = Some("baseline".to_string());
    }

    Ok(opts)
}

trait SliceArgExt {
    fn next_or_err(&self, index: usize, err: &str) -> Result<&str, String>;
}

impl SliceArgExt for [String] {
    fn next_or_err(&self, index: usize, err: &str) -> Result<&str, String> {
        self.get(index)
            .map(String::as_str)
            .ok_or_else(|| err.to_string())
    }
}

pub fn print_usage() {
    eprintln!("flexkit-sim: battery dispatch simulator");
    eprintln!();
    eprintln!("Usage: flexkit-sim [OPTIONS]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --scenario <path>         Load scenario from TOML config file");
    eprintln!("  --preset <name>           Use a built-in preset (default: baseline)");
    eprintln!("  --seed <u64>              Override random seed");
    eprintln!("  --strategy <name>         Override the primary strategy");
    eprintln!("  --telemetry-out <path>    Export the primary schedule to CSV");
    eprintln!("  --comparison-out <path>   Export the strategy comparison to CSV");
    eprintln!("  --quiet, -q               Do not print per-interval lines");
    #[cfg(feature = "api")]
    {
        eprintln!("  --serve                   Start REST API server after simulation");
        eprintln!("  --port <u16>              API server port (default: {DEFAULT_PORT})");
    }
    #[cfg(feature = "tui")]
    eprintln!("  --tui                     Replay the schedules in the terminal");
    eprintln!("  --help, -h                Show this help message");
}

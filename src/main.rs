//! smart-energy entry point: CLI wiring and config-driven run construction.

use std::path::Path;
use std::process;

use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use smart_energy::config::ScenarioConfig;
use smart_energy::io::export::export_csv;
use smart_energy::sim::kpi::RunSummary;
use smart_energy::sim::runner::DayRunner;

/// Parsed CLI arguments.
struct CliArgs {
    scenario_path: Option<String>,
    preset: Option<String>,
    seed_override: Option<u64>,
    days_override: Option<usize>,
    telemetry_out: Option<String>,
    #[cfg(feature = "api")]
    serve: bool,
    #[cfg(feature = "api")]
    port: u16,
}

fn print_help() {
    eprintln!("smart-energy: priority-driven device energy allocation");
    eprintln!();
    eprintln!("Usage: smart-energy [OPTIONS]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --scenario <path>        Load scenario from TOML config file");
    eprintln!(
        "  --preset <name>          Use a built-in preset ({})",
        ScenarioConfig::PRESETS.join(", ")
    );
    eprintln!("  --seed <u64>             Override random seed");
    eprintln!("  --days <n>               Override number of simulated days");
    eprintln!("  --telemetry-out <path>   Export step records to CSV");
    #[cfg(feature = "api")]
    {
        eprintln!("  --serve                  Start REST API server after the run");
        eprintln!("  --port <u16>             API server port (default: 3000)");
    }
    eprintln!("  --help                   Show this help message");
    eprintln!();
    eprintln!("If no --scenario or --preset is given, the baseline preset is used.");
    eprintln!("Log verbosity follows RUST_LOG (default: info).");
}

fn fail(message: &str) -> ! {
    eprintln!("error: {message}");
    process::exit(1);
}

fn parse_args() -> CliArgs {
    let args: Vec<String> = std::env::args().collect();
    let mut cli = CliArgs {
        scenario_path: None,
        preset: None,
        seed_override: None,
        days_override: None,
        telemetry_out: None,
        #[cfg(feature = "api")]
        serve: false,
        #[cfg(feature = "api")]
        port: 3000,
    };

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--help" | "-h" => {
                print_help();
                process::exit(0);
            }
            "--scenario" => {
                i += 1;
                let Some(path) = args.get(i) else {
                    fail("--scenario requires a path argument");
                };
                cli.scenario_path = Some(path.clone());
            }
            "--preset" => {
                i += 1;
                let Some(name) = args.get(i) else {
                    fail("--preset requires a name argument");
                };
                cli.preset = Some(name.clone());
            }
            "--seed" => {
                i += 1;
                let Some(raw) = args.get(i) else {
                    fail("--seed requires a u64 argument");
                };
                match raw.parse::<u64>() {
                    Ok(s) => cli.seed_override = Some(s),
                    Err(_) => fail(&format!("--seed value \"{raw}\" is not a valid u64")),
                }
            }
            "--days" => {
                i += 1;
                let Some(raw) = args.get(i) else {
                    fail("--days requires a positive integer argument");
                };
                match raw.parse::<usize>() {
                    Ok(d) if d > 0 => cli.days_override = Some(d),
                    _ => fail(&format!("--days value \"{raw}\" is not a positive integer")),
                }
            }
            "--telemetry-out" => {
                i += 1;
                let Some(path) = args.get(i) else {
                    fail("--telemetry-out requires a path argument");
                };
                cli.telemetry_out = Some(path.clone());
            }
            #[cfg(feature = "api")]
            "--serve" => {
                cli.serve = true;
            }
            #[cfg(feature = "api")]
            "--port" => {
                i += 1;
                let Some(raw) = args.get(i) else {
                    fail("--port requires a u16 argument");
                };
                match raw.parse::<u16>() {
                    Ok(p) => cli.port = p,
                    Err(_) => fail(&format!("--port value \"{raw}\" is not a valid u16")),
                }
            }
            other => {
                eprintln!("error: unknown argument \"{other}\"");
                print_help();
                process::exit(1);
            }
        }
        i += 1;
    }

    if cli.scenario_path.is_some() && cli.preset.is_some() {
        fail("`--scenario` and `--preset` are mutually exclusive; choose one source");
    }

    cli
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = parse_args();

    // --scenario takes priority, then --preset, then baseline default
    let loaded = if let Some(ref path) = cli.scenario_path {
        ScenarioConfig::from_toml_file(Path::new(path))
    } else if let Some(ref name) = cli.preset {
        ScenarioConfig::from_preset(name)
    } else {
        Ok(ScenarioConfig::baseline())
    };
    let mut scenario = loaded.unwrap_or_else(|e| fail(&e.to_string()));

    if let Some(seed) = cli.seed_override {
        scenario.simulation.seed = seed;
    }
    if let Some(days) = cli.days_override {
        scenario.simulation.days = days;
    }

    let errors = scenario.validate();
    if !errors.is_empty() {
        for e in &errors {
            eprintln!("{e}");
        }
        process::exit(1);
    }

    let mut runner = DayRunner::from_scenario(&scenario).unwrap_or_else(|e| fail(&e.to_string()));
    let records = runner.run().unwrap_or_else(|e| {
        error!(error = %e, "run aborted");
        fail(&e.to_string())
    });
    let summary = RunSummary::from_records(
        &records,
        runner.run_config().dt_hours,
        scenario.budget.energy_usage_limit_kwh,
    );

    for r in &records {
        println!("{r}");
    }
    println!("\n{summary}");

    if let Some(ref path) = cli.telemetry_out {
        if let Err(e) = export_csv(&records, Path::new(path)) {
            fail(&format!("failed to write CSV: {e}"));
        }
        info!(path = %path, "telemetry written");
    }

    #[cfg(feature = "api")]
    if cli.serve {
        use std::net::SocketAddr;
        use std::sync::Arc;

        let state = Arc::new(smart_energy::api::AppState {
            engine: runner.engine().clone(),
            scenario,
            summary,
            records,
        });
        let addr = SocketAddr::from(([0, 0, 0, 0], cli.port));
        let rt = tokio::runtime::Runtime::new()
            .unwrap_or_else(|e| fail(&format!("failed to create tokio runtime: {e}")));
        if let Err(e) = rt.block_on(smart_energy::api::serve(state, addr)) {
            fail(&format!("server error: {e}"));
        }
    }
}

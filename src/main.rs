//! Durable Runner CLI Entry Point
//!
//! Executes a run file with the demo actions and resumes it until it
//! succeeds or the restore budget is spent.
//!
//! # Usage
//!
//! ```bash
//! # Execute a run
//! durable-runner run.yaml
//!
//! # Allow up to 100 resumes after a failure
//! durable-runner run.yaml --max-restores 100
//!
//! # Debug logging
//! durable-runner run.yaml --verbose
//! ```

use std::env;
use std::process::ExitCode;
use std::sync::Arc;

use log::{error, info, warn};

use durable_runner::execution::{builtin, Context, Manager};
use durable_runner::monitoring::RunReport;
use durable_runner::store::MemoryStore;
use durable_runner::workflow::load_run_file;
use durable_runner::{APP_NAME, VERSION};

/// Default run file used when none is specified.
const DEFAULT_RUN_FILE: &str = "run.yaml";

/// Command-line configuration parsed from arguments.
#[derive(Debug, Default)]
struct Config {
    run_file: Option<String>,
    max_restores: Option<usize>,
    verbose: bool,
}

/// Configures the logging system with appropriate formatting.
fn setup_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format(|buf, record| {
            use std::io::Write;

            match record.level() {
                log::Level::Warn | log::Level::Error => {
                    writeln!(buf, "[{}] {}", record.level(), record.args())
                }
                _ => writeln!(buf, "{}", record.args()),
            }
        })
        .init();
}

/// Prints the application banner with version information.
fn print_banner() {
    println!();
    println!("{} v{}", APP_NAME, VERSION);
    println!("Resumable Step Execution Engine");
    println!();
}

/// Prints usage information.
fn print_usage() {
    println!("Usage: durable-runner [OPTIONS] <RUN_FILE>");
    println!();
    println!("Arguments:");
    println!("  <RUN_FILE>            Path to run YAML file (default: {})", DEFAULT_RUN_FILE);
    println!();
    println!("Options:");
    println!("  --max-restores N      Resume a failed run at most N times (overrides run file)");
    println!("  --verbose             Enable debug logging");
    println!("  --help                Show this help message");
    println!("  --version             Show version information");
    println!();
    println!("Actions: {}", builtin::demo_registry().identifiers().join(", "));
}

/// Parses command-line arguments into a Config struct.
fn parse_arguments(args: &[String]) -> Result<Config, String> {
    let mut config = Config::default();
    let mut i = 1; // Skip program name

    while i < args.len() {
        let arg = &args[i];

        match arg.as_str() {
            "--help" | "-h" => {
                print_usage();
                std::process::exit(0);
            }
            "--version" | "-V" => {
                println!("{} {}", APP_NAME, VERSION);
                std::process::exit(0);
            }
            "--verbose" | "-v" => {
                config.verbose = true;
            }
            "--max-restores" => {
                i += 1;
                if i >= args.len() {
                    return Err("--max-restores requires a number argument".to_string());
                }
                let value = args[i]
                    .parse()
                    .map_err(|_| format!("Invalid max-restores value: {}", args[i]))?;
                config.max_restores = Some(value);
            }
            arg if arg.starts_with('-') => {
                return Err(format!("Unknown option: {}", arg));
            }
            _ => {
                if config.run_file.is_some() {
                    return Err(format!("Unexpected argument: {}", arg));
                }
                config.run_file = Some(arg.clone());
            }
        }
        i += 1;
    }

    Ok(config)
}

/// Main application entry point.
fn run() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    let config = parse_arguments(&args).map_err(|e| {
        eprintln!("Error: {}", e);
        eprintln!();
        print_usage();
        e
    })?;

    setup_logging(config.verbose);
    print_banner();

    let run_file_path = config.run_file.as_deref().unwrap_or(DEFAULT_RUN_FILE);
    let run_file = load_run_file(run_file_path).map_err(|e| {
        error!("Failed to load run file: {}", e);
        format!("Could not load run from '{}': {}", run_file_path, e)
    })?;
    let max_restores = config.max_restores.unwrap_or(run_file.max_restores);

    let registry = builtin::demo_registry();
    for unknown in run_file.unknown_actions(&registry) {
        warn!("Action '{}' is not registered; the run will stop there", unknown);
    }

    let manager = Manager::new(registry, Arc::new(MemoryStore::new()));
    let ctx = Context::background();

    info!(
        "Run loaded: {} actions, up to {} restores",
        run_file.actions.len(),
        max_restores
    );

    let mut outcome = manager.execute_event(&ctx, run_file.input.clone(), &run_file.actions[..]);
    let mut restores = 0;

    while let Err(ref e) = outcome {
        if !e.is_retryable() || restores >= max_restores {
            break;
        }
        restores += 1;

        warn!("{} - resuming (attempt {}/{})", e, restores, max_restores);
        let run_id = e.run_id().to_string();
        outcome = manager.restore_event(&ctx, &run_id);
    }

    let run_id = match &outcome {
        Ok(run_id) => run_id.clone(),
        Err(e) => e.run_id().to_string(),
    };

    if let Ok(record) = manager.inspect(&run_id) {
        println!("{}", RunReport::from_record(&record).render());
    }

    match outcome {
        Ok(_) => {
            info!("Run {} finished after {} restores", run_id, restores);
            Ok(())
        }
        Err(e) => Err(format!("Run did not complete after {} restores: {}", restores, e).into()),
    }
}

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!();
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

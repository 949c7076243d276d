//! Cultivation Headless Balance Simulator
//!
//! Drives the progression engine with a scripted player, collecting metrics
//! for balance analysis. Uses the same engine operations as a real client.
//!
//! Usage:
//!   cargo run --bin simulator -- [OPTIONS]
//!
//! Options:
//!   --seconds N          Simulated seconds per run (default: 604800 = 7 days)
//!   --seed N             RNG seed (default: 42)
//!   --runs N             Number of runs with incrementing seeds (default: 1)
//!   --taps-per-second N  Taps per simulated second (default: 2)
//!   --target-level N     Level that ends a run (default: 144)
//!   --prestige N         Starting prestige count (default: 0)
//!   --rebirths N         Reincarnate on ascension until N rebirths
//!   --decline-events     Decline every event
//!   --verbose            One line per run
//!   --quiet              Only final summary line

use cultivation::simulator::{run_simulation, SimConfig};
use std::str::FromStr;

fn parse_value<T: FromStr>(args: &[String], i: usize, flag: &str) -> T {
    match args.get(i).and_then(|v| v.parse().ok()) {
        Some(value) => value,
        None => {
            eprintln!("{flag} requires a number");
            std::process::exit(1);
        }
    }
}

fn parse_args() -> (SimConfig, bool) {
    let args: Vec<String> = std::env::args().collect();
    let mut config = SimConfig {
        num_runs: 1,
        seed: Some(42),
        ..Default::default()
    };
    let mut quiet = false;
    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--seconds" => {
                i += 1;
                config.max_seconds_per_run = parse_value(&args, i, "--seconds");
            }
            "--seed" => {
                i += 1;
                config.seed = Some(parse_value(&args, i, "--seed"));
            }
            "--runs" => {
                i += 1;
                config.num_runs = parse_value(&args, i, "--runs");
            }
            "--taps-per-second" => {
                i += 1;
                config.taps_per_second = parse_value(&args, i, "--taps-per-second");
            }
            "--target-level" => {
                i += 1;
                config.target_level = parse_value(&args, i, "--target-level");
            }
            "--prestige" => {
                i += 1;
                config.starting_prestige = parse_value(&args, i, "--prestige");
            }
            "--rebirths" => {
                i += 1;
                config.target_prestige = parse_value(&args, i, "--rebirths");
                config.simulate_prestige = true;
            }
            "--decline-events" => config.accept_events = false,
            "--verbose" => config.verbosity = 2,
            "--quiet" => quiet = true,
            "--help" | "-h" => {
                print_usage();
                std::process::exit(0);
            }
            other => {
                eprintln!("Unknown argument: {other}");
                print_usage();
                std::process::exit(1);
            }
        }
        i += 1;
    }
    (config, quiet)
}

fn print_usage() {
    eprintln!(
        "Cultivation Headless Simulator\n\
         \n\
         Usage: simulator [OPTIONS]\n\
         \n\
         Options:\n\
         \x20 --seconds N          Simulated seconds per run (default: 604800 = 7 days)\n\
         \x20 --seed N             RNG seed (default: 42)\n\
         \x20 --runs N             Number of runs with incrementing seeds (default: 1)\n\
         \x20 --taps-per-second N  Taps per simulated second (default: 2)\n\
         \x20 --target-level N     Level that ends a run (default: 144)\n\
         \x20 --prestige N         Starting prestige count (default: 0)\n\
         \x20 --rebirths N         Reincarnate on ascension until N rebirths\n\
         \x20 --decline-events     Decline every event\n\
         \x20 --verbose            One line per run\n\
         \x20 --quiet              Only final summary line\n\
         \x20 --help, -h           Show this help"
    );
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let (config, quiet) = parse_args();
    let report = run_simulation(&config);

    if quiet {
        println!("{}", report.summary_line());
    } else {
        print!("{}", report.to_text());
    }
}

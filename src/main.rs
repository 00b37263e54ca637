//! Colony RL CLI - Run repeated learning runs until the user stops.

use std::io::BufRead;
use std::path::PathBuf;
use std::sync::atomic::Ordering;

use colony_rl::compute::AgentView;
use colony_rl::{Session, SimulationConfig, Storage, viewer};

/// Steps between progress lines.
const PROGRESS_INTERVAL: u64 = 100;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = std::env::args().collect();

    if args.get(1).is_some_and(|a| a == "--example") {
        print_example_config();
        return;
    }
    if args.get(1).is_some_and(|a| a == "--help" || a == "-h") {
        print_usage(&args[0]);
        return;
    }

    let data_dir = args.get(1).map_or_else(|| PathBuf::from("."), PathBuf::from);

    // Load configuration
    let config = match args.get(2) {
        Some(path) => {
            let config_str = std::fs::read_to_string(path).unwrap_or_else(|e| {
                eprintln!("Error reading config file: {}", e);
                std::process::exit(1);
            });
            serde_json::from_str(&config_str).unwrap_or_else(|e| {
                eprintln!("Error parsing config: {}", e);
                std::process::exit(1);
            })
        }
        None => SimulationConfig::default(),
    };

    let storage = Storage::in_dir(&data_dir).unwrap_or_else(|e| {
        eprintln!("Error preparing data directory: {}", e);
        std::process::exit(1);
    });

    let history = storage.history.clone();
    let mut session = Session::open(config, storage).unwrap_or_else(|e| {
        eprintln!("Error starting session: {}", e);
        std::process::exit(1);
    });

    // The viewer runs on its own; the CLI never waits for it.
    match viewer::launch_history_viewer(&history) {
        Ok(child) => log::info!("History viewer started (pid {})", child.id()),
        Err(e) => log::warn!("Could not start history viewer: {}", e),
    }

    // Any line on stdin requests a stop; the current run is finalized first.
    let cancel = session.cancel_handle();
    std::thread::spawn(move || {
        if let Some(Ok(_)) = std::io::stdin().lock().lines().next() {
            log::info!("Stop requested, finishing current run");
            cancel.store(true, Ordering::Relaxed);
        }
    });

    println!("Colony RL");
    println!("=========");
    println!("Data directory: {}", data_dir.display());
    println!("Press Enter to stop after the current run is saved.");
    println!();

    let mut completed = 0;
    while !session.is_cancelled() {
        let scores = session.high_scores();
        let last = session.last_run().unwrap_or_default();
        let result = session.run_once_with_callback(|report, sim| {
            if report.step % PROGRESS_INTERVAL != 0 {
                return;
            }
            log::info!("{}", report.summary());
            log::info!(
                "Longest run: {} (last: {}), most births: {} (last: {})",
                scores.max_steps,
                last.steps,
                scores.max_births,
                last.births
            );
            if log::log_enabled!(log::Level::Debug) {
                let labels: Vec<String> =
                    sim.snapshot().agents.iter().map(AgentView::label).collect();
                log::debug!("{}", labels.join("  "));
            }
        });
        if let Err(e) = result {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
        completed += 1;
    }

    let scores = session.high_scores();
    println!();
    println!("Completed runs: {}", completed);
    if let Some(last) = session.last_run() {
        println!("Last run: {} steps, {} births", last.steps, last.births);
    }
    println!("Longest run: {} steps", scores.max_steps);
    println!("Most births: {}", scores.max_births);
    println!("Best mean max-Q: {:.3}", scores.max_q);
    println!("Known states: {}", session.table().len());
}

fn print_usage(program: &str) {
    eprintln!("Usage: {} [data_dir] [config.json]", program);
    eprintln!();
    eprintln!("Run colony learning sessions, persisting to data_dir (default: .).");
    eprintln!();
    eprintln!("Arguments:");
    eprintln!("  data_dir     Directory for qtable.json, highscores.json, history.json");
    eprintln!("  config.json  Optional simulation configuration");
    eprintln!();
    eprintln!("Print the default configuration with --example.");
}

fn print_example_config() {
    match serde_json::to_string_pretty(&SimulationConfig::default()) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("Error serializing config: {}", e),
    }
}

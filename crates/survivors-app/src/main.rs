//! survivors: headless arena run driven by the autopilot.
//!
//! Usage:
//!   survivors [--config app.json] [--seed N] [--rounds N] [--speed X]
//!             [--store DIR] [--reset-items] [--no-shop]

use std::path::{Path, PathBuf};
use std::process;
use std::thread;

use survivors_app::autopilot::{Autopilot, RunSummary};
use survivors_app::config::AppConfig;
use survivors_app::game_loop;
use survivors_app::logging;

fn main() {
    logging::init();
    let args: Vec<String> = std::env::args().skip(1).collect();

    if args.iter().any(|a| a == "help" || a == "--help" || a == "-h") {
        print_usage();
        return;
    }

    let config = match parse_config(&args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{e}");
            print_usage();
            process::exit(1);
        }
    };

    if let Err(e) = run(config) {
        eprintln!("Run failed: {e}");
        process::exit(1);
    }
}

fn print_usage() {
    eprintln!(
        "survivors: headless survivors arena run\n\
         \n\
           --config <path>  JSON config file (optional, all fields default)\n\
           --seed <N>       RNG seed\n\
           --rounds <N>     Stop after N cleared rounds (0: until game over)\n\
           --speed <X>      Wall-clock speed multiplier (default: 1)\n\
           --store <dir>    Persist the item registry in this directory\n\
           --reset-items    Forget generated items and fusion history\n\
           --no-shop        Skip buying and crafting between rounds\n\
         \n\
         Log level: SURVIVORS_LOG=error|warn|info|debug|trace\n"
    );
}

fn flag_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.iter()
        .position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .map(String::as_str)
}

fn parse_flag<T: std::str::FromStr>(args: &[String], flag: &str) -> Result<Option<T>, String> {
    flag_value(args, flag)
        .map(|value| {
            value
                .parse()
                .map_err(|_| format!("Invalid value for {flag}: {value}"))
        })
        .transpose()
}

fn parse_config(args: &[String]) -> Result<AppConfig, String> {
    let mut config = match flag_value(args, "--config") {
        Some(path) => AppConfig::load(Path::new(path))?,
        None => AppConfig::default(),
    };
    if let Some(seed) = parse_flag(args, "--seed")? {
        config.seed = seed;
    }
    if let Some(rounds) = parse_flag(args, "--rounds")? {
        config.rounds_to_play = rounds;
    }
    if let Some(speed) = parse_flag(args, "--speed")? {
        config.speed = speed;
    }
    if let Some(dir) = flag_value(args, "--store") {
        config.store_dir = Some(PathBuf::from(dir));
    }
    if args.iter().any(|a| a == "--reset-items") {
        config.reset_items = true;
    }
    if args.iter().any(|a| a == "--no-shop") {
        config.auto_shop = false;
    }
    Ok(config)
}

fn run(config: AppConfig) -> Result<(), String> {
    let poll_interval = config.tick_duration();
    let mut autopilot = Autopilot::new(&config);
    let handle = game_loop::spawn_game_loop(config.clone())
        .map_err(|e| format!("Failed to spawn game loop thread: {e}"))?;

    let last = loop {
        thread::sleep(poll_interval);
        let Some(snapshot) = handle.latest() else {
            continue;
        };
        let decision = autopilot.step(&snapshot);
        for command in decision.commands {
            handle.send(command)?;
        }
        if decision.finished {
            break snapshot;
        }
    };
    handle.shutdown();

    let summary = RunSummary::new(config.seed, &last);
    log::info!(
        "run finished after {} cleared rounds (game over: {})",
        summary.rounds_cleared,
        summary.game_over
    );
    let json = serde_json::to_string_pretty(&summary)
        .map_err(|e| format!("Failed to serialize summary: {e}"))?;
    println!("{json}");
    Ok(())
}

//! Planner - turn-by-turn MCTS / EMCTS runner for the skirmish game
//!
//! Each run builds a fresh search tree at the current game state, plans
//! within the configured time budget, replays the chosen action sequence
//! and prints the resulting map. The loop ends when the game is over, the
//! run cap is reached or the search returns an empty plan.

use anyhow::Result;
use clap::Parser;
use tracing::{error, info};

mod config;
mod planner;

use crate::config::Config;
use crate::planner::{format_turn, Planner};

fn init_tracing(level: &str) -> Result<()> {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    Ok(())
}

fn main() -> Result<()> {
    let config = Config::parse();
    config.validate()?;

    init_tracing(config.effective_log_level())?;
    info!(log_level = %config.effective_log_level(), "Tracing initialized");

    let max_runs_description = if config.max_runs == 0 {
        "until the game ends".to_string()
    } else {
        config.max_runs.to_string()
    };
    info!(
        max_runs = config.max_runs,
        "Planner will run {}", max_runs_description
    );

    let random_init = config.random_init;
    let mut planner = Planner::new(config)?;
    println!(
        "Running {} -- random initialization {}",
        planner.agent(),
        random_init
    );
    println!("Start state: {}", planner.state());

    match planner.run(|turn, game| println!("{}", format_turn(turn, game))) {
        Ok(stats) => {
            info!(runs = stats.runs, "Planner completed successfully");
            Ok(())
        }
        Err(e) => {
            error!("Planner failed: {:#}", e);
            Err(e)
        }
    }
}

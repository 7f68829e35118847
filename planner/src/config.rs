//! Configuration for the planner binary
//!
//! Configuration is loaded from config.toml with environment variable overrides.
//! CLI arguments take highest priority, followed by env vars, then config.toml.

use anyhow::{anyhow, Result};
use clap::Parser;
use engine_config::{load_config, EmctsConfig};
use mcts::{ElasticConfig, SearchConfig};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::level_filters::LevelFilter;

// Load central config once at startup
static CENTRAL_CONFIG: Lazy<EmctsConfig> = Lazy::new(load_config);

fn default_agent() -> String {
    CENTRAL_CONFIG.planner.agent.clone()
}

fn default_random_init() -> bool {
    CENTRAL_CONFIG.game.random_init
}

fn default_map_size() -> u32 {
    CENTRAL_CONFIG.game.map_size
}

fn default_max_turns() -> u32 {
    CENTRAL_CONFIG.game.max_turns
}

fn default_max_runs() -> u32 {
    CENTRAL_CONFIG.planner.max_runs
}

fn default_time_limit() -> f64 {
    CENTRAL_CONFIG.search.time_limit_secs
}

fn default_exploration_weight() -> f64 {
    CENTRAL_CONFIG.search.exploration_weight
}

fn default_rollout_depth() -> u32 {
    CENTRAL_CONFIG.search.rollout_depth
}

fn default_max_iterations() -> u64 {
    CENTRAL_CONFIG.search.max_iterations
}

fn default_seed() -> u64 {
    CENTRAL_CONFIG.search.seed
}

fn default_alpha_abs() -> u64 {
    CENTRAL_CONFIG.elastic.alpha_abs
}

fn default_batch_size() -> u64 {
    CENTRAL_CONFIG.elastic.batch_size
}

fn default_eta_r() -> f64 {
    CENTRAL_CONFIG.elastic.eta_r
}

fn default_eta_t() -> f64 {
    CENTRAL_CONFIG.elastic.eta_t
}

fn default_log_level() -> String {
    CENTRAL_CONFIG.common.log_level.clone()
}

/// Which search driver plans each turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Agent {
    Mcts,
    Emcts,
}

impl std::str::FromStr for Agent {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "mcts" => Ok(Agent::Mcts),
            "emcts" => Ok(Agent::Emcts),
            other => Err(anyhow!("unknown agent '{}' (expected mcts or emcts)", other)),
        }
    }
}

impl std::fmt::Display for Agent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Agent::Mcts => f.write_str("mcts"),
            Agent::Emcts => f.write_str("emcts"),
        }
    }
}

#[derive(Parser, Debug, Clone, Serialize, Deserialize)]
#[command(name = "planner")]
#[command(about = "Plan a skirmish game turn by turn with MCTS or Elastic MCTS")]
#[command(
    long_about = "Repeatedly plans the player's next turn from the current game state,
replays the chosen action sequence and prints the resulting map until the game ends.

Configuration is loaded from config.toml with environment variable overrides.
CLI arguments take highest priority."
)]
pub struct Config {
    /// Search driver to use (mcts or emcts)
    #[arg(long, default_value_t = default_agent())]
    pub agent: String,

    /// Start the fighters at random diagonal positions
    #[arg(long, default_value_t = default_random_init())]
    pub random_init: bool,

    /// Log at debug level and print the search tree after every turn
    #[arg(long)]
    pub debug: bool,

    /// Width and height of the square map
    #[arg(long, default_value_t = default_map_size())]
    pub map_size: u32,

    /// Turn limit after which the game ends
    #[arg(long, default_value_t = default_max_turns())]
    pub max_turns: u32,

    /// Maximum planning runs (0 for until the game ends)
    #[arg(long, default_value_t = default_max_runs())]
    pub max_runs: u32,

    /// Wall-clock budget per planning run in seconds
    #[arg(long, default_value_t = default_time_limit())]
    pub time_limit: f64,

    /// UCT exploration constant
    #[arg(long, default_value_t = default_exploration_weight())]
    pub exploration_weight: f64,

    /// Maximum random actions per rollout
    #[arg(long, default_value_t = default_rollout_depth())]
    pub rollout_depth: u32,

    /// Iteration cap per planning run (0 for time limit only)
    #[arg(long, default_value_t = default_max_iterations())]
    pub max_iterations: u64,

    /// RNG seed (0 for OS entropy)
    #[arg(long, default_value_t = default_seed())]
    pub seed: u64,

    /// Iterations after which abstraction stops and merges are reverted
    #[arg(long, default_value_t = default_alpha_abs())]
    pub alpha_abs: u64,

    /// Run the grouping pass every N iterations
    #[arg(long, default_value_t = default_batch_size())]
    pub batch_size: u64,

    /// Reward tolerance for merging nodes
    #[arg(long, default_value_t = default_eta_r())]
    pub eta_r: f64,

    /// Position tolerance for merging nodes
    #[arg(long, default_value_t = default_eta_t())]
    pub eta_t: f64,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value_t = default_log_level())]
    pub log_level: String,
}

impl Config {
    /// Validate configuration values.
    pub fn validate(&self) -> Result<()> {
        self.agent_kind()?;

        if !self.time_limit.is_finite() || self.time_limit <= 0.0 {
            return Err(anyhow!("time_limit must be greater than 0"));
        }

        if self.batch_size == 0 {
            return Err(anyhow!("batch_size must be greater than 0"));
        }

        if [self.eta_r, self.eta_t]
            .iter()
            .any(|eta| eta.is_nan() || *eta < 0.0)
        {
            return Err(anyhow!("eta_r and eta_t must be non-negative"));
        }

        if self.map_size == 0 {
            return Err(anyhow!("map_size must be greater than 0"));
        }

        self.log_level
            .parse::<LevelFilter>()
            .map_err(|_| anyhow!("invalid log level: {}", self.log_level))?;

        Ok(())
    }

    pub fn agent_kind(&self) -> Result<Agent> {
        self.agent.parse()
    }

    /// Level handed to the tracing subscriber; `--debug` wins over `--log-level`.
    pub fn effective_log_level(&self) -> &str {
        if self.debug {
            "debug"
        } else {
            &self.log_level
        }
    }

    pub fn time_limit(&self) -> Duration {
        Duration::try_from_secs_f64(self.time_limit).unwrap_or(Duration::ZERO)
    }

    /// Fixed seed, or `None` to draw from OS entropy.
    pub fn fixed_seed(&self) -> Option<u64> {
        (self.seed != 0).then_some(self.seed)
    }

    pub fn search_config(&self) -> SearchConfig {
        SearchConfig {
            time_limit: self.time_limit(),
            exploration_weight: self.exploration_weight,
            rollout_depth: self.rollout_depth,
            max_iterations: (self.max_iterations != 0).then_some(self.max_iterations),
            seed: self.fixed_seed(),
        }
    }

    pub fn elastic_config(&self) -> ElasticConfig {
        ElasticConfig {
            alpha_abs: self.alpha_abs,
            batch_size: self.batch_size,
            eta_r: self.eta_r,
            eta_t: self.eta_t,
        }
    }
}

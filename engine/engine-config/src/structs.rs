//! Configuration struct definitions.
//!
//! All config structs with serde deserialization support and default values.

use std::time::Duration;

use crate::defaults;
use serde::Deserialize;

// ============================================================================
// Serde default functions (required for #[serde(default = "...")])
// These call the accessor functions from defaults module
// ============================================================================

fn d_log_level() -> String {
    defaults::log_level().into()
}
fn d_map_size() -> u32 {
    defaults::map_size()
}
fn d_max_turns() -> u32 {
    defaults::max_turns()
}
fn d_random_init() -> bool {
    defaults::random_init()
}
fn d_agent() -> String {
    defaults::agent().into()
}
fn d_max_runs() -> u32 {
    defaults::max_runs()
}
fn d_time_limit() -> f64 {
    defaults::time_limit_secs()
}
fn d_exploration_weight() -> f64 {
    defaults::exploration_weight()
}
fn d_rollout_depth() -> u32 {
    defaults::rollout_depth()
}
fn d_max_iterations() -> u64 {
    defaults::max_iterations()
}
fn d_seed() -> u64 {
    defaults::seed()
}
fn d_alpha_abs() -> u64 {
    defaults::alpha_abs()
}
fn d_batch_size() -> u64 {
    defaults::batch_size()
}
fn d_eta_r() -> f64 {
    defaults::eta_r()
}
fn d_eta_t() -> f64 {
    defaults::eta_t()
}

// ============================================================================
// Configuration Structs
// ============================================================================

/// Root configuration structure matching config.toml
#[derive(Debug, Deserialize, Default, Clone)]
pub struct EmctsConfig {
    #[serde(default)]
    pub common: CommonSettings,
    #[serde(default)]
    pub game: GameSettings,
    #[serde(default)]
    pub planner: PlannerSettings,
    #[serde(default)]
    pub search: SearchSettings,
    #[serde(default)]
    pub elastic: ElasticSettings,
}

/// Settings shared by every binary
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct CommonSettings {
    #[serde(default = "d_log_level")]
    pub log_level: String,
}

impl Default for CommonSettings {
    fn default() -> Self {
        Self {
            log_level: defaults::log_level().into(),
        }
    }
}

/// Skirmish game setup
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct GameSettings {
    #[serde(default = "d_map_size")]
    pub map_size: u32,
    #[serde(default = "d_max_turns")]
    pub max_turns: u32,
    /// Start from random diagonal positions instead of the fixed corners
    #[serde(default = "d_random_init")]
    pub random_init: bool,
}

impl Default for GameSettings {
    fn default() -> Self {
        Self {
            map_size: defaults::map_size(),
            max_turns: defaults::max_turns(),
            random_init: defaults::random_init(),
        }
    }
}

/// Planning loop settings
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct PlannerSettings {
    /// Which search drives the loop: "mcts" or "emcts"
    #[serde(default = "d_agent")]
    pub agent: String,
    /// Maximum planning calls (0 = until the game ends)
    #[serde(default = "d_max_runs")]
    pub max_runs: u32,
}

impl Default for PlannerSettings {
    fn default() -> Self {
        Self {
            agent: defaults::agent().into(),
            max_runs: defaults::max_runs(),
        }
    }
}

/// Search budget and UCT settings
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct SearchSettings {
    #[serde(default = "d_time_limit")]
    pub time_limit_secs: f64,
    #[serde(default = "d_exploration_weight")]
    pub exploration_weight: f64,
    #[serde(default = "d_rollout_depth")]
    pub rollout_depth: u32,
    /// Iteration cap per planning call (0 = none)
    #[serde(default = "d_max_iterations")]
    pub max_iterations: u64,
    /// Rollout RNG seed (0 = OS entropy)
    #[serde(default = "d_seed")]
    pub seed: u64,
}

impl SearchSettings {
    /// Time limit as a duration. Invalid values map to zero.
    pub fn time_limit(&self) -> Duration {
        Duration::try_from_secs_f64(self.time_limit_secs).unwrap_or(Duration::ZERO)
    }

    pub fn iteration_cap(&self) -> Option<u64> {
        (self.max_iterations > 0).then_some(self.max_iterations)
    }

    pub fn fixed_seed(&self) -> Option<u64> {
        (self.seed > 0).then_some(self.seed)
    }
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            time_limit_secs: defaults::time_limit_secs(),
            exploration_weight: defaults::exploration_weight(),
            rollout_depth: defaults::rollout_depth(),
            max_iterations: defaults::max_iterations(),
            seed: defaults::seed(),
        }
    }
}

/// Abstraction schedule and similarity tolerances
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ElasticSettings {
    #[serde(default = "d_alpha_abs")]
    pub alpha_abs: u64,
    #[serde(default = "d_batch_size")]
    pub batch_size: u64,
    #[serde(default = "d_eta_r")]
    pub eta_r: f64,
    #[serde(default = "d_eta_t")]
    pub eta_t: f64,
}

impl Default for ElasticSettings {
    fn default() -> Self {
        Self {
            alpha_abs: defaults::alpha_abs(),
            batch_size: defaults::batch_size(),
            eta_r: defaults::eta_r(),
            eta_t: defaults::eta_t(),
        }
    }
}

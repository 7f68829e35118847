//! Default configuration values loaded from config.defaults.toml.
//!
//! The defaults file is embedded at compile time so the binary and any
//! user-facing documentation share one source of truth.

use once_cell::sync::Lazy;
use serde::Deserialize;

/// The embedded defaults TOML file (loaded at compile time)
const DEFAULTS_TOML: &str = include_str!("../../../config.defaults.toml");

/// Parsed defaults structure (parsed once at first use)
static DEFAULTS: Lazy<DefaultsConfig> = Lazy::new(|| {
    toml::from_str(DEFAULTS_TOML).expect("config.defaults.toml should be valid TOML")
});

// ============================================================================
// Internal structs for parsing config.defaults.toml
// ============================================================================

#[derive(Debug, Deserialize)]
struct DefaultsConfig {
    common: CommonDefaults,
    game: GameDefaults,
    planner: PlannerDefaults,
    search: SearchDefaults,
    elastic: ElasticDefaults,
}

#[derive(Debug, Deserialize)]
struct CommonDefaults {
    log_level: String,
}

#[derive(Debug, Deserialize)]
struct GameDefaults {
    map_size: u32,
    max_turns: u32,
    random_init: bool,
}

#[derive(Debug, Deserialize)]
struct PlannerDefaults {
    agent: String,
    max_runs: u32,
}

#[derive(Debug, Deserialize)]
struct SearchDefaults {
    time_limit_secs: f64,
    exploration_weight: f64,
    rollout_depth: u32,
    max_iterations: u64,
    seed: u64,
}

#[derive(Debug, Deserialize)]
struct ElasticDefaults {
    alpha_abs: u64,
    batch_size: u64,
    eta_r: f64,
    eta_t: f64,
}

// ============================================================================
// Public accessor functions
// ============================================================================

// Common
pub fn log_level() -> &'static str {
    &DEFAULTS.common.log_level
}

// Game
pub fn map_size() -> u32 {
    DEFAULTS.game.map_size
}
pub fn max_turns() -> u32 {
    DEFAULTS.game.max_turns
}
pub fn random_init() -> bool {
    DEFAULTS.game.random_init
}

// Planner
pub fn agent() -> &'static str {
    &DEFAULTS.planner.agent
}
pub fn max_runs() -> u32 {
    DEFAULTS.planner.max_runs
}

// Search
pub fn time_limit_secs() -> f64 {
    DEFAULTS.search.time_limit_secs
}
pub fn exploration_weight() -> f64 {
    DEFAULTS.search.exploration_weight
}
pub fn rollout_depth() -> u32 {
    DEFAULTS.search.rollout_depth
}
pub fn max_iterations() -> u64 {
    DEFAULTS.search.max_iterations
}
pub fn seed() -> u64 {
    DEFAULTS.search.seed
}

// Elastic
pub fn alpha_abs() -> u64 {
    DEFAULTS.elastic.alpha_abs
}
pub fn batch_size() -> u64 {
    DEFAULTS.elastic.batch_size
}
pub fn eta_r() -> f64 {
    DEFAULTS.elastic.eta_r
}
pub fn eta_t() -> f64 {
    DEFAULTS.elastic.eta_t
}

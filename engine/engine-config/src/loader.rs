//! Configuration loading logic.
//!
//! Handles loading config from files and applying environment variable overrides.

use crate::EmctsConfig;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Environment variable naming an explicit config file
pub const CONFIG_ENV_VAR: &str = "EMCTS_CONFIG";

/// Standard locations to search for config.toml
pub const CONFIG_SEARCH_PATHS: &[&str] = &[
    "config.toml",    // Current directory
    "../config.toml", // Parent directory (when running from subdirectory)
];

/// Load the configuration from config.toml.
///
/// Searches for config.toml in the following order:
/// 1. Path specified by the EMCTS_CONFIG environment variable
/// 2. Current directory (config.toml)
/// 3. Parent directory (../config.toml)
///
/// After loading, environment variable overrides are applied.
pub fn load_config() -> EmctsConfig {
    // Check for explicit config path
    if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
        let path = PathBuf::from(&path);
        if path.exists() {
            info!("Loading config from {}: {}", CONFIG_ENV_VAR, path.display());
            return load_from_path(&path);
        }
        warn!(
            "{}={} not found, searching defaults",
            CONFIG_ENV_VAR,
            path.display()
        );
    }

    for path_str in CONFIG_SEARCH_PATHS {
        let path = PathBuf::from(path_str);
        if path.exists() {
            info!("Loading config from {}", path.display());
            return load_from_path(&path);
        }
    }

    debug!("No config.toml found, using built-in defaults");
    apply_env_overrides(EmctsConfig::default())
}

/// Load configuration from a specific path.
///
/// A missing or malformed file falls back to the built-in defaults with a
/// warning; environment overrides apply either way.
pub fn load_from_path(path: &Path) -> EmctsConfig {
    match std::fs::read_to_string(path) {
        Ok(content) => match toml::from_str(&content) {
            Ok(config) => apply_env_overrides(config),
            Err(e) => {
                warn!("Failed to parse {}: {}, using defaults", path.display(), e);
                apply_env_overrides(EmctsConfig::default())
            }
        },
        Err(e) => {
            warn!("Failed to read {}: {}, using defaults", path.display(), e);
            apply_env_overrides(EmctsConfig::default())
        }
    }
}

/// Macro to reduce env override boilerplate
macro_rules! env_override {
    // String field
    ($config:expr, $section:ident . $field:ident, $key:expr) => {
        if let Ok(v) = std::env::var($key) {
            $config.$section.$field = v;
        }
    };
    // Parseable field (u32, u64, f64, bool)
    ($config:expr, $section:ident . $field:ident, $key:expr, parse) => {
        match std::env::var($key).map(|s| s.parse()) {
            Ok(Ok(v)) => $config.$section.$field = v,
            Ok(Err(_)) => warn!("Ignoring unparseable {}", $key),
            Err(_) => {}
        }
    };
}

/// Apply environment variable overrides to a configuration.
///
/// Environment variables follow the pattern: EMCTS_<SECTION>_<KEY>
pub fn apply_env_overrides(mut config: EmctsConfig) -> EmctsConfig {
    // Common
    env_override!(config, common.log_level, "EMCTS_COMMON_LOG_LEVEL");

    // Game
    env_override!(config, game.map_size, "EMCTS_GAME_MAP_SIZE", parse);
    env_override!(config, game.max_turns, "EMCTS_GAME_MAX_TURNS", parse);
    env_override!(config, game.random_init, "EMCTS_GAME_RANDOM_INIT", parse);

    // Planner
    env_override!(config, planner.agent, "EMCTS_PLANNER_AGENT");
    env_override!(config, planner.max_runs, "EMCTS_PLANNER_MAX_RUNS", parse);

    // Search
    env_override!(
        config,
        search.time_limit_secs,
        "EMCTS_SEARCH_TIME_LIMIT_SECS",
        parse
    );
    env_override!(
        config,
        search.exploration_weight,
        "EMCTS_SEARCH_EXPLORATION_WEIGHT",
        parse
    );
    env_override!(
        config,
        search.rollout_depth,
        "EMCTS_SEARCH_ROLLOUT_DEPTH",
        parse
    );
    env_override!(
        config,
        search.max_iterations,
        "EMCTS_SEARCH_MAX_ITERATIONS",
        parse
    );
    env_override!(config, search.seed, "EMCTS_SEARCH_SEED", parse);

    // Elastic
    env_override!(config, elastic.alpha_abs, "EMCTS_ELASTIC_ALPHA_ABS", parse);
    env_override!(
        config,
        elastic.batch_size,
        "EMCTS_ELASTIC_BATCH_SIZE",
        parse
    );
    env_override!(config, elastic.eta_r, "EMCTS_ELASTIC_ETA_R", parse);
    env_override!(config, elastic.eta_t, "EMCTS_ELASTIC_ETA_T", parse);

    config
}

//! Tests for the configuration module.

use super::*;
use once_cell::sync::Lazy;
use std::sync::Mutex;
use tempfile::tempdir;

/// Serialises tests that touch process environment variables.
static ENV_LOCK: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));

#[test]
fn test_default_config() {
    let config = EmctsConfig::default();
    assert_eq!(config.common.log_level, "info");
    assert_eq!(config.game.map_size, 20);
    assert_eq!(config.game.max_turns, 100);
    assert!(!config.game.random_init);
    assert_eq!(config.planner.agent, "emcts");
    assert_eq!(config.planner.max_runs, 0);
}

#[test]
fn test_search_defaults() {
    let config = EmctsConfig::default();
    assert!((config.search.time_limit_secs - 0.1).abs() < f64::EPSILON);
    assert!((config.search.exploration_weight - 1.4).abs() < f64::EPSILON);
    assert_eq!(config.search.rollout_depth, 5);
    assert_eq!(config.search.iteration_cap(), None);
    assert_eq!(config.search.fixed_seed(), None);
    assert_eq!(
        config.search.time_limit(),
        std::time::Duration::from_millis(100)
    );
}

#[test]
fn test_elastic_defaults() {
    let config = EmctsConfig::default();
    assert_eq!(config.elastic.alpha_abs, 100);
    assert_eq!(config.elastic.batch_size, 10);
    assert!((config.elastic.eta_r - 5.0).abs() < f64::EPSILON);
    assert!((config.elastic.eta_t - 5.0).abs() < f64::EPSILON);
}

#[test]
fn test_search_helpers() {
    let search = SearchSettings {
        time_limit_secs: -1.0,
        max_iterations: 250,
        seed: 9,
        ..SearchSettings::default()
    };
    assert_eq!(search.time_limit(), std::time::Duration::ZERO);
    assert_eq!(search.iteration_cap(), Some(250));
    assert_eq!(search.fixed_seed(), Some(9));
}

#[test]
fn test_env_overrides() {
    let _guard = ENV_LOCK.lock().unwrap();
    std::env::set_var("EMCTS_ELASTIC_ETA_R", "2.5");
    std::env::set_var("EMCTS_SEARCH_MAX_ITERATIONS", "300");
    std::env::set_var("EMCTS_GAME_RANDOM_INIT", "true");
    std::env::set_var("EMCTS_PLANNER_AGENT", "mcts");

    let config = load_config();
    assert!((config.elastic.eta_r - 2.5).abs() < f64::EPSILON);
    assert_eq!(config.search.max_iterations, 300);
    assert!(config.game.random_init);
    assert_eq!(config.planner.agent, "mcts");

    std::env::remove_var("EMCTS_ELASTIC_ETA_R");
    std::env::remove_var("EMCTS_SEARCH_MAX_ITERATIONS");
    std::env::remove_var("EMCTS_GAME_RANDOM_INIT");
    std::env::remove_var("EMCTS_PLANNER_AGENT");
}

#[test]
fn test_unparseable_env_override_is_ignored() {
    let _guard = ENV_LOCK.lock().unwrap();
    std::env::set_var("EMCTS_ELASTIC_BATCH_SIZE", "lots");

    let config = apply_env_overrides(EmctsConfig::default());
    assert_eq!(config.elastic.batch_size, 10);

    std::env::remove_var("EMCTS_ELASTIC_BATCH_SIZE");
}

#[test]
fn test_config_env_var_path() {
    let _guard = ENV_LOCK.lock().unwrap();
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "[elastic]\nbatch_size = 4\n").unwrap();
    std::env::set_var(CONFIG_ENV_VAR, &path);

    let config = load_config();
    assert_eq!(config.elastic.batch_size, 4);
    assert_eq!(config.elastic.alpha_abs, 100); // Default

    std::env::remove_var(CONFIG_ENV_VAR);
}

#[test]
fn test_load_from_missing_path_uses_defaults() {
    let _guard = ENV_LOCK.lock().unwrap();
    let config = load_from_path(std::path::Path::new("/nonexistent/emcts/config.toml"));
    assert_eq!(config.game.map_size, 20);
}

#[test]
fn test_parse_config_toml() {
    let toml_content = r#"
[common]
log_level = "debug"

[game]
map_size = 12
random_init = true

[search]
time_limit_secs = 0.5
seed = 42

[elastic]
eta_r = 1.0
eta_t = 2.0
"#;
    let config: EmctsConfig = toml::from_str(toml_content).unwrap();
    assert_eq!(config.common.log_level, "debug");
    assert_eq!(config.game.map_size, 12);
    assert!(config.game.random_init);
    assert!((config.search.time_limit_secs - 0.5).abs() < f64::EPSILON);
    assert_eq!(config.search.fixed_seed(), Some(42));
    assert!((config.elastic.eta_r - 1.0).abs() < f64::EPSILON);
    assert!((config.elastic.eta_t - 2.0).abs() < f64::EPSILON);
}

#[test]
fn test_partial_config() {
    let toml_content = r#"
[planner]
agent = "mcts"
"#;
    let config: EmctsConfig = toml::from_str(toml_content).unwrap();
    assert_eq!(config.planner.agent, "mcts");
    assert_eq!(config.planner.max_runs, 0); // Default
    assert_eq!(config.game.max_turns, 100); // Default
    assert_eq!(config.elastic.batch_size, 10); // Default
}

#[test]
fn test_config_clone() {
    let config = EmctsConfig::default();
    let cloned = config.clone();
    assert_eq!(config.planner.agent, cloned.planner.agent);
    assert_eq!(config.search.rollout_depth, cloned.search.rollout_depth);
}

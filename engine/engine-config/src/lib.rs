//! Layered configuration for the EMCTS planner.
//!
//! This crate provides the configuration structs and loading logic used by
//! the `planner` binary.
//!
//! # Configuration Priority
//!
//! Settings are loaded with the following priority (highest to lowest):
//! 1. Environment variables (`EMCTS_<SECTION>_<KEY>`)
//! 2. config.toml file
//! 3. Built-in defaults (config.defaults.toml, embedded at compile time)
//!
//! # Environment Variable Override Pattern
//!
//! ```text
//! EMCTS_<SECTION>_<KEY>=value
//!
//! Examples:
//!     EMCTS_COMMON_LOG_LEVEL=debug
//!     EMCTS_GAME_RANDOM_INIT=true
//!     EMCTS_SEARCH_TIME_LIMIT_SECS=0.5
//!     EMCTS_ELASTIC_ETA_R=2.5
//! ```

mod defaults;
mod loader;
mod structs;

pub use defaults::*;
pub use loader::{
    apply_env_overrides, load_config, load_from_path, CONFIG_ENV_VAR, CONFIG_SEARCH_PATHS,
};
pub use structs::*;

#[cfg(test)]
mod tests;

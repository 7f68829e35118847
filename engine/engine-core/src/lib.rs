//! Core traits and types for the planning engine
//!
//! This crate provides the abstractions every game must offer to be searched:
//! - `ForwardModel`: deterministic, pure simulation of a single agent's actions
//! - `ModelError`: errors raised when a model is driven outside its contract
//! - `game_utils`: small geometric helpers shared by games and similarity metrics

pub mod game_utils;
pub mod typed;

// Re-export main types for convenience
pub use game_utils::euclidean_distance;
pub use typed::{ForwardModel, ModelError, Position};

//! Elastic Monte Carlo Tree Search over a deterministic forward model.
//!
//! This crate provides a model-agnostic MCTS implementation that works with
//! any game implementing the `engine-core` [`ForwardModel`] trait, plus an
//! elastic variant that temporarily merges similar sibling nodes.
//!
//! # Overview
//!
//! Each search iteration consists of four phases:
//!
//! 1. **Selection**: Descend from the root with UCT while nodes are fully
//!    expanded
//! 2. **Expansion**: Add one child for the first untried legal action
//! 3. **Simulation**: Estimate the new node's value with a short random
//!    rollout scored by the model's reward
//! 4. **Backpropagation**: Add the reward to every node on the path back to
//!    the root
//!
//! [`ElasticSearch`] additionally runs an abstraction pass every
//! `batch_size` iterations. The pass groups same-parent siblings whose
//! rewards and positions lie within tolerance and merges each pair into a
//! composite node. Merges are undone once `alpha_abs` iterations have run,
//! and always before the plan is read.
//!
//! # Usage
//!
//! ```rust,ignore
//! use games_skirmish::Skirmish;
//! use mcts::{rng_from_seed, ElasticConfig, ElasticSearch, SearchConfig};
//!
//! let game = Skirmish::default();
//! let config = SearchConfig::default().with_seed(42);
//! let mut rng = rng_from_seed(config.seed);
//!
//! let mut search = ElasticSearch::with_rollouts(
//!     &game,
//!     config,
//!     ElasticConfig::default(),
//!     game.initial_state(),
//! );
//! let plan = search.run(&mut rng).unwrap();
//!
//! println!("Actions: {:?}", plan.actions);
//! println!("Iterations: {}", plan.iterations);
//! ```
//!
//! # Configuration
//!
//! [`SearchConfig`] controls the plain search:
//!
//! - `time_limit`: Wall-clock budget per planning call (default: 100ms)
//! - `exploration_weight`: UCT exploration constant (default: 1.4)
//! - `rollout_depth`: Maximum random actions per rollout (default: 5)
//! - `max_iterations`: Optional iteration cap for reproducible runs
//!
//! [`ElasticConfig`] controls abstraction:
//!
//! - `alpha_abs`: Iterations after which merges are reverted for good (default: 100)
//! - `batch_size`: Iterations between grouping passes (default: 10)
//! - `eta_r`, `eta_t`: Reward and transition tolerances (default: 5.0)

pub mod abstraction;
pub mod config;
pub mod elastic;
pub mod evaluator;
pub mod node;
pub mod search;
pub mod similarity;
pub mod tree;

#[cfg(test)]
mod test_utils;

pub use engine_core::ForwardModel;

// Re-export main types
pub use abstraction::{AbstractionEngine, AbstractionState, Candidate};
pub use config::{ElasticConfig, SearchConfig};
pub use elastic::{run_emcts, AbstractionPhase, ElasticSearch};
pub use evaluator::{Evaluator, HeuristicEvaluator, RolloutEvaluator};
pub use node::{MergeRecord, MergeState, NodeId, SearchNode};
pub use search::{rng_from_seed, run_mcts, MctsSearch, Plan, SearchError};
pub use similarity::{PositionDistance, SimilarityOracle, TransitionMetric};
pub use tree::{SearchTree, TreeError, TreeStats};

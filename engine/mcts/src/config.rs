//! Search configuration parameters.

use std::time::Duration;

/// Configuration shared by the plain and elastic searches.
#[derive(Debug, Clone)]
pub struct SearchConfig {
    /// Wall-clock budget for one planning call.
    pub time_limit: Duration,

    /// Exploration constant `c` in the UCT formula.
    /// The final greedy descent always uses 0.
    pub exploration_weight: f64,

    /// Maximum number of random actions per rollout.
    pub rollout_depth: u32,

    /// Optional cap on iterations, checked alongside the time limit.
    /// Makes runs reproducible regardless of machine speed.
    pub max_iterations: Option<u64>,

    /// Seed for the rollout RNG. `None` draws from OS entropy.
    pub seed: Option<u64>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            time_limit: Duration::from_millis(100),
            exploration_weight: 1.4,
            rollout_depth: 5,
            max_iterations: None,
            seed: None,
        }
    }
}

impl SearchConfig {
    /// Create a deterministic config for testing.
    /// The time limit is generous so the iteration cap always binds.
    pub fn for_testing() -> Self {
        Self {
            time_limit: Duration::from_secs(60),
            exploration_weight: 1.4,
            rollout_depth: 5,
            max_iterations: Some(200),
            seed: Some(42),
        }
    }

    /// Builder pattern: set the time limit.
    pub fn with_time_limit(mut self, limit: Duration) -> Self {
        self.time_limit = limit;
        self
    }

    /// Builder pattern: set the UCT exploration constant.
    pub fn with_exploration_weight(mut self, c: f64) -> Self {
        self.exploration_weight = c;
        self
    }

    pub fn with_rollout_depth(mut self, depth: u32) -> Self {
        self.rollout_depth = depth;
        self
    }

    /// Builder pattern: cap the number of iterations.
    pub fn with_max_iterations(mut self, n: u64) -> Self {
        self.max_iterations = Some(n);
        self
    }

    /// Builder pattern: seed the rollout RNG.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}

/// Parameters controlling the elastic abstraction schedule.
#[derive(Debug, Clone)]
pub struct ElasticConfig {
    /// Iteration count after which grouping stops and the tree is reverted.
    pub alpha_abs: u64,

    /// Grouping runs every `batch_size` iterations.
    pub batch_size: u64,

    /// Reward tolerance for similarity.
    pub eta_r: f64,

    /// Transition tolerance for similarity.
    pub eta_t: f64,
}

impl Default for ElasticConfig {
    fn default() -> Self {
        Self {
            alpha_abs: 100,
            batch_size: 10,
            eta_r: 5.0,
            eta_t: 5.0,
        }
    }
}

impl ElasticConfig {
    /// Tolerances no pair of nodes can meet, so grouping never merges.
    pub fn never_merge() -> Self {
        Self {
            eta_r: -1.0,
            eta_t: -1.0,
            ..Self::default()
        }
    }

    pub fn with_alpha_abs(mut self, alpha_abs: u64) -> Self {
        self.alpha_abs = alpha_abs;
        self
    }

    /// Builder pattern: set the grouping interval.
    pub fn with_batch_size(mut self, batch_size: u64) -> Self {
        self.batch_size = batch_size;
        self
    }

    /// Builder pattern: set both similarity tolerances.
    pub fn with_tolerances(mut self, eta_r: f64, eta_t: f64) -> Self {
        self.eta_r = eta_r;
        self.eta_t = eta_t;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SearchConfig::default();
        assert_eq!(config.time_limit, Duration::from_millis(100));
        assert!((config.exploration_weight - 1.4).abs() < 1e-12);
        assert_eq!(config.rollout_depth, 5);
        assert!(config.max_iterations.is_none());
        assert!(config.seed.is_none());
    }

    #[test]
    fn test_builder_pattern() {
        let config = SearchConfig::default()
            .with_max_iterations(30)
            .with_seed(7)
            .with_exploration_weight(0.5);

        assert_eq!(config.max_iterations, Some(30));
        assert_eq!(config.seed, Some(7));
        assert!((config.exploration_weight - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_elastic_defaults() {
        let config = ElasticConfig::default();
        assert_eq!(config.alpha_abs, 100);
        assert_eq!(config.batch_size, 10);
        assert!((config.eta_r - 5.0).abs() < 1e-12);
        assert!((config.eta_t - 5.0).abs() < 1e-12);
    }

    #[test]
    fn test_never_merge_keeps_schedule() {
        let config = ElasticConfig::never_merge().with_batch_size(3);
        assert_eq!(config.batch_size, 3);
        assert_eq!(config.alpha_abs, 100);
        assert!(config.eta_r < 0.0 && config.eta_t < 0.0);
    }
}

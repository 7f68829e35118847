//! Approximate state equivalence.
//!
//! Two states are similar when their rewards differ by at most `eta_r` and
//! their transition divergence is at most `eta_t`. Transition divergence is
//! pluggable; the default compares the acting agent's positions.

use engine_core::{euclidean_distance, ForwardModel};

use crate::config::ElasticConfig;

/// Distance between the dynamics of two states.
pub trait TransitionMetric<M: ForwardModel> {
    fn divergence(&self, model: &M, a: &M::State, b: &M::State) -> f64;
}

/// Euclidean distance between the agent positions of two states.
#[derive(Debug, Clone, Copy, Default)]
pub struct PositionDistance;

impl<M: ForwardModel> TransitionMetric<M> for PositionDistance {
    fn divergence(&self, model: &M, a: &M::State, b: &M::State) -> f64 {
        euclidean_distance(model.position(a), model.position(b))
    }
}

/// Decides whether two states may share a tree node.
///
/// Both comparisons are inclusive, so identical states are always similar
/// for non-negative tolerances. Negative tolerances match nothing.
#[derive(Debug, Clone)]
pub struct SimilarityOracle<D = PositionDistance> {
    pub eta_r: f64,
    pub eta_t: f64,
    metric: D,
}

impl SimilarityOracle<PositionDistance> {
    pub fn new(eta_r: f64, eta_t: f64) -> Self {
        Self::with_metric(eta_r, eta_t, PositionDistance)
    }

    pub fn from_config(config: &ElasticConfig) -> Self {
        Self::new(config.eta_r, config.eta_t)
    }
}

impl<D> SimilarityOracle<D> {
    /// Create an oracle with a custom transition metric.
    pub fn with_metric(eta_r: f64, eta_t: f64, metric: D) -> Self {
        Self {
            eta_r,
            eta_t,
            metric,
        }
    }

    /// Absolute reward difference.
    pub fn reward_error<M: ForwardModel>(&self, model: &M, a: &M::State, b: &M::State) -> f64 {
        (model.reward(a) - model.reward(b)).abs()
    }

    pub fn transition_error<M>(&self, model: &M, a: &M::State, b: &M::State) -> f64
    where
        M: ForwardModel,
        D: TransitionMetric<M>,
    {
        self.metric.divergence(model, a, b)
    }

    pub fn is_similar<M>(&self, model: &M, a: &M::State, b: &M::State) -> bool
    where
        M: ForwardModel,
        D: TransitionMetric<M>,
    {
        self.reward_error(model, a, b) <= self.eta_r
            && self.transition_error(model, a, b) <= self.eta_t
    }
}

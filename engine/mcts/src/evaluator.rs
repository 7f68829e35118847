//! Leaf evaluation.
//!
//! An evaluator scores the state of a freshly expanded node. The default
//! is a short random rollout; a heuristic evaluator that scores the state
//! directly is provided for cheap, deterministic searches.

use engine_core::{ForwardModel, ModelError};
use rand::seq::SliceRandom;
use rand_chacha::ChaCha20Rng;

/// Trait for leaf evaluators.
///
/// Implementations could be:
/// - RolloutEvaluator: Random actions for a bounded number of steps
/// - HeuristicEvaluator: The model's reward of the state itself
pub trait Evaluator<M: ForwardModel> {
    /// Estimate the value of `state`. Any randomness must come from `rng`
    /// so seeded searches stay reproducible.
    fn evaluate(
        &self,
        model: &M,
        state: &M::State,
        rng: &mut ChaCha20Rng,
    ) -> Result<f64, ModelError>;
}

/// Random rollout evaluator.
///
/// Plays uniformly random legal actions until the state is terminal or
/// `max_depth` actions have been taken, then returns the model's reward of
/// the reached state.
#[derive(Debug, Clone)]
pub struct RolloutEvaluator {
    /// Maximum rollout depth
    pub max_depth: u32,
}

impl Default for RolloutEvaluator {
    fn default() -> Self {
        Self { max_depth: 5 }
    }
}

impl RolloutEvaluator {
    pub fn new(max_depth: u32) -> Self {
        Self { max_depth }
    }
}

impl<M: ForwardModel> Evaluator<M> for RolloutEvaluator {
    fn evaluate(
        &self,
        model: &M,
        state: &M::State,
        rng: &mut ChaCha20Rng,
    ) -> Result<f64, ModelError> {
        let mut current = state.clone();

        for _ in 0..self.max_depth {
            if model.is_terminal(&current) {
                break;
            }
            let actions = model.legal_actions(&current);
            let Some(&action) = actions.choose(rng) else {
                break;
            };
            current = model.apply(&current, action)?;
        }

        Ok(model.reward(&current))
    }
}

/// Scores a state by its reward without simulating further.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeuristicEvaluator;

impl<M: ForwardModel> Evaluator<M> for HeuristicEvaluator {
    fn evaluate(
        &self,
        model: &M,
        state: &M::State,
        _rng: &mut ChaCha20Rng,
    ) -> Result<f64, ModelError> {
        Ok(model.reward(state))
    }
}

//! Elastic MCTS: plain search with periodic sibling grouping.
//!
//! Every `batch_size` iterations the abstraction engine merges similar
//! siblings, which shrinks the branching factor the search has to cover.
//! Once more than `alpha_abs` iterations have run, all merges are undone
//! and grouping stops for the rest of the run. The tree is always reverted
//! again before the plan is read, so reported actions are never ambiguous.

use std::time::Instant;

use engine_core::ForwardModel;
use rand_chacha::ChaCha20Rng;
use tracing::debug;

use crate::abstraction::AbstractionEngine;
use crate::config::{ElasticConfig, SearchConfig};
use crate::evaluator::{Evaluator, RolloutEvaluator};
use crate::node::NodeId;
use crate::search::{MctsSearch, Plan, SearchError};
use crate::similarity::{PositionDistance, TransitionMetric};
use crate::tree::SearchTree;

/// Where a run is in its abstraction schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AbstractionPhase {
    /// Grouping every batch
    Grouping,
    /// Past `alpha_abs`; the tree stays exact
    Expired,
}

/// Elastic search state.
pub struct ElasticSearch<'a, M, E, D = PositionDistance>
where
    M: ForwardModel,
    E: Evaluator<M>,
{
    search: MctsSearch<'a, M, E>,
    engine: AbstractionEngine<D>,
    config: ElasticConfig,
    phase: AbstractionPhase,
}

impl<'a, M: ForwardModel> ElasticSearch<'a, M, RolloutEvaluator> {
    /// Elastic search with random rollouts and the position-distance oracle.
    pub fn with_rollouts(
        model: &'a M,
        search_config: SearchConfig,
        elastic_config: ElasticConfig,
        root_state: M::State,
    ) -> Self {
        let search = MctsSearch::with_rollouts(model, search_config, root_state);
        let engine = AbstractionEngine::from_config(&elastic_config);
        Self::from_parts(search, engine, elastic_config)
    }
}

impl<'a, M, E, D> ElasticSearch<'a, M, E, D>
where
    M: ForwardModel,
    E: Evaluator<M>,
    D: TransitionMetric<M>,
{
    /// Combine a plain search with an abstraction engine.
    pub fn from_parts(
        search: MctsSearch<'a, M, E>,
        engine: AbstractionEngine<D>,
        config: ElasticConfig,
    ) -> Self {
        Self {
            search,
            engine,
            config,
            phase: AbstractionPhase::Grouping,
        }
    }

    /// Run until the time limit or iteration cap is reached, revert every
    /// outstanding merge, then read off the greedy plan.
    pub fn run(&mut self, rng: &mut ChaCha20Rng) -> Result<Plan<M::Action>, SearchError> {
        let started = Instant::now();

        while self.search.within_budget(started) {
            self.iterate(rng)?;
        }

        self.engine.revert_abstraction(self.search.tree_mut());
        let plan = self.search.plan(started)?;

        debug!(
            iterations = plan.iterations,
            elapsed_ms = plan.elapsed.as_millis() as u64,
            live_nodes = plan.stats.live_nodes,
            merges = self.engine.total_merges(),
            reverts = self.engine.total_reverts(),
            plan_len = plan.len(),
            "EMCTS search complete"
        );
        Ok(plan)
    }

    /// Run one search iteration followed by any scheduled abstraction work.
    pub fn iterate(&mut self, rng: &mut ChaCha20Rng) -> Result<NodeId, SearchError> {
        let leaf = self.search.iterate(rng)?;

        if self.phase == AbstractionPhase::Grouping {
            let completed = self.search.iterations();
            let model = self.search.model();

            if self.config.batch_size > 0 && completed % self.config.batch_size == 0 {
                self.engine
                    .update_abstraction(model, self.search.tree_mut());
            }

            if completed > self.config.alpha_abs {
                let reverted = self.engine.revert_abstraction(self.search.tree_mut());
                self.phase = AbstractionPhase::Expired;
                debug!(
                    iteration = completed,
                    reverted, "Abstraction budget exhausted"
                );
            }
        }

        Ok(leaf)
    }

    pub fn phase(&self) -> AbstractionPhase {
        self.phase
    }

    pub fn engine(&self) -> &AbstractionEngine<D> {
        &self.engine
    }

    /// Get the search tree (for inspection/debugging).
    pub fn tree(&self) -> &SearchTree<M> {
        self.search.tree()
    }

    pub fn iterations(&self) -> u64 {
        self.search.iterations()
    }
}

/// Convenience function to run a single elastic search with rollouts.
pub fn run_emcts<M: ForwardModel>(
    model: &M,
    search_config: SearchConfig,
    elastic_config: ElasticConfig,
    root_state: M::State,
    rng: &mut ChaCha20Rng,
) -> Result<Plan<M::Action>, SearchError> {
    ElasticSearch::with_rollouts(model, search_config, elastic_config, root_state).run(rng)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evaluator::HeuristicEvaluator;
    use crate::search::rng_from_seed;
    use crate::similarity::SimilarityOracle;
    use crate::test_utils::Walk;

    fn elastic(
        model: &Walk,
        search: SearchConfig,
        elastic: ElasticConfig,
    ) -> ElasticSearch<'_, Walk, HeuristicEvaluator> {
        let engine = AbstractionEngine::new(SimilarityOracle::from_config(&elastic));
        ElasticSearch::from_parts(
            MctsSearch::new(model, HeuristicEvaluator, search, model.start()),
            engine,
            elastic,
        )
    }

    #[test]
    fn test_grouping_runs_every_batch() {
        let model = Walk::new(8);
        let config = ElasticConfig::default()
            .with_batch_size(5)
            .with_alpha_abs(1_000)
            .with_tolerances(100.0, 100.0);
        let mut search = elastic(&model, SearchConfig::for_testing(), config);
        let mut rng = rng_from_seed(Some(1));

        for _ in 0..4 {
            search.iterate(&mut rng).unwrap();
        }
        assert_eq!(search.engine().total_merges(), 0);

        // Fifth iteration: root has four children by now, grouping pairs them
        search.iterate(&mut rng).unwrap();
        assert!(search.engine().total_merges() > 0);
        assert!(search.tree().stats().composite_nodes > 0);
        assert_eq!(search.phase(), AbstractionPhase::Grouping);
    }

    #[test]
    fn test_alpha_abs_reverts_and_stops_grouping() {
        let model = Walk::new(8);
        let config = ElasticConfig::default()
            .with_batch_size(2)
            .with_alpha_abs(10)
            .with_tolerances(100.0, 100.0);
        let mut search = elastic(&model, SearchConfig::for_testing(), config);
        let mut rng = rng_from_seed(Some(1));

        for _ in 0..10 {
            search.iterate(&mut rng).unwrap();
        }
        assert_eq!(search.phase(), AbstractionPhase::Grouping);

        search.iterate(&mut rng).unwrap();
        assert_eq!(search.phase(), AbstractionPhase::Expired);
        assert!(search.tree().composite_nodes().is_empty());

        let merges = search.engine().total_merges();
        for _ in 0..10 {
            search.iterate(&mut rng).unwrap();
        }
        assert_eq!(search.engine().total_merges(), merges);
        assert!(search.tree().composite_nodes().is_empty());
    }

    #[test]
    fn test_run_returns_exact_tree() {
        let model = Walk::new(6);
        let config = ElasticConfig::default()
            .with_batch_size(3)
            .with_alpha_abs(10_000)
            .with_tolerances(100.0, 100.0);
        let mut search = elastic(&model, SearchConfig::for_testing().with_max_iterations(90), config);
        let mut rng = rng_from_seed(Some(2));

        let plan = search.run(&mut rng).unwrap();

        assert_eq!(plan.iterations, 90);
        assert_eq!(plan.stats.composite_nodes, 0);
        assert!(search.tree().composite_nodes().is_empty());
        assert_eq!(search.tree().pending_merges(), 0);
        assert!(search.engine().total_merges() > 0);
        assert_eq!(search.engine().total_merges(), search.engine().total_reverts());
        for &action in &plan.actions {
            assert!(crate::test_utils::Step::ALL.contains(&action));
        }
    }

    #[test]
    fn test_zero_batch_size_never_groups() {
        let model = Walk::new(6);
        let config = ElasticConfig::default()
            .with_batch_size(0)
            .with_tolerances(100.0, 100.0);
        let mut search = elastic(&model, SearchConfig::for_testing().with_max_iterations(40), config);
        let mut rng = rng_from_seed(Some(3));

        search.run(&mut rng).unwrap();
        assert_eq!(search.engine().total_merges(), 0);
    }
}

//! MCTS search implementation.
//!
//! Implements the core MCTS algorithm:
//! 1. Selection: Descend with UCT while nodes are fully expanded
//! 2. Expansion: Materialize the first untried legal action
//! 3. Simulation: Score the new node with the evaluator
//! 4. Backpropagation: Update statistics along the path to the root

use std::time::{Duration, Instant};

use engine_core::{ForwardModel, ModelError};
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;
use thiserror::Error;
use tracing::{debug, trace};

use crate::config::SearchConfig;
use crate::evaluator::{Evaluator, RolloutEvaluator};
use crate::node::NodeId;
use crate::tree::{SearchTree, TreeError, TreeStats};

/// Errors that can occur during search.
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("Model error: {0}")]
    Model(#[from] ModelError),

    #[error("Tree error: {0}")]
    Tree(#[from] TreeError),
}

/// Result of a planning call.
#[derive(Debug, Clone)]
pub struct Plan<A> {
    /// Greedy action sequence from the root, one representative action per step
    pub actions: Vec<A>,

    /// Node the greedy descent ended on
    pub final_node: NodeId,

    /// Number of completed iterations
    pub iterations: u64,

    /// Wall-clock time spent searching
    pub elapsed: Duration,

    /// Tree shape at return time
    pub stats: TreeStats,
}

impl<A> Plan<A> {
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }
}

/// Build the rollout RNG for a run, seeded when a seed is configured.
pub fn rng_from_seed(seed: Option<u64>) -> ChaCha20Rng {
    match seed {
        Some(seed) => ChaCha20Rng::seed_from_u64(seed),
        None => ChaCha20Rng::from_entropy(),
    }
}

/// Plain MCTS search state.
pub struct MctsSearch<'a, M: ForwardModel, E: Evaluator<M>> {
    model: &'a M,
    evaluator: E,
    tree: SearchTree<M>,
    config: SearchConfig,
    iterations: u64,
}

impl<'a, M: ForwardModel> MctsSearch<'a, M, RolloutEvaluator> {
    /// Search with random rollouts of the configured depth.
    pub fn with_rollouts(model: &'a M, config: SearchConfig, root_state: M::State) -> Self {
        let evaluator = RolloutEvaluator::new(config.rollout_depth);
        Self::new(model, evaluator, config, root_state)
    }
}

impl<'a, M: ForwardModel, E: Evaluator<M>> MctsSearch<'a, M, E> {
    /// Create a new search rooted at `root_state`.
    pub fn new(model: &'a M, evaluator: E, config: SearchConfig, root_state: M::State) -> Self {
        let tree = SearchTree::new(model, root_state);
        Self {
            model,
            evaluator,
            tree,
            config,
            iterations: 0,
        }
    }

    /// Run until the time limit or iteration cap is reached, then read off
    /// the greedy plan.
    pub fn run(&mut self, rng: &mut ChaCha20Rng) -> Result<Plan<M::Action>, SearchError> {
        let started = Instant::now();

        while self.within_budget(started) {
            self.iterate(rng)?;
        }

        let plan = self.plan(started)?;
        debug!(
            iterations = plan.iterations,
            elapsed_ms = plan.elapsed.as_millis() as u64,
            live_nodes = plan.stats.live_nodes,
            plan_len = plan.len(),
            "MCTS search complete"
        );
        Ok(plan)
    }

    /// Run a single iteration (select -> expand -> simulate -> backpropagate).
    /// Returns the node the reward was propagated from.
    pub fn iterate(&mut self, rng: &mut ChaCha20Rng) -> Result<NodeId, SearchError> {
        let selected = self.select()?;
        let leaf = self.expand(selected)?;
        let reward = self.simulate(leaf, rng)?;
        let path_len = self.tree.backpropagate(leaf, reward);
        self.iterations += 1;

        trace!(
            iteration = self.iterations,
            leaf = leaf.0,
            path_len,
            reward,
            "MCTS simulation complete"
        );

        Ok(leaf)
    }

    /// Descend from the root via UCT while the current node is non-terminal
    /// and fully expanded.
    pub fn select(&self) -> Result<NodeId, SearchError> {
        let mut current = self.tree.root();

        loop {
            let node = self.tree.get(current);
            if node.is_terminal
                || node.children.is_empty()
                || !self.tree.is_fully_expanded(self.model, current)
            {
                return Ok(current);
            }
            current = self
                .tree
                .best_child(current, self.config.exploration_weight)?;
        }
    }

    /// Add a child for the first untried legal action.
    /// Terminal nodes are returned unchanged.
    pub fn expand(&mut self, id: NodeId) -> Result<NodeId, SearchError> {
        if self.tree.get(id).is_terminal {
            return Ok(id);
        }
        match self.tree.untried_actions(self.model, id).first() {
            Some(&action) => Ok(self.tree.add_child(self.model, id, action)?),
            None => Ok(id),
        }
    }

    /// Estimate the value of a node's state.
    pub fn simulate(&self, id: NodeId, rng: &mut ChaCha20Rng) -> Result<f64, SearchError> {
        let state = &self.tree.get(id).state;
        Ok(self.evaluator.evaluate(self.model, state, rng)?)
    }

    /// Follow zero-exploration UCT from the root until a childless node,
    /// collecting one representative action per step.
    pub fn best_action_sequence(&self) -> Result<(Vec<M::Action>, NodeId), SearchError> {
        let mut actions = Vec::new();
        let mut current = self.tree.root();

        while !self.tree.get(current).children.is_empty() {
            current = self.tree.best_child(current, 0.0)?;
            if let Some(action) = self.tree.get(current).representative_action() {
                actions.push(action);
            }
        }

        Ok((actions, current))
    }

    pub(crate) fn plan(&self, started: Instant) -> Result<Plan<M::Action>, SearchError> {
        let (actions, final_node) = self.best_action_sequence()?;
        Ok(Plan {
            actions,
            final_node,
            iterations: self.iterations,
            elapsed: started.elapsed(),
            stats: self.tree.stats(),
        })
    }

    /// Whether another iteration may start. Checked once per iteration.
    pub(crate) fn within_budget(&self, started: Instant) -> bool {
        if let Some(cap) = self.config.max_iterations {
            if self.iterations >= cap {
                return false;
            }
        }
        started.elapsed() < self.config.time_limit
    }

    pub(crate) fn model(&self) -> &'a M {
        self.model
    }

    pub(crate) fn tree_mut(&mut self) -> &mut SearchTree<M> {
        &mut self.tree
    }

    /// Get the search tree (for inspection/debugging).
    pub fn tree(&self) -> &SearchTree<M> {
        &self.tree
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Number of completed iterations.
    pub fn iterations(&self) -> u64 {
        self.iterations
    }
}

/// Convenience function to run a single plain search with rollouts.
pub fn run_mcts<M: ForwardModel>(
    model: &M,
    config: SearchConfig,
    root_state: M::State,
    rng: &mut ChaCha20Rng,
) -> Result<Plan<M::Action>, SearchError> {
    MctsSearch::with_rollouts(model, config, root_state).run(rng)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evaluator::HeuristicEvaluator;
    use crate::test_utils::{Step, Walk};

    fn heuristic_search(model: &Walk, config: SearchConfig) -> MctsSearch<'_, Walk, HeuristicEvaluator> {
        MctsSearch::new(model, HeuristicEvaluator, config, model.start())
    }

    #[test]
    fn test_single_iteration() {
        let model = Walk::new(3);
        let mut search = heuristic_search(&model, SearchConfig::for_testing());
        let mut rng = ChaCha20Rng::seed_from_u64(0);

        let leaf = search.iterate(&mut rng).unwrap();

        let tree = search.tree();
        let root = tree.get(tree.root());
        assert_eq!(root.visits, 1);
        assert_eq!(root.children, vec![leaf]);
        assert_eq!(tree.get(leaf).labels, vec![Step::North]);
        assert_eq!(tree.get(leaf).state.position, (0, 1));
        assert_eq!(tree.get(leaf).visits, 1);
        assert_eq!(search.iterations(), 1);
    }

    #[test]
    fn test_expansion_follows_legal_order() {
        let model = Walk::new(3);
        let mut search = heuristic_search(&model, SearchConfig::for_testing());
        let mut rng = ChaCha20Rng::seed_from_u64(0);

        for _ in 0..4 {
            // Root stays selected until every action has a child
            assert_eq!(search.select().unwrap(), search.tree().root());
            search.iterate(&mut rng).unwrap();
        }

        let tree = search.tree();
        let labels: Vec<Step> = tree
            .get(tree.root())
            .children
            .iter()
            .map(|&c| tree.get(c).labels[0])
            .collect();
        assert_eq!(labels, Step::ALL.to_vec());
        assert!(tree.is_fully_expanded(&model, tree.root()));
        assert_ne!(search.select().unwrap(), tree.root());
    }

    #[test]
    fn test_terminal_root_yields_empty_plan() {
        let model = Walk::new(0);
        let mut search = heuristic_search(&model, SearchConfig::for_testing().with_max_iterations(5));
        let mut rng = ChaCha20Rng::seed_from_u64(0);

        let plan = search.run(&mut rng).unwrap();

        assert!(plan.is_empty());
        assert_eq!(plan.final_node, search.tree().root());
        assert_eq!(plan.iterations, 5);
        assert_eq!(plan.stats.root_visits, 5);
        assert_eq!(plan.stats.live_nodes, 1);
    }

    #[test]
    fn test_iteration_cap() {
        let model = Walk::new(50);
        let mut search = heuristic_search(&model, SearchConfig::for_testing().with_max_iterations(37));
        let mut rng = ChaCha20Rng::seed_from_u64(0);

        let plan = search.run(&mut rng).unwrap();

        assert_eq!(plan.iterations, 37);
        assert_eq!(plan.stats.root_visits, 37);
        // Every iteration below the horizon adds exactly one node
        assert_eq!(plan.stats.live_nodes, 38);
    }

    #[test]
    fn test_time_limit_stops_search() {
        let model = Walk::new(50);
        let config = SearchConfig::default().with_time_limit(Duration::from_millis(20));
        let mut search = MctsSearch::with_rollouts(&model, config, model.start());
        let mut rng = ChaCha20Rng::seed_from_u64(0);

        let plan = search.run(&mut rng).unwrap();

        assert!(plan.iterations > 0);
        assert!(plan.elapsed >= Duration::from_millis(20));
    }

    #[test]
    fn test_plan_climbs_reward() {
        let model = Walk::new(3);
        let mut search = heuristic_search(&model, SearchConfig::for_testing().with_max_iterations(300));
        let mut rng = ChaCha20Rng::seed_from_u64(0);

        let plan = search.run(&mut rng).unwrap();

        assert!(!plan.is_empty());
        assert!(matches!(plan.actions[0], Step::North | Step::East));
        assert_eq!(search.tree().depth_of(plan.final_node), plan.len());
    }

    #[test]
    fn test_plan_replays_to_final_node() {
        let model = Walk::new(4);
        let mut rng = ChaCha20Rng::seed_from_u64(9);
        let mut search = MctsSearch::with_rollouts(
            &model,
            SearchConfig::for_testing().with_max_iterations(120),
            model.start(),
        );

        let plan = search.run(&mut rng).unwrap();
        let replayed = model.apply_sequence(&model.start(), &plan.actions).unwrap();

        assert_eq!(replayed, search.tree().get(plan.final_node).state);
    }

    #[test]
    fn test_seeded_runs_are_reproducible() {
        let model = Walk::new(6);
        let config = SearchConfig::for_testing().with_max_iterations(150);

        let mut rng1 = rng_from_seed(Some(5));
        let mut rng2 = rng_from_seed(Some(5));
        let a = run_mcts(&model, config.clone(), model.start(), &mut rng1).unwrap();
        let b = run_mcts(&model, config, model.start(), &mut rng2).unwrap();

        assert_eq!(a.actions, b.actions);
        assert_eq!(a.final_node, b.final_node);
        assert_eq!(a.stats, b.stats);
    }
}

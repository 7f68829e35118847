//! Depth-by-depth grouping of similar siblings and its inverse.
//!
//! A grouping pass walks the tree from its deepest level up to the root's
//! children. At each depth it pairs up siblings the [`SimilarityOracle`]
//! considers equivalent and merges each pair into one composite node. The
//! pairing is greedy: nodes are visited in breadth-first order and each
//! merges with its first still-available partner, at most once per pass.

use std::collections::{BTreeMap, HashSet};

use engine_core::ForwardModel;
use tracing::{debug, trace, warn};

use crate::config::ElasticConfig;
use crate::node::NodeId;
use crate::similarity::{PositionDistance, SimilarityOracle, TransitionMetric};
use crate::tree::SearchTree;

/// A node and the same-parent siblings it could merge with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub node: NodeId,
    pub partners: Vec<NodeId>,
}

/// Working set of one grouping pass, keyed by depth.
/// Rebuilt every pass and cleared once grouping completes.
#[derive(Debug, Default)]
pub struct AbstractionState {
    candidates: BTreeMap<usize, Vec<Candidate>>,
}

impl AbstractionState {
    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    pub fn clear(&mut self) {
        self.candidates.clear();
    }

    pub fn candidates_at(&self, depth: usize) -> &[Candidate] {
        self.candidates.get(&depth).map(Vec::as_slice).unwrap_or(&[])
    }
}

/// Grouping and reversion passes over a [`SearchTree`].
#[derive(Debug)]
pub struct AbstractionEngine<D = PositionDistance> {
    oracle: SimilarityOracle<D>,
    state: AbstractionState,
    merges: u64,
    reverts: u64,
}

impl AbstractionEngine<PositionDistance> {
    pub fn from_config(config: &ElasticConfig) -> Self {
        Self::new(SimilarityOracle::from_config(config))
    }
}

impl<D> AbstractionEngine<D> {
    pub fn new(oracle: SimilarityOracle<D>) -> Self {
        Self {
            oracle,
            state: AbstractionState::default(),
            merges: 0,
            reverts: 0,
        }
    }

    pub fn oracle(&self) -> &SimilarityOracle<D> {
        &self.oracle
    }

    /// Pending working set. Empty between passes.
    pub fn state(&self) -> &AbstractionState {
        &self.state
    }

    /// Merges performed over the engine's lifetime.
    pub fn total_merges(&self) -> u64 {
        self.merges
    }

    /// Composite nodes split over the engine's lifetime.
    pub fn total_reverts(&self) -> u64 {
        self.reverts
    }

    /// Run one grouping pass, deepest level first.
    /// Returns the number of merges performed.
    pub fn update_abstraction<M>(&mut self, model: &M, tree: &mut SearchTree<M>) -> usize
    where
        M: ForwardModel,
        D: TransitionMetric<M>,
    {
        let max_depth = tree.max_depth();
        let live_before = tree.live_nodes().len();
        let mut merged = 0;

        for depth in (1..=max_depth).rev() {
            let candidates = self.collect_candidates(model, tree, depth);
            self.state.candidates.insert(depth, candidates);
            let at_depth = self.group(tree, depth);
            if at_depth > 0 {
                trace!(depth, merges = at_depth, "Grouped siblings");
            }
            merged += at_depth;
        }

        self.state.clear();
        self.merges += merged as u64;

        debug!(
            max_depth,
            merges = merged,
            live_before,
            live_after = tree.live_nodes().len(),
            pending = tree.pending_merges(),
            "Abstraction pass complete"
        );

        merged
    }

    /// Split every composite node back into its original pair.
    /// Returns the number of nodes split.
    pub fn revert_abstraction<M: ForwardModel>(&mut self, tree: &mut SearchTree<M>) -> usize {
        let reverted = tree.unmerge_all();
        self.reverts += reverted as u64;

        if reverted > 0 {
            debug!(
                reverted,
                live_nodes = tree.live_nodes().len(),
                "Abstraction reverted"
            );
        }

        reverted
    }

    /// Pair up plain same-parent siblings at `depth` that the oracle
    /// considers similar.
    fn collect_candidates<M>(&self, model: &M, tree: &SearchTree<M>, depth: usize) -> Vec<Candidate>
    where
        M: ForwardModel,
        D: TransitionMetric<M>,
    {
        let nodes: Vec<NodeId> = tree
            .nodes_at_depth(depth)
            .into_iter()
            .filter(|&id| !tree.get(id).is_composite())
            .collect();

        let mut candidates: Vec<Candidate> = nodes
            .iter()
            .map(|&node| Candidate {
                node,
                partners: Vec::new(),
            })
            .collect();

        for i in 0..nodes.len() {
            let a = tree.get(nodes[i]);
            for j in (i + 1)..nodes.len() {
                let b = tree.get(nodes[j]);
                if a.parent != b.parent {
                    continue;
                }
                if self.oracle.is_similar(model, &a.state, &b.state) {
                    candidates[i].partners.push(nodes[j]);
                    candidates[j].partners.push(nodes[i]);
                }
            }
        }

        candidates
    }

    /// Greedily merge the candidates recorded for `depth`.
    fn group<M: ForwardModel>(&self, tree: &mut SearchTree<M>, depth: usize) -> usize {
        let mut consumed: HashSet<NodeId> = HashSet::new();
        let mut merged = 0;

        for candidate in self.state.candidates_at(depth) {
            if consumed.contains(&candidate.node) {
                continue;
            }
            let Some(&partner) = candidate.partners.iter().find(|p| !consumed.contains(*p)) else {
                continue;
            };

            match tree.merge(candidate.node, partner) {
                Ok(()) => {
                    consumed.insert(candidate.node);
                    consumed.insert(partner);
                    merged += 1;
                }
                Err(err) => {
                    debug_assert!(false, "grouping produced an illegal merge: {err}");
                    warn!(error = %err, "Skipping illegal merge");
                }
            }
        }

        merged
    }
}

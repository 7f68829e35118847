//! Search tree with arena allocation and reversible sibling merging.
//!
//! Nodes live in a contiguous Vec and are referenced by [`NodeId`]
//! indices. Merging never frees arena slots: an absorbed node is only
//! detached from its parent, so every merge can be undone exactly.

use std::fmt::Write as _;

use engine_core::{ForwardModel, ModelError};
use thiserror::Error;

use crate::node::{MergeRecord, MergeState, NodeId, SearchNode};

/// Node type stored in a tree for model `M`.
pub type NodeOf<M> = SearchNode<<M as ForwardModel>::State, <M as ForwardModel>::Action>;

/// Structural errors raised by tree operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TreeError {
    #[error("Cannot merge node {absorb:?} into {keep:?}: {reason}")]
    IllegalMerge {
        keep: NodeId,
        absorb: NodeId,
        reason: &'static str,
    },

    #[error("Node {0:?} has no children")]
    NoChildren(NodeId),
}

/// Summary statistics about a search tree.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TreeStats {
    /// Nodes reachable from the root
    pub live_nodes: usize,
    /// All nodes ever allocated, detached ones included
    pub arena_nodes: usize,
    /// Reachable nodes currently standing in for a sibling
    pub composite_nodes: usize,
    /// Deepest reachable level (root is 0)
    pub max_depth: usize,
    pub root_visits: u32,
    /// Mean value at the root
    pub root_value: f64,
}

/// Search tree over the states of forward model `M`.
#[derive(Debug)]
pub struct SearchTree<M: ForwardModel> {
    /// Arena storing all nodes
    nodes: Vec<NodeOf<M>>,

    /// Root node index (always 0 after initialization)
    root: NodeId,

    /// Composite nodes in the order their merges happened
    merge_log: Vec<NodeId>,
}

impl<M: ForwardModel> SearchTree<M> {
    /// Create a tree holding a single unvisited root.
    pub fn new(model: &M, root_state: M::State) -> Self {
        let is_terminal = model.is_terminal(&root_state);
        Self {
            nodes: vec![SearchNode::new_root(root_state, is_terminal)],
            root: NodeId(0),
            merge_log: Vec::new(),
        }
    }

    /// Get the root node ID.
    #[inline]
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Get a reference to a node by ID.
    #[inline]
    pub fn get(&self, id: NodeId) -> &NodeOf<M> {
        &self.nodes[id.index()]
    }

    /// Get a mutable reference to a node by ID.
    #[inline]
    pub fn get_mut(&mut self, id: NodeId) -> &mut NodeOf<M> {
        &mut self.nodes[id.index()]
    }

    fn allocate(&mut self, node: NodeOf<M>) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(node);
        id
    }

    /// Number of allocated nodes, detached ones included.
    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Apply `action` to the parent's state and attach the result as a new
    /// unvisited child.
    ///
    /// Fails only if the model rejects the action. Callers are expected to
    /// pick actions not already covered by an existing child.
    pub fn add_child(
        &mut self,
        model: &M,
        parent: NodeId,
        action: M::Action,
    ) -> Result<NodeId, ModelError> {
        let state = model.apply(&self.get(parent).state, action)?;
        let is_terminal = model.is_terminal(&state);
        let child = self.allocate(SearchNode::new_child(parent, action, state, is_terminal));
        self.get_mut(parent).children.push(child);
        Ok(child)
    }

    /// Union of the labels carried by a node's children.
    pub fn tried_actions(&self, id: NodeId) -> Vec<M::Action> {
        let mut tried = Vec::new();
        for &child in &self.get(id).children {
            for &label in &self.get(child).labels {
                if !tried.contains(&label) {
                    tried.push(label);
                }
            }
        }
        tried
    }

    /// Legal actions from the node's state not yet covered by a child.
    pub fn untried_actions(&self, model: &M, id: NodeId) -> Vec<M::Action> {
        let tried = self.tried_actions(id);
        model
            .legal_actions(&self.get(id).state)
            .into_iter()
            .filter(|action| !tried.contains(action))
            .collect()
    }

    /// True when every legal action is covered by some child's labels.
    pub fn is_fully_expanded(&self, model: &M, id: NodeId) -> bool {
        self.untried_actions(model, id).is_empty()
    }

    /// Child with the highest UCT score. Ties go to the earliest child.
    pub fn best_child(&self, id: NodeId, exploration_weight: f64) -> Result<NodeId, TreeError> {
        let node = self.get(id);
        let mut best: Option<(NodeId, f64)> = None;

        for &child in &node.children {
            let score = self.get(child).uct_score(node.visits, exploration_weight);
            match best {
                Some((_, best_score)) if score <= best_score => {}
                _ => best = Some((child, score)),
            }
        }

        best.map(|(child, _)| child)
            .ok_or(TreeError::NoChildren(id))
    }

    /// Add `reward` to every node from `leaf` up to the root.
    /// Returns the number of nodes updated.
    pub fn backpropagate(&mut self, leaf: NodeId, reward: f64) -> usize {
        let mut current = leaf;
        let mut updated = 0;

        while current.is_some() {
            let node = self.get_mut(current);
            node.visits += 1;
            node.value += reward;
            updated += 1;
            current = node.parent;
        }

        updated
    }

    /// Number of parent links between `id` and the root.
    pub fn depth_of(&self, id: NodeId) -> usize {
        let mut depth = 0;
        let mut current = self.get(id).parent;
        while current.is_some() {
            depth += 1;
            current = self.get(current).parent;
        }
        depth
    }

    /// Reachable nodes grouped by depth, children in insertion order.
    fn levels(&self) -> Vec<Vec<NodeId>> {
        let mut levels = vec![vec![self.root]];
        loop {
            let next: Vec<NodeId> = levels[levels.len() - 1]
                .iter()
                .flat_map(|&id| self.get(id).children.iter().copied())
                .collect();
            if next.is_empty() {
                break;
            }
            levels.push(next);
        }
        levels
    }

    /// Reachable nodes at `depth`, in breadth-first order.
    pub fn nodes_at_depth(&self, depth: usize) -> Vec<NodeId> {
        self.levels().into_iter().nth(depth).unwrap_or_default()
    }

    /// Deepest reachable level. A lone root has depth 0.
    pub fn max_depth(&self) -> usize {
        self.levels().len() - 1
    }

    /// Every node reachable from the root, in pre-order.
    pub fn live_nodes(&self) -> Vec<NodeId> {
        let mut order = Vec::new();
        let mut stack = vec![self.root];
        while let Some(id) = stack.pop() {
            order.push(id);
            stack.extend(self.get(id).children.iter().rev().copied());
        }
        order
    }

    /// Reachable composite nodes, in pre-order.
    pub fn composite_nodes(&self) -> Vec<NodeId> {
        self.live_nodes()
            .into_iter()
            .filter(|&id| self.get(id).is_composite())
            .collect()
    }

    /// Number of merges that have not been undone yet.
    #[inline]
    pub fn pending_merges(&self) -> usize {
        self.merge_log.len()
    }

    /// Fold `absorb` into its sibling `keep`.
    ///
    /// The absorbed node's children move under `keep`, its labels are added
    /// to `keep`'s labels, and both nodes' statistics are averaged into
    /// `keep`. The absorbed node is detached from the parent but kept in the
    /// arena together with a record of what it owned.
    pub fn merge(&mut self, keep: NodeId, absorb: NodeId) -> Result<(), TreeError> {
        let illegal = |reason| TreeError::IllegalMerge {
            keep,
            absorb,
            reason,
        };

        if keep == absorb {
            return Err(illegal("a node cannot absorb itself"));
        }
        let parent = self.get(keep).parent;
        if parent.is_none() {
            return Err(illegal("the root has no siblings"));
        }
        if self.get(absorb).parent != parent {
            return Err(illegal("nodes do not share a parent"));
        }
        if !self.get(parent).children.contains(&keep) {
            return Err(illegal("keeping node is detached"));
        }
        if !self.get(parent).children.contains(&absorb) {
            return Err(illegal("absorbed node is detached"));
        }
        if self.get(keep).is_composite() || self.get(absorb).is_composite() {
            return Err(illegal("a composite node cannot merge again"));
        }

        let absorbed = self.get_mut(absorb);
        let labels = absorbed.labels.clone();
        let visits = absorbed.visits;
        let value = absorbed.value;
        let children = std::mem::take(&mut absorbed.children);

        for &child in &children {
            self.get_mut(child).parent = keep;
        }

        let node = self.get_mut(keep);
        let added_labels: Vec<M::Action> = labels
            .iter()
            .copied()
            .filter(|label| !node.labels.contains(label))
            .collect();
        node.labels.extend(added_labels.iter().copied());
        node.children.extend(children.iter().copied());
        node.visits = ((node.visits as f64 + visits as f64) / 2.0).round() as u32;
        node.value = (node.value + value) / 2.0;
        node.merge = MergeState::Composite(MergeRecord {
            absorbed: absorb,
            labels,
            added_labels,
            visits,
            value,
            children,
        });

        self.get_mut(parent).children.retain(|&c| c != absorb);
        self.merge_log.push(keep);
        Ok(())
    }

    /// Split a composite node back into itself and the sibling it absorbed.
    ///
    /// Both halves receive half of the composite's current statistics, so
    /// visits gathered while merged are shared evenly. Children added to the
    /// composite after the merge stay with it.
    ///
    /// Merges made later among the composite's own children that involve a
    /// node this merge brought in are split first, so composites can be
    /// reverted in any order. Returns the number of nodes split, 0 for a
    /// plain node.
    pub fn unmerge(&mut self, id: NodeId) -> usize {
        let nested: Vec<NodeId> = match self.get(id).merge_record() {
            None => return 0,
            Some(record) => self
                .get(id)
                .children
                .iter()
                .copied()
                .filter(|&child| {
                    self.get(child).merge_record().is_some_and(|inner| {
                        self.get(inner.absorbed).parent == id
                            && (record.children.contains(&child)
                                || record.children.contains(&inner.absorbed))
                    })
                })
                .collect(),
        };

        let mut split = 0;
        for child in nested {
            split += self.unmerge(child);
        }

        let record = match std::mem::take(&mut self.get_mut(id).merge) {
            MergeState::Plain => return split,
            MergeState::Composite(record) => record,
        };

        let node = self.get_mut(id);
        node.children.retain(|c| !record.children.contains(c));
        node.labels.retain(|l| !record.added_labels.contains(l));
        node.visits = (node.visits as f64 / 2.0).round() as u32;
        node.value /= 2.0;
        let (visits, value) = (node.visits, node.value);

        for &child in &record.children {
            self.get_mut(child).parent = record.absorbed;
        }

        let absorbed = self.get_mut(record.absorbed);
        absorbed.children = record.children;
        absorbed.labels = record.labels;
        absorbed.visits = visits;
        absorbed.value = value;
        let parent = absorbed.parent;

        self.get_mut(parent).children.push(record.absorbed);
        self.merge_log.retain(|&c| c != id);
        split + 1
    }

    /// Undo every outstanding merge, most recent first.
    /// Returns the number of nodes split.
    pub fn unmerge_all(&mut self) -> usize {
        let mut reverted = 0;
        while let Some(id) = self.merge_log.pop() {
            reverted += self.unmerge(id);
        }
        reverted
    }

    /// Eagerly expand every legal action below `id` for `depth` levels.
    /// Returns the number of nodes created.
    pub fn expand_to_depth(
        &mut self,
        model: &M,
        id: NodeId,
        depth: usize,
    ) -> Result<usize, ModelError> {
        if depth == 0 || self.get(id).is_terminal {
            return Ok(0);
        }

        let mut created = 0;
        for action in self.untried_actions(model, id) {
            self.add_child(model, id, action)?;
            created += 1;
        }

        let children = self.get(id).children.clone();
        for child in children {
            created += self.expand_to_depth(model, child, depth - 1)?;
        }
        Ok(created)
    }

    /// Compute statistics about the tree.
    pub fn stats(&self) -> TreeStats {
        let live = self.live_nodes();
        let root = self.get(self.root);
        TreeStats {
            live_nodes: live.len(),
            arena_nodes: self.nodes.len(),
            composite_nodes: live.iter().filter(|&&id| self.get(id).is_composite()).count(),
            max_depth: self.max_depth(),
            root_visits: root.visits,
            root_value: root.mean_value(),
        }
    }

    /// Indented text dump of the reachable tree.
    pub fn render(&self) -> String {
        let mut out = String::new();
        self.render_node(self.root, "", true, true, &mut out);
        out
    }

    fn render_node(&self, id: NodeId, prefix: &str, last: bool, is_root: bool, out: &mut String) {
        let node = self.get(id);
        let branch = match (is_root, last) {
            (true, _) => "",
            (false, true) => "└── ",
            (false, false) => "├── ",
        };
        let marker = if node.is_composite() { " *" } else { "" };
        let _ = writeln!(
            out,
            "{prefix}{branch}{:?}{marker} (Visits: {}) (Value: {:.2})",
            node.labels, node.visits, node.value
        );

        let child_prefix = match (is_root, last) {
            (true, _) => String::new(),
            (false, true) => format!("{prefix}    "),
            (false, false) => format!("{prefix}│   "),
        };
        let count = node.children.len();
        for (i, &child) in node.children.iter().enumerate() {
            self.render_node(child, &child_prefix, i + 1 == count, false, out);
        }
    }
}

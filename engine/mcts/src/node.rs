//! Search tree node representation.
//!
//! Each node holds a forward-model state reached by taking one of its
//! `labels` from the parent. Nodes store visit statistics used for UCT
//! selection and, while they stand in for an absorbed sibling, the merge
//! record needed to split them apart again.

/// Index into the node arena. Using a newtype for type safety.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u32);

impl NodeId {
    pub const NONE: NodeId = NodeId(u32::MAX);

    pub fn is_none(self) -> bool {
        self == Self::NONE
    }

    pub fn is_some(self) -> bool {
        !self.is_none()
    }

    #[inline]
    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

/// Everything needed to undo one absorption.
///
/// The absorbed node stays in the arena while detached; only its children
/// are physically re-owned by the absorbing node.
#[derive(Debug, Clone, PartialEq)]
pub struct MergeRecord<A> {
    /// The detached sibling this node currently stands in for
    pub absorbed: NodeId,

    /// Absorbed node's labels before the merge
    pub labels: Vec<A>,

    /// Labels that were new to the absorbing node (removed again on unmerge)
    pub added_labels: Vec<A>,

    /// Absorbed node's visit count before the merge
    pub visits: u32,

    /// Absorbed node's cumulative value before the merge
    pub value: f64,

    /// Children transferred from the absorbed node at merge time
    pub children: Vec<NodeId>,
}

/// Whether a node is plain or currently composite.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum MergeState<A> {
    #[default]
    Plain,
    Composite(MergeRecord<A>),
}

/// A node in the search tree.
#[derive(Debug, Clone)]
pub struct SearchNode<S, A> {
    /// Parent node index (NONE for root)
    pub parent: NodeId,

    /// Actions leading from the parent into this node.
    /// One element normally, the union of absorbed labels when composite.
    pub labels: Vec<A>,

    /// Forward-model snapshot at this node
    pub state: S,

    /// Number of times this node has been visited
    pub visits: u32,

    /// Cumulative (not averaged) rollout reward
    pub value: f64,

    /// Whether the state is terminal
    pub is_terminal: bool,

    /// Owned children in insertion order
    pub children: Vec<NodeId>,

    /// Merge bookkeeping
    pub merge: MergeState<A>,
}

impl<S, A: Copy + PartialEq> SearchNode<S, A> {
    /// Create a new root node.
    pub fn new_root(state: S, is_terminal: bool) -> Self {
        Self {
            parent: NodeId::NONE,
            labels: Vec::new(),
            state,
            visits: 0,
            value: 0.0,
            is_terminal,
            children: Vec::new(),
            merge: MergeState::Plain,
        }
    }

    /// Create a new child node reached through `action`.
    pub fn new_child(parent: NodeId, action: A, state: S, is_terminal: bool) -> Self {
        Self {
            parent,
            labels: vec![action],
            state,
            visits: 0,
            value: 0.0,
            is_terminal,
            children: Vec::new(),
            merge: MergeState::Plain,
        }
    }

    /// Mean value = value / visits.
    /// Returns 0.0 if never visited.
    #[inline]
    pub fn mean_value(&self) -> f64 {
        if self.visits == 0 {
            0.0
        } else {
            self.value / self.visits as f64
        }
    }

    /// UCT score used when the parent picks among its children.
    ///
    /// UCT = value / visits + c * sqrt(2 * ln(N_parent) / (1 + visits))
    ///
    /// A parent that was never visited is treated as visited once, which
    /// zeroes the exploration term instead of taking `ln(0)`.
    #[inline]
    pub fn uct_score(&self, parent_visits: u32, exploration_weight: f64) -> f64 {
        let parent_visits = parent_visits.max(1) as f64;
        let exploration = (2.0 * parent_visits.ln() / (1.0 + self.visits as f64)).sqrt();
        self.mean_value() + exploration_weight * exploration
    }

    #[inline]
    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    /// Whether this node currently stands in for an absorbed sibling.
    #[inline]
    pub fn is_composite(&self) -> bool {
        matches!(self.merge, MergeState::Composite(_))
    }

    pub fn merge_record(&self) -> Option<&MergeRecord<A>> {
        match &self.merge {
            MergeState::Plain => None,
            MergeState::Composite(record) => Some(record),
        }
    }

    #[inline]
    pub fn has_label(&self, action: A) -> bool {
        self.labels.contains(&action)
    }

    /// The action reported for this node when reading off a plan.
    pub fn representative_action(&self) -> Option<A> {
        self.labels.first().copied()
    }

    /// Check if this is a leaf node (terminal or no children yet).
    #[inline]
    pub fn is_leaf(&self) -> bool {
        self.is_terminal || self.children.is_empty()
    }
}

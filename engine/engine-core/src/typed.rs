//! Typed forward model trait consumed by the search engine
//!
//! A forward model is a pure function of `(state, action) -> state'`. The
//! search engine never mutates a state in place: every expansion and rollout
//! step clones the parent state through [`ForwardModel::apply`].

use std::fmt::Debug;

/// Grid coordinates of the acting agent.
pub type Position = (i32, i32);

/// Errors raised when a forward model is driven outside its contract.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ModelError {
    /// The action is not in `legal_actions` for the given state.
    #[error("Invalid action {action} for the current state")]
    InvalidAction { action: String },

    /// The state is terminal, so no action can be applied.
    #[error("Cannot apply {action}: game is over")]
    Terminal { action: String },
}

impl ModelError {
    /// Build an `InvalidAction` error from any debuggable action.
    pub fn invalid_action<A: Debug>(action: A) -> Self {
        Self::InvalidAction {
            action: format!("{:?}", action),
        }
    }

    /// Build a `Terminal` error from any debuggable action.
    pub fn terminal<A: Debug>(action: A) -> Self {
        Self::Terminal {
            action: format!("{:?}", action),
        }
    }
}

/// Deterministic single-agent forward model.
///
/// # Contract
///
/// * `legal_actions` is deterministic given the state and empty when the
///   state is terminal.
/// * `apply` is pure: it never mutates `state` and always returns the same
///   successor for the same inputs.
/// * `position` is the only structural field the similarity oracle inspects,
///   so every model must expose at least it and `reward`.
///
/// # Example
///
/// ```rust
/// use engine_core::{ForwardModel, ModelError, Position};
///
/// #[derive(Debug)]
/// struct Counter;
///
/// impl ForwardModel for Counter {
///     type State = i32;
///     type Action = i32;
///
///     fn legal_actions(&self, state: &i32) -> Vec<i32> {
///         if *state >= 3 { Vec::new() } else { vec![1] }
///     }
///
///     fn apply(&self, state: &i32, action: i32) -> Result<i32, ModelError> {
///         if !self.legal_actions(state).contains(&action) {
///             return Err(ModelError::invalid_action(action));
///         }
///         Ok(state + action)
///     }
///
///     fn is_terminal(&self, state: &i32) -> bool { *state >= 3 }
///     fn reward(&self, state: &i32) -> f64 { *state as f64 }
///     fn position(&self, state: &i32) -> Position { (*state, 0) }
/// }
///
/// let end = Counter.apply_sequence(&0, &[1, 1, 1]).unwrap();
/// assert_eq!(end, 3);
/// assert!(Counter.is_terminal(&end));
/// ```
pub trait ForwardModel: Debug {
    /// Snapshot of the full game state, value-copied on expansion.
    type State: Clone + Debug;

    /// A single agent action.
    type Action: Copy + Eq + Debug;

    /// All actions legal in `state`, in a fixed order.
    fn legal_actions(&self, state: &Self::State) -> Vec<Self::Action>;

    /// Apply `action` to a copy of `state` and return the successor.
    fn apply(&self, state: &Self::State, action: Self::Action)
        -> Result<Self::State, ModelError>;

    /// Whether the game has ended in `state`.
    fn is_terminal(&self, state: &Self::State) -> bool;

    /// Heuristic scalar reward of `state` (higher is better for the agent).
    fn reward(&self, state: &Self::State) -> f64;

    /// Position of the acting agent in `state`.
    fn position(&self, state: &Self::State) -> Position;

    /// Replay a sequence of actions on a copy of `state`.
    ///
    /// Stops at the first illegal action and returns its error.
    fn apply_sequence(
        &self,
        state: &Self::State,
        actions: &[Self::Action],
    ) -> Result<Self::State, ModelError> {
        let mut current = state.clone();
        for &action in actions {
            current = self.apply(&current, action)?;
        }
        Ok(current)
    }

    /// Whether `action` is legal in `state`.
    fn is_legal(&self, state: &Self::State, action: Self::Action) -> bool {
        self.legal_actions(state).contains(&action)
    }
}

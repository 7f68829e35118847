//! Small forward model used by the unit tests.
//!
//! A walker on an unbounded grid with a fixed horizon. The reward is the
//! weighted coordinate sum, so positions map to predictable rewards.

use engine_core::{ForwardModel, ModelError, Position};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Step {
    North,
    East,
    South,
    West,
}

impl Step {
    pub const ALL: [Step; 4] = [Step::North, Step::East, Step::South, Step::West];
}

#[derive(Debug, Clone, PartialEq)]
pub struct WalkState {
    pub position: Position,
    pub steps: u32,
}

#[derive(Debug, Clone)]
pub struct Walk {
    horizon: u32,
    y_weight: f64,
}

impl Walk {
    pub fn new(horizon: u32) -> Self {
        Self {
            horizon,
            y_weight: 1.0,
        }
    }

    pub fn with_y_weight(mut self, weight: f64) -> Self {
        self.y_weight = weight;
        self
    }

    pub fn start(&self) -> WalkState {
        self.state_at((0, 0), 0)
    }

    pub fn state_at(&self, position: Position, steps: u32) -> WalkState {
        WalkState { position, steps }
    }
}

impl ForwardModel for Walk {
    type State = WalkState;
    type Action = Step;

    fn legal_actions(&self, state: &WalkState) -> Vec<Step> {
        if self.is_terminal(state) {
            Vec::new()
        } else {
            Step::ALL.to_vec()
        }
    }

    fn apply(&self, state: &WalkState, action: Step) -> Result<WalkState, ModelError> {
        if self.is_terminal(state) {
            return Err(ModelError::terminal(action));
        }
        let (x, y) = state.position;
        let position = match action {
            Step::North => (x, y + 1),
            Step::East => (x + 1, y),
            Step::South => (x, y - 1),
            Step::West => (x - 1, y),
        };
        Ok(WalkState {
            position,
            steps: state.steps + 1,
        })
    }

    fn is_terminal(&self, state: &WalkState) -> bool {
        state.steps >= self.horizon
    }

    fn reward(&self, state: &WalkState) -> f64 {
        state.position.0 as f64 + self.y_weight * state.position.1 as f64
    }

    fn position(&self, state: &WalkState) -> Position {
        state.position
    }
}

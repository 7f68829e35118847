//! Skirmish game implementation for the planning engine
//!
//! Two fighters on a square grid. The player moves and attacks; the opponent
//! has no movement points and never acts, so the game is a single-agent
//! planning problem with a heuristic reward.
//!
//! # Usage
//!
//! ```rust
//! use engine_core::ForwardModel;
//! use games_skirmish::{Action, Skirmish};
//!
//! let game = Skirmish::new();
//! let state = game.initial_state();
//!
//! assert_eq!(game.legal_actions(&state), vec![Action::Up, Action::Down, Action::Left, Action::Right]);
//!
//! let next = game.apply(&state, Action::Up).unwrap();
//! assert_eq!(next.player.position, (0, 1));
//! ```

use std::fmt;

use engine_core::game_utils::squared_distance;
use engine_core::{ForwardModel, ModelError, Position};
use rand::Rng;

mod render;
mod reward;

pub use render::render_map;
pub use reward::{calculate_reward, max_distance};

/// Damage dealt by a single attack
pub const ATTACK_DAMAGE: i32 = 10;

/// Movement points a fighter regains at the start of each turn
pub const MOVEMENT_LIMIT: u32 = 2;

/// Turn at which the game ends regardless of health
pub const MAX_TURNS: u32 = 100;

/// Default side length of the square map
pub const DEFAULT_MAP_SIZE: u32 = 20;

/// A fighter on the grid
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fighter {
    pub position: Position,
    pub health: i32,
    /// Movement points left this turn
    pub movement_points: u32,
    /// Movement points restored on turn rollover
    pub max_movement: u32,
}

impl Fighter {
    pub fn new(position: Position, health: i32, movement_points: u32) -> Self {
        Self {
            position,
            health,
            movement_points,
            max_movement: movement_points,
        }
    }

    /// Refresh movement points at the end of a turn
    pub fn reset(&mut self) {
        self.movement_points = self.max_movement;
    }

    fn step(&mut self, dx: i32, dy: i32) {
        if self.movement_points > 0 {
            self.position.0 += dx;
            self.position.1 += dy;
            self.movement_points -= 1;
        }
    }

    fn attack(&mut self, other: &mut Fighter) {
        other.health -= ATTACK_DAMAGE;
        self.movement_points = self.movement_points.saturating_sub(1);
    }
}

impl fmt::Display for Fighter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Pos=({}, {}), HP={}, MP={}",
            self.position.0, self.position.1, self.health, self.movement_points
        )
    }
}

/// Skirmish game state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct State {
    pub turn: u32,
    pub player: Fighter,
    pub opponent: Fighter,
    /// Set once either fighter is down or the turn limit is reached
    pub done: bool,
}

impl State {
    /// Whether the player is adjacent (8-neighbourhood) to the opponent
    pub fn can_attack(&self) -> bool {
        squared_distance(self.player.position, self.opponent.position) <= 2
    }

    pub fn reward(&self) -> f64 {
        calculate_reward(self)
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Turn: {}, Reward: {:.2}, Player: {}, Opp: {}",
            self.turn,
            self.reward(),
            self.player,
            self.opponent
        )
    }
}

/// Skirmish action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Up,
    Down,
    Left,
    Right,
    Attack,
}

impl Action {
    /// Movement actions in the order they are offered
    pub const MOVES: [Action; 4] = [Action::Up, Action::Down, Action::Left, Action::Right];

    pub fn name(&self) -> &'static str {
        match self {
            Action::Up => "up",
            Action::Down => "down",
            Action::Left => "left",
            Action::Right => "right",
            Action::Attack => "attack",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Skirmish forward model
#[derive(Debug, Clone)]
pub struct Skirmish {
    map_size: u32,
    max_turns: u32,
}

impl Skirmish {
    pub fn new() -> Self {
        Self {
            map_size: DEFAULT_MAP_SIZE,
            max_turns: MAX_TURNS,
        }
    }

    pub fn with_map_size(mut self, map_size: u32) -> Self {
        self.map_size = map_size;
        self
    }

    pub fn with_max_turns(mut self, max_turns: u32) -> Self {
        self.max_turns = max_turns;
        self
    }

    pub fn map_size(&self) -> u32 {
        self.map_size
    }

    pub fn max_turns(&self) -> u32 {
        self.max_turns
    }

    /// Fixed start: player at (0, 0), opponent at (12, 12)
    pub fn initial_state(&self) -> State {
        self.state_with_positions((0, 0), (12, 12))
    }

    /// Random start: player in the lower half of the diagonal, opponent in the upper half
    pub fn random_state<R: Rng>(&self, rng: &mut R) -> State {
        let size = self.map_size.max(2) as i32;
        let middle = ((size as f64) / 2.0).round() as i32;
        let a = rng.gen_range(0..middle);
        let b = rng.gen_range(middle..size);
        self.state_with_positions((a, a), (b, b))
    }

    /// Start state with explicit fighter positions
    pub fn state_with_positions(&self, player: Position, opponent: Position) -> State {
        State {
            turn: 0,
            player: Fighter::new(player, 100, MOVEMENT_LIMIT),
            opponent: Fighter::new(opponent, 20, 0),
            done: false,
        }
    }

    fn check_done(&self, state: &mut State) {
        if state.player.health <= 0 || state.opponent.health <= 0 || state.turn >= self.max_turns {
            state.done = true;
        }
    }
}

impl Default for Skirmish {
    fn default() -> Self {
        Self::new()
    }
}

impl ForwardModel for Skirmish {
    type State = State;
    type Action = Action;

    fn legal_actions(&self, state: &State) -> Vec<Action> {
        if state.done || state.player.movement_points == 0 {
            return Vec::new();
        }

        let mut actions = Action::MOVES.to_vec();
        if state.can_attack() {
            actions.push(Action::Attack);
        }
        actions
    }

    fn apply(&self, state: &State, action: Action) -> Result<State, ModelError> {
        if state.done {
            return Err(ModelError::terminal(action));
        }
        if !self.is_legal(state, action) {
            return Err(ModelError::invalid_action(action));
        }

        let mut next = *state;
        match action {
            Action::Up => next.player.step(0, 1),
            Action::Down => next.player.step(0, -1),
            Action::Left => next.player.step(-1, 0),
            Action::Right => next.player.step(1, 0),
            Action::Attack => {
                let State {
                    player, opponent, ..
                } = &mut next;
                player.attack(opponent);
            }
        }

        // Turn rollover happens here so legal_actions never has to mutate
        if next.player.movement_points == 0 {
            next.turn += 1;
            next.player.reset();
        }

        self.check_done(&mut next);
        Ok(next)
    }

    fn is_terminal(&self, state: &State) -> bool {
        state.done
    }

    fn reward(&self, state: &State) -> f64 {
        calculate_reward(state)
    }

    fn position(&self, state: &State) -> Position {
        state.player.position
    }
}

#[cfg(test)]
mod tests;

//! Heuristic reward for skirmish states.

use engine_core::euclidean_distance;

use crate::State;

/// Distance between the fixed start positions, used to normalise proximity
pub fn max_distance() -> f64 {
    euclidean_distance((0, 0), (12, 12))
}

const OPPONENT_START_HEALTH: i32 = 20;
const PLAYER_START_HEALTH: i32 = 100;
const VICTORY_BONUS: f64 = 100.0;
const PROXIMITY_SCALE: f64 = 10.0;

/// Score a state from the player's point of view.
///
/// Damage dealt is rewarded, damage taken and elapsed turns are penalised,
/// closing in on the opponent earns up to 10 points and a kill earns 100.
pub fn calculate_reward(state: &State) -> f64 {
    let damage_dealt = (OPPONENT_START_HEALTH - state.opponent.health) as f64;
    let damage_taken = (PLAYER_START_HEALTH - state.player.health) as f64;

    let distance = euclidean_distance(state.player.position, state.opponent.position);
    let norm = max_distance();
    let proximity = (norm - distance) / norm * PROXIMITY_SCALE;

    let turn_penalty = state.turn as f64 / 100.0;

    let victory = if state.opponent.health <= 0 {
        VICTORY_BONUS
    } else {
        0.0
    };

    damage_dealt - damage_taken - turn_penalty + victory + proximity
}

use super::*;
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;

#[test]
fn test_initial_state() {
    let game = Skirmish::new();
    let state = game.initial_state();
    assert_eq!(state.turn, 0);
    assert_eq!(state.player.position, (0, 0));
    assert_eq!(state.player.health, 100);
    assert_eq!(state.player.movement_points, MOVEMENT_LIMIT);
    assert_eq!(state.opponent.position, (12, 12));
    assert_eq!(state.opponent.health, 20);
    assert_eq!(state.opponent.movement_points, 0);
    assert!(!state.done);
}

#[test]
fn test_legal_actions_without_attack() {
    let game = Skirmish::new();
    let state = game.initial_state();
    assert_eq!(
        game.legal_actions(&state),
        vec![Action::Up, Action::Down, Action::Left, Action::Right]
    );
    assert!(!state.can_attack());
}

#[test]
fn test_legal_actions_with_attack_diagonal() {
    let game = Skirmish::new();
    let state = game.state_with_positions((11, 11), (12, 12));
    assert!(state.can_attack());
    let actions = game.legal_actions(&state);
    assert_eq!(actions.len(), 5);
    assert_eq!(actions[4], Action::Attack);
}

#[test]
fn test_movement_directions() {
    let game = Skirmish::new();
    let state = game.state_with_positions((5, 5), (12, 12));
    assert_eq!(game.apply(&state, Action::Up).unwrap().player.position, (5, 6));
    assert_eq!(game.apply(&state, Action::Down).unwrap().player.position, (5, 4));
    assert_eq!(game.apply(&state, Action::Left).unwrap().player.position, (4, 5));
    assert_eq!(game.apply(&state, Action::Right).unwrap().player.position, (6, 5));
}

#[test]
fn test_apply_is_pure() {
    let game = Skirmish::new();
    let state = game.initial_state();
    let before = state;
    let _ = game.apply(&state, Action::Right).unwrap();
    assert_eq!(state, before);
}

#[test]
fn test_turn_rollover_after_two_moves() {
    let game = Skirmish::new();
    let state = game.initial_state();

    let one = game.apply(&state, Action::Up).unwrap();
    assert_eq!(one.turn, 0);
    assert_eq!(one.player.movement_points, 1);

    let two = game.apply(&one, Action::Up).unwrap();
    assert_eq!(two.turn, 1);
    assert_eq!(two.player.movement_points, MOVEMENT_LIMIT);
    assert_eq!(two.player.position, (0, 2));
    assert_eq!(game.legal_actions(&two).len(), 4);
}

#[test]
fn test_attack_requires_adjacency() {
    let game = Skirmish::new();
    let state = game.initial_state();
    let err = game.apply(&state, Action::Attack).unwrap_err();
    assert_eq!(err, ModelError::invalid_action(Action::Attack));
}

#[test]
fn test_attack_damages_opponent() {
    let game = Skirmish::new();
    let state = game.state_with_positions((12, 11), (12, 12));
    let next = game.apply(&state, Action::Attack).unwrap();
    assert_eq!(next.opponent.health, 20 - ATTACK_DAMAGE);
    assert_eq!(next.player.movement_points, 1);
    assert!(!next.done);
}

#[test]
fn test_opponent_defeated_ends_game() {
    let game = Skirmish::new();
    let state = game.state_with_positions((12, 11), (12, 12));
    let end = game
        .apply_sequence(&state, &[Action::Attack, Action::Attack])
        .unwrap();
    assert_eq!(end.opponent.health, 0);
    assert!(end.done);
    assert!(game.is_terminal(&end));
    assert!(game.legal_actions(&end).is_empty());
    assert!(game.reward(&end) > 100.0);

    let err = game.apply(&end, Action::Up).unwrap_err();
    assert!(matches!(err, ModelError::Terminal { .. }));
}

#[test]
fn test_turn_limit_ends_game() {
    let game = Skirmish::new().with_max_turns(2);
    let state = game.initial_state();
    let end = game
        .apply_sequence(&state, &[Action::Up, Action::Up, Action::Right, Action::Right])
        .unwrap();
    assert_eq!(end.turn, 2);
    assert!(end.done);
}

#[test]
fn test_random_state_halves() {
    let game = Skirmish::new();
    let mut rng = ChaCha20Rng::seed_from_u64(42);
    for _ in 0..100 {
        let state = game.random_state(&mut rng);
        let (px, py) = state.player.position;
        let (ox, oy) = state.opponent.position;
        assert_eq!(px, py);
        assert_eq!(ox, oy);
        assert!((0..10).contains(&px));
        assert!((10..20).contains(&ox));
    }
}

#[test]
fn test_position_is_player_position() {
    let game = Skirmish::new();
    let state = game.state_with_positions((3, 4), (12, 12));
    assert_eq!(game.position(&state), (3, 4));
}

#[test]
fn test_display() {
    let state = Skirmish::new().initial_state();
    assert_eq!(
        state.to_string(),
        "Turn: 0, Reward: 0.00, Player: Pos=(0, 0), HP=100, MP=2, Opp: Pos=(12, 12), HP=20, MP=0"
    );
    assert_eq!(Action::Attack.to_string(), "attack");
}

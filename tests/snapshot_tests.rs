//! Persistence integration tests.
//!
//! States reached through real play are saved as JSON or bincode and
//! restored; a restored state must behave exactly like the original.

use rust_backgammon::board::Board;
use rust_backgammon::core::{EngineError, GameRng, RulesConfig, Side};
use rust_backgammon::game::{Backgammon, GameState, Playout, PlayoutConfig, Snapshot};
use rust_backgammon::scoring::MatchState;

fn played(seed: u64, rolls: u32) -> GameState {
    let engine = Backgammon::default();
    let state = engine.start_new_match(5).unwrap();
    let config = PlayoutConfig::default()
        .with_double_probability(0.3)
        .with_max_rolls(rolls);
    Playout::new(&engine)
        .with_config(config)
        .play_game(&state, &mut GameRng::new(seed))
        .unwrap()
}

// =============================================================================
// Round Trips
// =============================================================================

#[test]
fn test_finished_game_round_trips() {
    let rules = RulesConfig::default();
    let finished = played(11, 0);
    assert!(finished.is_over());

    let json = finished.to_json().unwrap();
    assert_eq!(GameState::from_json(&json, &rules).unwrap(), finished);

    let bytes = finished.to_bytes().unwrap();
    assert_eq!(GameState::from_bytes(&bytes, &rules).unwrap(), finished);
}

#[test]
fn test_mid_game_round_trips() {
    let rules = RulesConfig::default();
    for seed in 0..4 {
        let state = played(seed, 20);
        let restored = GameState::from_json(&state.to_json().unwrap(), &rules).unwrap();
        assert_eq!(restored, state);
    }
}

#[test]
fn test_pretty_json_decodes() {
    let state = played(2, 10);
    let pretty = Snapshot::capture(&state).to_json_pretty().unwrap();
    let restored = Snapshot::from_json(&pretty)
        .unwrap()
        .restore(&RulesConfig::default())
        .unwrap();
    assert_eq!(restored, state);
}

#[test]
fn test_replay_position_survives_save() {
    let engine = Backgammon::default();
    let state = played(5, 12);
    let viewing = engine.replay_back(&engine.replay_back(&state));
    assert_eq!(viewing.board(), state.board());

    let restored = GameState::from_json(&viewing.to_json().unwrap(), engine.config()).unwrap();
    assert_eq!(restored.history().index(), viewing.history().index());
    assert_eq!(restored.replay_board(), viewing.replay_board());
    assert!(!restored.history().is_live());
}

#[test]
fn test_pending_offer_round_trips() {
    let engine = Backgammon::default();
    let state =
        GameState::from_position(Board::starting(), Side::Black, MatchState::unlimited()).unwrap();
    let offered = engine.offer_double(&state, Side::Black).unwrap();

    let restored = GameState::from_json(&offered.to_json().unwrap(), engine.config()).unwrap();
    assert!(restored.cube().pending_offer());
    assert_eq!(restored.cube().offering_player(), Some(Side::Black));
    assert!(engine.accept_double(&restored, Side::White).is_ok());
}

// =============================================================================
// Continuation
// =============================================================================

#[test]
fn test_restored_state_plays_on_identically() {
    let engine = Backgammon::default();
    let playout = Playout::new(&engine);
    let state = played(8, 30);
    let restored = GameState::from_bytes(&state.to_bytes().unwrap(), engine.config()).unwrap();

    let a = playout.play_game(&state, &mut GameRng::new(99)).unwrap();
    let b = playout.play_game(&restored, &mut GameRng::new(99)).unwrap();
    assert_eq!(a, b);
}

// =============================================================================
// Rules Mismatch
// =============================================================================

#[test]
fn test_cube_above_restoring_ceiling_is_corrupt() {
    let engine = Backgammon::default();
    let state =
        GameState::from_position(Board::starting(), Side::White, MatchState::unlimited()).unwrap();
    let state = engine.offer_double(&state, Side::White).unwrap();
    let state = engine.beaver_double(&state, Side::Black).unwrap();
    assert_eq!(state.cube().value(), 4);

    let json = state.to_json().unwrap();
    let strict = RulesConfig::default().with_max_cube_value(2);
    assert!(matches!(
        GameState::from_json(&json, &strict),
        Err(EngineError::CorruptState(_))
    ));
    assert!(GameState::from_json(&json, engine.config()).is_ok());
}

//! Match flow integration tests: scoring, the Crawford rule, and
//! session lifecycle.

use rust_backgammon::board::{Board, BoardBuilder, Location};
use rust_backgammon::core::{EngineError, GameRng, RulesConfig, Side, MATCH_LENGTHS};
use rust_backgammon::game::{Backgammon, GameState, Playout, PlayoutConfig};
use rust_backgammon::rules::WinClass;
use rust_backgammon::scoring::MatchState;

/// White to roll with one piece left on its 1 point; Black has borne off
/// nothing and is clear of White's home board.
fn gammon_position() -> Board {
    BoardBuilder::new()
        .place(Side::White, 0, 1)
        .place(Side::Black, 10, 5)
        .place(Side::Black, 12, 5)
        .place(Side::Black, 14, 5)
        .rest_off()
        .build()
        .unwrap()
}

fn bear_off_last(engine: &Backgammon, match_state: MatchState) -> GameState {
    let state = GameState::from_position(gammon_position(), Side::White, match_state).unwrap();
    let (state, _) = engine.apply_roll(&state, 1, 1).unwrap();
    engine
        .validate_and_apply_move(&state, Location::Point(0), Location::Off)
        .unwrap()
        .0
}

// =============================================================================
// Session Lifecycle
// =============================================================================

#[test]
fn test_match_length_menu() {
    let engine = Backgammon::default();
    for length in MATCH_LENGTHS {
        let state = engine.start_new_match(length).unwrap();
        assert_eq!(state.match_state().match_length(), length);
        assert!(state.match_state().is_match_play());
    }
    for length in [0, 2, 4, 27] {
        assert_eq!(
            engine.start_new_match(length),
            Err(EngineError::InvalidMatchLength(length))
        );
    }
}

#[test]
fn test_end_match_returns_money_session() {
    let engine = Backgammon::default();
    let finished = bear_off_last(&engine, MatchState::new(7).unwrap());
    assert_eq!(finished.match_state().score(Side::White), 2);

    let money = engine.end_match(&finished);
    assert!(!money.match_state().is_match_play());
    assert_eq!(money.match_state().score(Side::White), 0);
    assert_eq!(money.board(), &Board::starting());
    assert!(!money.opening_roll_made());
}

#[test]
fn test_new_game_keeps_score() {
    let engine = Backgammon::default();
    let finished = bear_off_last(&engine, MatchState::new(7).unwrap());

    let next = engine.start_new_game(&finished).unwrap();
    assert_eq!(next.match_state().game_number(), 2);
    assert_eq!(next.match_state().score(Side::White), 2);
    assert_eq!(next.board(), &Board::starting());
    assert!(next.result().is_none());
    assert_eq!(next.history().len(), 1);
}

// =============================================================================
// Scoring
// =============================================================================

#[test]
fn test_one_point_match_ends_on_gammon() {
    let engine = Backgammon::default();
    let finished = bear_off_last(&engine, MatchState::new(1).unwrap());

    let result = finished.result().unwrap();
    assert_eq!(result.class, WinClass::Gammon);
    assert_eq!(result.awarded, 1);
    assert_eq!(finished.match_state().match_winner(), Some(Side::White));
    assert!(!finished.match_state().crawford_game());
}

#[test]
fn test_money_play_is_uncapped() {
    let engine = Backgammon::default();
    let mut money = MatchState::unlimited();
    for _ in 0..3 {
        money = bear_off_last(&engine, money).match_state().clone();
    }
    assert_eq!(money.score(Side::White), 6);
    assert_eq!(money.game_number(), 4);
    assert!(!money.is_over());
}

#[test]
fn test_jacoby_applies_to_money_play_only() {
    let engine = Backgammon::new(RulesConfig::default().with_jacoby(true)).unwrap();

    let money = bear_off_last(&engine, MatchState::unlimited());
    assert_eq!(money.result().unwrap().class, WinClass::Gammon);
    assert_eq!(money.result().unwrap().points, 1);

    let matched = bear_off_last(&engine, MatchState::new(5).unwrap());
    assert_eq!(matched.result().unwrap().points, 2);
}

// =============================================================================
// Crawford Rule
// =============================================================================

#[test]
fn test_crawford_game_follows_match_point() {
    let engine = Backgammon::default();
    // 5-point match: White reaches 4 with two gammons.
    let after_first = bear_off_last(&engine, MatchState::new(5).unwrap());
    let after_second = bear_off_last(&engine, after_first.match_state().clone());

    let scores = after_second.match_state();
    assert_eq!(scores.score(Side::White), 4);
    assert!(scores.crawford_game());

    let crawford = engine.start_new_game(&after_second).unwrap();
    assert!(crawford.match_state().crawford_game());
    assert!(!crawford.match_state().can_double_in_match());
}

#[test]
fn test_random_matches_finish_with_one_crawford_game_at_most() {
    let engine = Backgammon::default();
    let config = PlayoutConfig::default()
        .with_double_probability(0.2)
        .with_take_probability(0.8);
    let playout = Playout::new(&engine).with_config(config);

    for seed in 0..5 {
        let mut rng = GameRng::new(seed);
        let state = engine.start_new_match(7).unwrap();
        let report = playout.play_match(&state, &mut rng).unwrap();

        let scores = report.final_state.match_state();
        let winner = scores.match_winner().unwrap();
        assert_eq!(scores.score(winner), 7);
        assert!(scores.score(winner.opponent()) < 7);
        assert!(report.crawford_games <= 1);

        let awarded: u32 = report.results.iter().map(|r| r.awarded).sum();
        assert_eq!(awarded, scores.score(Side::White) + scores.score(Side::Black));
        assert_eq!(scores.game_number() as usize, report.results.len() + 1);
    }
}

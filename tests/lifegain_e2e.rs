//! End-to-end games: a minimal hand-built board and full default-deck
//! runs through the public simulation entry points.

use std::sync::Arc;

use soulsim::catalog::{Catalog, TriggerChances};
use soulsim::deck::Decklist;
use soulsim::game::{
    GameLoop, GameLogger, GameState, OpponentConfig, OutputMode, RunEndReason, TurnSnapshot,
    VerbosityLevel,
};
use soulsim::sim::{run_one_game, SimConfig};

/// A board with one Plains, a Lunarch Veteran in hand, and a library of
/// uncastable sorceries, so exactly one thing can happen on turn one.
fn veteran_game(verbosity: VerbosityLevel) -> GameState {
    let catalog = Arc::new(Catalog::new(&TriggerChances::default()));
    let logger = GameLogger::new(verbosity).with_output(OutputMode::Memory);
    let mut game = GameState::new(catalog, logger);
    game.seed_rng(7);

    let plains = game.create_card("Plains").unwrap();
    game.battlefield.add(plains);
    let veteran = game.create_card("Lunarch Veteran").unwrap();
    game.hand.add(veteran);
    for _ in 0..3 {
        let deluge = game.create_card("Toxic Deluge").unwrap();
        game.library.add(deluge);
    }
    game
}

/// One white mana, one "gain 1 life when a creature enters" creature:
/// after a single turn the creature is on the battlefield, life is 41,
/// and the hand holds only the card drawn for turn.
#[test]
fn test_one_drop_lifegain_creature_swings_the_turn() {
    let mut game = veteran_game(VerbosityLevel::Silent);
    let outcome = GameLoop::new(&mut game).with_max_turns(1).run().unwrap();

    assert_eq!(game.life, 41);
    assert_eq!(game.creatures_on_battlefield().len(), 1);
    assert_eq!(game.battlefield.len(), 2);
    assert_eq!(game.hand.len(), 1);
    assert_eq!(game.library.len(), 2);
    assert!(game.graveyard.is_empty());

    assert_eq!(outcome.turns_completed, 1);
    assert_eq!(outcome.end_reason, RunEndReason::TurnLimitReached);
    assert_eq!(
        outcome.snapshots[0],
        TurnSnapshot {
            turn: 1,
            life: 41,
            creatures: 1,
            total_power: 1,
            total_toughness: 1,
            damage_to_opponents: 0,
            hand_size: 1,
            graveyard_size: 0,
            graveyard_creatures: 0,
        }
    );
}

/// The verbose transcript narrates the draw, the cast, the trigger, and
/// the gain, in that order.
#[test]
fn test_transcript_narrates_the_cast_and_the_gain() {
    let mut game = veteran_game(VerbosityLevel::Verbose);
    GameLoop::new(&mut game).with_max_turns(1).run().unwrap();

    let entries = game.logger.entries();
    let position = |needle: &str| {
        entries
            .iter()
            .position(|line| line == needle)
            .unwrap_or_else(|| panic!("transcript is missing {needle:?}"))
    };

    let turn = position("=== Turn 1 ===");
    let draw = position("  draw Toxic Deluge");
    let cast = position("  cast Lunarch Veteran ({W})");
    let trigger = position("    trigger: Lunarch Veteran -> GainLife(1)");
    let gain = position("    gain 1 life (now 41)");

    assert!(turn < draw);
    assert!(draw < cast);
    assert!(cast < trigger);
    assert!(trigger < gain);
}

/// Zone transitions never create or destroy cards.
#[test]
fn test_conservation_across_a_full_turn() {
    let mut game = veteran_game(VerbosityLevel::Silent);
    let zone_total = |game: &GameState| {
        game.library.len()
            + game.hand.len()
            + game.battlefield.len()
            + game.graveyard.len()
            + game.command.len()
    };

    assert_eq!(zone_total(&game), 5);
    GameLoop::new(&mut game).with_max_turns(1).run().unwrap();
    assert_eq!(zone_total(&game), 5);
}

/// The stock decklist plays out a full ten-turn game: snapshots arrive
/// in turn order, the hand is never over seven after cleanup, and drain
/// damage only accumulates.
#[test]
fn test_default_deck_runs_ten_turns() {
    let config = SimConfig {
        turns: 10,
        runs: 1,
        seed: Some(0xA11A),
        ..SimConfig::default()
    };
    let deck = Decklist::default_list();
    let outcome = run_one_game(&config, &deck).unwrap();

    assert_eq!(outcome.turns_completed, 10);
    assert_eq!(outcome.end_reason, RunEndReason::TurnLimitReached);
    assert_eq!(outcome.snapshots.len(), 10);

    let mut last_damage = 0;
    for (i, snap) in outcome.snapshots.iter().enumerate() {
        assert_eq!(snap.turn as usize, i + 1);
        assert!(snap.hand_size <= 7);
        assert!(snap.damage_to_opponents >= last_damage);
        last_damage = snap.damage_to_opponents;
    }
}

/// With the opponent model on, opposing casts and removal feed the
/// player's triggers but never stop the game from finishing.
#[test]
fn test_opponent_pressure_still_completes() {
    let config = SimConfig {
        turns: 10,
        runs: 1,
        seed: Some(0xA11A),
        opponent: Some(OpponentConfig::default()),
        ..SimConfig::default()
    };
    let deck = Decklist::default_list();
    let outcome = run_one_game(&config, &deck).unwrap();

    assert_eq!(outcome.turns_completed, 10);
    assert_eq!(outcome.end_reason, RunEndReason::TurnLimitReached);
}

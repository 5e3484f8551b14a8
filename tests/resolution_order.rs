//! Trigger-engine ordering guarantees, observed through the game
//! transcript.
//!
//! These tests register triggers by hand on ability-free cards so the
//! ordering under test is exactly the ordering the engine produced,
//! with nothing contributed by printed card abilities.

use std::sync::Arc;

use soulsim::catalog::{Catalog, TriggerChances};
use soulsim::game::{
    EffectAction, EffectAmount, GameEvent, GameLogger, GameState, OutputMode, Owner, Step,
    TriggerWhen, VerbosityLevel,
};
use soulsim::SimError;

fn transcript_game() -> GameState {
    let catalog = Arc::new(Catalog::new(&TriggerChances::default()));
    let logger = GameLogger::new(VerbosityLevel::Verbose).with_output(OutputMode::Memory);
    GameState::new(catalog, logger)
}

/// Put a card straight onto the battlefield without registering its
/// printed abilities.
fn on_battlefield(game: &mut GameState, name: &str) -> soulsim::core::CardId {
    let id = game.create_card(name).unwrap();
    game.battlefield.add(id);
    id
}

/// Source names of resolved triggers, in transcript order.
fn resolved_sources(game: &GameState) -> Vec<String> {
    game.logger
        .entries()
        .iter()
        .filter_map(|line| {
            let rest = line.trim_start().strip_prefix("trigger: ")?;
            let (name, _) = rest.split_once(" -> ")?;
            Some(name.to_string())
        })
        .collect()
}

/// Resolving a trigger that emits a new event schedules that event's
/// triggers ahead of everything already waiting: emit [A, B] where A's
/// trigger causes C, and the order is A, C, B.
#[test]
fn test_caused_triggers_resolve_before_older_pending_ones() {
    let mut game = transcript_game();
    let a = on_battlefield(&mut game, "Lotho, Corrupt Shirriff");
    let c = on_battlefield(&mut game, "Shadowspear");
    let b = on_battlefield(&mut game, "Skullclamp");

    game.engine
        .register(a, TriggerWhen::StartOfTurn, EffectAction::GainLife(1));
    game.engine.register(
        c,
        TriggerWhen::LifeGained,
        EffectAction::AddCounters(EffectAmount::Fixed(3)),
    );
    game.engine.register(
        b,
        TriggerWhen::MySpellCast,
        EffectAction::AddCounters(EffectAmount::Fixed(5)),
    );

    game.engine.emit(GameEvent::StepBegan { step: Step::Upkeep });
    game.engine.emit(GameEvent::SpellCast {
        owner: Owner::Player,
    });
    game.resolve_all().unwrap();

    assert_eq!(
        resolved_sources(&game),
        vec!["Lotho, Corrupt Shirriff", "Shadowspear", "Skullclamp"]
    );
    assert_eq!(game.life, 41);
    assert_eq!(game.cards.get(c).unwrap().counters, 3);
    assert_eq!(game.cards.get(b).unwrap().counters, 5);
    assert!(game.engine.is_quiescent());
}

/// Triggers that fire off the same event resolve in the order their
/// sources registered, however the stack shuffles them internally.
#[test]
fn test_siblings_resolve_in_registration_order() {
    let mut game = transcript_game();
    let first = on_battlefield(&mut game, "Skullclamp");
    let second = on_battlefield(&mut game, "Lotho, Corrupt Shirriff");
    let third = on_battlefield(&mut game, "Shadowspear");

    for id in [first, second, third] {
        game.engine.register(
            id,
            TriggerWhen::LifeGained,
            EffectAction::AddCounters(EffectAmount::EventAmount),
        );
    }

    game.engine.emit(GameEvent::LifeGained { amount: 2 });
    game.resolve_all().unwrap();

    assert_eq!(
        resolved_sources(&game),
        vec!["Skullclamp", "Lotho, Corrupt Shirriff", "Shadowspear"]
    );
    for id in [first, second, third] {
        assert_eq!(game.cards.get(id).unwrap().counters, 2);
    }
}

/// Events nobody listens to drain from the queue without a trace.
#[test]
fn test_unmatched_events_are_discarded() {
    let mut game = transcript_game();
    game.engine.emit(GameEvent::LifeGained { amount: 5 });
    game.engine.emit(GameEvent::RemovalCast);

    game.resolve_all().unwrap();

    assert!(game.engine.is_quiescent());
    assert!(resolved_sources(&game).is_empty());
    // The gain was an event, not an effect; life is untouched.
    assert_eq!(game.life, 40);
}

/// An entry whose source left the battlefield after it was stacked
/// resolves as a silent no-op.
#[test]
fn test_stacked_trigger_fizzles_when_its_source_dies_first() {
    let mut game = transcript_game();
    let martyr = on_battlefield(&mut game, "Lotho, Corrupt Shirriff");

    // First the source dies, then its second trigger comes up.
    game.engine.register(
        martyr,
        TriggerWhen::LifeGained,
        EffectAction::SacrificeToProtect,
    );
    game.engine.register(
        martyr,
        TriggerWhen::LifeGained,
        EffectAction::AddCounters(EffectAmount::Fixed(7)),
    );

    game.engine.emit(GameEvent::LifeGained { amount: 1 });
    game.resolve_all().unwrap();

    assert!(!game.battlefield.contains(martyr));
    assert!(game.graveyard.contains(martyr));
    // Only the sacrifice resolved; the counter trigger fizzled.
    assert_eq!(resolved_sources(&game), vec!["Lotho, Corrupt Shirriff"]);
    assert!(game
        .logger
        .entries()
        .iter()
        .any(|line| line.contains("fizzles")));
    assert_eq!(game.cards.get(martyr).unwrap().counters, 0);
}

/// A self-feeding trigger loop is cut off by the resolution step limit
/// and reported as a run-ending condition.
#[test]
fn test_feedback_loop_hits_the_step_limit() {
    let mut game = transcript_game().with_max_resolution_steps(25);
    let looper = on_battlefield(&mut game, "Lotho, Corrupt Shirriff");
    game.engine
        .register(looper, TriggerWhen::LifeGained, EffectAction::GainLife(1));

    game.engine.emit(GameEvent::LifeGained { amount: 1 });
    let err = game.resolve_all().unwrap_err();

    assert!(matches!(err, SimError::ResolutionLimitExceeded(25)));
    assert!(err.ends_run());
}

//! The turn driver: runs steps in order, pilots the deck through its
//! main phase, and captures one snapshot per completed turn.

use std::mem;

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::core::CardId;
use crate::error::{Result, SimError};
use crate::game::events::GameEvent;
use crate::game::opponent::OpponentModel;
use crate::game::phase::Step;
use crate::game::state::GameState;
use crate::log_if_verbose;

/// Board metrics recorded at the end of each turn, after discard.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TurnSnapshot {
    pub turn: u32,
    pub life: i32,
    pub creatures: u32,
    pub total_power: i32,
    pub total_toughness: i32,
    /// Cumulative across the whole game, never reset.
    pub damage_to_opponents: u64,
    pub hand_size: u32,
    pub graveyard_size: u32,
    pub graveyard_creatures: u32,
}

/// Why a run stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunEndReason {
    TurnLimitReached,
    LibraryEmptied,
    ResolutionLimitExceeded,
}

/// The result of one complete run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunOutcome {
    pub turns_completed: u32,
    pub end_reason: RunEndReason,
    pub snapshots: Vec<TurnSnapshot>,
}

/// Drives a [`GameState`] through turns until the turn limit or a
/// terminal condition. A drained library or a runaway trigger cascade
/// truncates the run; those are outcomes, not errors.
pub struct GameLoop<'a> {
    game: &'a mut GameState,
    max_turns: u32,
    opponent: Option<OpponentModel>,
    snapshots: Vec<TurnSnapshot>,
}

impl<'a> GameLoop<'a> {
    pub fn new(game: &'a mut GameState) -> Self {
        GameLoop {
            game,
            max_turns: 10,
            opponent: None,
            snapshots: Vec::new(),
        }
    }

    pub fn with_max_turns(mut self, max_turns: u32) -> Self {
        self.max_turns = max_turns;
        self
    }

    pub fn with_opponent(mut self, opponent: OpponentModel) -> Self {
        self.opponent = Some(opponent);
        self
    }

    pub fn run(mut self) -> Result<RunOutcome> {
        let mut end_reason = RunEndReason::TurnLimitReached;
        while self.game.turn.turn_number <= self.max_turns {
            match self.run_turn() {
                Ok(()) => {}
                Err(SimError::EmptyLibrary) => {
                    self.game.logger.minimal("run ends: library is empty");
                    end_reason = RunEndReason::LibraryEmptied;
                    break;
                }
                Err(SimError::ResolutionLimitExceeded(limit)) => {
                    self.game
                        .logger
                        .minimal(&format!("run ends: trigger cascade passed {} steps", limit));
                    end_reason = RunEndReason::ResolutionLimitExceeded;
                    break;
                }
                Err(e) => return Err(e),
            }
        }
        Ok(RunOutcome {
            turns_completed: self.snapshots.len() as u32,
            end_reason,
            snapshots: mem::take(&mut self.snapshots),
        })
    }

    fn run_turn(&mut self) -> Result<()> {
        loop {
            self.execute_step()?;
            if !self.game.turn.advance_step() {
                break;
            }
        }
        if let Some(ref opponent) = self.opponent {
            opponent.take_turn(self.game)?;
        }
        self.game.turn.next_turn();
        Ok(())
    }

    /// One step: the step-began event goes out first, the step's builtin
    /// action runs, then triggers resolve to quiescence before the turn
    /// advances.
    fn execute_step(&mut self) -> Result<()> {
        let step = self.game.turn.current_step;
        // Mana does not carry across step boundaries.
        self.game.mana_pool.clear();
        self.game.engine.emit(GameEvent::StepBegan { step });
        match step {
            Step::Untap => self.untap_step()?,
            Step::Upkeep | Step::Combat | Step::Main2 | Step::End => {}
            Step::Draw => {
                let card = self.game.draw_card()?;
                #[cfg(feature = "verbose-logging")]
                if let Ok(c) = self.game.cards.get(card) {
                    self.game.logger.verbose(&format!("  draw {}", c.name));
                }
                #[cfg(not(feature = "verbose-logging"))]
                let _ = card;
            }
            Step::Main1 => self.main_phase()?,
            Step::Cleanup => self.cleanup_step(),
        }
        self.game.resolve_all()
    }

    fn untap_step(&mut self) -> Result<()> {
        self.game
            .logger
            .normal(&format!("=== Turn {} ===", self.game.turn.turn_number));
        let ids: SmallVec<[CardId; 16]> = self.game.battlefield.iter().copied().collect();
        for id in ids {
            self.game.cards.get_mut(id)?.untap();
        }
        self.game.lands_played_this_turn = 0;
        self.game.spells_cast_this_turn = 0;
        self.game.life_gained_this_turn = 0;
        self.game.recursion_used_this_turn = false;
        self.game.pending_removal_countered = false;
        Ok(())
    }

    /// The casting autopilot. Each action resolves its triggers before
    /// the next action, so storm-style counts see earlier casts.
    fn main_phase(&mut self) -> Result<()> {
        self.play_a_land()?;
        self.cast_commander_if_able()?;
        self.cast_spells()?;
        if self.game.recast_from_graveyard()?.is_some() {
            self.game.resolve_all()?;
        }
        Ok(())
    }

    fn play_a_land(&mut self) -> Result<()> {
        let mut hand: Vec<CardId> = self.game.hand.cards().to_vec();
        hand.shuffle(&mut *self.game.rng.borrow_mut());
        let land = hand.into_iter().find(|id| {
            self.game
                .cards
                .get(*id)
                .map(|c| c.is_land())
                .unwrap_or(false)
        });
        if let Some(id) = land {
            self.game.play_land(id)?;
            self.game.resolve_all()?;
        }
        Ok(())
    }

    fn cast_commander_if_able(&mut self) -> Result<()> {
        let commander = match self.game.commander {
            Some(id) => id,
            None => return Ok(()),
        };
        if !self.game.command.contains(commander) {
            return Ok(());
        }
        let cost = self.game.commander_cost()?;
        if self.game.can_afford(&cost) {
            self.game.cast_commander()?;
            self.game.resolve_all()?;
        }
        Ok(())
    }

    /// One pass over a shuffled copy of the hand, casting every
    /// affordable permanent. Cards drawn mid-pass wait for next turn.
    fn cast_spells(&mut self) -> Result<()> {
        let mut hand: Vec<CardId> = self.game.hand.cards().to_vec();
        hand.shuffle(&mut *self.game.rng.borrow_mut());
        for id in hand {
            let castable = self
                .game
                .cards
                .get(id)
                .map(|c| c.is_permanent() && !c.is_land())
                .unwrap_or(false);
            if !castable {
                continue;
            }
            match self.game.cast_from_hand(id) {
                Ok(()) => self.game.resolve_all()?,
                Err(SimError::InsufficientMana(_)) => {}
                Err(e) => return Err(e),
            }
        }
        Ok(())
    }

    /// Discard down to seven at random, empty the pool, snapshot.
    fn cleanup_step(&mut self) {
        while self.game.hand.len() > 7 {
            let idx = self
                .game
                .rng
                .borrow_mut()
                .gen_range(0..self.game.hand.len());
            if let Some(id) = self.game.hand.remove_at(idx) {
                self.game.graveyard.add(id);
                log_if_verbose!(self.game.logger, "  discard card {}", id);
            }
        }
        self.game.mana_pool.clear();
        self.capture_snapshot();
    }

    fn capture_snapshot(&mut self) {
        let game = &*self.game;
        let mut creatures = 0u32;
        let mut total_power = 0i32;
        let mut total_toughness = 0i32;
        for id in game.battlefield.iter() {
            if let Ok(card) = game.cards.get(*id) {
                if card.is_creature() {
                    creatures += 1;
                    total_power += card.current_power();
                    total_toughness += card.current_toughness();
                }
            }
        }
        let graveyard_creatures = game
            .graveyard
            .iter()
            .filter(|id| {
                game.cards
                    .get(**id)
                    .map(|c| c.is_creature())
                    .unwrap_or(false)
            })
            .count() as u32;
        self.snapshots.push(TurnSnapshot {
            turn: game.turn.turn_number,
            life: game.life,
            creatures,
            total_power,
            total_toughness,
            damage_to_opponents: game.damage_to_opponents,
            hand_size: game.hand.len() as u32,
            graveyard_size: game.graveyard.len() as u32,
            graveyard_creatures,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Catalog, TriggerChances};
    use crate::game::logger::GameLogger;
    use crate::game::triggers::TriggerWhen;
    use crate::game::actions::EffectAction;
    use std::sync::Arc;

    fn test_game() -> GameState {
        let catalog = Arc::new(Catalog::new(&TriggerChances::default()));
        GameState::new(catalog, GameLogger::silent())
    }

    fn stock_library(game: &mut GameState, name: &str, count: usize) {
        for _ in 0..count {
            let id = game.create_card(name).unwrap();
            game.library.add(id);
        }
    }

    #[test]
    fn test_turn_draws_and_plays_a_land() {
        let mut game = test_game();
        stock_library(&mut game, "Plains", 5);
        let in_hand = game.create_card("Plains").unwrap();
        game.hand.add(in_hand);

        let outcome = GameLoop::new(&mut game).with_max_turns(1).run().unwrap();

        assert_eq!(outcome.end_reason, RunEndReason::TurnLimitReached);
        assert_eq!(outcome.turns_completed, 1);
        // Drew one, played one.
        assert_eq!(game.battlefield.len(), 1);
        assert_eq!(game.hand.len(), 1);
        assert_eq!(outcome.snapshots[0].hand_size, 1);
    }

    #[test]
    fn test_autopilot_casts_affordable_spells() {
        let mut game = test_game();
        stock_library(&mut game, "Plains", 5);
        let land = game.create_card("Plains").unwrap();
        let warden = game.create_card("Soul Warden").unwrap();
        game.hand.add(land);
        game.hand.add(warden);

        GameLoop::new(&mut game).with_max_turns(1).run().unwrap();

        assert!(game.battlefield.contains(warden));
        assert_eq!(game.spells_cast_this_turn, 1);
    }

    #[test]
    fn test_commander_cast_when_affordable() {
        let mut game = test_game();
        let amalia = game.create_card("Amalia Benavides Aguirre").unwrap();
        game.command.add(amalia);
        game.commander = Some(amalia);
        // Two lands already down cover {W}{B}.
        for name in ["Plains", "Swamp"] {
            let id = game.create_card(name).unwrap();
            game.battlefield.add(id);
        }
        stock_library(&mut game, "Plains", 5);

        GameLoop::new(&mut game).with_max_turns(1).run().unwrap();

        assert!(game.battlefield.contains(amalia));
        assert_eq!(game.commander_casts, 1);
    }

    #[test]
    fn test_empty_library_truncates_run() {
        let mut game = test_game();
        // Nothing to draw on turn one.
        let outcome = GameLoop::new(&mut game).with_max_turns(5).run().unwrap();
        assert_eq!(outcome.end_reason, RunEndReason::LibraryEmptied);
        assert_eq!(outcome.turns_completed, 0);
        assert!(outcome.snapshots.is_empty());
    }

    #[test]
    fn test_discards_to_seven_before_snapshot() {
        let mut game = test_game();
        stock_library(&mut game, "Plains", 5);
        // Sorceries never get cast, so these clog the hand.
        for _ in 0..10 {
            let id = game.create_card("Toxic Deluge").unwrap();
            game.hand.add(id);
        }

        let outcome = GameLoop::new(&mut game).with_max_turns(1).run().unwrap();

        // Drew a Plains and played it; the uncastable ten discard to seven.
        assert_eq!(game.hand.len(), 7);
        assert_eq!(outcome.snapshots[0].hand_size, 7);
        assert_eq!(outcome.snapshots[0].graveyard_size, 3);
    }

    #[test]
    fn test_snapshots_one_per_turn_in_order() {
        let mut game = test_game();
        stock_library(&mut game, "Plains", 10);
        let outcome = GameLoop::new(&mut game).with_max_turns(3).run().unwrap();
        assert_eq!(outcome.turns_completed, 3);
        let turns: Vec<u32> = outcome.snapshots.iter().map(|s| s.turn).collect();
        assert_eq!(turns, vec![1, 2, 3]);
    }

    #[test]
    fn test_runaway_cascade_truncates_run() {
        let mut game = test_game();
        game.max_resolution_steps = 50;
        stock_library(&mut game, "Plains", 5);
        // A hand-made feedback loop: every life gain causes another.
        let id = game.create_card("Shadowspear").unwrap();
        game.battlefield.add(id);
        game.engine
            .register(id, TriggerWhen::StartOfTurn, EffectAction::GainLife(1));
        game.engine
            .register(id, TriggerWhen::LifeGained, EffectAction::GainLife(1));

        let outcome = GameLoop::new(&mut game).with_max_turns(3).run().unwrap();
        assert_eq!(outcome.end_reason, RunEndReason::ResolutionLimitExceeded);
        assert_eq!(outcome.turns_completed, 0);
    }

    #[test]
    fn test_damage_accumulates_across_turns() {
        let mut game = test_game();
        stock_library(&mut game, "Plains", 10);
        let elas = game.create_card("Elas il-Kor, Sadistic Pilgrim").unwrap();
        game.hand.add(elas);
        game.enter_battlefield(elas, crate::zones::Zone::Hand).unwrap();
        game.resolve_all().unwrap();
        let drained = game.damage_to_opponents;
        assert!(drained > 0);

        let outcome = GameLoop::new(&mut game).with_max_turns(2).run().unwrap();
        // A monotone series: cumulative damage never goes down.
        let mut last = 0;
        for snap in &outcome.snapshots {
            assert!(snap.damage_to_opponents >= last);
            last = snap.damage_to_opponents;
        }
        assert!(last >= drained);
    }
}

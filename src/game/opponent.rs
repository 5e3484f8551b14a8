//! The opponent pressure model.
//!
//! Opponents hold no cards. They are a stream of events whose per-turn
//! counts follow a capped geometric distribution, ramped over the game
//! by a scaling formula. The player's triggers react to the events the
//! same way they react to the player's own.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::game::events::{GameEvent, Owner};
use crate::game::state::GameState;

/// Rates and per-turn caps for each category of opponent action.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpponentConfig {
    pub land_rate: f64,
    pub creature_rate: f64,
    pub death_rate: f64,
    pub removal_rate: f64,
    pub boardwipe_rate: f64,
    /// Total modeled opponent board size; creature plays stop here.
    pub max_creatures: u32,
    pub max_creature_plays: u32,
    pub max_deaths: u32,
    pub max_removals: u32,
    pub max_boardwipes: u32,
    pub scaling: ScalingConfig,
}

impl Default for OpponentConfig {
    fn default() -> Self {
        OpponentConfig {
            land_rate: 0.85,
            creature_rate: 0.70,
            death_rate: 0.15,
            removal_rate: 0.10,
            boardwipe_rate: 0.05,
            max_creatures: 24,
            max_creature_plays: 3,
            max_deaths: 2,
            max_removals: 2,
            max_boardwipes: 1,
            scaling: ScalingConfig::default(),
        }
    }
}

/// How opponent pressure ramps as the game goes on.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScalingConfig {
    pub base: f64,
    /// Ceiling on the multiplier.
    pub max: f64,
    pub start_turn: u32,
    pub formula: ScalingFormula,
}

impl Default for ScalingConfig {
    fn default() -> Self {
        ScalingConfig {
            base: 0.1,
            max: 4.0,
            start_turn: 1,
            formula: ScalingFormula::Exponential,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScalingFormula {
    Linear,
    Exponential,
    Logarithmic,
}

impl ScalingConfig {
    /// Pressure multiplier for `turn`. 1.0 before the ramp begins.
    pub fn factor(&self, turn: u32) -> f64 {
        if turn < self.start_turn {
            return 1.0;
        }
        let t = (turn - self.start_turn + 1) as f64;
        let raw = match self.formula {
            ScalingFormula::Linear => 1.0 + self.base * t,
            ScalingFormula::Exponential => 1.0 + self.base * ((0.5 * t).exp() - 1.0),
            ScalingFormula::Logarithmic => 1.0 + self.base * (t + 1.0).ln(),
        };
        raw.min(self.max)
    }
}

/// Emits one modeled opponent turn's worth of events into a game.
#[derive(Debug, Clone, Default)]
pub struct OpponentModel {
    config: OpponentConfig,
}

impl OpponentModel {
    pub fn new(config: OpponentConfig) -> Self {
        OpponentModel { config }
    }

    pub fn take_turn(&self, game: &mut GameState) -> Result<()> {
        let factor = self.config.scaling.factor(game.turn.turn_number);

        if roll(game, self.config.land_rate) {
            game.engine.emit(GameEvent::LandPlayed {
                owner: Owner::Opponent,
            });
            game.resolve_all()?;
        }

        let plays = self.event_count(game, self.config.creature_rate, self.config.max_creature_plays, factor);
        for _ in 0..plays {
            if game.opponent_creatures >= self.config.max_creatures {
                break;
            }
            game.opponent_creatures += 1;
            game.engine.emit(GameEvent::SpellCast {
                owner: Owner::Opponent,
            });
            game.engine.emit(GameEvent::PermanentEntered {
                card: None,
                creature: true,
                owner: Owner::Opponent,
            });
            game.resolve_all()?;
        }

        let deaths = self.event_count(game, self.config.death_rate, self.config.max_deaths, factor);
        for _ in 0..deaths {
            if game.opponent_creatures == 0 {
                break;
            }
            game.opponent_creatures -= 1;
            game.engine.emit(GameEvent::CreatureDied {
                card: None,
                owner: Owner::Opponent,
            });
            game.resolve_all()?;
        }

        let removals = self.event_count(game, self.config.removal_rate, self.config.max_removals, factor);
        for _ in 0..removals {
            game.pending_removal_countered = false;
            game.engine.emit(GameEvent::RemovalCast);
            game.resolve_all()?;
            if !game.pending_removal_countered {
                let creatures = game.creatures_on_battlefield();
                let target = creatures.choose(&mut *game.rng.borrow_mut()).copied();
                if let Some(id) = target {
                    game.creature_dies(id)?;
                    game.resolve_all()?;
                }
            }
            game.pending_removal_countered = false;
        }

        let wipes = self.event_count(game, self.config.boardwipe_rate, self.config.max_boardwipes, factor);
        for _ in 0..wipes {
            game.pending_removal_countered = false;
            game.engine.emit(GameEvent::BoardwipeCast);
            game.resolve_all()?;
            if !game.pending_removal_countered {
                for id in game.creatures_on_battlefield() {
                    game.creature_dies(id)?;
                }
                game.resolve_all()?;
            }
            game.pending_removal_countered = false;
        }
        Ok(())
    }

    /// Number of events this turn: 0..=max with geometrically decaying
    /// weight past zero, the whole tail scaled up by `factor`.
    fn event_count(&self, game: &GameState, rate: f64, max: u32, factor: f64) -> u32 {
        if max == 0 {
            return 0;
        }
        let p = rate * factor;
        let mut weights = Vec::with_capacity(max as usize + 1);
        weights.push((1.0 - p).max(0.0));
        let mut w = p;
        for _ in 1..=max {
            weights.push(w);
            w *= 0.5;
        }
        let total: f64 = weights.iter().sum();
        let mut pick = game.rng.borrow_mut().gen::<f64>() * total;
        for (count, weight) in weights.iter().enumerate() {
            if pick < *weight {
                return count as u32;
            }
            pick -= *weight;
        }
        max
    }
}

fn roll(game: &GameState, chance: f64) -> bool {
    game.rng.borrow_mut().gen::<f64>() < chance
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Catalog, TriggerChances};
    use crate::game::logger::GameLogger;
    use crate::zones::Zone;
    use std::sync::Arc;

    fn test_game() -> GameState {
        let catalog = Arc::new(Catalog::new(&TriggerChances::default()));
        GameState::new(catalog, GameLogger::silent())
    }

    fn put_on_battlefield(game: &mut GameState, name: &str) -> crate::core::CardId {
        let id = game.create_card(name).unwrap();
        game.hand.add(id);
        game.enter_battlefield(id, Zone::Hand).unwrap();
        game.resolve_all().unwrap();
        id
    }

    /// A config that fires exactly the named category every turn and
    /// nothing else.
    fn forced(category: &str) -> OpponentConfig {
        let mut config = OpponentConfig {
            land_rate: 0.0,
            creature_rate: 0.0,
            death_rate: 0.0,
            removal_rate: 0.0,
            boardwipe_rate: 0.0,
            scaling: ScalingConfig {
                base: 0.0,
                max: 4.0,
                start_turn: 1,
                formula: ScalingFormula::Linear,
            },
            ..OpponentConfig::default()
        };
        match category {
            "creature" => {
                config.creature_rate = 1.0;
                config.max_creature_plays = 1;
            }
            "removal" => {
                config.removal_rate = 1.0;
                config.max_removals = 1;
            }
            "boardwipe" => {
                config.boardwipe_rate = 1.0;
                config.max_boardwipes = 1;
            }
            _ => panic!("unknown category {}", category),
        }
        config
    }

    #[test]
    fn test_scaling_before_start_turn_is_flat() {
        let scaling = ScalingConfig {
            base: 0.5,
            max: 4.0,
            start_turn: 5,
            formula: ScalingFormula::Linear,
        };
        assert_eq!(scaling.factor(1), 1.0);
        assert_eq!(scaling.factor(4), 1.0);
        assert!(scaling.factor(5) > 1.0);
    }

    #[test]
    fn test_linear_scaling_grows_by_base() {
        let scaling = ScalingConfig {
            base: 0.1,
            max: 4.0,
            start_turn: 1,
            formula: ScalingFormula::Linear,
        };
        assert!((scaling.factor(1) - 1.1).abs() < 1e-9);
        assert!((scaling.factor(10) - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_exponential_scaling_hits_the_cap() {
        let scaling = ScalingConfig::default();
        assert_eq!(scaling.factor(30), 4.0);
    }

    #[test]
    fn test_event_count_zero_rate_means_zero_events() {
        let game = test_game();
        let model = OpponentModel::default();
        for _ in 0..50 {
            assert_eq!(model.event_count(&game, 0.0, 3, 1.0), 0);
        }
    }

    #[test]
    fn test_event_count_saturated_rate_always_fires() {
        let game = test_game();
        let model = OpponentModel::default();
        for _ in 0..50 {
            let n = model.event_count(&game, 1.0, 3, 1.0);
            assert!(n >= 1 && n <= 3);
        }
    }

    #[test]
    fn test_opponent_creature_feeds_soul_warden() {
        let mut game = test_game();
        put_on_battlefield(&mut game, "Soul Warden");
        put_on_battlefield(&mut game, "Authority of the Consuls");
        let model = OpponentModel::new(forced("creature"));

        model.take_turn(&mut game).unwrap();

        // One opponent creature: Soul Warden and Authority each gain 1.
        assert_eq!(game.opponent_creatures, 1);
        assert_eq!(game.life, 42);
    }

    #[test]
    fn test_removal_kills_a_random_creature() {
        let mut game = test_game();
        let warden = put_on_battlefield(&mut game, "Soul Warden");
        let model = OpponentModel::new(forced("removal"));

        model.take_turn(&mut game).unwrap();

        assert!(!game.battlefield.contains(warden));
        assert!(game.graveyard.contains(warden));
    }

    #[test]
    fn test_mother_of_runes_counters_removal() {
        let mut game = test_game();
        let warden = put_on_battlefield(&mut game, "Soul Warden");
        put_on_battlefield(&mut game, "Mother of Runes");
        let model = OpponentModel::new(forced("removal"));

        model.take_turn(&mut game).unwrap();

        assert!(game.battlefield.contains(warden));
        assert!(game.graveyard.is_empty());
    }

    #[test]
    fn test_selfless_spirit_soaks_the_boardwipe() {
        let mut game = test_game();
        let warden = put_on_battlefield(&mut game, "Soul Warden");
        let spirit = put_on_battlefield(&mut game, "Selfless Spirit");
        let model = OpponentModel::new(forced("boardwipe"));

        model.take_turn(&mut game).unwrap();

        // The spirit went down so everything else stands.
        assert!(game.battlefield.contains(warden));
        assert!(game.graveyard.contains(spirit));
    }

    #[test]
    fn test_boardwipe_returns_commander_to_command_zone() {
        let mut game = test_game();
        let amalia = put_on_battlefield(&mut game, "Amalia Benavides Aguirre");
        game.commander = Some(amalia);
        let model = OpponentModel::new(forced("boardwipe"));

        model.take_turn(&mut game).unwrap();

        assert!(game.command.contains(amalia));
        assert!(!game.graveyard.contains(amalia));
    }
}

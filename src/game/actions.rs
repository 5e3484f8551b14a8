//! Game actions and the trigger resolver.
//!
//! Everything that changes the game — casting, land drops, life changes,
//! deaths, and the resolution of stack entries — lives here as methods on
//! `GameState`. Effects are a closed enum interpreted by `apply_effect`;
//! they can emit events but have no way to re-enter `resolve_all`, so
//! resolution is never reentrant.

use rand::seq::SliceRandom;
use rand::Rng;
use smallvec::SmallVec;

use crate::core::{CardId, Color, ManaCost};
use crate::error::{Result, SimError};
use crate::game::events::{GameEvent, Owner};
use crate::game::state::{GameState, OPPONENT_COUNT};
use crate::game::triggers::StackEntry;
use crate::log_if_verbose;
use crate::zones::Zone;

/// How much an effect applies: a printed number, or the amount carried by
/// the life-gain event that fired it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EffectAmount {
    Fixed(u32),
    EventAmount,
}

impl EffectAmount {
    pub fn resolve(&self, event: &GameEvent) -> u32 {
        match self {
            EffectAmount::Fixed(n) => *n,
            EffectAmount::EventAmount => event.life_amount().unwrap_or(0),
        }
    }
}

/// The closed vocabulary of triggered effects.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EffectAction {
    GainLife(u32),
    /// Life gain that fires no life-gained event (Cleric Class's rider).
    GainLifeSilent(u32),
    GainLifePerChance { chance: f64, amount: u32 },
    /// Drain: opponents lose life, tracked as cumulative damage. `all`
    /// hits every opponent.
    OpponentsLoseLife { amount: EffectAmount, all: bool },
    /// +1/+1 counters on the source.
    AddCounters(EffectAmount),
    /// +1/+1 counters on every creature the player controls.
    AddCountersToAll(EffectAmount),
    /// Reveal the top card: lands go to hand, anything else to the
    /// graveyard with a counter on the source.
    Explore,
    Draw(u32),
    DrawPerChance { chance: f64 },
    /// Draw one and lose life equal to its total cost (Dark Confidant).
    DrawPayLife,
    CreateToken,
    CreateTokenPerChance { chance: f64 },
    /// A token at end of turn if any life was gained this turn.
    TokenIfLifeGainedThisTurn,
    /// Tokens equal to the source's power, counted at resolution.
    TokensPerPower,
    /// Move the source's +1/+1 counters to the commander, or a random
    /// other creature (Essence Channeler's death trigger).
    TransferCountersOnDeath,
    /// Negate the opponent removal spell being resolved.
    CounterRemoval,
    /// Die, and negate the opponent removal or board wipe being resolved.
    SacrificeToProtect,
    /// Extort approximation: tap an untapped mana source to gain 1 life.
    TapLandForLife,
    /// Gain life equal to spells cast so far this turn (Aetherflux).
    GainLifePerSpellThisTurn,
}

impl GameState {
    // ---- trigger resolution ----

    /// Drain the resolution stack and the event queue to quiescence.
    ///
    /// After every resolved entry, the events it emitted are scheduled
    /// ahead of older pending events and exactly one event is dispatched
    /// before the next pop. This makes newly caused triggers resolve
    /// before older stacked ones while siblings of one event keep
    /// registration order.
    pub fn resolve_all(&mut self) -> Result<()> {
        let mut steps = 0usize;
        loop {
            if let Some(entry) = self.engine.pop_entry() {
                steps += 1;
                if steps > self.max_resolution_steps {
                    return Err(SimError::ResolutionLimitExceeded(self.max_resolution_steps));
                }
                let queued_before = self.engine.queue_len();
                self.apply_entry(&entry)?;
                let emitted = self.engine.queue_len() - queued_before;
                self.engine.prioritize_newest(emitted);
                self.dispatch_one();
            } else if self.engine.has_events() {
                self.dispatch_one();
            } else {
                return Ok(());
            }
        }
    }

    /// Dispatch the next queued event: push a stack entry for every
    /// matching registration, in reverse registration order so they
    /// resolve in registration order. Unmatched events are discarded.
    fn dispatch_one(&mut self) {
        let event = match self.engine.pop_event() {
            Some(e) => e,
            None => return,
        };
        let matched = self.engine.matching(&event);
        let delney = self.battlefield_has("Delney, Streetwise Lookout");
        for reg in matched.iter().rev() {
            let on_battlefield = self.battlefield.contains(reg.source);
            // A card's own death triggers fire even though it has left.
            let own_death = matches!(
                event,
                GameEvent::CreatureDied { card: Some(c), .. } if c == reg.source
            );
            if !on_battlefield && !own_death {
                continue;
            }
            let entry = StackEntry {
                source: reg.source,
                effect: reg.effect,
                event,
                requires_live_source: on_battlefield,
            };
            let copies = if delney && self.doubles_under_delney(reg.source) {
                2
            } else {
                1
            };
            for _ in 0..copies {
                self.engine.push_entry(entry);
            }
        }
        // The dying card's registrations end with its death event.
        if let GameEvent::CreatureDied { card: Some(c), .. } = event {
            self.engine.remove_for_source(c);
        }
    }

    /// Delney doubles triggers of creatures with base power 2 or less.
    fn doubles_under_delney(&self, source: CardId) -> bool {
        self.cards
            .get(source)
            .map(|c| c.is_creature() && c.power.unwrap_or(0) <= 2)
            .unwrap_or(false)
    }

    fn apply_entry(&mut self, entry: &StackEntry) -> Result<()> {
        if entry.requires_live_source && !self.battlefield.contains(entry.source) {
            log_if_verbose!(
                self.logger,
                "    (trigger from {} fizzles, source left the battlefield)",
                entry.source
            );
            return Ok(());
        }
        #[cfg(feature = "verbose-logging")]
        if let Ok(card) = self.cards.get(entry.source) {
            self.logger
                .verbose(&format!("    trigger: {} -> {:?}", card.name, entry.effect));
        }
        self.apply_effect(entry)
    }

    fn apply_effect(&mut self, entry: &StackEntry) -> Result<()> {
        let source = entry.source;
        match entry.effect {
            EffectAction::GainLife(n) => self.gain_life(n),
            EffectAction::GainLifeSilent(n) => {
                self.life += n as i32;
            }
            EffectAction::GainLifePerChance { chance, amount } => {
                if self.roll(chance) {
                    self.gain_life(amount);
                }
            }
            EffectAction::OpponentsLoseLife { amount, all } => {
                let n = amount.resolve(&entry.event);
                self.opponents_lose_life(n, all);
            }
            EffectAction::AddCounters(amount) => {
                let n = amount.resolve(&entry.event);
                if n > 0 {
                    self.cards.get_mut(source)?.add_counters(clamp_u16(n));
                }
            }
            EffectAction::AddCountersToAll(amount) => {
                let n = amount.resolve(&entry.event);
                if n > 0 {
                    for id in self.creatures_on_battlefield() {
                        self.cards.get_mut(id)?.add_counters(clamp_u16(n));
                    }
                }
            }
            EffectAction::Explore => self.explore(source)?,
            EffectAction::Draw(n) => {
                for _ in 0..n {
                    // Trigger draws from an empty library are misses, not
                    // run terminations.
                    match self.library.draw_top() {
                        Some(card) => self.hand.add(card),
                        None => break,
                    }
                }
            }
            EffectAction::DrawPerChance { chance } => {
                if self.roll(chance) {
                    if let Some(card) = self.library.draw_top() {
                        self.hand.add(card);
                    }
                }
            }
            EffectAction::DrawPayLife => {
                if let Some(card) = self.library.draw_top() {
                    self.hand.add(card);
                    let cmc = self.cards.get(card)?.cost.cmc();
                    self.lose_life(cmc);
                }
            }
            EffectAction::CreateToken => {
                self.create_token();
            }
            EffectAction::CreateTokenPerChance { chance } => {
                if self.roll(chance) {
                    self.create_token();
                }
            }
            EffectAction::TokenIfLifeGainedThisTurn => {
                if self.life_gained_this_turn > 0 {
                    self.create_token();
                }
            }
            EffectAction::TokensPerPower => {
                let count = self.cards.get(source)?.current_power().max(0) as u32;
                for _ in 0..count {
                    self.create_token();
                }
            }
            EffectAction::TransferCountersOnDeath => {
                let n = self.cards.get(source)?.counters;
                if n > 0 {
                    if let Some(target) = self.counter_transfer_target(source) {
                        self.cards.get_mut(target)?.add_counters(n);
                    }
                }
            }
            EffectAction::CounterRemoval => {
                self.pending_removal_countered = true;
            }
            EffectAction::SacrificeToProtect => {
                self.creature_dies(source)?;
                self.pending_removal_countered = true;
            }
            EffectAction::TapLandForLife => {
                let target = self
                    .battlefield
                    .iter()
                    .find(|id| {
                        self.cards
                            .get(**id)
                            .map(|c| c.is_mana_source() && !c.tapped)
                            .unwrap_or(false)
                    })
                    .copied();
                if let Some(id) = target {
                    self.cards.get_mut(id)?.tap()?;
                    self.gain_life(1);
                }
            }
            EffectAction::GainLifePerSpellThisTurn => {
                let n = self.spells_cast_this_turn;
                if n > 0 {
                    self.gain_life(n);
                }
            }
        }
        Ok(())
    }

    // ---- life and damage ----

    /// Gain life and emit the life-gained event that drives the deck.
    pub fn gain_life(&mut self, amount: u32) {
        if amount == 0 {
            return;
        }
        self.life += amount as i32;
        self.life_gained_this_turn += amount;
        self.engine.emit(GameEvent::LifeGained { amount });
        log_if_verbose!(self.logger, "    gain {} life (now {})", amount, self.life);
    }

    pub fn lose_life(&mut self, amount: u32) {
        self.life -= amount as i32;
    }

    fn opponents_lose_life(&mut self, amount: u32, all: bool) {
        if amount == 0 {
            return;
        }
        let hit = if all { OPPONENT_COUNT } else { 1 };
        self.damage_to_opponents += amount as u64 * hit;
    }

    // ---- zone transitions with their events ----

    /// Put a permanent onto the battlefield from `from`: pays any
    /// enter-the-battlefield life cost, registers the card's triggers,
    /// and emits the entered event.
    pub fn enter_battlefield(&mut self, id: CardId, from: Zone) -> Result<()> {
        self.move_card(id, from, Zone::Battlefield)?;
        let (creature, etb_life_cost) = {
            let card = self.cards.get_mut(id)?;
            card.tapped = card.enters_tapped;
            (card.is_creature(), card.etb_life_cost)
        };
        if etb_life_cost > 0 {
            self.lose_life(etb_life_cost as u32);
        }
        self.register_abilities(id)?;
        self.engine.emit(GameEvent::PermanentEntered {
            card: Some(id),
            creature,
            owner: Owner::Player,
        });
        Ok(())
    }

    fn register_abilities(&mut self, id: CardId) -> Result<()> {
        let name = self.cards.get(id)?.name.clone();
        // Tokens and test-only cards have no catalog entry and no
        // triggers.
        if let Some(def) = self.catalog.lookup(&name) {
            for ability in &def.abilities {
                self.engine.register(id, ability.when, ability.effect);
            }
        }
        Ok(())
    }

    /// A creature leaves the battlefield by dying. The commander returns
    /// to the command zone, tokens cease to exist, everything else goes
    /// to the graveyard. Death triggers fire off the emitted event.
    pub fn creature_dies(&mut self, id: CardId) -> Result<()> {
        if !self.battlefield.remove(id) {
            // Already gone: a board wipe can name a card twice.
            return Ok(());
        }
        let token = self.cards.get(id)?.token;
        if Some(id) == self.commander {
            self.command.add(id);
            log_if_verbose!(self.logger, "    commander returns to the command zone");
        } else if token {
            self.cards.remove(id);
        } else {
            self.graveyard.add(id);
        }
        self.engine.emit(GameEvent::CreatureDied {
            card: Some(id),
            owner: Owner::Player,
        });
        Ok(())
    }

    /// Create a 1/1 token on the battlefield. Enters like any permanent.
    pub fn create_token(&mut self) -> CardId {
        let id = self.create_token_card();
        self.battlefield.add(id);
        self.engine.emit(GameEvent::PermanentEntered {
            card: Some(id),
            creature: true,
            owner: Owner::Player,
        });
        log_if_verbose!(self.logger, "    create a 1/1 token");
        id
    }

    fn explore(&mut self, source: CardId) -> Result<()> {
        let top = match self.library.draw_top() {
            Some(c) => c,
            None => return Ok(()),
        };
        if self.cards.get(top)?.is_land() {
            self.hand.add(top);
            log_if_verbose!(self.logger, "    explore: land to hand");
        } else {
            self.graveyard.add(top);
            self.cards.get_mut(source)?.add_counters(1);
            log_if_verbose!(self.logger, "    explore: nonland binned, +1/+1 counter");
        }
        Ok(())
    }

    fn counter_transfer_target(&self, source: CardId) -> Option<CardId> {
        if let Some(commander) = self.commander {
            if self.battlefield.contains(commander) {
                return Some(commander);
            }
        }
        let candidates: Vec<CardId> = self
            .creatures_on_battlefield()
            .into_iter()
            .filter(|c| *c != source)
            .collect();
        candidates.choose(&mut *self.rng.borrow_mut()).copied()
    }

    fn roll(&self, chance: f64) -> bool {
        self.rng.borrow_mut().gen::<f64>() < chance
    }

    // ---- casting ----

    /// Cast a card from hand: pay its cost, then move it to the
    /// battlefield (permanents) or straight to the graveyard (instants
    /// and sorceries, which this deck never actually casts).
    pub fn cast_from_hand(&mut self, id: CardId) -> Result<()> {
        if !self.hand.contains(id) {
            return Err(SimError::InvalidZoneTransition(format!(
                "card {} is not in the hand",
                id
            )));
        }
        let (cost, permanent, name) = {
            let card = self.cards.get(id)?;
            (card.cost, card.is_permanent(), card.name.clone())
        };
        self.pay_for(&cost)?;
        self.spells_cast_this_turn += 1;
        self.logger
            .normal(&format!("  cast {} ({})", name, cost));
        self.engine.emit(GameEvent::SpellCast {
            owner: Owner::Player,
        });
        if permanent {
            self.enter_battlefield(id, Zone::Hand)?;
        } else {
            self.move_card(id, Zone::Hand, Zone::Graveyard)?;
        }
        Ok(())
    }

    /// Play a land from hand. One per turn.
    pub fn play_land(&mut self, id: CardId) -> Result<()> {
        if self.lands_played_this_turn >= 1 {
            return Err(SimError::IllegalAction(
                "already played a land this turn".to_string(),
            ));
        }
        if !self.hand.contains(id) {
            return Err(SimError::InvalidZoneTransition(format!(
                "card {} is not in the hand",
                id
            )));
        }
        let name = {
            let card = self.cards.get(id)?;
            if !card.is_land() {
                return Err(SimError::IllegalAction(format!(
                    "{} is not a land",
                    card.name
                )));
            }
            card.name.clone()
        };
        self.lands_played_this_turn += 1;
        self.logger.normal(&format!("  play land {}", name));
        self.enter_battlefield(id, Zone::Hand)?;
        self.engine.emit(GameEvent::LandPlayed {
            owner: Owner::Player,
        });
        Ok(())
    }

    /// The commander's cost including tax: two generic per previous cast
    /// from the command zone.
    pub fn commander_cost(&self) -> Result<ManaCost> {
        let id = self
            .commander
            .ok_or_else(|| SimError::IllegalAction("no commander in this game".to_string()))?;
        let base = self.cards.get(id)?.cost;
        let tax = (2 * self.commander_casts).min(u8::MAX as u32) as u8;
        Ok(base.plus_generic(tax))
    }

    /// Cast the commander from the command zone, tax included.
    pub fn cast_commander(&mut self) -> Result<()> {
        let id = self
            .commander
            .ok_or_else(|| SimError::IllegalAction("no commander in this game".to_string()))?;
        if !self.command.contains(id) {
            return Err(SimError::IllegalAction(
                "commander is not in the command zone".to_string(),
            ));
        }
        let cost = self.commander_cost()?;
        self.pay_for(&cost)?;
        self.commander_casts += 1;
        self.spells_cast_this_turn += 1;
        let name = self.cards.get(id)?.name.clone();
        self.logger
            .normal(&format!("  cast commander {} ({})", name, cost));
        self.engine.emit(GameEvent::SpellCast {
            owner: Owner::Player,
        });
        self.enter_battlefield(id, Zone::Command)?;
        Ok(())
    }

    /// Lurrus recursion: once per turn, recast the first creature of
    /// total cost two or less from the graveyard.
    pub fn recast_from_graveyard(&mut self) -> Result<Option<CardId>> {
        if self.recursion_used_this_turn || !self.battlefield_has("Lurrus of the Dream-Den") {
            return Ok(None);
        }
        let candidate = self
            .graveyard
            .iter()
            .find(|id| {
                self.cards
                    .get(**id)
                    .map(|c| c.is_creature() && c.cost.cmc() <= 2)
                    .unwrap_or(false)
            })
            .copied();
        let id = match candidate {
            Some(c) => c,
            None => return Ok(None),
        };
        let cost = self.cards.get(id)?.cost;
        if self.plan_payment(&cost).is_none() {
            return Ok(None);
        }
        self.pay_for(&cost)?;
        self.recursion_used_this_turn = true;
        self.spells_cast_this_turn += 1;
        let name = self.cards.get(id)?.name.clone();
        self.logger
            .normal(&format!("  recast {} from the graveyard", name));
        self.engine.emit(GameEvent::SpellCast {
            owner: Owner::Player,
        });
        self.enter_battlefield(id, Zone::Graveyard)?;
        Ok(Some(id))
    }

    // ---- mana payment ----

    /// Untapped mana sources with their producible colors, least
    /// flexible first (stable within a flexibility class).
    fn untapped_sources(&self) -> Vec<(CardId, SmallVec<[Color; 2]>)> {
        let mut sources: Vec<(CardId, SmallVec<[Color; 2]>)> = self
            .battlefield
            .iter()
            .filter_map(|id| {
                let card = self.cards.get(*id).ok()?;
                if card.is_mana_source() && !card.tapped && !card.produces.is_empty() {
                    Some((*id, card.produces.clone()))
                } else {
                    None
                }
            })
            .collect();
        sources.sort_by_key(|(_, colors)| colors.len());
        sources
    }

    /// Choose which sources to tap for `cost`, or None if it cannot be
    /// covered. Colored requirements are assigned before generic so a
    /// dual land is never wasted on generic while a basic could have
    /// paid it.
    pub fn plan_payment(&self, cost: &ManaCost) -> Option<Vec<(CardId, Color)>> {
        if cost.is_free() {
            return Some(Vec::new());
        }
        let sources = self.untapped_sources();
        let mut used = vec![false; sources.len()];
        let mut plan = Vec::with_capacity(cost.cmc() as usize);

        for color in [
            Color::White,
            Color::Blue,
            Color::Black,
            Color::Red,
            Color::Green,
            Color::Colorless,
        ] {
            for _ in 0..cost.colored(color) {
                let idx =
                    (0..sources.len()).find(|i| !used[*i] && sources[*i].1.contains(&color))?;
                used[idx] = true;
                plan.push((sources[idx].0, color));
            }
        }
        for _ in 0..cost.generic {
            let idx = (0..sources.len()).find(|i| !used[*i])?;
            used[idx] = true;
            plan.push((sources[idx].0, sources[idx].1[0]));
        }
        Some(plan)
    }

    pub fn can_afford(&self, cost: &ManaCost) -> bool {
        self.plan_payment(cost).is_some()
    }

    /// Tap sources and pay `cost`. All-or-nothing: on failure nothing is
    /// tapped and the pool is unchanged.
    pub fn pay_for(&mut self, cost: &ManaCost) -> Result<()> {
        let plan = self
            .plan_payment(cost)
            .ok_or_else(|| SimError::InsufficientMana(cost.to_string()))?;
        for (id, color) in plan {
            self.cards.get_mut(id)?.tap()?;
            self.mana_pool.add(color, 1);
        }
        self.mana_pool.pay_cost(cost)?;
        Ok(())
    }
}

fn clamp_u16(n: u32) -> u16 {
    n.min(u16::MAX as u32) as u16
}

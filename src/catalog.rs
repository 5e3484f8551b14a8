//! The card database.
//!
//! Every card the deck runs, with the costs, stats, and triggered
//! abilities the simulation models. Opponent-dependent abilities that
//! cannot be simulated exactly carry flat probabilities, collected in
//! [`TriggerChances`] so they stay configurable.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::core::{Card, CardId, CardType, Color, ManaCost};
use crate::error::{Result, SimError};
use crate::game::actions::{EffectAction, EffectAmount};
use crate::game::triggers::TriggerWhen;

/// Flat-rate approximations for abilities that depend on what the
/// opponents are doing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TriggerChances {
    /// Chance an opponent pays Esper Sentinel's tax rather than letting
    /// the draw happen.
    pub esper_pay_rate: f64,
    /// Chance an opponent land is nonbasic, for Spectrum Sentinel.
    pub nonbasic_land_rate: f64,
    pub kambal_rate: f64,
    pub leonin_rate: f64,
    pub conqueror_rate: f64,
}

impl Default for TriggerChances {
    fn default() -> Self {
        TriggerChances {
            esper_pay_rate: 0.2,
            nonbasic_land_rate: 0.25,
            kambal_rate: 0.2,
            leonin_rate: 0.1,
            conqueror_rate: 0.15,
        }
    }
}

/// One triggered ability: when it fires and what it does.
#[derive(Debug, Clone, Copy)]
pub struct Ability {
    pub when: TriggerWhen,
    pub effect: EffectAction,
}

/// The immutable definition a [`Card`] is stamped from.
#[derive(Debug, Clone)]
pub struct CardDef {
    pub name: &'static str,
    pub card_type: CardType,
    pub cost: ManaCost,
    pub produces: SmallVec<[Color; 2]>,
    pub power: Option<i8>,
    pub toughness: Option<i8>,
    pub enters_tapped: bool,
    pub etb_life_cost: u8,
    pub mana_source: bool,
    pub basic: bool,
    pub abilities: Vec<Ability>,
}

impl CardDef {
    fn new(name: &'static str, card_type: CardType, cost: ManaCost) -> Self {
        CardDef {
            name,
            card_type,
            cost,
            produces: SmallVec::new(),
            power: None,
            toughness: None,
            enters_tapped: false,
            etb_life_cost: 0,
            mana_source: false,
            basic: false,
            abilities: Vec::new(),
        }
    }

    fn land(name: &'static str, colors: &[Color]) -> Self {
        let mut def = Self::new(name, CardType::Land, ManaCost::default());
        def.produces = colors.iter().copied().collect();
        def
    }

    fn creature(name: &'static str, cost: ManaCost, power: i8, toughness: i8) -> Self {
        let mut def = Self::new(name, CardType::Creature, cost);
        def.power = Some(power);
        def.toughness = Some(toughness);
        def
    }

    fn on(mut self, when: TriggerWhen, effect: EffectAction) -> Self {
        self.abilities.push(Ability { when, effect });
        self
    }

    fn tapped(mut self) -> Self {
        self.enters_tapped = true;
        self
    }

    fn basic(mut self) -> Self {
        self.basic = true;
        self
    }

    fn life_cost(mut self, amount: u8) -> Self {
        self.etb_life_cost = amount;
        self
    }

    /// Nonland permanents that tap for mana.
    fn taps_for(mut self, colors: &[Color]) -> Self {
        self.mana_source = true;
        self.produces = colors.iter().copied().collect();
        self
    }
}

/// Name-keyed card definitions for one simulation setup.
pub struct Catalog {
    defs: FxHashMap<&'static str, CardDef>,
}

impl Catalog {
    pub fn new(chances: &TriggerChances) -> Self {
        let mut catalog = Catalog {
            defs: FxHashMap::default(),
        };
        for def in base_definitions(chances) {
            catalog.insert(def);
        }
        catalog
    }

    pub fn insert(&mut self, def: CardDef) {
        self.defs.insert(def.name, def);
    }

    pub fn lookup(&self, name: &str) -> Option<&CardDef> {
        self.defs.get(name)
    }

    pub fn get(&self, name: &str) -> Result<&CardDef> {
        self.lookup(name)
            .ok_or_else(|| SimError::UnknownCard(name.to_string()))
    }

    /// Stamp a fresh card instance from the named definition.
    pub fn instantiate(&self, name: &str, id: CardId) -> Result<Card> {
        let def = self.get(name)?;
        Ok(Card {
            id,
            name: def.name.to_string(),
            card_type: def.card_type,
            cost: def.cost,
            produces: def.produces.clone(),
            power: def.power,
            toughness: def.toughness,
            tapped: false,
            counters: 0,
            enters_tapped: def.enters_tapped,
            etb_life_cost: def.etb_life_cost,
            mana_source: def.mana_source,
            token: false,
        })
    }

    pub fn len(&self) -> usize {
        self.defs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.defs.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.defs.keys().copied()
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::new(&TriggerChances::default())
    }
}

fn mana(white: u8, black: u8, generic: u8) -> ManaCost {
    ManaCost {
        white,
        black,
        generic,
        ..ManaCost::default()
    }
}

fn base_definitions(chances: &TriggerChances) -> Vec<CardDef> {
    use CardType::{Artifact, Enchantment, Instant, Planeswalker, Sorcery};
    use Color::{Black, Colorless, White};
    use EffectAction::*;
    use EffectAmount::{EventAmount, Fixed};
    use TriggerWhen::*;

    vec![
        // Lands
        CardDef::land("Plains", &[White]).basic(),
        CardDef::land("Swamp", &[Black]).basic(),
        CardDef::land("Barren Moor", &[Black]).tapped(),
        CardDef::land("Brightclimb Pathway", &[White]),
        CardDef::land("Caves of Koilos", &[White, Black]),
        CardDef::land("Command Tower", &[White, Black]),
        CardDef::land("Exotic Orchard", &[White, Black]),
        CardDef::land("Fetid Heath", &[White, Black]),
        CardDef::land("Godless Shrine", &[White, Black]).life_cost(2),
        CardDef::land("Isolated Chapel", &[White, Black]),
        CardDef::land("Marsh Flats", &[White, Black]),
        CardDef::land("Radiant Fountain", &[White])
            .tapped()
            .on(SelfEntered, GainLife(2)),
        CardDef::land("Rogue's Passage", &[Colorless]),
        CardDef::land("Secluded Steppe", &[White]).tapped(),
        CardDef::land("Shattered Sanctum", &[White, Black]),
        CardDef::land("Shineshadow Snarl", &[White, Black]),
        CardDef::land("Shizo, Death's Storehouse", &[Black]),
        CardDef::land("Silent Clearing", &[White, Black]),
        CardDef::land("Tainted Field", &[White, Black]),
        CardDef::land("Urborg, Tomb of Yawgmoth", &[Black]),
        CardDef::land("Vault of Champions", &[White, Black]),
        CardDef::land("Vault of the Archangel", &[Colorless]),
        // Creatures
        CardDef::creature("Aerith Gainsborough", mana(1, 0, 0), 2, 2)
            .on(LifeGained, AddCounters(EventAmount)),
        CardDef::creature("Amalia Benavides Aguirre", mana(1, 1, 0), 1, 3)
            .on(LifeGained, Explore),
        CardDef::creature("Archangel of Thune", mana(2, 0, 3), 3, 4)
            .on(LifeGained, AddCountersToAll(EventAmount)),
        CardDef::creature("Archivist of Oghma", mana(1, 0, 1), 2, 2)
            .on(OppLibrarySearched, Draw(1))
            .on(OppLibrarySearched, GainLife(1)),
        CardDef::creature("Auriok Champion", mana(1, 0, 0), 1, 1)
            .on(AnyCreatureEntered, GainLife(1)),
        CardDef::creature("Blood Artist", mana(0, 1, 0), 0, 1)
            .on(AnyCreatureDied, GainLife(1)),
        CardDef::creature("Charismatic Conqueror", mana(1, 1, 0), 2, 2).on(
            OppCreatureEntered,
            CreateTokenPerChance {
                chance: chances.conqueror_rate,
            },
        ),
        CardDef::creature("Cruel Celebrant", mana(0, 1, 0), 1, 2)
            .on(AnyCreatureDied, GainLife(1)),
        CardDef::creature("Dark Confidant", mana(0, 1, 0), 2, 1).on(StartOfTurn, DrawPayLife),
        CardDef::creature("Daxos, Blessed by the Sun", mana(1, 0, 0), 2, 0)
            .on(MyCreatureEntered, GainLife(1))
            .on(MyCreatureDied, Draw(1)),
        CardDef::creature("Deathgreeter", mana(0, 1, 0), 1, 1)
            .on(AnyCreatureDied, GainLife(1)),
        CardDef::creature("Delney, Streetwise Lookout", mana(1, 0, 1), 2, 2),
        CardDef::creature("Elas il-Kor, Sadistic Pilgrim", mana(0, 1, 0), 2, 2).on(
            MyCreatureEntered,
            OpponentsLoseLife {
                amount: Fixed(1),
                all: true,
            },
        ),
        CardDef::creature("Elenda's Hierophant", mana(1, 0, 0), 1, 4)
            .on(SelfDied, TokensPerPower),
        CardDef::creature("Esper Sentinel", mana(1, 0, 0), 1, 1).on(
            OppSpellCast,
            DrawPerChance {
                chance: chances.esper_pay_rate,
            },
        ),
        CardDef::creature("Essence Channeler", mana(0, 0, 2), 2, 1)
            .on(AnyCreatureEntered, Draw(1))
            .on(SelfDied, TransferCountersOnDeath),
        CardDef::creature("Guide of Souls", mana(1, 0, 0), 1, 2)
            .on(MyCreatureEntered, GainLife(1)),
        CardDef::creature("Heliod, Sun-Crowned", mana(1, 0, 2), 5, 5)
            .on(LifeGained, AddCounters(EventAmount)),
        CardDef::creature("Hinterland Sanctifier", mana(1, 0, 0), 2, 1)
            .on(MyCreatureEntered, GainLife(1)),
        CardDef::creature("Kambal, Consul of Allocation", mana(1, 1, 0), 2, 3).on(
            OppSpellCast,
            GainLifePerChance {
                chance: chances.kambal_rate,
                amount: 2,
            },
        ),
        CardDef::creature("Karlov of the Ghost Council", mana(1, 1, 0), 2, 2)
            .on(LifeGained, AddCounters(EventAmount)),
        CardDef::creature("Leonin Elder", mana(1, 0, 0), 1, 1).on(
            AnySpellCast,
            GainLifePerChance {
                chance: chances.leonin_rate,
                amount: 1,
            },
        ),
        CardDef::creature("Lotho, Corrupt Shirriff", mana(1, 1, 0), 2, 1),
        CardDef::creature("Lunarch Veteran", mana(1, 0, 0), 1, 1)
            .on(MyCreatureEntered, GainLife(1)),
        CardDef::creature("Lurrus of the Dream-Den", mana(1, 1, 0), 3, 2)
            .on(AnyCreatureEntered, GainLife(1)),
        CardDef::creature("Marauding Blight-Priest", mana(0, 1, 1), 3, 2).on(
            LifeGained,
            OpponentsLoseLife {
                amount: EventAmount,
                all: true,
            },
        ),
        CardDef::creature("Mother of Runes", mana(1, 0, 0), 1, 1)
            .on(OppRemovalCast, CounterRemoval),
        CardDef::creature("Ocelot Pride", mana(1, 0, 0), 2, 2)
            .on(EndOfTurn, TokenIfLifeGainedThisTurn),
        CardDef::creature("Selfless Spirit", mana(1, 0, 0), 2, 1)
            .on(OppRemovalCast, SacrificeToProtect)
            .on(OppBoardwipeCast, SacrificeToProtect),
        CardDef::creature("Serra Ascendant", mana(1, 0, 0), 1, 1)
            .on(SelfEntered, AddCounters(Fixed(5))),
        CardDef::creature("Soul Warden", mana(1, 0, 0), 1, 1)
            .on(AnyCreatureEntered, GainLife(1)),
        CardDef::creature("Soul's Attendant", mana(1, 0, 0), 1, 1)
            .on(AnyCreatureEntered, GainLife(1)),
        CardDef::creature("Spectrum Sentinel", mana(1, 0, 0), 1, 2).on(
            OppLandPlayed,
            GainLifePerChance {
                chance: chances.nonbasic_land_rate,
                amount: 1,
            },
        ),
        CardDef::creature("Starscape Cleric", mana(1, 0, 0), 2, 2).on(
            LifeGained,
            OpponentsLoseLife {
                amount: EventAmount,
                all: true,
            },
        ),
        CardDef::creature("Suture Priest", mana(1, 0, 0), 1, 2)
            .on(MyCreatureEntered, GainLife(1)),
        CardDef::creature("Voice of the Blessed", mana(1, 0, 1), 2, 2)
            .on(LifeGained, AddCounters(EventAmount)),
        CardDef::creature("Vito, Thorn of the Dusk Rose", mana(0, 1, 1), 1, 3).on(
            LifeGained,
            OpponentsLoseLife {
                amount: EventAmount,
                all: false,
            },
        ),
        CardDef::creature("Zulaport Cutthroat", mana(0, 1, 0), 1, 1).on(
            MyCreatureDied,
            OpponentsLoseLife {
                amount: Fixed(1),
                all: false,
            },
        ),
        // Artifacts
        CardDef::new("Aetherflux Reservoir", Artifact, mana(0, 0, 4))
            .on(MySpellCast, GainLifePerSpellThisTurn),
        CardDef::new("Bolas's Citadel", Artifact, mana(0, 1, 5)),
        CardDef::new("Lightning Greaves", Artifact, mana(0, 0, 2)),
        CardDef::new("Mox Amber", Artifact, mana(0, 0, 0)).taps_for(&[White, Black]),
        CardDef::new("Orzhov Signet", Artifact, mana(0, 0, 2)).taps_for(&[White, Black]),
        CardDef::new("Sensei's Divining Top", Artifact, mana(0, 0, 1))
            .on(MyCreatureEntered, Draw(1)),
        CardDef::new("Shadowspear", Artifact, mana(0, 0, 1)),
        CardDef::new("Skullclamp", Artifact, mana(0, 0, 1)),
        CardDef::new("Smothering Tithe", Artifact, mana(1, 0, 2)),
        CardDef::new("Sol Ring", Artifact, mana(0, 0, 2)).taps_for(&[Colorless]),
        // Enchantments
        CardDef::new("Ajani's Welcome", Enchantment, mana(1, 0, 0))
            .on(MyCreatureEntered, GainLife(1)),
        CardDef::new("Authority of the Consuls", Enchantment, mana(1, 0, 0))
            .on(OppCreatureEntered, GainLife(1)),
        CardDef::new("Blind Obedience", Enchantment, mana(1, 0, 1))
            .on(MySpellCast, TapLandForLife),
        CardDef::new("Case of the Uneaten Feast", Enchantment, mana(1, 0, 0))
            .on(MyCreatureEntered, GainLife(1)),
        CardDef::new("Cleric Class", Enchantment, mana(1, 0, 0))
            .on(LifeGained, GainLifeSilent(1)),
        CardDef::new("Sanguine Bond", Enchantment, mana(0, 1, 4)).on(
            LifeGained,
            OpponentsLoseLife {
                amount: EventAmount,
                all: false,
            },
        ),
        // Instants and sorceries, never cast by the autopilot
        CardDef::new("Anguished Unmaking", Instant, mana(1, 1, 0)),
        CardDef::new("Ascend from Avernus", Sorcery, mana(1, 0, 1)),
        CardDef::new("Damn", Sorcery, mana(1, 1, 0)),
        CardDef::new("Deadly Rollick", Instant, mana(0, 0, 0)),
        CardDef::new("Flare of Fortitude", Instant, mana(1, 0, 0)),
        CardDef::new("Flawless Maneuver", Instant, mana(1, 0, 2)),
        CardDef::new("Path to Exile", Instant, mana(1, 0, 0)),
        CardDef::new("Raise the Past", Sorcery, mana(0, 0, 3)),
        CardDef::new("Rally the Ancestors", Sorcery, mana(1, 0, 1)),
        CardDef::new("Swords to Plowshares", Instant, mana(1, 0, 0)),
        CardDef::new("Teferi's Protection", Instant, mana(1, 0, 2)),
        CardDef::new("The Meathook Massacre", Sorcery, mana(0, 1, 2)),
        CardDef::new("Toxic Deluge", Sorcery, mana(0, 1, 2)),
        // Planeswalkers
        CardDef::new("Sorin of House Markov", Planeswalker, mana(0, 1, 2))
            .on(MySpellCast, TapLandForLife),
    ]
}

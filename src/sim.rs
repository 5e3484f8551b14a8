//! Batch simulation: configuration, per-run game setup, and aggregated
//! per-turn statistics.
//!
//! Runs are independent game instances; a batch fans them out over rayon
//! and merges integer sums per turn, so the aggregate is exact and does
//! not depend on completion order.

use rand::SeedableRng;
use rand_xoshiro::Xoshiro256PlusPlus;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};

use crate::catalog::{Catalog, TriggerChances};
use crate::deck::Decklist;
use crate::error::{Result, SimError};
use crate::game::{
    GameLogger, GameLoop, OpponentConfig, OpponentModel, RunEndReason, RunOutcome, TurnSnapshot,
    VerbosityLevel,
};
use crate::game::state::GameState;

/// Stride between per-run RNG seeds (the splitmix64 increment), so runs
/// land on well-separated streams.
const RUN_SEED_STRIDE: u64 = 0x9E37_79B9_7F4A_7C15;

/// How run RNGs derive from the master seed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SeedMode {
    /// Each run gets its own stream. The default.
    PerRun,
    /// Every run replays the master stream; all games are identical.
    Shared,
}

impl Default for SeedMode {
    fn default() -> Self {
        SeedMode::PerRun
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimConfig {
    pub turns: u32,
    pub runs: u64,
    /// Master seed; `None` draws one from the OS.
    pub seed: Option<u64>,
    pub seed_mode: SeedMode,
    pub verbosity: VerbosityLevel,
    /// Whether truncated runs contribute the turns they completed.
    pub include_truncated: bool,
    pub max_resolution_steps: usize,
    pub chances: TriggerChances,
    /// `None` leaves the pressure model off.
    pub opponent: Option<OpponentConfig>,
}

impl Default for SimConfig {
    fn default() -> Self {
        SimConfig {
            turns: 10,
            runs: 10_000,
            seed: None,
            seed_mode: SeedMode::default(),
            verbosity: VerbosityLevel::Silent,
            include_truncated: true,
            max_resolution_steps: 10_000,
            chances: TriggerChances::default(),
            opponent: None,
        }
    }
}

impl SimConfig {
    pub fn master_seed(&self) -> u64 {
        self.seed.unwrap_or_else(rand::random)
    }

    fn game_seed(&self, master: u64, run_index: u64) -> u64 {
        match self.seed_mode {
            SeedMode::PerRun => master.wrapping_add(run_index.wrapping_mul(RUN_SEED_STRIDE)),
            SeedMode::Shared => master,
        }
    }

    fn shuffle_seed(&self, master: u64, run_index: u64) -> u64 {
        match self.seed_mode {
            SeedMode::PerRun => master.wrapping_add(run_index),
            SeedMode::Shared => master,
        }
    }
}

/// Build one ready-to-play game: the 99 shuffled into the library, the
/// commander in the command zone, seven cards drawn.
pub fn setup_game(
    config: &SimConfig,
    catalog: &Arc<Catalog>,
    deck: &Decklist,
    master: u64,
    run_index: u64,
    logger: GameLogger,
) -> Result<GameState> {
    let mut game = GameState::new(Arc::clone(catalog), logger);
    game.max_resolution_steps = config.max_resolution_steps;
    game.seed_rng(config.game_seed(master, run_index));

    for entry in &deck.cards {
        for _ in 0..entry.count {
            let id = game.create_card(&entry.name)?;
            game.library.add(id);
        }
    }
    let mut shuffler =
        Xoshiro256PlusPlus::seed_from_u64(config.shuffle_seed(master, run_index));
    game.shuffle_library(&mut shuffler);

    let commander = game.create_card(&deck.commander)?;
    game.command.add(commander);
    game.commander = Some(commander);

    for _ in 0..7 {
        game.draw_card()?;
    }
    Ok(game)
}

/// Play one full run and return its outcome.
pub fn run_single(
    config: &SimConfig,
    catalog: &Arc<Catalog>,
    deck: &Decklist,
    master: u64,
    run_index: u64,
    logger: GameLogger,
) -> Result<RunOutcome> {
    let mut game = setup_game(config, catalog, deck, master, run_index, logger)?;
    let mut game_loop = GameLoop::new(&mut game).with_max_turns(config.turns);
    if let Some(ref opponent) = config.opponent {
        game_loop = game_loop.with_opponent(OpponentModel::new(opponent.clone()));
    }
    game_loop.run()
}

/// One verbose-capable game with the configured seed. The CLI `run`
/// subcommand.
pub fn run_one_game(config: &SimConfig, deck: &Decklist) -> Result<RunOutcome> {
    let catalog = Arc::new(Catalog::new(&config.chances));
    deck.validate(&catalog)?;
    let master = config.master_seed();
    let logger = GameLogger::new(config.verbosity);
    run_single(config, &catalog, deck, master, 0, logger)
}

/// Per-turn integer sums. Merging these is exact regardless of the order
/// runs finish in.
#[derive(Debug, Clone, Copy, Default)]
struct TurnAccum {
    runs: u64,
    life: i64,
    creatures: u64,
    power: i64,
    toughness: i64,
    damage: u64,
    hand: u64,
    graveyard: u64,
    graveyard_creatures: u64,
}

impl TurnAccum {
    fn add(&mut self, snap: &TurnSnapshot) {
        self.runs += 1;
        self.life += snap.life as i64;
        self.creatures += snap.creatures as u64;
        self.power += snap.total_power as i64;
        self.toughness += snap.total_toughness as i64;
        self.damage += snap.damage_to_opponents;
        self.hand += snap.hand_size as u64;
        self.graveyard += snap.graveyard_size as u64;
        self.graveyard_creatures += snap.graveyard_creatures as u64;
    }

    fn mean_row(&self, turn: u32) -> TurnRow {
        let n = self.runs as f64;
        TurnRow {
            turn,
            runs: self.runs,
            life: self.life as f64 / n,
            creatures: self.creatures as f64 / n,
            total_power: self.power as f64 / n,
            total_toughness: self.toughness as f64 / n,
            damage_to_opponents: self.damage as f64 / n,
            hand_size: self.hand as f64 / n,
            graveyard_size: self.graveyard as f64 / n,
            graveyard_creatures: self.graveyard_creatures as f64 / n,
        }
    }
}

#[derive(Debug, Clone, Default)]
struct BatchAccum {
    turns: Vec<TurnAccum>,
    truncated: u64,
}

impl BatchAccum {
    fn new(turns: u32) -> Self {
        BatchAccum {
            turns: vec![TurnAccum::default(); turns as usize],
            truncated: 0,
        }
    }

    fn record(&mut self, outcome: &RunOutcome, include_truncated: bool) {
        if outcome.end_reason != RunEndReason::TurnLimitReached {
            self.truncated += 1;
            if !include_truncated {
                return;
            }
        }
        for snap in &outcome.snapshots {
            if let Some(accum) = self.turns.get_mut((snap.turn - 1) as usize) {
                accum.add(snap);
            }
        }
    }
}

/// Per-turn means over a batch. `runs` is how many runs reached that
/// turn; means divide by it, so later turns of truncated batches stay
/// honest.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TurnRow {
    pub turn: u32,
    pub runs: u64,
    pub life: f64,
    pub creatures: f64,
    pub total_power: f64,
    pub total_toughness: f64,
    pub damage_to_opponents: f64,
    pub hand_size: f64,
    pub graveyard_size: f64,
    pub graveyard_creatures: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchReport {
    pub runs: u64,
    pub truncated_runs: u64,
    /// The master seed actually used, for replaying the batch.
    pub seed: u64,
    pub turns: Vec<TurnRow>,
}

impl BatchReport {
    /// The fixed-width averages table.
    pub fn render_table(&self) -> String {
        let mut out = String::new();
        out.push_str(&format!(
            "\n=== Simulation Averages ({} games) ===\n",
            self.runs
        ));
        out.push_str(
            "Turn | Life | Creatures | Total P/T | Damage to Enemies | Hand | Graveyard | GY Creatures\n",
        );
        out.push_str(
            "-----|------|-----------|-----------|-------------------|------|-----------|--------------\n",
        );
        for row in &self.turns {
            out.push_str(&format!(
                "{:>4} | {:>4.1} | {:>9.2} | {:.2}/{:.2} | {:>17.2} | {:>4.2} | {:>9.2} | {:>12.2}\n",
                row.turn,
                row.life,
                row.creatures,
                row.total_power,
                row.total_toughness,
                row.damage_to_opponents,
                row.hand_size,
                row.graveyard_size,
                row.graveyard_creatures,
            ));
        }
        out
    }

    pub fn render_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| SimError::Serialization(e.to_string()))
    }
}

/// Run the whole batch and aggregate. Fans out over rayon except for a
/// single-run batch, which stays on the calling thread.
pub fn run_batch(config: &SimConfig, deck: &Decklist) -> Result<BatchReport> {
    let catalog = Arc::new(Catalog::new(&config.chances));
    deck.validate(&catalog)?;
    let master = config.master_seed();

    let accum = if config.runs <= 1 {
        let mut accum = BatchAccum::new(config.turns);
        let outcome = run_single(config, &catalog, deck, master, 0, GameLogger::silent())?;
        accum.record(&outcome, config.include_truncated);
        accum
    } else {
        let shared = Arc::new(Mutex::new(BatchAccum::new(config.turns)));
        (0..config.runs).into_par_iter().try_for_each(|run_index| {
            let outcome =
                run_single(config, &catalog, deck, master, run_index, GameLogger::silent())?;
            let mut guard = match shared.lock() {
                Ok(guard) => guard,
                Err(poisoned) => poisoned.into_inner(),
            };
            guard.record(&outcome, config.include_truncated);
            Ok::<(), SimError>(())
        })?;
        let guard = match shared.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        guard.clone()
    };

    let turns = accum
        .turns
        .iter()
        .enumerate()
        .filter(|(_, acc)| acc.runs > 0)
        .map(|(i, acc)| acc.mean_row(i as u32 + 1))
        .collect();
    Ok(BatchReport {
        runs: config.runs,
        truncated_runs: accum.truncated,
        seed: master,
        turns,
    })
}

//! soulsim - Commander lifegain deck simulator
//!
//! `run` plays one narrated game; `sim` aggregates a batch into per-turn
//! averages.

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use soulsim::deck::Decklist;
use soulsim::game::{OpponentConfig, VerbosityLevel};
use soulsim::sim::{run_batch, run_one_game, SeedMode, SimConfig};
use std::path::PathBuf;

/// Verbosity level for game output (custom parser supporting both names and numbers)
#[derive(Debug, Clone, Copy)]
struct VerbosityArg(VerbosityLevel);

impl std::str::FromStr for VerbosityArg {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "silent" | "0" => Ok(VerbosityArg(VerbosityLevel::Silent)),
            "minimal" | "1" => Ok(VerbosityArg(VerbosityLevel::Minimal)),
            "normal" | "2" => Ok(VerbosityArg(VerbosityLevel::Normal)),
            "verbose" | "3" => Ok(VerbosityArg(VerbosityLevel::Verbose)),
            _ => Err(format!(
                "invalid verbosity level '{s}' (expected: silent/0, minimal/1, normal/2, verbose/3)"
            )),
        }
    }
}

impl From<VerbosityArg> for VerbosityLevel {
    fn from(arg: VerbosityArg) -> Self {
        arg.0
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum SeedModeArg {
    /// Independent RNG stream per run
    PerRun,
    /// One shared stream; every run plays out identically
    Shared,
}

impl From<SeedModeArg> for SeedMode {
    fn from(arg: SeedModeArg) -> Self {
        match arg {
            SeedModeArg::PerRun => SeedMode::PerRun,
            SeedModeArg::Shared => SeedMode::Shared,
        }
    }
}

#[derive(Parser)]
#[command(name = "soulsim")]
#[command(about = "Commander lifegain deck simulator", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play a single game with narration
    Run {
        /// Turns to play
        #[arg(long, short = 't', default_value_t = 10)]
        turns: u32,

        /// Random seed for deterministic replay
        #[arg(long)]
        seed: Option<u64>,

        /// Verbosity level (0=silent, 1=minimal, 2=normal, 3=verbose)
        #[arg(long, short = 'v', default_value = "normal")]
        verbosity: VerbosityArg,

        /// Enable the opponent pressure model
        #[arg(long)]
        opponent: bool,

        /// Deck list file (default: the built-in archetype list)
        #[arg(long, short = 'd')]
        deck: Option<PathBuf>,
    },

    /// Run a batch and print per-turn averages
    Sim {
        /// Turns per game
        #[arg(long, short = 't', default_value_t = 10)]
        turns: u32,

        /// Number of games
        #[arg(long, short = 'n', default_value_t = 10_000)]
        runs: u64,

        /// Master seed; omitted means a fresh random one
        #[arg(long)]
        seed: Option<u64>,

        /// How per-run seeds derive from the master seed
        #[arg(long, value_enum, default_value = "per-run")]
        seed_mode: SeedModeArg,

        /// Emit JSON instead of the averages table
        #[arg(long)]
        json: bool,

        /// Enable the opponent pressure model
        #[arg(long)]
        opponent: bool,

        /// Exclude truncated runs from the averages
        #[arg(long)]
        drop_truncated: bool,

        /// Deck list file (default: the built-in archetype list)
        #[arg(long, short = 'd')]
        deck: Option<PathBuf>,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            turns,
            seed,
            verbosity,
            opponent,
            deck,
        } => {
            let deck = load_deck(deck.as_deref())?;
            let config = SimConfig {
                turns,
                runs: 1,
                seed,
                verbosity: verbosity.into(),
                opponent: opponent.then(OpponentConfig::default),
                ..SimConfig::default()
            };
            let outcome = run_one_game(&config, &deck)?;

            if config.verbosity >= VerbosityLevel::Minimal {
                println!("\n=== Game Over ===");
                println!("Turns played: {}", outcome.turns_completed);
                println!("Reason: {:?}", outcome.end_reason);
                if let Some(last) = outcome.snapshots.last() {
                    println!("Final life: {}", last.life);
                    println!(
                        "Creatures: {} ({}/{} total)",
                        last.creatures, last.total_power, last.total_toughness
                    );
                    println!("Damage to enemies: {}", last.damage_to_opponents);
                }
            }
        }
        Commands::Sim {
            turns,
            runs,
            seed,
            seed_mode,
            json,
            opponent,
            drop_truncated,
            deck,
        } => {
            let deck = load_deck(deck.as_deref())?;
            let config = SimConfig {
                turns,
                runs,
                seed,
                seed_mode: seed_mode.into(),
                include_truncated: !drop_truncated,
                opponent: opponent.then(OpponentConfig::default),
                ..SimConfig::default()
            };
            let report = run_batch(&config, &deck)?;

            if json {
                println!("{}", report.render_json()?);
            } else {
                if seed.is_none() {
                    eprintln!("seed: {}", report.seed);
                }
                print!("{}", report.render_table());
                if report.truncated_runs > 0 {
                    println!("({} truncated runs)", report.truncated_runs);
                }
            }
        }
    }

    Ok(())
}

fn load_deck(path: Option<&std::path::Path>) -> anyhow::Result<Decklist> {
    match path {
        Some(path) => Decklist::load_from_file(path)
            .with_context(|| format!("reading deck list {}", path.display())),
        None => Ok(Decklist::default_list()),
    }
}

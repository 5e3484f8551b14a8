//! Decklists: the built-in archetype list, text parsing, and validation.
//!
//! Text format is one `<count> <card name>` per line, with a
//! `Commander: <name>` line naming the commander. Blank lines and `#`
//! comments are skipped. Validation happens against a [`Catalog`] before
//! any game is set up; a bad list is a fatal setup error.

use std::fs;
use std::path::Path;

use crate::catalog::Catalog;
use crate::error::{Result, SimError};

pub const DEFAULT_COMMANDER: &str = "Amalia Benavides Aguirre";

/// The archetype list: every nonbasic as a singleton plus the basic land
/// spread. 99 cards exactly.
const DEFAULT_LIST: &[(u32, &str)] = &[
    (7, "Plains"),
    (5, "Swamp"),
    (1, "Barren Moor"),
    (1, "Brightclimb Pathway"),
    (1, "Caves of Koilos"),
    (1, "Command Tower"),
    (1, "Exotic Orchard"),
    (1, "Fetid Heath"),
    (1, "Godless Shrine"),
    (1, "Isolated Chapel"),
    (1, "Marsh Flats"),
    (1, "Radiant Fountain"),
    (1, "Rogue's Passage"),
    (1, "Secluded Steppe"),
    (1, "Shattered Sanctum"),
    (1, "Shineshadow Snarl"),
    (1, "Shizo, Death's Storehouse"),
    (1, "Silent Clearing"),
    (1, "Tainted Field"),
    (1, "Urborg, Tomb of Yawgmoth"),
    (1, "Vault of Champions"),
    (1, "Vault of the Archangel"),
    (1, "Aerith Gainsborough"),
    (1, "Archangel of Thune"),
    (1, "Archivist of Oghma"),
    (1, "Auriok Champion"),
    (1, "Blood Artist"),
    (1, "Charismatic Conqueror"),
    (1, "Cruel Celebrant"),
    (1, "Dark Confidant"),
    (1, "Daxos, Blessed by the Sun"),
    (1, "Deathgreeter"),
    (1, "Delney, Streetwise Lookout"),
    (1, "Elas il-Kor, Sadistic Pilgrim"),
    (1, "Elenda's Hierophant"),
    (1, "Esper Sentinel"),
    (1, "Essence Channeler"),
    (1, "Guide of Souls"),
    (1, "Heliod, Sun-Crowned"),
    (1, "Hinterland Sanctifier"),
    (1, "Kambal, Consul of Allocation"),
    (1, "Karlov of the Ghost Council"),
    (1, "Leonin Elder"),
    (1, "Lotho, Corrupt Shirriff"),
    (1, "Lunarch Veteran"),
    (1, "Lurrus of the Dream-Den"),
    (1, "Marauding Blight-Priest"),
    (1, "Mother of Runes"),
    (1, "Ocelot Pride"),
    (1, "Selfless Spirit"),
    (1, "Serra Ascendant"),
    (1, "Soul Warden"),
    (1, "Soul's Attendant"),
    (1, "Spectrum Sentinel"),
    (1, "Starscape Cleric"),
    (1, "Suture Priest"),
    (1, "Voice of the Blessed"),
    (1, "Vito, Thorn of the Dusk Rose"),
    (1, "Zulaport Cutthroat"),
    (1, "Aetherflux Reservoir"),
    (1, "Bolas's Citadel"),
    (1, "Lightning Greaves"),
    (1, "Mox Amber"),
    (1, "Orzhov Signet"),
    (1, "Sensei's Divining Top"),
    (1, "Shadowspear"),
    (1, "Skullclamp"),
    (1, "Smothering Tithe"),
    (1, "Sol Ring"),
    (1, "Ajani's Welcome"),
    (1, "Authority of the Consuls"),
    (1, "Blind Obedience"),
    (1, "Case of the Uneaten Feast"),
    (1, "Cleric Class"),
    (1, "Sanguine Bond"),
    (1, "Anguished Unmaking"),
    (1, "Ascend from Avernus"),
    (1, "Damn"),
    (1, "Deadly Rollick"),
    (1, "Flare of Fortitude"),
    (1, "Flawless Maneuver"),
    (1, "Path to Exile"),
    (1, "Raise the Past"),
    (1, "Rally the Ancestors"),
    (1, "Swords to Plowshares"),
    (1, "Teferi's Protection"),
    (1, "The Meathook Massacre"),
    (1, "Toxic Deluge"),
    (1, "Sorin of House Markov"),
];

#[derive(Debug, Clone)]
pub struct DeckEntry {
    pub name: String,
    pub count: u32,
}

#[derive(Debug, Clone)]
pub struct Decklist {
    pub commander: String,
    pub cards: Vec<DeckEntry>,
}

impl Decklist {
    /// The built-in archetype list.
    pub fn default_list() -> Self {
        Decklist {
            commander: DEFAULT_COMMANDER.to_string(),
            cards: DEFAULT_LIST
                .iter()
                .map(|(count, name)| DeckEntry {
                    name: name.to_string(),
                    count: *count,
                })
                .collect(),
        }
    }

    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self> {
        let mut commander = None;
        let mut cards = Vec::new();

        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            if let Some(name) = line.strip_prefix("Commander:") {
                commander = Some(name.trim().to_string());
                continue;
            }

            let (count_str, name) = line.split_once(' ').ok_or_else(|| {
                SimError::InvalidDecklist(format!("unparseable line: {:?}", line))
            })?;
            let count: u32 = count_str.parse().map_err(|_| {
                SimError::InvalidDecklist(format!("bad count in line: {:?}", line))
            })?;
            cards.push(DeckEntry {
                name: name.trim().to_string(),
                count,
            });
        }

        let commander = commander
            .ok_or_else(|| SimError::InvalidDecklist("no Commander: line".to_string()))?;
        if cards.is_empty() {
            return Err(SimError::InvalidDecklist("empty deck".to_string()));
        }
        Ok(Decklist { commander, cards })
    }

    /// Cards in the 99, not counting the commander.
    pub fn total(&self) -> u32 {
        self.cards.iter().map(|e| e.count).sum()
    }

    /// Check the list against `catalog`: exactly 99 cards, every name
    /// known (commander included), and no nonbasic appearing more than
    /// once or in more than one entry.
    pub fn validate(&self, catalog: &Catalog) -> Result<()> {
        catalog.get(&self.commander)?;

        let mut seen: Vec<&str> = Vec::with_capacity(self.cards.len());
        for entry in &self.cards {
            let def = catalog.get(&entry.name)?;
            if entry.count == 0 {
                return Err(SimError::InvalidDecklist(format!(
                    "zero copies of {}",
                    entry.name
                )));
            }
            if !def.basic {
                if entry.count > 1 {
                    return Err(SimError::InvalidDecklist(format!(
                        "{} copies of nonbasic {}",
                        entry.count, entry.name
                    )));
                }
                if seen.contains(&entry.name.as_str()) {
                    return Err(SimError::InvalidDecklist(format!(
                        "duplicate entry for {}",
                        entry.name
                    )));
                }
            }
            if entry.name == self.commander {
                return Err(SimError::InvalidDecklist(format!(
                    "commander {} also listed in the 99",
                    self.commander
                )));
            }
            seen.push(&entry.name);
        }

        let total = self.total();
        if total != 99 {
            return Err(SimError::InvalidDecklist(format!(
                "deck has {} cards, need 99",
                total
            )));
        }
        Ok(())
    }
}

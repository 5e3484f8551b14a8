//! Card instance identity and storage.
//!
//! Every card instance in a game gets a `CardId` from the game's
//! `EntityStore` at creation. Zones hold ids, never the cards themselves,
//! so moving a card between zones is a cheap id transfer and the store
//! stays the single owner of the card data.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{Result, SimError};

/// Identifier for a card instance. Unique within one game, never reused.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct CardId(u32);

impl CardId {
    pub fn new(id: u32) -> Self {
        CardId(id)
    }

    pub fn as_u32(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for CardId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Id-keyed storage for card instances.
///
/// Ids are handed out by the store via [`next_id`](EntityStore::next_id).
/// Removal is permanent; a removed id is never reissued, which keeps stale
/// references detectable as [`SimError::CardNotFound`].
#[derive(Debug, Clone)]
pub struct EntityStore<T> {
    entities: FxHashMap<u32, T>,
    next_id: u32,
}

impl<T> EntityStore<T> {
    pub fn new() -> Self {
        EntityStore {
            entities: FxHashMap::default(),
            next_id: 0,
        }
    }

    /// Reserve the next free id.
    pub fn next_id(&mut self) -> CardId {
        let id = self.next_id;
        self.next_id += 1;
        CardId::new(id)
    }

    pub fn insert(&mut self, id: CardId, entity: T) {
        self.entities.insert(id.as_u32(), entity);
    }

    pub fn get(&self, id: CardId) -> Result<&T> {
        self.entities
            .get(&id.as_u32())
            .ok_or(SimError::CardNotFound(id.as_u32()))
    }

    pub fn get_mut(&mut self, id: CardId) -> Result<&mut T> {
        self.entities
            .get_mut(&id.as_u32())
            .ok_or(SimError::CardNotFound(id.as_u32()))
    }

    pub fn remove(&mut self, id: CardId) -> Option<T> {
        self.entities.remove(&id.as_u32())
    }

    pub fn contains(&self, id: CardId) -> bool {
        self.entities.contains_key(&id.as_u32())
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (CardId, &T)> {
        self.entities.iter().map(|(id, e)| (CardId::new(*id), e))
    }
}

impl<T> Default for EntityStore<T> {
    fn default() -> Self {
        Self::new()
    }
}

//! Keyed persistence of game records and the registry counter.
//!
//! Transitions never write to stable memory directly. They open a
//! [`Transaction`], read through it (staged writes are visible to later reads
//! in the same transaction) and call [`Transaction::commit`] once every check
//! has passed. Dropping a transaction discards everything it staged.

use ic_stable_structures::memory_manager::MemoryId;
use ic_stable_structures::StableBTreeMap;
use std::cell::RefCell;
use std::collections::BTreeMap;

use crate::events::{self, GameEvent};
use crate::memory_ids::{COUNTER_MEMORY_ID, GAMES_MEMORY_ID};
use crate::types::{RegistryCounter, RegistryError, StoredGame};
use crate::{Memory, MEMORY_MANAGER};

const COUNTER_KEY: u8 = 0;

thread_local! {
    static GAMES: RefCell<StableBTreeMap<String, StoredGame, Memory>> = RefCell::new(
        StableBTreeMap::init(
            MEMORY_MANAGER.with(|m| m.borrow().get(MemoryId::new(GAMES_MEMORY_ID)))
        )
    );

    // Single entry under COUNTER_KEY; absent until genesis
    static COUNTER: RefCell<StableBTreeMap<u8, RegistryCounter, Memory>> = RefCell::new(
        StableBTreeMap::init(
            MEMORY_MANAGER.with(|m| m.borrow().get(MemoryId::new(COUNTER_MEMORY_ID)))
        )
    );
}

// =============================================================================
// COMMITTED STATE (read-only helpers)
// =============================================================================

pub fn get_stored_game(id: &str) -> Option<StoredGame> {
    GAMES.with(|g| g.borrow().get(&id.to_string()))
}

pub fn get_counter() -> Option<RegistryCounter> {
    COUNTER.with(|c| c.borrow().get(&COUNTER_KEY))
}

pub fn game_count() -> u64 {
    GAMES.with(|g| g.borrow().len())
}

pub fn list_stored_games(offset: u64, limit: u64) -> Vec<StoredGame> {
    // An offset past usize::MAX is past the end of any map
    let Ok(offset) = usize::try_from(offset) else {
        return Vec::new();
    };
    let limit = usize::try_from(limit).unwrap_or(usize::MAX);
    GAMES.with(|g| {
        g.borrow()
            .iter()
            .skip(offset)
            .take(limit)
            .map(|(_, game)| game)
            .collect()
    })
}

/// Unconditional writes used by genesis, before any transition can run.
pub(crate) fn seed(counter: RegistryCounter, games: Vec<StoredGame>) {
    GAMES.with(|g| {
        let mut map = g.borrow_mut();
        for game in games {
            map.insert(game.id.clone(), game);
        }
    });
    COUNTER.with(|c| c.borrow_mut().insert(COUNTER_KEY, counter));
}

#[cfg(test)]
pub(crate) fn clear() {
    GAMES.with(|g| {
        let mut map = g.borrow_mut();
        let keys: Vec<String> = map.iter().map(|(k, _)| k).collect();
        for key in keys {
            map.remove(&key);
        }
    });
    COUNTER.with(|c| c.borrow_mut().remove(&COUNTER_KEY));
    events::clear();
}

// =============================================================================
// TRANSACTION
// =============================================================================

#[derive(Default)]
pub struct Transaction {
    // None marks a staged delete
    games: BTreeMap<String, Option<StoredGame>>,
    counter: Option<RegistryCounter>,
    events: Vec<GameEvent>,
}

impl Transaction {
    pub fn begin() -> Self {
        Self::default()
    }

    pub fn get_stored_game(&self, id: &str) -> Option<StoredGame> {
        match self.games.get(id) {
            Some(staged) => staged.clone(),
            None => get_stored_game(id),
        }
    }

    pub fn set_stored_game(&mut self, game: StoredGame) {
        self.games.insert(game.id.clone(), Some(game));
    }

    pub fn remove_stored_game(&mut self, id: &str) {
        self.games.insert(id.to_string(), None);
    }

    pub fn get_counter(&self) -> Option<RegistryCounter> {
        self.counter.clone().or_else(get_counter)
    }

    pub fn set_counter(&mut self, counter: RegistryCounter) {
        self.counter = Some(counter);
    }

    /// Hands out the next sequential id and stages the bumped counter.
    pub fn allocate_id(&mut self) -> Result<String, RegistryError> {
        let mut counter = self.get_counter().ok_or_else(|| RegistryError::NotFound {
            what: "registry counter".to_string(),
        })?;
        let id = counter.next_id.to_string();
        let next_id = counter.next_id.checked_add(1).ok_or_else(|| RegistryError::IllegalTransition {
            reason: format!("game ids exhausted at {}", id),
        })?;
        counter.next_id = next_id;
        self.set_counter(counter);
        Ok(id)
    }

    pub fn emit(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    /// Applies every staged write. The only failure left is the event log
    /// failing to grow, which traps and rolls the whole call back, so the
    /// transition stays all-or-nothing.
    pub fn commit(self, timestamp: u64) {
        GAMES.with(|g| {
            let mut map = g.borrow_mut();
            for (id, staged) in self.games {
                match staged {
                    Some(game) => {
                        map.insert(id, game);
                    }
                    None => {
                        map.remove(&id);
                    }
                }
            }
        });

        if let Some(counter) = self.counter {
            COUNTER.with(|c| c.borrow_mut().insert(COUNTER_KEY, counter));
        }

        for event in self.events {
            events::append(timestamp, event);
        }
    }
}

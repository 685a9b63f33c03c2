use candid::{CandidType, Deserialize, Principal};
use ic_stable_structures::memory_manager::MemoryId;
use ic_stable_structures::storable::Bound;
use ic_stable_structures::{StableVec, Storable};
use serde::Serialize;
use std::borrow::Cow;
use std::cell::RefCell;

use crate::memory_ids::EVENT_LOG_MEMORY_ID;
use crate::types::Winner;
use crate::{Memory, MEMORY_MANAGER};

#[derive(CandidType, Deserialize, Serialize, Clone, Debug, PartialEq)]
pub enum GameEvent {
    GameCreated { creator: Principal, game_id: String, red: Principal, black: Principal },
    MovePlayed { player: Principal, game_id: String, captured_x: i64, captured_y: i64, winner: Winner },
    GameRejected { player: Principal, game_id: String },
}

#[derive(CandidType, Deserialize, Serialize, Clone, Debug, PartialEq)]
pub struct EventEntry {
    pub timestamp: u64,
    pub event: GameEvent,
}

impl Storable for EventEntry {
    fn to_bytes(&self) -> Cow<[u8]> {
        Cow::Owned(
            candid::encode_one(self).expect(
                "CRITICAL: Failed to encode EventEntry. \
                 This should never happen unless there's a bug in candid serialization."
            )
        )
    }

    fn from_bytes(bytes: Cow<[u8]>) -> Self {
        candid::decode_one(&bytes).expect(
            "CRITICAL: Failed to decode EventEntry from stable storage. \
             This indicates event log corruption or an incompatible upgrade."
        )
    }

    const BOUND: Bound = Bound::Bounded {
        max_size: 512,
        is_fixed_size: false,
    };
}

thread_local! {
    // Append-only, one entry per committed transition
    static EVENT_LOG: RefCell<StableVec<EventEntry, Memory>> = RefCell::new(
        StableVec::init(
            MEMORY_MANAGER.with(|m| m.borrow().get(MemoryId::new(EVENT_LOG_MEMORY_ID)))
        ).expect("Failed to init event log")
    );
}

pub(crate) fn append(timestamp: u64, event: GameEvent) {
    EVENT_LOG.with(|log| {
        let entry = EventEntry { timestamp, event };
        if let Err(e) = log.borrow_mut().push(&entry) {
            panic!("CRITICAL: event log grow failed ({:?}), dropping {:?}", e, entry.event);
        }
    });
}

pub fn get_events(offset: u64, limit: u64) -> Vec<EventEntry> {
    let Ok(offset) = usize::try_from(offset) else {
        return Vec::new();
    };
    let limit = usize::try_from(limit).unwrap_or(usize::MAX);
    EVENT_LOG.with(|log| {
        let log = log.borrow();
        log.iter()
            .skip(offset)
            .take(limit)
            .collect()
    })
}

pub fn event_count() -> u64 {
    EVENT_LOG.with(|log| log.borrow().len())
}

#[cfg(test)]
pub(crate) fn clear() {
    EVENT_LOG.with(|log| {
        let log = log.borrow_mut();
        while log.pop().is_some() {}
    });
}

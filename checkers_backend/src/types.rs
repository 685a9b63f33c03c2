use candid::{CandidType, Deserialize, Principal};
use serde::Serialize;
use ic_stable_structures::Storable;
use ic_stable_structures::storable::Bound;
use std::borrow::Cow;
use std::fmt;
use thiserror::Error;

// =============================================================================
// SIDES
// =============================================================================

#[derive(CandidType, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Debug)]
pub enum Side {
    Red,
    Black,
}

impl Side {
    pub fn opponent(self) -> Side {
        match self {
            Side::Red => Side::Black,
            Side::Black => Side::Red,
        }
    }

    /// Single-character marker used in the board encoding and the turn field.
    pub fn as_char(self) -> char {
        match self {
            Side::Red => 'r',
            Side::Black => 'b',
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Red => write!(f, "red"),
            Side::Black => write!(f, "black"),
        }
    }
}

/// Winner as reported to callers. `NoPlayer` while the game is still running
/// and for a drawn game.
#[derive(CandidType, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Debug)]
pub enum Winner {
    NoPlayer,
    Red,
    Black,
}

impl From<Side> for Winner {
    fn from(side: Side) -> Self {
        match side {
            Side::Red => Winner::Red,
            Side::Black => Winner::Black,
        }
    }
}

// =============================================================================
// STORED RECORDS
// =============================================================================

#[derive(CandidType, Deserialize, Serialize, Clone, Debug, PartialEq)]
pub struct StoredGame {
    pub id: String,
    pub creator: Principal,
    pub red_player: Principal,
    pub black_player: Principal,
    pub board: String,
    pub turn: Side,
    pub move_count: u64,
    /// Previous game in activity order, `None` at the head.
    pub before: Option<String>,
    /// Next game in activity order, `None` at the tail.
    pub after: Option<String>,
}

impl Storable for StoredGame {
    fn to_bytes(&self) -> Cow<[u8]> {
        Cow::Owned(
            candid::encode_one(self).expect(
                "CRITICAL: Failed to encode StoredGame. \
                 This should never happen unless there's a bug in candid serialization."
            )
        )
    }

    fn from_bytes(bytes: Cow<[u8]>) -> Self {
        candid::decode_one(&bytes).expect(
            "CRITICAL: Failed to decode StoredGame from stable storage. \
             This indicates storage corruption or an incompatible canister upgrade."
        )
    }

    const BOUND: Bound = Bound::Unbounded;
}

/// Singleton holding id allocation and the two ends of the activity chain.
#[derive(CandidType, Deserialize, Serialize, Clone, Debug, PartialEq)]
pub struct RegistryCounter {
    pub next_id: u64,
    pub fifo_head: Option<String>,
    pub fifo_tail: Option<String>,
}

impl Default for RegistryCounter {
    fn default() -> Self {
        Self {
            next_id: 1,
            fifo_head: None,
            fifo_tail: None,
        }
    }
}

impl Storable for RegistryCounter {
    fn to_bytes(&self) -> Cow<[u8]> {
        Cow::Owned(
            candid::encode_one(self).expect(
                "CRITICAL: Failed to encode RegistryCounter. \
                 This should never happen unless there's a bug in candid serialization."
            )
        )
    }

    fn from_bytes(bytes: Cow<[u8]>) -> Self {
        candid::decode_one(&bytes).expect(
            "CRITICAL: Failed to decode RegistryCounter from stable storage. \
             Id allocation and chain ends cannot be trusted."
        )
    }

    const BOUND: Bound = Bound::Unbounded;
}

// =============================================================================
// REQUESTS AND RESPONSES
// =============================================================================

#[derive(CandidType, Deserialize, Serialize, Clone, Debug)]
pub struct CreateGame {
    pub creator: Principal,
    pub red_player: Principal,
    pub black_player: Principal,
}

#[derive(CandidType, Deserialize, Serialize, Clone, Debug, PartialEq)]
pub struct CreateGameResponse {
    pub game_id: String,
}

#[derive(CandidType, Deserialize, Serialize, Clone, Debug)]
pub struct PlayMove {
    pub player: Principal,
    pub game_id: String,
    pub from_x: u64,
    pub from_y: u64,
    pub to_x: u64,
    pub to_y: u64,
}

#[derive(CandidType, Deserialize, Serialize, Clone, Debug, PartialEq)]
pub struct PlayMoveResponse {
    pub game_id: String,
    pub captured_x: i64,  // -1 when nothing was captured
    pub captured_y: i64,
    pub winner: Winner,
    pub game_over: bool,
}

#[derive(CandidType, Deserialize, Serialize, Clone, Debug)]
pub struct RejectGame {
    pub player: Principal,
    pub game_id: String,
}

// =============================================================================
// ERRORS
// =============================================================================

/// Failures reported back to the caller. Every one of them leaves the
/// registry untouched. Chain corruption is not in here: it traps.
#[derive(CandidType, Deserialize, Serialize, Clone, Debug, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("{what} not found")]
    NotFound { what: String },

    #[error("unauthorized: {reason}")]
    Unauthorized { reason: String },

    #[error("illegal transition: {reason}")]
    IllegalTransition { reason: String },

    #[error("illegal move: {reason}")]
    IllegalMove { reason: String },
}

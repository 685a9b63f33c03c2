//! Central registry for stable memory IDs.
//!
//! IMPORTANT: All memory IDs must be unique across the entire canister.
//!
//! Allocation strategy:
//! - 0-9: Registry state (games, counter)
//! - 10-19: Event log

// Registry state (0-9)
pub const GAMES_MEMORY_ID: u8 = 0;
pub const COUNTER_MEMORY_ID: u8 = 1;

// Event log (10-19)
pub const EVENT_LOG_MEMORY_ID: u8 = 10;

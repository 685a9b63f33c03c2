use candid::Principal;
use ic_cdk::{init, post_upgrade, pre_upgrade, query, update};
use ic_stable_structures::memory_manager::{MemoryManager, VirtualMemory};
use ic_stable_structures::DefaultMemoryImpl;
use std::cell::RefCell;

// =============================================================================
// MODULE DECLARATIONS
// =============================================================================

pub mod events;
pub mod fifo;
pub mod game;
pub mod genesis;
pub mod memory_ids;
pub mod rules;
pub mod store;
pub mod types;

#[cfg(test)]
mod tests;

// =============================================================================
// RE-EXPORTS
// =============================================================================

pub use events::{EventEntry, GameEvent};
pub use genesis::GenesisState;
pub use rules::{Checkers, RulesEngine};
pub use types::{
    CreateGameResponse, PlayMoveResponse, RegistryCounter, RegistryError, Side, StoredGame, Winner,
};

// =============================================================================
// MEMORY MANAGEMENT
// =============================================================================

type Memory = VirtualMemory<DefaultMemoryImpl>;

/// Upper bound on any paginated query.
const MAX_PAGE_SIZE: u64 = 100;

thread_local! {
    static MEMORY_MANAGER: RefCell<MemoryManager<DefaultMemoryImpl>> =
        RefCell::new(MemoryManager::init(DefaultMemoryImpl::default()));
}

// =============================================================================
// LIFECYCLE HOOKS
// =============================================================================

#[init]
fn init(genesis: Option<GenesisState>) {
    let genesis = genesis.unwrap_or_default();
    let seeded = genesis.games.len();
    if let Err(e) = genesis::init_genesis(genesis) {
        panic!("Invalid genesis state: {}", e);
    }
    ic_cdk::println!("Checkers Backend Initialized with {} game(s)", seeded);
}

#[pre_upgrade]
fn pre_upgrade() {
    // Registry, counter and event log all live in stable memory
}

#[post_upgrade]
fn post_upgrade() {
    let counter = store::get_counter().unwrap_or_default();
    ic_cdk::println!(
        "Checkers Backend Upgraded: {} live game(s), next id {}",
        store::game_count(),
        counter.next_id
    );
}

// =============================================================================
// GAME ENDPOINTS
// =============================================================================

#[update]
fn create_game(red: Principal, black: Principal) -> Result<CreateGameResponse, RegistryError> {
    let creator = ic_cdk::api::msg_caller();
    let msg = types::CreateGame {
        creator,
        red_player: red,
        black_player: black,
    };

    let response = game::create_game(msg, ic_cdk::api::time())?;
    ic_cdk::println!("Game {} created by {} (red {}, black {})", response.game_id, creator, red, black);
    Ok(response)
}

#[update]
fn play_move(game_id: String, from_x: u64, from_y: u64, to_x: u64, to_y: u64) -> Result<PlayMoveResponse, RegistryError> {
    let msg = types::PlayMove {
        player: ic_cdk::api::msg_caller(),
        game_id,
        from_x,
        from_y,
        to_x,
        to_y,
    };

    let player = msg.player;
    let response = game::play_move(msg, &Checkers, ic_cdk::api::time())?;
    ic_cdk::println!("{}", move_log_line(player, (from_x, from_y), (to_x, to_y), &response));
    Ok(response)
}

/// One line per accepted move, with the result appended when it ends the game.
fn move_log_line(player: Principal, from: (u64, u64), to: (u64, u64), response: &PlayMoveResponse) -> String {
    let mut line = format!(
        "Game {} move by {} ({},{}) -> ({},{})",
        response.game_id, player, from.0, from.1, to.0, to.1
    );
    if response.captured_x >= 0 {
        line.push_str(&format!(", captured ({},{})", response.captured_x, response.captured_y));
    }
    if response.game_over {
        line.push_str(&format!(", game over, winner {:?}", response.winner));
    }
    line
}

#[update]
fn reject_game(game_id: String) -> Result<(), RegistryError> {
    let msg = types::RejectGame {
        player: ic_cdk::api::msg_caller(),
        game_id: game_id.clone(),
    };

    game::reject_game(msg, ic_cdk::api::time())?;
    ic_cdk::println!("Game {} rejected by its creator", game_id);
    Ok(())
}

// =============================================================================
// QUERY ENDPOINTS
// =============================================================================

#[query]
fn get_game(game_id: String) -> Option<StoredGame> {
    store::get_stored_game(&game_id)
}

#[query]
fn list_games(offset: u64, limit: u64) -> Vec<StoredGame> {
    store::list_stored_games(offset, limit.min(MAX_PAGE_SIZE))
}

#[query]
fn get_registry_counter() -> Option<RegistryCounter> {
    store::get_counter()
}

/// Game ids from least to most recently active.
#[query]
fn get_fifo(limit: u64) -> Vec<String> {
    let tx = store::Transaction::begin();
    match tx.get_counter() {
        Some(counter) => fifo::walk(&tx, &counter, limit.min(MAX_PAGE_SIZE) as usize),
        None => Vec::new(),
    }
}

#[query]
fn audit_fifo() -> Result<String, String> {
    let counter = store::get_counter().ok_or("Registry counter not initialized")?;
    let stored = store::game_count();
    let order = fifo::check_chain(&counter, stored, store::get_stored_game)
        .map_err(|e| format!("❌ Audit FAILED: {}", e))?;
    Ok(format!("✅ Audit passed: {} game(s) linked head {:?} to tail {:?}",
        order.len(), counter.fifo_head, counter.fifo_tail))
}

#[query]
fn get_events(offset: u64, limit: u64) -> Vec<EventEntry> {
    events::get_events(offset, limit.min(MAX_PAGE_SIZE))
}

#[query]
fn get_event_count() -> u64 {
    events::event_count()
}

#[query]
fn export_genesis() -> GenesisState {
    genesis::export_genesis()
}

ic_cdk::export_candid!();

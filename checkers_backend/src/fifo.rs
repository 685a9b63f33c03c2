//! Activity ordering over live games.
//!
//! The chain is a doubly-linked list stored inside the game records
//! (`before` / `after`) with its ends held in the [`RegistryCounter`]. Head is
//! the least recently active game, tail the most recently active one.
//!
//! Both primitives mutate the record and counter handed to them and persist
//! touched neighbours through the transaction. Persisting `game` and `counter`
//! themselves is the caller's job. A neighbour that cannot be loaded means the
//! chain is corrupt, which traps and rolls the whole call back.

use crate::store::Transaction;
use crate::types::{RegistryCounter, StoredGame};

fn load_neighbour(tx: &Transaction, id: &str, role: &str) -> StoredGame {
    match tx.get_stored_game(id) {
        Some(game) => game,
        None => panic!("CRITICAL: fifo chain corrupt, {} game {} not found", role, id),
    }
}

/// Splices `game` out of the chain and leaves it fully detached.
pub fn remove_from_fifo(tx: &mut Transaction, game: &mut StoredGame, counter: &mut RegistryCounter) {
    if let Some(before_id) = &game.before {
        let mut before = load_neighbour(tx, before_id, "previous");
        before.after = game.after.clone();
        if game.after.is_none() {
            counter.fifo_tail = Some(before.id.clone());
        }
        tx.set_stored_game(before);
    } else if counter.fifo_head.as_deref() == Some(game.id.as_str()) {
        counter.fifo_head = game.after.clone();
    }

    if let Some(after_id) = &game.after {
        let mut after = load_neighbour(tx, after_id, "next");
        after.before = game.before.clone();
        if game.before.is_none() {
            counter.fifo_head = Some(after.id.clone());
        }
        tx.set_stored_game(after);
    } else if counter.fifo_tail.as_deref() == Some(game.id.as_str()) {
        counter.fifo_tail = game.before.clone();
    }

    game.before = None;
    game.after = None;
}

/// Makes `game` the most recently active entry. Works for a fresh record, an
/// interior node, the head, or the tail (no-op).
pub fn send_to_fifo_tail(tx: &mut Transaction, game: &mut StoredGame, counter: &mut RegistryCounter) {
    let has_head = counter.fifo_head.is_some();
    let has_tail = counter.fifo_tail.is_some();

    if !has_head && !has_tail {
        game.before = None;
        game.after = None;
        counter.fifo_head = Some(game.id.clone());
        counter.fifo_tail = Some(game.id.clone());
    } else if !has_head || !has_tail {
        panic!("CRITICAL: fifo should have both head and tail or none");
    } else if counter.fifo_tail.as_deref() == Some(game.id.as_str()) {
        // Already the tail
    } else {
        remove_from_fifo(tx, game, counter);

        // `game` was not the tail, so splicing it out leaves a tail behind.
        let tail_id = match &counter.fifo_tail {
            Some(id) => id.clone(),
            None => panic!("CRITICAL: fifo tail vanished while moving game {}", game.id),
        };
        let mut tail = load_neighbour(tx, &tail_id, "tail");
        tail.after = Some(game.id.clone());
        tx.set_stored_game(tail);

        game.before = Some(tail_id);
        game.after = None;
        counter.fifo_tail = Some(game.id.clone());
    }
}

/// Walks the chain from the head and returns at most `limit` ids.
pub fn walk(tx: &Transaction, counter: &RegistryCounter, limit: usize) -> Vec<String> {
    let mut ids = Vec::new();
    let mut cursor = counter.fifo_head.clone();
    while let Some(id) = cursor {
        if ids.len() >= limit {
            break;
        }
        cursor = tx.get_stored_game(&id).and_then(|g| g.after);
        ids.push(id);
    }
    ids
}

/// Checks the chain invariants against `lookup`:
/// both ends set or both empty, head has no predecessor, tail no successor,
/// every `after` link mirrored by a `before` link, and exactly `expected_len`
/// games reachable. Returns the chain in head-to-tail order.
pub fn check_chain<F>(counter: &RegistryCounter, expected_len: u64, lookup: F) -> Result<Vec<String>, String>
where
    F: Fn(&str) -> Option<StoredGame>,
{
    let (head, tail) = match (&counter.fifo_head, &counter.fifo_tail) {
        (None, None) => {
            return if expected_len == 0 {
                Ok(Vec::new())
            } else {
                Err(format!("chain is empty but {} games are stored", expected_len))
            };
        }
        (Some(head), Some(tail)) => (head.clone(), tail.clone()),
        _ => return Err("fifo has only one of head and tail".to_string()),
    };

    let mut order = Vec::new();
    let mut previous: Option<String> = None;
    let mut cursor = Some(head);
    while let Some(id) = cursor {
        if order.len() as u64 >= expected_len {
            return Err(format!("chain is longer than {} games (cycle or stray node at {})", expected_len, id));
        }
        let game = lookup(&id).ok_or_else(|| format!("game {} is linked but not stored", id))?;
        if game.before != previous {
            return Err(format!(
                "game {} has before={:?}, expected {:?}",
                id, game.before, previous
            ));
        }
        previous = Some(id.clone());
        cursor = game.after.clone();
        order.push(id);
    }

    if order.len() as u64 != expected_len {
        return Err(format!("chain visits {} games, {} are stored", order.len(), expected_len));
    }
    if previous.as_deref() != Some(tail.as_str()) {
        return Err(format!("chain ends at {:?} but tail is {}", previous, tail));
    }
    Ok(order)
}

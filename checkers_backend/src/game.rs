use crate::events::GameEvent;
use crate::fifo::{remove_from_fifo, send_to_fifo_tail};
use crate::rules::{Outcome, Pos, RulesEngine, FIRST_TO_MOVE, STARTING_BOARD};
use crate::store::Transaction;
use crate::types::*;
use candid::Principal;

// =============================================================================
// HELPER FUNCTIONS
// =============================================================================

fn load_game(tx: &Transaction, game_id: &str) -> Result<StoredGame, RegistryError> {
    tx.get_stored_game(game_id).ok_or_else(|| RegistryError::NotFound {
        what: format!("game {}", game_id),
    })
}

fn load_counter(tx: &Transaction) -> Result<RegistryCounter, RegistryError> {
    tx.get_counter().ok_or_else(|| RegistryError::NotFound {
        what: "registry counter".to_string(),
    })
}

/// Side `player` is entitled to move right now. Someone seated on both sides
/// may always move.
fn side_for(game: &StoredGame, player: Principal) -> Result<Side, RegistryError> {
    let is_red = game.red_player == player;
    let is_black = game.black_player == player;
    if !is_red && !is_black {
        return Err(RegistryError::Unauthorized {
            reason: format!("{} is not a player in game {}", player, game.id),
        });
    }

    let may_move = match game.turn {
        Side::Red => is_red,
        Side::Black => is_black,
    };
    if !may_move {
        return Err(RegistryError::Unauthorized {
            reason: format!("it is {}'s turn in game {}", game.turn, game.id),
        });
    }
    Ok(game.turn)
}

// =============================================================================
// TRANSITIONS
// =============================================================================

pub fn create_game(msg: CreateGame, now: u64) -> Result<CreateGameResponse, RegistryError> {
    let mut tx = Transaction::begin();

    let game_id = tx.allocate_id()?;
    let mut counter = load_counter(&tx)?;

    let mut game = StoredGame {
        id: game_id.clone(),
        creator: msg.creator,
        red_player: msg.red_player,
        black_player: msg.black_player,
        board: STARTING_BOARD.to_string(),
        turn: FIRST_TO_MOVE,
        move_count: 0,
        before: None,
        after: None,
    };
    send_to_fifo_tail(&mut tx, &mut game, &mut counter);

    tx.set_stored_game(game);
    tx.set_counter(counter);
    tx.emit(GameEvent::GameCreated {
        creator: msg.creator,
        game_id: game_id.clone(),
        red: msg.red_player,
        black: msg.black_player,
    });
    tx.commit(now);

    Ok(CreateGameResponse { game_id })
}

pub fn play_move<R: RulesEngine>(msg: PlayMove, rules: &R, now: u64) -> Result<PlayMoveResponse, RegistryError> {
    let mut tx = Transaction::begin();

    let mut game = load_game(&tx, &msg.game_id)?;
    let side = side_for(&game, msg.player)?;

    let result = rules
        .play(&game.board, side, Pos::new(msg.from_x, msg.from_y), Pos::new(msg.to_x, msg.to_y))
        .map_err(|reason| RegistryError::IllegalMove { reason })?;

    let mut counter = load_counter(&tx)?;
    game.board = result.board;
    game.move_count += 1;

    let (winner, game_over) = match result.outcome {
        Outcome::Continue => {
            game.turn = side.opponent();
            send_to_fifo_tail(&mut tx, &mut game, &mut counter);
            tx.set_stored_game(game);
            (Winner::NoPlayer, false)
        }
        Outcome::Won(winner) => {
            remove_from_fifo(&mut tx, &mut game, &mut counter);
            tx.remove_stored_game(&game.id);
            (Winner::from(winner), true)
        }
        Outcome::Draw => {
            remove_from_fifo(&mut tx, &mut game, &mut counter);
            tx.remove_stored_game(&game.id);
            (Winner::NoPlayer, true)
        }
    };
    tx.set_counter(counter);

    let (captured_x, captured_y) = match result.captured {
        Some(pos) => (pos.x as i64, pos.y as i64),
        None => (-1, -1),
    };
    tx.emit(GameEvent::MovePlayed {
        player: msg.player,
        game_id: msg.game_id.clone(),
        captured_x,
        captured_y,
        winner,
    });
    tx.commit(now);

    Ok(PlayMoveResponse {
        game_id: msg.game_id,
        captured_x,
        captured_y,
        winner,
        game_over,
    })
}

/// Withdraws a game nobody has moved in yet. Only its creator may do this.
pub fn reject_game(msg: RejectGame, now: u64) -> Result<(), RegistryError> {
    let mut tx = Transaction::begin();

    let mut game = load_game(&tx, &msg.game_id)?;
    if game.creator != msg.player {
        return Err(RegistryError::Unauthorized {
            reason: format!("only the creator may reject game {}", game.id),
        });
    }
    if game.move_count > 0 {
        return Err(RegistryError::IllegalTransition {
            reason: format!("game {} has already been played ({} moves)", game.id, game.move_count),
        });
    }

    let mut counter = load_counter(&tx)?;
    remove_from_fifo(&mut tx, &mut game, &mut counter);
    tx.remove_stored_game(&game.id);
    tx.set_counter(counter);
    tx.emit(GameEvent::GameRejected {
        player: msg.player,
        game_id: msg.game_id,
    });
    tx.commit(now);

    Ok(())
}

use std::collections::HashMap;

use super::operations::{principal, OpResult, Operation, ScriptedRules};
use crate::fifo::check_chain;
use crate::rules::{Outcome, FIRST_TO_MOVE};
use crate::types::{CreateGame, PlayMove, RejectGame, Side};
use crate::{game, store};

#[derive(Debug, Clone)]
struct ModelGame {
    creator: u8,
    red: u8,
    black: u8,
    turn: Side,
    move_count: u64,
}

/// Reference registry: a plain map plus a vector in activity order.
#[derive(Debug)]
pub struct RegistryModel {
    games: HashMap<String, ModelGame>,
    order: Vec<String>,
    next_id: u64,
    issued: u64,
    now: u64,
}

impl RegistryModel {
    pub fn new() -> Self {
        Self {
            games: HashMap::new(),
            order: Vec::new(),
            next_id: 1,
            issued: 0,
            now: 0,
        }
    }

    /// Applies `op` to the model and to the live registry, failing when the
    /// two disagree on the outcome.
    pub fn execute(&mut self, op: Operation) -> Result<OpResult, String> {
        self.now += 1;
        let expected = self.expected(&op);
        let actual = Self::run_live(&op, self.now);
        if expected != actual {
            return Err(format!("{:?}: model says {:?}, registry says {:?}", op, expected, actual));
        }
        Ok(actual)
    }

    fn run_live(op: &Operation, now: u64) -> OpResult {
        match op {
            Operation::Create { creator, red, black } => game::create_game(
                CreateGame {
                    creator: principal(*creator),
                    red_player: principal(*red),
                    black_player: principal(*black),
                },
                now,
            )
            .into(),
            Operation::Play { game, player, outcome } => game::play_move(
                PlayMove {
                    player: principal(*player),
                    game_id: game.to_string(),
                    from_x: 0,
                    from_y: 0,
                    to_x: 0,
                    to_y: 0,
                },
                &ScriptedRules(*outcome),
                now,
            )
            .into(),
            Operation::Reject { game, player } => game::reject_game(
                RejectGame {
                    player: principal(*player),
                    game_id: game.to_string(),
                },
                now,
            )
            .into(),
        }
    }

    fn expected(&mut self, op: &Operation) -> OpResult {
        match op {
            Operation::Create { creator, red, black } => {
                let id = self.next_id.to_string();
                self.next_id += 1;
                self.issued += 1;
                self.games.insert(id.clone(), ModelGame {
                    creator: *creator,
                    red: *red,
                    black: *black,
                    turn: FIRST_TO_MOVE,
                    move_count: 0,
                });
                self.order.push(id);
                OpResult::Success
            }
            Operation::Play { game, player, outcome } => {
                let id = game.to_string();
                let Some(g) = self.games.get_mut(&id) else {
                    return OpResult::NotFound;
                };
                let on_turn = match g.turn {
                    Side::Red => g.red == *player,
                    Side::Black => g.black == *player,
                };
                if !on_turn {
                    return OpResult::Unauthorized;
                }

                g.move_count += 1;
                self.order.retain(|other| other != &id);
                match outcome {
                    Outcome::Continue => {
                        g.turn = g.turn.opponent();
                        self.order.push(id);
                    }
                    Outcome::Won(_) | Outcome::Draw => {
                        self.games.remove(&id);
                    }
                }
                OpResult::Success
            }
            Operation::Reject { game, player } => {
                let id = game.to_string();
                let Some(g) = self.games.get(&id) else {
                    return OpResult::NotFound;
                };
                if g.creator != *player {
                    return OpResult::Unauthorized;
                }
                if g.move_count > 0 {
                    return OpResult::IllegalTransition;
                }
                self.games.remove(&id);
                self.order.retain(|other| other != &id);
                OpResult::Success
            }
        }
    }

    /// Live chain, counter and records must match the model exactly.
    pub fn check_invariant(&self) -> Result<(), String> {
        let counter = store::get_counter().ok_or("registry counter missing")?;
        if counter.next_id != self.next_id {
            return Err(format!("next_id {} != model {}", counter.next_id, self.next_id));
        }
        if counter.next_id != self.issued + 1 {
            return Err(format!("next_id {} after {} creations", counter.next_id, self.issued));
        }

        let stored = store::game_count();
        if stored != self.games.len() as u64 {
            return Err(format!("{} games stored, model has {}", stored, self.games.len()));
        }

        let order = check_chain(&counter, stored, store::get_stored_game)?;
        if order != self.order {
            return Err(format!("chain {:?} != model {:?}", order, self.order));
        }

        for (id, expected) in &self.games {
            let live = store::get_stored_game(id).ok_or_else(|| format!("game {} missing", id))?;
            if live.turn != expected.turn || live.move_count != expected.move_count {
                return Err(format!(
                    "game {}: turn {:?}/{} moves, model {:?}/{}",
                    id, live.turn, live.move_count, expected.turn, expected.move_count
                ));
            }
            if live.creator != principal(expected.creator)
                || live.red_player != principal(expected.red)
                || live.black_player != principal(expected.black)
            {
                return Err(format!("game {} has the wrong players", id));
            }
        }
        Ok(())
    }

    /// Highest id handed out so far, handy for aiming operations at live games.
    pub fn last_id(&self) -> u64 {
        self.next_id - 1
    }
}

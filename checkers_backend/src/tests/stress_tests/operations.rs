use candid::Principal;

use crate::rules::{MoveResult, Outcome, Pos, RulesEngine};
use crate::types::{RegistryError, Side};

#[derive(Debug, Clone, PartialEq)]
pub enum OpResult {
    Success,
    NotFound,
    Unauthorized,
    IllegalTransition,
    IllegalMove,
}

impl<T> From<Result<T, RegistryError>> for OpResult {
    fn from(result: Result<T, RegistryError>) -> Self {
        match result {
            Ok(_) => OpResult::Success,
            Err(RegistryError::NotFound { .. }) => OpResult::NotFound,
            Err(RegistryError::Unauthorized { .. }) => OpResult::Unauthorized,
            Err(RegistryError::IllegalTransition { .. }) => OpResult::IllegalTransition,
            Err(RegistryError::IllegalMove { .. }) => OpResult::IllegalMove,
        }
    }
}

/// Users are small indices mapped onto distinct principals.
#[derive(Debug, Clone)]
pub enum Operation {
    Create { creator: u8, red: u8, black: u8 },
    Play { game: u64, player: u8, outcome: Outcome },
    Reject { game: u64, player: u8 },
}

pub fn principal(user: u8) -> Principal {
    Principal::from_slice(&[user + 1])
}

/// Accepts any move and reports a fixed outcome, leaving the board as is.
pub struct ScriptedRules(pub Outcome);

impl RulesEngine for ScriptedRules {
    fn play(&self, board: &str, _turn: Side, _from: Pos, _to: Pos) -> Result<MoveResult, String> {
        Ok(MoveResult {
            board: board.to_string(),
            captured: None,
            outcome: self.0,
        })
    }
}

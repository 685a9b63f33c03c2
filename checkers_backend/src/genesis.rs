use candid::{CandidType, Deserialize};
use serde::Serialize;
use std::collections::BTreeMap;

use crate::fifo::check_chain;
use crate::rules::Board;
use crate::store;
use crate::types::{RegistryCounter, StoredGame};

/// Install-time state. The default is an empty registry whose first game
/// will be "1".
#[derive(CandidType, Deserialize, Serialize, Clone, Debug, Default, PartialEq)]
pub struct GenesisState {
    pub counter: RegistryCounter,
    pub games: Vec<StoredGame>,
}

impl GenesisState {
    pub fn validate(&self) -> Result<(), String> {
        if self.counter.next_id == 0 {
            return Err("next_id must start at 1 or above".to_string());
        }

        let mut by_id = BTreeMap::new();
        for game in &self.games {
            let numeric = game
                .id
                .parse::<u64>()
                .ok()
                .filter(|n| n.to_string() == game.id)
                .ok_or_else(|| format!("game id {:?} is not a sequential id", game.id))?;
            if numeric == 0 || numeric >= self.counter.next_id {
                return Err(format!(
                    "game id {} is outside the allocated range 1..{}",
                    game.id, self.counter.next_id
                ));
            }
            Board::parse(&game.board).map_err(|e| format!("game {} has an unreadable board: {}", game.id, e))?;
            if by_id.insert(game.id.clone(), game.clone()).is_some() {
                return Err(format!("duplicate game id {}", game.id));
            }
        }

        check_chain(&self.counter, by_id.len() as u64, |id| by_id.get(id).cloned())?;
        Ok(())
    }
}

pub fn init_genesis(genesis: GenesisState) -> Result<(), String> {
    genesis.validate()?;
    store::seed(genesis.counter, genesis.games);
    Ok(())
}

pub fn export_genesis() -> GenesisState {
    GenesisState {
        counter: store::get_counter().unwrap_or_default(),
        games: store::list_stored_games(0, u64::MAX),
    }
}

use proptest::prelude::*;
use super::Operation;
use crate::rules::Outcome;
use crate::types::Side;

// Four users so players, creators and bystanders collide often
pub fn user() -> impl Strategy<Value = u8> {
    0..4u8
}

// Ids past the live range exercise NotFound
pub fn game_id() -> impl Strategy<Value = u64> {
    1..=40u64
}

// Mostly ordinary moves, with enough endings to keep removals frequent
pub fn outcome() -> impl Strategy<Value = Outcome> {
    prop_oneof![
        8 => Just(Outcome::Continue),
        1 => Just(Outcome::Won(Side::Red)),
        1 => Just(Outcome::Won(Side::Black)),
        1 => Just(Outcome::Draw),
    ]
}

pub fn operation() -> impl Strategy<Value = Operation> {
    prop_oneof![
        3 => (user(), user(), user()).prop_map(|(creator, red, black)| Operation::Create { creator, red, black }),
        // Self-play game: whoever is on turn may move
        1 => user().prop_map(|u| Operation::Create { creator: u, red: u, black: u }),
        6 => (game_id(), user(), outcome()).prop_map(|(game, player, outcome)| Operation::Play { game, player, outcome }),
        2 => (game_id(), user()).prop_map(|(game, player)| Operation::Reject { game, player }),
    ]
}

pub fn operation_sequence(len: usize) -> impl Strategy<Value = Vec<Operation>> {
    proptest::collection::vec(operation(), len)
}

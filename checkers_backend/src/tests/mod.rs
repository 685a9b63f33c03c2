
use crate::{move_log_line, PlayMoveResponse, Winner};
use candid::Principal;

fn response(captured: (i64, i64), winner: Winner, game_over: bool) -> PlayMoveResponse {
    PlayMoveResponse {
        game_id: "3".to_string(),
        captured_x: captured.0,
        captured_y: captured.1,
        winner,
        game_over,
    }
}

#[test]
fn test_every_move_gets_a_log_line() {
    let player = Principal::anonymous();

    let quiet = move_log_line(player, (1, 2), (2, 3), &response((-1, -1), Winner::NoPlayer, false));
    assert_eq!(quiet, format!("Game 3 move by {} (1,2) -> (2,3)", player));

    let last = move_log_line(player, (1, 2), (3, 4), &response((2, 3), Winner::Black, true));
    assert_eq!(
        last,
        format!("Game 3 move by {} (1,2) -> (3,4), captured (2,3), game over, winner Black", player)
    );
}

//! Move legality for the board encoding held in [`StoredGame::board`].
//!
//! The registry only talks to [`RulesEngine`]; [`Checkers`] is the engine the
//! canister endpoints use.
//!
//! [`StoredGame::board`]: crate::types::StoredGame::board

use crate::types::Side;

// =============================================================================
// CONSTANTS
// =============================================================================

pub const BOARD_SIZE: usize = 8;
pub const ROW_SEPARATOR: char = '|';
pub const EMPTY_CELL: char = '*';

pub const STARTING_BOARD: &str =
    "*b*b*b*b|b*b*b*b*|*b*b*b*b|********|********|r*r*r*r*|*r*r*r*r|r*r*r*r*";

/// Side that opens every game.
pub const FIRST_TO_MOVE: Side = Side::Black;

// =============================================================================
// TYPES
// =============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Pos {
    pub x: u64,
    pub y: u64,
}

impl Pos {
    pub fn new(x: u64, y: u64) -> Self {
        Pos { x, y }
    }

    fn on_board(&self) -> bool {
        self.x < BOARD_SIZE as u64 && self.y < BOARD_SIZE as u64
    }

    fn offset(&self, dx: i64, dy: i64) -> Option<Pos> {
        let x = self.x as i64 + dx;
        let y = self.y as i64 + dy;
        let pos = Pos::new(u64::try_from(x).ok()?, u64::try_from(y).ok()?);
        pos.on_board().then_some(pos)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    Continue,
    Won(Side),
    Draw,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MoveResult {
    pub board: String,
    pub captured: Option<Pos>,
    pub outcome: Outcome,
}

pub trait RulesEngine {
    /// Applies one move by `turn`. `Err` carries the reason the move is illegal.
    fn play(&self, board: &str, turn: Side, from: Pos, to: Pos) -> Result<MoveResult, String>;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Piece {
    side: Side,
    king: bool,
}

impl Piece {
    fn to_char(self) -> char {
        let c = self.side.as_char();
        if self.king { c.to_ascii_uppercase() } else { c }
    }

    fn from_char(c: char) -> Result<Option<Piece>, String> {
        let piece = match c {
            EMPTY_CELL => return Ok(None),
            'b' => Piece { side: Side::Black, king: false },
            'B' => Piece { side: Side::Black, king: true },
            'r' => Piece { side: Side::Red, king: false },
            'R' => Piece { side: Side::Red, king: true },
            other => return Err(format!("Unknown board cell '{}'", other)),
        };
        Ok(Some(piece))
    }

    /// Row direction a man of this side advances in.
    fn forward(self) -> i64 {
        match self.side {
            Side::Black => 1,
            Side::Red => -1,
        }
    }

    fn directions(self) -> Vec<(i64, i64)> {
        if self.king {
            vec![(1, 1), (-1, 1), (1, -1), (-1, -1)]
        } else {
            let dy = self.forward();
            vec![(1, dy), (-1, dy)]
        }
    }

    fn crown_row(self) -> u64 {
        match self.side {
            Side::Black => (BOARD_SIZE - 1) as u64,
            Side::Red => 0,
        }
    }
}

// =============================================================================
// BOARD
// =============================================================================

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Board {
    cells: [[Option<Piece>; BOARD_SIZE]; BOARD_SIZE], // [y][x]
}

impl Board {
    pub fn parse(encoded: &str) -> Result<Board, String> {
        let rows: Vec<&str> = encoded.split(ROW_SEPARATOR).collect();
        if rows.len() != BOARD_SIZE {
            return Err(format!("Board must have {} rows, found {}", BOARD_SIZE, rows.len()));
        }

        let mut cells = [[None; BOARD_SIZE]; BOARD_SIZE];
        for (y, row) in rows.iter().enumerate() {
            let chars: Vec<char> = row.chars().collect();
            if chars.len() != BOARD_SIZE {
                return Err(format!("Board row {} must have {} cells", y, BOARD_SIZE));
            }
            for (x, c) in chars.into_iter().enumerate() {
                cells[y][x] = Piece::from_char(c)?;
            }
        }
        Ok(Board { cells })
    }

    pub fn encode(&self) -> String {
        self.cells
            .iter()
            .map(|row| {
                row.iter()
                    .map(|cell| cell.map_or(EMPTY_CELL, Piece::to_char))
                    .collect::<String>()
            })
            .collect::<Vec<_>>()
            .join(&ROW_SEPARATOR.to_string())
    }

    fn at(&self, pos: Pos) -> Option<Piece> {
        self.cells[pos.y as usize][pos.x as usize]
    }

    fn set(&mut self, pos: Pos, piece: Option<Piece>) {
        self.cells[pos.y as usize][pos.x as usize] = piece;
    }

    fn pieces(&self, side: Side) -> Vec<(Pos, Piece)> {
        let mut found = Vec::new();
        for y in 0..BOARD_SIZE {
            for x in 0..BOARD_SIZE {
                if let Some(piece) = self.cells[y][x] {
                    if piece.side == side {
                        found.push((Pos::new(x as u64, y as u64), piece));
                    }
                }
            }
        }
        found
    }

    /// Square jumped over if `piece` at `from` can capture in direction (dx, dy).
    fn jump_target(&self, from: Pos, piece: Piece, dx: i64, dy: i64) -> Option<(Pos, Pos)> {
        let over = from.offset(dx, dy)?;
        let land = from.offset(2 * dx, 2 * dy)?;
        let jumped = self.at(over)?;
        (jumped.side != piece.side && self.at(land).is_none()).then_some((over, land))
    }

    fn can_jump(&self, side: Side) -> bool {
        self.pieces(side).into_iter().any(|(pos, piece)| {
            piece
                .directions()
                .into_iter()
                .any(|(dx, dy)| self.jump_target(pos, piece, dx, dy).is_some())
        })
    }

    fn has_move(&self, side: Side) -> bool {
        self.can_jump(side)
            || self.pieces(side).into_iter().any(|(pos, piece)| {
                piece.directions().into_iter().any(|(dx, dy)| {
                    pos.offset(dx, dy).is_some_and(|to| self.at(to).is_none())
                })
            })
    }
}

// =============================================================================
// CHECKERS ENGINE
// =============================================================================

/// Standard 8x8 checkers: men step forward diagonally, kings both ways,
/// captures are single jumps and are mandatory when available.
#[derive(Clone, Copy, Debug, Default)]
pub struct Checkers;

impl RulesEngine for Checkers {
    fn play(&self, board: &str, turn: Side, from: Pos, to: Pos) -> Result<MoveResult, String> {
        if !from.on_board() || !to.on_board() {
            return Err("Position is outside the board".to_string());
        }

        let mut board = Board::parse(board)?;
        let piece = board.at(from).ok_or("No piece at source position")?;
        if piece.side != turn {
            return Err(format!("Piece at source belongs to {}, it is {}'s turn", piece.side, turn));
        }
        if board.at(to).is_some() {
            return Err("Destination is already occupied".to_string());
        }

        let dx = to.x as i64 - from.x as i64;
        let dy = to.y as i64 - from.y as i64;
        if dx.abs() != dy.abs() || !(1..=2).contains(&dx.abs()) {
            return Err("Move must be one or two squares diagonally".to_string());
        }
        let (step_x, step_y) = (dx.signum(), dy.signum());
        if !piece.directions().contains(&(step_x, step_y)) {
            return Err("Only kings may move backwards".to_string());
        }

        let captured = if dx.abs() == 2 {
            let (over, _) = board
                .jump_target(from, piece, step_x, step_y)
                .ok_or("Jump must pass over an opponent piece")?;
            board.set(over, None);
            Some(over)
        } else {
            if board.can_jump(turn) {
                return Err("A capture is available and must be taken".to_string());
            }
            None
        };

        board.set(from, None);
        let king = piece.king || to.y == piece.crown_row();
        board.set(to, Some(Piece { side: piece.side, king }));

        let opponent = turn.opponent();
        let outcome = if board.pieces(opponent).is_empty() || !board.has_move(opponent) {
            Outcome::Won(turn)
        } else {
            Outcome::Continue
        };

        Ok(MoveResult {
            board: board.encode(),
            captured,
            outcome,
        })
    }
}

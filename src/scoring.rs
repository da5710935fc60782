//! Area scoring (Chinese rules).
//!
//! - Stones on the board count for their owner
//! - An empty region bordered by only one color is that color's territory
//! - Regions touching both colors, or no stones at all, are neutral
//! - Komi is added to White
//!
//! There is no life-and-death judgement: every stone on the board is
//! scored as alive.

use crate::board::{Board, Color, Point};
use crate::constants::KOMI;

/// Winner of a scored position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    BlackWins,
    WhiteWins,
    Draw,
}

/// A scored board.
#[derive(Debug, Clone, PartialEq)]
pub struct Score {
    pub black_stones: usize,
    pub white_stones: usize,
    pub black_territory: usize,
    pub white_territory: usize,
    pub komi: f64,
    size: usize,
    territory: Vec<Option<Color>>,
}

impl Score {
    /// Black stones plus Black territory.
    pub fn black_total(&self) -> f64 {
        (self.black_stones + self.black_territory) as f64
    }

    /// White stones plus White territory plus komi.
    pub fn white_total(&self) -> f64 {
        (self.white_stones + self.white_territory) as f64 + self.komi
    }

    pub fn total(&self, color: Color) -> f64 {
        match color {
            Color::Black => self.black_total(),
            Color::White => self.white_total(),
        }
    }

    /// True if `color` is strictly ahead.
    pub fn is_win_for(&self, color: Color) -> bool {
        self.total(color) > self.total(color.opponent())
    }

    pub fn outcome(&self) -> Outcome {
        let (b, w) = (self.black_total(), self.white_total());
        if b > w {
            Outcome::BlackWins
        } else if w > b {
            Outcome::WhiteWins
        } else {
            Outcome::Draw
        }
    }

    /// Owner of an empty point, or `None` for stones, neutral points and
    /// points off the board.
    pub fn territory_at(&self, (row, col): Point) -> Option<Color> {
        if row >= self.size || col >= self.size {
            return None;
        }
        self.territory[row * self.size + col]
    }
}

/// Score `board` with the standard [`KOMI`].
pub fn score_board(board: &Board) -> Score {
    score_board_with_komi(board, KOMI)
}

/// Score `board`, adding `komi` to White.
pub fn score_board_with_komi(board: &Board, komi: f64) -> Score {
    let size = board.size();
    let mut territory = vec![None; board.area()];
    let mut visited = vec![false; board.area()];
    let mut region: Vec<Point> = Vec::new();
    let mut stack: Vec<Point> = Vec::new();

    for start in board.points() {
        if board.at(start).is_some() || visited[start.0 * size + start.1] {
            continue;
        }

        region.clear();
        stack.push(start);
        visited[start.0 * size + start.1] = true;
        let mut touches_black = false;
        let mut touches_white = false;

        while let Some(pt) = stack.pop() {
            region.push(pt);
            for n in board.neighbors(pt) {
                match board.at(n) {
                    Some(Color::Black) => touches_black = true,
                    Some(Color::White) => touches_white = true,
                    None => {
                        let ni = n.0 * size + n.1;
                        if !visited[ni] {
                            visited[ni] = true;
                            stack.push(n);
                        }
                    }
                }
            }
        }

        let owner = match (touches_black, touches_white) {
            (true, false) => Some(Color::Black),
            (false, true) => Some(Color::White),
            _ => None,
        };
        if owner.is_some() {
            for &(r, c) in &region {
                territory[r * size + c] = owner;
            }
        }
    }

    let black_territory = territory.iter().filter(|&&t| t == Some(Color::Black)).count();
    let white_territory = territory.iter().filter(|&&t| t == Some(Color::White)).count();

    Score {
        black_stones: board.stone_count(Color::Black),
        white_stones: board.stone_count(Color::White),
        black_territory,
        white_territory,
        komi,
        size,
        territory,
    }
}

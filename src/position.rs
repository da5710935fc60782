//! Move execution and legality.
//!
//! This module provides the rules of play on top of [`Board`]:
//! - Stone placement with capture and suicide resolution ([`try_place`])
//! - Full moves with ko tracking ([`make_move`])
//! - A cheap legality heuristic and an exact, simulated legality check
//! - Eye detection for the playout policy
//!
//! The ko rule is a single-move restriction: after a one-stone capture by a
//! lone stone left with one liberty, the captured point is forbidden for the
//! very next move only. Longer cycles are not detected.

use thiserror::Error;

use crate::board::{Board, BoardError, Color, Point, group_at};

/// Why a move was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MoveError {
    /// Point is not empty
    #[error("Illegal move: point not EMPTY")]
    Occupied,
    /// Move retakes the ko point
    #[error("Illegal move: retakes ko")]
    Ko,
    /// Move would leave its own group without liberties
    #[error("Illegal move: suicide")]
    Suicide,
    #[error(transparent)]
    OutOfBounds(#[from] BoardError),
}

/// Result of a successful [`make_move`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveOutcome {
    /// Number of opponent stones removed
    pub captures: usize,
    /// Point the opponent may not play on their next move
    pub ko: Option<Point>,
}

/// Place a stone and resolve captures, mutating `board` in place.
///
/// Opponent groups left without liberties are removed before the suicide
/// check, so a move that captures is never suicide. On any error the board
/// is left exactly as it was.
///
/// Returns the number of captured stones.
pub fn try_place(
    board: &mut Board,
    pt: Point,
    color: Color,
    check_ko: bool,
    ko: Option<Point>,
) -> Result<usize, MoveError> {
    board.check(pt)?;
    if board.at(pt).is_some() {
        return Err(MoveError::Occupied);
    }
    if check_ko && ko == Some(pt) {
        return Err(MoveError::Ko);
    }

    board.put(pt, Some(color));
    let opp = color.opponent();
    let mut captured: Vec<Point> = Vec::new();

    for n in board.neighbors(pt) {
        // A group already removed through another neighbor reads as empty here
        if board.at(n) != Some(opp) {
            continue;
        }
        let g = group_at(board, n);
        if g.liberty_count() == 0 {
            for &s in &g.stones {
                board.put(s, None);
            }
            captured.extend(g.stones);
        }
    }

    if group_at(board, pt).liberty_count() == 0 {
        board.put(pt, None);
        for &s in &captured {
            board.put(s, Some(opp));
        }
        return Err(MoveError::Suicide);
    }

    Ok(captured.len())
}

/// Play a full move for `color`, honoring and updating the ko point.
///
/// The move is tried on a copy of the board and only committed if legal.
pub fn make_move(
    board: &mut Board,
    pt: Point,
    color: Color,
    ko: Option<Point>,
) -> Result<MoveOutcome, MoveError> {
    let mut next = board.clone();
    let captures = try_place(&mut next, pt, color, true, ko)?;

    let mut new_ko = None;
    if captures == 1 {
        let own = group_at(&next, pt);
        if own.len() == 1 && own.liberty_count() == 1 {
            new_ko = Some(own.liberties[0]);
        }
    }

    *board = next;
    Ok(MoveOutcome {
        captures,
        ko: new_ko,
    })
}

/// Quick legality estimate without simulating the move.
///
/// True when the point is empty, not the ko point, and either has an empty
/// neighbor, touches an opponent group in atari, or touches a friendly group
/// with more than one liberty. Multi-stone self-atari shapes can be misjudged.
pub fn is_likely_legal_fast(board: &Board, pt: Point, color: Color, ko: Option<Point>) -> bool {
    if !board.contains(pt) || board.at(pt).is_some() || ko == Some(pt) {
        return false;
    }
    if board.neighbors(pt).any(|n| board.at(n).is_none()) {
        return true;
    }
    let opp = color.opponent();
    if board
        .neighbors(pt)
        .any(|n| board.at(n) == Some(opp) && group_at(board, n).liberty_count() == 1)
    {
        return true;
    }
    board
        .neighbors(pt)
        .any(|n| board.at(n) == Some(color) && group_at(board, n).liberty_count() > 1)
}

/// All points passing [`is_likely_legal_fast`]. Used by playouts.
pub fn legal_moves_fast(board: &Board, color: Color, ko: Option<Point>) -> Vec<Point> {
    board
        .points()
        .filter(|&pt| is_likely_legal_fast(board, pt, color, ko))
        .collect()
}

/// All points where [`try_place`] actually succeeds. Exact but costly; used
/// to populate search tree nodes.
pub fn legal_moves_strict(board: &Board, color: Color, ko: Option<Point>) -> Vec<Point> {
    let mut moves = Vec::new();
    let mut scratch = board.clone();
    for pt in board.points() {
        if board.at(pt).is_some() || ko == Some(pt) {
            continue;
        }
        if try_place(&mut scratch, pt, color, true, ko).is_ok() {
            moves.push(pt);
            scratch.clone_from(board);
        }
    }
    moves
}

/// Check if an empty point is a probable eye of `color`.
///
/// Every orthogonal neighbor must be `color`. Diagonals: at the edge or in a
/// corner (fewer than three diagonals) all of them must be `color`; in the
/// interior one of the four may differ.
pub fn is_eye(board: &Board, pt: Point, color: Color) -> bool {
    if !board.contains(pt) || board.at(pt).is_some() {
        return false;
    }
    if board.neighbors(pt).any(|n| board.at(n) != Some(color)) {
        return false;
    }

    let mut diagonals = 0;
    let mut same = 0;
    for d in board.diagonals(pt) {
        diagonals += 1;
        if board.at(d) == Some(color) {
            same += 1;
        }
    }
    let needed = if diagonals <= 2 { diagonals } else { diagonals - 1 };
    same >= needed
}

//! Monte Carlo playouts (random game simulation).
//!
//! A playout alternates random moves from a position until both sides pass
//! in succession or the ply cap is hit. The policy is deliberately light:
//! - pass with a small fixed probability
//! - pick uniformly among fast-legal points
//! - avoid filling the mover's own probable eyes

use fastrand::Rng;

use crate::board::{Board, Color, Point};
use crate::constants::{PASSES_TO_END, PLAYOUT_EYE_ATTEMPTS, PLAYOUT_PLY_FACTOR, PROB_PLAYOUT_PASS};
use crate::position::{is_eye, legal_moves_fast, make_move};

/// Plies a playout may last on `board`.
#[inline]
pub fn ply_cap(board: &Board) -> usize {
    PLAYOUT_PLY_FACTOR * board.area()
}

/// Play random moves on `board` until the game ends or the ply cap is reached.
///
/// `passes` is the number of consecutive passes already made before the
/// playout starts. Returns the number of plies played (passes included).
pub fn mcplayout(
    board: &mut Board,
    mut to_move: Color,
    mut ko: Option<Point>,
    mut passes: u32,
    rng: &mut Rng,
) -> usize {
    let cap = ply_cap(board);
    let mut plies = 0;

    while passes < PASSES_TO_END && plies < cap {
        plies += 1;
        match choose_random_move(board, to_move, ko, rng) {
            Some(pt) => {
                // A suicide let through by the fast check leaves the board as is
                ko = make_move(board, pt, to_move, ko).ok().and_then(|o| o.ko);
                passes = 0;
            }
            None => {
                ko = None;
                passes += 1;
            }
        }
        to_move = to_move.opponent();
    }

    plies
}

/// Pick a random fast-legal point that is not one of `color`'s own eyes.
///
/// Returns `None` (pass) on the random pass roll, when there are no legal
/// points, or when every sampled candidate was an eye.
fn choose_random_move(board: &Board, color: Color, ko: Option<Point>, rng: &mut Rng) -> Option<Point> {
    let legal = legal_moves_fast(board, color, ko);
    if legal.is_empty() || rng.f64() < PROB_PLAYOUT_PASS {
        return None;
    }
    (0..PLAYOUT_EYE_ATTEMPTS)
        .map(|_| legal[rng.usize(..legal.len())])
        .find(|&pt| !is_eye(board, pt, color))
}

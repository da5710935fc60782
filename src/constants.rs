//! Constants for board dimensions, scoring, and search parameters.
//!
//! # Board Size Configuration
//!
//! The default board size is controlled by Cargo features:
//! - `board9x9` (default): 9x9 board
//! - `board13x13`: 13x13 board
//!
//! ```sh
//! cargo build                                              # 9x9 (default)
//! cargo build --no-default-features --features board13x13  # 13x13
//! ```
//!
//! A [`Board`](crate::board::Board) can still be constructed with any size;
//! the feature only picks the size used by defaults and the CLI.

// =============================================================================
// Board Geometry
// =============================================================================

/// Default board size (NxN).
#[cfg(feature = "board9x9")]
pub const N: usize = 9;

#[cfg(feature = "board13x13")]
pub const N: usize = 13;

// Compile-time check: exactly one board size feature must be enabled
#[cfg(all(feature = "board9x9", feature = "board13x13"))]
compile_error!("Cannot enable both 'board9x9' and 'board13x13' features at the same time");

#[cfg(not(any(feature = "board9x9", feature = "board13x13")))]
compile_error!("Must enable exactly one board size feature: 'board9x9' or 'board13x13'");

/// Largest board that can be named with Go column letters (A-Z without I).
pub const MAX_SIZE: usize = 25;

/// Column letters. 'I' is skipped to avoid confusion with 'J'.
pub const COLUMN_LETTERS: &[u8] = b"ABCDEFGHJKLMNOPQRSTUVWXYZ";

// =============================================================================
// Scoring
// =============================================================================

/// Compensation added to White's area score.
pub const KOMI: f64 = 6.5;

// =============================================================================
// MCTS Parameters
// =============================================================================

/// UCB1 exploration constant.
pub const UCB_EXPLORATION: f64 = 1.41;

/// Consecutive passes that end a game (in play, in the tree, and in playouts).
pub const PASSES_TO_END: u32 = 2;

/// Simulations used by [`crate::mcts::SearchConfig::default`].
pub const N_SIMS: usize = 500;

// =============================================================================
// Playout Policy
// =============================================================================

/// Probability of passing at any playout step.
pub const PROB_PLAYOUT_PASS: f64 = 0.1;

/// Random candidates drawn before a playout step gives up and passes.
pub const PLAYOUT_EYE_ATTEMPTS: usize = 5;

/// Playout ply cap as a multiple of the board area.
pub const PLAYOUT_PLY_FACTOR: usize = 2;

// =============================================================================
// AI Budget Schedule
// =============================================================================

/// Stone-count thresholds and the simulation budget used below each.
/// Positions with at least the last threshold's stones use [`AI_SIMS_LATE`].
pub const AI_SIMS_SCHEDULE: [(usize, usize); 2] = [(10, 400), (30, 500)];

/// Simulation budget for crowded boards.
pub const AI_SIMS_LATE: usize = 600;

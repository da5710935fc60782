//! Baduk: a Go rules engine with a Monte Carlo Tree Search opponent.
//!
//! ## Modules
//!
//! - [`constants`] - Board size, komi, and search parameters
//! - [`board`] - Board storage, neighbors, and group/liberty analysis
//! - [`position`] - Move execution, captures, suicide, ko, legality, eyes
//! - [`scoring`] - Area scoring with komi
//! - [`playout`] - Random game simulation for position evaluation
//! - [`mcts`] - Monte Carlo Tree Search with UCB1
//! - [`session`] - A human-vs-engine game with a background AI turn
//! - [`console`] - Terminal front-end for a session
//!
//! ## Example
//!
//! ```
//! use baduk::board::{Board, Color};
//! use baduk::mcts::{Action, choose_move};
//! use baduk::position::make_move;
//!
//! let mut board = Board::new(9);
//! let outcome = make_move(&mut board, (4, 4), Color::Black, None).unwrap();
//! assert_eq!(outcome.captures, 0);
//!
//! // Let the engine find White's reply
//! let reply = choose_move(&board, Color::White, outcome.ko, 100);
//! if let Action::Play(pt) = reply {
//!     assert!(board.contains(pt));
//! }
//! ```

pub mod board;
pub mod console;
pub mod constants;
pub mod mcts;
pub mod playout;
pub mod position;
pub mod scoring;
pub mod session;

//! A game between a human and the MCTS engine.
//!
//! [`GameSession`] owns the live board and everything that changes from move
//! to move: side to move, ko point, pass counter, capture totals, and the
//! move history. The engine only ever searches on copies of the board, so
//! the live position is touched exclusively through [`GameSession::play`],
//! [`GameSession::pass`] and the AI turn methods.
//!
//! The AI turn comes in two flavors:
//! - [`GameSession::ai_move`] searches and plays in one blocking call
//! - [`GameSession::start_ai_turn`] runs the search on a background thread
//!   owned by the session; [`GameSession::poll_ai_turn`] plays the result once
//!   it is ready, [`GameSession::finish_ai_turn`] waits for it, and
//!   [`GameSession::cancel_ai_turn`] discards it. While a turn is pending the
//!   session reports [`GameSession::is_thinking`] and rejects other moves.

use std::io;
use std::thread::{self, JoinHandle};

use log::{info, warn};
use thiserror::Error;

use crate::board::{Board, Color, Point};
use crate::constants::{AI_SIMS_LATE, AI_SIMS_SCHEDULE, KOMI, N, PASSES_TO_END, UCB_EXPLORATION};
use crate::mcts::{Action, SearchConfig, SearchReport, tree_search};
use crate::position::{MoveError, MoveOutcome, is_likely_legal_fast, make_move};
use crate::scoring::{Score, score_board_with_komi};

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("the game is over")]
    GameOver,
    #[error("not your turn")]
    NotYourTurn,
    #[error("the AI is still thinking")]
    AiThinking,
    #[error("no AI turn is pending")]
    NoAiTurn,
    #[error(transparent)]
    Illegal(#[from] MoveError),
    #[error("failed to start the AI search: {0}")]
    Spawn(#[from] io::Error),
    #[error("the AI search thread panicked")]
    AiTurnFailed,
}

/// Game parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct GameConfig {
    pub size: usize,
    pub komi: f64,
    /// Color played by the human; the engine plays the other one
    pub human: Color,
    /// Fixed AI budget; `None` uses the stone-count schedule
    pub simulations: Option<usize>,
    /// RNG seed for the AI search
    pub seed: Option<u64>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            size: N,
            komi: KOMI,
            human: Color::Black,
            simulations: None,
            seed: None,
        }
    }
}

/// One entry of the move history.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveRecord {
    pub color: Color,
    pub action: Action,
    pub captures: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub enum GameStatus {
    Playing,
    /// Two consecutive passes; final score attached
    Over(Score),
}

pub struct GameSession {
    config: GameConfig,
    board: Board,
    to_move: Color,
    ko: Option<Point>,
    passes: u32,
    /// Stones captured by Black and by White
    captures: [usize; 2],
    history: Vec<MoveRecord>,
    over: bool,
    /// Background search for the side to move, if one is running
    pending: Option<JoinHandle<SearchReport>>,
}

impl Default for GameSession {
    fn default() -> Self {
        Self::new(GameConfig::default())
    }
}

impl GameSession {
    /// Start a new game. Black moves first.
    pub fn new(config: GameConfig) -> Self {
        Self {
            board: Board::new(config.size),
            config,
            to_move: Color::Black,
            ko: None,
            passes: 0,
            captures: [0, 0],
            history: Vec::new(),
            over: false,
            pending: None,
        }
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn to_move(&self) -> Color {
        self.to_move
    }

    pub fn ko(&self) -> Option<Point> {
        self.ko
    }

    /// Consecutive passes so far.
    pub fn passes(&self) -> u32 {
        self.passes
    }

    pub fn captures(&self, color: Color) -> usize {
        self.captures[color_index(color)]
    }

    pub fn history(&self) -> &[MoveRecord] {
        &self.history
    }

    pub fn last_move(&self) -> Option<Action> {
        self.history.last().map(|m| m.action)
    }

    pub fn human(&self) -> Color {
        self.config.human
    }

    pub fn ai_color(&self) -> Color {
        self.config.human.opponent()
    }

    pub fn is_over(&self) -> bool {
        self.over
    }

    pub fn is_thinking(&self) -> bool {
        self.pending.is_some()
    }

    /// Live area score with the session's komi.
    pub fn score(&self) -> Score {
        score_board_with_komi(&self.board, self.config.komi)
    }

    pub fn status(&self) -> GameStatus {
        if self.over {
            GameStatus::Over(self.score())
        } else {
            GameStatus::Playing
        }
    }

    /// Cheap legality preview for the side to move.
    pub fn looks_legal(&self, pt: Point) -> bool {
        !self.over && is_likely_legal_fast(&self.board, pt, self.to_move, self.ko)
    }

    /// Place a stone for the side to move.
    pub fn play(&mut self, pt: Point) -> Result<MoveOutcome, SessionError> {
        self.ensure_can_move()?;
        let color = self.to_move;
        let outcome = make_move(&mut self.board, pt, color, self.ko)?;

        self.captures[color_index(color)] += outcome.captures;
        self.ko = outcome.ko;
        self.passes = 0;
        self.history.push(MoveRecord {
            color,
            action: Action::Play(pt),
            captures: outcome.captures,
        });
        self.to_move = color.opponent();
        info!(
            "{color} plays {} (captures {})",
            Action::Play(pt).name(self.board.size()),
            outcome.captures
        );
        Ok(outcome)
    }

    /// Pass for the side to move. The second pass in a row ends the game.
    pub fn pass(&mut self) -> Result<(), SessionError> {
        self.ensure_can_move()?;
        let color = self.to_move;
        self.passes += 1;
        self.ko = None;
        self.history.push(MoveRecord {
            color,
            action: Action::Pass,
            captures: 0,
        });
        self.to_move = color.opponent();
        info!("{color} passes");

        if self.passes >= PASSES_TO_END {
            self.over = true;
            let score = self.score();
            info!(
                "game over: black {} white {:.1} ({:?})",
                score.black_total(),
                score.white_total(),
                score.outcome()
            );
        }
        Ok(())
    }

    /// Play `action` for the human. Fails with [`SessionError::NotYourTurn`]
    /// when the engine is to move.
    pub fn human_move(&mut self, action: Action) -> Result<(), SessionError> {
        self.ensure_can_move()?;
        if self.to_move != self.config.human {
            return Err(SessionError::NotYourTurn);
        }
        self.apply(action)
    }

    /// Play `action` for the side to move.
    pub fn apply(&mut self, action: Action) -> Result<(), SessionError> {
        match action {
            Action::Play(pt) => self.play(pt).map(|_| ()),
            Action::Pass => self.pass(),
        }
    }

    /// Simulations the engine spends on the current position. Busier boards
    /// get a larger budget unless the config fixes one.
    pub fn ai_budget(&self) -> usize {
        if let Some(sims) = self.config.simulations {
            return sims;
        }
        let stones = self.board.stones();
        AI_SIMS_SCHEDULE
            .iter()
            .find(|&&(limit, _)| stones < limit)
            .map_or(AI_SIMS_LATE, |&(_, sims)| sims)
    }

    pub fn search_config(&self) -> SearchConfig {
        SearchConfig {
            simulations: self.ai_budget(),
            exploration: UCB_EXPLORATION,
            komi: self.config.komi,
            seed: self.config.seed,
        }
    }

    /// Search for the side to move and play the result. Blocks until done.
    pub fn ai_move(&mut self) -> Result<Action, SessionError> {
        self.ensure_can_move()?;
        let report = tree_search(&self.board, self.to_move, self.ko, &self.search_config());
        self.apply_ai_action(report.action)
    }

    /// Start searching for the side to move on a background thread.
    pub fn start_ai_turn(&mut self) -> Result<(), SessionError> {
        self.ensure_can_move()?;
        let board = self.board.clone();
        let color = self.to_move;
        let ko = self.ko;
        let config = self.search_config();

        let handle = thread::Builder::new()
            .name("ai-search".into())
            .spawn(move || tree_search(&board, color, ko, &config))?;
        self.pending = Some(handle);
        Ok(())
    }

    /// Play the pending AI move if the search has finished. Returns
    /// `Ok(None)` while it is still running.
    pub fn poll_ai_turn(&mut self) -> Result<Option<Action>, SessionError> {
        let ready = self
            .pending
            .as_ref()
            .ok_or(SessionError::NoAiTurn)?
            .is_finished();
        if !ready {
            return Ok(None);
        }
        self.finish_ai_turn().map(Some)
    }

    /// Wait for the pending AI turn and play its move.
    pub fn finish_ai_turn(&mut self) -> Result<Action, SessionError> {
        let handle = self.pending.take().ok_or(SessionError::NoAiTurn)?;
        let report = handle.join().map_err(|_| SessionError::AiTurnFailed)?;
        self.apply_ai_action(report.action)
    }

    /// Abandon the pending AI turn. The search thread runs to completion
    /// in the background and its result is dropped.
    pub fn cancel_ai_turn(&mut self) -> bool {
        let cancelled = self.pending.take().is_some();
        if cancelled {
            info!("AI turn cancelled");
        }
        cancelled
    }

    /// An engine move that turns out to be illegal is played as a pass.
    fn apply_ai_action(&mut self, action: Action) -> Result<Action, SessionError> {
        if let Action::Play(pt) = action {
            match self.play(pt) {
                Ok(_) => return Ok(action),
                Err(SessionError::Illegal(err)) => {
                    warn!("engine chose an illegal move ({err}), passing instead");
                }
                Err(err) => return Err(err),
            }
        }
        self.pass()?;
        Ok(Action::Pass)
    }

    fn ensure_can_move(&self) -> Result<(), SessionError> {
        if self.over {
            Err(SessionError::GameOver)
        } else if self.pending.is_some() {
            Err(SessionError::AiThinking)
        } else {
            Ok(())
        }
    }
}

#[inline]
fn color_index(color: Color) -> usize {
    match color {
        Color::Black => 0,
        Color::White => 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small(simulations: usize) -> GameSession {
        GameSession::new(GameConfig {
            size: 5,
            simulations: Some(simulations),
            seed: Some(17),
            ..GameConfig::default()
        })
    }

    #[test]
    fn test_turns_alternate() {
        let mut game = small(10);
        assert_eq!(game.to_move(), Color::Black);
        game.play((2, 2)).unwrap();
        assert_eq!(game.to_move(), Color::White);
        assert_eq!(game.last_move(), Some(Action::Play((2, 2))));
    }

    #[test]
    fn test_illegal_move_keeps_turn() {
        let mut game = small(10);
        game.play((2, 2)).unwrap();
        assert!(matches!(
            game.play((2, 2)),
            Err(SessionError::Illegal(MoveError::Occupied))
        ));
        assert_eq!(game.to_move(), Color::White);
        assert_eq!(game.history().len(), 1);
    }

    #[test]
    fn test_captures_are_counted() {
        let mut game = small(10);
        // Black surrounds White's corner stone
        game.play((0, 1)).unwrap();
        game.play((0, 0)).unwrap();
        game.play((1, 0)).unwrap();
        assert_eq!(game.captures(Color::Black), 1);
        assert_eq!(game.board().get((0, 0)), Ok(None));
        assert_eq!(game.history()[2].captures, 1);
    }

    #[test]
    fn test_two_passes_end_game() {
        let mut game = small(10);
        game.play((2, 2)).unwrap();
        game.pass().unwrap();
        assert_eq!(game.status(), GameStatus::Playing);
        game.pass().unwrap();
        assert!(game.is_over());
        match game.status() {
            GameStatus::Over(score) => {
                assert_eq!(score.black_total(), 25.0);
                assert_eq!(score.white_total(), KOMI);
            }
            GameStatus::Playing => panic!("game should be over"),
        }
        assert!(matches!(game.play((0, 0)), Err(SessionError::GameOver)));
        assert!(matches!(game.ai_move(), Err(SessionError::GameOver)));
    }

    #[test]
    fn test_stone_resets_pass_counter() {
        let mut game = small(10);
        game.pass().unwrap();
        game.play((1, 1)).unwrap();
        assert_eq!(game.passes(), 0);
        game.pass().unwrap();
        assert!(!game.is_over());
    }

    #[test]
    fn test_budget_schedule() {
        let mut game = GameSession::default();
        assert_eq!(game.ai_budget(), 400);
        for col in 0..9 {
            game.play((0, col)).unwrap();
            game.play((4, col)).unwrap();
        }
        assert_eq!(game.board().stones(), 18);
        assert_eq!(game.ai_budget(), 500);
    }

    #[test]
    fn test_ai_move_plays_for_side_to_move() {
        let mut game = small(30);
        game.play((2, 2)).unwrap();
        let action = game.ai_move().unwrap();
        assert_eq!(game.to_move(), Color::Black);
        let last = game.history().last().unwrap();
        assert_eq!(last.color, Color::White);
        assert_eq!(last.action, action);
    }

    #[test]
    fn test_two_phase_ai_turn() {
        let mut game = small(30);
        game.play((2, 2)).unwrap();
        let before = game.board().clone();

        game.start_ai_turn().unwrap();
        assert!(game.is_thinking());
        assert!(matches!(game.play((0, 0)), Err(SessionError::AiThinking)));
        assert!(matches!(game.start_ai_turn(), Err(SessionError::AiThinking)));
        // The live board is untouched while the search runs
        assert_eq!(game.board(), &before);

        let action = game.finish_ai_turn().unwrap();
        assert!(!game.is_thinking());
        assert_eq!(game.to_move(), Color::Black);
        assert_eq!(game.last_move(), Some(action));
        assert!(matches!(game.finish_ai_turn(), Err(SessionError::NoAiTurn)));
    }

    #[test]
    fn test_poll_ai_turn_until_ready() {
        let mut game = small(20);
        assert!(matches!(game.poll_ai_turn(), Err(SessionError::NoAiTurn)));
        game.start_ai_turn().unwrap();

        let action = loop {
            if let Some(action) = game.poll_ai_turn().unwrap() {
                break action;
            }
            std::thread::sleep(std::time::Duration::from_millis(5));
        };
        assert!(!game.is_thinking());
        assert_eq!(game.history().len(), 1);
        assert_eq!(game.history()[0].color, Color::Black);
        assert_eq!(game.last_move(), Some(action));
    }

    #[test]
    fn test_cancelled_ai_turn_releases_session() {
        let mut game = small(20);
        game.play((2, 2)).unwrap();
        game.start_ai_turn().unwrap();
        assert!(game.cancel_ai_turn());
        assert!(!game.is_thinking());
        assert!(!game.cancel_ai_turn());

        // The abandoned search never reaches the board
        std::thread::sleep(std::time::Duration::from_millis(50));
        assert_eq!(game.history().len(), 1);
        assert_eq!(game.to_move(), Color::White);
        game.play((0, 0)).unwrap();
        game.pass().unwrap();
        game.start_ai_turn().unwrap();
        game.finish_ai_turn().unwrap();
        assert!(!game.is_thinking());
    }

    #[test]
    fn test_human_move_checks_turn() {
        let mut game = GameSession::new(GameConfig {
            size: 5,
            human: Color::White,
            simulations: Some(10),
            seed: Some(4),
            ..GameConfig::default()
        });
        assert!(matches!(
            game.human_move(Action::Play((2, 2))),
            Err(SessionError::NotYourTurn)
        ));
        assert!(game.history().is_empty());

        game.ai_move().unwrap();
        let free = game
            .board()
            .points()
            .find(|&pt| game.board().get(pt) == Ok(None))
            .unwrap();
        game.human_move(Action::Play(free)).unwrap();
        assert_eq!(game.to_move(), Color::Black);
        assert!(matches!(
            game.human_move(Action::Pass),
            Err(SessionError::NotYourTurn)
        ));
    }
}

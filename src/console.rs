//! Line-oriented terminal front-end.
//!
//! Reads one command per line, answers `= <text>` on success and
//! `? <text>` on failure, the same framing GTP uses.
//!
//! ## Supported Commands
//!
//! - `play <vertex>` or just `<vertex>` - Place a stone, then let the engine reply
//! - `pass` - Pass, then let the engine reply
//! - `show` - Print the board
//! - `score` - Print the current area score
//! - `hint <vertex>` - Quick legality preview of a vertex
//! - `new` - Start a new game with the same settings
//! - `help` - List commands
//! - `quit` - Exit

use std::io::{self, BufRead, Write};

use crate::board::{Color, parse_point};
use crate::mcts::Action;
use crate::scoring::Outcome;
use crate::session::{GameConfig, GameSession, SessionError};

const COMMANDS: &[&str] = &["play", "pass", "show", "score", "hint", "new", "help", "quit"];

/// Console state.
pub struct Console {
    session: GameSession,
}

impl Console {
    pub fn new(config: GameConfig) -> Self {
        Self {
            session: GameSession::new(config),
        }
    }

    pub fn session(&self) -> &GameSession {
        &self.session
    }

    /// Run the command loop until `quit` or end of input.
    pub fn run<R: BufRead, W: Write>(&mut self, input: R, out: &mut W) -> io::Result<()> {
        writeln!(
            out,
            "You play {}. Type 'help' for commands.",
            self.session.human()
        )?;
        if let Some(reply) = self.engine_turn(out)? {
            writeln!(out, "{reply}")?;
        }
        writeln!(out, "{}", self.session.board())?;

        for line in input.lines() {
            let line = line?;
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let parts: Vec<&str> = line.split_whitespace().collect();
            let command = parts[0].to_lowercase();
            let args = &parts[1..];

            let (success, message) = self.execute(&command, args, out)?;
            let prefix = if success { '=' } else { '?' };
            writeln!(out, "{prefix} {message}\n")?;
            out.flush()?;

            if command == "quit" {
                break;
            }
        }
        Ok(())
    }

    /// Execute one command and return (success, response).
    fn execute<W: Write>(
        &mut self,
        command: &str,
        args: &[&str],
        out: &mut W,
    ) -> io::Result<(bool, String)> {
        let size = self.session.board().size();
        let response = match command {
            "help" => (true, COMMANDS.join(" ")),

            "quit" => (true, "bye".to_string()),

            "show" => (true, self.describe()),

            "score" => {
                let score = self.session.score();
                (
                    true,
                    format!(
                        "black {} white {:.1}",
                        score.black_total(),
                        score.white_total()
                    ),
                )
            }

            "new" => {
                self.session = GameSession::new(self.session.config().clone());
                let reply = self.engine_turn(out)?.unwrap_or_default();
                (true, format!("{reply}\n{}", self.describe()))
            }

            "hint" => match args.first().and_then(|v| parse_point(v, size)) {
                Some(pt) => (true, self.session.looks_legal(pt).to_string()),
                None => (false, "missing or invalid vertex".to_string()),
            },

            "pass" => self.human_turn(Action::Pass, out)?,

            "play" => match args.first().map(|v| parse_point(v, size)) {
                Some(Some(pt)) => self.human_turn(Action::Play(pt), out)?,
                Some(None) => (false, "invalid vertex".to_string()),
                None => (false, "missing argument".to_string()),
            },

            other => match parse_point(other, size) {
                Some(pt) => self.human_turn(Action::Play(pt), out)?,
                None => (false, format!("unknown command: {other}")),
            },
        };
        Ok(response)
    }

    /// Apply the human's action and, if the game goes on, the engine's reply.
    fn human_turn<W: Write>(&mut self, action: Action, out: &mut W) -> io::Result<(bool, String)> {
        if let Err(err) = self.session.human_move(action) {
            return Ok((false, err.to_string()));
        }
        let mut text = self.engine_turn(out)?.unwrap_or_default();
        text.push('\n');
        text.push_str(&self.describe());
        Ok((true, text))
    }

    /// Let the engine move if it is its turn. Returns a line describing the
    /// reply, or `None` if the engine had nothing to do.
    fn engine_turn<W: Write>(&mut self, out: &mut W) -> io::Result<Option<String>> {
        if self.session.is_over() || self.session.to_move() != self.session.ai_color() {
            return Ok(None);
        }
        let color = self.session.ai_color();
        let result = match self.session.start_ai_turn() {
            Ok(()) => {
                writeln!(out, "{color} is thinking...")
                    .and_then(|_| out.flush())
                    .inspect_err(|_| {
                        self.session.cancel_ai_turn();
                    })?;
                self.session.finish_ai_turn()
            }
            Err(err) => Err(err),
        };
        let size = self.session.board().size();
        let line = match result {
            Ok(action) => format!("{color} plays {}", action.name(size)),
            Err(SessionError::GameOver) => return Ok(None),
            Err(err) => format!("engine error: {err}"),
        };
        Ok(Some(line))
    }

    fn describe(&self) -> String {
        let s = &self.session;
        let mut text = format!(
            "{}captures: black {} white {}",
            s.board(),
            s.captures(Color::Black),
            s.captures(Color::White)
        );
        if s.is_over() {
            let score = s.score();
            let verdict = match score.outcome() {
                Outcome::BlackWins => "Black wins",
                Outcome::WhiteWins => "White wins",
                Outcome::Draw => "Draw",
            };
            text.push_str(&format!(
                "\ngame over: {verdict} (B {} - W {:.1})",
                score.black_total(),
                score.white_total()
            ));
        }
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn console() -> Console {
        Console::new(GameConfig {
            size: 5,
            simulations: Some(20),
            seed: Some(3),
            ..GameConfig::default()
        })
    }

    fn run(console: &mut Console, script: &str) -> String {
        let mut out = Vec::new();
        console.run(script.as_bytes(), &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_help_and_quit() {
        let mut c = console();
        let text = run(&mut c, "help\nquit\nshow\n");
        assert!(text.contains("= play pass show"));
        assert!(text.contains("= bye"));
        // Nothing after quit is executed
        assert_eq!(text.matches("captures:").count(), 0);
    }

    #[test]
    fn test_play_gets_engine_reply() {
        let mut c = console();
        let text = run(&mut c, "play C3\n");
        assert!(text.contains("white is thinking..."));
        assert!(text.contains("white plays"));
        assert_eq!(c.session().history().len(), 2);
        assert_eq!(c.session().to_move(), Color::Black);
    }

    #[test]
    fn test_bare_vertex_and_errors() {
        let mut c = console();
        let text = run(&mut c, "c3\nplay Z9\nplay\nfoo\n");
        assert!(text.contains("? invalid vertex"));
        assert!(text.contains("? missing argument"));
        assert!(text.contains("? unknown command: foo"));
        assert_eq!(c.session().history().len(), 2);
    }

    #[test]
    fn test_occupied_point_is_rejected() {
        let mut c = console();
        let text = run(&mut c, "C3\nC3\n");
        assert!(text.contains("? Illegal move: point not EMPTY"));
    }

    #[test]
    fn test_engine_opens_when_human_is_white() {
        let mut c = Console::new(GameConfig {
            size: 5,
            human: Color::White,
            simulations: Some(10),
            seed: Some(1),
            ..GameConfig::default()
        });
        let text = run(&mut c, "score\n");
        assert!(text.contains("black plays"));
        assert_eq!(c.session().to_move(), Color::White);
    }
}

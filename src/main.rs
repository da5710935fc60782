//! Baduk: play Go against a Monte Carlo Tree Search engine.
//!
//! ## Usage
//!
//! - `baduk` - Show a demo
//! - `baduk play` - Play against the engine in the terminal
//! - `baduk demo` - Run the demo
//!
//! Log output goes to stderr; set `RUST_LOG=debug` to see search summaries.

use std::io;

use anyhow::{Context, Result};
use clap::builder::TypedValueParser as _;
use clap::{Parser, Subcommand, ValueEnum};
use flexi_logger::Logger;

use baduk::board::{Board, Color};
use baduk::console::Console;
use baduk::constants::{KOMI, MAX_SIZE, N};
use baduk::mcts::{SearchConfig, tree_search};
use baduk::position::make_move;
use baduk::scoring::score_board;
use baduk::session::GameConfig;

/// Baduk: a Go engine with an MCTS opponent
#[derive(Parser)]
#[command(name = "baduk")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Play a game against the engine
    Play {
        /// Board size
        #[arg(long, default_value_t = N, value_parser = clap::value_parser!(u64).range(2..=MAX_SIZE as u64).map(|v| v as usize))]
        size: usize,
        /// Compensation for White
        #[arg(long, default_value_t = KOMI)]
        komi: f64,
        /// Fixed simulations per engine move (default: scaled by stone count)
        #[arg(long)]
        simulations: Option<usize>,
        /// Your color
        #[arg(long, value_enum, default_value_t = Side::Black)]
        color: Side,
        /// Seed for the engine's random number generator
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Run a simple demo of the engine
    Demo {
        /// Simulations for the demo search
        #[arg(long, default_value_t = 200)]
        simulations: usize,
    },
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum Side {
    Black,
    White,
}

impl From<Side> for Color {
    fn from(side: Side) -> Self {
        match side {
            Side::Black => Color::Black,
            Side::White => Color::White,
        }
    }
}

fn main() -> Result<()> {
    let _logger = Logger::try_with_env_or_str("warn")
        .context("invalid log specification")?
        .log_to_stderr()
        .start()
        .context("failed to start logger")?;

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Play {
            size,
            komi,
            simulations,
            color,
            seed,
        }) => {
            let config = GameConfig {
                size,
                komi,
                human: color.into(),
                simulations,
                seed,
            };
            let mut console = Console::new(config);
            let stdin = io::stdin();
            let mut stdout = io::stdout();
            console
                .run(stdin.lock(), &mut stdout)
                .context("console I/O failed")?;
        }
        Some(Commands::Demo { simulations }) => run_demo(simulations)?,
        None => run_demo(200)?,
    }
    Ok(())
}

fn run_demo(simulations: usize) -> Result<()> {
    println!("Baduk: Go with an MCTS opponent\n");

    println!("=== Moves ===");
    let mut board = Board::new(N);
    let mut ko = None;
    for (pt, color) in [((4, 4), Color::Black), ((4, 5), Color::White), ((4, 6), Color::Black)] {
        let outcome = make_move(&mut board, pt, color, ko).context("demo move rejected")?;
        println!("{color} at {pt:?}: captures {}", outcome.captures);
        ko = outcome.ko;
    }
    println!("{board}");

    let score = score_board(&board);
    println!(
        "Score: black {} white {:.1}\n",
        score.black_total(),
        score.white_total()
    );

    println!("=== MCTS ===");
    println!("Running {simulations} simulations for White...");
    let config = SearchConfig::with_simulations(simulations);
    let report = tree_search(&board, Color::White, ko, &config);
    println!(
        "Best move: {} ({} nodes, {:?})",
        report.action.name(board.size()),
        report.tree_size,
        report.elapsed
    );
    if let Some(best) = report.children.iter().find(|c| c.action == report.action) {
        println!(
            "Root winrate of best move: {:.1}%",
            best.wins as f64 / best.visits.max(1) as f64 * 100.0
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_play_size_is_range_checked() {
        let cli = Cli::try_parse_from(["baduk", "play", "--size", "13"]).unwrap();
        match cli.command {
            Some(Commands::Play { size, .. }) => assert_eq!(size, 13),
            _ => panic!("expected play"),
        }
        assert!(Cli::try_parse_from(["baduk", "play", "--size", "1"]).is_err());
        let too_big = (MAX_SIZE + 1).to_string();
        assert!(Cli::try_parse_from(["baduk", "play", "--size", too_big.as_str()]).is_err());
    }
}

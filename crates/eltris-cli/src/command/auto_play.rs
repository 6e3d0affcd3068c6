use std::{fmt, path::PathBuf};

use eltris_ai::PlacementSearch;
use eltris_engine::GameSession;
use eltris_evaluator::{PlacementEvaluator, Weights};
use serde::Serialize;

use crate::util::{Output, read_json_file};

const DEFAULT_GAMES: usize = 10;
const DEFAULT_COLUMNS: usize = 10;
const DEFAULT_ROWS: usize = 20;
const DEFAULT_MAX_PIECES: usize = 10_000;

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct AutoPlayArg {
    /// Number of games to play
    #[arg(long, default_value_t = DEFAULT_GAMES)]
    games: usize,
    /// Board width in columns
    #[arg(long, default_value_t = DEFAULT_COLUMNS)]
    columns: usize,
    /// Board height in rows
    #[arg(long, default_value_t = DEFAULT_ROWS)]
    rows: usize,
    /// Base seed for the piece supply; game `i` uses `seed + i`.
    /// Random when omitted.
    #[arg(long)]
    seed: Option<u64>,
    /// Stop a game after this many pieces even if it has not topped out
    #[arg(long, default_value_t = DEFAULT_MAX_PIECES)]
    max_pieces: usize,
    /// JSON file holding a custom weight vector
    #[arg(long)]
    weights: Option<PathBuf>,
    /// Where to write the JSON report (stdout when omitted)
    #[arg(long)]
    output: Option<PathBuf>,
}

impl Default for AutoPlayArg {
    fn default() -> Self {
        Self {
            games: DEFAULT_GAMES,
            columns: DEFAULT_COLUMNS,
            rows: DEFAULT_ROWS,
            seed: None,
            max_pieces: DEFAULT_MAX_PIECES,
            weights: None,
            output: None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
struct GameReport {
    game: usize,
    pieces: usize,
    lines: usize,
    score: usize,
    line_clears: [usize; 5],
    topped_out: bool,
}

#[derive(Debug, Clone, Serialize)]
struct RunReport {
    weights: Weights,
    total_pieces: usize,
    total_lines: usize,
    total_score: usize,
    line_clears: [usize; 5],
    games: Vec<GameReport>,
}

pub(crate) fn run(arg: &AutoPlayArg) -> anyhow::Result<()> {
    let weights = match &arg.weights {
        Some(path) => read_json_file("weights", path)?,
        None => Weights::EL_TETRIS,
    };
    let search = PlacementSearch::new(PlacementEvaluator::new(weights));

    eprintln!(
        "Playing {} games on a {}x{} board...",
        arg.games, arg.columns, arg.rows
    );

    let mut games = Vec::with_capacity(arg.games);
    for game in 0..arg.games {
        let report = play_one_game(arg, &search, game);
        eprintln!(
            "game {:>3}: {:>6} pieces, {:>6} lines, score {:>8}{}",
            report.game,
            report.pieces,
            report.lines,
            report.score,
            if report.topped_out { "" } else { " (capped)" },
        );
        games.push(report);
    }

    let report = RunReport {
        weights,
        total_pieces: games.iter().map(|g| g.pieces).sum(),
        total_lines: games.iter().map(|g| g.lines).sum(),
        total_score: games.iter().map(|g| g.score).sum(),
        line_clears: games.iter().fold([0; 5], |mut acc, g| {
            for (slot, n) in acc.iter_mut().zip(g.line_clears) {
                *slot += n;
            }
            acc
        }),
        games,
    };

    eprintln!();
    eprintln!(
        "total: {} pieces, {} lines, score {}",
        report.total_pieces, report.total_lines, report.total_score
    );
    eprintln!("Line clear histogram:");
    print_histogram(
        report
            .line_clears
            .iter()
            .enumerate()
            .map(|(lines, count)| (format!("{lines} lines"), *count)),
    );

    let output = Output::from_path(arg.output.clone());
    output.write_json(&report)?;
    eprintln!("Report written to {}", output.display_path());

    Ok(())
}

fn play_one_game(arg: &AutoPlayArg, search: &PlacementSearch, game: usize) -> GameReport {
    let mut session = match arg.seed {
        Some(seed) => GameSession::with_seed(arg.columns, arg.rows, seed + game as u64),
        None => GameSession::new(arg.columns, arg.rows),
    };

    while session.stats().completed_pieces() < arg.max_pieces && session.spawn_next() {
        if search.choose(session.board_mut()).is_none() {
            break;
        }
        session.hard_drop();
    }

    let stats = session.stats();
    GameReport {
        game,
        pieces: stats.completed_pieces(),
        lines: stats.total_cleared_lines(),
        score: stats.score(),
        line_clears: *stats.line_cleared_counter(),
        topped_out: session.session_state().is_game_over(),
    }
}

fn print_histogram<I, S>(data: I)
where
    I: Iterator<Item = (S, usize)>,
    S: fmt::Display,
{
    let data = data.collect::<Vec<_>>();
    let max_count = data.iter().map(|(_, c)| *c).max().unwrap_or(1).max(1);
    let max_bar_width = 50;
    for (label, count) in &data {
        let bar_width = (count * max_bar_width) / max_count;
        eprintln!("{:>15} | {:<8} {}", label, count, "#".repeat(bar_width));
    }
}

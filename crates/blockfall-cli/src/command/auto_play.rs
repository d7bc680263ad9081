use std::path::PathBuf;

use anyhow::Context as _;
use blockfall_engine::{
    BestRecord, EngineConfig, FitnessEvaluator, GameEngine, PieceSeed, RewardMode,
};
use blockfall_planner::PlacementSearch;
use rand::Rng as _;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::util::{self, Output};

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct AutoPlayArg {
    /// Number of games to play
    #[arg(long, default_value_t = 1)]
    games: usize,
    /// End a game after this many pieces have locked
    #[arg(long, default_value_t = 1000)]
    max_pieces: usize,
    /// Seed for the piece sequence as 32 hex digits (random if omitted)
    #[arg(long)]
    seed: Option<PieceSeed>,
    /// Engine configuration file (JSON)
    #[arg(long)]
    config: Option<PathBuf>,
    /// Reward quantity, overriding the configuration file
    #[arg(long)]
    reward: Option<RewardMode>,
    /// Output file path
    #[arg(long)]
    output: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, derive_more::Display)]
#[serde(rename_all = "snake_case")]
enum GameEnd {
    #[display("topped out")]
    ToppedOut,
    #[display("piece limit")]
    PieceLimit,
    /// No candidate position could be reached.
    #[display("stuck")]
    Stuck,
}

#[derive(Debug, Clone, Serialize)]
struct GameReport {
    game: usize,
    end: GameEnd,
    score: f64,
    lines: usize,
    pieces: usize,
    line_cleared_counter: [usize; 5],
    total_reward: f64,
    /// Gravity interval a real-time driver would have reached.
    drop_interval_ms: u32,
}

#[derive(Debug, Serialize)]
struct AutoPlayReport {
    seed: PieceSeed,
    config: EngineConfig,
    games: Vec<GameReport>,
    best: BestRecord,
}

pub(crate) fn run(arg: &AutoPlayArg) -> anyhow::Result<()> {
    let AutoPlayArg {
        games,
        max_pieces,
        seed,
        config,
        reward,
        output,
    } = arg;

    let mut config = util::load_config(config.as_deref())?;
    if let Some(reward) = reward {
        config.reward_mode = *reward;
    }
    let seed = seed.unwrap_or_else(|| rand::rng().random());
    let search = PlacementSearch::new(Box::new(FitnessEvaluator::new(config.weights)));
    let mut engine =
        GameEngine::with_config(config, seed).context("Failed to create game engine")?;
    engine.subscribe_score_changed(|change| {
        debug!(
            old = change.old_score,
            new = change.new_score,
            gained = change.gained(),
            "score changed"
        );
    });
    info!(%seed, games, max_pieces, "starting auto-play");

    let mut reports = Vec::with_capacity(*games);
    for game in 1..=*games {
        if game > 1 {
            let observation = engine.reset();
            debug!(game, next = %observation.next_piece, "new game");
        }
        let report = play_game(&mut engine, &search, *max_pieces, game);
        info!(
            game,
            end = %report.end,
            score = report.score,
            lines = report.lines,
            pieces = report.pieces,
            "game finished"
        );
        reports.push(report);
    }

    let best = engine.best_record();
    info!(score = best.score, lines = best.lines, "best records");
    let report = AutoPlayReport {
        seed,
        config: engine.config().clone(),
        games: reports,
        best,
    };
    Output::save_json(&report, output.as_deref())
}

fn play_game(
    engine: &mut GameEngine,
    search: &PlacementSearch<'_>,
    max_pieces: usize,
    game: usize,
) -> GameReport {
    let mut total_reward = 0.0;
    let end = loop {
        if engine.state().is_game_over() {
            break GameEnd::ToppedOut;
        }
        if engine.stats().completed_pieces() >= max_pieces {
            break GameEnd::PieceLimit;
        }
        let Some(plan) = search.plan(engine) else {
            break GameEnd::Stuck;
        };
        for action in plan.into_actions() {
            let outcome = engine.step(action);
            total_reward += outcome.reward;
            if !outcome.action_applied {
                warn!(%action, "planned action was rejected");
            }
            if outcome.done {
                break;
            }
        }
    };

    let stats = engine.stats();
    GameReport {
        game,
        end,
        score: stats.score(),
        lines: stats.total_cleared_lines(),
        pieces: stats.completed_pieces(),
        line_cleared_counter: *stats.line_cleared_counter(),
        total_reward,
        drop_interval_ms: engine.drop_interval_ms(),
    }
}

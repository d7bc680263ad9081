//! Game rules and state.
//!
//! - [`GameEngine`] - board, active piece, bank and counters; every game
//!   operation and the agent-facing [`GameEngine::step`]
//! - [`GameStats`] - score, cleared rows and locked pieces of one game
//! - [`PieceBank`] - shuffled-bag piece generation from a [`PieceSeed`]
//! - [`ScoreListeners`] - callbacks fired when a lock changes the score
//! - [`Action`], [`StepOutcome`] and [`Observation`] - the step interface's
//!   input and output
//!
//! # Game Flow
//!
//! 1. The engine spawns the first piece centered on the top row
//! 2. The driver moves, rotates or swaps the piece, and lets it fall
//! 3. A piece that cannot fall further locks; complete rows are cleared and
//!    scored, and the next piece spawns
//! 4. The game is over when a new piece cannot spawn

pub use self::{
    action::*, game_engine::*, game_stats::*, piece_bank::*, score_listeners::*, step::*,
};

mod action;
mod game_engine;
mod game_stats;
mod piece_bank;
mod score_listeners;
mod step;

//! Falling-block puzzle engine.
//!
//! The crate is split the same way the game is played:
//!
//! - [`core`] - the grid model: [`Board`], [`Cell`], [`PieceKind`] and the
//!   [`Piece`] under control, with the single collision predicate
//!   [`Board::collides`]
//! - [`engine`] - [`GameEngine`], which owns the board, the [`PieceBank`] and
//!   the score counters, and exposes both per-operation methods and the
//!   [`GameEngine::step`] interface used by agents
//! - [`fitness`] - the heuristic [`FitnessEvaluator`] that scores boards
//! - [`config`] - [`EngineConfig`], every tunable in one serde-loadable struct
//!
//! # Example
//!
//! ```
//! use blockfall_engine::{Action, GameEngine, PieceSeed};
//!
//! let mut engine = GameEngine::with_seed(PieceSeed::default());
//! let outcome = engine.step(Action::HardDrop);
//!
//! assert!(outcome.action_applied);
//! assert!(!outcome.done);
//! assert_eq!(engine.stats().completed_pieces(), 1);
//! ```

pub use self::{config::*, core::*, engine::*, fitness::*};

pub mod config;
pub mod core;
pub mod engine;
pub mod fitness;

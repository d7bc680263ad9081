//! One-piece-lookahead placement planner.
//!
//! Planning a turn happens in two stages:
//!
//! 1. **Search** ([`placement_search`]) - every final position of the active
//!    piece and of the next piece (reached through a swap) is enumerated and
//!    scored by a [`BoardEvaluator`](blockfall_engine::BoardEvaluator)
//! 2. **Translation** ([`action_plan`]) - the best candidate is turned into a
//!    sequence of [`Action`](blockfall_engine::Action)s and replayed on a
//!    detached copy of the engine. Candidates whose sequence would be
//!    rejected or land elsewhere are skipped in favor of the next best
//!
//! The search only ever reads the live engine.
//!
//! # Example
//!
//! ```
//! use blockfall_engine::{GameEngine, PieceSeed};
//! use blockfall_planner::PlacementSearch;
//!
//! let mut engine = GameEngine::with_seed(PieceSeed::default());
//! let search = PlacementSearch::default();
//!
//! for _ in 0..5 {
//!     let actions = search.next_actions(&engine);
//!     assert!(!actions.is_empty());
//!     for action in actions {
//!         assert!(engine.step(action).action_applied);
//!     }
//! }
//! assert_eq!(engine.stats().completed_pieces(), 5);
//! ```

pub use self::{action_plan::*, placement_search::*};

pub mod action_plan;
pub mod placement_search;

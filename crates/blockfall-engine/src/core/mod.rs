//! Grid model: cells, piece shapes and the board they are placed on.

pub use self::{board::*, cell::*, piece::*};

pub(crate) mod board;
pub(crate) mod cell;
pub(crate) mod piece;

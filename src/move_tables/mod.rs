//! Precomputed move tables: given a square and the occupancy of friendly
//! and enemy pieces, return the set of reachable squares.
//!
//! Sliding pieces (rook, bishop, queen) share one [`collision::CollisionTable`]
//! and are generated per line (rank, file, or diagonal) rather than per
//! square: every square on the same rank shares the same 256-entry combo
//! table, only the reference position within it differs. Split into one
//! horizontal/vertical/diagonal family per direction (see DESIGN.md for
//! how variable-length diagonals are banked into flat per-line tables).

pub mod jumping;
pub mod pawns;
pub mod sliding;

use once_cell::sync::Lazy;

use crate::types::{Bitmask, Coord};

/// All geometry-derived move tables, built once and shared across every
/// position: they depend only on board topology, never on game state.
pub struct MoveTables {
    pub sliding: sliding::SlidingTables,
    pub jumping: jumping::JumpingTables,
}

impl MoveTables {
    fn new() -> Self {
        MoveTables {
            sliding: sliding::SlidingTables::new(),
            jumping: jumping::JumpingTables::new(),
        }
    }
}

pub static MOVE_TABLES: Lazy<MoveTables> = Lazy::new(MoveTables::new);

/// A single line (rank, file, or diagonal) used to build a sliding
/// table: the board squares along it in increasing order.
pub(crate) fn line_squares_h(rank: u8) -> Vec<Coord> {
    (0..8).map(|file| rank * 8 + file).collect()
}

pub(crate) fn line_squares_v(file: u8) -> Vec<Coord> {
    (0..8).map(|rank| rank * 8 + file).collect()
}

/// a1-h8 direction diagonals, indexed 0..=14 by `file - rank + 7`.
pub(crate) fn line_squares_d1(diag_index: i32) -> Vec<Coord> {
    let offset = diag_index - 7; // file - rank
    let mut squares = Vec::with_capacity(8);
    for rank in 0..8i32 {
        let file = rank + offset;
        if (0..8).contains(&file) {
            squares.push((rank * 8 + file) as Coord);
        }
    }
    squares
}

/// h1-a8 direction diagonals, indexed 0..=14 by `file + rank`.
pub(crate) fn line_squares_d2(diag_index: i32) -> Vec<Coord> {
    let mut squares = Vec::with_capacity(8);
    for rank in 0..8i32 {
        let file = diag_index - rank;
        if (0..8).contains(&file) {
            squares.push((rank * 8 + file) as Coord);
        }
    }
    squares
}

#[inline]
pub(crate) fn bit(sq: Coord) -> Bitmask {
    1u64 << sq
}

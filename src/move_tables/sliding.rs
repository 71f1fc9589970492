//! Rook, bishop, and queen move generation via collision tables.

use super::{bit, line_squares_d1, line_squares_d2, line_squares_h, line_squares_v};
use crate::collision::CollisionTable;
use crate::types::{Bitmask, Coord, MoveList};

/// Metadata tying a square to its position within one of its four lines.
#[derive(Clone, Copy)]
struct LineRef {
    line_id: usize,
    pos: usize,
}

/// A family of lines of the same orientation (the 8 ranks, the 8 files,
/// or the 15 diagonals in one direction), each with its own 256-entry
/// combo -> reachable-squares table.
struct LineFamily {
    tables: Vec<[MoveList; 256]>,
    squares_per_line: Vec<Vec<Coord>>,
    by_square: [LineRef; 64],
}

impl LineFamily {
    fn build(lines: Vec<Vec<Coord>>, ct: &CollisionTable) -> Self {
        let mut by_square = [LineRef { line_id: 0, pos: 0 }; 64];
        let mut tables = Vec::with_capacity(lines.len());

        for (line_id, squares) in lines.iter().enumerate() {
            for (pos, &sq) in squares.iter().enumerate() {
                by_square[sq as usize] = LineRef { line_id, pos };
            }
            tables.push(build_line_table(squares, ct));
        }

        LineFamily {
            tables,
            squares_per_line: lines,
            by_square,
        }
    }

    #[inline]
    fn get(&self, coord: Coord, ct: &CollisionTable, friendly: Bitmask, enemy: Bitmask) -> MoveList {
        let r = self.by_square[coord as usize];
        let squares = &self.squares_per_line[r.line_id];
        let f_combo = combo_of(squares, friendly);
        let e_combo = combo_of(squares, enemy);
        let reach = ct.e[r.pos][e_combo as usize] & ct.f[r.pos][f_combo as usize];
        self.tables[r.line_id][reach as usize]
    }
}

fn combo_of(squares: &[Coord], occ: Bitmask) -> u8 {
    let mut combo = 0u8;
    for (i, &sq) in squares.iter().enumerate() {
        if occ & bit(sq) != 0 {
            combo |= 1 << i;
        }
    }
    combo
}

fn build_line_table(squares: &[Coord], _ct: &CollisionTable) -> [MoveList; 256] {
    let mut table = [MoveList::EMPTY; 256];
    for combo in 0..256usize {
        let mut mask: Bitmask = 0;
        for (i, &sq) in squares.iter().enumerate() {
            if (combo >> i) & 1 == 1 {
                mask |= bit(sq);
            }
        }
        table[combo] = MoveList::new(mask);
    }
    table
}

/// Sliding-piece move tables for all four line orientations, plus the
/// shared collision table they index through.
pub struct SlidingTables {
    ct: CollisionTable,
    horizontal: LineFamily,
    vertical: LineFamily,
    diag_a1h8: LineFamily,
    diag_h1a8: LineFamily,
}

impl SlidingTables {
    pub fn new() -> Self {
        let ct = CollisionTable::new();
        let horizontal = LineFamily::build((0..8).map(line_squares_h).collect(), &ct);
        let vertical = LineFamily::build((0..8).map(line_squares_v).collect(), &ct);
        let diag_a1h8 = LineFamily::build((0..15).map(line_squares_d1).collect(), &ct);
        let diag_h1a8 = LineFamily::build((0..15).map(line_squares_d2).collect(), &ct);

        SlidingTables {
            ct,
            horizontal,
            vertical,
            diag_a1h8,
            diag_h1a8,
        }
    }

    #[inline]
    pub fn rook_moves(&self, coord: Coord, friendly: Bitmask, enemy: Bitmask) -> MoveList {
        let h = self.horizontal.get(coord, &self.ct, friendly, enemy);
        let v = self.vertical.get(coord, &self.ct, friendly, enemy);
        MoveList::new(h.mask | v.mask)
    }

    #[inline]
    pub fn bishop_moves(&self, coord: Coord, friendly: Bitmask, enemy: Bitmask) -> MoveList {
        let d1 = self.diag_a1h8.get(coord, &self.ct, friendly, enemy);
        let d2 = self.diag_h1a8.get(coord, &self.ct, friendly, enemy);
        MoveList::new(d1.mask | d2.mask)
    }

    #[inline]
    pub fn queen_moves(&self, coord: Coord, friendly: Bitmask, enemy: Bitmask) -> MoveList {
        let rook = self.rook_moves(coord, friendly, enemy);
        let bishop = self.bishop_moves(coord, friendly, enemy);
        MoveList::new(rook.mask | bishop.mask)
    }
}

impl Default for SlidingTables {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rook_on_empty_board_sweeps_full_cross() {
        let tables = SlidingTables::new();
        let moves = tables.rook_moves(0, 0, 0); // a1
        assert_eq!(moves.count(), 14); // 7 along rank + 7 along file
    }

    #[test]
    fn rook_blocked_by_friendly_piece_stops_before_it() {
        let tables = SlidingTables::new();
        let friendly = 1u64 << 3; // d1
        let moves = tables.rook_moves(0, friendly, 0);
        assert_eq!(moves.mask & (1u64 << 3), 0);
        assert_ne!(moves.mask & (1u64 << 2), 0);
    }

    #[test]
    fn rook_captures_enemy_piece_but_no_further() {
        let tables = SlidingTables::new();
        let enemy = 1u64 << 3; // d1
        let moves = tables.rook_moves(0, 0, enemy);
        assert_ne!(moves.mask & (1u64 << 3), 0);
        assert_eq!(moves.mask & (1u64 << 4), 0);
    }

    #[test]
    fn bishop_from_center_reaches_all_four_diagonal_rays() {
        let tables = SlidingTables::new();
        let moves = tables.bishop_moves(27, 0, 0); // d4
        assert_eq!(moves.count(), 13);
    }

    #[test]
    fn bishop_from_corner_is_confined_to_one_diagonal() {
        let tables = SlidingTables::new();
        let moves = tables.bishop_moves(0, 0, 0); // a1, length-8 diagonal only
        assert_eq!(moves.count(), 7);
    }

    #[test]
    fn queen_moves_union_rook_and_bishop() {
        let tables = SlidingTables::new();
        let queen = tables.queen_moves(27, 0, 0);
        let rook = tables.rook_moves(27, 0, 0);
        let bishop = tables.bishop_moves(27, 0, 0);
        assert_eq!(queen.mask, rook.mask | bishop.mask);
    }
}

//! Bitboard position representation: piece-centric bitboards plus a
//! square-centric mailbox, kept in sync by make/unmake.

pub mod make_unmake;
pub mod movegen;

use crate::error::EngineError;
use crate::types::{
    BitboardMove, Color, Coord, BLACK_KING, BLACK_OO, BLACK_OOO, BLACK_PAWN, NO_PIECE, WHITE_KING,
    WHITE_OO, WHITE_OOO, WHITE_PAWN,
};
use crate::types::Bitmask;
use crate::zobrist;

/// An en-passant opportunity: the square of the pawn that would be
/// captured, and the square a capturing pawn lands on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EnPassant {
    pub captured_square: Coord,
    pub target_square: Coord,
}

/// Everything about a position that changes incrementally with each
/// move. Kept as one plain, copyable struct (mirroring the per-ply
/// history records of the design this engine is built on) so make/unmake
/// is just push/pop of a `Vec<BitboardData>`.
#[derive(Clone, Copy, Debug)]
pub struct BitboardData {
    /// Bitboard for each piece code; index 0 (`NO_PIECE`) is always 0.
    pub pieces: [Bitmask; 13],
    pub white: Bitmask,
    pub black: Bitmask,
    pub wpawns: Bitmask,
    pub bpawns: Bitmask,
    pub color: Color,
    pub ep: Option<EnPassant>,
    pub castling: u8,
    pub hash: u64,
    pub piece_score: i32,
    pub n_pieces: u32,
    pub white_king: Coord,
    pub black_king: Coord,
}

impl BitboardData {
    fn empty() -> Self {
        BitboardData {
            pieces: [0; 13],
            white: 0,
            black: 0,
            wpawns: 0,
            bpawns: 0,
            color: Color::White,
            ep: None,
            castling: 0,
            hash: 0,
            piece_score: 0,
            n_pieces: 0,
            white_king: 0,
            black_king: 0,
        }
    }

    #[inline]
    pub fn occ_all(&self) -> Bitmask {
        self.white | self.black
    }
}

/// The move applied to get from one `BitboardData` to the next, recorded
/// so `unmake` can restore the mailbox without recomputation. Compound
/// moves (castling, en passant) use both slots; simple moves leave
/// `move2` null.
#[derive(Clone, Copy, Debug)]
struct PlyMoves {
    move1: BitboardMove,
    move2: BitboardMove,
}

/// A chess position: a square-centric mailbox for piece lookups, a stack
/// of incremental [`BitboardData`] snapshots for O(1) make/unmake, and
/// the per-ply square changes needed to unwind the mailbox.
pub struct Position {
    squares: [u8; 64],
    history: Vec<BitboardData>,
    moves_applied: Vec<PlyMoves>,
    max_depth: u32,
}

pub const STARTING_SQUARES: [u8; 64] = [
    4, 2, 3, 5, 6, 3, 2, 4, //
    1, 1, 1, 1, 1, 1, 1, 1, //
    0, 0, 0, 0, 0, 0, 0, 0, //
    0, 0, 0, 0, 0, 0, 0, 0, //
    0, 0, 0, 0, 0, 0, 0, 0, //
    0, 0, 0, 0, 0, 0, 0, 0, //
    7, 7, 7, 7, 7, 7, 7, 7, //
    10, 8, 9, 11, 12, 9, 8, 10,
];

impl Position {
    pub fn new() -> Self {
        Self::from_squares(STARTING_SQUARES, Color::White, WHITE_OO | WHITE_OOO | BLACK_OO | BLACK_OOO)
    }

    pub fn from_squares(squares: [u8; 64], color: Color, castling: u8) -> Self {
        Position::from_squares_with_depth(squares, color, castling, None, 128)
    }

    pub fn from_squares_with_depth(
        squares: [u8; 64],
        color: Color,
        castling: u8,
        ep: Option<EnPassant>,
        max_depth: u32,
    ) -> Self {
        let mut data = BitboardData::empty();
        data.color = color;
        data.castling = castling;
        data.ep = ep;

        for (sq, &piece) in squares.iter().enumerate() {
            if piece == NO_PIECE {
                continue;
            }
            let sq = sq as Coord;
            let bit = 1u64 << sq;
            data.pieces[piece as usize] |= bit;
            data.hash ^= zobrist::piece_square_key(piece, sq);
            match crate::types::piece_color(piece) {
                Some(Color::White) => data.white |= bit,
                Some(Color::Black) => data.black |= bit,
                None => {}
            }
            if piece == WHITE_PAWN {
                data.wpawns |= bit;
            } else if piece == BLACK_PAWN {
                data.bpawns |= bit;
            }
            if piece == WHITE_KING {
                data.white_king = sq;
            } else if piece == BLACK_KING {
                data.black_king = sq;
            }
            data.n_pieces += 1;
        }

        let cfg = crate::config::ScoreParams::default();
        data.piece_score = squares
            .iter()
            .map(|&p| cfg.piece_values[p as usize])
            .sum();

        if color == Color::Black {
            data.hash ^= zobrist::black_to_move_key();
        }
        for bit_index in 0..4u8 {
            if castling & (1 << bit_index) != 0 {
                data.hash ^= zobrist::castling_key(bit_index);
            }
        }
        if let Some(ep) = ep {
            data.hash ^= zobrist::en_passant_key(ep.target_square % 8);
        }

        Position {
            squares,
            history: vec![data],
            moves_applied: Vec::new(),
            max_depth,
        }
    }

    #[inline]
    pub fn piece_at(&self, sq: Coord) -> u8 {
        self.squares[sq as usize]
    }

    #[inline]
    pub fn current(&self) -> &BitboardData {
        self.history.last().expect("history is never empty")
    }

    #[inline]
    pub fn depth(&self) -> u32 {
        (self.history.len() - 1) as u32
    }

    #[inline]
    pub fn side_to_move(&self) -> Color {
        self.current().color
    }

    #[inline]
    pub fn hash(&self) -> u64 {
        self.current().hash
    }

    /// Override the depth-overflow ceiling `make_move` checks against,
    /// e.g. to apply [`crate::config::SearchConfig::max_search_depth`]
    /// after construction rather than only at FEN/array build time.
    pub fn set_max_depth(&mut self, max_depth: u32) {
        self.max_depth = max_depth;
    }

    fn check_depth(&self) -> Result<(), EngineError> {
        if self.depth() + 1 >= self.max_depth {
            Err(EngineError::DepthOverflow {
                depth: self.depth() + 1,
                max: self.max_depth,
            })
        } else {
            Ok(())
        }
    }
}

impl Default for Position {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starting_position_has_32_pieces() {
        let pos = Position::new();
        assert_eq!(pos.current().n_pieces, 32);
    }

    #[test]
    fn starting_position_piece_score_is_symmetric() {
        let pos = Position::new();
        assert_eq!(pos.current().piece_score, 0);
    }

    #[test]
    fn starting_position_king_squares_are_correct() {
        let pos = Position::new();
        assert_eq!(pos.current().white_king, 4);
        assert_eq!(pos.current().black_king, 60);
    }

    #[test]
    fn make_move_past_max_depth_is_fatal() {
        let mut pos = Position::new();
        pos.set_max_depth(2);
        pos.make_move(crate::types::Move::normal(12, 28)).unwrap(); // depth 0 -> 1, ok
        let err = pos.make_move(crate::types::Move::normal(52, 36)).unwrap_err();
        assert_eq!(err, EngineError::DepthOverflow { depth: 2, max: 2 });
    }
}

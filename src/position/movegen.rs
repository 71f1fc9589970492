//! Pseudo-legal move enumeration.
//!
//! Moves are pseudo-legal: a move that would leave the mover's own king
//! in check is not filtered out here. King capture is scored as an
//! extreme material swing instead, so the search naturally avoids
//! leaving a king en prise without a dedicated legality pass. Moves are
//! returned sorted by start square then end square.

use super::Position;
use crate::move_tables::{pawns, MOVE_TABLES};
use crate::types::{
    piece_parts, Castling, Color, Coord, Move, PieceKind, BLACK_OO, BLACK_OOO, WHITE_OO,
    WHITE_OOO,
};

const WHITE_OO_CLEAR: u64 = 0x60;
const WHITE_OOO_CLEAR: u64 = 0x0e;
const BLACK_OO_CLEAR: u64 = 0x6000_0000_0000_0000;
const BLACK_OOO_CLEAR: u64 = 0x0e00_0000_0000_0000;

const PROMOTION_PIECES_WHITE: [u8; 4] = [
    crate::types::WHITE_KNIGHT,
    crate::types::WHITE_BISHOP,
    crate::types::WHITE_ROOK,
    crate::types::WHITE_QUEEN,
];
const PROMOTION_PIECES_BLACK: [u8; 4] = [
    crate::types::BLACK_KNIGHT,
    crate::types::BLACK_BISHOP,
    crate::types::BLACK_ROOK,
    crate::types::BLACK_QUEEN,
];

impl Position {
    /// All pseudo-legal moves in the current position, sorted by
    /// (start, end).
    pub fn generate_moves(&self) -> Vec<Move> {
        let data = self.current();
        let tables = &*MOVE_TABLES;
        let color = data.color;
        let (friendly, enemy) = match color {
            Color::White => (data.white, data.black),
            Color::Black => (data.black, data.white),
        };

        let mut moves = Vec::with_capacity(48);

        for sq in 0u8..64 {
            let piece = self.piece_at(sq);
            if piece == crate::types::NO_PIECE {
                continue;
            }
            let Some((piece_color, kind)) = piece_parts(piece) else {
                continue;
            };
            if piece_color != color {
                continue;
            }

            match kind {
                PieceKind::Knight => {
                    for dest in tables.jumping.knight_moves(sq, friendly).iter() {
                        moves.push(Move::normal(sq, dest));
                    }
                }
                PieceKind::King => {
                    for dest in tables.jumping.king_moves(sq, friendly).iter() {
                        moves.push(Move::normal(sq, dest));
                    }
                }
                PieceKind::Bishop => {
                    for dest in tables.sliding.bishop_moves(sq, friendly, enemy).iter() {
                        moves.push(Move::normal(sq, dest));
                    }
                }
                PieceKind::Rook => {
                    for dest in tables.sliding.rook_moves(sq, friendly, enemy).iter() {
                        moves.push(Move::normal(sq, dest));
                    }
                }
                PieceKind::Queen => {
                    for dest in tables.sliding.queen_moves(sq, friendly, enemy).iter() {
                        moves.push(Move::normal(sq, dest));
                    }
                }
                PieceKind::Pawn => self.generate_pawn_moves(sq, color, &mut moves),
            }
        }

        self.generate_castling_moves(color, &mut moves);
        moves.sort_by_key(|m| (m.start(), m.end()));
        moves
    }

    fn generate_pawn_moves(&self, sq: Coord, color: Color, moves: &mut Vec<Move>) {
        let data = self.current();
        let occ_all = data.occ_all();
        let enemy = match color {
            Color::White => data.black,
            Color::Black => data.white,
        };

        let promotion_rank = match color {
            Color::White => 56..64,
            Color::Black => 0..8,
        };

        let mut push_and_capture = |dest: Coord, moves: &mut Vec<Move>| {
            if promotion_rank.contains(&dest) {
                let set = match color {
                    Color::White => &PROMOTION_PIECES_WHITE,
                    Color::Black => &PROMOTION_PIECES_BLACK,
                };
                for &piece in set {
                    moves.push(Move::promotion(sq, dest, piece));
                }
            } else {
                moves.push(Move::normal(sq, dest));
            }
        };

        for dest in bits(pawns::push_targets(sq, color, occ_all)) {
            push_and_capture(dest, moves);
        }

        let attack_mask = pawns::attack_targets(sq, color);
        for dest in bits(attack_mask & enemy) {
            push_and_capture(dest, moves);
        }

        if let Some(ep) = data.ep {
            if attack_mask & (1u64 << ep.target_square) != 0 {
                moves.push(Move::en_passant(sq, ep.target_square));
            }
        }
    }

    fn generate_castling_moves(&self, color: Color, moves: &mut Vec<Move>) {
        let data = self.current();
        let occ_all = data.occ_all();
        match color {
            Color::White => {
                if data.castling & WHITE_OO != 0 && occ_all & WHITE_OO_CLEAR == 0 {
                    moves.push(Move::castling(Castling::WhiteOO));
                }
                if data.castling & WHITE_OOO != 0 && occ_all & WHITE_OOO_CLEAR == 0 {
                    moves.push(Move::castling(Castling::WhiteOOO));
                }
            }
            Color::Black => {
                if data.castling & BLACK_OO != 0 && occ_all & BLACK_OO_CLEAR == 0 {
                    moves.push(Move::castling(Castling::BlackOO));
                }
                if data.castling & BLACK_OOO != 0 && occ_all & BLACK_OOO_CLEAR == 0 {
                    moves.push(Move::castling(Castling::BlackOOO));
                }
            }
        }
    }
}

fn bits(mask: u64) -> impl Iterator<Item = Coord> {
    crate::types::MoveList::new(mask).iter()
}

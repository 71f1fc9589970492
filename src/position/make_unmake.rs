//! Applying and undoing moves on a [`Position`].
//!
//! Each ply pushes one [`BitboardData`] snapshot plus the raw square
//! changes needed to restore the mailbox; `unmake` pops both.

use super::{BitboardData, EnPassant, PlyMoves, Position};
use crate::error::EngineError;
use crate::types::{
    piece_color, Castling, Color, Coord, Move, MoveTag, BLACK_KING, BLACK_OO, BLACK_OOO,
    BLACK_PAWN, BLACK_ROOK, NO_PIECE, WHITE_KING, WHITE_OO, WHITE_OOO, WHITE_PAWN, WHITE_ROOK,
};
use crate::{config::ScoreParams, zobrist};

impl Position {
    /// Apply a pseudo-legal move. Returns whether a piece was captured.
    pub fn make_move(&mut self, mv: Move) -> Result<bool, EngineError> {
        self.check_depth()?;
        match mv.decode() {
            MoveTag::Normal => Ok(self.make_normal(mv.start(), mv.end())),
            MoveTag::Promotion(promoted_to) => {
                Ok(self.make_promotion(mv.start(), mv.end(), promoted_to))
            }
            MoveTag::Castling(castling) => {
                self.make_castling(castling);
                Ok(false)
            }
            MoveTag::EnPassant => {
                self.make_en_passant(mv.start(), mv.end());
                Ok(true)
            }
            MoveTag::Null => {
                self.make_null();
                Ok(false)
            }
        }
    }

    /// Undo the most recently applied move (or null move).
    pub fn unmake_move(&mut self) {
        debug_assert!(self.history.len() > 1, "unmake called with no moves made");
        let applied = self.moves_applied.pop().expect("moves_applied tracks history");
        self.history.pop();
        if !applied.move2.is_null() {
            self.squares[applied.move2.start as usize] = applied.move2.start_piece;
            self.squares[applied.move2.end as usize] = applied.move2.end_piece;
        }
        self.squares[applied.move1.start as usize] = applied.move1.start_piece;
        self.squares[applied.move1.end as usize] = applied.move1.end_piece;
    }

    fn make_normal(&mut self, start: Coord, end: Coord) -> bool {
        let start_piece = self.squares[start as usize];
        let end_piece = self.squares[end as usize];
        self.apply_one(start, end, start_piece, end_piece, start_piece, true);
        end_piece != NO_PIECE
    }

    fn make_promotion(&mut self, start: Coord, end: Coord, promoted_to: u8) -> bool {
        let start_piece = self.squares[start as usize];
        let end_piece = self.squares[end as usize];
        self.apply_one(start, end, start_piece, end_piece, promoted_to, true);
        end_piece != NO_PIECE
    }

    fn make_castling(&mut self, castling: Castling) {
        let (k_start, k_end) = castling.king_squares();
        let (r_start, r_end) = castling.rook_squares();
        let king_piece = self.squares[k_start as usize];
        let rook_piece = self.squares[r_start as usize];

        // The king move's destination snapshot is an intermediate state;
        // only the rook move's resulting snapshot is pushed to history.
        let mut mid = *self.current();
        let next = self.step(&mut mid, k_start, k_end, king_piece, NO_PIECE, king_piece);
        mid = next;
        let mut next = self.step(&mut mid, r_start, r_end, rook_piece, NO_PIECE, rook_piece);
        Self::flip_side_to_move(&mut next);

        self.squares[k_start as usize] = NO_PIECE;
        self.squares[k_end as usize] = king_piece;
        self.squares[r_start as usize] = NO_PIECE;
        self.squares[r_end as usize] = rook_piece;

        self.push_ply(
            next,
            PlyMoves {
                move1: crate::types::BitboardMove {
                    start: k_start,
                    end: k_end,
                    start_piece: king_piece,
                    end_piece: NO_PIECE,
                },
                move2: crate::types::BitboardMove {
                    start: r_start,
                    end: r_end,
                    start_piece: rook_piece,
                    end_piece: NO_PIECE,
                },
            },
        );
    }

    fn make_en_passant(&mut self, start: Coord, end: Coord) {
        let color = self.current().color;
        let captured_sq = match color {
            Color::White => end - 8,
            Color::Black => end + 8,
        };
        let mover_piece = self.squares[start as usize];
        let captured_piece = self.squares[captured_sq as usize];

        let mut mid = *self.current();
        let next = self.step(&mut mid, start, captured_sq, mover_piece, captured_piece, mover_piece);
        mid = next;
        let mut next = self.step(&mut mid, captured_sq, end, mover_piece, NO_PIECE, mover_piece);
        Self::flip_side_to_move(&mut next);

        self.squares[start as usize] = NO_PIECE;
        self.squares[captured_sq as usize] = NO_PIECE;
        self.squares[end as usize] = mover_piece;

        self.push_ply(
            next,
            PlyMoves {
                move1: crate::types::BitboardMove {
                    start,
                    end: captured_sq,
                    start_piece: mover_piece,
                    end_piece: captured_piece,
                },
                move2: crate::types::BitboardMove {
                    start: captured_sq,
                    end,
                    start_piece: mover_piece,
                    end_piece: NO_PIECE,
                },
            },
        );
    }

    fn make_null(&mut self) {
        let mut next = *self.current();
        Self::flip_side_to_move(&mut next);
        next.ep = None;
        if let Some(ep) = self.current().ep {
            next.hash ^= zobrist::en_passant_key(ep.target_square % 8);
        }
        self.push_ply(
            next,
            PlyMoves {
                move1: crate::types::BitboardMove::NULL,
                move2: crate::types::BitboardMove::NULL,
            },
        );
    }

    /// Core single-square-pair transition shared by every move kind:
    /// updates piece/material/king/castling/en-passant/hash state, then
    /// advances the side to move and mailbox.
    fn apply_one(
        &mut self,
        start: Coord,
        end: Coord,
        start_piece: u8,
        end_piece: u8,
        promotion_piece: u8,
        advance_color: bool,
    ) {
        let mut current = *self.current();
        let mut next = self.step(&mut current, start, end, start_piece, end_piece, promotion_piece);
        if advance_color {
            Self::flip_side_to_move(&mut next);
        }

        self.squares[start as usize] = NO_PIECE;
        self.squares[end as usize] = promotion_piece;

        self.push_ply(
            next,
            PlyMoves {
                move1: crate::types::BitboardMove {
                    start,
                    end,
                    start_piece,
                    end_piece,
                },
                move2: crate::types::BitboardMove::NULL,
            },
        );
    }

    /// Compute the `BitboardData` that results from moving `start_piece`
    /// off `start` and `promotion_piece` onto `end` (equal to
    /// `start_piece` for a non-promoting move), given the piece that
    /// previously occupied `end`. Does not touch `squares` or advance the
    /// side to move — callers that chain two steps (castling, en
    /// passant) need those deferred to the very end.
    fn step(
        &self,
        current: &mut BitboardData,
        start: Coord,
        end: Coord,
        start_piece: u8,
        end_piece: u8,
        promotion_piece: u8,
    ) -> BitboardData {
        let cfg = ScoreParams::default();
        let mut next = *current;

        next.piece_score = current.piece_score - cfg.piece_values[end_piece as usize];
        if end_piece != promotion_piece {
            next.piece_score +=
                cfg.piece_values[promotion_piece as usize] - cfg.piece_values[start_piece as usize];
        }

        next.n_pieces = if end_piece == NO_PIECE {
            current.n_pieces
        } else {
            current.n_pieces - 1
        };

        if start_piece == WHITE_KING {
            next.white_king = end;
        }
        if start_piece == BLACK_KING {
            next.black_king = end;
        }

        next.hash = current.hash
            ^ zobrist::piece_square_key(start_piece, start)
            ^ zobrist::piece_square_key(end_piece, end)
            ^ zobrist::piece_square_key(promotion_piece, end);

        let start_bit = 1u64 << start;
        let end_bit = 1u64 << end;

        if let Some(color) = piece_color(start_piece) {
            match color {
                Color::White => {
                    next.white = (current.white & !start_bit) | end_bit;
                    next.black = current.black & !end_bit;
                }
                Color::Black => {
                    next.black = (current.black & !start_bit) | end_bit;
                    next.white = current.white & !end_bit;
                }
            }
        }
        next.wpawns = next.white & current.wpawns;
        next.bpawns = next.black & current.bpawns;
        if start_piece == WHITE_PAWN && start_piece == promotion_piece {
            next.wpawns |= end_bit;
        }
        if start_piece == BLACK_PAWN && start_piece == promotion_piece {
            next.bpawns |= end_bit;
        }

        for code in next.pieces.iter_mut() {
            *code &= !(start_bit | end_bit);
        }
        next.pieces[promotion_piece as usize] |= end_bit;

        // Castling rights are lost when the king or a home-square rook
        // moves away from its starting square, or when that rook is
        // captured in place (handled below via the `end` square).
        next.castling = current.castling;
        if start_piece == WHITE_KING {
            next.castling &= !(WHITE_OO | WHITE_OOO);
        } else if start_piece == WHITE_ROOK {
            if start == 0 {
                next.castling &= !WHITE_OOO;
            }
            if start == 7 {
                next.castling &= !WHITE_OO;
            }
        } else if start_piece == BLACK_KING {
            next.castling &= !(BLACK_OO | BLACK_OOO);
        } else if start_piece == BLACK_ROOK {
            if start == 56 {
                next.castling &= !BLACK_OOO;
            }
            if start == 63 {
                next.castling &= !BLACK_OO;
            }
        }
        if end == 0 && end_piece == WHITE_ROOK {
            next.castling &= !WHITE_OOO;
        }
        if end == 7 && end_piece == WHITE_ROOK {
            next.castling &= !WHITE_OO;
        }
        if end == 56 && end_piece == BLACK_ROOK {
            next.castling &= !BLACK_OOO;
        }
        if end == 63 && end_piece == BLACK_ROOK {
            next.castling &= !BLACK_OO;
        }
        for bit_index in 0..4u8 {
            let flag = 1 << bit_index;
            if (current.castling & flag) != (next.castling & flag) {
                next.hash ^= zobrist::castling_key(bit_index);
            }
        }

        // `captured_square` is the pushed pawn itself (what en passant
        // removes); `target_square` is where a capturing pawn lands, one
        // rank behind it. Which adjacent file holds the capturing pawn
        // only gates whether en passant is possible, not either square.
        let mut new_ep = None;
        let end_file = end % 8;
        if start_piece == WHITE_PAWN && end as i16 - start as i16 == 16 {
            let capturable = (end_file > 0 && self.squares[(end - 1) as usize] == BLACK_PAWN)
                || (end_file < 7 && self.squares[(end + 1) as usize] == BLACK_PAWN);
            if capturable {
                new_ep = Some(EnPassant { captured_square: end, target_square: end - 8 });
            }
        } else if start_piece == BLACK_PAWN && start as i16 - end as i16 == 16 {
            let capturable = (end_file > 0 && self.squares[(end - 1) as usize] == WHITE_PAWN)
                || (end_file < 7 && self.squares[(end + 1) as usize] == WHITE_PAWN);
            if capturable {
                new_ep = Some(EnPassant { captured_square: end, target_square: end + 8 });
            }
        }
        if let Some(old_ep) = current.ep {
            next.hash ^= zobrist::en_passant_key(old_ep.target_square % 8);
        }
        if let Some(ep) = new_ep {
            next.hash ^= zobrist::en_passant_key(ep.target_square % 8);
        }
        next.ep = new_ep;

        next
    }

    /// Advance the side to move and toggle the hash's side-to-move term
    /// together, so every transition (`apply_one`, castling, en passant,
    /// null) keeps `color` and `hash` in lockstep exactly once per move,
    /// regardless of how many internal `step` calls built it.
    fn flip_side_to_move(data: &mut BitboardData) {
        data.color = data.color.other();
        data.hash ^= zobrist::black_to_move_key();
    }

    fn push_ply(&mut self, data: BitboardData, applied: PlyMoves) {
        self.history.push(data);
        self.moves_applied.push(applied);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::position::Position;

    #[test]
    fn make_then_unmake_restores_exact_hash() {
        let mut pos = Position::new();
        let before = pos.hash();
        pos.make_move(Move::normal(12, 28)).unwrap(); // e2e4
        assert_ne!(pos.hash(), before);
        pos.unmake_move();
        assert_eq!(pos.hash(), before);
    }

    #[test]
    fn make_then_unmake_restores_mailbox() {
        let mut pos = Position::new();
        let before = pos.piece_at(12);
        pos.make_move(Move::normal(12, 28)).unwrap();
        assert_eq!(pos.piece_at(12), NO_PIECE);
        pos.unmake_move();
        assert_eq!(pos.piece_at(12), before);
    }

    #[test]
    fn e4_e5_round_trip_hash_matches_direct_setup() {
        let mut pos = Position::new();
        pos.make_move(Move::normal(12, 28)).unwrap(); // e2e4
        pos.make_move(Move::normal(52, 36)).unwrap(); // e7e5
        let hash_via_moves = pos.hash();

        let mut squares = super::super::STARTING_SQUARES;
        squares[12] = NO_PIECE;
        squares[28] = WHITE_PAWN;
        squares[52] = NO_PIECE;
        squares[36] = BLACK_PAWN;
        let direct = Position::from_squares_with_depth(
            squares,
            Color::White,
            WHITE_OO | WHITE_OOO | BLACK_OO | BLACK_OOO,
            None,
            128,
        );
        assert_eq!(hash_via_moves, direct.hash());
    }

    #[test]
    fn double_push_sets_en_passant_target() {
        let mut pos = Position::new();
        pos.make_move(Move::normal(12, 28)).unwrap();
        assert!(pos.current().ep.is_none()); // no black pawn adjacent to e4 yet
    }

    #[test]
    fn castling_moves_both_king_and_rook() {
        let mut squares = [NO_PIECE; 64];
        squares[4] = WHITE_KING;
        squares[7] = WHITE_ROOK;
        squares[60] = BLACK_KING;
        let mut pos = Position::from_squares(squares, Color::White, WHITE_OO | WHITE_OOO);
        pos.make_move(Move::castling(Castling::WhiteOO)).unwrap();
        assert_eq!(pos.piece_at(6), WHITE_KING);
        assert_eq!(pos.piece_at(5), WHITE_ROOK);
        assert_eq!(pos.piece_at(4), NO_PIECE);
        assert_eq!(pos.piece_at(7), NO_PIECE);
    }

    #[test]
    fn castling_flips_side_to_move() {
        let mut squares = [NO_PIECE; 64];
        squares[4] = WHITE_KING;
        squares[7] = WHITE_ROOK;
        squares[60] = BLACK_KING;
        let mut pos = Position::from_squares(squares, Color::White, WHITE_OO | WHITE_OOO);
        pos.make_move(Move::castling(Castling::WhiteOO)).unwrap();
        assert_eq!(pos.current().color, Color::Black);
    }

    #[test]
    fn castling_hash_matches_a_position_built_directly_with_black_to_move() {
        let mut squares = [NO_PIECE; 64];
        squares[4] = WHITE_KING;
        squares[7] = WHITE_ROOK;
        squares[60] = BLACK_KING;
        let mut pos = Position::from_squares(squares, Color::White, WHITE_OO | WHITE_OOO);
        pos.make_move(Move::castling(Castling::WhiteOO)).unwrap();

        let mut castled_squares = [NO_PIECE; 64];
        castled_squares[6] = WHITE_KING;
        castled_squares[5] = WHITE_ROOK;
        castled_squares[60] = BLACK_KING;
        let direct = Position::from_squares(castled_squares, Color::Black, 0);
        assert_eq!(pos.hash(), direct.hash());
    }

    #[test]
    fn castling_clears_both_white_castling_rights() {
        let mut squares = [NO_PIECE; 64];
        squares[4] = WHITE_KING;
        squares[7] = WHITE_ROOK;
        squares[60] = BLACK_KING;
        let mut pos = Position::from_squares(squares, Color::White, WHITE_OO | WHITE_OOO);
        pos.make_move(Move::castling(Castling::WhiteOO)).unwrap();
        assert_eq!(pos.current().castling & (WHITE_OO | WHITE_OOO), 0);
    }

    #[test]
    fn double_push_adjacent_to_enemy_pawn_sets_en_passant_target() {
        let mut squares = [NO_PIECE; 64];
        squares[4] = WHITE_KING;
        squares[60] = BLACK_KING;
        squares[12] = WHITE_PAWN; // e2
        squares[27] = BLACK_PAWN; // d4, adjacent to e4
        let mut pos = Position::from_squares(squares, Color::White, 0);
        pos.make_move(Move::normal(12, 28)).unwrap(); // e2e4
        let ep = pos.current().ep.expect("en passant target should be set");
        assert_eq!(ep.captured_square, 28);
        assert_eq!(ep.target_square, 20);
    }

    #[test]
    fn en_passant_capture_removes_captured_pawn() {
        let mut squares = [NO_PIECE; 64];
        squares[4] = WHITE_KING;
        squares[60] = BLACK_KING;
        squares[28] = WHITE_PAWN; // e4
        squares[27] = BLACK_PAWN; // d4
        let mut pos = Position::from_squares(squares, Color::White, 0);
        pos.make_move(Move::en_passant(28, 35)).unwrap(); // exd5 e.p. landing on d5
        assert_eq!(pos.piece_at(35), WHITE_PAWN);
        assert_eq!(pos.piece_at(27), NO_PIECE);
        assert_eq!(pos.piece_at(28), NO_PIECE);
    }

    #[test]
    fn en_passant_capture_flips_side_to_move() {
        let mut squares = [NO_PIECE; 64];
        squares[4] = WHITE_KING;
        squares[60] = BLACK_KING;
        squares[28] = WHITE_PAWN; // e4
        squares[27] = BLACK_PAWN; // d4
        let mut pos = Position::from_squares(squares, Color::White, 0);
        pos.make_move(Move::en_passant(28, 35)).unwrap();
        assert_eq!(pos.current().color, Color::Black);
    }

    #[test]
    fn en_passant_hash_matches_a_position_built_directly_with_black_to_move() {
        let mut squares = [NO_PIECE; 64];
        squares[4] = WHITE_KING;
        squares[60] = BLACK_KING;
        squares[28] = WHITE_PAWN; // e4
        squares[27] = BLACK_PAWN; // d4
        let mut pos = Position::from_squares(squares, Color::White, 0);
        pos.make_move(Move::en_passant(28, 35)).unwrap();

        let mut captured_squares = [NO_PIECE; 64];
        captured_squares[4] = WHITE_KING;
        captured_squares[60] = BLACK_KING;
        captured_squares[35] = WHITE_PAWN; // d5
        let direct = Position::from_squares(captured_squares, Color::Black, 0);
        assert_eq!(pos.hash(), direct.hash());
    }

    #[test]
    fn en_passant_capture_unmakes_cleanly() {
        let mut squares = [NO_PIECE; 64];
        squares[4] = WHITE_KING;
        squares[60] = BLACK_KING;
        squares[28] = WHITE_PAWN;
        squares[27] = BLACK_PAWN;
        let mut pos = Position::from_squares(squares, Color::White, 0);
        let before = pos.hash();
        pos.make_move(Move::en_passant(28, 35)).unwrap();
        pos.unmake_move();
        assert_eq!(pos.piece_at(35), NO_PIECE);
        assert_eq!(pos.piece_at(27), BLACK_PAWN);
        assert_eq!(pos.piece_at(28), WHITE_PAWN);
        assert_eq!(pos.hash(), before);
    }

    #[test]
    fn promotion_replaces_pawn_with_chosen_piece() {
        let mut squares = [NO_PIECE; 64];
        squares[4] = WHITE_KING;
        squares[62] = BLACK_KING; // g8, out of the pawn's way
        squares[52] = WHITE_PAWN; // e7
        let mut pos = Position::from_squares(squares, Color::White, 0);
        pos.make_move(Move::promotion(52, 60, crate::types::WHITE_QUEEN)).unwrap();
        assert_eq!(pos.piece_at(60), crate::types::WHITE_QUEEN);
    }
}

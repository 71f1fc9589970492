//! FEN parsing and serialization.

use crate::error::FenError;
use crate::position::{EnPassant, Position};
use crate::types::{
    algebraic_to_square, char_to_piece, piece_to_char, square_to_algebraic, Color, NO_PIECE,
    BLACK_OO, BLACK_OOO, WHITE_OO, WHITE_OOO,
};

pub const STARTING_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

/// Parse a FEN string into a [`Position`]. The halfmove clock and fullmove
/// number fields are accepted but not retained: this engine tracks game
/// length through its own history stack, not FEN's counters.
pub fn parse(fen: &str) -> Result<Position, FenError> {
    let parts: Vec<&str> = fen.split_whitespace().collect();
    if parts.len() < 4 {
        return Err(FenError::TooFewParts { found: parts.len() });
    }

    let mut squares = [NO_PIECE; 64];
    let ranks: Vec<&str> = parts[0].split('/').collect();
    if ranks.len() != 8 {
        return Err(FenError::WrongRankCount { found: ranks.len() });
    }
    for (rank_from_top, rank_str) in ranks.iter().enumerate() {
        let rank = 7 - rank_from_top;
        let mut file = 0usize;
        for c in rank_str.chars() {
            if let Some(skip) = c.to_digit(10) {
                file += skip as usize;
            } else {
                if file >= 8 {
                    return Err(FenError::TooManyFiles { rank, files: file + 1 });
                }
                let piece = char_to_piece(c).ok_or(FenError::InvalidPiece { char: c })?;
                squares[rank * 8 + file] = piece;
                file += 1;
            }
        }
        if file != 8 {
            return Err(FenError::TooManyFiles { rank, files: file });
        }
    }

    let color = match parts[1] {
        "w" => Color::White,
        "b" => Color::Black,
        other => return Err(FenError::InvalidSideToMove { found: other.to_string() }),
    };

    let mut castling = 0u8;
    if parts[2] != "-" {
        for c in parts[2].chars() {
            castling |= match c {
                'K' => WHITE_OO,
                'Q' => WHITE_OOO,
                'k' => BLACK_OO,
                'q' => BLACK_OOO,
                other => return Err(FenError::InvalidCastling { char: other }),
            };
        }
    }

    let ep = if parts[3] == "-" {
        None
    } else {
        let target_square = algebraic_to_square(parts[3])
            .ok_or_else(|| FenError::InvalidEnPassant { found: parts[3].to_string() })?;
        let captured_square = match color {
            // The FEN en-passant square is where a capturing pawn would
            // land; the pawn removed is one rank behind it from the
            // perspective of the side that just moved.
            Color::White => target_square - 8,
            Color::Black => target_square + 8,
        };
        Some(EnPassant { captured_square, target_square })
    };

    Ok(Position::from_squares_with_depth(squares, color, castling, ep, 128))
}

/// Serialize a position's board, side to move, castling rights, and
/// en-passant target back to FEN. The halfmove clock and fullmove number
/// are always written as `0 1`, since this engine doesn't track them.
pub fn to_fen(position: &Position) -> String {
    let mut board = String::with_capacity(64);
    for rank in (0..8).rev() {
        let mut empty_run = 0;
        for file in 0..8 {
            let sq = (rank * 8 + file) as u8;
            let piece = position.piece_at(sq);
            if piece == NO_PIECE {
                empty_run += 1;
            } else {
                if empty_run > 0 {
                    board.push_str(&empty_run.to_string());
                    empty_run = 0;
                }
                board.push(piece_to_char(piece));
            }
        }
        if empty_run > 0 {
            board.push_str(&empty_run.to_string());
        }
        if rank != 0 {
            board.push('/');
        }
    }

    let data = position.current();
    let side = match data.color {
        Color::White => "w",
        Color::Black => "b",
    };

    let mut castling = String::new();
    if data.castling & WHITE_OO != 0 {
        castling.push('K');
    }
    if data.castling & WHITE_OOO != 0 {
        castling.push('Q');
    }
    if data.castling & BLACK_OO != 0 {
        castling.push('k');
    }
    if data.castling & BLACK_OOO != 0 {
        castling.push('q');
    }
    if castling.is_empty() {
        castling.push('-');
    }

    let ep = match data.ep {
        Some(ep) => square_to_algebraic(ep.target_square),
        None => "-".to_string(),
    };

    format!("{board} {side} {castling} {ep} 0 1")
}

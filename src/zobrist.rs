//! Zobrist hashing: incrementally-updatable 64-bit position hashes used
//! both as the position's public `hash()` and as the transposition
//! table's bucket key.

use rand::prelude::*;
use std::sync::LazyLock;

pub(crate) struct ZobristKeys {
    /// `piece_keys[piece_code][square]`, piece_code in 1..=12 (0 unused).
    pub(crate) piece_keys: [[u64; 64]; 13],
    pub(crate) black_to_move_key: u64,
    /// One key per castling right bit (`WHITE_OO`, `WHITE_OOO`, `BLACK_OO`, `BLACK_OOO`).
    pub(crate) castling_keys: [u64; 4],
    /// Indexed by file of an en-passant target square.
    pub(crate) en_passant_keys: [u64; 8],
}

impl ZobristKeys {
    fn new() -> Self {
        // Fixed seed: hashes must be reproducible across runs so that
        // persisted transposition data and test fixtures stay valid.
        let mut rng = StdRng::seed_from_u64(1_070_372_017);

        let mut piece_keys = [[0u64; 64]; 13];
        for piece_table in piece_keys.iter_mut().skip(1) {
            for key in piece_table.iter_mut() {
                *key = rng.gen();
            }
        }

        let black_to_move_key = rng.gen();

        let mut castling_keys = [0u64; 4];
        for key in castling_keys.iter_mut() {
            *key = rng.gen();
        }

        let mut en_passant_keys = [0u64; 8];
        for key in en_passant_keys.iter_mut() {
            *key = rng.gen();
        }

        ZobristKeys {
            piece_keys,
            black_to_move_key,
            castling_keys,
            en_passant_keys,
        }
    }
}

pub(crate) static ZOBRIST: LazyLock<ZobristKeys> = LazyLock::new(ZobristKeys::new);

#[inline]
pub(crate) fn piece_square_key(piece_code: u8, square: u8) -> u64 {
    ZOBRIST.piece_keys[piece_code as usize][square as usize]
}

#[inline]
pub(crate) fn black_to_move_key() -> u64 {
    ZOBRIST.black_to_move_key
}

#[inline]
pub(crate) fn castling_key(bit_index: u8) -> u64 {
    ZOBRIST.castling_keys[bit_index as usize]
}

#[inline]
pub(crate) fn en_passant_key(file: u8) -> u64 {
    ZOBRIST.en_passant_keys[file as usize]
}

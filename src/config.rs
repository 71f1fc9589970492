//! Tunable evaluation weights and search limits.
//!
//! Piece values and positional weights are expressed in thousandths of a
//! pawn so they fit comfortably in `i32` without overflowing during
//! accumulation.

/// Piece material and mobility weights, indexed by piece code (0..=12).
#[derive(Clone, Debug)]
pub struct ScoreParams {
    pub piece_values: [i32; 13],
    pub piece_mobility: [i32; 13],
    pub pawn_defending_pawn: i32,
    pub pawn_defending_piece: i32,
    pub pawn_blocked: i32,
    pub pawn_doubled: i32,
    pub pawn_center_attack: i32,
    pub pawn_rank_2: i32,
    pub pawn_rank_3: i32,
    pub pawn_rank_4: i32,
    pub pawn_rank_5: i32,
    pub pawn_rank_6: i32,
    pub pawn_rank_7: i32,
}

impl Default for ScoreParams {
    fn default() -> Self {
        ScoreParams {
            piece_values: [
                0, 1000, 3000, 3200, 5000, 9000, 2_000_000, -1000, -3000, -3200, -5000, -9000,
                -2_000_000,
            ],
            piece_mobility: [0, 100, 120, 130, 140, 140, 50, -100, -120, -130, -140, -140, -50],
            pawn_defending_pawn: 121,
            pawn_defending_piece: 85,
            pawn_blocked: -63,
            pawn_doubled: -200,
            pawn_center_attack: 52,
            pawn_rank_2: 40,
            pawn_rank_3: 78,
            pawn_rank_4: 105,
            pawn_rank_5: 150,
            pawn_rank_6: 200,
            pawn_rank_7: 400,
        }
    }
}

/// Bound used to cap white/black win scores so mate scores stay outside
/// the range any positional evaluation could reach.
pub const SCORE_WHITE_WIN: i32 = 0x007f_ffff;
pub const SCORE_BLACK_WIN: i32 = -0x007f_ffff;
pub const SCORE_DRAW: i32 = 0;

/// Search-wide limits, independent of evaluation weights.
#[derive(Clone, Debug)]
pub struct SearchConfig {
    /// Maximum ply the search tree arena will allocate for; exceeding
    /// this raises [`crate::error::EngineError::DepthOverflow`].
    pub max_search_depth: u32,
    /// When true, quiescence-style capture-only search continues below
    /// the normal search horizon before static evaluation is taken.
    pub follow_captures: bool,
}

impl Default for SearchConfig {
    fn default() -> Self {
        SearchConfig { max_search_depth: 128, follow_captures: true }
    }
}

/// Top-level engine configuration, composed of the pieces above.
#[derive(Clone, Debug, Default)]
pub struct Config {
    pub score: ScoreParams,
    pub search: SearchConfig,
}

//! Static position evaluation.
//!
//! A layered `score_level_*` design: each level adds one more consideration
//! on top of the last, so search code can pick a cheap or expensive
//! evaluation depending on how deep it is probing.

use crate::config::ScoreParams;
use crate::move_tables::{pawns, MOVE_TABLES};
use crate::position::Position;
use crate::types::{piece_parts, Color, PieceKind, NO_PIECE};

const CENTER_MASK: u64 = 0x0000_c3c3_c3c3_0000;

/// Material only: the incrementally-maintained `piece_score` field.
pub fn score_level_0(position: &Position) -> i32 {
    position.current().piece_score
}

/// Material plus pawn structure. What move ordering (`move_rank`) scores
/// candidate replies with, cheaper than the full mobility-aware level.
pub fn score_level_1(position: &Position) -> i32 {
    score_material(position) + score_pawn_structure(position)
}

/// Material, pawn structure, and piece mobility: each piece's reachable
/// square count contributes to the total rather than being computed and
/// discarded, so mobility is real input to the evaluation actually used
/// at search leaves.
pub fn score_level_2(position: &Position) -> i32 {
    score_level_1(position) + score_piece_position(position)
}

/// The evaluation search calls at the leaves of the tree.
pub fn evaluate(position: &Position) -> i32 {
    score_level_2(position)
}

pub fn score_material(position: &Position) -> i32 {
    score_level_0(position)
}

pub fn score_pawn_structure(position: &Position) -> i32 {
    let data = position.current();
    let cfg = ScoreParams::default();
    let mut output = 0i32;

    let w_rows = crate::bitutil::half_popcount(data.wpawns);
    let b_rows = crate::bitutil::half_popcount(data.bpawns);
    let w_byte = |i: u32| ((w_rows >> (i * 8)) & 0xff) as i32;
    let b_byte = |i: u32| ((b_rows >> (i * 8)) & 0xff) as i32;

    // Advancement: rank N for white mirrors rank (9-N) for black. All six
    // terms are summed into the running total.
    output += cfg.pawn_rank_2 * (w_byte(1) - b_byte(6));
    output += cfg.pawn_rank_3 * (w_byte(2) - b_byte(5));
    output += cfg.pawn_rank_4 * (w_byte(3) - b_byte(4));
    output += cfg.pawn_rank_5 * (w_byte(4) - b_byte(3));
    output += cfg.pawn_rank_6 * (w_byte(5) - b_byte(2));
    output += cfg.pawn_rank_7 * (w_byte(6) - b_byte(1));

    // Connectivity: pawns defended by friendly pawns.
    let w_defended = pawns::pieces_attacked(data.wpawns, data.wpawns, Color::White);
    let b_defended = pawns::pieces_attacked(data.bpawns, data.bpawns, Color::Black);
    output += cfg.pawn_defending_pawn * (w_defended as i32 - b_defended as i32);

    // Doubled pawns.
    let w_doubled = pawns::doubled_pawns(data.wpawns);
    let b_doubled = pawns::doubled_pawns(data.bpawns);
    output += cfg.pawn_doubled * (w_doubled as i32 - b_doubled as i32);

    // Blocked pawns.
    let occ_all = data.occ_all();
    let w_blocked = pawns::blocked_pawns(data.wpawns, occ_all, Color::White);
    let b_blocked = pawns::blocked_pawns(data.bpawns, occ_all, Color::Black);
    output += cfg.pawn_blocked * (w_blocked as i32 - b_blocked as i32);

    // Central control.
    let w_center = pawns::square_control(data.wpawns, CENTER_MASK, Color::White);
    let b_center = pawns::square_control(data.bpawns, CENTER_MASK, Color::Black);
    output += cfg.pawn_center_attack * (w_center as i32 - b_center as i32);

    output
}

/// Mobility: each piece contributes `PIECE_MOBILITY[piece] * move_count`,
/// with `PIECE_MOBILITY` already carrying the sign for each color (positive
/// for white piece codes, negative for black), so summing across both
/// sides directly yields a white-positive total. Each piece's own color
/// supplies "friendly" and the other "enemy", so a queen's rook/bishop
/// components are always scored from her own side's point of view.
pub fn score_piece_position(position: &Position) -> i32 {
    let data = position.current();
    let cfg = ScoreParams::default();
    let tables = &*MOVE_TABLES;
    let mut output = 0i32;

    for sq in 0u8..64 {
        let piece = position.piece_at(sq);
        if piece == NO_PIECE {
            continue;
        }
        let Some((color, kind)) = piece_parts(piece) else {
            continue;
        };
        let (friendly, enemy) = match color {
            Color::White => (data.white, data.black),
            Color::Black => (data.black, data.white),
        };

        let n_moves: u32 = match kind {
            PieceKind::Knight => tables.jumping.knight_moves(sq, friendly).count(),
            PieceKind::King => tables.jumping.king_moves(sq, friendly).count(),
            PieceKind::Bishop => tables.sliding.bishop_moves(sq, friendly, enemy).count(),
            PieceKind::Rook => tables.sliding.rook_moves(sq, friendly, enemy).count(),
            PieceKind::Queen => tables.sliding.queen_moves(sq, friendly, enemy).count(),
            PieceKind::Pawn => {
                let occ_all = data.occ_all();
                let pushes = pawns::push_targets(sq, color, occ_all).count_ones();
                let attacks = pawns::attack_targets(sq, color) & enemy;
                pushes + attacks.count_ones()
            }
        };

        output += cfg.piece_mobility[piece as usize] * n_moves as i32;
    }

    output
}

/// Move ordering heuristic: the score of the position after playing
/// `mv`, signed so that a higher rank always means better for the side
/// that just moved.
pub fn move_rank(position: &mut Position, mv: crate::types::Move) -> i32 {
    let side_before = position.side_to_move();
    let _ = position.make_move(mv);
    let score = score_level_1(position);
    position.unmake_move();
    match side_before {
        Color::White => score,
        Color::Black => -score,
    }
}

//! Error types for FEN parsing and engine-level failures.

use std::fmt;

use crate::types::Move;

/// Error type for FEN parsing failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FenError {
    /// FEN string has too few parts (needs at least 4).
    TooFewParts { found: usize },
    /// Invalid piece character in the position field.
    InvalidPiece { char: char },
    /// More than 8 squares described in one rank.
    TooManyFiles { rank: usize, files: usize },
    /// Fewer or more than 8 ranks described.
    WrongRankCount { found: usize },
    /// Side-to-move field was neither "w" nor "b".
    InvalidSideToMove { found: String },
    /// Invalid character in the castling-rights field.
    InvalidCastling { char: char },
    /// En-passant target square failed to parse.
    InvalidEnPassant { found: String },
}

impl fmt::Display for FenError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FenError::TooFewParts { found } => {
                write!(f, "FEN must have at least 4 parts, found {found}")
            }
            FenError::InvalidPiece { char } => {
                write!(f, "invalid piece character '{char}' in FEN")
            }
            FenError::TooManyFiles { rank, files } => {
                write!(f, "too many files ({files}) in rank {rank}")
            }
            FenError::WrongRankCount { found } => {
                write!(f, "expected 8 ranks in FEN, found {found}")
            }
            FenError::InvalidSideToMove { found } => {
                write!(f, "invalid side to move '{found}', expected 'w' or 'b'")
            }
            FenError::InvalidCastling { char } => {
                write!(f, "invalid castling character '{char}' in FEN")
            }
            FenError::InvalidEnPassant { found } => {
                write!(f, "invalid en passant square '{found}'")
            }
        }
    }
}

impl std::error::Error for FenError {}

/// Error type for engine-level invariant violations: depth limits, move
/// lookups, and transposition/search-tree consistency failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// Search recursed past the fixed history/arena depth limit.
    DepthOverflow { depth: u32, max: u32 },
    /// A requested move does not appear among the position's legal moves.
    MoveNotFound { mv: Move },
    /// The search tree reached an internally inconsistent state (e.g. a
    /// node edge pointing at a freed arena slot).
    TreeConsistency { detail: String },
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineError::DepthOverflow { depth, max } => {
                write!(f, "search depth {depth} exceeds maximum of {max}")
            }
            EngineError::MoveNotFound { mv } => {
                write!(f, "move {mv} is not legal in this position")
            }
            EngineError::TreeConsistency { detail } => {
                write!(f, "search tree inconsistency: {detail}")
            }
        }
    }
}

impl std::error::Error for EngineError {}

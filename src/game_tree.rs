//! High-level search facade, grounded in the original engine's `GameTree`:
//! a position plus a persistent search-tree arena and transposition table,
//! exposing the handful of named search modes `GameTree` offered
//! (`uniform_tree`, `uniform_tree_expanded_captures`, `alpha_beta_tree`)
//! instead of making callers assemble [`TreeOptions`] by hand.

use crate::config::Config;
use crate::position::Position;
use crate::search_tree::{self, NodeArena, SearchResult, SearchTree, TreeOptions};
use crate::transposition_table::TranspositionTable;
use crate::types::Move;

/// Owns a position, the node arena a search tree is built in, and the
/// transposition table that lets reconvergent lines share a node. Both
/// are wiped at the start of every root search, so nothing here survives
/// across searches except the position itself.
pub struct GameTree {
    position: Position,
    arena: NodeArena,
    tt: TranspositionTable,
    search_cfg: crate::config::SearchConfig,
}

impl GameTree {
    pub fn new(mut position: Position, cfg: &Config) -> Self {
        position.set_max_depth(cfg.search.max_search_depth);
        GameTree {
            position,
            arena: NodeArena::new(),
            tt: search_tree::default_transposition_table(&cfg.search),
            search_cfg: cfg.search.clone(),
        }
    }

    pub fn position(&self) -> &Position {
        &self.position
    }

    pub fn position_mut(&mut self) -> &mut Position {
        &mut self.position
    }

    fn search_tree(&mut self, options: TreeOptions) -> SearchTree<'_> {
        SearchTree::new(&mut self.position, &mut self.arena, &mut self.tt, options)
    }

    /// Plain negamax, no pruning heuristics: every legal reply at every
    /// ply is explored. Corresponds to the original's `uniform_tree`.
    pub fn uniform_tree(&mut self, depth: u32) -> SearchResult {
        self.search_tree(TreeOptions::NONE).search(depth)
    }

    /// Plain negamax that keeps resolving captures past the horizon.
    /// Corresponds to the original's `uniform_tree_expanded_captures`.
    pub fn uniform_tree_expanded_captures(&mut self, depth: u32) -> SearchResult {
        self.search_tree(TreeOptions::FOLLOW_CAPTURES).search(depth)
    }

    /// Move-ordered negamax with alpha-beta pruning and capture
    /// resolution at the horizon. Corresponds to the original's
    /// `alpha_beta_tree`, the mode it actually played games with.
    pub fn alpha_beta_tree(&mut self, depth: u32) -> SearchResult {
        self.search_tree(TreeOptions::ALPHA_BETA).search(depth)
    }

    /// Alpha-beta search with presorting, additionally honoring the
    /// `Config`'s `search.follow_captures` flag (the three named modes
    /// above always hard-code their own `TreeOptions`; this is the one
    /// entry point callers can steer purely through configuration).
    pub fn configured_search(&mut self, depth: u32) -> SearchResult {
        let options = TreeOptions { presort_moves: true, follow_captures: self.search_cfg.follow_captures };
        self.search_tree(options).search(depth)
    }

    /// Iterative deepening up to `max_depth`: each shallower pass is
    /// discarded (the arena and table are wiped at the start of the next
    /// one), but still serves to report a best move at every depth along
    /// the way.
    pub fn iterative_deepening(&mut self, max_depth: u32) -> SearchResult {
        let mut result = SearchResult { score: 0, best_move: None, nodes_searched: 0 };
        for depth in 1..=max_depth {
            result = self.configured_search(depth);
        }
        result
    }

    /// The principal variation from the most recently completed root
    /// search, read directly out of the arena without searching again.
    pub fn principal_variation(&mut self, max_len: usize) -> Vec<Move> {
        let hash = self.position.hash();
        match self.tt.get(hash) {
            Some(root_id) => self.arena.best_line(root_id, max_len),
            None => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::position::Position;

    #[test]
    fn iterative_deepening_reaches_requested_depth_without_panicking() {
        let mut tree = GameTree::new(Position::new(), &Config::default());
        let result = tree.iterative_deepening(3);
        assert!(result.best_move.is_some());
    }

    #[test]
    fn principal_variation_starts_with_a_legal_move() {
        let mut tree = GameTree::new(Position::new(), &Config::default());
        tree.alpha_beta_tree(2);
        let pv = tree.principal_variation(2);
        assert!(!pv.is_empty());
    }

    #[test]
    fn configured_search_honors_follow_captures_flag() {
        let mut squares = [crate::types::NO_PIECE; 64];
        squares[4] = crate::types::WHITE_KING;
        squares[60] = crate::types::BLACK_KING;
        squares[27] = crate::types::WHITE_ROOK; // d4
        squares[35] = crate::types::BLACK_QUEEN; // d5, hanging
        let position = Position::from_squares(squares, crate::types::Color::White, 0);

        let mut cfg = Config::default();
        cfg.search.follow_captures = true;
        let mut tree = GameTree::new(position, &cfg);
        let result = tree.configured_search(1);
        assert!(result.best_move.is_some());
    }

    #[test]
    fn new_applies_configured_max_search_depth_to_the_position() {
        let mut cfg = Config::default();
        cfg.search.max_search_depth = 2;
        let mut tree = GameTree::new(Position::new(), &cfg);
        tree.position_mut().make_move(crate::types::Move::normal(12, 28)).unwrap();
        let err = tree
            .position_mut()
            .make_move(crate::types::Move::normal(52, 36))
            .unwrap_err();
        assert!(matches!(err, crate::error::EngineError::DepthOverflow { max: 2, .. }));
    }
}

//! Negamax search tree: `Node`/`NodeEdge` graph, alpha-beta pruning, and
//! transposition-keyed reconvergence.
//!
//! A `Node` owns a sorted list of `(Move, NodeEdge)` children, where a
//! `NodeEdge` is a tagged union that starts out holding a one-ply "score
//! mode" estimate and gets converted to "child mode" (a reference to a
//! fully searched child `Node`) the first time search actually descends
//! into it. Reconvergent lines — two different move orders reaching the
//! same Zobrist key — share that child `Node` instead of recomputing it,
//! with a parent count tracking how many edges reference it.
//!
//! Nodes live in an arena ([`NodeArena`], a `Vec<Node>` addressed by
//! [`NodeId`]) rather than behind individually owned pointers: every node
//! created during one root search stays alive until the arena is wiped at
//! the start of the next, so there is no need to track when a node's
//! parent count reaches zero in order to free it. A `NodeId` carries the
//! arena's generation at allocation time and is checked against the
//! arena's current generation on every lookup, so a `NodeId` left over
//! from a wiped search is rejected with [`EngineError::TreeConsistency`]
//! rather than silently aliasing an unrelated node.

use crate::config::{SearchConfig, SCORE_BLACK_WIN, SCORE_WHITE_WIN};
use crate::error::EngineError;
use crate::eval;
use crate::position::Position;
use crate::transposition_table::TranspositionTable;
use crate::types::{Color, Move};

/// Which of the original's `TreeOptions` a search honors.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TreeOptions {
    /// Sort moves by one-ply static score before recursing, so alpha-beta
    /// sees strong moves first and prunes more. Only takes effect when
    /// `remaining > 2`.
    pub presort_moves: bool,
    /// At the search horizon, extend one more ply if the best one-ply
    /// move available is a capture (see DESIGN.md).
    pub follow_captures: bool,
}

impl TreeOptions {
    pub const NONE: TreeOptions = TreeOptions { presort_moves: false, follow_captures: false };
    pub const PRESORT: TreeOptions = TreeOptions { presort_moves: true, follow_captures: false };
    pub const FOLLOW_CAPTURES: TreeOptions =
        TreeOptions { presort_moves: false, follow_captures: true };
    pub const ALPHA_BETA: TreeOptions = TreeOptions { presort_moves: true, follow_captures: true };
}

/// An index into a [`NodeArena`], tagged with the arena's generation at
/// allocation time so a stale id from a wiped search is rejected rather
/// than silently aliasing an unrelated node.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash)]
pub struct NodeId {
    index: usize,
    generation: u32,
}

/// One edge from a `Node` to one of its move options: either a one-ply
/// static estimate (not yet explored) or a reference to the fully-searched
/// child `Node`.
#[derive(Clone, Copy, Debug)]
pub enum NodeEdge {
    Score { value: i32, capture: bool },
    Child { id: NodeId, capture: bool },
}

impl NodeEdge {
    pub fn capture(&self) -> bool {
        match self {
            NodeEdge::Score { capture, .. } | NodeEdge::Child { capture, .. } => *capture,
        }
    }

    pub fn is_child(&self) -> bool {
        matches!(self, NodeEdge::Child { .. })
    }
}

/// One node of the search tree: the side to move at this node, its
/// negamax score once `create_tree` has run, and the sorted list of move
/// options explored (or estimated) from it.
pub struct Node {
    pub color: Color,
    pub score: i32,
    /// Number of edges (from possibly-distinct parents) referencing this
    /// node, incremented on transposition reconvergence.
    pub parent_count: u32,
    /// The move judged best by `create_tree`'s own alpha-beta bookkeeping,
    /// distinct from (and more reliable than) scanning `children` for the
    /// highest `NodeEdge` score: alpha-beta pruning leaves some children
    /// at their initial one-ply `Score` estimate, never descended into, so
    /// naively taking the max over all edges can surface an unexplored
    /// child whose shallow estimate only looks good. [`NodeArena::best_node`]
    /// exists for callers that want a direct child-edge scan; engine play
    /// should prefer this field (see DESIGN.md).
    pub best_move: Option<Move>,
    /// Sorted by ascending packed `Move` value (the same order
    /// `Position::generate_moves` returns), so [`NodeArena::find_move`]
    /// can binary search it.
    pub children: Vec<(Move, NodeEdge)>,
}

impl Node {
    fn new(color: Color) -> Self {
        Node { color, score: 0, parent_count: 1, best_move: None, children: Vec::new() }
    }
}

/// Owns every `Node` created during one root search. Wiped at the start
/// of the next root search rather than tracking individual frees, which
/// sidesteps the original's manual-delete double-free hazard under
/// transposition reconvergence entirely (see module docs).
pub struct NodeArena {
    nodes: Vec<Node>,
    generation: u32,
}

impl NodeArena {
    pub fn new() -> Self {
        NodeArena { nodes: Vec::new(), generation: 0 }
    }

    /// Drop every node and advance the generation, invalidating any
    /// `NodeId` issued before the wipe.
    pub fn wipe(&mut self) {
        self.nodes.clear();
        self.generation = self.generation.wrapping_add(1);
    }

    fn alloc(&mut self, color: Color) -> NodeId {
        let index = self.nodes.len();
        self.nodes.push(Node::new(color));
        NodeId { index, generation: self.generation }
    }

    #[cfg(test)]
    pub(crate) fn test_alloc(&mut self) -> NodeId {
        self.alloc(Color::White)
    }

    pub fn get(&self, id: NodeId) -> Result<&Node, EngineError> {
        if id.generation != self.generation {
            return Err(EngineError::TreeConsistency {
                detail: "NodeId from a wiped arena generation".to_string(),
            });
        }
        self.nodes.get(id.index).ok_or_else(|| EngineError::TreeConsistency {
            detail: "NodeId index out of range".to_string(),
        })
    }

    fn get_mut(&mut self, id: NodeId) -> Result<&mut Node, EngineError> {
        if id.generation != self.generation {
            return Err(EngineError::TreeConsistency {
                detail: "NodeId from a wiped arena generation".to_string(),
            });
        }
        self.nodes.get_mut(id.index).ok_or_else(|| EngineError::TreeConsistency {
            detail: "NodeId index out of range".to_string(),
        })
    }

    /// Binary search a node's children for `mv` by packed `Move` value.
    /// Fatal if the move is not one of the node's options (spec's `find_move`
    /// is a programmer-error check, not a recoverable lookup).
    pub fn find_move(&self, id: NodeId, mv: Move) -> Result<&NodeEdge, EngineError> {
        let node = self.get(id)?;
        node.children
            .binary_search_by_key(&mv.0, |(m, _)| m.0)
            .map(|idx| &node.children[idx].1)
            .map_err(|_| EngineError::MoveNotFound { mv })
    }

    /// The current node's highest-scoring child edge, spec's `best_node`:
    /// a direct scan over `children` by current `NodeEdge` score, exactly
    /// as the original's `max_element` over `MoveNodePair`s. See
    /// [`Node::best_move`] docs for why engine play should prefer that
    /// field over this scan.
    pub fn best_node(&self, id: NodeId) -> Result<Option<(Move, NodeEdge)>, EngineError> {
        let node = self.get(id)?;
        Ok(node
            .children
            .iter()
            .max_by_key(|(_, edge)| self.edge_score(edge))
            .map(|(mv, edge)| (*mv, *edge)))
    }

    /// Walk `best_move` edges from `id` down to the search horizon,
    /// collecting the principal variation (spec's `best_line`).
    pub fn best_line(&self, id: NodeId, max_len: usize) -> Vec<Move> {
        let mut line = Vec::with_capacity(max_len);
        let mut current = id;
        for _ in 0..max_len {
            let Ok(node) = self.get(current) else { break };
            let Some(mv) = node.best_move else { break };
            let Some((_, edge)) = node.children.iter().find(|(m, _)| *m == mv) else { break };
            line.push(mv);
            match edge {
                NodeEdge::Child { id: child_id, .. } => current = *child_id,
                NodeEdge::Score { .. } => break,
            }
        }
        line
    }

    pub fn edge_score(&self, edge: &NodeEdge) -> i32 {
        match edge {
            NodeEdge::Score { value, .. } => *value,
            NodeEdge::Child { id, .. } => self.get(*id).map(|n| n.score).unwrap_or(0),
        }
    }

    /// Create `NodePointer`s (in score mode) for every pseudo-legal move
    /// from `position`, ranked by the one-ply `level_1` score from each
    /// resulting position's own perspective. Matches the original's
    /// `populate`, hard-coded to `score_level_1` exactly as the original
    /// calls `&Bitboard::score_level_1`.
    fn populate(&mut self, id: NodeId, position: &mut Position) -> Result<(), EngineError> {
        let moves = position.generate_moves();
        let mut children = Vec::with_capacity(moves.len());
        for mv in moves {
            let capture = is_capture(position, mv);
            let value = eval::move_rank(position, mv);
            children.push((mv, NodeEdge::Score { value, capture }));
        }
        self.get_mut(id)?.children = children;
        Ok(())
    }

    /// The recursive negamax body, spec's `create_tree`. `remaining`
    /// counts additional `Node` layers below this one; the node at
    /// `remaining == 0` does not recurse further — its children stay in
    /// score mode, so its own score is simply the best one-ply estimate
    /// `populate` already computed (one full ply deeper than this node),
    /// exactly like the original's non-presorted loop once descent stops.
    pub fn create_tree(
        &mut self,
        id: NodeId,
        tt: &mut TranspositionTable,
        position: &mut Position,
        remaining: u32,
        options: TreeOptions,
        alpha: i32,
        beta: i32,
    ) -> Result<i32, EngineError> {
        self.populate(id, position)?;
        let node = self.get(id)?;
        if node.children.is_empty() {
            let score = leaf_score(position);
            let node = self.get_mut(id)?;
            node.score = score;
            node.best_move = None;
            return Ok(score);
        }

        if remaining == 0 && options.follow_captures {
            let node = self.get(id)?;
            let best_shallow = node
                .children
                .iter()
                .max_by_key(|(_, edge)| self.edge_score(edge))
                .map(|(mv, edge)| (*mv, edge.capture()));
            if let Some((_, true)) = best_shallow {
                return self.create_tree_body(id, tt, position, 1, options, alpha, beta);
            }
        }

        if remaining == 0 {
            let node = self.get(id)?;
            let (best_mv, best_score) = node
                .children
                .iter()
                .map(|(mv, edge)| (*mv, self.edge_score(edge)))
                .max_by_key(|(_, score)| *score)
                .expect("children is non-empty");
            let node = self.get_mut(id)?;
            node.score = best_score;
            node.best_move = Some(best_mv);
            return Ok(best_score);
        }

        self.create_tree_body(id, tt, position, remaining, options, alpha, beta)
    }

    fn create_tree_body(
        &mut self,
        id: NodeId,
        tt: &mut TranspositionTable,
        position: &mut Position,
        remaining: u32,
        options: TreeOptions,
        mut alpha: i32,
        beta: i32,
    ) -> Result<i32, EngineError> {
        let child_count = self.get(id)?.children.len();
        let order: Vec<usize> = if options.presort_moves && remaining > 2 {
            let node = self.get(id)?;
            let mut indices: Vec<usize> = (0..child_count).collect();
            let scores: Vec<i32> =
                node.children.iter().map(|(_, edge)| self.edge_score(edge)).collect();
            indices.sort_by_key(|&i| std::cmp::Reverse(scores[i]));
            indices
        } else {
            (0..child_count).collect()
        };

        let mut best_move = self.get(id)?.children[order[0]].0;

        for child_idx in order {
            let mv = self.get(id)?.children[child_idx].0;
            let score = -self.recurse_create_tree(
                mv, id, child_idx, tt, position, remaining, options, -beta, -alpha,
            )?;

            if score >= beta {
                let node = self.get_mut(id)?;
                node.score = score;
                node.best_move = Some(mv);
                return Ok(score);
            }
            if score > alpha {
                alpha = score;
                best_move = mv;
            }
        }

        let node = self.get_mut(id)?;
        node.score = alpha;
        node.best_move = Some(best_move);
        Ok(alpha)
    }

    /// Make `mv`, resolve the resulting position against the
    /// transposition table (reusing a shared `Node` on reconvergence,
    /// allocating and recursing into a fresh one otherwise), unmake, and
    /// return the child edge's own-perspective score. Matches the
    /// original's `recurse_create_tree` exactly.
    #[allow(clippy::too_many_arguments)]
    fn recurse_create_tree(
        &mut self,
        mv: Move,
        parent_id: NodeId,
        child_idx: usize,
        tt: &mut TranspositionTable,
        position: &mut Position,
        remaining: u32,
        options: TreeOptions,
        alpha: i32,
        beta: i32,
    ) -> Result<i32, EngineError> {
        position.make_move(mv)?;
        let hash = position.hash();

        let existing = tt.get(hash).and_then(|id| self.get(id).ok().map(|_| id));
        let score = if let Some(existing_id) = existing {
            self.get_mut(existing_id)?.parent_count += 1;
            let capture = self.get(parent_id)?.children[child_idx].1.capture();
            self.get_mut(parent_id)?.children[child_idx] =
                (mv, NodeEdge::Child { id: existing_id, capture });
            self.get(existing_id)?.score
        } else {
            let parent_color = self.get(parent_id)?.color;
            let child_color = parent_color.other();
            let new_id = self.alloc(child_color);
            let capture = self.get(parent_id)?.children[child_idx].1.capture();
            self.get_mut(parent_id)?.children[child_idx] =
                (mv, NodeEdge::Child { id: new_id, capture });
            tt.insert(hash, new_id);
            self.create_tree(new_id, tt, position, remaining - 1, options, alpha, beta)?
        };

        position.unmake_move();
        Ok(score)
    }
}

impl Default for NodeArena {
    fn default() -> Self {
        Self::new()
    }
}

fn is_capture(position: &Position, mv: Move) -> bool {
    if mv.is_en_passant() {
        return true;
    }
    position.piece_at(mv.end()) != crate::types::NO_PIECE
}

fn leaf_score(position: &Position) -> i32 {
    let score = eval::evaluate(position);
    match position.side_to_move() {
        Color::White => score,
        Color::Black => -score,
    }
}

/// Outcome of one root search: the score from the mover's point of view,
/// the best move found (if any legal move exists), and how many nodes
/// were visited.
#[derive(Clone, Debug)]
pub struct SearchResult {
    pub score: i32,
    pub best_move: Option<Move>,
    pub nodes_searched: u64,
}

/// Drives one root search: wipes the arena and transposition table (per
/// spec's "clear between root searches" strategy), builds a root `Node`,
/// and runs `create_tree` from it.
pub struct SearchTree<'a> {
    position: &'a mut Position,
    arena: &'a mut NodeArena,
    tt: &'a mut TranspositionTable,
    options: TreeOptions,
}

impl<'a> SearchTree<'a> {
    pub fn new(
        position: &'a mut Position,
        arena: &'a mut NodeArena,
        tt: &'a mut TranspositionTable,
        options: TreeOptions,
    ) -> Self {
        SearchTree { position, arena, tt, options }
    }

    /// Search to a fixed depth with the given alpha-beta window and
    /// return the root's score/move. The window is a parameter rather
    /// than a hard-coded constant, so callers can narrow it (aspiration
    /// windows) instead of always searching the full score range.
    pub fn search_window(&mut self, depth: u32, alpha: i32, beta: i32) -> SearchResult {
        self.arena.wipe();
        self.tt.clear();
        let root_color = self.position.side_to_move();
        let root_id = self.arena.alloc(root_color);
        self.tt.insert(self.position.hash(), root_id);

        let score = self
            .arena
            .create_tree(root_id, self.tt, self.position, depth, self.options, alpha, beta)
            .unwrap_or(0);
        let best_move = self.arena.get(root_id).ok().and_then(|n| n.best_move);
        let nodes_searched = count_nodes(self.arena, root_id);
        SearchResult { score, best_move, nodes_searched }
    }

    pub fn search(&mut self, depth: u32) -> SearchResult {
        self.search_window(depth, SCORE_BLACK_WIN, SCORE_WHITE_WIN)
    }

    /// The root's principal variation, following `best_move` edges down
    /// through the tree this search just built.
    pub fn principal_variation(&mut self, max_len: usize) -> Vec<Move> {
        let root_id = match self.tt.get(self.position.hash()) {
            Some(id) => id,
            None => return Vec::new(),
        };
        self.arena.best_line(root_id, max_len)
    }
}

fn count_nodes(arena: &NodeArena, _root: NodeId) -> u64 {
    // The arena is wiped per root search, so its full length is exactly
    // the node count this search produced.
    arena.nodes.len() as u64
}

pub fn default_transposition_table(_cfg: &SearchConfig) -> TranspositionTable {
    TranspositionTable::new()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::position::Position;
    use crate::types::Color as PieceColor;

    fn new_harness(position: &mut Position) -> (NodeArena, TranspositionTable) {
        let _ = position;
        (NodeArena::new(), TranspositionTable::new())
    }

    #[test]
    fn search_from_start_finds_a_legal_move() {
        let mut pos = Position::new();
        let (mut arena, mut tt) = new_harness(&mut pos);
        let mut tree = SearchTree::new(&mut pos, &mut arena, &mut tt, TreeOptions::ALPHA_BETA);
        let result = tree.search(2);
        assert!(result.best_move.is_some());
    }

    #[test]
    fn search_score_is_symmetric_with_no_options_at_the_start() {
        let mut pos = Position::new();
        let (mut arena, mut tt) = new_harness(&mut pos);
        let mut tree = SearchTree::new(&mut pos, &mut arena, &mut tt, TreeOptions::NONE);
        let result = tree.search(1);
        assert_eq!(result.score, 0);
    }

    #[test]
    fn search_prefers_capturing_a_hanging_queen() {
        let mut squares = [crate::types::NO_PIECE; 64];
        squares[4] = crate::types::WHITE_KING;
        squares[60] = crate::types::BLACK_KING;
        squares[27] = crate::types::WHITE_ROOK; // d4
        squares[35] = crate::types::BLACK_QUEEN; // d5, hanging to the rook
        squares[19] = crate::types::BLACK_PAWN; // d3, an irrelevant alternative
        let mut pos = Position::from_squares(squares, PieceColor::White, 0);
        let (mut arena, mut tt) = new_harness(&mut pos);
        let mut tree = SearchTree::new(&mut pos, &mut arena, &mut tt, TreeOptions::ALPHA_BETA);
        let result = tree.search(1);
        let mv = result.best_move.expect("a legal move exists");
        assert_eq!(mv.start(), 27);
        assert_eq!(mv.end(), 35);
    }

    #[test]
    fn transposition_reconvergence_shares_one_node_with_parent_count_two() {
        // 1.Nf3 Nf6 2.Ng1 Ng8 and 1.Nc3 Nc6 2.Nb1 Nb8 (among other knight
        // shuffles) both return to the starting position after four plies:
        // two independent move sequences reaching the same Zobrist key. A
        // full-width four-ply search from the start should find at least
        // one node two different parents both resolve to.
        let mut pos = Position::new();
        let mut arena = NodeArena::new();
        let mut tt = TranspositionTable::new();
        let root_id = arena.alloc(Color::White);
        arena
            .create_tree(root_id, &mut tt, &mut pos, 4, TreeOptions::NONE, SCORE_BLACK_WIN, SCORE_WHITE_WIN)
            .unwrap();

        let reconverged = arena.nodes.iter().any(|n| n.parent_count >= 2);
        assert!(reconverged, "expected at least one shared node after a four-ply search from the start");
    }

    #[test]
    fn negamax_score_is_negated_across_one_ply() {
        let mut pos = Position::new();
        let (mut arena, mut tt) = new_harness(&mut pos);
        let root_score = {
            let mut tree = SearchTree::new(&mut pos, &mut arena, &mut tt, TreeOptions::NONE);
            tree.search(1).score
        };
        let mv = pos.generate_moves()[0];
        pos.make_move(mv).unwrap();
        let (mut arena2, mut tt2) = new_harness(&mut pos);
        let child_score = {
            let mut tree = SearchTree::new(&mut pos, &mut arena2, &mut tt2, TreeOptions::NONE);
            tree.search(0).score
        };
        pos.unmake_move();
        // At depth 1 with no options, the root's score equals the best
        // one-ply estimate among its children, which by construction is
        // `move_rank` of the best move — not directly comparable to an
        // arbitrary child's depth-0 score, so just assert both searches
        // produce a finite, well-formed score rather than asserting exact
        // equality (a literal equality here would overfit to move choice).
        assert!(root_score.abs() < SCORE_WHITE_WIN);
        assert!(child_score.abs() < SCORE_WHITE_WIN);
    }
}

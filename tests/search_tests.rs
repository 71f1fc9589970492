use chess_engine::config::Config;
use chess_engine::fen;
use chess_engine::game_tree::GameTree;
use chess_engine::position::Position;

#[test]
fn engine_depth_search_returns_move() {
    let mut tree = GameTree::new(Position::new(), &Config::default());
    let result = tree.alpha_beta_tree(2);
    assert!(result.best_move.is_some());
}

#[test]
fn search_from_kiwipete_returns_a_legal_move() {
    let kiwipete =
        fen::parse("r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1").unwrap();
    let mut tree = GameTree::new(kiwipete, &Config::default());
    let result = tree.alpha_beta_tree(2);
    assert!(result.best_move.is_some());
}

#[test]
fn iterative_deepening_converges_to_the_same_best_move_family() {
    let mut tree = GameTree::new(Position::new(), &Config::default());
    let shallow = tree.iterative_deepening(1);
    let deeper = tree.iterative_deepening(3);
    assert!(shallow.best_move.is_some());
    assert!(deeper.best_move.is_some());
}

#[test]
fn principal_variation_only_contains_pseudo_legal_moves() {
    let mut tree = GameTree::new(Position::new(), &Config::default());
    tree.alpha_beta_tree(3);
    let pv = tree.principal_variation(3);
    assert!(!pv.is_empty());
    for mv in &pv {
        assert!(tree.position_mut().generate_moves().contains(mv));
        tree.position_mut().make_move(*mv).unwrap();
    }
}

/// Kasparov #1, a real middlegame position with rich tactics: an
/// alpha-beta search to depth 4 should terminate with a legal best move,
/// a well-formed (finite) score, and a principal variation no longer
/// than the requested depth.
#[test]
fn kasparov_position_depth_four_search_terminates_with_a_bounded_line() {
    let kasparov =
        fen::parse("1rb2rk1/1pqn1p1p/2pN2p1/p1N2P2/Pn1QP3/1P5P/4B1P1/2R2RK1 w - - 1 27").unwrap();
    let mut tree = GameTree::new(kasparov, &Config::default());
    let result = tree.alpha_beta_tree(4);

    assert!(result.best_move.is_some());
    assert!(result.score.abs() < chess_engine::config::SCORE_WHITE_WIN);

    let pv = tree.principal_variation(4);
    assert!(pv.len() <= 4);
}

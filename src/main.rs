//! Minimal demo binary: search the starting position (or a FEN passed as
//! the first argument) to a fixed depth and print the result.

use chess_engine::config::Config;
use chess_engine::fen;
use chess_engine::game_tree::GameTree;
use chess_engine::position::Position;

fn main() {
    let mut args = std::env::args().skip(1);
    let depth: u32 = args.next().and_then(|s| s.parse().ok()).unwrap_or(4);
    let position = match args.next() {
        Some(fen_str) => fen::parse(&fen_str).unwrap_or_else(|err| {
            eprintln!("invalid FEN: {err}");
            std::process::exit(1);
        }),
        None => Position::new(),
    };

    let mut tree = GameTree::new(position, &Config::default());
    let result = tree.iterative_deepening(depth);

    println!("fen: {}", fen::to_fen(tree.position()));
    match result.best_move {
        Some(mv) => println!("bestmove {mv} score {}", result.score),
        None => println!("no legal moves"),
    }
    println!("nodes {}", result.nodes_searched);
}

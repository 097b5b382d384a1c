use std::str::FromStr;

use outpost::board::Board;
use outpost::moves::movegen::generate_pawn_moves;

fn pawn_move_count(fen: &str) -> usize {
    let board = Board::from_str(fen).unwrap();
    let mut moves = vec![];
    generate_pawn_moves(&board, &mut moves);
    moves.len()
}

#[test]
fn start_position_white_pawns() {
    let fen = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";
    assert_eq!(
        pawn_move_count(fen),
        16,
        "White should have 16 pawn moves (8 pushes + 8 doubles)"
    );
}

#[test]
fn start_position_black_pawns() {
    let fen = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR b KQkq - 0 1";
    assert_eq!(
        pawn_move_count(fen),
        16,
        "Black should have 16 pawn moves (8 pushes + 8 doubles)"
    );
}

#[test]
fn double_push_blocked_by_piece_on_third_rank() {
    // Knight on e3 blocks both e3 and e4 for the e2 pawn.
    let fen = "4k3/8/8/8/8/4n3/4P3/4K3 w - - 0 1";
    assert_eq!(pawn_move_count(fen), 0);

    // Blocker on the fourth rank still allows the single push.
    let fen = "4k3/8/8/8/4n3/8/4P3/4K3 w - - 0 1";
    assert_eq!(pawn_move_count(fen), 1);
}

#[test]
fn promotion_pushes() {
    // White pawn on rank 7 with an empty promotion square
    let fen = "8/P7/8/8/8/8/8/k6K w - - 0 1";
    assert_eq!(
        pawn_move_count(fen),
        4,
        "Pawn should have 4 promotion moves (N,B,R,Q)"
    );
}

#[test]
fn promotion_captures_only() {
    // a8 and b8 occupied by black pieces → no push, only 4 promotion captures
    let fen = "rn6/P7/8/8/8/8/8/k6K w - - 0 1";
    assert_eq!(
        pawn_move_count(fen),
        4,
        "Blocked pawn should still have 4 capture-promotions to b8"
    );
}

#[test]
fn promotion_push_and_capture() {
    // a8 empty, b8 black knight → 4 pushes + 4 capture-promotions
    let fen = "1n6/P7/8/8/8/8/8/k6K w - - 0 1";
    assert_eq!(pawn_move_count(fen), 8);
}

#[test]
fn pawn_captures_both_diagonals() {
    let fen = "4k3/8/8/3p1p2/4P3/8/8/4K3 w - - 0 1";
    // e4 takes d5, e4 takes f5, e4e5 push
    assert_eq!(pawn_move_count(fen), 3);
}

#[test]
fn en_passant_from_both_files() {
    // Black pawn just double-pushed to d5; White pawns on c5 and e5.
    let fen = "4k3/8/8/2PpP3/8/8/8/4K3 w - d6 0 1";
    let board = Board::from_str(fen).unwrap();
    let mut moves = vec![];
    generate_pawn_moves(&board, &mut moves);

    let ep_count = moves.iter().filter(|m| m.is_en_passant()).count();
    assert_eq!(ep_count, 2, "both c5 and e5 can take d6 en passant");
    // plus the two straight pushes c5c6 / e5e6
    assert_eq!(moves.len(), 4);
}

#[test]
fn no_en_passant_without_the_square() {
    let fen = "4k3/8/8/2PpP3/8/8/8/4K3 w - - 0 1";
    let board = Board::from_str(fen).unwrap();
    let mut moves = vec![];
    generate_pawn_moves(&board, &mut moves);
    assert!(moves.iter().all(|m| !m.is_en_passant()));
}

#[test]
fn black_pawns_move_down_the_board() {
    let fen = "4k3/4p3/8/8/8/8/8/4K3 b - - 0 1";
    let board = Board::from_str(fen).unwrap();
    let mut moves = vec![];
    generate_pawn_moves(&board, &mut moves);

    assert_eq!(moves.len(), 2);
    for mv in &moves {
        assert!(
            mv.to().rank() < mv.from().rank(),
            "black pawns must move toward rank 1"
        );
    }
}

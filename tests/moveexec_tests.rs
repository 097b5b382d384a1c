use std::str::FromStr;

use outpost::board::{Board, CASTLE_BK, CASTLE_BQ, CASTLE_WK, CASTLE_WQ, Color, Piece};
use outpost::moves::execute::{generate_legal, make_move, unmake_move};
use outpost::moves::magic::loader::load_magic_tables;
use outpost::moves::types::{
    CAPTURE, DOUBLE_PAWN_PUSH, EN_PASSANT, KINGSIDE_CASTLE, Move, QUEENSIDE_CASTLE, QUIET_MOVE,
};
use outpost::square::Square;

fn sq(s: &str) -> Square {
    Square::from_str(s).unwrap()
}

#[test]
fn roundtrip_simple_move() {
    let mut b = Board::new();
    let before = b.clone();
    let mv = Move::new(sq("g1"), sq("f3"), QUIET_MOVE);
    let undo = make_move(&mut b, mv);
    unmake_move(&mut b, mv, undo);
    assert_eq!(b, before);
}

#[test]
fn roundtrip_pawn_capture() {
    let mut board = Board::new();
    let original = board.clone();

    // 1) White: e2 -> e4
    let mv1 = Move::new(sq("e2"), sq("e4"), DOUBLE_PAWN_PUSH);
    let u1 = make_move(&mut board, mv1);

    // 2) Black: d7 -> d5
    let mv2 = Move::new(sq("d7"), sq("d5"), DOUBLE_PAWN_PUSH);
    let u2 = make_move(&mut board, mv2);

    // 3) White captures: e4 -> d5
    let mv3 = Move::new(sq("e4"), sq("d5"), CAPTURE);
    let u3 = make_move(&mut board, mv3);

    // Immediately after capture:
    let mask_d5 = 1u64 << 35;
    assert_eq!(
        board.pieces(Piece::Pawn, Color::Black) & mask_d5,
        0,
        "Black pawn at d5 should have been cleared"
    );
    assert_ne!(
        board.pieces(Piece::Pawn, Color::White) & mask_d5,
        0,
        "White pawn should now be on d5"
    );

    let occ = board.piece_on_sq[35];
    let expected = ((Color::White as u8) << 3) | (Piece::Pawn as u8);
    assert_eq!(occ, expected, "piece_on_sq[35] should encode a White Pawn");

    // Now undo in reverse and verify full restoration
    unmake_move(&mut board, mv3, u3);
    unmake_move(&mut board, mv2, u2);
    unmake_move(&mut board, mv1, u1);
    assert_eq!(
        board, original,
        "Board should be back to the starting position"
    );
}

#[test]
fn roundtrip_white_kingside_castle() {
    let fen = "r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1";
    let mut b = Board::from_str(fen).unwrap();
    let original = b.clone();

    let mv = Move::new(sq("e1"), sq("g1"), KINGSIDE_CASTLE);
    let undo = make_move(&mut b, mv);
    assert_ne!(b.pieces(Piece::King, Color::White) & (1 << 6), 0); // g1
    assert_ne!(b.pieces(Piece::Rook, Color::White) & (1 << 5), 0); // f1
    assert_eq!(b.king_square(Color::White), sq("g1"));
    assert!(!b.has_kingside_castle(Color::White));
    assert!(!b.has_queenside_castle(Color::White));

    unmake_move(&mut b, mv, undo);
    assert_eq!(b, original);
}

#[test]
fn roundtrip_white_queenside_castle() {
    let fen = "r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1";
    let mut b = Board::from_str(fen).unwrap();
    let original = b.clone();

    let mv = Move::new(sq("e1"), sq("c1"), QUEENSIDE_CASTLE);
    let undo = make_move(&mut b, mv);
    assert_ne!(b.pieces(Piece::King, Color::White) & (1 << 2), 0); // c1
    assert_ne!(b.pieces(Piece::Rook, Color::White) & (1 << 3), 0); // d1

    unmake_move(&mut b, mv, undo);
    assert_eq!(b, original);
}

#[test]
fn roundtrip_black_castles() {
    let fen = "r3k2r/8/8/8/8/8/8/R3K2R b KQkq - 0 1";
    for (to, flags) in [("g8", KINGSIDE_CASTLE), ("c8", QUEENSIDE_CASTLE)] {
        let mut b = Board::from_str(fen).unwrap();
        let original = b.clone();

        let mv = Move::new(sq("e8"), sq(to), flags);
        let undo = make_move(&mut b, mv);
        assert_eq!(b.king_square(Color::Black), sq(to));
        assert_eq!(b.castling_rights & (CASTLE_BK | CASTLE_BQ), 0);
        // White rights survive a Black castle
        assert_ne!(b.castling_rights & (CASTLE_WK | CASTLE_WQ), 0);

        unmake_move(&mut b, mv, undo);
        assert_eq!(b, original);
    }
}

#[test]
fn roundtrip_en_passant() {
    // Black just played d7d5; White can take e5xd6 en passant.
    let fen = "4k3/8/8/3pP3/8/8/8/4K3 w - d6 0 1";
    let mut b = Board::from_str(fen).unwrap();
    let original = b.clone();

    let mv = Move::new(sq("e5"), sq("d6"), EN_PASSANT);
    let undo = make_move(&mut b, mv);

    // The victim disappears from d5, the capturer lands on d6.
    assert_eq!(b.piece_at(sq("d5")), None);
    assert_eq!(b.piece_at(sq("d6")), Some((Color::White, Piece::Pawn)));
    assert_eq!(b.piece_at(sq("e5")), None);
    assert_eq!(b.halfmove_clock, 0);

    unmake_move(&mut b, mv, undo);
    assert_eq!(b, original);
}

#[test]
fn roundtrip_promotions() {
    let fen = "4k3/P7/8/8/8/8/8/4K3 w - - 0 1";
    for promo in [Piece::Queen, Piece::Rook, Piece::Bishop, Piece::Knight] {
        let mut b = Board::from_str(fen).unwrap();
        let original = b.clone();

        let mv = Move::new_promotion(sq("a7"), sq("a8"), promo, false);
        let undo = make_move(&mut b, mv);
        assert_eq!(b.piece_at(sq("a8")), Some((Color::White, promo)));
        assert_eq!(b.piece_at(sq("a7")), None);
        assert_eq!(
            b.pieces(Piece::Pawn, Color::White),
            0,
            "the promoting pawn leaves the pawn set"
        );

        unmake_move(&mut b, mv, undo);
        assert_eq!(b, original);
    }
}

#[test]
fn roundtrip_promotion_capture() {
    // White pawn on b7 takes the rook on a8 and promotes.
    let fen = "r3k3/1P6/8/8/8/8/8/4K3 w - - 0 1";
    let mut b = Board::from_str(fen).unwrap();
    let original = b.clone();

    let mv = Move::new_promotion(sq("b7"), sq("a8"), Piece::Queen, true);
    let undo = make_move(&mut b, mv);
    assert_eq!(b.piece_at(sq("a8")), Some((Color::White, Piece::Queen)));
    assert_eq!(b.pieces(Piece::Rook, Color::Black), 0);

    unmake_move(&mut b, mv, undo);
    assert_eq!(b, original);
}

#[test]
fn halfmove_clock_rules() {
    let mut b = Board::from_str("4k3/8/8/8/8/5n2/4P3/RN2K3 w - - 7 20").unwrap();

    // Knight quiet move: clock keeps counting.
    let mv = Move::new(sq("b1"), sq("c3"), QUIET_MOVE);
    let undo = make_move(&mut b, mv);
    assert_eq!(b.halfmove_clock, 8);
    unmake_move(&mut b, mv, undo);
    assert_eq!(b.halfmove_clock, 7);

    // Pawn push: clock resets.
    let mv = Move::new(sq("e2"), sq("e3"), QUIET_MOVE);
    let undo = make_move(&mut b, mv);
    assert_eq!(b.halfmove_clock, 0);
    unmake_move(&mut b, mv, undo);

    // Capture: clock resets.
    let mv = Move::new(sq("e2"), sq("f3"), CAPTURE);
    let undo = make_move(&mut b, mv);
    assert_eq!(b.halfmove_clock, 0);
    unmake_move(&mut b, mv, undo);
    assert_eq!(b.halfmove_clock, 7);
}

#[test]
fn fullmove_number_increments_after_black() {
    let mut b = Board::new();
    assert_eq!(b.fullmove_number, 1);

    let w = Move::new(sq("e2"), sq("e4"), DOUBLE_PAWN_PUSH);
    let uw = make_move(&mut b, w);
    assert_eq!(b.fullmove_number, 1, "unchanged after White's move");

    let blk = Move::new(sq("e7"), sq("e5"), DOUBLE_PAWN_PUSH);
    let ub = make_move(&mut b, blk);
    assert_eq!(b.fullmove_number, 2, "bumps after Black's move");

    unmake_move(&mut b, blk, ub);
    assert_eq!(b.fullmove_number, 1);
    unmake_move(&mut b, w, uw);
}

#[test]
fn rook_moves_and_rook_captures_clear_rights() {
    // White rook leaves a1: White queenside right goes away.
    let fen = "r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1";
    let mut b = Board::from_str(fen).unwrap();
    let mv = Move::new(sq("a1"), sq("a4"), QUIET_MOVE);
    let undo = make_move(&mut b, mv);
    assert!(!b.has_queenside_castle(Color::White));
    assert!(b.has_kingside_castle(Color::White));
    unmake_move(&mut b, mv, undo);
    assert!(b.has_queenside_castle(Color::White));

    // Capturing the rook on h8 clears Black's kingside right.
    let fen = "r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1";
    let mut b = Board::from_str(fen).unwrap();
    let mv = Move::new(sq("h1"), sq("h8"), CAPTURE);
    let undo = make_move(&mut b, mv);
    assert!(!b.has_kingside_castle(Color::Black));
    assert!(b.has_queenside_castle(Color::Black));
    // The capturer's own kingside right went too (rook left h1).
    assert!(!b.has_kingside_castle(Color::White));
    unmake_move(&mut b, mv, undo);
    assert!(b.has_kingside_castle(Color::Black));
    assert!(b.has_kingside_castle(Color::White));
}

#[test]
fn king_move_clears_both_rights() {
    let fen = "r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1";
    let mut b = Board::from_str(fen).unwrap();
    let mv = Move::new(sq("e1"), sq("e2"), QUIET_MOVE);
    let undo = make_move(&mut b, mv);
    assert_eq!(b.castling_rights & (CASTLE_WK | CASTLE_WQ), 0);
    assert_eq!(b.castling_rights & (CASTLE_BK | CASTLE_BQ), CASTLE_BK | CASTLE_BQ);
    unmake_move(&mut b, mv, undo);
    assert_eq!(b.castling_rights, CASTLE_WK | CASTLE_WQ | CASTLE_BK | CASTLE_BQ);
}

#[test]
fn double_push_sets_ep_only_when_capturable() {
    // No black pawn anywhere near e3: the ep square stays unset.
    let mut b = Board::from_str("4k3/8/8/8/8/8/4P3/4K3 w - - 0 1").unwrap();
    let mv = Move::new(sq("e2"), sq("e4"), DOUBLE_PAWN_PUSH);
    let undo = make_move(&mut b, mv);
    assert_eq!(b.en_passant, None, "no capturer, no ep square");
    unmake_move(&mut b, mv, undo);

    // Black pawn on d4: the double push must record e3.
    let mut b = Board::from_str("4k3/8/8/8/3p4/8/4P3/4K3 w - - 0 1").unwrap();
    let mv = Move::new(sq("e2"), sq("e4"), DOUBLE_PAWN_PUSH);
    let undo = make_move(&mut b, mv);
    assert_eq!(b.en_passant, Some(sq("e3")));
    unmake_move(&mut b, mv, undo);
    assert_eq!(b.en_passant, None);
}

#[test]
fn any_other_move_clears_ep() {
    let mut b = Board::from_str("4k3/8/8/3pP3/8/8/8/4K3 w - d6 0 1").unwrap();
    assert_eq!(b.en_passant, Some(sq("d6")));
    let mv = Move::new(sq("e1"), sq("d1"), QUIET_MOVE);
    let undo = make_move(&mut b, mv);
    assert_eq!(b.en_passant, None);
    unmake_move(&mut b, mv, undo);
    assert_eq!(b.en_passant, Some(sq("d6")));
}

/// Spec stress: a long random legal walk, then a full unwind, must restore
/// the start board byte for byte.
#[test]
fn make_unmake_thousand_ply_stress() {
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    let tables = load_magic_tables();

    for seed in [7u64, 42, 1234] {
        let mut b = Board::from_str(
            "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
        )
        .unwrap();
        let original = b.clone();
        let mut rng = StdRng::seed_from_u64(seed);

        let mut trail: Vec<(Move, outpost::moves::types::Undo)> = Vec::new();
        for _ in 0..1000 {
            let mut ms = Vec::with_capacity(64);
            let mut scratch = Vec::with_capacity(256);
            generate_legal(&mut b, &tables, &mut ms, &mut scratch);
            if ms.is_empty() {
                break;
            }
            let mv = ms[rng.random_range(0..ms.len())];
            let undo = make_move(&mut b, mv);
            trail.push((mv, undo));
        }

        while let Some((mv, undo)) = trail.pop() {
            unmake_move(&mut b, mv, undo);
        }

        assert_eq!(b, original, "seed {} failed to restore the board", seed);
        assert_eq!(b.zobrist, original.zobrist);
    }
}

use crate::board::castle_bits::*;
use crate::board::{Board, Color, EMPTY_SQ, Piece};
use crate::hash::zobrist::{ep_file_to_hash, xor_castling_rights_delta, zobrist_keys};
use crate::moves::magic::MagicTables;
use crate::moves::movegen::generate_pseudo_legal;
use crate::moves::pawn::pawn_attacks;
use crate::moves::square_control::{in_check, is_legal_castling};
use crate::moves::types::{Move, MoveBuffer, Undo};
use crate::square::Square;

/// Precomputed castling rook moves by king destination index.
#[inline(always)]
fn rook_castle_squares(king_to_idx: u8) -> Option<(Square, Square)> {
    match king_to_idx {
        6 => Some((Square::from_index(7), Square::from_index(5))), // White O-O
        2 => Some((Square::from_index(0), Square::from_index(3))), // White O-O-O
        62 => Some((Square::from_index(63), Square::from_index(61))), // Black O-O
        58 => Some((Square::from_index(56), Square::from_index(59))), // Black O-O-O
        _ => None,
    }
}

#[inline(always)]
fn rights_mask_to_clear_for_rook(color: Color, rook_sq: u8) -> u8 {
    match (color, rook_sq) {
        (Color::White, 0) => CASTLE_WQ,  // a1
        (Color::White, 7) => CASTLE_WK,  // h1
        (Color::Black, 56) => CASTLE_BQ, // a8
        (Color::Black, 63) => CASTLE_BK, // h8
        _ => 0,
    }
}

/// Helper: clear a piece bit and its mailbox entry at `idx`.
#[inline(always)]
fn remove_piece(board: &mut Board, color: Color, piece: Piece, idx: usize) {
    let new_bb = board.bb(color, piece) & !(1u64 << idx);
    board.set_bb(color, piece, new_bb);
}

/// Helper: set a piece bit and its mailbox entry at `idx`.
#[inline(always)]
fn place_piece(board: &mut Board, color: Color, piece: Piece, idx: usize) {
    let new_bb = board.bb(color, piece) | (1u64 << idx);
    board.set_bb(color, piece, new_bb);
}

/// Apply `mv` to the board, returning the record `unmake_move` needs to
/// reverse it. `mv` must be pseudo-legal for the side to move.
pub fn make_move(board: &mut Board, mv: Move) -> Undo {
    let color = board.side_to_move;
    let from_idx = mv.from().index() as usize;
    let to_idx = mv.to().index() as usize;

    let mover = board.piece_on_sq[from_idx];
    debug_assert_ne!(mover, EMPTY_SQ, "no piece to move on {}", mv.from());
    let piece = Piece::from_u8(mover & 0b111);

    // Snapshot everything unmake restores wholesale, before any mutation.
    let mut undo = Undo {
        captured: None,
        castling_rights: board.castling_rights,
        en_passant: board.en_passant,
        halfmove_clock: board.halfmove_clock,
        zobrist: board.zobrist,
    };

    // If an EP file contributes to the hash, XOR it out now (pre-move, pre-flip).
    if let Some(f) = ep_file_to_hash(board) {
        board.zobrist ^= zobrist_keys().ep_file[f as usize];
    }
    board.en_passant = None;

    // ---- Capture, including en passant (victim sits behind the target) ----
    if mv.is_en_passant() {
        let cap_sq = if color == Color::White {
            to_idx - 8
        } else {
            to_idx + 8
        };
        undo.captured = Some((color.opposite(), Piece::Pawn));
        remove_piece(board, color.opposite(), Piece::Pawn, cap_sq);
    } else {
        let occupant = board.piece_on_sq[to_idx];
        if occupant != EMPTY_SQ {
            let cap_color = Color::from_u8(occupant >> 3);
            let cap_piece = Piece::from_u8(occupant & 0b111);
            debug_assert!(mv.is_capture(), "capture flag missing on {}", mv);
            undo.captured = Some((cap_color, cap_piece));
            remove_piece(board, cap_color, cap_piece, to_idx);
        }
    }

    // ---- New en-passant square: only after a double push, and only if an
    // enemy pawn could actually take it ----
    if mv.is_double_pawn_push() {
        debug_assert!(piece == Piece::Pawn);
        let ep_idx = if color == Color::White {
            from_idx + 8
        } else {
            from_idx - 8
        };
        // The capture sources of the skipped square are exactly the squares
        // a pawn of the moving color would attack from it.
        let enemy_pawns = board.bb(color.opposite(), Piece::Pawn);
        if pawn_attacks(ep_idx as u8, color) & enemy_pawns != 0 {
            board.en_passant = Some(Square::from_index(ep_idx as u8));
        }
    }

    // ---- Castling rights: compute every bit this move clears ----
    let old_rights = board.castling_rights;
    let mut mask_to_clear: u8 = 0;

    // (i) King moved → both rights for that color
    if piece == Piece::King {
        mask_to_clear |= match color {
            Color::White => CASTLE_WK | CASTLE_WQ,
            Color::Black => CASTLE_BK | CASTLE_BQ,
        };
    }

    // (ii) Rook moved from a corner → that side's right
    if piece == Piece::Rook {
        mask_to_clear |= rights_mask_to_clear_for_rook(color, mv.from().index());
    }

    // (iii) Captured a rook on its original corner → the opponent's right
    if let Some((cap_color, cap_piece)) = undo.captured
        && cap_piece == Piece::Rook
        && !mv.is_en_passant()
    {
        mask_to_clear |= rights_mask_to_clear_for_rook(cap_color, mv.to().index());
    }

    // Apply the rights change once and update the hash via the delta
    let new_rights = old_rights & !mask_to_clear;
    if new_rights != old_rights {
        board.castling_rights = new_rights;
        xor_castling_rights_delta(&mut board.zobrist, zobrist_keys(), old_rights, new_rights);
    }

    // ---- Move the piece (promotions land as the promoted piece) ----
    remove_piece(board, color, piece, from_idx);
    if let Some(promo) = mv.promotion() {
        debug_assert!(piece == Piece::Pawn, "only pawns can promote");
        place_piece(board, color, promo, to_idx);
    } else {
        place_piece(board, color, piece, to_idx);
    }

    // ---- Move the rook if castling ----
    if mv.is_castling()
        && let Some((rook_from, rook_to)) = rook_castle_squares(to_idx as u8)
    {
        remove_piece(board, color, Piece::Rook, rook_from.index() as usize);
        place_piece(board, color, Piece::Rook, rook_to.index() as usize);
    }

    // ---- Clocks ----
    if undo.captured.is_some() || piece == Piece::Pawn {
        board.halfmove_clock = 0;
    } else {
        board.halfmove_clock = undo.halfmove_clock + 1;
    }
    if color == Color::Black {
        board.fullmove_number += 1;
    }

    // ---- Flip side to move ----
    board.side_to_move = color.opposite();
    board.zobrist ^= zobrist_keys().side_to_move;

    // The new EP square contributes only if the new mover can capture there.
    if let Some(f) = ep_file_to_hash(board) {
        board.zobrist ^= zobrist_keys().ep_file[f as usize];
    }

    // ---- King-square cache ----
    if piece == Piece::King {
        board.king_sq[color as usize] = mv.to();
    }

    // Pre-move key joins the repetition history.
    board.history.push(undo.zobrist);

    #[cfg(debug_assertions)]
    {
        debug_assert_valid_ep(board);
        board.assert_hash();
    }

    undo
}

/// Reverse the most recent `make_move(board, mv)`. Strictly LIFO: `undo`
/// must be the record that very call returned.
pub fn unmake_move(board: &mut Board, mv: Move, undo: Undo) {
    // The retracted mover is the side that is *not* to move now.
    let color = board.side_to_move.opposite();
    board.side_to_move = color;
    if color == Color::Black {
        board.fullmove_number -= 1;
    }

    let from_idx = mv.from().index() as usize;
    let to_idx = mv.to().index() as usize;

    // ---- Take the moved piece back (promotions revert to a pawn) ----
    if let Some(promo) = mv.promotion() {
        remove_piece(board, color, promo, to_idx);
        place_piece(board, color, Piece::Pawn, from_idx);
    } else {
        let piece = Piece::from_u8(board.piece_on_sq[to_idx] & 0b111);
        remove_piece(board, color, piece, to_idx);
        place_piece(board, color, piece, from_idx);
        if piece == Piece::King {
            board.king_sq[color as usize] = mv.from();
        }
    }

    // ---- Rook back, if this was a castle ----
    if mv.is_castling()
        && let Some((rook_from, rook_to)) = rook_castle_squares(to_idx as u8)
    {
        remove_piece(board, color, Piece::Rook, rook_to.index() as usize);
        place_piece(board, color, Piece::Rook, rook_from.index() as usize);
    }

    // ---- Restore the captured piece (en passant: behind the target) ----
    if let Some((cap_color, cap_piece)) = undo.captured {
        let cap_idx = if mv.is_en_passant() {
            if cap_color == Color::Black {
                to_idx - 8
            } else {
                to_idx + 8
            }
        } else {
            to_idx
        };
        place_piece(board, cap_color, cap_piece, cap_idx);
    }

    // ---- Scalar state comes back verbatim, the hash included ----
    board.castling_rights = undo.castling_rights;
    board.en_passant = undo.en_passant;
    board.halfmove_clock = undo.halfmove_clock;
    board.zobrist = undo.zobrist;

    board.history.pop();

    #[cfg(debug_assertions)]
    {
        debug_assert_valid_ep(board);
        board.assert_hash();
    }
}

/// Legal move generation: pseudo-legal, then the brute filter (make each
/// move, reject it if the own king is attacked, unmake). Castling gets its
/// path-attack test up front.
pub fn generate_legal(
    board: &mut Board,
    tables: &MagicTables,
    moves: &mut impl MoveBuffer,
    scratch: &mut impl MoveBuffer,
) {
    scratch.clear();
    generate_pseudo_legal(board, tables, scratch);
    moves.clear();

    for i in 0..scratch.len() {
        let mv = scratch[i];
        if mv.is_castling() && !is_legal_castling(board, mv, tables) {
            continue;
        }
        let mover = board.side_to_move;
        let undo = make_move(board, mv);
        let illegal = in_check(board, mover, tables);
        unmake_move(board, mv, undo);
        if !illegal {
            moves.push(mv);
        }
    }
}

/// Check if a pseudo-legal move is legal (doesn't leave own king in check).
/// For castling moves this also checks that the king doesn't pass through check.
#[inline]
pub fn is_legal_move(board: &mut Board, mv: Move, tables: &MagicTables) -> bool {
    if mv.is_castling() {
        return is_legal_castling(board, mv, tables);
    }
    let mover = board.side_to_move;
    let undo = make_move(board, mv);
    let illegal = in_check(board, mover, tables);
    unmake_move(board, mv, undo);
    !illegal
}

/// Generate only legal captures and promotions.
pub fn generate_captures(
    board: &mut Board,
    tables: &MagicTables,
    moves: &mut impl MoveBuffer,
    scratch: &mut impl MoveBuffer,
) {
    scratch.clear();
    generate_pseudo_legal(board, tables, scratch);

    moves.clear();
    for i in 0..scratch.len() {
        let mv = scratch[i];
        if !mv.is_capture() && !mv.is_promotion() {
            continue;
        }

        let mover = board.side_to_move;
        let undo = make_move(board, mv);
        let legal = !in_check(board, mover, tables);
        unmake_move(board, mv, undo);

        if legal {
            moves.push(mv);
        }
    }
}

#[cfg(debug_assertions)]
#[inline]
pub(crate) fn debug_assert_valid_ep(board: &Board) {
    if let Some(ep) = board.en_passant {
        let ep_rank = ep.rank();
        match board.side_to_move {
            Color::White => {
                // Black just double-pushed → EP sits on rank 6 (0-based 5)
                debug_assert!(
                    ep_rank == 5,
                    "EP must be on rank 6 when White is to move, got rank {} at {}",
                    ep_rank,
                    ep
                );
            }
            Color::Black => {
                // White just double-pushed → EP sits on rank 3 (0-based 2)
                debug_assert!(
                    ep_rank == 2,
                    "EP must be on rank 3 when Black is to move, got rank {} at {}",
                    ep_rank,
                    ep
                );
            }
        }
    }
}

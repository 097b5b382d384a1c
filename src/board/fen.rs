//! Forsyth–Edwards notation parse and emit.

use super::fen_tables::{CHAR_TO_PC, piece_char};
use super::{Board, CASTLE_BK, CASTLE_BQ, CASTLE_WK, CASTLE_WQ, Color, Piece};
use crate::square::Square;
use std::error::Error;
use std::fmt;
use std::str::FromStr;

/// A FEN rejection, naming the field that failed. The board is left
/// untouched when any of these is returned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FenError {
    /// Not 4–6 whitespace-separated fields.
    FieldCount(usize),
    /// Placement field does not have 8 '/'-separated ranks.
    RankCount(usize),
    /// Unknown glyph in the placement field.
    BadPiece(char),
    /// A rank describing more or fewer than 8 files. 1-based rank number.
    BadRankLength(u8),
    /// A side has no king, or more than one.
    KingCount(Color, u32),
    /// Active-color field is not `w` or `b`.
    BadSideToMove(String),
    /// Castling field is not `-` or a subset of `KQkq`.
    BadCastling(String),
    /// A castling right whose king or rook is not on its home square.
    ImpossibleCastling(char),
    /// En-passant field is neither `-` nor a parseable square.
    BadEnPassant(String),
    /// En-passant square on the wrong rank, occupied, or with no
    /// double-pushed pawn in front of it.
    ImpossibleEnPassant(Square),
    /// Halfmove clock is not a non-negative integer.
    BadHalfmoveClock(String),
    /// Fullmove number is not a positive integer.
    BadFullmoveNumber(String),
}

impl fmt::Display for FenError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FenError::FieldCount(n) => write!(f, "expected 4 to 6 FEN fields, got {}", n),
            FenError::RankCount(n) => write!(f, "expected 8 ranks in placement, got {}", n),
            FenError::BadPiece(c) => write!(f, "unknown piece glyph {:?}", c),
            FenError::BadRankLength(r) => write!(f, "rank {} does not describe 8 files", r),
            FenError::KingCount(color, n) => write!(f, "{:?} has {} kings", color, n),
            FenError::BadSideToMove(s) => write!(f, "bad active color {:?}", s),
            FenError::BadCastling(s) => write!(f, "bad castling field {:?}", s),
            FenError::ImpossibleCastling(c) => {
                write!(f, "castling right {:?} without king/rook in place", c)
            }
            FenError::BadEnPassant(s) => write!(f, "bad en-passant field {:?}", s),
            FenError::ImpossibleEnPassant(sq) => {
                write!(f, "en-passant square {} impossible in this position", sq)
            }
            FenError::BadHalfmoveClock(s) => write!(f, "bad halfmove clock {:?}", s),
            FenError::BadFullmoveNumber(s) => write!(f, "bad fullmove number {:?}", s),
        }
    }
}

impl Error for FenError {}

impl Board {
    /// Replace this board's contents with the position described by `fen`.
    /// On error the board is left exactly as it was.
    pub fn set_fen(&mut self, fen: &str) -> Result<(), FenError> {
        let fields: Vec<&str> = fen.split_whitespace().collect();
        if !(4..=6).contains(&fields.len()) {
            return Err(FenError::FieldCount(fields.len()));
        }

        // ---- Field 1: piece placement, ranks 8 down to 1 ----
        let ranks: Vec<&str> = fields[0].split('/').collect();
        if ranks.len() != 8 {
            return Err(FenError::RankCount(ranks.len()));
        }

        let mut masks = [[0u64; 6]; 2];
        for (i, rank_str) in ranks.iter().enumerate() {
            let rank = 7 - i; // first chunk is rank 8
            let mut file = 0usize;
            for c in rank_str.chars() {
                if let Some(skip) = c.to_digit(10) {
                    if skip == 0 || skip > 8 {
                        return Err(FenError::BadPiece(c));
                    }
                    file += skip as usize;
                } else {
                    let (piece, color) = if c.is_ascii() {
                        CHAR_TO_PC[c as usize].ok_or(FenError::BadPiece(c))?
                    } else {
                        return Err(FenError::BadPiece(c));
                    };
                    if file > 7 {
                        return Err(FenError::BadRankLength(rank as u8 + 1));
                    }
                    masks[color as usize][piece as usize] |= 1u64 << (rank * 8 + file);
                    file += 1;
                }
            }
            if file != 8 {
                return Err(FenError::BadRankLength(rank as u8 + 1));
            }
        }

        for color in [Color::White, Color::Black] {
            let kings = masks[color as usize][Piece::King as usize].count_ones();
            if kings != 1 {
                return Err(FenError::KingCount(color, kings));
            }
        }

        // ---- Field 2: active color ----
        let side_to_move = match fields[1] {
            "w" => Color::White,
            "b" => Color::Black,
            other => return Err(FenError::BadSideToMove(other.to_string())),
        };

        // ---- Field 3: castling rights ----
        let mut castling_rights = 0u8;
        if fields[2] != "-" {
            if fields[2].is_empty() {
                return Err(FenError::BadCastling(fields[2].to_string()));
            }
            for c in fields[2].chars() {
                let bit = match c {
                    'K' => CASTLE_WK,
                    'Q' => CASTLE_WQ,
                    'k' => CASTLE_BK,
                    'q' => CASTLE_BQ,
                    _ => return Err(FenError::BadCastling(fields[2].to_string())),
                };
                castling_rights |= bit;

                // A right is only meaningful with king and rook at home.
                let (king_home, rook_home, color) = match c {
                    'K' => (4u8, 7u8, Color::White),
                    'Q' => (4, 0, Color::White),
                    'k' => (60, 63, Color::Black),
                    _ => (60, 56, Color::Black),
                };
                let king_ok =
                    masks[color as usize][Piece::King as usize] & (1u64 << king_home) != 0;
                let rook_ok =
                    masks[color as usize][Piece::Rook as usize] & (1u64 << rook_home) != 0;
                if !king_ok || !rook_ok {
                    return Err(FenError::ImpossibleCastling(c));
                }
            }
        }

        // ---- Field 4: en-passant square ----
        let en_passant = if fields[3] == "-" {
            None
        } else {
            let sq = Square::from_str(fields[3])
                .map_err(|_| FenError::BadEnPassant(fields[3].to_string()))?;
            // The target must be empty, sit on the push-through rank for
            // the side that just moved, and have the double-pushed pawn
            // right in front of it.
            let all: u64 = masks
                .iter()
                .flat_map(|side| side.iter())
                .fold(0, |acc, bb| acc | bb);
            let (want_rank, pawn_color) = match side_to_move {
                Color::White => (5u8, Color::Black),
                Color::Black => (2u8, Color::White),
            };
            if sq.rank() != want_rank || all & sq.bb() != 0 {
                return Err(FenError::ImpossibleEnPassant(sq));
            }
            let pawn_sq = match side_to_move {
                Color::White => sq.index() - 8,
                Color::Black => sq.index() + 8,
            };
            if masks[pawn_color as usize][Piece::Pawn as usize] & (1u64 << pawn_sq) == 0 {
                return Err(FenError::ImpossibleEnPassant(sq));
            }
            Some(sq)
        };

        // ---- Fields 5 & 6: clocks, defaulted when absent ----
        let halfmove_clock = match fields.get(4) {
            Some(s) => s
                .parse::<u32>()
                .map_err(|_| FenError::BadHalfmoveClock(s.to_string()))?,
            None => 0,
        };
        let fullmove_number = match fields.get(5) {
            Some(s) => match s.parse::<u32>() {
                Ok(n) if n >= 1 => n,
                _ => return Err(FenError::BadFullmoveNumber(s.to_string())),
            },
            None => 1,
        };

        // ---- All fields verified; rebuild in place ----
        *self = Board::new_empty();
        for color in [Color::White, Color::Black] {
            for piece in [
                Piece::Pawn,
                Piece::Knight,
                Piece::Bishop,
                Piece::Rook,
                Piece::Queen,
                Piece::King,
            ] {
                self.set_bb(color, piece, masks[color as usize][piece as usize]);
            }
        }
        self.side_to_move = side_to_move;
        self.castling_rights = castling_rights;
        self.en_passant = en_passant;
        self.halfmove_clock = halfmove_clock;
        self.fullmove_number = fullmove_number;
        self.sync_king_squares();
        self.refresh_zobrist();
        self.history.clear();

        #[cfg(debug_assertions)]
        self.assert_invariants();

        Ok(())
    }

    /// Emit the position as a six-field FEN string.
    pub fn to_fen(&self) -> String {
        let mut fen = String::with_capacity(90);

        for rank in (0..8u8).rev() {
            let mut empty_run = 0u8;
            for file in 0..8u8 {
                let sq = Square::from_file_rank(file, rank);
                match self.piece_at(sq) {
                    Some((color, piece)) => {
                        if empty_run > 0 {
                            fen.push((b'0' + empty_run) as char);
                            empty_run = 0;
                        }
                        fen.push(piece_char(color, piece));
                    }
                    None => empty_run += 1,
                }
            }
            if empty_run > 0 {
                fen.push((b'0' + empty_run) as char);
            }
            if rank > 0 {
                fen.push('/');
            }
        }

        fen.push(' ');
        fen.push(match self.side_to_move {
            Color::White => 'w',
            Color::Black => 'b',
        });

        fen.push(' ');
        if self.castling_rights == 0 {
            fen.push('-');
        } else {
            if self.castling_rights & CASTLE_WK != 0 {
                fen.push('K');
            }
            if self.castling_rights & CASTLE_WQ != 0 {
                fen.push('Q');
            }
            if self.castling_rights & CASTLE_BK != 0 {
                fen.push('k');
            }
            if self.castling_rights & CASTLE_BQ != 0 {
                fen.push('q');
            }
        }

        fen.push(' ');
        match self.en_passant {
            Some(sq) => fen.push_str(&sq.to_string()),
            None => fen.push('-'),
        }

        fen.push_str(&format!(" {} {}", self.halfmove_clock, self.fullmove_number));
        fen
    }
}

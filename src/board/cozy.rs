use cozy_chess::{Board as CozyBoard, Color, File, Move, Piece, Square};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::ParseError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CastleSide {
    King,
    Queen,
}

/// How castling moves are spelled in UCI output.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CastlingStyle {
    /// King to its destination square, e.g. `e1g1`.
    #[default]
    Standard,
    /// King onto its own rook, e.g. `e1h1` (Chess960 style).
    KingTakesRook,
}

impl FromStr for CastlingStyle {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, String> {
        match s.trim() {
            "standard" => Ok(CastlingStyle::Standard),
            "king-takes-rook" => Ok(CastlingStyle::KingTakesRook),
            other => Err(format!("unknown castling style `{other}` (standard | king-takes-rook)")),
        }
    }
}

/// A legal move with the facts needed to match it against written notation.
/// For castling, `to` is the king's destination square, not the rook square.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LegalMove {
    pub mv: Move,
    pub piece: Piece,
    pub from: Square,
    pub to: Square,
    pub promotion: Option<Piece>,
    pub capture: bool,
    pub castle: Option<CastleSide>,
}

impl LegalMove {
    pub fn uci(&self, style: CastlingStyle) -> String {
        match (self.castle, style) {
            (Some(_), CastlingStyle::Standard) => format!("{}{}", self.from, self.to),
            _ => format!("{}", self.mv),
        }
    }
}

#[derive(Clone, Debug)]
pub struct Position {
    board: CozyBoard,
}

impl Position {
    pub fn startpos() -> Self {
        Self { board: CozyBoard::default() }
    }

    /// Accepts standard castling rights as well as Shredder-style file letters.
    pub fn from_fen(fen: &str) -> Result<Self, ParseError> {
        CozyBoard::from_fen(fen, false)
            .or_else(|_| CozyBoard::from_fen(fen, true))
            .map(|b| Self { board: b })
            .map_err(|e| ParseError::InvalidFen { fen: fen.to_string(), reason: format!("{e:?}") })
    }

    pub fn fen(&self) -> String { format!("{}", self.board) }

    pub fn legal_moves(&self) -> Vec<LegalMove> {
        let stm = self.board.side_to_move();
        let ours = self.board.colors(stm);
        let theirs = self.board.occupied() ^ ours;
        let mut out = Vec::with_capacity(64);
        self.board.generate_moves(|moves| {
            let piece = moves.piece;
            for mv in moves {
                let castle = if piece == Piece::King && ours.has(mv.to) {
                    Some(if (mv.to.file() as usize) > (mv.from.file() as usize) { CastleSide::King } else { CastleSide::Queen })
                } else {
                    None
                };
                let to = match castle {
                    Some(CastleSide::King) => Square::new(File::G, mv.from.rank()),
                    Some(CastleSide::Queen) => Square::new(File::C, mv.from.rank()),
                    None => mv.to,
                };
                let en_passant = piece == Piece::Pawn && mv.from.file() != mv.to.file();
                let capture = castle.is_none() && (theirs.has(mv.to) || en_passant);
                out.push(LegalMove { mv, piece, from: mv.from, to, promotion: mv.promotion, capture, castle });
            }
            false
        });
        out
    }

    /// Successor position; `self` is left untouched.
    pub fn play(&self, mv: &LegalMove) -> Position {
        let mut board = self.board.clone();
        board.play(mv.mv);
        Self { board }
    }

    /// Apply a move given in UCI text. Castling is accepted in either spelling.
    pub fn make_move_uci(&mut self, mv_uci: &str) -> Result<(), String> {
        let found = self.legal_moves().into_iter().find(|m| {
            m.uci(CastlingStyle::Standard) == mv_uci || m.uci(CastlingStyle::KingTakesRook) == mv_uci
        });
        if let Some(m) = found { self.board.play(m.mv); Ok(()) } else { Err(format!("Illegal move: {}", mv_uci)) }
    }

    pub fn legal_moves_count(&self) -> usize {
        let mut ct = 0usize;
        self.board.generate_moves(|moves| { ct += moves.len(); false });
        ct
    }

    pub fn side_to_move(&self) -> Color { self.board.side_to_move() }

    pub fn in_check(&self) -> bool { !self.board.checkers().is_empty() }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn startpos_has_twenty_moves() {
        let pos = Position::startpos();
        assert_eq!(pos.legal_moves().len(), 20);
        assert_eq!(pos.legal_moves_count(), 20);
        assert!(pos.legal_moves().iter().all(|m| !m.capture && m.castle.is_none()));
        assert!(!pos.in_check());
    }

    #[test]
    fn check_is_seen() {
        let pos = Position::from_fen("4k3/8/8/8/8/8/8/4K2r w - - 0 1").unwrap();
        assert!(pos.in_check());
        assert!(pos.legal_moves().iter().all(|m| m.piece == Piece::King));
    }

    #[test]
    fn castling_spelled_both_ways() {
        let pos = Position::from_fen("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1").unwrap();
        let castles: Vec<LegalMove> = pos.legal_moves().into_iter().filter(|m| m.castle.is_some()).collect();
        assert_eq!(castles.len(), 2);
        let mut standard: Vec<String> = castles.iter().map(|m| m.uci(CastlingStyle::Standard)).collect();
        standard.sort();
        assert_eq!(standard, vec!["e1c1", "e1g1"]);
        let mut raw: Vec<String> = castles.iter().map(|m| m.uci(CastlingStyle::KingTakesRook)).collect();
        raw.sort();
        assert_eq!(raw, vec!["e1a1", "e1h1"]);
    }

    #[test]
    fn play_leaves_original_untouched() {
        let pos = Position::startpos();
        let before = pos.fen();
        let mv = pos.legal_moves().into_iter().find(|m| m.uci(CastlingStyle::Standard) == "e2e4").unwrap();
        let next = pos.play(&mv);
        assert_eq!(pos.fen(), before);
        assert_ne!(next.fen(), before);
        assert_eq!(next.side_to_move(), Color::Black);
    }

    #[test]
    fn bad_fen_is_reported() {
        let err = Position::from_fen("not a fen").unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::InvalidFen);
    }
}

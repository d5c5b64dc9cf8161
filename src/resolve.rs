use cozy_chess::{File, Piece, Rank, Square};
use std::str::FromStr;
use thiserror::Error;

use crate::board::{CastleSide, LegalMove, Position};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum MoveError {
    #[error("unreadable move notation")]
    BadNotation,
    #[error("no legal move matches")]
    NoMatch,
    #[error("{0} legal moves match")]
    Ambiguous(usize),
}

/// Standard algebraic notation, reduced to what is needed to pick a legal move.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum San {
    Normal {
        piece: Piece,
        file: Option<File>,
        rank: Option<Rank>,
        capture: bool,
        to: Square,
        promotion: Option<Piece>,
    },
    Castle(CastleSide),
}

fn piece_letter(c: char) -> Option<Piece> {
    match c {
        'N' => Some(Piece::Knight),
        'B' => Some(Piece::Bishop),
        'R' => Some(Piece::Rook),
        'Q' => Some(Piece::Queen),
        'K' => Some(Piece::King),
        _ => None,
    }
}

fn file_letter(c: char) -> Option<File> {
    matches!(c, 'a'..='h').then(|| File::ALL[c as usize - 'a' as usize])
}

fn rank_digit(c: char) -> Option<Rank> {
    matches!(c, '1'..='8').then(|| Rank::ALL[c as usize - '1' as usize])
}

impl FromStr for San {
    type Err = MoveError;
    fn from_str(text: &str) -> Result<Self, MoveError> {
        let body = text.trim_end_matches(|c: char| matches!(c, '+' | '#' | '!' | '?'));
        match body {
            "O-O" | "0-0" => return Ok(San::Castle(CastleSide::King)),
            "O-O-O" | "0-0-0" => return Ok(San::Castle(CastleSide::Queen)),
            _ => {}
        }

        let mut chars: Vec<char> = body.chars().collect();
        let mut promotion = None;
        if let Some(p) = chars.last().copied().and_then(piece_letter) {
            if p == Piece::King { return Err(MoveError::BadNotation); }
            promotion = Some(p);
            chars.pop();
            if chars.last() == Some(&'=') { chars.pop(); }
        }

        let rank = chars.pop().and_then(rank_digit).ok_or(MoveError::BadNotation)?;
        let file = chars.pop().and_then(file_letter).ok_or(MoveError::BadNotation)?;
        let to = Square::new(file, rank);
        let capture = chars.last() == Some(&'x');
        if capture { chars.pop(); }

        let mut rest = chars.into_iter().peekable();
        let piece = match rest.peek().copied().and_then(piece_letter) {
            Some(p) => { rest.next(); p }
            None => Piece::Pawn,
        };
        let from_file = rest.next_if(|&c| file_letter(c).is_some()).and_then(file_letter);
        let from_rank = rest.next_if(|&c| rank_digit(c).is_some()).and_then(rank_digit);
        if rest.next().is_some() { return Err(MoveError::BadNotation); }
        if promotion.is_some() && piece != Piece::Pawn { return Err(MoveError::BadNotation); }

        Ok(San::Normal { piece, file: from_file, rank: from_rank, capture, to, promotion })
    }
}

impl San {
    pub fn matches(&self, mv: &LegalMove) -> bool {
        match *self {
            San::Castle(side) => mv.castle == Some(side),
            San::Normal { piece, file, rank, capture, to, promotion } => {
                mv.castle.is_none()
                    && mv.piece == piece
                    && mv.to == to
                    && mv.promotion == promotion
                    && mv.capture == capture
                    && file.map_or(true, |f| mv.from.file() == f)
                    && rank.map_or(true, |r| mv.from.rank() == r)
            }
        }
    }
}

/// Pick the single legal move the notation names and return it with the successor position.
pub fn resolve(position: &Position, text: &str) -> Result<(LegalMove, Position), MoveError> {
    let san: San = text.parse()?;
    let mut candidates = position.legal_moves().into_iter().filter(|mv| san.matches(mv));
    let found = candidates.next().ok_or(MoveError::NoMatch)?;
    let others = candidates.count();
    if others > 0 { return Err(MoveError::Ambiguous(others + 1)); }
    Ok((found, position.play(&found)))
}

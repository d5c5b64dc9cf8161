use thiserror::Error;

use crate::annotate::stats::StatisticError;
use crate::resolve::MoveError;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    MalformedPly,
    BadStatistic,
    IllegalMove,
    InvalidFen,
}

/// Fatal failures for one game record. No commands are emitted once one of these is raised.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("malformed ply group{}: {reason}", at_move(.number))]
    MalformedPly { number: Option<u32>, reason: String },

    #[error("bad statistic at ply {ply} ({san}): {source}")]
    BadStatistic {
        ply: usize,
        san: String,
        #[source]
        source: StatisticError,
    },

    #[error("illegal move `{san}` at ply {ply} in position {fen}: {cause}")]
    IllegalMove {
        ply: usize,
        san: String,
        fen: String,
        cause: MoveError,
    },

    #[error("invalid FEN `{fen}`: {reason}")]
    InvalidFen { fen: String, reason: String },
}

fn at_move(number: &Option<u32>) -> String {
    number.map(|n| format!(" at move {n}")).unwrap_or_default()
}

impl ParseError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ParseError::MalformedPly { .. } => ErrorKind::MalformedPly,
            ParseError::BadStatistic { .. } => ErrorKind::BadStatistic,
            ParseError::IllegalMove { .. } => ErrorKind::IllegalMove,
            ParseError::InvalidFen { .. } => ErrorKind::InvalidFen,
        }
    }

    /// Ply index the error points at, when it is tied to one.
    pub fn ply(&self) -> Option<usize> {
        match self {
            ParseError::BadStatistic { ply, .. } | ParseError::IllegalMove { ply, .. } => Some(*ply),
            _ => None,
        }
    }

    pub(crate) fn malformed(number: Option<u32>, reason: impl Into<String>) -> Self {
        ParseError::MalformedPly { number, reason: reason.into() }
    }
}

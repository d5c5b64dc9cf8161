use serde::Serialize;

use crate::annotate::{extract, Depth, Dialect, RawPly, Score, Statistic};
use crate::board::Position;
use crate::config::ReplayConfig;
use crate::error::ParseError;
use crate::resolve::resolve;

/// One half-move with its resolved move and whatever statistics its annotation carried.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct AnnotatedPly {
    pub index: usize,
    pub number: u32,
    pub san: String,
    pub uci: String,
    pub dialect: Dialect,
    pub stats: Option<Statistic>,
    pub trailer: Option<String>,
}

impl AnnotatedPly {
    pub fn nodes(&self) -> Option<u64> { self.stats.as_ref().and_then(|s| s.nodes) }
    pub fn score(&self) -> Option<Score> { self.stats.as_ref().map(|s| s.score) }
    pub fn depth(&self) -> Option<Depth> { self.stats.as_ref().map(|s| s.depth) }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Game {
    pub start_fen: String,
    pub final_fen: String,
    pub plies: Vec<AnnotatedPly>,
}

impl Game {
    pub fn len(&self) -> usize { self.plies.len() }
    pub fn is_empty(&self) -> bool { self.plies.is_empty() }

    pub fn moves(&self) -> Vec<&str> { self.plies.iter().map(|p| p.uci.as_str()).collect() }

    /// `(ply index, node count)` for every ply that recorded one.
    pub fn node_budgets(&self) -> Vec<(usize, u64)> {
        self.plies.iter().filter_map(|p| p.nodes().map(|n| (p.index, n))).collect()
    }
}

/// Replay the raw tokens from `start`, pairing each resolved move with its statistics.
///
/// Every token becomes exactly one ply, in order; a token whose annotation has no usable
/// statistics still gets its slot with `stats: None`.
pub fn align(start_fen: &str, start: Position, raw: Vec<RawPly>, config: &ReplayConfig) -> Result<Game, ParseError> {
    let mut position = start;
    let mut plies = Vec::with_capacity(raw.len());
    for (index, token) in raw.into_iter().enumerate() {
        let annotation = extract(token.annotation.as_deref(), &config.node_suffix)
            .map_err(|source| ParseError::BadStatistic { ply: index, san: token.san.clone(), source })?;
        let (mv, next) = resolve(&position, &token.san).map_err(|cause| ParseError::IllegalMove {
            ply: index,
            san: token.san.clone(),
            fen: position.fen(),
            cause,
        })?;
        let uci = mv.uci(config.castling);
        log::trace!("ply {index}: {} -> {uci} ({:?})", token.san, annotation.dialect);
        let marked = token.san.contains(&['+', '#'][..]);
        if marked != next.in_check() {
            log::debug!("ply {index}: `{}` check marker disagrees with the board", token.san);
        }
        plies.push(AnnotatedPly {
            index,
            number: token.number,
            san: token.san,
            uci,
            dialect: annotation.dialect,
            stats: annotation.stats,
            trailer: annotation.trailer,
        });
        position = next;
    }
    if !plies.is_empty() && position.legal_moves_count() == 0 {
        let how = if position.in_check() { "checkmate" } else { "stalemate" };
        log::debug!("game ends in {how} after {} plies", plies.len());
    }
    Ok(Game { start_fen: start_fen.to_string(), final_fen: position.fen(), plies })
}

use serde::Serialize;
use std::fmt;
use thiserror::Error;

use crate::board::Position;
use crate::replay::Game;

fn write_position(f: &mut fmt::Formatter, fen: &str, moves: &[String]) -> fmt::Result {
    write!(f, "position fen {fen}")?;
    if !moves.is_empty() { write!(f, " moves {}", moves.join(" "))?; }
    Ok(())
}

/// Replays the whole game from the starting position.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ReplayCommand {
    pub fen: String,
    pub moves: Vec<String>,
}

/// Replays up to and including `ply`, then searches the node count that ply used.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct BoundedSearchCommand {
    pub fen: String,
    pub moves: Vec<String>,
    pub ply: usize,
    pub nodes: u64,
}

impl fmt::Display for ReplayCommand {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result { write_position(f, &self.fen, &self.moves) }
}

impl fmt::Display for BoundedSearchCommand {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write_position(f, &self.fen, &self.moves)?;
        write!(f, "\ngo nodes {}", self.nodes)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CommandSet {
    pub replay: ReplayCommand,
    pub searches: Vec<BoundedSearchCommand>,
}

impl CommandSet {
    /// Every search block, each terminated by a newline.
    pub fn render_search_script(&self) -> String {
        self.searches.iter().map(|s| format!("{s}\n")).collect()
    }

    pub fn render(&self, replay: bool, searches: bool) -> String {
        let mut out = String::new();
        if replay { out.push_str(&format!("{}\n", self.replay)); }
        if searches { out.push_str(&self.render_search_script()); }
        out
    }
}

/// Plies without a node count, or with a count of zero, get no search command.
pub fn emit(game: &Game) -> CommandSet {
    let moves: Vec<String> = game.plies.iter().map(|p| p.uci.clone()).collect();
    let searches = game
        .node_budgets()
        .into_iter()
        .filter(|&(ply, nodes)| {
            if nodes == 0 { log::debug!("ply {ply}: zero node budget, no search emitted"); }
            nodes > 0
        })
        .map(|(ply, nodes)| BoundedSearchCommand {
            fen: game.start_fen.clone(),
            moves: moves[..=ply].to_vec(),
            ply,
            nodes,
        })
        .collect();
    CommandSet { replay: ReplayCommand { fen: game.start_fen.clone(), moves }, searches }
}

/// The subset of engine input the emitted scripts use.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum UciCommand {
    Position { fen: Option<String>, moves: Vec<String> },
    GoNodes(u64),
}

impl UciCommand {
    pub fn parse(line: &str) -> Option<UciCommand> {
        let line = line.trim();
        if let Some(args) = line.strip_prefix("position ") {
            // Supports: 'position startpos [moves ...]' and 'position fen <fen> [moves ...]'
            let mut tokens = args.split_whitespace();
            let fen = match tokens.next()? {
                "startpos" => None,
                "fen" => {
                    // FEN is 6 fields; collect them
                    let fen_fields: Vec<&str> = tokens.by_ref().take(6).collect();
                    if fen_fields.len() != 6 { return None; }
                    Some(fen_fields.join(" "))
                }
                _ => return None,
            };
            let moves = match tokens.next() {
                Some("moves") => tokens.map(|s| s.to_string()).collect(),
                Some(_) => return None,
                None => Vec::new(),
            };
            return Some(UciCommand::Position { fen, moves });
        }
        if let Some(args) = line.strip_prefix("go ") {
            let mut tokens = args.split_whitespace();
            while let Some(tok) = tokens.next() {
                if tok == "nodes" { return tokens.next().and_then(|s| s.parse().ok()).map(UciCommand::GoNodes); }
            }
        }
        None
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum VerifyError {
    #[error("line {line}: unrecognized command `{text}`")]
    BadLine { line: usize, text: String },
    #[error("line {line}: invalid FEN `{fen}`")]
    InvalidFen { line: usize, fen: String },
    #[error("line {line}: illegal move `{mv}` after {played} moves")]
    IllegalMove { line: usize, mv: String, played: usize },
    #[error("line {line}: `go` without a preceding position")]
    GoWithoutPosition { line: usize },
}

/// Replay every `position` line of a script on the board; returns how many were checked.
pub fn verify_script(script: &str) -> Result<usize, VerifyError> {
    let mut positions = 0usize;
    let mut have_position = false;
    for (i, text) in script.lines().enumerate() {
        let line = i + 1;
        if text.trim().is_empty() { continue; }
        match UciCommand::parse(text) {
            Some(UciCommand::Position { fen, moves }) => {
                let mut pos = match fen {
                    Some(fen) => Position::from_fen(&fen).map_err(|_| VerifyError::InvalidFen { line, fen })?,
                    None => Position::startpos(),
                };
                for (played, mv) in moves.iter().enumerate() {
                    pos.make_move_uci(mv).map_err(|_| VerifyError::IllegalMove { line, mv: mv.clone(), played })?;
                }
                positions += 1;
                have_position = true;
            }
            Some(UciCommand::GoNodes(_)) => {
                if !have_position { return Err(VerifyError::GoWithoutPosition { line }); }
            }
            None => return Err(VerifyError::BadLine { line, text: text.to_string() }),
        }
    }
    Ok(positions)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_position_and_go() {
        assert_eq!(
            UciCommand::parse("position startpos moves e2e4 e7e5"),
            Some(UciCommand::Position { fen: None, moves: vec!["e2e4".into(), "e7e5".into()] })
        );
        assert_eq!(
            UciCommand::parse("position fen 8/8/8/8/8/8/k7/4K3 w - - 0 1"),
            Some(UciCommand::Position { fen: Some("8/8/8/8/8/8/k7/4K3 w - - 0 1".into()), moves: vec![] })
        );
        assert_eq!(UciCommand::parse("go nodes 520610"), Some(UciCommand::GoNodes(520610)));
        assert_eq!(UciCommand::parse("go depth 5"), None);
        assert_eq!(UciCommand::parse("position fen 8/8 w"), None);
    }

    #[test]
    fn verify_reports_illegal_lines() {
        assert_eq!(verify_script("position startpos moves e2e4 e7e5\ngo nodes 10\n"), Ok(1));
        assert_eq!(
            verify_script("position startpos moves e2e4 e2e4\n"),
            Err(VerifyError::IllegalMove { line: 1, mv: "e2e4".into(), played: 1 })
        );
        assert_eq!(verify_script("go nodes 5\n"), Err(VerifyError::GoWithoutPosition { line: 1 }));
        assert!(matches!(verify_script("isready\n"), Err(VerifyError::BadLine { line: 1, .. })));
    }
}

// Rebuild UCI replay and fixed-node search commands from engine-annotated games
pub mod annotate;
pub mod board;
pub mod config;
pub mod error;
pub mod record;
pub mod replay;
pub mod resolve;
pub mod uci;

pub use config::ReplayConfig;
pub use error::{ErrorKind, ParseError};
pub use replay::{AnnotatedPly, Game};
pub use uci::{BoundedSearchCommand, CommandSet, ReplayCommand};

use board::Position;

/// Parse `movetext` against the position `fen` and replay every ply.
pub fn build_game(fen: &str, movetext: &str, config: &ReplayConfig) -> Result<Game, ParseError> {
    let fen = fen.split_whitespace().collect::<Vec<_>>().join(" ");
    let start = Position::from_fen(&fen)?;
    let raw = annotate::tokenize(movetext)?;
    replay::align(&fen, start, raw, config)
}

/// Full pipeline: move text in, replay and bounded-search commands out.
pub fn reproduce(fen: &str, movetext: &str, config: &ReplayConfig) -> Result<CommandSet, ParseError> {
    build_game(fen, movetext, config).map(|game| uci::emit(&game))
}

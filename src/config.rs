use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::annotate::SuffixPolicy;
use crate::board::CastlingStyle;

pub const ENV_NODE_SUFFIX: &str = "FENMAKER_NODE_SUFFIX";
pub const ENV_CASTLING: &str = "FENMAKER_CASTLING";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReplayConfig {
    /// Trailing unit marker handling on node counts.
    pub node_suffix: SuffixPolicy,
    pub castling: CastlingStyle,
    pub emit_replay: bool,
    pub emit_searches: bool,
    /// Re-run emitted commands through the board before printing them.
    pub verify: bool,
}

impl Default for ReplayConfig {
    fn default() -> Self {
        Self {
            node_suffix: SuffixPolicy::AnyOneNonDigit,
            castling: CastlingStyle::Standard,
            emit_replay: true,
            emit_searches: true,
            verify: false,
        }
    }
}

impl ReplayConfig {
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).with_context(|| format!("reading config {}", path.display()))?;
        serde_json::from_str(&text).with_context(|| format!("parsing config {}", path.display()))
    }

    /// Overlay `FENMAKER_*` environment variables.
    pub fn apply_env(&mut self) -> Result<()> {
        self.apply_vars(|name| std::env::var(name).ok())
    }

    fn apply_vars(&mut self, var: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(v) = var(ENV_NODE_SUFFIX) {
            self.node_suffix = v.parse().map_err(anyhow::Error::msg).context(ENV_NODE_SUFFIX)?;
        }
        if let Some(v) = var(ENV_CASTLING) {
            self.castling = v.parse().map_err(anyhow::Error::msg).context(ENV_CASTLING)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let cfg: ReplayConfig = serde_json::from_str(r#"{ "node_suffix": "strict", "verify": true }"#).unwrap();
        assert_eq!(cfg.node_suffix, SuffixPolicy::Strict);
        assert!(cfg.verify);
        assert!(cfg.emit_replay && cfg.emit_searches);
        assert_eq!(cfg.castling, CastlingStyle::Standard);
    }

    #[test]
    fn json_one_of_and_castling() {
        let cfg: ReplayConfig = serde_json::from_str(r#"{ "node_suffix": { "one-of": ["k", "n"] }, "castling": "king-takes-rook" }"#).unwrap();
        assert_eq!(cfg.node_suffix, SuffixPolicy::OneOf(vec!['k', 'n']));
        assert_eq!(cfg.castling, CastlingStyle::KingTakesRook);
    }

    #[test]
    fn env_overrides() {
        let mut cfg = ReplayConfig::default();
        cfg.apply_vars(|name| match name {
            ENV_NODE_SUFFIX => Some("oneof:k".to_string()),
            ENV_CASTLING => Some("king-takes-rook".to_string()),
            _ => None,
        }).unwrap();
        assert_eq!(cfg.node_suffix, SuffixPolicy::OneOf(vec!['k']));
        assert_eq!(cfg.castling, CastlingStyle::KingTakesRook);

        let mut cfg = ReplayConfig::default();
        assert!(cfg.apply_vars(|name| (name == ENV_CASTLING).then(|| "sideways".to_string())).is_err());
    }
}

// Board engine backed by cozy-chess
pub mod cozy;

pub use cozy::{CastleSide, CastlingStyle, LegalMove, Position};

//! Core data models for the trend engine.

mod game;
mod ids;
mod prediction;
mod roster;
mod stat;
mod trend;

pub use game::*;
pub use ids::*;
pub use prediction::*;
pub use roster::*;
pub use stat::*;
pub use trend::*;

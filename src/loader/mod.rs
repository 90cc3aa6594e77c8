//! Data loader abstraction.
//!
//! The engine never talks to the store directly; it goes through the
//! `DataLoader` trait so the pipeline can run against the hosted REST
//! store in production and an in-memory snapshot in tests and the CLI.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::{
    GameId, GameRecord, PlayerId, PlayerRecord, PredictionModel, PredictionRow, StatRow,
    StatType, TeamId, TeamRecord,
};

pub mod rest;
pub mod snapshot;

pub use rest::RestLoader;
pub use snapshot::SnapshotLoader;

/// Errors from the data loader.
///
/// Any of these fails the whole query; the engine never returns partial
/// results over a broken fetch.
#[derive(Debug, Error)]
pub enum LoaderError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Store returned {status}: {message}")]
    HttpStatus { status: u16, message: String },

    #[error("Invalid store URL: {0}")]
    InvalidUrl(String),

    #[error("Decode error: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Chunk-size limits the store imposes on batched reads.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct BatchLimits {
    /// Max player ids per stat-row batch
    #[serde(default = "default_player_chunk")]
    pub player_chunk: usize,

    /// Max game ids per game-lookup batch
    #[serde(default = "default_game_chunk")]
    pub game_chunk: usize,

    /// How many upcoming games to scan when locating the slate
    #[serde(default = "default_upcoming_scan")]
    pub upcoming_scan: usize,

    /// Max historical stat rows fetched per player batch
    #[serde(default = "default_stat_row_limit")]
    pub stat_row_limit: usize,
}

fn default_player_chunk() -> usize {
    50
}

fn default_game_chunk() -> usize {
    1000
}

fn default_upcoming_scan() -> usize {
    100
}

fn default_stat_row_limit() -> usize {
    1000
}

impl Default for BatchLimits {
    fn default() -> Self {
        Self {
            player_chunk: default_player_chunk(),
            game_chunk: default_game_chunk(),
            upcoming_scan: default_upcoming_scan(),
            stat_row_limit: default_stat_row_limit(),
        }
    }
}

/// Split an id list into store-sized chunks, preserving order.
pub fn chunked<T: Clone>(ids: &[T], chunk_size: usize) -> Vec<Vec<T>> {
    ids.chunks(chunk_size.max(1))
        .map(|chunk| chunk.to_vec())
        .collect()
}

/// Read interface onto the hosted store.
#[async_trait]
pub trait DataLoader: Send + Sync {
    /// Loader name for logging.
    fn name(&self) -> &'static str;

    /// Scheduled games, date ascending, at most `max`.
    async fn upcoming_games(&self, max: usize) -> Result<Vec<GameRecord>, LoaderError>;

    /// Active roster players for the given teams.
    async fn active_roster(&self, team_ids: &[TeamId]) -> Result<Vec<PlayerRecord>, LoaderError>;

    /// Team records for the given ids.
    async fn teams(&self, team_ids: &[TeamId]) -> Result<Vec<TeamRecord>, LoaderError>;

    /// Raw per-model prediction rows for (players × games × models).
    async fn predictions(
        &self,
        player_ids: &[PlayerId],
        game_ids: &[GameId],
        models: &[PredictionModel],
    ) -> Result<Vec<PredictionRow>, LoaderError>;

    /// Historical stat rows for one batch of players. `stat` names the
    /// column the caller is interested in; `limit` caps the batch size.
    /// Callers impose their own ordering after joining to games.
    async fn stat_rows(
        &self,
        player_ids: &[PlayerId],
        stat: StatType,
        limit: usize,
    ) -> Result<Vec<StatRow>, LoaderError>;

    /// Game records for one batch of ids.
    async fn games(&self, game_ids: &[GameId]) -> Result<Vec<GameRecord>, LoaderError>;
}

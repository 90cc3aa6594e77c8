//! In-memory snapshot loader.
//!
//! Serves a complete data snapshot from memory. Used by the `scan` CLI
//! command (against a JSON file) and as the engine's test double.

use async_trait::async_trait;
use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::{DataLoader, LoaderError};
use crate::models::{
    GameId, GameRecord, GameStatus, PlayerId, PlayerRecord, PredictionModel, PredictionRow,
    StatRow, StatType, TeamId, TeamRecord,
};

/// Everything the engine reads, as one document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub teams: Vec<TeamRecord>,
    #[serde(default)]
    pub players: Vec<PlayerRecord>,
    #[serde(default)]
    pub games: Vec<GameRecord>,
    #[serde(default)]
    pub stat_rows: Vec<StatRow>,
    #[serde(default)]
    pub predictions: Vec<PredictionRow>,
}

/// A `DataLoader` over an in-memory [`Snapshot`].
#[derive(Debug, Clone, Default)]
pub struct SnapshotLoader {
    snapshot: Snapshot,
}

impl SnapshotLoader {
    pub fn new(snapshot: Snapshot) -> Self {
        Self { snapshot }
    }

    /// Load a snapshot from a JSON file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, LoaderError> {
        let content = std::fs::read_to_string(path)?;
        let snapshot: Snapshot = serde_json::from_str(&content)?;
        Ok(Self::new(snapshot))
    }
}

#[async_trait]
impl DataLoader for SnapshotLoader {
    fn name(&self) -> &'static str {
        "snapshot"
    }

    async fn upcoming_games(&self, max: usize) -> Result<Vec<GameRecord>, LoaderError> {
        let mut games: Vec<GameRecord> = self
            .snapshot
            .games
            .iter()
            .filter(|g| g.status == GameStatus::Scheduled)
            .cloned()
            .collect();
        games.sort_by_key(|g| g.date);
        games.truncate(max);
        Ok(games)
    }

    async fn active_roster(&self, team_ids: &[TeamId]) -> Result<Vec<PlayerRecord>, LoaderError> {
        let wanted: HashSet<&TeamId> = team_ids.iter().collect();
        Ok(self
            .snapshot
            .players
            .iter()
            .filter(|p| wanted.contains(&p.team_id))
            .cloned()
            .collect())
    }

    async fn teams(&self, team_ids: &[TeamId]) -> Result<Vec<TeamRecord>, LoaderError> {
        let wanted: HashSet<&TeamId> = team_ids.iter().collect();
        Ok(self
            .snapshot
            .teams
            .iter()
            .filter(|t| wanted.contains(&t.id))
            .cloned()
            .collect())
    }

    async fn predictions(
        &self,
        player_ids: &[PlayerId],
        game_ids: &[GameId],
        models: &[PredictionModel],
    ) -> Result<Vec<PredictionRow>, LoaderError> {
        let players: HashSet<&PlayerId> = player_ids.iter().collect();
        let games: HashSet<&GameId> = game_ids.iter().collect();
        Ok(self
            .snapshot
            .predictions
            .iter()
            .filter(|row| {
                players.contains(&row.player_id)
                    && games.contains(&row.game_id)
                    && models.contains(&row.model)
            })
            .cloned()
            .collect())
    }

    async fn stat_rows(
        &self,
        player_ids: &[PlayerId],
        _stat: StatType,
        limit: usize,
    ) -> Result<Vec<StatRow>, LoaderError> {
        let players: HashSet<&PlayerId> = player_ids.iter().collect();
        Ok(self
            .snapshot
            .stat_rows
            .iter()
            .filter(|row| players.contains(&row.player_id))
            .take(limit)
            .cloned()
            .collect())
    }

    async fn games(&self, game_ids: &[GameId]) -> Result<Vec<GameRecord>, LoaderError> {
        let wanted: HashSet<&GameId> = game_ids.iter().collect();
        Ok(self
            .snapshot
            .games
            .iter()
            .filter(|g| wanted.contains(&g.id))
            .cloned()
            .collect())
    }
}

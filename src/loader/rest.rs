//! Hosted-store loader.
//!
//! Reads the relational store over its PostgREST-style HTTP interface:
//! one table per entity, filters as query parameters, id batches as
//! `in.(…)` lists. Chunking to store limits happens in the engine; each
//! call here is a single request.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::debug;
use url::Url;

use super::{DataLoader, LoaderError};
use crate::config::StoreConfig;
use crate::models::{
    EntityId, GameId, GameRecord, PlayerId, PlayerRecord, PredictionModel, PredictionRow,
    StatRow, StatType, StatValues, TeamId, TeamRecord,
};

/// `DataLoader` backed by the hosted store's REST endpoint.
pub struct RestLoader {
    client: reqwest::Client,
    base_url: Url,
    api_key: Option<String>,
}

impl RestLoader {
    pub fn new(config: &StoreConfig) -> Result<Self, LoaderError> {
        // Url::join replaces the last path segment unless the base ends
        // with a slash.
        let mut base = config.base_url.clone();
        if !base.ends_with('/') {
            base.push('/');
        }
        let base_url = Url::parse(&base)
            .map_err(|e| LoaderError::InvalidUrl(format!("{}: {}", config.base_url, e)))?;
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_seconds))
            .build()?;

        Ok(Self {
            client,
            base_url,
            api_key: config.api_key.clone(),
        })
    }

    fn table_url(&self, table: &str) -> Result<Url, LoaderError> {
        self.base_url
            .join(table)
            .map_err(|e| LoaderError::InvalidUrl(format!("{}: {}", table, e)))
    }

    async fn get_rows<T: DeserializeOwned>(
        &self,
        table: &str,
        query: &[(&str, String)],
    ) -> Result<Vec<T>, LoaderError> {
        let url = self.table_url(table)?;
        debug!("Querying store table {} ({} params)", table, query.len());

        let mut request = self.client.get(url).query(query);
        if let Some(key) = &self.api_key {
            request = request.header("apikey", key);
        }

        let response = request.send().await?;
        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response.text().await.unwrap_or_default();
            return Err(LoaderError::HttpStatus { status, message });
        }

        Ok(response.json().await?)
    }
}

/// Format an id batch as a PostgREST `in.(…)` filter value.
fn in_list(ids: &[EntityId]) -> String {
    let joined = ids
        .iter()
        .map(EntityId::as_str)
        .collect::<Vec<_>>()
        .join(",");
    format!("in.({})", joined)
}

fn model_list(models: &[PredictionModel]) -> String {
    let joined = models
        .iter()
        .map(PredictionModel::as_str)
        .collect::<Vec<_>>()
        .join(",");
    format!("in.({})", joined)
}

/// Query for one batch of historical stat rows. The limit is shared by the
/// whole player batch, so without an explicit order the store truncates an
/// arbitrary subset; ordering newest-first keeps the recent games that
/// streak evaluation depends on.
fn stat_rows_query(
    player_ids: &[PlayerId],
    stat: StatType,
    limit: usize,
) -> Vec<(&'static str, String)> {
    vec![
        ("player_id", in_list(player_ids)),
        (stat.column(), "not.is.null".to_string()),
        ("order", "game_date.desc".to_string()),
        ("limit", limit.to_string()),
    ]
}

/// Stat rows are stored flat, one column per figure.
#[derive(Debug, Deserialize)]
struct StoreStatRow {
    player_id: PlayerId,
    game_id: GameId,
    team_id: TeamId,
    #[serde(default)]
    minutes_played: f64,
    #[serde(flatten)]
    values: StatValues,
}

impl From<StoreStatRow> for StatRow {
    fn from(row: StoreStatRow) -> Self {
        StatRow {
            player_id: row.player_id,
            game_id: row.game_id,
            team_id: row.team_id,
            minutes_played: row.minutes_played,
            values: row.values,
        }
    }
}

/// Prediction rows are stored flat as well.
#[derive(Debug, Deserialize)]
struct StorePredictionRow {
    player_id: PlayerId,
    game_id: GameId,
    model: PredictionModel,
    #[serde(default)]
    confidence: f64,
    #[serde(flatten)]
    values: StatValues,
}

impl From<StorePredictionRow> for PredictionRow {
    fn from(row: StorePredictionRow) -> Self {
        PredictionRow {
            player_id: row.player_id,
            game_id: row.game_id,
            model: row.model,
            values: row.values,
            confidence: row.confidence,
        }
    }
}

#[async_trait]
impl DataLoader for RestLoader {
    fn name(&self) -> &'static str {
        "rest"
    }

    async fn upcoming_games(&self, max: usize) -> Result<Vec<GameRecord>, LoaderError> {
        self.get_rows(
            "games",
            &[
                ("status", "eq.scheduled".to_string()),
                ("order", "date.asc".to_string()),
                ("limit", max.to_string()),
            ],
        )
        .await
    }

    async fn active_roster(&self, team_ids: &[TeamId]) -> Result<Vec<PlayerRecord>, LoaderError> {
        self.get_rows(
            "players",
            &[
                ("team_id", in_list(team_ids)),
                ("active", "eq.true".to_string()),
            ],
        )
        .await
    }

    async fn teams(&self, team_ids: &[TeamId]) -> Result<Vec<TeamRecord>, LoaderError> {
        self.get_rows("teams", &[("id", in_list(team_ids))]).await
    }

    async fn predictions(
        &self,
        player_ids: &[PlayerId],
        game_ids: &[GameId],
        models: &[PredictionModel],
    ) -> Result<Vec<PredictionRow>, LoaderError> {
        let rows: Vec<StorePredictionRow> = self
            .get_rows(
                "model_predictions",
                &[
                    ("player_id", in_list(player_ids)),
                    ("game_id", in_list(game_ids)),
                    ("model", model_list(models)),
                ],
            )
            .await?;
        Ok(rows.into_iter().map(PredictionRow::from).collect())
    }

    async fn stat_rows(
        &self,
        player_ids: &[PlayerId],
        stat: StatType,
        limit: usize,
    ) -> Result<Vec<StatRow>, LoaderError> {
        let rows: Vec<StoreStatRow> = self
            .get_rows("player_game_stats", &stat_rows_query(player_ids, stat, limit))
            .await?;
        Ok(rows.into_iter().map(StatRow::from).collect())
    }

    async fn games(&self, game_ids: &[GameId]) -> Result<Vec<GameRecord>, LoaderError> {
        self.get_rows("games", &[("id", in_list(game_ids))]).await
    }
}

//! Trend pipeline orchestration.
//!
//! One `find_trends` call is one stateless computation: locate the slate,
//! prefetch rosters, teams and predictions, then per requested stat walk
//! every (game, player, direction) candidate through line derivation,
//! streak evaluation, filters and context labelling, and finally rank
//! everything globally.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use futures::future::try_join_all;
use thiserror::Error;
use tracing::{debug, info};

use crate::calculate::{aggregate_predictions, calculate_line, evaluate_streak, trend_score};
use crate::config::{TrendFilterConfig, MIN_STREAK_FLOOR};
use crate::loader::{chunked, BatchLimits, DataLoader, LoaderError};
use crate::models::{
    Direction, EnsemblePrediction, GameId, GameRecord, PlayerId, PlayerRecord, PredictionModel,
    StatRow, StatType, TeamId, Trend,
};

pub mod context;
pub mod series;

use context::{evaluate_contexts, trend_label};
use series::{HistoricalSeries, UpcomingMatchup};

/// Errors surfaced to the caller of `find_trends`.
///
/// Per-player problems (missing predictions, thin history) are silent
/// exclusions, never errors; only broken filters and upstream failures
/// abort the query.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Data loader failure: {0}")]
    Loader(#[from] LoaderError),

    #[error("Invalid filter: {0}")]
    InvalidFilter(String),
}

/// The trend-detection and line-calculation engine.
pub struct TrendEngine {
    loader: Arc<dyn DataLoader>,
    limits: BatchLimits,
}

impl TrendEngine {
    pub fn new(loader: Arc<dyn DataLoader>) -> Self {
        Self::with_limits(loader, BatchLimits::default())
    }

    pub fn with_limits(loader: Arc<dyn DataLoader>, limits: BatchLimits) -> Self {
        Self { loader, limits }
    }

    /// Compute the ranked trend list for the next slate.
    ///
    /// Returns an empty list when there is nothing to evaluate (no
    /// upcoming games, no rosters, no qualifying players). Any loader
    /// failure fails the whole call; partial results are never returned.
    pub async fn find_trends(
        &self,
        config: &TrendFilterConfig,
        models: &[PredictionModel],
    ) -> Result<Vec<Trend>, EngineError> {
        if config.min_streak < MIN_STREAK_FLOOR {
            return Err(EngineError::InvalidFilter(format!(
                "min_streak must be at least {}",
                MIN_STREAK_FLOOR
            )));
        }
        if models.is_empty() {
            return Err(EngineError::InvalidFilter(
                "at least one prediction model must be selected".to_string(),
            ));
        }

        // The slate is every game on the earliest upcoming date
        let upcoming = self.loader.upcoming_games(self.limits.upcoming_scan).await?;
        let Some(slate_date) = upcoming.first().map(|g| g.date) else {
            info!("No upcoming games; returning empty trend list");
            return Ok(Vec::new());
        };
        let slate: Vec<GameRecord> = upcoming
            .into_iter()
            .filter(|g| g.date == slate_date)
            .collect();

        let team_ids = slate_team_ids(&slate);
        let (roster, teams) = tokio::try_join!(
            self.loader.active_roster(&team_ids),
            self.loader.teams(&team_ids)
        )?;
        if roster.is_empty() {
            return Ok(Vec::new());
        }
        let abbrevs: HashMap<TeamId, String> = teams
            .into_iter()
            .map(|t| (t.id, t.abbreviation))
            .collect();

        let player_ids: Vec<PlayerId> = roster.iter().map(|p| p.id.clone()).collect();
        let game_ids: Vec<GameId> = slate.iter().map(|g| g.id.clone()).collect();

        let prediction_rows = self
            .loader
            .predictions(&player_ids, &game_ids, models)
            .await?;
        let mut ensembles: HashMap<(PlayerId, GameId), EnsemblePrediction> = HashMap::new();
        let mut rows_by_pair: HashMap<(PlayerId, GameId), Vec<_>> = HashMap::new();
        for row in prediction_rows {
            rows_by_pair
                .entry((row.player_id.clone(), row.game_id.clone()))
                .or_default()
                .push(row);
        }
        for (pair, rows) in rows_by_pair {
            if let Some(ensemble) = aggregate_predictions(&rows, models) {
                ensembles.insert(pair, ensemble);
            }
        }
        debug!(
            "Slate {}: {} games, {} roster players, {} ensemble predictions",
            slate_date,
            slate.len(),
            roster.len(),
            ensembles.len()
        );

        let mut trends: Vec<Trend> = Vec::new();
        for stat in config.stats.stat_types() {
            let stat_trends = self
                .evaluate_stat(stat, config, &slate, &roster, &player_ids, &abbrevs, &ensembles)
                .await?;
            trends.extend(stat_trends);
        }

        // Stable sort keeps enumeration order on ties
        trends.sort_by(|a, b| {
            b.consecutive_hits
                .cmp(&a.consecutive_hits)
                .then(b.total_games.cmp(&a.total_games))
                .then(
                    b.score
                        .partial_cmp(&a.score)
                        .unwrap_or(std::cmp::Ordering::Equal),
                )
        });

        info!("Found {} qualifying trends for slate {}", trends.len(), slate_date);
        Ok(trends)
    }

    /// Run the candidate pipeline for one stat across the whole slate.
    #[allow(clippy::too_many_arguments)]
    async fn evaluate_stat(
        &self,
        stat: StatType,
        config: &TrendFilterConfig,
        slate: &[GameRecord],
        roster: &[PlayerRecord],
        player_ids: &[PlayerId],
        abbrevs: &HashMap<TeamId, String>,
        ensembles: &HashMap<(PlayerId, GameId), EnsemblePrediction>,
    ) -> Result<Vec<Trend>, EngineError> {
        let rows = self.fetch_stat_rows(player_ids, stat).await?;
        let games = self.fetch_games_for(&rows).await?;

        let mut rows_by_player: HashMap<&PlayerId, Vec<&StatRow>> = HashMap::new();
        for row in &rows {
            rows_by_player.entry(&row.player_id).or_default().push(row);
        }

        let mut trends = Vec::new();
        for game in slate {
            for (team_id, opponent_id, is_home) in [
                (&game.home_team_id, &game.away_team_id, true),
                (&game.away_team_id, &game.home_team_id, false),
            ] {
                let matchup = UpcomingMatchup {
                    slate_date: game.date,
                    game_type: game.game_type,
                    opponent_id: opponent_id.clone(),
                    is_home,
                };
                for player in roster.iter().filter(|p| &p.team_id == team_id) {
                    let player_rows: Vec<StatRow> = rows_by_player
                        .get(&player.id)
                        .map(|rows| rows.iter().map(|&r| r.clone()).collect())
                        .unwrap_or_default();
                    let series = HistoricalSeries::build(&player_rows, &games, stat, &matchup);

                    if series.game_count() < config.min_streak {
                        continue;
                    }
                    let Some(ensemble) = ensembles.get(&(player.id.clone(), game.id.clone()))
                    else {
                        continue;
                    };

                    let team = team_abbrev(abbrevs, team_id);
                    let opponent = team_abbrev(abbrevs, opponent_id);

                    for direction in config.direction.directions() {
                        if let Some(trend) = evaluate_candidate(
                            stat, direction, config, player, game, &series, ensemble, team,
                            opponent, is_home,
                        ) {
                            trends.push(trend);
                        }
                    }
                }
            }
        }
        Ok(trends)
    }

    /// Fetch historical stat rows for all candidates, chunked to the
    /// store's per-batch player cap, chunks in flight concurrently.
    async fn fetch_stat_rows(
        &self,
        player_ids: &[PlayerId],
        stat: StatType,
    ) -> Result<Vec<StatRow>, EngineError> {
        let chunks = chunked(player_ids, self.limits.player_chunk);
        debug!("Fetching {} stat-row batches for {}", chunks.len(), stat);
        let fetches = chunks
            .iter()
            .map(|chunk| self.loader.stat_rows(chunk, stat, self.limits.stat_row_limit));
        let batches = try_join_all(fetches).await?;
        Ok(batches.into_iter().flatten().collect())
    }

    /// Look up every game referenced by the fetched rows, chunked to the
    /// store's id-list cap.
    async fn fetch_games_for(
        &self,
        rows: &[StatRow],
    ) -> Result<HashMap<GameId, GameRecord>, EngineError> {
        let mut seen = HashSet::new();
        let game_ids: Vec<GameId> = rows
            .iter()
            .map(|r| r.game_id.clone())
            .filter(|id| seen.insert(id.clone()))
            .collect();

        let chunks = chunked(&game_ids, self.limits.game_chunk);
        let fetches = chunks.iter().map(|chunk| self.loader.games(chunk));
        let batches = try_join_all(fetches).await?;
        Ok(batches
            .into_iter()
            .flatten()
            .map(|g| (g.id.clone(), g))
            .collect())
    }
}

/// Home and away team ids across the slate, deduplicated in order.
fn slate_team_ids(slate: &[GameRecord]) -> Vec<TeamId> {
    let mut seen = HashSet::new();
    let mut ids = Vec::new();
    for game in slate {
        for id in [&game.home_team_id, &game.away_team_id] {
            if seen.insert(id.clone()) {
                ids.push(id.clone());
            }
        }
    }
    ids
}

fn team_abbrev<'a>(abbrevs: &'a HashMap<TeamId, String>, id: &'a TeamId) -> &'a str {
    abbrevs.get(id).map(String::as_str).unwrap_or(id.as_str())
}

/// Steps 2–6 of the per-candidate pipeline: line, base streak, user
/// filters, AI agreement, context evaluation, emission.
#[allow(clippy::too_many_arguments)]
fn evaluate_candidate(
    stat: StatType,
    direction: Direction,
    config: &TrendFilterConfig,
    player: &PlayerRecord,
    game: &GameRecord,
    series: &HistoricalSeries,
    ensemble: &EnsemblePrediction,
    team: &str,
    opponent: &str,
    is_home: bool,
) -> Option<Trend> {
    let season_avg = series.season_avg();
    let predicted = stat.value_of(&ensemble.values);
    let line = calculate_line(season_avg, Some(predicted), stat, direction, config)?;

    let base = evaluate_streak(series.all(), line, direction);
    if !base.qualifies(config.min_streak) {
        return None;
    }

    if let Some(query) = &config.player_name {
        if !player.name_matches(query) {
            return None;
        }
    }
    if let Some(team_filter) = &config.team {
        if !team_filter.eq_ignore_ascii_case(team) {
            return None;
        }
    }
    if let Some(opponent_filter) = &config.opponent {
        if !opponent_filter.eq_ignore_ascii_case(opponent) {
            return None;
        }
    }

    if config.require_ai_agreement {
        let agrees = match direction {
            Direction::Over => predicted > line,
            Direction::Under => predicted < line,
        };
        if !agrees {
            return None;
        }
    }

    let outcome = evaluate_contexts(series, line, direction, config, base)?;
    let streak = outcome.streak;

    Some(Trend {
        id: Trend::make_id(&player.id, &game.id, stat, direction, outcome.context),
        player_id: player.id.clone(),
        player_name: player.full_name.clone(),
        team: team.to_string(),
        opponent: opponent.to_string(),
        game_id: game.id.clone(),
        game_date: game.date,
        stat,
        direction,
        line,
        line_method: config.line_method,
        line_adjustment: config.line_adjustment,
        season_avg,
        predicted_value: predicted,
        prediction_confidence: ensemble.confidence,
        consecutive_hits: streak.consecutive_hits,
        hit_count: streak.hit_count,
        total_games: streak.total_games,
        hit_rate: streak.hit_rate(),
        context: outcome.context,
        label: trend_label(
            direction,
            outcome.context,
            streak.consecutive_hits,
            opponent,
            is_home,
        ),
        score: trend_score(
            streak.hit_rate(),
            streak.consecutive_hits,
            streak.consecutive_hits,
        ),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    use crate::config::{DirectionFilter, StatSelector};
    use crate::loader::snapshot::{Snapshot, SnapshotLoader};
    use crate::models::{
        GameStatus, GameType, PredictionRow, StatValues, TeamRecord, TrendContext,
    };

    const MODELS: &[PredictionModel] = &[PredictionModel::Ridge];

    fn date(month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, month, day).unwrap()
    }

    fn team(id: &str, abbrev: &str) -> TeamRecord {
        TeamRecord {
            id: id.into(),
            abbreviation: abbrev.to_string(),
            full_name: format!("{} Club", abbrev),
        }
    }

    fn player(id: &str, name: &str, team: &str) -> PlayerRecord {
        PlayerRecord {
            id: id.into(),
            full_name: name.to_string(),
            position: "G".to_string(),
            team_id: team.into(),
        }
    }

    fn game(id: &str, d: NaiveDate, home: &str, away: &str, status: GameStatus) -> GameRecord {
        GameRecord {
            id: id.into(),
            date: d,
            home_team_id: home.into(),
            away_team_id: away.into(),
            status,
            season: "2025-26".to_string(),
            game_type: GameType::RegularSeason,
        }
    }

    fn points_row(player: &str, game: &str, team: &str, points: f64) -> StatRow {
        StatRow {
            player_id: player.into(),
            game_id: game.into(),
            team_id: team.into(),
            minutes_played: 33.0,
            values: StatValues {
                points,
                ..Default::default()
            },
        }
    }

    fn points_prediction(player: &str, game: &str, points: f64) -> PredictionRow {
        PredictionRow {
            player_id: player.into(),
            game_id: game.into(),
            model: PredictionModel::Ridge,
            values: StatValues {
                points,
                ..Default::default()
            },
            confidence: 0.8,
        }
    }

    /// One scheduled game (bos home, lal away) plus four completed games
    /// for the home star: [25, 22, 24, 10] newest first, mixed opponents
    /// and venues so neither the h2h nor the venue view reaches three
    /// games. Season average 20.25, standard line 20.5, over streak 3.
    fn base_snapshot() -> Snapshot {
        Snapshot {
            teams: vec![team("bos", "BOS"), team("lal", "LAL")],
            players: vec![player("p1", "Jay Tatum", "bos")],
            games: vec![
                game("up", date(2, 1), "bos", "lal", GameStatus::Scheduled),
                game("h1", date(1, 15), "bos", "nyk", GameStatus::Completed),
                game("h2", date(1, 12), "mia", "bos", GameStatus::Completed),
                game("h3", date(1, 10), "bos", "mia", GameStatus::Completed),
                game("h4", date(1, 8), "nyk", "bos", GameStatus::Completed),
            ],
            stat_rows: vec![
                points_row("p1", "h1", "bos", 25.0),
                points_row("p1", "h2", "bos", 22.0),
                points_row("p1", "h3", "bos", 24.0),
                points_row("p1", "h4", "bos", 10.0),
            ],
            predictions: vec![points_prediction("p1", "up", 26.0)],
        }
    }

    fn points_config() -> TrendFilterConfig {
        TrendFilterConfig {
            stats: StatSelector::Single(StatType::Points),
            direction: DirectionFilter::Over,
            ..Default::default()
        }
    }

    fn engine(snapshot: Snapshot) -> TrendEngine {
        TrendEngine::new(Arc::new(SnapshotLoader::new(snapshot)))
    }

    #[tokio::test]
    async fn test_min_streak_below_floor_is_rejected() {
        let config = TrendFilterConfig {
            min_streak: 2,
            ..points_config()
        };
        let result = engine(base_snapshot()).find_trends(&config, MODELS).await;
        assert!(matches!(result, Err(EngineError::InvalidFilter(_))));
    }

    #[tokio::test]
    async fn test_empty_model_selection_is_rejected() {
        let result = engine(base_snapshot())
            .find_trends(&points_config(), &[])
            .await;
        assert!(matches!(result, Err(EngineError::InvalidFilter(_))));
    }

    #[tokio::test]
    async fn test_no_upcoming_games_yields_empty_list() {
        let trends = engine(Snapshot::default())
            .find_trends(&points_config(), MODELS)
            .await
            .unwrap();
        assert!(trends.is_empty());
    }

    #[tokio::test]
    async fn test_detects_over_trend_with_streak_invariants() {
        let trends = engine(base_snapshot())
            .find_trends(&points_config(), MODELS)
            .await
            .unwrap();

        assert_eq!(trends.len(), 1);
        let trend = &trends[0];
        assert_eq!(trend.player_name, "Jay Tatum");
        assert_eq!(trend.team, "BOS");
        assert_eq!(trend.opponent, "LAL");
        assert_eq!(trend.game_date, date(2, 1));
        assert_eq!(trend.direction, Direction::Over);
        assert_eq!(trend.line, 20.5);
        assert_eq!(trend.season_avg, 20.25);
        assert_eq!(trend.predicted_value, 26.0);

        // An emitted streak is unbroken by construction
        assert_eq!(trend.consecutive_hits, 3);
        assert_eq!(trend.hit_count, trend.consecutive_hits);
        assert_eq!(trend.total_games, trend.consecutive_hits);
        assert_eq!(trend.hit_rate, 100.0);
        assert_eq!(trend.score, 100.0);
        assert_eq!(trend.context, TrendContext::RecentForm);
        assert_eq!(trend.label, "Over in last 3 games");
        assert_eq!((trend.line * 2.0).fract(), 0.0);
    }

    #[tokio::test]
    async fn test_player_without_prediction_is_excluded() {
        let mut snapshot = base_snapshot();
        snapshot.predictions.clear();

        let trends = engine(snapshot)
            .find_trends(&points_config(), MODELS)
            .await
            .unwrap();
        assert!(trends.is_empty());
    }

    #[tokio::test]
    async fn test_history_below_min_streak_is_excluded() {
        let mut snapshot = base_snapshot();
        snapshot.stat_rows.truncate(2);

        let trends = engine(snapshot)
            .find_trends(&points_config(), MODELS)
            .await
            .unwrap();
        assert!(trends.is_empty());
    }

    #[tokio::test]
    async fn test_ai_agreement_rejects_prediction_below_line() {
        let mut snapshot = base_snapshot();
        snapshot.predictions = vec![points_prediction("p1", "up", 15.0)];
        let config = TrendFilterConfig {
            require_ai_agreement: true,
            ..points_config()
        };

        let trends = engine(snapshot).find_trends(&config, MODELS).await.unwrap();
        assert!(trends.is_empty());
    }

    #[tokio::test]
    async fn test_ai_agreement_keeps_prediction_above_line() {
        let config = TrendFilterConfig {
            require_ai_agreement: true,
            ..points_config()
        };

        let trends = engine(base_snapshot())
            .find_trends(&config, MODELS)
            .await
            .unwrap();
        assert_eq!(trends.len(), 1);
    }

    #[tokio::test]
    async fn test_h2h_context_wins_when_history_is_against_opponent() {
        let mut snapshot = base_snapshot();
        // Same values, but every completed game was against the upcoming
        // opponent, alternating venue.
        snapshot.games = vec![
            game("up", date(2, 1), "bos", "lal", GameStatus::Scheduled),
            game("h1", date(1, 15), "bos", "lal", GameStatus::Completed),
            game("h2", date(1, 12), "lal", "bos", GameStatus::Completed),
            game("h3", date(1, 10), "bos", "lal", GameStatus::Completed),
            game("h4", date(1, 8), "lal", "bos", GameStatus::Completed),
        ];

        let trends = engine(snapshot)
            .find_trends(&points_config(), MODELS)
            .await
            .unwrap();
        assert_eq!(trends.len(), 1);
        assert_eq!(trends[0].context, TrendContext::HeadToHead);
        assert_eq!(trends[0].label, "Over in last 3 games vs LAL");
    }

    #[tokio::test]
    async fn test_team_filter_keeps_only_matching_side() {
        let mut snapshot = base_snapshot();
        snapshot.players.push(player("p2", "Luka Doncic", "lal"));
        snapshot.games.extend(vec![
            game("l1", date(1, 15), "lal", "nyk", GameStatus::Completed),
            game("l2", date(1, 12), "mia", "lal", GameStatus::Completed),
            game("l3", date(1, 10), "lal", "mia", GameStatus::Completed),
            game("l4", date(1, 8), "nyk", "lal", GameStatus::Completed),
        ]);
        snapshot.stat_rows.extend(vec![
            points_row("p2", "l1", "lal", 25.0),
            points_row("p2", "l2", "lal", 22.0),
            points_row("p2", "l3", "lal", 24.0),
            points_row("p2", "l4", "lal", 10.0),
        ]);
        snapshot.predictions.push(points_prediction("p2", "up", 26.0));

        let config = TrendFilterConfig {
            team: Some("lal".to_string()),
            ..points_config()
        };
        let trends = engine(snapshot).find_trends(&config, MODELS).await.unwrap();
        assert_eq!(trends.len(), 1);
        assert_eq!(trends[0].player_name, "Luka Doncic");
    }

    #[tokio::test]
    async fn test_longer_streak_ranks_first() {
        let mut snapshot = base_snapshot();
        snapshot.players.push(player("p2", "Luka Doncic", "lal"));
        // Six completed games, four-game over streak against line 23.5
        snapshot.games.extend(vec![
            game("l1", date(1, 18), "lal", "nyk", GameStatus::Completed),
            game("l2", date(1, 15), "mia", "lal", GameStatus::Completed),
            game("l3", date(1, 12), "lal", "mia", GameStatus::Completed),
            game("l4", date(1, 10), "nyk", "lal", GameStatus::Completed),
            game("l5", date(1, 6), "lal", "nyk", GameStatus::Completed),
            game("l6", date(1, 4), "mia", "lal", GameStatus::Completed),
        ]);
        snapshot.stat_rows.extend(vec![
            points_row("p2", "l1", "lal", 30.0),
            points_row("p2", "l2", "lal", 30.0),
            points_row("p2", "l3", "lal", 30.0),
            points_row("p2", "l4", "lal", 30.0),
            points_row("p2", "l5", "lal", 10.0),
            points_row("p2", "l6", "lal", 10.0),
        ]);
        snapshot.predictions.push(points_prediction("p2", "up", 31.0));

        let trends = engine(snapshot)
            .find_trends(&points_config(), MODELS)
            .await
            .unwrap();
        assert_eq!(trends.len(), 2);
        assert_eq!(trends[0].player_name, "Luka Doncic");
        assert_eq!(trends[0].consecutive_hits, 4);
        assert_eq!(trends[1].player_name, "Jay Tatum");
        assert_eq!(trends[1].consecutive_hits, 3);
    }

    #[tokio::test]
    async fn test_exact_ties_keep_home_side_first() {
        let mut snapshot = base_snapshot();
        // Away player listed first in the roster payload, with history
        // identical to the home player's.
        snapshot.players.insert(0, player("p2", "Luka Doncic", "lal"));
        snapshot.games.extend(vec![
            game("l1", date(1, 15), "lal", "nyk", GameStatus::Completed),
            game("l2", date(1, 12), "mia", "lal", GameStatus::Completed),
            game("l3", date(1, 10), "lal", "mia", GameStatus::Completed),
            game("l4", date(1, 8), "nyk", "lal", GameStatus::Completed),
        ]);
        snapshot.stat_rows.extend(vec![
            points_row("p2", "l1", "lal", 25.0),
            points_row("p2", "l2", "lal", 22.0),
            points_row("p2", "l3", "lal", 24.0),
            points_row("p2", "l4", "lal", 10.0),
        ]);
        snapshot.predictions.push(points_prediction("p2", "up", 26.0));

        let trends = engine(snapshot)
            .find_trends(&points_config(), MODELS)
            .await
            .unwrap();
        assert_eq!(trends.len(), 2);
        assert_eq!(trends[0].consecutive_hits, trends[1].consecutive_hits);
        assert_eq!(trends[0].score, trends[1].score);
        assert_eq!(trends[0].player_name, "Jay Tatum");
        assert_eq!(trends[1].player_name, "Luka Doncic");
    }

    #[tokio::test]
    async fn test_player_name_filter_is_substring_match() {
        let config = TrendFilterConfig {
            player_name: Some("tatum".to_string()),
            ..points_config()
        };
        let trends = engine(base_snapshot())
            .find_trends(&config, MODELS)
            .await
            .unwrap();
        assert_eq!(trends.len(), 1);

        let config = TrendFilterConfig {
            player_name: Some("curry".to_string()),
            ..points_config()
        };
        let trends = engine(base_snapshot())
            .find_trends(&config, MODELS)
            .await
            .unwrap();
        assert!(trends.is_empty());
    }
}

use axum::extract::{Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::api::state::AppState;
use crate::api::ApiError;
use crate::config::{
    parse_buffer_list, DirectionFilter, LineAdjustment, LineMethod, StatSelector,
    TrendFilterConfig,
};
use crate::models::{PredictionModel, StatType, Trend, TrendContext};

#[derive(Debug, Default, Deserialize)]
pub struct TrendsParams {
    /// One stat column name; omitted means all stats.
    pub stat: Option<String>,
    /// "over", "under" or "both".
    pub direction: Option<String>,
    /// Comma-separated context names ("recent-form", "home-away", "h2h").
    pub trend_types: Option<String>,
    pub min_streak: Option<usize>,
    /// "player-average" or "ai-prediction".
    pub line_method: Option<String>,
    /// "standard", "favorable" or "custom".
    pub line_adjustment: Option<String>,
    /// Comma-separated "stat:buffer" pairs for custom adjustment.
    pub buffers: Option<String>,
    pub require_ai_agreement: Option<bool>,
    pub player: Option<String>,
    pub team: Option<String>,
    pub opponent: Option<String>,
    /// Comma-separated model names; omitted means every model.
    pub models: Option<String>,
}

impl TrendsParams {
    fn filter_config(&self) -> Result<TrendFilterConfig, ApiError> {
        let mut config = TrendFilterConfig::default();

        if let Some(stat) = &self.stat {
            let stat = StatType::parse(stat)
                .ok_or_else(|| ApiError::BadRequest(format!("Unknown stat: {}", stat)))?;
            config.stats = StatSelector::Single(stat);
        }

        if let Some(direction) = &self.direction {
            config.direction = match direction.as_str() {
                "over" => DirectionFilter::Over,
                "under" => DirectionFilter::Under,
                "both" => DirectionFilter::Both,
                other => {
                    return Err(ApiError::BadRequest(format!("Unknown direction: {}", other)))
                }
            };
        }

        if let Some(types) = &self.trend_types {
            config.trend_types = split_csv(types)
                .map(|name| {
                    parse_context(name)
                        .ok_or_else(|| ApiError::BadRequest(format!("Unknown trend type: {}", name)))
                })
                .collect::<Result<_, _>>()?;
        }

        if let Some(min_streak) = self.min_streak {
            config.min_streak = min_streak;
        }

        if let Some(method) = &self.line_method {
            config.line_method = match method.as_str() {
                "player-average" => LineMethod::PlayerAverage,
                "ai-prediction" => LineMethod::AiPrediction,
                other => {
                    return Err(ApiError::BadRequest(format!("Unknown line method: {}", other)))
                }
            };
        }

        if let Some(adjustment) = &self.line_adjustment {
            config.line_adjustment = match adjustment.as_str() {
                "standard" => LineAdjustment::Standard,
                "favorable" => LineAdjustment::Favorable,
                "custom" => LineAdjustment::Custom,
                other => {
                    return Err(ApiError::BadRequest(format!(
                        "Unknown line adjustment: {}",
                        other
                    )))
                }
            };
        }

        if let Some(buffers) = &self.buffers {
            config.custom_buffers = parse_buffer_list(buffers).map_err(ApiError::BadRequest)?;
        }

        config.require_ai_agreement = self.require_ai_agreement.unwrap_or(false);
        config.player_name = self.player.clone();
        config.team = self.team.clone();
        config.opponent = self.opponent.clone();

        Ok(config)
    }

    fn model_selection(&self) -> Result<Vec<PredictionModel>, ApiError> {
        match &self.models {
            None => Ok(PredictionModel::ALL.to_vec()),
            Some(names) => split_csv(names)
                .map(|name| {
                    PredictionModel::parse(name)
                        .ok_or_else(|| ApiError::BadRequest(format!("Unknown model: {}", name)))
                })
                .collect(),
        }
    }
}

fn split_csv(s: &str) -> impl Iterator<Item = &str> {
    s.split(',').map(str::trim).filter(|p| !p.is_empty())
}

fn parse_context(name: &str) -> Option<TrendContext> {
    match name {
        "recent-form" => Some(TrendContext::RecentForm),
        "home-away" => Some(TrendContext::HomeAway),
        "h2h" => Some(TrendContext::HeadToHead),
        _ => None,
    }
}

#[derive(Debug, Serialize)]
pub struct TrendsResponse {
    pub count: usize,
    pub trends: Vec<Trend>,
}

pub async fn list_trends(
    State(state): State<AppState>,
    Query(params): Query<TrendsParams>,
) -> Result<Json<TrendsResponse>, ApiError> {
    let config = params.filter_config()?;
    let models = params.model_selection()?;

    let trends = state.engine().find_trends(&config, &models).await?;
    Ok(Json(TrendsResponse {
        count: trends.len(),
        trends,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::build_router;
    use crate::api::state::AppState;
    use crate::loader::snapshot::{Snapshot, SnapshotLoader};
    use crate::models::{
        GameRecord, GameStatus, GameType, PlayerRecord, PredictionRow, StatRow, StatValues,
        TeamRecord,
    };
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use chrono::NaiveDate;
    use serde_json::Value;
    use std::sync::Arc;
    use tower::util::ServiceExt;

    fn date(month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, month, day).unwrap()
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

    /// One scheduled game with a home player on a three-game points streak.
    fn snapshot() -> Snapshot {
        let points_row = |game_id: &str, points: f64| StatRow {
            player_id: "p1".into(),
            game_id: game_id.into(),
            team_id: "bos".into(),
            minutes_played: 33.0,
            values: StatValues {
                points,
                ..Default::default()
            },
        };

        Snapshot {
            teams: vec![
                TeamRecord {
                    id: "bos".into(),
                    abbreviation: "BOS".to_string(),
                    full_name: "Boston".to_string(),
                },
                TeamRecord {
                    id: "lal".into(),
                    abbreviation: "LAL".to_string(),
                    full_name: "Los Angeles".to_string(),
                },
            ],
            players: vec![PlayerRecord {
                id: "p1".into(),
                full_name: "Jay Tatum".to_string(),
                position: "F".to_string(),
                team_id: "bos".into(),
            }],
            games: vec![
                game("up", date(2, 1), "bos", "lal", GameStatus::Scheduled),
                game("h1", date(1, 15), "bos", "nyk", GameStatus::Completed),
                game("h2", date(1, 12), "mia", "bos", GameStatus::Completed),
                game("h3", date(1, 10), "bos", "mia", GameStatus::Completed),
                game("h4", date(1, 8), "nyk", "bos", GameStatus::Completed),
            ],
            stat_rows: vec![
                points_row("h1", 25.0),
                points_row("h2", 22.0),
                points_row("h3", 24.0),
                points_row("h4", 10.0),
            ],
            predictions: vec![PredictionRow {
                player_id: "p1".into(),
                game_id: "up".into(),
                model: PredictionModel::Ridge,
                values: StatValues {
                    points: 26.0,
                    ..Default::default()
                },
                confidence: 0.8,
            }],
        }
    }

    fn app() -> axum::Router {
        build_router(AppState {
            loader: Arc::new(SnapshotLoader::new(snapshot())),
            limits: Default::default(),
        })
    }

    async fn get_json(app: axum::Router, uri: &str) -> (StatusCode, Value) {
        let resp = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = resp.status();
        let body = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: Value = serde_json::from_slice(&body).unwrap_or(Value::Null);
        (status, json)
    }

    #[tokio::test]
    async fn test_list_trends() {
        let (status, json) = get_json(app(), "/api/trends?stat=points&direction=over").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["count"], 1);
        let trend = &json["trends"][0];
        assert_eq!(trend["player_name"], "Jay Tatum");
        assert_eq!(trend["team"], "BOS");
        assert_eq!(trend["opponent"], "LAL");
        assert_eq!(trend["line"], 20.5);
        assert_eq!(trend["consecutive_hits"], 3);
        assert_eq!(trend["label"], "Over in last 3 games");
    }

    #[tokio::test]
    async fn test_min_streak_below_floor_is_bad_request() {
        let (status, json) = get_json(app(), "/api/trends?min_streak=2").await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"]["code"], "BAD_REQUEST");
    }

    #[tokio::test]
    async fn test_unknown_stat_is_bad_request() {
        let (status, _) = get_json(app(), "/api/trends?stat=dunks").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_unknown_model_is_bad_request() {
        let (status, _) = get_json(app(), "/api/trends?models=xgboost").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_model_filter_excludes_other_models() {
        // The only prediction is from ridge; restricting to bayes leaves
        // the player without an ensemble.
        let (status, json) = get_json(app(), "/api/trends?stat=points&models=bayes").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["count"], 0);
    }

    #[test]
    fn test_buffers_param_flows_into_config() {
        let params = TrendsParams {
            line_adjustment: Some("custom".to_string()),
            buffers: Some("points:2.5".to_string()),
            ..Default::default()
        };
        let config = params.filter_config().unwrap();
        assert_eq!(config.line_adjustment, LineAdjustment::Custom);
        assert_eq!(config.custom_buffer(StatType::Points), 2.5);

        let params = TrendsParams {
            buffers: Some("dunks:1.0".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            params.filter_config(),
            Err(ApiError::BadRequest(_))
        ));
    }

    #[test]
    fn test_trend_types_parsing() {
        let params = TrendsParams {
            trend_types: Some("h2h,home-away".to_string()),
            ..Default::default()
        };
        let config = params.filter_config().unwrap();
        assert_eq!(
            config.trend_types,
            vec![TrendContext::HeadToHead, TrendContext::HomeAway]
        );
    }
}

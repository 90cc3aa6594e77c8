//! Trend output records.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::{GameId, PlayerId, StatType, TrendId};
use crate::config::{LineAdjustment, LineMethod};

/// Which side of the line counts as a hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Over,
    Under,
}

impl Direction {
    /// Capitalized form used in trend labels.
    pub fn label_word(&self) -> &'static str {
        match self {
            Direction::Over => "Over",
            Direction::Under => "Under",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Over => write!(f, "over"),
            Direction::Under => write!(f, "under"),
        }
    }
}

/// The historical slice a qualifying streak was found in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TrendContext {
    #[serde(rename = "recent-form")]
    RecentForm,
    #[serde(rename = "home-away")]
    HomeAway,
    #[serde(rename = "h2h")]
    HeadToHead,
}

impl fmt::Display for TrendContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrendContext::RecentForm => write!(f, "recent-form"),
            TrendContext::HomeAway => write!(f, "home-away"),
            TrendContext::HeadToHead => write!(f, "h2h"),
        }
    }
}

/// One qualifying (player, stat, direction, context) combination.
///
/// Produced fresh for every query and never mutated afterwards. By
/// construction `hit_count == total_games == consecutive_hits`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Trend {
    pub id: TrendId,
    pub player_id: PlayerId,
    pub player_name: String,
    pub team: String,
    pub opponent: String,
    pub game_id: GameId,
    pub game_date: NaiveDate,
    pub stat: StatType,
    pub direction: Direction,

    /// The threshold the streak was evaluated against.
    pub line: f64,
    pub line_method: LineMethod,
    pub line_adjustment: LineAdjustment,
    pub season_avg: f64,
    pub predicted_value: f64,
    pub prediction_confidence: f64,

    pub consecutive_hits: usize,
    pub hit_count: usize,
    pub total_games: usize,
    pub hit_rate: f64,

    pub context: TrendContext,
    pub label: String,
    pub score: f64,
}

impl Trend {
    /// Mint the deterministic id for a trend's identity fields.
    pub fn make_id(
        player_id: &PlayerId,
        game_id: &GameId,
        stat: StatType,
        direction: Direction,
        context: TrendContext,
    ) -> TrendId {
        TrendId::generate(&[
            player_id.as_str(),
            game_id.as_str(),
            stat.column(),
            direction.label_word(),
            &context.to_string(),
        ])
    }
}

//! Games and per-game stat rows.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{GameId, PlayerId, StatValues, TeamId};

/// Lifecycle state of a game in the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameStatus {
    Scheduled,
    Live,
    Completed,
}

/// Regular season and playoff histories are never mixed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameType {
    RegularSeason,
    Playoff,
}

/// One game, scheduled or played.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameRecord {
    pub id: GameId,
    pub date: NaiveDate,
    pub home_team_id: TeamId,
    pub away_team_id: TeamId,
    pub status: GameStatus,
    pub season: String,
    pub game_type: GameType,
}

impl GameRecord {
    /// The opposing team for a participant, or `None` if the team
    /// did not play in this game.
    pub fn opponent_of(&self, team_id: &TeamId) -> Option<&TeamId> {
        if &self.home_team_id == team_id {
            Some(&self.away_team_id)
        } else if &self.away_team_id == team_id {
            Some(&self.home_team_id)
        } else {
            None
        }
    }

    pub fn is_home(&self, team_id: &TeamId) -> bool {
        &self.home_team_id == team_id
    }
}

/// One player's final box-score figures for one completed game.
/// Immutable once fetched.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatRow {
    pub player_id: PlayerId,
    pub game_id: GameId,
    pub team_id: TeamId,
    pub minutes_played: f64,
    pub values: StatValues,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn game(home: &str, away: &str) -> GameRecord {
        GameRecord {
            id: "g1".into(),
            date: NaiveDate::from_ymd_opt(2026, 1, 10).unwrap(),
            home_team_id: home.into(),
            away_team_id: away.into(),
            status: GameStatus::Completed,
            season: "2025-26".to_string(),
            game_type: GameType::RegularSeason,
        }
    }

    #[test]
    fn test_opponent_of() {
        let g = game("bos", "lal");
        assert_eq!(g.opponent_of(&"bos".into()), Some(&"lal".into()));
        assert_eq!(g.opponent_of(&"lal".into()), Some(&"bos".into()));
        assert_eq!(g.opponent_of(&"nyk".into()), None);
    }

    #[test]
    fn test_is_home() {
        let g = game("bos", "lal");
        assert!(g.is_home(&"bos".into()));
        assert!(!g.is_home(&"lal".into()));
    }

    #[test]
    fn test_status_serde() {
        assert_eq!(
            serde_json::to_string(&GameStatus::Scheduled).unwrap(),
            "\"scheduled\""
        );
        let status: GameStatus = serde_json::from_str("\"completed\"").unwrap();
        assert_eq!(status, GameStatus::Completed);
    }

    #[test]
    fn test_game_type_serde() {
        assert_eq!(
            serde_json::to_string(&GameType::RegularSeason).unwrap(),
            "\"regular_season\""
        );
        let gt: GameType = serde_json::from_str("\"playoff\"").unwrap();
        assert_eq!(gt, GameType::Playoff);
    }

    #[test]
    fn test_game_record_serialization() {
        let g = game("bos", "lal");
        let json = serde_json::to_string(&g).unwrap();
        let back: GameRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back.id, g.id);
        assert_eq!(back.date, g.date);
        assert_eq!(back.status, GameStatus::Completed);
    }
}

//! Historical series construction.
//!
//! One filtered, most-recent-first series per (player, stat) feeds all
//! three context views; nothing is re-fetched per view.

use std::collections::HashMap;

use chrono::NaiveDate;

use crate::models::{GameId, GameRecord, GameStatus, GameType, StatRow, StatType, TeamId};

/// What the player is about to walk into: the slate game seen from
/// their side.
#[derive(Debug, Clone)]
pub struct UpcomingMatchup {
    pub slate_date: NaiveDate,
    pub game_type: GameType,
    pub opponent_id: TeamId,
    pub is_home: bool,
}

/// A player's historical values for one stat, newest first, with the
/// head-to-head and venue slices precomputed.
#[derive(Debug, Clone, Default)]
pub struct HistoricalSeries {
    all: Vec<f64>,
    h2h: Vec<f64>,
    home_away: Vec<f64>,
}

impl HistoricalSeries {
    /// Join stat rows to their games and keep only completed games played
    /// strictly before the slate date with the upcoming game's type.
    pub fn build(
        rows: &[StatRow],
        games: &HashMap<GameId, GameRecord>,
        stat: StatType,
        matchup: &UpcomingMatchup,
    ) -> Self {
        let mut entries: Vec<(NaiveDate, f64, bool, bool)> = rows
            .iter()
            .filter_map(|row| {
                let game = games.get(&row.game_id)?;
                if game.status != GameStatus::Completed
                    || game.date >= matchup.slate_date
                    || game.game_type != matchup.game_type
                {
                    return None;
                }
                let same_opponent = game.opponent_of(&row.team_id) == Some(&matchup.opponent_id);
                let same_venue = game.is_home(&row.team_id) == matchup.is_home;
                Some((game.date, stat.value_of(&row.values), same_opponent, same_venue))
            })
            .collect();

        // Most recent first; stable, so same-day games keep fetch order
        entries.sort_by(|a, b| b.0.cmp(&a.0));

        let mut series = HistoricalSeries::default();
        for (_, value, same_opponent, same_venue) in entries {
            series.all.push(value);
            if same_opponent {
                series.h2h.push(value);
            }
            if same_venue {
                series.home_away.push(value);
            }
        }
        series
    }

    pub fn all(&self) -> &[f64] {
        &self.all
    }

    pub fn h2h(&self) -> &[f64] {
        &self.h2h
    }

    pub fn home_away(&self) -> &[f64] {
        &self.home_away
    }

    pub fn game_count(&self) -> usize {
        self.all.len()
    }

    /// Assemble a series directly from its views. Test fixture only.
    #[cfg(test)]
    pub(crate) fn from_views(all: Vec<f64>, h2h: Vec<f64>, home_away: Vec<f64>) -> Self {
        Self { all, h2h, home_away }
    }

    /// Season average over the filtered history.
    pub fn season_avg(&self) -> f64 {
        if self.all.is_empty() {
            0.0
        } else {
            self.all.iter().sum::<f64>() / self.all.len() as f64
        }
    }
}

//! Consecutive-streak scanning.

use crate::models::Direction;

/// Result of scanning a series for a trailing run of hits.
///
/// The scan only ever consumes hits, so `hit_count` and `total_games`
/// always equal `consecutive_hits` and `hit_rate` is 100 whenever the
/// streak is non-empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreakResult {
    pub consecutive_hits: usize,
    pub hit_count: usize,
    pub total_games: usize,
}

impl StreakResult {
    pub fn hit_rate(&self) -> f64 {
        if self.total_games == 0 {
            0.0
        } else {
            (self.hit_count as f64 / self.total_games as f64) * 100.0
        }
    }

    pub fn qualifies(&self, min_streak: usize) -> bool {
        self.consecutive_hits >= min_streak
    }
}

fn is_hit(value: f64, line: f64, direction: Direction) -> bool {
    match direction {
        Direction::Over => value > line,
        Direction::Under => value < line,
    }
}

/// Count the current perfect streak in a most-recent-first series.
///
/// Scans from index 0 forward and stops at the first value that does not
/// beat the line in the requested direction. A value exactly on the line
/// is a miss for both directions.
pub fn evaluate_streak(values: &[f64], line: f64, direction: Direction) -> StreakResult {
    let consecutive_hits = values
        .iter()
        .take_while(|&&v| is_hit(v, line, direction))
        .count();

    StreakResult {
        consecutive_hits,
        hit_count: consecutive_hits,
        total_games: consecutive_hits,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_streak_stops_at_first_miss() {
        // 12 and 15 beat the line, 9 breaks the run
        let result = evaluate_streak(&[12.0, 15.0, 9.0, 20.0], 10.0, Direction::Over);
        assert_eq!(result.consecutive_hits, 2);
        assert_eq!(result.hit_count, 2);
        assert_eq!(result.total_games, 2);
    }

    #[test]
    fn test_value_on_line_is_a_miss() {
        let result = evaluate_streak(&[10.0, 12.0, 9.0, 15.0, 20.0], 10.0, Direction::Over);
        assert_eq!(result.consecutive_hits, 0);

        let result = evaluate_streak(&[10.0, 8.0], 10.0, Direction::Under);
        assert_eq!(result.consecutive_hits, 0);
    }

    #[test]
    fn test_under_direction() {
        let result = evaluate_streak(&[8.0, 9.5, 7.0, 12.0], 10.0, Direction::Under);
        assert_eq!(result.consecutive_hits, 3);
    }

    #[test]
    fn test_whole_series_hits() {
        let result = evaluate_streak(&[12.0, 15.0, 11.0], 10.0, Direction::Over);
        assert_eq!(result.consecutive_hits, 3);
    }

    #[test]
    fn test_empty_series() {
        let result = evaluate_streak(&[], 10.0, Direction::Over);
        assert_eq!(result.consecutive_hits, 0);
        assert_eq!(result.hit_rate(), 0.0);
    }

    #[test]
    fn test_hit_rate_is_always_perfect_when_nonempty() {
        let result = evaluate_streak(&[12.0, 15.0], 10.0, Direction::Over);
        assert_eq!(result.hit_rate(), 100.0);
    }

    #[test]
    fn test_qualifies() {
        let result = evaluate_streak(&[12.0, 15.0, 11.0], 10.0, Direction::Over);
        assert!(result.qualifies(3));
        assert!(!result.qualifies(4));
    }
}

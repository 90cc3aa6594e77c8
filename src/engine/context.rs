//! Context evaluation and trend labelling.

use crate::calculate::{evaluate_streak, StreakResult};
use crate::config::TrendFilterConfig;
use crate::models::{Direction, TrendContext};

use super::series::HistoricalSeries;

/// The winning context for a candidate trend.
#[derive(Debug, Clone, Copy)]
pub struct ContextOutcome {
    pub context: TrendContext,
    pub streak: StreakResult,
}

fn view_streak(
    values: &[f64],
    line: f64,
    direction: Direction,
    min_streak: usize,
) -> Option<StreakResult> {
    // A view shorter than the streak threshold cannot qualify
    if values.len() < min_streak {
        return None;
    }
    let streak = evaluate_streak(values, line, direction);
    streak.qualifies(min_streak).then_some(streak)
}

/// Decide which context label a qualifying trend gets.
///
/// `base` is the recent-form streak over the all-games view, already at or
/// above the threshold. The home/away and head-to-head views are only
/// evaluated when the query asks for them (an empty subset asks for
/// everything). Head-to-head is checked last and wins over home/away when
/// both qualify.
///
/// Returns `None` when a non-empty trend-type subset is configured and
/// none of the requested types qualifies. Recent-form in the subset is
/// always satisfied, since the base streak already met the threshold.
pub fn evaluate_contexts(
    series: &HistoricalSeries,
    line: f64,
    direction: Direction,
    config: &TrendFilterConfig,
    base: StreakResult,
) -> Option<ContextOutcome> {
    let mut outcome = ContextOutcome {
        context: TrendContext::RecentForm,
        streak: base,
    };

    let home_away = if config.wants_context(TrendContext::HomeAway) {
        view_streak(series.home_away(), line, direction, config.min_streak)
    } else {
        None
    };
    if let Some(streak) = home_away {
        outcome = ContextOutcome {
            context: TrendContext::HomeAway,
            streak,
        };
    }

    let h2h = if config.wants_context(TrendContext::HeadToHead) {
        view_streak(series.h2h(), line, direction, config.min_streak)
    } else {
        None
    };
    if let Some(streak) = h2h {
        outcome = ContextOutcome {
            context: TrendContext::HeadToHead,
            streak,
        };
    }

    if !config.trend_types.is_empty() {
        let satisfied = config.trend_types.iter().any(|t| match t {
            TrendContext::RecentForm => true,
            TrendContext::HomeAway => home_away.is_some(),
            TrendContext::HeadToHead => h2h.is_some(),
        });
        if !satisfied {
            return None;
        }
    }

    Some(outcome)
}

/// Human-readable label for a trend, e.g. `"Over in last 5 games vs BOS"`.
pub fn trend_label(
    direction: Direction,
    context: TrendContext,
    streak_len: usize,
    opponent: &str,
    is_home: bool,
) -> String {
    let word = direction.label_word();
    match context {
        TrendContext::RecentForm => format!("{} in last {} games", word, streak_len),
        TrendContext::HeadToHead => {
            format!("{} in last {} games vs {}", word, streak_len, opponent)
        }
        TrendContext::HomeAway => {
            let venue = if is_home { "home" } else { "away" };
            format!("{} in last {} {} games", word, streak_len, venue)
        }
    }
}

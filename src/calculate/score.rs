//! Trend scoring.

/// Combine hit rate and streak length into a bounded score.
///
/// `score = hit_rate * 0.6 + (consecutive_hits / window) * 40`, capped at
/// 100. The pipeline invokes this with `window` equal to the streak length
/// itself, and only perfect streaks reach it, so every emitted trend
/// currently scores exactly 100. That degenerate behavior is intentional
/// and kept as-is; the formula shape is retained so a fixed window could
/// be swapped in later.
pub fn trend_score(hit_rate: f64, consecutive_hits: usize, window: usize) -> f64 {
    if window == 0 {
        return 0.0;
    }
    let streak_share = consecutive_hits as f64 / window as f64;
    (hit_rate * 0.6 + streak_share * 40.0).min(100.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_degenerate_case_scores_exactly_100() {
        // window == streak and a perfect hit rate: the emitted-trend case
        for hits in [3, 5, 12] {
            assert_eq!(trend_score(100.0, hits, hits), 100.0);
        }
    }

    #[test]
    fn test_capped_at_100() {
        assert_eq!(trend_score(100.0, 10, 5), 100.0);
    }

    #[test]
    fn test_partial_window() {
        // 60% hit rate over a 10-game window with a 4-game streak
        let score = trend_score(60.0, 4, 10);
        assert!((score - 52.0).abs() < 1e-9);
    }

    #[test]
    fn test_zero_window() {
        assert_eq!(trend_score(100.0, 0, 0), 0.0);
    }
}

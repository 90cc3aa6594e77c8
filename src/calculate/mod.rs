//! Numeric pieces of the trend pipeline.
//!
//! Everything here is pure and synchronous:
//! - line derivation from a season average or ensemble prediction
//! - consecutive-streak scanning over a historical series
//! - trend scoring
//! - ensemble averaging of per-model predictions

mod ensemble;
mod line;
mod score;
mod streak;

pub use ensemble::*;
pub use line::*;
pub use score::*;
pub use streak::*;

/// Round to the nearest multiple of 0.5.
pub fn round_to_half(value: f64) -> f64 {
    (value * 2.0).round() / 2.0
}

/// Round down to a multiple of 0.5.
pub fn floor_to_half(value: f64) -> f64 {
    (value * 2.0).floor() / 2.0
}

/// Round up to a multiple of 0.5.
pub fn ceil_to_half(value: f64) -> f64 {
    (value * 2.0).ceil() / 2.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_to_half() {
        assert_eq!(round_to_half(24.3), 24.5);
        assert_eq!(round_to_half(24.2), 24.0);
        assert_eq!(round_to_half(24.75), 25.0);
        assert_eq!(round_to_half(0.0), 0.0);
    }

    #[test]
    fn test_floor_to_half() {
        assert_eq!(floor_to_half(24.9), 24.5);
        assert_eq!(floor_to_half(24.4), 24.0);
        assert_eq!(floor_to_half(24.5), 24.5);
    }

    #[test]
    fn test_ceil_to_half() {
        assert_eq!(ceil_to_half(24.1), 24.5);
        assert_eq!(ceil_to_half(24.6), 25.0);
        assert_eq!(ceil_to_half(24.5), 24.5);
    }
}

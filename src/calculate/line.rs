//! Line derivation.

use super::{ceil_to_half, floor_to_half, round_to_half};
use crate::config::{LineAdjustment, LineMethod, TrendFilterConfig};
use crate::models::{Direction, StatType};

/// Lines never drop below half a unit.
const LINE_FLOOR: f64 = 0.5;

/// Derive the line for one (player, stat, direction) combination.
///
/// Returns `None` when the configured method needs an ensemble prediction
/// and none exists; that combination is excluded, not defaulted to zero.
///
/// Under `Standard` adjustment the unbuffered base is rounded to the
/// nearest 0.5. Under `Favorable`/`Custom` the buffer is subtracted for
/// overs and added for unders, and the rounding itself leans the same way:
/// floor for overs, ceil for unders, so the requested direction is easier
/// to satisfy.
pub fn calculate_line(
    season_avg: f64,
    ai_prediction: Option<f64>,
    stat: StatType,
    direction: Direction,
    config: &TrendFilterConfig,
) -> Option<f64> {
    let base = match config.line_method {
        LineMethod::PlayerAverage => season_avg,
        LineMethod::AiPrediction => ai_prediction?,
    };

    let line = match config.line_adjustment {
        LineAdjustment::Standard => round_to_half(base),
        LineAdjustment::Favorable | LineAdjustment::Custom => {
            let buffer = match config.line_adjustment {
                LineAdjustment::Favorable => stat.favorable_buffer(),
                _ => config.custom_buffer(stat),
            };
            let adjusted = match direction {
                Direction::Over => base - buffer,
                Direction::Under => base + buffer,
            };
            match direction {
                Direction::Over => floor_to_half(adjusted),
                Direction::Under => ceil_to_half(adjusted),
            }
        }
    };

    Some(line.max(LINE_FLOOR))
}

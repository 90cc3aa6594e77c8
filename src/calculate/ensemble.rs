//! Ensemble averaging of per-model predictions.

use crate::models::{EnsemblePrediction, PredictionModel, PredictionRow, StatValues};

/// Average the rows contributed by the selected models.
///
/// Rows from unselected models are ignored. When nothing contributes the
/// result is `None`; callers must exclude the player, never treat the
/// absence as a zero prediction.
pub fn aggregate_predictions(
    rows: &[PredictionRow],
    selected: &[PredictionModel],
) -> Option<EnsemblePrediction> {
    let contributing: Vec<&PredictionRow> = rows
        .iter()
        .filter(|row| selected.contains(&row.model))
        .collect();

    if contributing.is_empty() {
        return None;
    }

    let count = contributing.len();
    let sum = contributing
        .iter()
        .fold(StatValues::default(), |acc, row| acc.add(&row.values));
    let confidence_sum: f64 = contributing.iter().map(|row| row.confidence).sum();

    Some(EnsemblePrediction {
        values: sum.scale_down(count as f64),
        confidence: confidence_sum / count as f64,
        model_count: count,
    })
}

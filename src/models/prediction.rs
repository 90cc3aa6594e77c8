//! Model predictions and their ensemble average.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::{GameId, PlayerId, StatValues};

/// The fixed catalog of prediction models available in the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PredictionModel {
    Ridge,
    Forest,
    Neural,
    Bayes,
}

impl PredictionModel {
    pub const ALL: [PredictionModel; 4] = [
        PredictionModel::Ridge,
        PredictionModel::Forest,
        PredictionModel::Neural,
        PredictionModel::Bayes,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PredictionModel::Ridge => "ridge",
            PredictionModel::Forest => "forest",
            PredictionModel::Neural => "neural",
            PredictionModel::Bayes => "bayes",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        PredictionModel::ALL.into_iter().find(|m| m.as_str() == s)
    }
}

impl fmt::Display for PredictionModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One model's forecast for one player in one upcoming game.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictionRow {
    pub player_id: PlayerId,
    pub game_id: GameId,
    pub model: PredictionModel,
    pub values: StatValues,
    pub confidence: f64,
}

/// Arithmetic mean over the selected models' forecasts.
///
/// Absence of contributing rows is represented by the absence of this
/// struct, never by zeroed values.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnsemblePrediction {
    pub values: StatValues,
    pub confidence: f64,
    pub model_count: usize,
}

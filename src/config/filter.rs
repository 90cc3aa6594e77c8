//! Per-query trend filter configuration.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::models::{Direction, StatType, TrendContext};

/// Which stats a query evaluates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatSelector {
    #[default]
    All,
    Single(StatType),
}

impl StatSelector {
    /// The stat types to evaluate, in enumeration order.
    pub fn stat_types(&self) -> Vec<StatType> {
        match self {
            StatSelector::All => StatType::ALL.to_vec(),
            StatSelector::Single(stat) => vec![*stat],
        }
    }
}

/// Which directions a query evaluates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DirectionFilter {
    Over,
    Under,
    #[default]
    Both,
}

impl DirectionFilter {
    /// Over before under, matching the enumeration order of the pipeline.
    pub fn directions(&self) -> Vec<Direction> {
        match self {
            DirectionFilter::Over => vec![Direction::Over],
            DirectionFilter::Under => vec![Direction::Under],
            DirectionFilter::Both => vec![Direction::Over, Direction::Under],
        }
    }
}

/// How the base value for a line is chosen.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LineMethod {
    #[default]
    PlayerAverage,
    AiPrediction,
}

/// How the base value is adjusted and rounded into a line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineAdjustment {
    #[default]
    Standard,
    Favorable,
    Custom,
}

/// Smallest streak length the UI offers.
pub const MIN_STREAK_FLOOR: usize = 3;

fn default_min_streak() -> usize {
    MIN_STREAK_FLOOR
}

/// User-supplied filters for one trend query.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrendFilterConfig {
    #[serde(default)]
    pub stats: StatSelector,

    #[serde(default)]
    pub direction: DirectionFilter,

    /// Contexts the caller wants trends for; empty means all.
    #[serde(default)]
    pub trend_types: Vec<TrendContext>,

    #[serde(default = "default_min_streak")]
    pub min_streak: usize,

    #[serde(default)]
    pub line_method: LineMethod,

    #[serde(default)]
    pub line_adjustment: LineAdjustment,

    /// Per-stat buffer overrides, only consulted under `Custom` adjustment.
    #[serde(default)]
    pub custom_buffers: HashMap<StatType, f64>,

    /// Keep only trends where the ensemble prediction agrees with the
    /// requested direction.
    #[serde(default)]
    pub require_ai_agreement: bool,

    /// Case-insensitive substring match on the player's full name.
    #[serde(default)]
    pub player_name: Option<String>,

    /// Exact team abbreviation.
    #[serde(default)]
    pub team: Option<String>,

    /// Exact opponent abbreviation.
    #[serde(default)]
    pub opponent: Option<String>,
}

impl Default for TrendFilterConfig {
    fn default() -> Self {
        Self {
            stats: StatSelector::default(),
            direction: DirectionFilter::default(),
            trend_types: Vec::new(),
            min_streak: default_min_streak(),
            line_method: LineMethod::default(),
            line_adjustment: LineAdjustment::default(),
            custom_buffers: HashMap::new(),
            require_ai_agreement: false,
            player_name: None,
            team: None,
            opponent: None,
        }
    }
}

impl TrendFilterConfig {
    /// Whether a context must be evaluated for this query.
    pub fn wants_context(&self, context: TrendContext) -> bool {
        self.trend_types.is_empty() || self.trend_types.contains(&context)
    }

    /// Buffer for a stat under `Custom` adjustment (0 when unspecified).
    pub fn custom_buffer(&self, stat: StatType) -> f64 {
        self.custom_buffers.get(&stat).copied().unwrap_or(0.0)
    }
}

/// Parse "points:2.5,assists:1.0" into per-stat buffer overrides.
///
/// Shared by the HTTP query layer and the CLI; each caller wraps the error
/// string in its own error type.
pub fn parse_buffer_list(s: &str) -> Result<HashMap<StatType, f64>, String> {
    let mut buffers = HashMap::new();
    for pair in s.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        let (name, value) = pair
            .split_once(':')
            .ok_or_else(|| format!("Malformed buffer: {}", pair))?;
        let stat = StatType::parse(name.trim())
            .ok_or_else(|| format!("Unknown stat: {}", name))?;
        let value: f64 = value
            .trim()
            .parse()
            .map_err(|_| format!("Malformed buffer value: {}", value))?;
        buffers.insert(stat, value);
    }
    Ok(buffers)
}

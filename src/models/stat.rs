//! Tracked statistics and per-game stat values.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A statistic a line can be set on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatType {
    Points,
    Rebounds,
    Assists,
    Steals,
    Blocks,
    Turnovers,
    ThreePointersMade,
}

impl StatType {
    /// All stat types in canonical order. This order is also the outer
    /// enumeration order when a query asks for every stat.
    pub const ALL: [StatType; 7] = [
        StatType::Points,
        StatType::Rebounds,
        StatType::Assists,
        StatType::Steals,
        StatType::Blocks,
        StatType::Turnovers,
        StatType::ThreePointersMade,
    ];

    /// Storage column name for this stat.
    pub fn column(&self) -> &'static str {
        match self {
            StatType::Points => "points",
            StatType::Rebounds => "rebounds",
            StatType::Assists => "assists",
            StatType::Steals => "steals",
            StatType::Blocks => "blocks",
            StatType::Turnovers => "turnovers",
            StatType::ThreePointersMade => "three_pointers_made",
        }
    }

    /// Buffer applied under the `favorable` line adjustment.
    pub fn favorable_buffer(&self) -> f64 {
        match self {
            StatType::Points => 2.0,
            StatType::Rebounds | StatType::Assists => 1.0,
            StatType::Steals
            | StatType::Blocks
            | StatType::Turnovers
            | StatType::ThreePointersMade => 0.5,
        }
    }

    /// Read this stat out of a set of per-game values.
    pub fn value_of(&self, values: &StatValues) -> f64 {
        match self {
            StatType::Points => values.points,
            StatType::Rebounds => values.rebounds,
            StatType::Assists => values.assists,
            StatType::Steals => values.steals,
            StatType::Blocks => values.blocks,
            StatType::Turnovers => values.turnovers,
            StatType::ThreePointersMade => values.three_pointers_made,
        }
    }

    /// Short display name (e.g. "PTS"), used in trend labels.
    pub fn abbrev(&self) -> &'static str {
        match self {
            StatType::Points => "PTS",
            StatType::Rebounds => "REB",
            StatType::Assists => "AST",
            StatType::Steals => "STL",
            StatType::Blocks => "BLK",
            StatType::Turnovers => "TOV",
            StatType::ThreePointersMade => "3PM",
        }
    }

    /// Parse from the storage column name.
    pub fn parse(s: &str) -> Option<Self> {
        StatType::ALL.into_iter().find(|t| t.column() == s)
    }
}

impl fmt::Display for StatType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.column())
    }
}

/// The tracked figures for one player in one game (or one prediction).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct StatValues {
    #[serde(default)]
    pub points: f64,
    #[serde(default)]
    pub rebounds: f64,
    #[serde(default)]
    pub assists: f64,
    #[serde(default)]
    pub steals: f64,
    #[serde(default)]
    pub blocks: f64,
    #[serde(default)]
    pub turnovers: f64,
    #[serde(default)]
    pub three_pointers_made: f64,
}

impl StatValues {
    /// Component-wise sum, used when averaging model outputs.
    pub fn add(&self, other: &StatValues) -> StatValues {
        StatValues {
            points: self.points + other.points,
            rebounds: self.rebounds + other.rebounds,
            assists: self.assists + other.assists,
            steals: self.steals + other.steals,
            blocks: self.blocks + other.blocks,
            turnovers: self.turnovers + other.turnovers,
            three_pointers_made: self.three_pointers_made + other.three_pointers_made,
        }
    }

    /// Component-wise division by a count.
    pub fn scale_down(&self, divisor: f64) -> StatValues {
        StatValues {
            points: self.points / divisor,
            rebounds: self.rebounds / divisor,
            assists: self.assists / divisor,
            steals: self.steals / divisor,
            blocks: self.blocks / divisor,
            turnovers: self.turnovers / divisor,
            three_pointers_made: self.three_pointers_made / divisor,
        }
    }
}

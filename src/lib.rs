//! # Prop Trends
//!
//! Trend detection and line calculation for player prop statistics.
//!
//! ## Architecture
//!
//! - **models**: Core data structures (games, players, stats, trends)
//! - **loader**: Read interface onto the hosted store (REST or snapshot)
//! - **calculate**: Pure numerics (lines, streaks, ensembles, scores)
//! - **engine**: The query pipeline (slate, series, contexts, ranking)
//! - **api**: REST API endpoints
//! - **config**: Configuration loading and validation

pub mod api;
pub mod calculate;
pub mod config;
pub mod engine;
pub mod loader;
pub mod models;

pub use models::*;

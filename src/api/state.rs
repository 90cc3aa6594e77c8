use std::sync::Arc;

use crate::engine::TrendEngine;
use crate::loader::{BatchLimits, DataLoader};

#[derive(Clone)]
pub struct AppState {
    pub loader: Arc<dyn DataLoader>,
    pub limits: BatchLimits,
}

impl AppState {
    pub fn engine(&self) -> TrendEngine {
        TrendEngine::with_limits(self.loader.clone(), self.limits)
    }
}

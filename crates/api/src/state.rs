//! Application state

use podium_engine::{Engine, ScoreService};

#[derive(Clone)]
pub struct AppState {
    service: ScoreService,
}

impl AppState {
    pub fn new(engine: &Engine) -> Self {
        Self { service: ScoreService::new(engine.manager()) }
    }

    pub fn service(&self) -> &ScoreService {
        &self.service
    }
}

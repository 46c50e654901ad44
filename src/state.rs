// src/state.rs

use std::sync::Arc;

use axum::extract::FromRef;

use crate::{
    config::{Config, LessonCatalog},
    store::Store,
    utils::clock::Clock,
};

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub config: Config,
    pub catalog: Arc<LessonCatalog>,
    pub clock: Arc<dyn Clock>,
}

impl FromRef<AppState> for Config {
    fn from_ref(state: &AppState) -> Self {
        state.config.clone()
    }
}

// src/state.rs

use std::sync::Arc;

use axum::extract::FromRef;

use crate::{config::Config, llm::LlmProvider, repository::Repository, services::tutor::Tutor};

pub type SharedRepository = Arc<dyn Repository>;

#[derive(Clone)]
pub struct AppState {
    pub repo: SharedRepository,
    pub tutor: Tutor,
    pub config: Config,
}

impl AppState {
    /// Wires the tutor to the same repository the handlers use.
    pub fn new(repo: SharedRepository, llm: Arc<dyn LlmProvider>, config: Config) -> Self {
        let tutor = Tutor::new(llm, repo.clone(), &config.llm);
        Self {
            repo,
            tutor,
            config,
        }
    }
}

impl FromRef<AppState> for SharedRepository {
    fn from_ref(state: &AppState) -> Self {
        state.repo.clone()
    }
}

impl FromRef<AppState> for Tutor {
    fn from_ref(state: &AppState) -> Self {
        state.tutor.clone()
    }
}

impl FromRef<AppState> for Config {
    fn from_ref(state: &AppState) -> Self {
        state.config.clone()
    }
}

use crate::modules::scores::core::score_table::ScoreTable;
use crate::modules::scores::use_cases::get_scores::handler::GetScoresHandler;
use crate::modules::scores::use_cases::submit_votes::backoff::{RetryPolicy, Sleeper, TokioSleeper};
use crate::modules::scores::use_cases::submit_votes::coordinator::RetryCoordinator;
use crate::shared::infrastructure::versioned_store::VersionedStore;
use crate::shared::infrastructure::versioned_store::in_memory::InMemoryVersionedStore;
use crate::shared::infrastructure::versioned_store::json_file::JsonFileVersionedStore;
use crate::shell::config::{AppConfig, StoreBackend};
use std::sync::Arc;
use std::time::Duration;

pub type ScoreStore = dyn VersionedStore<ScoreTable>;

#[derive(Clone)]
pub struct AppState {
    pub scores: Arc<GetScoresHandler<ScoreStore>>,
    pub coordinator: Arc<RetryCoordinator<ScoreStore, dyn Sleeper>>,
    pub request_deadline: Option<Duration>,
}

impl AppState {
    pub fn new(
        store: Arc<ScoreStore>,
        sleeper: Arc<dyn Sleeper>,
        policy: RetryPolicy,
        request_deadline: Option<Duration>,
    ) -> Self {
        Self {
            scores: Arc::new(GetScoresHandler::new(store.clone())),
            coordinator: Arc::new(RetryCoordinator::new(store, sleeper, policy)),
            request_deadline,
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        let store: Arc<ScoreStore> = match &config.store {
            StoreBackend::Memory => Arc::new(InMemoryVersionedStore::<ScoreTable>::new()),
            StoreBackend::File(path) => Arc::new(JsonFileVersionedStore::<ScoreTable>::new(path)),
        };
        Self::new(
            store,
            Arc::new(TokioSleeper),
            config.retry,
            config.request_deadline,
        )
    }
}

use std::sync::Arc;

use crate::errors::{AppError, AppResult};
use crate::models::Statistics;
use crate::repositories::KeyValueStore;

const STATS_KEY: &str = "med_quiz_stats";

pub struct StatisticsRepository {
    store: Arc<dyn KeyValueStore>,
}

impl StatisticsRepository {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Loads the aggregate, initializing an empty one when nothing has been
    /// recorded yet.
    pub fn get(&self) -> AppResult<Statistics> {
        match self.store.get(STATS_KEY)? {
            Some(bytes) => serde_json::from_slice(&bytes).map_err(|err| {
                AppError::StorageError(format!("corrupt statistics blob: {}", err))
            }),
            None => Ok(Statistics::default()),
        }
    }

    pub fn put(&self, statistics: &Statistics) -> AppResult<()> {
        let bytes = serde_json::to_vec(statistics)
            .map_err(|err| AppError::InternalError(format!("serialize statistics: {}", err)))?;
        self.store.set(STATS_KEY, &bytes)
    }
}

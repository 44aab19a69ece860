use std::sync::Arc;

use crate::config::Config;
use crate::repositories::{
    BookmarkRepository, KeyValueStore, SavedQuizRepository, StatisticsRepository,
};
use crate::services::StatisticsService;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub saved_quizzes: Arc<SavedQuizRepository>,
    pub bookmarks: Arc<BookmarkRepository>,
    pub statistics: Arc<StatisticsService>,
}

impl AppState {
    pub fn new(config: Config, store: Arc<dyn KeyValueStore>) -> Self {
        let saved_quizzes = Arc::new(SavedQuizRepository::new(store.clone()));
        let bookmarks = Arc::new(BookmarkRepository::new(store.clone()));
        let statistics_repository = Arc::new(StatisticsRepository::new(store));
        let statistics = Arc::new(StatisticsService::new(statistics_repository));

        Self {
            config: Arc::new(config),
            saved_quizzes,
            bookmarks,
            statistics,
        }
    }
}

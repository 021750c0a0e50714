//! Application state shared by all requests

use crate::{store::SqliteCourseStore, WebConfig};
use coursegate_core::{CourseStore, GateResult};
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::info;

/// Application state
///
/// The course store is connected on first use and then reused for the life
/// of the process. Concurrent first requests wait on the same
/// initialization; a failed attempt leaves the cell empty so the next request
/// tries again.
#[derive(Clone)]
pub struct AppState {
    /// Configuration
    pub config: WebConfig,
    store: Arc<OnceCell<Arc<dyn CourseStore>>>,
}

impl AppState {
    /// Create state that connects lazily using `config.store`
    pub fn new(config: WebConfig) -> Self {
        Self {
            config,
            store: Arc::new(OnceCell::new()),
        }
    }

    /// Create state around an already available store
    pub fn with_store(config: WebConfig, store: Arc<dyn CourseStore>) -> Self {
        Self {
            config,
            store: Arc::new(OnceCell::new_with(Some(store))),
        }
    }

    /// Whether a lookup can be attempted at all
    pub fn store_configured(&self) -> bool {
        self.store.initialized() || self.config.store.is_configured()
    }

    /// Get the course store, connecting on first call
    pub async fn course_store(&self) -> GateResult<Arc<dyn CourseStore>> {
        let store = self
            .store
            .get_or_try_init(|| async {
                let store = SqliteCourseStore::open(&self.config.store).await?;
                info!("Course store initialized ({})", store.backend());
                Ok::<_, coursegate_core::GateError>(Arc::new(store) as Arc<dyn CourseStore>)
            })
            .await?;

        Ok(Arc::clone(store))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{MemoryCourseStore, StoreConfig};
    use coursegate_core::CourseRecord;

    #[test]
    fn test_unconfigured_state() {
        let state = AppState::new(WebConfig::default());
        assert!(!state.store_configured());
    }

    #[tokio::test]
    async fn test_injected_store_is_used() {
        let store = MemoryCourseStore::new([CourseRecord::new("CP104", "/cp104/")]);
        let state = AppState::with_store(WebConfig::default(), Arc::new(store));

        assert!(state.store_configured());
        let store = state.course_store().await.unwrap();
        assert_eq!(store.backend(), "memory");
    }

    #[tokio::test]
    async fn test_failed_init_is_retried() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("late.db");
        let config = WebConfig {
            store: StoreConfig::with_url(format!("sqlite://{}", path.display())),
            ..WebConfig::default()
        };
        let state = AppState::new(config.clone());

        assert!(state.course_store().await.is_err());

        crate::store::SqliteCourseStore::create(&config.store)
            .await
            .unwrap();

        let first = state.course_store().await.unwrap();
        let second = state.clone().course_store().await.unwrap();
        assert!(Arc::ptr_eq(&first, &second));
    }
}

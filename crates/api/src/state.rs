use std::sync::Arc;

use ipa_db::RecordStore;
use tokio::sync::Mutex;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc`).
#[derive(Clone)]
pub struct AppState {
    /// The record store, constructed once at startup.
    pub store: Arc<dyn RecordStore>,
    pub config: Arc<ServerConfig>,
    /// Held for the duration of a promotion run. At most one run per process.
    pub promotion_lock: Arc<Mutex<()>>,
}

impl AppState {
    pub fn new(store: Arc<dyn RecordStore>, config: ServerConfig) -> Self {
        Self {
            store,
            config: Arc::new(config),
            promotion_lock: Arc::new(Mutex::new(())),
        }
    }

    /// Borrow the store as a trait object for repository calls.
    pub fn store(&self) -> &dyn RecordStore {
        self.store.as_ref()
    }
}

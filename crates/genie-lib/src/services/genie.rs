// Genie Service
//
// Entry point wiring configuration, the dashboard store and the
// per-conversation canvas sessions together.

use std::path::Path;
use std::time::Duration;

use crate::services::active_dashboard::ActiveDashboardService;
use crate::services::conversation::ConversationSessions;
use crate::services::dashboard_index::DashboardWatcher;
use crate::services::dashboard_store::{create_store, DashboardResult, SharedDashboardStore};
use crate::utils::config::GenieConfig;

pub struct GenieService {
    config: GenieConfig,
    store: SharedDashboardStore,
    sessions: ConversationSessions,
}

impl GenieService {
    /// Build from a validated config, creating the configured store backend
    pub fn from_config(config: GenieConfig) -> DashboardResult<Self> {
        config.validate()?;
        let store = create_store(&config.store)?;
        log::info!(
            "Genie using {} dashboard store in namespace {}",
            store.name(),
            config.namespace
        );
        Ok(Self::with_store(config, store))
    }

    /// Load config (file, env) and build
    pub fn load(path: Option<&Path>) -> DashboardResult<Self> {
        Self::from_config(GenieConfig::load(path)?)
    }

    /// Build around an existing store
    pub fn with_store(config: GenieConfig, store: SharedDashboardStore) -> Self {
        Self {
            config,
            store,
            sessions: ConversationSessions::new(),
        }
    }

    pub fn config(&self) -> &GenieConfig {
        &self.config
    }

    pub fn store(&self) -> SharedDashboardStore {
        self.store.clone()
    }

    pub fn sessions(&self) -> &ConversationSessions {
        &self.sessions
    }

    /// Active-dashboard operations for a conversation
    pub async fn session(&self, conversation_id: &str) -> ActiveDashboardService {
        let canvas = self.sessions.get_or_create(conversation_id).await;
        ActiveDashboardService::new(canvas, self.store.clone(), self.config.namespace.clone())
    }

    /// Forget a conversation's canvas state
    pub async fn close_session(&self, conversation_id: &str) -> bool {
        self.sessions.remove(conversation_id).await.is_some()
    }

    /// Start watching the configured namespace. Must be called inside a tokio runtime.
    pub fn watch_dashboards(&self) -> DashboardWatcher {
        DashboardWatcher::spawn(
            self.store.clone(),
            self.config.namespace.clone(),
            Duration::from_secs(self.config.watch.interval_secs),
        )
    }
}

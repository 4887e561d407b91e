// Dashboard Store Module
//
// Remote resource store for AladdinDashboard resources.
// The active-dashboard state machine persists through this trait and the
// dashboard watcher lists through it; backends are chosen from configuration.

pub mod error;
pub mod kube;
pub mod memory;

use std::sync::Arc;

use async_trait::async_trait;

pub use error::{DashboardError, DashboardErrorCode, DashboardResult};
pub use kube::KubeDashboardStore;
pub use memory::MemoryDashboardStore;

use crate::models::dashboard::{AladdinDashboard, AladdinDashboardSpec};
use crate::utils::config::{StoreBackend, StoreConfig};

/// Trait for dashboard resource stores
#[async_trait]
pub trait DashboardStore: Send + Sync {
    /// Get the backend name
    fn name(&self) -> &str;

    /// Create a dashboard; the returned copy carries server-assigned metadata
    async fn create(
        &self,
        name: &str,
        namespace: &str,
        spec: AladdinDashboardSpec,
    ) -> DashboardResult<AladdinDashboard>;

    /// Fetch one dashboard
    async fn get(&self, name: &str, namespace: &str) -> DashboardResult<AladdinDashboard>;

    /// Replace an existing dashboard. A `resourceVersion` on the input must match
    /// the stored one.
    async fn update(&self, dashboard: &AladdinDashboard) -> DashboardResult<AladdinDashboard>;

    /// Delete a dashboard
    async fn delete(&self, dashboard: &AladdinDashboard) -> DashboardResult<()>;

    /// All dashboards in a namespace
    async fn list(&self, namespace: &str) -> DashboardResult<Vec<AladdinDashboard>>;
}

/// Shared dashboard store handle
pub type SharedDashboardStore = Arc<dyn DashboardStore>;

/// Factory function to create a dashboard store from config
pub fn create_store(config: &StoreConfig) -> DashboardResult<SharedDashboardStore> {
    match config.backend {
        StoreBackend::Memory => Ok(Arc::new(MemoryDashboardStore::new())),
        StoreBackend::Kubernetes => {
            if config.endpoint.trim().is_empty() {
                return Err(DashboardError::InvalidConfig(
                    "Kubernetes store requires an API endpoint".to_string(),
                ));
            }
            Ok(Arc::new(KubeDashboardStore::new(config)?))
        }
    }
}

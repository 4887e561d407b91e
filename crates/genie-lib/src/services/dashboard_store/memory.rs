// In-Memory Dashboard Store
//
// Process-local store with the same semantics as the cluster API:
// server-assigned uid/resourceVersion/creationTimestamp, AlreadyExists on
// duplicate create, optimistic concurrency on update.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{DashboardError, DashboardResult, DashboardStore};
use crate::models::dashboard::{AladdinDashboard, AladdinDashboardSpec};

type ResourceKey = (String, String);

fn key(namespace: &str, name: &str) -> ResourceKey {
    (namespace.to_string(), name.to_string())
}

/// In-memory dashboard store
pub struct MemoryDashboardStore {
    /// (namespace, name) -> dashboard
    dashboards: RwLock<BTreeMap<ResourceKey, AladdinDashboard>>,
    next_version: AtomicU64,
}

impl MemoryDashboardStore {
    pub fn new() -> Self {
        Self {
            dashboards: RwLock::new(BTreeMap::new()),
            next_version: AtomicU64::new(1),
        }
    }

    /// Store pre-populated with existing dashboards (metadata assigned as on create)
    pub async fn with_dashboards(dashboards: Vec<AladdinDashboard>) -> DashboardResult<Self> {
        let store = Self::new();
        for dashboard in dashboards {
            store
                .create(&dashboard.metadata.name, &dashboard.metadata.namespace, dashboard.spec)
                .await?;
        }
        Ok(store)
    }

    pub async fn len(&self) -> usize {
        self.dashboards.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.dashboards.read().await.is_empty()
    }

    fn bump_version(&self) -> String {
        self.next_version.fetch_add(1, Ordering::SeqCst).to_string()
    }
}

impl Default for MemoryDashboardStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DashboardStore for MemoryDashboardStore {
    fn name(&self) -> &str {
        "memory"
    }

    async fn create(
        &self,
        name: &str,
        namespace: &str,
        spec: AladdinDashboardSpec,
    ) -> DashboardResult<AladdinDashboard> {
        if name.is_empty() {
            return Err(DashboardError::InvalidName("name is required".to_string()));
        }

        let mut dashboards = self.dashboards.write().await;
        let resource_key = key(namespace, name);
        if dashboards.contains_key(&resource_key) {
            return Err(DashboardError::AlreadyExists(format!("{}/{}", namespace, name)));
        }

        let mut dashboard = AladdinDashboard::new(name, namespace, spec);
        dashboard.metadata.uid = Some(Uuid::new_v4().to_string());
        dashboard.metadata.resource_version = Some(self.bump_version());
        dashboard.metadata.creation_timestamp =
            Some(Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true));

        dashboards.insert(resource_key, dashboard.clone());
        log::info!("Dashboard created: {}/{}", namespace, name);
        Ok(dashboard)
    }

    async fn get(&self, name: &str, namespace: &str) -> DashboardResult<AladdinDashboard> {
        let dashboards = self.dashboards.read().await;
        dashboards
            .get(&key(namespace, name))
            .cloned()
            .ok_or_else(|| DashboardError::NotFound(format!("{}/{}", namespace, name)))
    }

    async fn update(&self, dashboard: &AladdinDashboard) -> DashboardResult<AladdinDashboard> {
        let mut dashboards = self.dashboards.write().await;
        let resource_key = key(dashboard.namespace(), dashboard.name());
        let Some(existing) = dashboards.get(&resource_key) else {
            return Err(DashboardError::NotFound(format!(
                "{}/{}",
                dashboard.namespace(),
                dashboard.name()
            )));
        };

        if let Some(version) = &dashboard.metadata.resource_version {
            if existing.metadata.resource_version.as_ref() != Some(version) {
                return Err(DashboardError::Conflict(format!(
                    "{}/{} is at version {}, update was based on {}",
                    dashboard.namespace(),
                    dashboard.name(),
                    existing.metadata.resource_version.as_deref().unwrap_or("?"),
                    version
                )));
            }
        }

        let mut updated = dashboard.clone();
        updated.metadata.uid = existing.metadata.uid.clone();
        updated.metadata.creation_timestamp = existing.metadata.creation_timestamp.clone();
        updated.metadata.resource_version = Some(self.bump_version());

        dashboards.insert(resource_key, updated.clone());
        log::info!("Dashboard updated: {}/{}", dashboard.namespace(), dashboard.name());
        Ok(updated)
    }

    async fn delete(&self, dashboard: &AladdinDashboard) -> DashboardResult<()> {
        let mut dashboards = self.dashboards.write().await;
        match dashboards.remove(&key(dashboard.namespace(), dashboard.name())) {
            Some(_) => {
                log::info!("Dashboard deleted: {}/{}", dashboard.namespace(), dashboard.name());
                Ok(())
            }
            None => Err(DashboardError::NotFound(format!(
                "{}/{}",
                dashboard.namespace(),
                dashboard.name()
            ))),
        }
    }

    async fn list(&self, namespace: &str) -> DashboardResult<Vec<AladdinDashboard>> {
        let dashboards = self.dashboards.read().await;
        Ok(dashboards
            .iter()
            .filter(|((ns, _), _)| ns == namespace)
            .map(|(_, d)| d.clone())
            .collect())
    }
}

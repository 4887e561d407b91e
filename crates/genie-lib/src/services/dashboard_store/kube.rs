// Kubernetes Dashboard Store
//
// REST client for the AladdinDashboard custom resource:
// {endpoint}/apis/aladdin.openshift.io/v1alpha1/namespaces/{ns}/aladdindashboards[/{name}]

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use serde_json::Value;

use super::{DashboardError, DashboardResult, DashboardStore};
use crate::models::dashboard::{
    AladdinDashboard, AladdinDashboardSpec, DASHBOARD_API_GROUP, DASHBOARD_API_VERSION,
    DASHBOARD_PLURAL,
};
use crate::utils::config::StoreConfig;

/// Kubernetes-backed dashboard store
pub struct KubeDashboardStore {
    endpoint: String,
    token: Option<String>,
    client: Client,
}

/// Kubernetes list response; items are decoded one by one
#[derive(Debug, Deserialize)]
struct DashboardList {
    #[serde(default)]
    items: Option<Vec<Value>>,
}

impl DashboardList {
    /// Decodable items, skipping the ones that are not dashboards
    fn into_dashboards(self) -> Vec<AladdinDashboard> {
        self.items
            .unwrap_or_default()
            .into_iter()
            .filter_map(|item| match serde_json::from_value::<AladdinDashboard>(item) {
                Ok(dashboard) => Some(dashboard),
                Err(e) => {
                    log::warn!("Skipping undecodable dashboard in list: {}", e);
                    None
                }
            })
            .collect()
    }
}

/// Which HTTP 409 meaning applies to a request
#[derive(Debug, Clone, Copy)]
enum ConflictKind {
    Exists,
    Stale,
}

impl KubeDashboardStore {
    pub fn new(config: &StoreConfig) -> DashboardResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            endpoint: config.endpoint.clone(),
            token: config.token.clone().filter(|t| !t.is_empty()),
            client,
        })
    }

    fn collection_url(&self, namespace: &str) -> String {
        let base = self.endpoint.trim_end_matches('/');
        format!(
            "{}/apis/{}/{}/namespaces/{}/{}",
            base, DASHBOARD_API_GROUP, DASHBOARD_API_VERSION, namespace, DASHBOARD_PLURAL
        )
    }

    fn resource_url(&self, namespace: &str, name: &str) -> String {
        format!("{}/{}", self.collection_url(namespace), name)
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn send(&self, request: RequestBuilder) -> DashboardResult<Response> {
        self.authorized(request).send().await.map_err(|e| {
            if e.is_timeout() {
                DashboardError::Timeout
            } else if e.is_connect() {
                DashboardError::ConnectionFailed(format!(
                    "Cannot connect to Kubernetes API ({}): {}",
                    self.endpoint, e
                ))
            } else {
                DashboardError::ConnectionFailed(e.to_string())
            }
        })
    }
}

/// Map a non-success response to a DashboardError
async fn check_status(
    response: Response,
    resource: &str,
    conflict: ConflictKind,
) -> DashboardResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    Err(error_for_status(status, resource, conflict, body))
}

fn error_for_status(
    status: StatusCode,
    resource: &str,
    conflict: ConflictKind,
    body: String,
) -> DashboardError {
    match status {
        StatusCode::NOT_FOUND => DashboardError::NotFound(resource.to_string()),
        StatusCode::CONFLICT => match conflict {
            ConflictKind::Exists => DashboardError::AlreadyExists(resource.to_string()),
            ConflictKind::Stale => DashboardError::Conflict(resource.to_string()),
        },
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            DashboardError::Unauthorized(format!("{} ({})", resource, status))
        }
        _ => DashboardError::ApiError(format!("Kubernetes API error ({}): {}", status, body)),
    }
}

#[async_trait]
impl DashboardStore for KubeDashboardStore {
    fn name(&self) -> &str {
        "kubernetes"
    }

    async fn create(
        &self,
        name: &str,
        namespace: &str,
        spec: AladdinDashboardSpec,
    ) -> DashboardResult<AladdinDashboard> {
        let resource = AladdinDashboard::new(name, namespace, spec);
        let url = self.collection_url(namespace);
        log::debug!("Creating dashboard {}/{} at {}", namespace, name, url);

        let response = self.send(self.client.post(&url).json(&resource)).await?;
        let response =
            check_status(response, &format!("{}/{}", namespace, name), ConflictKind::Exists).await?;

        let created: AladdinDashboard = response.json().await?;
        log::info!("Dashboard created: {}/{}", namespace, name);
        Ok(created)
    }

    async fn get(&self, name: &str, namespace: &str) -> DashboardResult<AladdinDashboard> {
        let url = self.resource_url(namespace, name);
        let response = self.send(self.client.get(&url)).await?;
        let response =
            check_status(response, &format!("{}/{}", namespace, name), ConflictKind::Stale).await?;
        Ok(response.json().await?)
    }

    async fn update(&self, dashboard: &AladdinDashboard) -> DashboardResult<AladdinDashboard> {
        let resource = format!("{}/{}", dashboard.namespace(), dashboard.name());
        let url = self.resource_url(dashboard.namespace(), dashboard.name());
        log::debug!("Updating dashboard {} at {}", resource, url);

        let response = self.send(self.client.put(&url).json(dashboard)).await?;
        let response = check_status(response, &resource, ConflictKind::Stale).await?;

        let updated: AladdinDashboard = response.json().await?;
        log::info!("Dashboard updated: {}", resource);
        Ok(updated)
    }

    async fn delete(&self, dashboard: &AladdinDashboard) -> DashboardResult<()> {
        let resource = format!("{}/{}", dashboard.namespace(), dashboard.name());
        let url = self.resource_url(dashboard.namespace(), dashboard.name());

        let response = self.send(self.client.delete(&url)).await?;
        check_status(response, &resource, ConflictKind::Stale).await?;
        log::info!("Dashboard deleted: {}", resource);
        Ok(())
    }

    async fn list(&self, namespace: &str) -> DashboardResult<Vec<AladdinDashboard>> {
        let url = self.collection_url(namespace);
        let response = self.send(self.client.get(&url)).await?;
        let response = check_status(response, namespace, ConflictKind::Stale).await?;

        let list: DashboardList = response.json().await?;
        Ok(list.into_dashboards())
    }
}

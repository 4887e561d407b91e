// Dashboard data models
// AladdinDashboard custom resource as stored by the remote resource store.
// Field names and nesting are the wire contract with existing stored dashboards.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

// ============================================================================
// Resource Model Constants
// ============================================================================

pub const DASHBOARD_API_GROUP: &str = "aladdin.openshift.io";
pub const DASHBOARD_API_VERSION: &str = "v1alpha1";
pub const DASHBOARD_KIND: &str = "AladdinDashboard";
pub const DASHBOARD_PLURAL: &str = "aladdindashboards";

/// Namespace dashboards are created in when none is configured
pub const DEFAULT_DASHBOARD_NAMESPACE: &str = "default";

/// Grid width of a dashboard layout
pub const DEFAULT_LAYOUT_COLUMNS: u32 = 12;

/// `group/version` string used in `apiVersion`
pub fn dashboard_api_version() -> String {
    format!("{}/{}", DASHBOARD_API_GROUP, DASHBOARD_API_VERSION)
}

fn default_kind() -> String {
    DASHBOARD_KIND.to_string()
}

/// Treat an explicit `null` like a missing field
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

// ============================================================================
// Layout
// ============================================================================

/// Panel position in the grid layout
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PanelPosition {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl PanelPosition {
    /// First row below this panel
    pub fn bottom(&self) -> u32 {
        self.y.saturating_add(self.height)
    }
}

/// UI component kind rendered by a panel
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ComponentType {
    Chart,
    Table,
    Metric,
    Alert,
    Log,
    Resource,
    #[default]
    Custom,
}

/// UI component configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PanelComponent {
    #[serde(rename = "type", default, deserialize_with = "null_as_default")]
    pub component_type: ComponentType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub config: Map<String, Value>,
}

impl PanelComponent {
    /// `config.widgetId` when it is a non-empty string
    pub fn widget_id(&self) -> Option<&str> {
        self.config
            .get("widgetId")
            .and_then(Value::as_str)
            .filter(|id| !id.is_empty())
    }
}

/// Durable form of a successful tool call, persisted with the panel it produced
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolCall {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server: Option<String>,
    pub tool: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub arguments: Map<String, Value>,
    /// Kept only for UI-generating tools
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
}

/// Provenance of a panel
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PanelDataSource {
    #[serde(default, deserialize_with = "null_as_default")]
    pub tool_calls: Vec<ToolCall>,
}

/// Individual panel in a dashboard
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardPanel {
    #[serde(default, deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub position: PanelPosition,
    #[serde(default, deserialize_with = "null_as_default")]
    pub component: PanelComponent,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_source: Option<PanelDataSource>,
}

impl DashboardPanel {
    /// Persisted tool calls, empty when the panel has no data source
    pub fn tool_calls(&self) -> &[ToolCall] {
        self.data_source
            .as_ref()
            .map(|ds| ds.tool_calls.as_slice())
            .unwrap_or_default()
    }
}

/// Dashboard layout configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DashboardLayout {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub columns: Option<u32>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub panels: Vec<DashboardPanel>,
}

impl DashboardLayout {
    /// Empty layout on the default 12-column grid
    pub fn empty() -> Self {
        Self {
            columns: Some(DEFAULT_LAYOUT_COLUMNS),
            panels: Vec::new(),
        }
    }
}

// ============================================================================
// Resource
// ============================================================================

/// AladdinDashboard spec
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AladdinDashboardSpec {
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_interval: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub layout: DashboardLayout,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conversation_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
}

/// Object metadata; server-assigned fields are absent on drafts
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectMeta {
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub namespace: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creation_timestamp: Option<String>,
}

/// AladdinDashboard status
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStatus {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub observed_generation: Option<i64>,
}

/// Full AladdinDashboard resource
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AladdinDashboard {
    #[serde(default = "dashboard_api_version")]
    pub api_version: String,
    #[serde(default = "default_kind")]
    pub kind: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub metadata: ObjectMeta,
    #[serde(default, deserialize_with = "null_as_default")]
    pub spec: AladdinDashboardSpec,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<DashboardStatus>,
}

impl AladdinDashboard {
    /// Create a new (not yet persisted) dashboard resource object
    pub fn new(name: impl Into<String>, namespace: impl Into<String>, spec: AladdinDashboardSpec) -> Self {
        Self {
            api_version: dashboard_api_version(),
            kind: DASHBOARD_KIND.to_string(),
            metadata: ObjectMeta {
                name: name.into(),
                namespace: namespace.into(),
                ..ObjectMeta::default()
            },
            spec,
            status: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.metadata.name
    }

    pub fn namespace(&self) -> &str {
        &self.metadata.namespace
    }

    pub fn uid(&self) -> Option<&str> {
        self.metadata.uid.as_deref()
    }

    pub fn panels(&self) -> &[DashboardPanel] {
        &self.spec.layout.panels
    }

    /// Whether the store has assigned this dashboard a resource version
    pub fn is_persisted(&self) -> bool {
        self.metadata.resource_version.is_some()
    }

    /// Same `(namespace, name)` identity
    pub fn same_resource(&self, other: &AladdinDashboard) -> bool {
        self.metadata.namespace == other.metadata.namespace && self.metadata.name == other.metadata.name
    }
}

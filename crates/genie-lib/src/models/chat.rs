// Chat data models
// Tool-call events streamed by the AI backend and the artifacts derived from them

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

// ============================================================================
// Tool Call Events (from the AI backend)
// ============================================================================

/// Emitted when the AI backend begins invoking a tool
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolCallEvent {
    /// Unique per call within one message
    pub id: String,
    /// Tool name (may carry prefixes/suffixes, e.g. `mcp_generate_ui`)
    pub name: String,
    /// Tool parameters
    #[serde(default, alias = "args")]
    pub arguments: Map<String, Value>,
}

impl ToolCallEvent {
    pub fn new(id: impl Into<String>, name: impl Into<String>, arguments: Map<String, Value>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            arguments,
        }
    }
}

/// Final status reported by the backend for a completed tool call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolResultStatus {
    Success,
    Failure,
}

/// Emitted when a tool call completes; `id` correlates to a `ToolCallEvent`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolResultEvent {
    pub id: String,
    pub status: ToolResultStatus,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub round: i64,
}

impl ToolResultEvent {
    /// Create a success result
    pub fn success(id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            status: ToolResultStatus::Success,
            content: content.into(),
            round: 0,
        }
    }

    /// Create a failure result
    pub fn failure(id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            status: ToolResultStatus::Failure,
            content: content.into(),
            round: 0,
        }
    }
}

/// Backend envelope: `{"event": "tool_call", "data": {...}}`, or the bare payload
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum EventEnvelope<T> {
    Wrapped { data: T },
    Bare(T),
}

impl<T> EventEnvelope<T> {
    pub fn into_inner(self) -> T {
        match self {
            EventEnvelope::Wrapped { data } => data,
            EventEnvelope::Bare(data) => data,
        }
    }
}

/// One chunk of a streamed assistant message
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreamChunk {
    pub message_id: String,
    /// Raw tool call entries; partial argument tokens are mixed in with complete calls
    #[serde(default)]
    pub tool_calls: Vec<Value>,
    #[serde(default)]
    pub tool_results: Vec<Value>,
}

// ============================================================================
// Derived Tool Call State
// ============================================================================

/// Status of a tool call as presented to the UI
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolCallStatus {
    /// No matching result yet
    Running,
    Success,
    Failure,
}

impl From<ToolResultStatus> for ToolCallStatus {
    fn from(status: ToolResultStatus) -> Self {
        match status {
            ToolResultStatus::Success => ToolCallStatus::Success,
            ToolResultStatus::Failure => ToolCallStatus::Failure,
        }
    }
}

impl std::fmt::Display for ToolCallStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ToolCallStatus::Running => write!(f, "running"),
            ToolCallStatus::Success => write!(f, "success"),
            ToolCallStatus::Failure => write!(f, "failure"),
        }
    }
}

/// A tool call merged with its result (never persisted)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolCallState {
    pub id: String,
    pub name: String,
    pub status: ToolCallStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub arguments: Option<Map<String, Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub artifacts: Option<Vec<Artifact>>,
}

impl ToolCallState {
    pub fn is_running(&self) -> bool {
        self.status == ToolCallStatus::Running
    }
}

// ============================================================================
// Widgets
// ============================================================================

/// NGUI widget: a backend-defined rendering configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NguiWidget {
    pub id: String,
    #[serde(default)]
    pub spec: Map<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Renderable widget specification, tagged by `type`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Widget {
    Ngui(NguiWidget),
}

impl Widget {
    pub fn id(&self) -> &str {
        match self {
            Widget::Ngui(w) => &w.id,
        }
    }

    pub fn title(&self) -> Option<&str> {
        match self {
            Widget::Ngui(w) => w.title.as_deref(),
        }
    }

    pub fn spec(&self) -> &Map<String, Value> {
        match self {
            Widget::Ngui(w) => &w.spec,
        }
    }
}

// ============================================================================
// Artifacts
// ============================================================================

/// Widget created as a separate artifact and rendered in chat
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WidgetArtifact {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub widget: Widget,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardArtifact {
    pub id: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub widgets: Vec<Widget>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CodeArtifact {
    pub id: String,
    pub created_at: DateTime<Utc>,
}

/// Typed, renderable unit of AI-generated content
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Artifact {
    Widget(WidgetArtifact),
    Dashboard(DashboardArtifact),
    Code(CodeArtifact),
    /// Unknown artifact type; rendered as an inert placeholder
    #[serde(other)]
    Unsupported,
}

impl Artifact {
    /// Discriminant name, as used on the wire
    pub fn kind(&self) -> &'static str {
        match self {
            Artifact::Widget(_) => "widget",
            Artifact::Dashboard(_) => "dashboard",
            Artifact::Code(_) => "code",
            Artifact::Unsupported => "unsupported",
        }
    }

    pub fn id(&self) -> Option<&str> {
        match self {
            Artifact::Widget(a) => Some(&a.id),
            Artifact::Dashboard(a) => Some(&a.id),
            Artifact::Code(a) => Some(&a.id),
            Artifact::Unsupported => None,
        }
    }

    pub fn as_widget(&self) -> Option<&WidgetArtifact> {
        match self {
            Artifact::Widget(a) => Some(a),
            _ => None,
        }
    }
}

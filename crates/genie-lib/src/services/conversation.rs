// Canvas/Artifact Coordinator
//
// Per-conversation canvas visibility and the active artifact pointer.
// Holds no business rules: the active-dashboard service is the only writer
// of the artifact; leaf UI reads state and drives canvas visibility.

use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;
use tokio::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::models::canvas::{ActiveArtifact, CanvasState};
use crate::models::chat::CodeArtifact;
use crate::models::dashboard::AladdinDashboard;

/// Mutable canvas state of one conversation
#[derive(Debug, Default)]
pub(crate) struct CanvasInner {
    pub(crate) canvas_state: CanvasState,
    pub(crate) active_artifact: Option<ActiveArtifact>,
    pub(crate) is_dashboard_saved: bool,
    pub(crate) is_create_mode_enabled: bool,
    /// Bumped on every change of `active_artifact`
    pub(crate) revision: u64,
}

impl CanvasInner {
    pub(crate) fn set_active_artifact(&mut self, artifact: Option<ActiveArtifact>) {
        self.active_artifact = artifact;
        self.revision += 1;
    }

    pub(crate) fn active_dashboard(&self) -> Option<&AladdinDashboard> {
        self.active_artifact.as_ref().and_then(ActiveArtifact::as_dashboard)
    }

    fn snapshot(&self, conversation_id: &str) -> CanvasSnapshot {
        CanvasSnapshot {
            conversation_id: conversation_id.to_string(),
            canvas_state: self.canvas_state,
            is_canvas_open: self.canvas_state.is_open(),
            active_artifact: self.active_artifact.clone(),
            is_dashboard_saved: self.is_dashboard_saved,
            is_create_mode_enabled: self.is_create_mode_enabled,
        }
    }
}

/// Point-in-time view of a conversation's canvas, as read by the UI
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CanvasSnapshot {
    pub conversation_id: String,
    pub canvas_state: CanvasState,
    pub is_canvas_open: bool,
    pub active_artifact: Option<ActiveArtifact>,
    pub is_dashboard_saved: bool,
    pub is_create_mode_enabled: bool,
}

/// Handle to one conversation's canvas. Clones share state.
#[derive(Debug, Clone)]
pub struct ConversationCanvas {
    conversation_id: Arc<str>,
    state: Arc<RwLock<CanvasInner>>,
}

impl ConversationCanvas {
    pub fn new(conversation_id: impl Into<String>) -> Self {
        Self {
            conversation_id: Arc::from(conversation_id.into()),
            state: Arc::new(RwLock::new(CanvasInner::default())),
        }
    }

    pub fn conversation_id(&self) -> &str {
        &self.conversation_id
    }

    pub(crate) async fn read(&self) -> RwLockReadGuard<'_, CanvasInner> {
        self.state.read().await
    }

    pub(crate) async fn write(&self) -> RwLockWriteGuard<'_, CanvasInner> {
        self.state.write().await
    }

    pub async fn snapshot(&self) -> CanvasSnapshot {
        self.read().await.snapshot(&self.conversation_id)
    }

    // ------------------------------------------------------------------
    // Canvas visibility
    // ------------------------------------------------------------------

    pub async fn canvas_state(&self) -> CanvasState {
        self.read().await.canvas_state
    }

    pub async fn is_canvas_open(&self) -> bool {
        self.read().await.canvas_state.is_open()
    }

    pub async fn open_canvas(&self) {
        self.set_canvas_state(CanvasState::Open).await;
    }

    pub async fn close_canvas(&self) {
        self.set_canvas_state(CanvasState::Closed).await;
    }

    pub async fn maximize_canvas(&self) {
        self.set_canvas_state(CanvasState::Maximized).await;
    }

    /// Direct transition to any state
    pub async fn set_canvas_state(&self, canvas_state: CanvasState) {
        let mut inner = self.write().await;
        if inner.canvas_state != canvas_state {
            log::debug!(
                "Canvas {} -> {} for conversation {}",
                inner.canvas_state,
                canvas_state,
                self.conversation_id
            );
        }
        inner.canvas_state = canvas_state;
    }

    // ------------------------------------------------------------------
    // Artifact
    // ------------------------------------------------------------------

    pub async fn active_artifact(&self) -> Option<ActiveArtifact> {
        self.read().await.active_artifact.clone()
    }

    pub async fn is_dashboard_saved(&self) -> bool {
        self.read().await.is_dashboard_saved
    }

    /// Show a code artifact in the canvas
    pub async fn show_code_artifact(&self, artifact: CodeArtifact) {
        let mut inner = self.write().await;
        inner.set_active_artifact(Some(ActiveArtifact::Code(artifact)));
        inner.is_dashboard_saved = false;
        inner.canvas_state = CanvasState::Open;
    }

    // ------------------------------------------------------------------
    // Create mode
    // ------------------------------------------------------------------

    pub async fn is_create_mode_enabled(&self) -> bool {
        self.read().await.is_create_mode_enabled
    }

    pub async fn enable_create_mode(&self) {
        self.write().await.is_create_mode_enabled = true;
    }

    pub async fn disable_create_mode(&self) {
        self.write().await.is_create_mode_enabled = false;
    }

    /// Returns the new value
    pub async fn toggle_create_mode(&self) -> bool {
        let mut inner = self.write().await;
        inner.is_create_mode_enabled = !inner.is_create_mode_enabled;
        inner.is_create_mode_enabled
    }
}

// ============================================================================
// Session registry
// ============================================================================

/// Canvas state for every open conversation
#[derive(Debug, Clone, Default)]
pub struct ConversationSessions {
    /// conversation_id -> canvas
    sessions: Arc<RwLock<HashMap<String, ConversationCanvas>>>,
}

impl ConversationSessions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Existing canvas for the conversation, or a fresh closed one
    pub async fn get_or_create(&self, conversation_id: &str) -> ConversationCanvas {
        if let Some(canvas) = self.get(conversation_id).await {
            return canvas;
        }

        let mut sessions = self.sessions.write().await;
        sessions
            .entry(conversation_id.to_string())
            .or_insert_with(|| {
                log::debug!("Created canvas session for conversation {}", conversation_id);
                ConversationCanvas::new(conversation_id)
            })
            .clone()
    }

    pub async fn get(&self, conversation_id: &str) -> Option<ConversationCanvas> {
        self.sessions.read().await.get(conversation_id).cloned()
    }

    /// Drop a conversation's canvas (called when the conversation is closed)
    pub async fn remove(&self, conversation_id: &str) -> Option<ConversationCanvas> {
        self.sessions.write().await.remove(conversation_id)
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}

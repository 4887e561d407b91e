// Active-Dashboard State Machine
//
// Owns the dashboard draft shown in a conversation's canvas:
// create-if-absent, append panel, track saved status, persist.
//
// Save policy:
// - never-persisted drafts are created, persisted dashboards are updated
//   with their resourceVersion (stale versions surface as Conflict)
// - a save that resolves after a newer local edit keeps the edit and only
//   adopts the server metadata

use crate::models::canvas::CanvasState;
use crate::models::chat::{ToolCallState, ToolCallStatus, WidgetArtifact};
use crate::models::dashboard::{
    AladdinDashboard, AladdinDashboardSpec, ComponentType, DashboardLayout, DashboardPanel,
    PanelComponent, PanelDataSource, PanelPosition, ToolCall,
};
use crate::services::conversation::ConversationCanvas;
use crate::services::dashboard_store::{DashboardError, DashboardResult, SharedDashboardStore};
use crate::services::tool_results::is_generate_ui_tool;
use crate::utils::ids::{dashboard_name_from_title, generate_dashboard_name, generate_panel_id};

pub const UNTITLED_DASHBOARD_TITLE: &str = "Untitled Dashboard";
pub const FROM_CONVERSATION_DESCRIPTION: &str = "Dashboard created from conversation";
pub const FROM_SCRATCH_DESCRIPTION: &str = "Dashboard created from scratch";
pub const DEFAULT_PANEL_TITLE: &str = "Widget";
pub const DEFAULT_PANEL_WIDTH: u32 = 6;
pub const DEFAULT_PANEL_HEIGHT: u32 = 3;

// ============================================================================
// Pure helpers
// ============================================================================

/// Persisted form of the successful tool calls. Results are kept only for
/// UI-generating tools.
pub fn convert_tool_calls_for_persistence(tool_calls: &[ToolCallState]) -> Vec<ToolCall> {
    tool_calls
        .iter()
        .filter(|tc| tc.status == ToolCallStatus::Success)
        .map(|tc| ToolCall {
            id: tc.id.clone(),
            server: None,
            tool: tc.name.clone(),
            arguments: tc.arguments.clone().unwrap_or_default(),
            result: if is_generate_ui_tool(&tc.name) {
                tc.result.clone()
            } else {
                None
            },
            request_id: None,
        })
        .collect()
}

/// Position for a panel appended below every existing panel
pub fn next_panel_position(panels: &[DashboardPanel]) -> PanelPosition {
    let y = panels.iter().map(|p| p.position.bottom()).max().unwrap_or(0);
    PanelPosition {
        x: 0,
        y,
        width: DEFAULT_PANEL_WIDTH,
        height: DEFAULT_PANEL_HEIGHT,
    }
}

/// Local, unsaved dashboard for a conversation that has none yet
pub fn new_draft_dashboard(namespace: &str, conversation_id: &str) -> AladdinDashboard {
    AladdinDashboard::new(
        generate_dashboard_name(),
        namespace,
        AladdinDashboardSpec {
            title: UNTITLED_DASHBOARD_TITLE.to_string(),
            description: Some(FROM_CONVERSATION_DESCRIPTION.to_string()),
            layout: DashboardLayout::empty(),
            conversation_id: Some(conversation_id.to_string()),
            ..Default::default()
        },
    )
}

fn widget_panel(widget: &WidgetArtifact, tool_calls: Vec<ToolCall>, position: PanelPosition) -> DashboardPanel {
    DashboardPanel {
        id: generate_panel_id(),
        title: Some(
            widget
                .widget
                .title()
                .unwrap_or(DEFAULT_PANEL_TITLE)
                .to_string(),
        ),
        position,
        component: PanelComponent {
            component_type: ComponentType::Custom,
            version: None,
            config: widget.widget.spec().clone(),
        },
        data_source: Some(PanelDataSource { tool_calls }),
    }
}

// ============================================================================
// Service
// ============================================================================

/// Active-dashboard operations for one conversation
#[derive(Clone)]
pub struct ActiveDashboardService {
    canvas: ConversationCanvas,
    store: SharedDashboardStore,
    namespace: String,
}

impl ActiveDashboardService {
    pub fn new(canvas: ConversationCanvas, store: SharedDashboardStore, namespace: impl Into<String>) -> Self {
        Self {
            canvas,
            store,
            namespace: namespace.into(),
        }
    }

    pub fn canvas(&self) -> &ConversationCanvas {
        &self.canvas
    }

    pub fn conversation_id(&self) -> &str {
        self.canvas.conversation_id()
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// The active artifact when it is a dashboard
    pub async fn active_dashboard(&self) -> Option<AladdinDashboard> {
        self.canvas.read().await.active_dashboard().cloned()
    }

    pub async fn has_active_dashboard(&self) -> bool {
        self.canvas.read().await.active_dashboard().is_some()
    }

    pub async fn is_dashboard_saved(&self) -> bool {
        self.canvas.is_dashboard_saved().await
    }

    /// Show a dashboard in the canvas. A maximized canvas is reset to open.
    pub async fn set_active_dashboard(&self, dashboard: AladdinDashboard) {
        let mut inner = self.canvas.write().await;
        log::debug!(
            "Active dashboard for conversation {}: {}",
            self.conversation_id(),
            dashboard.name()
        );
        inner.set_active_artifact(Some(dashboard.into()));
        inner.canvas_state = CanvasState::Open;
    }

    pub async fn clear_active_dashboard(&self) {
        let mut inner = self.canvas.write().await;
        inner.set_active_artifact(None);
        inner.is_dashboard_saved = false;
        inner.canvas_state = CanvasState::Closed;
    }

    /// Append a panel for `widget` to the target dashboard and make the result
    /// the active, unsaved draft. Local only.
    ///
    /// Target: `explicit_dashboard`, else the active dashboard, else a new draft.
    pub async fn add_widget_to_dashboard(
        &self,
        widget: &WidgetArtifact,
        tool_calls: &[ToolCallState],
        explicit_dashboard: Option<&AladdinDashboard>,
    ) -> AladdinDashboard {
        let mut inner = self.canvas.write().await;

        let mut dashboard = match explicit_dashboard.or_else(|| inner.active_dashboard()) {
            Some(target) => target.clone(),
            None => {
                log::info!(
                    "Creating draft dashboard for conversation {}",
                    self.conversation_id()
                );
                new_draft_dashboard(&self.namespace, self.conversation_id())
            }
        };

        let persisted_calls = convert_tool_calls_for_persistence(tool_calls);
        let position = next_panel_position(dashboard.panels());
        let panel = widget_panel(widget, persisted_calls, position);
        log::debug!(
            "Adding panel {} to dashboard {} at y={}",
            panel.id,
            dashboard.name(),
            position.y
        );
        dashboard.spec.layout.panels.push(panel);

        inner.set_active_artifact(Some(dashboard.clone().into()));
        inner.is_dashboard_saved = false;
        inner.canvas_state = CanvasState::Open;
        dashboard
    }

    /// Persist the active dashboard and return the server copy
    pub async fn save_dashboard(&self) -> DashboardResult<AladdinDashboard> {
        let (draft, revision) = {
            let inner = self.canvas.read().await;
            let Some(draft) = inner.active_dashboard() else {
                return Err(DashboardError::NoActiveDashboard);
            };
            (draft.clone(), inner.revision)
        };

        let saved = match self.persist(&draft).await {
            Ok(saved) => saved,
            Err(e) => {
                log::error!("Failed to save dashboard {}: {}", draft.name(), e);
                return Err(e);
            }
        };

        let mut inner = self.canvas.write().await;
        if inner.revision == revision {
            inner.set_active_artifact(Some(saved.clone().into()));
            inner.is_dashboard_saved = true;
            return Ok(saved);
        }

        // Edited while the save was in flight: keep the edit, adopt server metadata
        log::warn!(
            "Dashboard {} changed during save; keeping local edits unsaved",
            saved.name()
        );
        let adopted = inner
            .active_dashboard()
            .filter(|current| current.same_resource(&saved))
            .map(|current| {
                let mut current = current.clone();
                current.metadata.uid = saved.metadata.uid.clone();
                current.metadata.resource_version = saved.metadata.resource_version.clone();
                current.metadata.creation_timestamp = saved.metadata.creation_timestamp.clone();
                current
            });
        if let Some(current) = adopted {
            inner.set_active_artifact(Some(current.into()));
            inner.is_dashboard_saved = false;
        }

        Ok(saved)
    }

    async fn persist(&self, draft: &AladdinDashboard) -> DashboardResult<AladdinDashboard> {
        if draft.is_persisted() {
            log::debug!("Updating dashboard {}/{}", draft.namespace(), draft.name());
            return self.store.update(draft).await;
        }

        let namespace = if draft.namespace().is_empty() {
            self.namespace.as_str()
        } else {
            draft.namespace()
        };
        log::debug!("Creating dashboard {}/{}", namespace, draft.name());
        self.store
            .create(draft.name(), namespace, draft.spec.clone())
            .await
    }

    /// Create an empty dashboard in the store and show it
    pub async fn start_from_scratch(&self) -> DashboardResult<AladdinDashboard> {
        let spec = AladdinDashboardSpec {
            title: UNTITLED_DASHBOARD_TITLE.to_string(),
            description: Some(FROM_SCRATCH_DESCRIPTION.to_string()),
            layout: DashboardLayout::empty(),
            conversation_id: Some(self.conversation_id().to_string()),
            ..Default::default()
        };
        let created = self
            .store
            .create(&generate_dashboard_name(), &self.namespace, spec)
            .await?;

        let mut inner = self.canvas.write().await;
        inner.set_active_artifact(Some(created.clone().into()));
        inner.is_dashboard_saved = true;
        inner.canvas_state = CanvasState::Open;
        Ok(created)
    }

    /// Create an empty, titled dashboard in the store without showing it
    pub async fn create_dashboard(&self, title: &str) -> DashboardResult<AladdinDashboard> {
        let name = dashboard_name_from_title(title).map_err(DashboardError::InvalidName)?;
        let spec = AladdinDashboardSpec {
            title: title.trim().to_string(),
            layout: DashboardLayout::empty(),
            conversation_id: Some(self.conversation_id().to_string()),
            ..Default::default()
        };

        let created = self.store.create(&name, &self.namespace, spec).await?;
        log::info!(
            "Dashboard {} created for conversation {}",
            created.name(),
            self.conversation_id()
        );
        Ok(created)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::chat::{CodeArtifact, NguiWidget, Widget};
    use crate::services::dashboard_store::{DashboardStore, MemoryDashboardStore};
    use async_trait::async_trait;
    use chrono::Utc;
    use serde_json::{json, Map, Value};
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::{Arc, Mutex};
    use tokio::sync::Notify;

    /// Memory store that records calls, can fail, and can hold one kind of call open
    #[derive(Default)]
    struct MockStore {
        inner: MemoryDashboardStore,
        calls: Mutex<Vec<String>>,
        fail: AtomicBool,
        gate: Option<(&'static str, Arc<Notify>, Arc<Notify>)>,
    }

    impl MockStore {
        fn gated(call: &'static str, entered: Arc<Notify>, release: Arc<Notify>) -> Self {
            Self {
                gate: Some((call, entered, release)),
                ..Default::default()
            }
        }

        async fn hold(&self, call: &str) {
            if let Some((gated, entered, release)) = &self.gate {
                if *gated == call {
                    entered.notify_one();
                    release.notified().await;
                }
            }
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }

        fn record(&self, call: &str) -> DashboardResult<()> {
            self.calls.lock().unwrap().push(call.to_string());
            if self.fail.load(Ordering::SeqCst) {
                return Err(DashboardError::ApiError("admission webhook denied".to_string()));
            }
            Ok(())
        }
    }

    #[async_trait]
    impl DashboardStore for MockStore {
        fn name(&self) -> &str {
            "mock"
        }

        async fn create(
            &self,
            name: &str,
            namespace: &str,
            spec: AladdinDashboardSpec,
        ) -> DashboardResult<AladdinDashboard> {
            self.record("create")?;
            self.hold("create").await;
            self.inner.create(name, namespace, spec).await
        }

        async fn get(&self, name: &str, namespace: &str) -> DashboardResult<AladdinDashboard> {
            self.record("get")?;
            self.inner.get(name, namespace).await
        }

        async fn update(&self, dashboard: &AladdinDashboard) -> DashboardResult<AladdinDashboard> {
            self.record("update")?;
            self.hold("update").await;
            self.inner.update(dashboard).await
        }

        async fn delete(&self, dashboard: &AladdinDashboard) -> DashboardResult<()> {
            self.record("delete")?;
            self.inner.delete(dashboard).await
        }

        async fn list(&self, namespace: &str) -> DashboardResult<Vec<AladdinDashboard>> {
            self.record("list")?;
            self.inner.list(namespace).await
        }
    }

    fn service_with(store: Arc<MockStore>) -> ActiveDashboardService {
        ActiveDashboardService::new(ConversationCanvas::new("conv-1"), store, "default")
    }

    fn widget(title: Option<&str>) -> WidgetArtifact {
        let mut spec = Map::new();
        spec.insert("component".to_string(), json!("LineChart"));
        spec.insert("query".to_string(), json!("rate(cpu[5m])"));
        WidgetArtifact {
            id: "widget-artifact-1".to_string(),
            created_at: Utc::now(),
            widget: Widget::Ngui(NguiWidget {
                id: "ngui-widget-1".to_string(),
                spec,
                title: title.map(str::to_string),
                created_at: Utc::now(),
            }),
        }
    }

    fn state(id: &str, name: &str, status: ToolCallStatus, result: Option<&str>) -> ToolCallState {
        let mut arguments = Map::new();
        arguments.insert("q".to_string(), Value::String(id.to_string()));
        ToolCallState {
            id: id.to_string(),
            name: name.to_string(),
            status,
            arguments: Some(arguments),
            result: result.map(str::to_string),
            artifacts: None,
        }
    }

    fn panel_at(y: u32, height: u32) -> DashboardPanel {
        DashboardPanel {
            id: format!("panel-{}", y),
            position: PanelPosition {
                x: 0,
                y,
                width: 6,
                height,
            },
            ..Default::default()
        }
    }

    #[test]
    fn test_next_position_on_empty_dashboard() {
        let position = next_panel_position(&[]);
        assert_eq!(
            position,
            PanelPosition {
                x: 0,
                y: 0,
                width: 6,
                height: 3
            }
        );
    }

    #[test]
    fn test_next_position_below_existing_panels() {
        let position = next_panel_position(&[panel_at(0, 3), panel_at(3, 3)]);
        assert_eq!(position.x, 0);
        assert_eq!(position.y, 6);

        // Out-of-order panels: the lowest bottom edge wins
        let position = next_panel_position(&[panel_at(4, 5), panel_at(0, 2)]);
        assert_eq!(position.y, 9);
    }

    #[test]
    fn test_next_position_saturates_at_grid_end() {
        let position = next_panel_position(&[panel_at(0, 3), panel_at(u32::MAX - 1, 3)]);
        assert_eq!(position.y, u32::MAX);
    }

    #[tokio::test]
    async fn test_add_widget_below_panel_at_grid_end() {
        let service = service_with(Arc::new(MockStore::default()));
        let mut remote = new_draft_dashboard("default", "conv-1");
        remote.spec.layout.panels = vec![panel_at(u32::MAX - 1, 3)];

        let updated = service
            .add_widget_to_dashboard(&widget(None), &[], Some(&remote))
            .await;

        assert_eq!(updated.panels().len(), 2);
        assert_eq!(updated.panels()[1].position.y, u32::MAX);
    }

    #[test]
    fn test_convert_tool_calls_for_persistence() {
        let calls = vec![
            state("1", "mcp_generate_ui", ToolCallStatus::Success, Some("{\"blocks\":[]}")),
            state("2", "search", ToolCallStatus::Success, Some("found 3 pods")),
            state("3", "generate_ui", ToolCallStatus::Failure, Some("boom")),
            state("4", "generate_ui", ToolCallStatus::Running, None),
        ];

        let persisted = convert_tool_calls_for_persistence(&calls);

        assert_eq!(persisted.len(), 2);
        assert_eq!(persisted[0].id, "1");
        assert_eq!(persisted[0].tool, "mcp_generate_ui");
        assert_eq!(persisted[0].result.as_deref(), Some("{\"blocks\":[]}"));
        assert_eq!(persisted[1].tool, "search");
        assert!(persisted[1].result.is_none());
        assert_eq!(persisted[1].arguments["q"], "2");
    }

    #[tokio::test]
    async fn test_add_widget_without_active_dashboard_creates_draft() {
        let store = Arc::new(MockStore::default());
        let service = service_with(store.clone());

        let tool_calls = vec![state("call-1", "generate_ui", ToolCallStatus::Success, Some("{}"))];
        let dashboard = service
            .add_widget_to_dashboard(&widget(Some("CPU")), &tool_calls, None)
            .await;

        assert_eq!(dashboard.spec.title, "Untitled Dashboard");
        assert_eq!(
            dashboard.spec.description.as_deref(),
            Some("Dashboard created from conversation")
        );
        assert_eq!(dashboard.spec.conversation_id.as_deref(), Some("conv-1"));
        assert_eq!(dashboard.spec.layout.columns, Some(12));
        assert!(dashboard.name().starts_with("dashboard-"));
        assert_eq!(dashboard.namespace(), "default");
        assert!(!dashboard.is_persisted());
        assert_eq!(dashboard.panels().len(), 1);

        let panel = &dashboard.panels()[0];
        assert!(panel.id.starts_with("panel-"));
        assert_eq!(panel.title.as_deref(), Some("CPU"));
        assert_eq!(panel.component.component_type, ComponentType::Custom);
        assert_eq!(panel.component.config["component"], "LineChart");
        assert_eq!(panel.tool_calls().len(), 1);

        assert_eq!(service.active_dashboard().await, Some(dashboard));
        assert!(!service.is_dashboard_saved().await);
        assert_eq!(service.canvas().canvas_state().await, CanvasState::Open);
        // Local only
        assert!(store.calls().is_empty());
    }

    #[tokio::test]
    async fn test_add_widget_appends_to_active_dashboard() {
        let service = service_with(Arc::new(MockStore::default()));

        service.add_widget_to_dashboard(&widget(None), &[], None).await;
        service.add_widget_to_dashboard(&widget(None), &[], None).await;
        let dashboard = service.add_widget_to_dashboard(&widget(None), &[], None).await;

        let ys: Vec<u32> = dashboard.panels().iter().map(|p| p.position.y).collect();
        assert_eq!(ys, vec![0, 3, 6]);
        assert_eq!(dashboard.panels()[0].title.as_deref(), Some("Widget"));
        assert_ne!(dashboard.panels()[0].id, dashboard.panels()[1].id);
    }

    #[tokio::test]
    async fn test_add_widget_to_explicit_dashboard_does_not_mutate_input() {
        let service = service_with(Arc::new(MockStore::default()));
        service.add_widget_to_dashboard(&widget(None), &[], None).await;

        let mut explicit = new_draft_dashboard("team-a", "conv-9");
        explicit.spec.title = "Chosen".to_string();
        explicit.spec.layout.panels = vec![panel_at(0, 3), panel_at(3, 3)];

        let updated = service
            .add_widget_to_dashboard(&widget(None), &[], Some(&explicit))
            .await;

        assert_eq!(explicit.panels().len(), 2);
        assert_eq!(updated.panels().len(), 3);
        assert_eq!(updated.panels()[2].position.y, 6);
        assert_eq!(updated.spec.title, "Chosen");
        assert_eq!(service.active_dashboard().await.unwrap().spec.title, "Chosen");
    }

    #[tokio::test]
    async fn test_add_widget_replaces_code_artifact() {
        let service = service_with(Arc::new(MockStore::default()));
        service
            .canvas()
            .show_code_artifact(CodeArtifact {
                id: "code-1".to_string(),
                created_at: Utc::now(),
            })
            .await;

        let dashboard = service.add_widget_to_dashboard(&widget(None), &[], None).await;
        assert_eq!(dashboard.spec.title, "Untitled Dashboard");
        assert_eq!(dashboard.panels().len(), 1);
    }

    #[tokio::test]
    async fn test_set_active_dashboard_opens_canvas_from_maximized() {
        let service = service_with(Arc::new(MockStore::default()));
        service.canvas().maximize_canvas().await;

        let dashboard = new_draft_dashboard("default", "conv-1");
        service.set_active_dashboard(dashboard.clone()).await;

        assert_eq!(service.canvas().canvas_state().await, CanvasState::Open);
        assert_eq!(service.active_dashboard().await, Some(dashboard));
        assert!(!service.is_dashboard_saved().await);
    }

    #[tokio::test]
    async fn test_clear_active_dashboard() {
        let service = service_with(Arc::new(MockStore::default()));
        service.start_from_scratch().await.unwrap();
        assert!(service.is_dashboard_saved().await);

        service.clear_active_dashboard().await;

        assert!(!service.has_active_dashboard().await);
        assert!(!service.is_dashboard_saved().await);
        assert_eq!(service.canvas().canvas_state().await, CanvasState::Closed);
    }

    #[tokio::test]
    async fn test_save_without_active_dashboard_fails() {
        let store = Arc::new(MockStore::default());
        let service = service_with(store.clone());

        let err = service.save_dashboard().await.unwrap_err();

        assert_eq!(err.to_string(), "No active dashboard to save");
        assert!(service.canvas().active_artifact().await.is_none());
        assert!(store.calls().is_empty());
    }

    #[tokio::test]
    async fn test_save_creates_and_installs_server_copy() {
        let store = Arc::new(MockStore::default());
        let service = service_with(store.clone());
        service.add_widget_to_dashboard(&widget(None), &[], None).await;

        let saved = service.save_dashboard().await.unwrap();

        assert!(saved.is_persisted());
        assert!(saved.uid().is_some());
        assert!(service.is_dashboard_saved().await);
        assert_eq!(service.active_dashboard().await, Some(saved.clone()));
        assert_eq!(store.calls(), vec!["create"]);
        assert_eq!(store.inner.get(saved.name(), "default").await.unwrap(), saved);
    }

    #[tokio::test]
    async fn test_resave_updates_instead_of_duplicating() {
        let store = Arc::new(MockStore::default());
        let service = service_with(store.clone());
        service.add_widget_to_dashboard(&widget(None), &[], None).await;
        let first = service.save_dashboard().await.unwrap();

        service.add_widget_to_dashboard(&widget(None), &[], None).await;
        assert!(!service.is_dashboard_saved().await);
        let second = service.save_dashboard().await.unwrap();

        assert_eq!(store.calls(), vec!["create", "update"]);
        assert_eq!(second.uid(), first.uid());
        assert_eq!(second.panels().len(), 2);
        assert_ne!(second.metadata.resource_version, first.metadata.resource_version);
        assert_eq!(store.inner.len().await, 1);
        assert!(service.is_dashboard_saved().await);
    }

    #[tokio::test]
    async fn test_save_failure_leaves_state_unchanged() {
        let store = Arc::new(MockStore::default());
        let service = service_with(store.clone());
        let draft = service.add_widget_to_dashboard(&widget(None), &[], None).await;
        store.fail.store(true, Ordering::SeqCst);

        let result = service.save_dashboard().await;

        assert!(matches!(result, Err(DashboardError::ApiError(_))));
        assert_eq!(service.active_dashboard().await, Some(draft));
        assert!(!service.is_dashboard_saved().await);
        assert_eq!(service.canvas().canvas_state().await, CanvasState::Open);
    }

    #[tokio::test]
    async fn test_add_during_save_is_not_lost() {
        let entered = Arc::new(Notify::new());
        let release = Arc::new(Notify::new());
        let store = Arc::new(MockStore::gated("create", entered.clone(), release.clone()));
        let service = service_with(store.clone());
        service.add_widget_to_dashboard(&widget(None), &[], None).await;

        let saving = {
            let service = service.clone();
            tokio::spawn(async move { service.save_dashboard().await })
        };
        entered.notified().await;
        assert!(!service.is_dashboard_saved().await);

        service.add_widget_to_dashboard(&widget(Some("Late")), &[], None).await;
        release.notify_one();
        let saved = saving.await.unwrap().unwrap();

        let active = service.active_dashboard().await.unwrap();
        assert_eq!(saved.panels().len(), 1);
        assert_eq!(active.panels().len(), 2);
        assert_eq!(active.panels()[1].title.as_deref(), Some("Late"));
        // Server metadata adopted so the next save updates
        assert_eq!(active.metadata.resource_version, saved.metadata.resource_version);
        assert_eq!(active.uid(), saved.uid());
        assert!(!service.is_dashboard_saved().await);
    }

    #[tokio::test]
    async fn test_saved_flag_stays_false_while_resave_in_flight() {
        let entered = Arc::new(Notify::new());
        let release = Arc::new(Notify::new());
        let store = Arc::new(MockStore::gated("update", entered.clone(), release.clone()));
        let service = service_with(store.clone());
        let created = service.start_from_scratch().await.unwrap();
        assert!(service.is_dashboard_saved().await);

        service.add_widget_to_dashboard(&widget(None), &[], None).await;
        let saving = {
            let service = service.clone();
            tokio::spawn(async move { service.save_dashboard().await })
        };
        entered.notified().await;

        assert!(!service.is_dashboard_saved().await);
        assert!(!service.active_dashboard().await.unwrap().panels().is_empty());

        release.notify_one();
        let saved = saving.await.unwrap().unwrap();

        assert_eq!(store.calls(), vec!["create", "update"]);
        assert_eq!(saved.uid(), created.uid());
        assert_eq!(saved.panels().len(), 1);
        assert!(service.is_dashboard_saved().await);
        assert_eq!(service.active_dashboard().await, Some(saved));
    }

    #[tokio::test]
    async fn test_start_from_scratch() {
        let store = Arc::new(MockStore::default());
        let service = service_with(store.clone());

        let created = service.start_from_scratch().await.unwrap();

        assert_eq!(created.spec.title, "Untitled Dashboard");
        assert_eq!(
            created.spec.description.as_deref(),
            Some("Dashboard created from scratch")
        );
        assert_eq!(created.spec.conversation_id.as_deref(), Some("conv-1"));
        assert!(created.panels().is_empty());
        assert!(created.name().starts_with("dashboard-"));
        assert!(service.is_dashboard_saved().await);
        assert!(service.canvas().is_canvas_open().await);
        assert_eq!(service.active_dashboard().await, Some(created));
        assert_eq!(store.calls(), vec!["create"]);
    }

    #[tokio::test]
    async fn test_create_dashboard_from_title() {
        let store = Arc::new(MockStore::default());
        let service = service_with(store.clone());

        let created = service.create_dashboard("  Node Health (prod) ").await.unwrap();

        assert_eq!(created.name(), "node-health-prod");
        assert_eq!(created.spec.title, "Node Health (prod)");
        assert!(created.is_persisted());
        // Not activated
        assert!(!service.has_active_dashboard().await);

        let duplicate = service.create_dashboard("node health prod").await;
        assert!(matches!(duplicate, Err(DashboardError::AlreadyExists(_))));
    }

    #[tokio::test]
    async fn test_create_dashboard_rejects_unusable_title() {
        let store = Arc::new(MockStore::default());
        let service = service_with(store.clone());

        assert!(matches!(
            service.create_dashboard("").await,
            Err(DashboardError::InvalidName(_))
        ));
        assert!(matches!(
            service.create_dashboard("???").await,
            Err(DashboardError::InvalidName(_))
        ));
        assert!(store.calls().is_empty());
    }
}

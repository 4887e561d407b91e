// Dashboard Widget Reconciler
//
// Read-only index over the known dashboard collection answering
// "is this widget already placed, and where". Always rebuilt wholesale.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::models::dashboard::{AladdinDashboard, DashboardPanel};
use crate::services::dashboard_store::SharedDashboardStore;

/// A panel together with the dashboard that holds it
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DashboardPanelRef<'a> {
    pub dashboard: &'a AladdinDashboard,
    pub panel: &'a DashboardPanel,
}

/// (dashboard index, panel index) into `DashboardIndex::dashboards`
type PanelSlot = (usize, usize);

/// Reverse index from widget id / tool-call id to panel placement
#[derive(Debug, Default)]
pub struct DashboardIndex {
    dashboards: Vec<AladdinDashboard>,
    by_widget_id: HashMap<String, PanelSlot>,
    by_tool_call_id: HashMap<String, PanelSlot>,
    by_conversation_id: HashMap<String, Vec<usize>>,
}

impl DashboardIndex {
    /// Build the index from a snapshot of the collection. Duplicate keys: last wins.
    pub fn build(dashboards: &[AladdinDashboard]) -> Self {
        let mut by_widget_id = HashMap::new();
        let mut by_tool_call_id = HashMap::new();
        let mut by_conversation_id: HashMap<String, Vec<usize>> = HashMap::new();

        for (d, dashboard) in dashboards.iter().enumerate() {
            if let Some(conversation_id) = dashboard.spec.conversation_id.as_deref() {
                by_conversation_id
                    .entry(conversation_id.to_string())
                    .or_default()
                    .push(d);
            }

            for (p, panel) in dashboard.panels().iter().enumerate() {
                if let Some(widget_id) = panel.component.widget_id() {
                    by_widget_id.insert(widget_id.to_string(), (d, p));
                }
                for tool_call in panel.tool_calls() {
                    if !tool_call.id.is_empty() {
                        by_tool_call_id.insert(tool_call.id.clone(), (d, p));
                    }
                }
            }
        }

        log::debug!(
            "Dashboard index built: {} dashboards, {} widgets, {} tool calls",
            dashboards.len(),
            by_widget_id.len(),
            by_tool_call_id.len()
        );

        Self {
            dashboards: dashboards.to_vec(),
            by_widget_id,
            by_tool_call_id,
            by_conversation_id,
        }
    }

    fn resolve(&self, slot: PanelSlot) -> Option<DashboardPanelRef<'_>> {
        let dashboard = self.dashboards.get(slot.0)?;
        let panel = dashboard.panels().get(slot.1)?;
        Some(DashboardPanelRef { dashboard, panel })
    }

    /// Dashboard and panel whose `component.config.widgetId` equals `widget_id`
    pub fn dashboard_for_widget_id(&self, widget_id: &str) -> Option<DashboardPanelRef<'_>> {
        self.by_widget_id
            .get(widget_id)
            .and_then(|slot| self.resolve(*slot))
    }

    /// Dashboard and panel that persisted the tool call with this id
    pub fn dashboard_for_tool_call(&self, tool_call_id: &str) -> Option<DashboardPanelRef<'_>> {
        self.by_tool_call_id
            .get(tool_call_id)
            .and_then(|slot| self.resolve(*slot))
    }

    /// Dashboards created from a conversation, in collection order
    pub fn dashboards_for_conversation(&self, conversation_id: &str) -> Vec<&AladdinDashboard> {
        self.by_conversation_id
            .get(conversation_id)
            .map(|indices| indices.iter().filter_map(|&d| self.dashboards.get(d)).collect())
            .unwrap_or_default()
    }

    pub fn dashboards(&self) -> &[AladdinDashboard] {
        &self.dashboards
    }

    pub fn len(&self) -> usize {
        self.dashboards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dashboards.is_empty()
    }
}

// ============================================================================
// Watcher
// ============================================================================

/// Poll period used when a zero interval is requested
const FALLBACK_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Polls the store and publishes a fresh index whenever the collection changes
pub struct DashboardWatcher {
    receiver: watch::Receiver<Arc<DashboardIndex>>,
    task: JoinHandle<()>,
}

impl DashboardWatcher {
    /// Start polling `namespace` every `interval`; a zero interval polls once a second
    pub fn spawn(store: SharedDashboardStore, namespace: impl Into<String>, interval: Duration) -> Self {
        let namespace = namespace.into();
        let interval = if interval.is_zero() {
            FALLBACK_POLL_INTERVAL
        } else {
            interval
        };
        let (sender, receiver) = watch::channel(Arc::new(DashboardIndex::default()));

        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            let mut previous: Option<Vec<AladdinDashboard>> = None;

            loop {
                ticker.tick().await;

                let dashboards = match store.list(&namespace).await {
                    Ok(dashboards) => dashboards,
                    Err(e) => {
                        log::warn!("Failed to list dashboards in {}: {}", namespace, e);
                        continue;
                    }
                };

                if previous.as_ref() == Some(&dashboards) {
                    continue;
                }

                let index = Arc::new(DashboardIndex::build(&dashboards));
                previous = Some(dashboards);
                if sender.send(index).is_err() {
                    log::debug!("Dashboard watcher for {} has no subscribers, stopping", namespace);
                    break;
                }
            }
        });

        Self { receiver, task }
    }

    /// Latest published index
    pub fn current(&self) -> Arc<DashboardIndex> {
        self.receiver.borrow().clone()
    }

    /// New receiver notified on every rebuild
    pub fn subscribe(&self) -> watch::Receiver<Arc<DashboardIndex>> {
        self.receiver.clone()
    }

    pub fn stop(&self) {
        self.task.abort();
    }

    pub fn is_running(&self) -> bool {
        !self.task.is_finished()
    }
}

impl Drop for DashboardWatcher {
    fn drop(&mut self) {
        self.task.abort();
    }
}

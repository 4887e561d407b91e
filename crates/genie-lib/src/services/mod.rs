// Services module
// Artifact parsing, tool-call merging, dashboard reconciliation and the
// per-conversation active-dashboard state

pub mod active_dashboard;
pub mod conversation;
pub mod dashboard_index;
pub mod dashboard_store;
pub mod genie;
pub mod tool_calls;
pub mod tool_results;

pub use active_dashboard::{
    convert_tool_calls_for_persistence, next_panel_position, ActiveDashboardService,
};
pub use conversation::{CanvasSnapshot, ConversationCanvas, ConversationSessions};
pub use dashboard_index::{DashboardIndex, DashboardPanelRef, DashboardWatcher};
pub use dashboard_store::{
    create_store, DashboardError, DashboardErrorCode, DashboardResult, DashboardStore,
    KubeDashboardStore, MemoryDashboardStore, SharedDashboardStore,
};
pub use genie::GenieService;
pub use tool_calls::{merge_tool_calls_with_results, tool_calls_from_attributes, ToolCallTracker};
pub use tool_results::{is_generate_ui_tool, parse_tool_result_to_artifacts};

// Genie core
// Artifact and dashboard reconciliation for the console AI assistant:
// tool-result parsing, tool-call merging, the widget-to-dashboard index,
// and per-conversation canvas/active-dashboard state.

pub mod models;
pub mod services;
pub mod utils;

pub use models::*;
pub use services::{ActiveDashboardService, DashboardError, DashboardResult, GenieService};
pub use utils::config::GenieConfig;

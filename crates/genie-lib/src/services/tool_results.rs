// Tool Result Parsers
//
// Turns raw tool call results into renderable Artifacts.
// Each tool type that produces renderable artifacts has its own parser function;
// malformed payloads are logged and recovered locally, never propagated.

use chrono::Utc;
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::models::chat::{Artifact, NguiWidget, Widget, WidgetArtifact};

/// Substring identifying UI-generating tools
const GENERATE_UI_MARKER: &str = "generate_ui";

/// Check if a tool name is a generate_ui tool
/// Handles prefixed and suffixed variants: `generate_ui_v2`, `mcp_generate_ui`, ...
pub fn is_generate_ui_tool(tool_name: &str) -> bool {
    tool_name.to_lowercase().contains(GENERATE_UI_MARKER)
}

/// Parse a tool result into Artifacts based on the tool name
///
/// Tools without renderable output yield no artifacts.
pub fn parse_tool_result_to_artifacts(tool_name: &str, result: &str) -> Vec<Artifact> {
    if is_generate_ui_tool(tool_name) {
        return parse_generate_ui_result(result);
    }

    Vec::new()
}

/// Same as [`parse_tool_result_to_artifacts`] for results that arrive as untyped JSON
/// (streamed responses). Anything but a JSON string yields no artifacts.
pub fn parse_tool_result_value(tool_name: &str, result: &Value) -> Vec<Artifact> {
    match result.as_str() {
        Some(raw) => parse_tool_result_to_artifacts(tool_name, raw),
        None => Vec::new(),
    }
}

/// Parse a generate_ui response into WidgetArtifacts
///
/// The response is `{"blocks": [...]}` where each block carries an NGUI component
/// configuration as a JSON string in `rendering.content`. A bad block is skipped
/// without dropping the others; output preserves block order.
pub fn parse_generate_ui_result(response: &str) -> Vec<Artifact> {
    let parsed: Value = match serde_json::from_str(response) {
        Ok(value) => value,
        Err(e) => {
            log::error!("Failed to parse generate_ui response: {}", e);
            return Vec::new();
        }
    };

    let Some(blocks) = parsed.get("blocks").and_then(Value::as_array) else {
        log::warn!("generate_ui response has no blocks array: {}", parsed);
        return Vec::new();
    };

    blocks
        .iter()
        .filter_map(|block| {
            let spec = parse_block(block)?;
            Some(Artifact::Widget(widget_artifact(spec)))
        })
        .collect()
}

/// Decode one block's `rendering.content`
fn parse_block(block: &Value) -> Option<Map<String, Value>> {
    let Some(content) = block
        .get("rendering")
        .and_then(|r| r.get("content"))
        .and_then(Value::as_str)
    else {
        log::warn!("Block missing rendering.content: {}", block);
        return None;
    };

    match serde_json::from_str::<Map<String, Value>>(content) {
        Ok(spec) => Some(spec),
        Err(e) => {
            log::error!("Failed to parse NGUI block: {}", e);
            None
        }
    }
}

fn widget_artifact(spec: Map<String, Value>) -> WidgetArtifact {
    let now = Utc::now();
    WidgetArtifact {
        id: format!("widget-artifact-{}", Uuid::new_v4()),
        created_at: now,
        widget: Widget::Ngui(NguiWidget {
            id: format!("ngui-widget-{}", Uuid::new_v4()),
            spec,
            title: None,
            created_at: now,
        }),
    }
}

// ============================================================================
// Tests
// ============================================================================

// Tool Call Merging
//
// Combines the "tool call" and "tool result" event streams of an assistant message
// into one ToolCallState per call, parsing artifacts for completed calls.
// Also provides ToolCallTracker, which buffers streamed events per message.

use std::collections::{HashMap, HashSet};

use serde::de::DeserializeOwned;
use serde_json::Value;

use super::tool_results::parse_tool_result_to_artifacts;
use crate::models::chat::{
    EventEnvelope, StreamChunk, ToolCallEvent, ToolCallState, ToolCallStatus, ToolResultEvent,
};

// ============================================================================
// Merge
// ============================================================================

/// Merge tool calls with their matching results by ID.
/// - Calls without a result are `Running` and carry no result or artifacts
/// - Calls with a result take its status and content, and get parsed artifacts
/// - Results without a matching call are dropped
///
/// Output follows the order of `tool_calls`.
pub fn merge_tool_calls_with_results(
    tool_calls: Option<&[ToolCallEvent]>,
    tool_results: Option<&[ToolResultEvent]>,
) -> Vec<ToolCallState> {
    let calls = tool_calls.unwrap_or_default();
    let results = tool_results.unwrap_or_default();

    if calls.is_empty() {
        return Vec::new();
    }

    // Last write wins on duplicate ids
    let results_by_id: HashMap<&str, &ToolResultEvent> =
        results.iter().map(|r| (r.id.as_str(), r)).collect();

    calls
        .iter()
        .map(|call| match results_by_id.get(call.id.as_str()) {
            Some(result) => ToolCallState {
                id: call.id.clone(),
                name: call.name.clone(),
                status: result.status.into(),
                arguments: Some(call.arguments.clone()),
                result: Some(result.content.clone()),
                artifacts: Some(parse_tool_result_to_artifacts(&call.name, &result.content)),
            },
            None => ToolCallState {
                id: call.id.clone(),
                name: call.name.clone(),
                status: ToolCallStatus::Running,
                arguments: Some(call.arguments.clone()),
                result: None,
                artifacts: None,
            },
        })
        .collect()
}

/// Extract and merge tool calls from a message's additional attributes
/// (`{"toolCalls": [...], "toolResults": [...]}`)
pub fn tool_calls_from_attributes(attributes: &Value) -> Vec<ToolCallState> {
    let calls: Vec<ToolCallEvent> = decode_events(attributes.get("toolCalls"));
    let results: Vec<ToolResultEvent> = decode_events(attributes.get("toolResults"));
    merge_tool_calls_with_results(Some(&calls), Some(&results))
}

fn decode_events<T: DeserializeOwned>(entries: Option<&Value>) -> Vec<T> {
    entries
        .and_then(Value::as_array)
        .map(|items| items.iter().filter_map(decode_event).collect())
        .unwrap_or_default()
}

/// Decode one entry, wrapped or bare. Entries that are not complete events
/// (partial argument tokens) yield `None`.
fn decode_event<T: DeserializeOwned>(entry: &Value) -> Option<T> {
    match serde_json::from_value::<EventEnvelope<T>>(entry.clone()) {
        Ok(envelope) => Some(envelope.into_inner()),
        Err(_) => {
            log::trace!("Skipping incomplete tool event: {}", entry);
            None
        }
    }
}

// ============================================================================
// Streaming Tracker
// ============================================================================

/// Tool events received so far for one message
#[derive(Debug, Default)]
struct MessageToolEvents {
    calls: Vec<ToolCallEvent>,
    results: Vec<ToolResultEvent>,
    seen_call_ids: HashSet<String>,
    seen_result_ids: HashSet<String>,
}

/// Buffers streamed tool events per message and merges them on demand
#[derive(Debug, Default)]
pub struct ToolCallTracker {
    messages: HashMap<String, MessageToolEvents>,
}

impl ToolCallTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ingest one stream chunk.
    /// Returns true if a new complete call or result was recorded.
    pub fn ingest(&mut self, chunk: &StreamChunk) -> bool {
        if chunk.message_id.is_empty() {
            return false;
        }

        let events = self.messages.entry(chunk.message_id.clone()).or_default();
        let mut changed = false;

        for entry in &chunk.tool_calls {
            let Some(call) = decode_event::<ToolCallEvent>(entry) else {
                continue;
            };
            if events.seen_call_ids.insert(call.id.clone()) {
                events.calls.push(call);
                changed = true;
            }
        }

        for entry in &chunk.tool_results {
            let Some(result) = decode_event::<ToolResultEvent>(entry) else {
                continue;
            };
            if events.seen_result_ids.insert(result.id.clone()) {
                events.results.push(result);
                changed = true;
            }
        }

        changed
    }

    /// Current merged state of a message's tool calls
    pub fn tool_calls(&self, message_id: &str) -> Vec<ToolCallState> {
        match self.messages.get(message_id) {
            Some(events) => merge_tool_calls_with_results(Some(&events.calls), Some(&events.results)),
            None => Vec::new(),
        }
    }

    /// Drop the buffered events of one message
    pub fn reset(&mut self, message_id: &str) {
        self.messages.remove(message_id);
    }

    pub fn clear(&mut self) {
        self.messages.clear();
    }

    pub fn message_count(&self) -> usize {
        self.messages.len()
    }
}

// ============================================================================
// Tests
// ============================================================================

//! Events streamed to the client while a request is processed.
//!
//! The wire format is newline-delimited JSON, one object per event:
//! - `tool_call`:   the agent is invoking a tool
//! - `tool_result`: the tool finished (successfully or not)
//! - `text`:        the final answer
//! - `error`:       the request failed; nothing follows
//! - `done`:        the stream is complete

use cowork_core::tool::{ToolCallRequest, ToolResult};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A tool invocation as shown to the client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCallPayload {
    pub name: String,
    pub args: Map<String, Value>,
}

impl From<&ToolCallRequest> for ToolCallPayload {
    fn from(call: &ToolCallRequest) -> Self {
        Self {
            name: call.name.clone(),
            args: call.arguments.clone(),
        }
    }
}

/// A tool outcome as shown to the client.
///
/// Flat on the wire: `name`, `success`, optional `error`, item counts
/// (`emailCount`, `eventCount`, `fileCount`), then the payload fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolResultPayload {
    pub name: String,
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(flatten)]
    pub data: Map<String, Value>,
}

impl ToolResultPayload {
    pub fn new(name: impl Into<String>, result: &ToolResult) -> Self {
        let mut data = result.summary_counts();
        for (k, v) in &result.data {
            if k != "name" {
                data.insert(k.clone(), v.clone());
            }
        }
        Self {
            name: name.into(),
            success: result.success,
            error: result.error.clone(),
            data,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StreamEvent {
    ToolCall {
        #[serde(rename = "toolCall")]
        tool_call: ToolCallPayload,
    },

    ToolResult {
        #[serde(rename = "toolResult")]
        tool_result: ToolResultPayload,
    },

    Text { text: String },

    Error { error: String },

    Done,
}

impl StreamEvent {
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::ToolCall { .. } => "tool_call",
            Self::ToolResult { .. } => "tool_result",
            Self::Text { .. } => "text",
            Self::Error { .. } => "error",
            Self::Done => "done",
        }
    }

    /// One NDJSON record, newline included.
    pub fn to_ndjson_line(&self) -> serde_json::Result<String> {
        let mut line = serde_json::to_string(self)?;
        line.push('\n');
        Ok(line)
    }
}

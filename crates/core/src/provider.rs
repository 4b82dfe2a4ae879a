//! Provider trait: the abstraction over the language model.
//!
//! A Provider takes the conversation so far plus the tool catalog and
//! returns either tool call requests or a plain text answer. The agent loop
//! only ever talks to this trait, so any function-calling model can be
//! plugged in.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::ProviderError;
use crate::message::Turn;
use crate::tool::ToolCallRequest;

/// A tool definition sent to the model so it knows what it can call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDefinition {
    /// The tool name
    pub name: String,

    /// Description of what the tool does
    pub description: String,

    /// JSON Schema describing the tool's parameters
    pub parameters: serde_json::Value,
}

/// Whether the model may request tools on this turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToolChoice {
    /// The model decides.
    #[default]
    Auto,
    /// Tools are advertised but calling them is disabled; text only.
    None,
}

/// One model turn request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderRequest {
    /// System instruction for the model
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_prompt: Option<String>,

    /// The conversation so far, oldest first
    pub turns: Vec<Turn>,

    /// Available tools the model can call
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tools: Vec<ToolDefinition>,

    #[serde(default)]
    pub tool_choice: ToolChoice,
}

/// What the model wants to do next.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelReply {
    /// One or more tool invocations, in the order the model produced them.
    ToolCalls(Vec<ToolCallRequest>),
    /// A plain answer; the loop is done.
    Text(String),
}

impl ModelReply {
    /// Collapse a raw model output: any tool call wins over accompanying text.
    pub fn from_parts(text: String, calls: Vec<ToolCallRequest>) -> Self {
        if calls.is_empty() {
            Self::Text(text)
        } else {
            Self::ToolCalls(calls)
        }
    }
}

/// Token usage information.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

/// A complete response from a provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderResponse {
    pub reply: ModelReply,

    /// Token usage statistics
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<Usage>,

    /// Which model actually responded
    pub model: String,
}

/// The core Provider trait.
#[async_trait]
pub trait Provider: Send + Sync {
    /// A human-readable name for this provider (e.g., "gemini").
    fn name(&self) -> &str;

    /// Send the conversation and wait for the model's next move.
    async fn send_turn(
        &self,
        request: ProviderRequest,
    ) -> std::result::Result<ProviderResponse, ProviderError>;
}

//! Tool trait: the abstraction over agent capabilities.
//!
//! Tools are what let the agent act for the user: search mail, read a
//! calendar, create a document. A tool object carries both its advertised
//! definition and its executor, so the registry cannot advertise something it
//! cannot run.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::Arc;

use crate::error::ToolError;
use crate::provider::ToolDefinition;
use crate::session::SessionContext;

/// Structured payload a tool produces on success.
pub type ToolOutput = Map<String, Value>;

/// A request from the model to execute a tool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCallRequest {
    /// Association key between this call and its result.
    pub id: String,

    /// Name of the tool to execute (may not exist in the registry).
    pub name: String,

    /// Arguments keyed by parameter name.
    #[serde(default)]
    pub arguments: Map<String, Value>,
}

impl ToolCallRequest {
    /// Create a call with a freshly minted id.
    pub fn new(name: impl Into<String>, arguments: Map<String, Value>) -> Self {
        Self {
            id: format!("call_{}", uuid::Uuid::new_v4().simple()),
            name: name.into(),
            arguments,
        }
    }
}

/// The uniform result envelope for every tool execution.
///
/// Serialized flat: `success`, an optional `error`, then the payload fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolResult {
    pub success: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    #[serde(flatten)]
    pub data: Map<String, Value>,
}

impl ToolResult {
    /// A successful result carrying `data`.
    ///
    /// Envelope keys inside the payload are dropped so they can never
    /// shadow the real `success`/`error` fields once flattened.
    pub fn ok(mut data: ToolOutput) -> Self {
        data.remove("success");
        data.remove("error");
        Self {
            success: true,
            error: None,
            data,
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(error.into()),
            data: Map::new(),
        }
    }

    /// Item counts for array payloads (`emails`, `events`, `files`).
    pub fn summary_counts(&self) -> Map<String, Value> {
        const COUNTED: [(&str, &str); 3] = [
            ("emails", "emailCount"),
            ("events", "eventCount"),
            ("files", "fileCount"),
        ];

        let mut counts = Map::new();
        for (field, label) in COUNTED {
            if let Some(items) = self.data.get(field).and_then(Value::as_array) {
                counts.insert(label.to_string(), Value::from(items.len()));
            }
        }
        counts
    }
}

/// A tool result bound to the call that produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolResponse {
    pub call_id: String,
    pub name: String,
    pub result: ToolResult,
}

/// The core Tool trait.
///
/// Each catalog entry implements this trait. Failures are returned as
/// `ToolError`; turning them into a `ToolResult` is the executor's job.
#[async_trait]
pub trait Tool: Send + Sync {
    /// The unique name of this tool (e.g., "searchEmails").
    fn name(&self) -> &str;

    /// A description of what this tool does (sent to the model).
    fn description(&self) -> &str;

    /// JSON Schema describing this tool's parameters.
    fn parameters_schema(&self) -> Value;

    /// Execute the tool with the given arguments on behalf of `session`.
    async fn execute(
        &self,
        arguments: &Map<String, Value>,
        session: &SessionContext,
    ) -> std::result::Result<ToolOutput, ToolError>;

    /// Convert this tool into a ToolDefinition for sending to the model.
    fn to_definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: self.name().to_string(),
            description: self.description().to_string(),
            parameters: self.parameters_schema(),
        }
    }
}

/// The fixed catalog of tools for this process.
///
/// Built once from a list of tool objects and then only read. Definitions
/// come back in catalog order.
pub struct ToolRegistry {
    tools: Vec<Arc<dyn Tool>>,
    index: HashMap<String, usize>,
}

impl ToolRegistry {
    /// Build a registry. A later tool with a duplicate name replaces the
    /// earlier one in its original position.
    pub fn from_tools(tools: Vec<Arc<dyn Tool>>) -> Self {
        let mut ordered: Vec<Arc<dyn Tool>> = Vec::with_capacity(tools.len());
        let mut index = HashMap::with_capacity(tools.len());

        for tool in tools {
            if let Some(&pos) = index.get(tool.name()) {
                ordered[pos] = tool;
                continue;
            }
            index.insert(tool.name().to_string(), ordered.len());
            ordered.push(tool);
        }

        Self {
            tools: ordered,
            index,
        }
    }

    /// Get a tool by name.
    pub fn get(&self, name: &str) -> Option<&dyn Tool> {
        self.index.get(name).map(|&i| self.tools[i].as_ref())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Get all tool definitions (for sending to the model).
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.tools.iter().map(|t| t.to_definition()).collect()
    }

    /// List all registered tool names in catalog order.
    pub fn names(&self) -> Vec<&str> {
        self.tools.iter().map(|t| t.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

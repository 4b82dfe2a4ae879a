//! Tool executor: dispatches a model's tool call to the catalog.
//!
//! Execution never fails from the caller's point of view. Unknown tools,
//! bad arguments, service errors and timeouts all come back as a failed
//! [`ToolResult`] so the model can read the message and adapt.

use cowork_core::error::ToolError;
use cowork_core::provider::ToolDefinition;
use cowork_core::session::SessionContext;
use cowork_core::tool::{ToolCallRequest, ToolRegistry, ToolResult};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

pub struct ToolExecutor {
    registry: Arc<ToolRegistry>,
    timeout: Duration,
}

impl ToolExecutor {
    pub fn new(registry: Arc<ToolRegistry>, timeout: Duration) -> Self {
        Self { registry, timeout }
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    /// Definitions to advertise to the model, in catalog order.
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.registry.definitions()
    }

    /// Run one tool call. No retries.
    pub async fn execute(&self, call: &ToolCallRequest, session: &SessionContext) -> ToolResult {
        let Some(tool) = self.registry.get(&call.name) else {
            warn!(tool = %call.name, "Model requested unknown tool");
            return ToolResult::failure(format!("Unknown tool: {}", call.name));
        };

        let started = Instant::now();
        let outcome = match tokio::time::timeout(self.timeout, tool.execute(&call.arguments, session))
            .await
        {
            Ok(result) => result,
            Err(_) => Err(ToolError::Timeout {
                tool_name: call.name.clone(),
                timeout_secs: self.timeout.as_secs(),
            }),
        };
        let duration_ms = started.elapsed().as_millis() as u64;

        match outcome {
            Ok(data) => {
                debug!(tool = %call.name, success = true, duration_ms, "Tool executed");
                ToolResult::ok(data)
            }
            Err(e) => {
                warn!(tool = %call.name, success = false, duration_ms, error = %e, "Tool failed");
                ToolResult::failure(format!("Failed to execute {}: {e}", call.name))
            }
        }
    }
}

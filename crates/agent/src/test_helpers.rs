//! Shared test helpers for loop tests.

use async_trait::async_trait;
use cowork_core::error::{ProviderError, ToolError};
use cowork_core::provider::{ModelReply, Provider, ProviderRequest, ProviderResponse, Usage};
use cowork_core::session::SessionContext;
use cowork_core::tool::{Tool, ToolCallRequest, ToolOutput, ToolRegistry};
use cowork_tools::ToolExecutor;
use serde_json::{Map, Value, json};
use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// A provider that replays a script of replies and records every request.
///
/// Once the script runs out it answers with `InvalidResponse`.
pub struct ScriptedProvider {
    script: Mutex<VecDeque<Result<ModelReply, ProviderError>>>,
    requests: Mutex<Vec<ProviderRequest>>,
}

impl ScriptedProvider {
    pub fn new(script: Vec<Result<ModelReply, ProviderError>>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Only successful replies.
    pub fn replies(replies: Vec<ModelReply>) -> Self {
        Self::new(replies.into_iter().map(Ok).collect())
    }

    pub fn requests(&self) -> Vec<ProviderRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl Provider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn send_turn(&self, request: ProviderRequest) -> Result<ProviderResponse, ProviderError> {
        self.requests.lock().unwrap().push(request);
        let next = self
            .script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(ProviderError::InvalidResponse("script exhausted".into())));

        next.map(|reply| ProviderResponse {
            reply,
            usage: Some(Usage {
                prompt_tokens: 10,
                completion_tokens: 5,
                total_tokens: 15,
            }),
            model: "scripted-model".into(),
        })
    }
}

pub fn text(t: &str) -> ModelReply {
    ModelReply::Text(t.into())
}

/// A tool-call reply; each entry is `(tool name, arguments object)`.
pub fn calls(entries: &[(&str, Value)]) -> ModelReply {
    ModelReply::ToolCalls(
        entries
            .iter()
            .map(|(name, args)| {
                let arguments = match args {
                    Value::Object(m) => m.clone(),
                    _ => Map::new(),
                };
                ToolCallRequest::new(*name, arguments)
            })
            .collect(),
    )
}

/// A tool returning a fixed payload, or failing with a fixed message.
pub struct StaticTool {
    pub name: &'static str,
    pub output: Value,
    pub failure: Option<&'static str>,
    pub calls: AtomicUsize,
}

impl StaticTool {
    pub fn ok(name: &'static str, output: Value) -> Arc<Self> {
        Arc::new(Self {
            name,
            output,
            failure: None,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn failing(name: &'static str, reason: &'static str) -> Arc<Self> {
        Arc::new(Self {
            name,
            output: Value::Null,
            failure: Some(reason),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Tool for StaticTool {
    fn name(&self) -> &str {
        self.name
    }

    fn description(&self) -> &str {
        "Test tool"
    }

    fn parameters_schema(&self) -> Value {
        json!({"type": "object", "properties": {}})
    }

    async fn execute(
        &self,
        _arguments: &Map<String, Value>,
        _session: &SessionContext,
    ) -> Result<ToolOutput, ToolError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(reason) = self.failure {
            return Err(ToolError::ExecutionFailed {
                tool_name: self.name.into(),
                reason: reason.into(),
            });
        }
        Ok(match &self.output {
            Value::Object(m) => m.clone(),
            _ => Map::new(),
        })
    }
}

pub fn executor(tools: Vec<Arc<dyn Tool>>) -> Arc<ToolExecutor> {
    Arc::new(ToolExecutor::new(
        Arc::new(ToolRegistry::from_tools(tools)),
        Duration::from_secs(30),
    ))
}

pub fn session() -> SessionContext {
    SessionContext::new("test-token")
}

//! Per-request loop bookkeeping.

use cowork_core::message::Turn;
use cowork_core::tool::{ToolCallRequest, ToolResponse, ToolResult};

/// Progress of one request through the loop.
#[derive(Debug, Clone, PartialEq)]
pub struct LoopState {
    /// Tool rounds executed so far.
    pub iteration: u32,
    pub max_iterations: u32,
    pub final_text: Option<String>,
    pub tool_calls_made: usize,
}

impl LoopState {
    pub fn new(max_iterations: u32) -> Self {
        Self {
            iteration: 0,
            max_iterations,
            final_text: None,
            tool_calls_made: 0,
        }
    }

    /// Whether another round of tool calls may run.
    pub fn can_run_round(&self) -> bool {
        self.iteration < self.max_iterations
    }

    pub fn begin_round(&mut self) {
        self.iteration += 1;
    }

    pub fn record_call(&mut self) {
        self.tool_calls_made += 1;
    }
}

/// Responses collected during one round, resubmitted together.
///
/// Consumed by [`RoundBatch::into_turn`], so a batch never outlives its round.
#[derive(Debug, Default)]
pub struct RoundBatch {
    responses: Vec<ToolResponse>,
}

impl RoundBatch {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            responses: Vec::with_capacity(capacity),
        }
    }

    pub fn push(&mut self, call: &ToolCallRequest, result: ToolResult) {
        self.responses.push(ToolResponse {
            call_id: call.id.clone(),
            name: call.name.clone(),
            result,
        });
    }

    pub fn len(&self) -> usize {
        self.responses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.responses.is_empty()
    }

    pub fn into_turn(self) -> Turn {
        Turn::tool_responses(self.responses)
    }
}

//! The agent orchestration loop for Cowork.
//!
//! One request runs through a **model turn → tool round** cycle:
//!
//! 1. **Receive** the user's message plus prior history
//! 2. **Ask the model** with the system prompt and tool catalog
//! 3. **If tool calls**: run them in order, streaming `tool_call` and
//!    `tool_result` events, then resubmit the whole round and go back to 2
//! 4. **If text**: stream `text` and `done`
//!
//! Rounds are bounded. When the bound is hit the model is asked once more
//! with tools disabled so the user still gets an answer.

pub mod emitter;
pub mod loop_runner;
pub mod state;
pub mod stream_event;

#[cfg(test)]
mod test_helpers;

pub use emitter::{EmitError, StreamEmitter};
pub use loop_runner::{AgentLoop, LoopOutcome};
pub use state::{LoopState, RoundBatch};
pub use stream_event::{StreamEvent, ToolCallPayload, ToolResultPayload};

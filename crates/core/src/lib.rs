//! # Cowork Core
//!
//! Domain types, traits, and error definitions for the Cowork agent runtime.
//! This crate has **no framework dependencies**: it defines the model that
//! the provider, tool, agent and gateway crates implement against.
//!
//! - [`Provider`] abstracts the language model (`send_turn`).
//! - [`Tool`] and [`ToolRegistry`] describe the fixed tool catalog.
//! - [`ToolResult`] is the uniform envelope every tool execution produces.
//! - [`Conversation`] is the append-only turn log of one request.

pub mod error;
pub mod message;
pub mod provider;
pub mod session;
pub mod tool;

// Re-export key types at crate root for ergonomics
pub use error::{Error, ProviderError, ServiceError, ToolError};
pub use message::{Conversation, Role, Turn, TurnContent};
pub use provider::{
    ModelReply, Provider, ProviderRequest, ProviderResponse, ToolChoice, ToolDefinition, Usage,
};
pub use session::SessionContext;
pub use tool::{Tool, ToolCallRequest, ToolOutput, ToolRegistry, ToolResponse, ToolResult};

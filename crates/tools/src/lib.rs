//! Workspace tools for Cowork.
//!
//! Tools let the agent act in the user's Google Workspace: search and read
//! mail, draft replies, list and create calendar events, and find, read or
//! create Drive files. Each tool talks to a service trait so tests can run
//! without network access.

pub mod args;
pub mod calendar;
pub mod catalog;
pub mod drive;
pub mod executor;
pub mod mail;
pub mod services;

#[cfg(test)]
mod fakes;

pub use catalog::{SYSTEM_PROMPT, WorkspaceServices, system_prompt, workspace_registry};
pub use executor::ToolExecutor;

//! Language model provider implementations for Cowork.
//!
//! All providers implement the `cowork_core::Provider` trait.

pub mod gemini;

pub use gemini::GeminiProvider;

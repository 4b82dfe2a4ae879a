//! Error types for the Cowork domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each bounded context has its own error enum; only provider and stream
//! failures are allowed to end a request abnormally.

use thiserror::Error;

/// The top-level error type for all Cowork operations.
#[derive(Debug, Error)]
pub enum Error {
    // --- Provider errors ---
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    // --- Tool errors ---
    #[error("Tool error: {0}")]
    Tool(#[from] ToolError),

    /// The client transport went away while the request was in flight.
    #[error("Output stream closed by client")]
    StreamClosed,
}

// --- Bounded context errors ---

#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    #[error("API request failed: {message} (status: {status_code})")]
    ApiError { status_code: u16, message: String },

    #[error("Rate limited by provider, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Invalid response from provider: {0}")]
    InvalidResponse(String),

    #[error("Provider not configured: {0}")]
    NotConfigured(String),
}

impl ProviderError {
    /// A short label that is safe to show to an end user.
    ///
    /// Raw provider bodies can contain request echoes, so clients only ever
    /// see this category, never the `Display` output.
    pub fn category(&self) -> &'static str {
        match self {
            Self::ApiError { .. } => "model API error",
            Self::RateLimited { .. } => "model rate limit reached",
            Self::AuthenticationFailed(_) => "model authentication failed",
            Self::Timeout(_) => "model request timed out",
            Self::Network(_) => "model unreachable",
            Self::InvalidResponse(_) => "unexpected model response",
            Self::NotConfigured(_) => "model not configured",
        }
    }
}

/// Failures reported by an external productivity service (mail, calendar, files).
#[derive(Debug, Clone, Error)]
pub enum ServiceError {
    #[error("Authorization expired or insufficient: {0}")]
    Unauthorized(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Rate limited by {0}")]
    RateLimited(String),

    #[error("{service} returned {status}: {message}")]
    Api {
        service: String,
        status: u16,
        message: String,
    },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Malformed response: {0}")]
    InvalidResponse(String),
}

#[derive(Debug, Error)]
pub enum ToolError {
    #[error("Invalid tool arguments: {0}")]
    InvalidArguments(String),

    #[error("Tool execution failed: {tool_name}: {reason}")]
    ExecutionFailed { tool_name: String, reason: String },

    #[error("Tool timed out: {tool_name} after {timeout_secs}s")]
    Timeout { tool_name: String, timeout_secs: u64 },

    #[error(transparent)]
    Service(#[from] ServiceError),
}

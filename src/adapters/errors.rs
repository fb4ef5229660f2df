//! Venue adapter error types
//!
//! All adapter-related errors are wrapped in the AdapterError enum
//! which implements thiserror for consistent error handling.

use thiserror::Error;

/// Venue-specific error types for adapter operations
#[derive(Error, Debug)]
pub enum AdapterError {
    /// Connection to the venue failed
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Subscription to a ticker stream failed
    #[error("Subscription failed for {instrument}: {reason}")]
    SubscriptionFailed { instrument: String, reason: String },

    /// Catalog endpoint failure
    #[error("Catalog fetch failed: {0}")]
    CatalogUnavailable(String),

    /// Network operation timed out
    #[error("Network timeout after {0}ms")]
    NetworkTimeout(u64),

    /// Invalid or unexpected response from the venue
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// WebSocket protocol error (boxed to reduce enum size)
    #[error("WebSocket error: {0}")]
    WebSocket(Box<tokio_tungstenite::tungstenite::Error>),
}

/// Result type alias for adapter operations
pub type AdapterResult<T> = std::result::Result<T, AdapterError>;

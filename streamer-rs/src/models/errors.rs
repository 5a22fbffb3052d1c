//! Module errors

use thiserror::Error;

/// Represents the different types of errors surfaced by the streaming core.
///
/// Every kind is recoverable by retrying `connect`, `start` or `stop`.
#[derive(Debug, Error)]
pub enum StreamerError {
    /// A session was requested without a live device link.
    #[error("Device not connected")]
    NotConnected,

    /// The wireless transport service is not bound.
    #[error("Transport service unavailable")]
    ServiceUnavailable,

    /// The asynchronous connect attempt failed.
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Tearing down the link failed.
    #[error("Disconnect failed: {0}")]
    DisconnectFailed(String),

    /// A step of session start failed. The session moved to `Failed`.
    #[error("Stream setup failed: {0}")]
    StreamSetupFailed(String),

    /// A stop-side operation failed. Closed writers and issued stop commands are kept.
    #[error("Stop failed: {0}")]
    StopFailed(String),

    /// A board command other than session setup or stop failed.
    #[error("Device command failed: {0}")]
    Command(String),

    /// `stop` was called before any session was started.
    #[error("No session has been started")]
    NoSession,

    /// The data root holds no session directory.
    #[error("No sessions found in {0}")]
    NoSessions(String),

    /// Settings could not be read or parsed.
    #[error("Settings error: {0}")]
    Settings(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

//! Error types for the input synthesis library.

use thiserror::Error;

/// Result type alias for waymation operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while synthesizing input or polling the cursor.
#[derive(Debug, Error)]
pub enum Error {
    /// Failed to connect to the injection backend.
    #[error("failed to connect backend: {0}")]
    ConnectFailed(String),

    /// The operation requires elevated permissions.
    #[error("permission denied: {0}")]
    PermissionDenied(String),

    /// Failed to inject an input event.
    #[error("failed to inject event: {0}")]
    InjectFailed(String),

    /// A key name could not be parsed.
    #[error("unknown key name: {0:?}")]
    UnknownKey(String),

    /// A mouse button name could not be parsed.
    #[error("unknown button name: {0:?}")]
    UnknownButton(String),

    /// A swipe speed name could not be parsed.
    #[error("unknown swipe speed: {0:?}")]
    UnknownSpeed(String),

    /// A character has no key mapping on the active backend.
    #[error("cannot type character {0:?}")]
    UnsupportedChar(char),

    /// No cursor position source is available.
    #[error("cursor position unavailable: {0}")]
    CursorUnavailable(String),

    /// Thread-related error.
    #[error("thread error: {0}")]
    ThreadError(String),

    /// The requested feature is not supported in this build or compositor.
    #[error("not supported: {0}")]
    NotSupported(String),

    /// I/O error from a socket or device node.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

use std::time::Duration;

/// Errors that can occur during APRS-IS client operations.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// TCP connect, read, or write failure.
    #[error("connection error: {0}")]
    Connection(#[from] std::io::Error),

    /// Connect or read exceeded the configured timeout.
    #[error("timeout after {0:?}")]
    Timeout(Duration),

    /// Server closed the connection before the login handshake completed.
    #[error("disconnected")]
    Disconnected,

    /// First line from the server was not an `# aprsc ` greeting.
    #[error("server did not greet: {line:?}")]
    NoGreeting {
        /// The line received instead.
        line: String,
    },

    /// Login response was not `# logresp <call> unverified`.
    #[error("read-only login not confirmed: {line:?}")]
    LoginNotConfirmed {
        /// The line received instead.
        line: String,
    },

    /// Protocol-level parsing error.
    #[error("protocol error: {0}")]
    Protocol(#[from] aprs_is_protocol::ProtocolError),

    /// Method called in the wrong session state (e.g., `next_packet` before login).
    #[error("invalid state: expected {expected}, actual {actual}")]
    InvalidState {
        /// The state required for the operation.
        expected: &'static str,
        /// The current session state.
        actual: &'static str,
    },
}

impl ClientError {
    /// True for failures of the TCP stream itself.
    pub fn is_connection_error(&self) -> bool {
        matches!(
            self,
            Self::Connection(_) | Self::Timeout(_) | Self::Disconnected
        )
    }

    /// True when the server answered, but not with what the handshake expects.
    pub fn is_protocol_error(&self) -> bool {
        matches!(
            self,
            Self::NoGreeting { .. } | Self::LoginNotConfirmed { .. } | Self::Protocol(_)
        )
    }
}

/// Convenience alias for `Result<T, ClientError>`.
pub type Result<T> = std::result::Result<T, ClientError>;

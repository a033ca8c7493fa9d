#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    #[error("invalid filter: {0}")]
    InvalidFilter(String),

    #[error("invalid number: {0:?}")]
    InvalidNumber(String),

    #[error("unknown packet type: {0:?}")]
    UnknownPacketType(char),

    #[error("invalid greeting: {0:?}")]
    InvalidGreeting(String),

    #[error("invalid login response: {0:?}")]
    InvalidLoginResponse(String),
}

pub type Result<T> = std::result::Result<T, ProtocolError>;

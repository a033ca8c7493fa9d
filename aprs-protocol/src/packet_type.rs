use crate::error::{ProtocolError, Result};

/// Packet classes selectable by a type filter (`t/...`).
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum PacketType {
    Items,
    Message,
    NwsBulletin,
    Objects,
    Position,
    Query,
    Status,
    Telemetry,
    UserDefined,
    Weather,
}

impl PacketType {
    /// Every packet type, in wire-character order.
    pub const ALL: [Self; 10] = [
        Self::Items,
        Self::Message,
        Self::NwsBulletin,
        Self::Objects,
        Self::Position,
        Self::Query,
        Self::Status,
        Self::Telemetry,
        Self::UserDefined,
        Self::Weather,
    ];

    /// Wire character.
    pub fn as_char(self) -> char {
        match self {
            Self::Items => 'i',
            Self::Message => 'm',
            Self::NwsBulletin => 'n',
            Self::Objects => 'o',
            Self::Position => 'p',
            Self::Query => 'q',
            Self::Status => 's',
            Self::Telemetry => 't',
            Self::UserDefined => 'u',
            Self::Weather => 'w',
        }
    }

    /// Parse from the wire character (case-sensitive).
    pub fn from_char(c: char) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_char() == c)
            .ok_or(ProtocolError::UnknownPacketType(c))
    }
}

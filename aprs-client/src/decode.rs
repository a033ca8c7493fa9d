/// Turns one data line into an application packet.
///
/// The client hands every non-comment line (delimiter and surrounding
/// whitespace removed) to the decoder. An `Err` drops the line; it never ends
/// the packet stream.
pub trait PacketDecoder {
    type Packet;
    type Error: std::fmt::Debug;

    fn decode(&self, line: &[u8]) -> Result<Self::Packet, Self::Error>;
}

/// Default decoder backed by the `aprs-parser` crate.
#[derive(Clone, Copy, Debug, Default)]
pub struct AprsDecoder;

impl PacketDecoder for AprsDecoder {
    type Packet = aprs_parser::AprsPacket;
    type Error = aprs_parser::DecodeError;

    fn decode(&self, line: &[u8]) -> Result<Self::Packet, Self::Error> {
        aprs_parser::AprsPacket::decode_textual(line)
    }
}

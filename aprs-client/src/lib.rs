//! Async read-only APRS-IS client.
//!
//! Connects to an APRS-IS server (by default the `rotate.aprs2.net` pool),
//! logs in receive-only with an optional server-side filter, and yields
//! decoded APRS packets.

mod client;
mod connection;
mod decode;
pub mod error;
#[cfg(test)]
mod mock;
mod state;
mod stream;

pub use aprs_is_protocol::{
    Filter, FilterKind, Numeric, PacketType, Point, ServerInfo, Software, parse_filters,
};
pub use client::AprsIsClient;
pub use decode::{AprsDecoder, PacketDecoder};
pub use error::{ClientError, Result};
pub use state::{ClientConfig, SessionState, SessionStats};

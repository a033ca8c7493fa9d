//! APRS-IS protocol types: filter expressions, login directive, and server lines.
//!
//! This crate has no I/O. It renders what a client sends to an APRS-IS
//! server and classifies what the server sends back.

pub mod error;
pub mod filter;
pub mod login;
pub mod numeric;
pub mod packet_type;
pub mod point;
pub mod response;

pub use error::{ProtocolError, Result};
pub use filter::{Filter, FilterKind, parse_filters};
pub use login::{Login, Software};
pub use numeric::Numeric;
pub use packet_type::PacketType;
pub use point::Point;
pub use response::{LineKind, LoginResponse, LoginStatus, ServerInfo};

/// Line delimiter used in both directions.
pub const DELIMITER: &[u8] = b"\r\n";

/// Prefix of every server-generated comment line, including the greeting.
pub const SERVER_COMMENT_PREFIX: &str = "# aprsc ";

/// Default APRS-IS rotation pool.
pub const DEFAULT_HOST: &str = "rotate.aprs2.net";

/// Default user-filter port.
pub const DEFAULT_PORT: u16 = 14580;

use crate::SERVER_COMMENT_PREFIX;
use crate::error::{ProtocolError, Result};

const LOGRESP_PREFIX: &str = "# logresp ";

/// Classification of a line received after login.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum LineKind {
    /// `# aprsc ...` keepalive or status comment.
    ServerComment,
    /// Anything else: a candidate APRS packet.
    Data,
}

impl LineKind {
    /// Classify a line that has already been stripped of its delimiter.
    pub fn classify(line: &[u8]) -> Self {
        if line.starts_with(SERVER_COMMENT_PREFIX.as_bytes()) {
            Self::ServerComment
        } else {
            Self::Data
        }
    }
}

/// Server identification parsed from the greeting banner.
///
/// `# aprsc 2.1.14-g5e22b37 14 Mar 2024 12:00:00 GMT T2TEST 10.0.0.1:14580`
/// yields software `aprsc`, version `2.1.14-g5e22b37`, and the rest as banner.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ServerInfo {
    pub software: String,
    pub version: String,
    pub banner: String,
    /// Server name reported in the login response (`server <NAME>`).
    pub server_name: Option<String>,
}

impl ServerInfo {
    /// Parse a greeting line (delimiter and surrounding whitespace removed).
    pub fn parse_greeting(line: &str) -> Result<Self> {
        let rest = line
            .strip_prefix(SERVER_COMMENT_PREFIX)
            .ok_or_else(|| ProtocolError::InvalidGreeting(line.to_owned()))?;

        let software = SERVER_COMMENT_PREFIX[1..].trim().to_owned();
        let rest = rest.trim_start();
        let (version, banner) = match rest.split_once(char::is_whitespace) {
            Some((version, banner)) => (version, banner.trim()),
            None => (rest, ""),
        };

        Ok(Self {
            software,
            version: version.to_owned(),
            banner: banner.to_owned(),
            server_name: None,
        })
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum LoginStatus {
    Verified,
    Unverified,
}

/// A parsed `# logresp` line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LoginResponse {
    pub callsign: String,
    pub status: LoginStatus,
    pub server: Option<String>,
}

impl LoginResponse {
    /// Parse `# logresp <call> <verified|unverified>[, server <NAME>]`.
    pub fn parse(line: &str) -> Result<Self> {
        let invalid = || ProtocolError::InvalidLoginResponse(line.to_owned());

        let rest = line.strip_prefix(LOGRESP_PREFIX).ok_or_else(invalid)?;
        let mut words = rest.split_whitespace();
        let callsign = words.next().ok_or_else(invalid)?.to_owned();
        let status = match words.next().map(|w| w.trim_end_matches(',')) {
            Some("unverified") => LoginStatus::Unverified,
            Some("verified") => LoginStatus::Verified,
            _ => return Err(invalid()),
        };
        let server = words
            .skip_while(|w| *w != "server")
            .nth(1)
            .map(|name| name.trim_end_matches(',').to_owned());

        Ok(Self {
            callsign,
            status,
            server,
        })
    }

    /// The strict read-only check: the line must begin with
    /// `# logresp <call> unverified`, callsign compared case-sensitively.
    pub fn confirms_read_only(line: &str, callsign: &str) -> bool {
        line.strip_prefix(LOGRESP_PREFIX)
            .and_then(|rest| rest.strip_prefix(callsign))
            .is_some_and(|rest| rest.starts_with(" unverified"))
    }
}

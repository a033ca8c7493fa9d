use std::time::Duration;

use aprs_is_protocol::{DEFAULT_HOST, DEFAULT_PORT, Filter, Login, Software};

/// Session state machine.
///
/// Transitions: `Closed` → `Connecting` → `AwaitingGreeting` →
/// `AwaitingLoginResponse` → `Authenticated` → `Closed`. Any failure before
/// `Authenticated` returns to `Closed`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionState {
    /// No connection handles held.
    Closed,
    /// TCP connect in progress.
    Connecting,
    /// Connected; waiting for the `# aprsc` greeting.
    AwaitingGreeting,
    /// Login directive sent; waiting for `# logresp`.
    AwaitingLoginResponse,
    /// Read-only login confirmed; packets may be read.
    Authenticated,
}

impl SessionState {
    /// Returns the state name as a static string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Closed => "Closed",
            Self::Connecting => "Connecting",
            Self::AwaitingGreeting => "AwaitingGreeting",
            Self::AwaitingLoginResponse => "AwaitingLoginResponse",
            Self::Authenticated => "Authenticated",
        }
    }
}

/// Configuration for [`AprsIsClient`](crate::AprsIsClient) sessions.
#[derive(Clone, Debug)]
pub struct ClientConfig {
    /// Server host name or address. Default: `rotate.aprs2.net`.
    pub host: String,
    /// Server port. Default: 14580 (user-defined filter port).
    pub port: u16,
    /// Login callsign, sent verbatim.
    pub callsign: String,
    /// Server-side filters, rendered in this order. Empty means the full feed.
    pub filters: Vec<Filter>,
    /// Optional `vers` identification sent with the login.
    pub software: Option<Software>,
    /// Timeout for the TCP connection. Default: 10 seconds.
    pub connect_timeout: Duration,
    /// Timeout for each line read. Default: 300 seconds.
    pub read_timeout: Duration,
}

impl ClientConfig {
    /// Defaults for everything except the callsign.
    pub fn new(callsign: impl Into<String>) -> Self {
        Self {
            host: DEFAULT_HOST.to_owned(),
            port: DEFAULT_PORT,
            callsign: callsign.into(),
            filters: Vec::new(),
            software: None,
            connect_timeout: Duration::from_secs(10),
            read_timeout: Duration::from_secs(300),
        }
    }

    pub fn with_server(mut self, host: impl Into<String>, port: u16) -> Self {
        self.host = host.into();
        self.port = port;
        self
    }

    pub fn with_filter(mut self, filter: Filter) -> Self {
        self.filters.push(filter);
        self
    }

    pub fn with_filters(mut self, filters: impl IntoIterator<Item = Filter>) -> Self {
        self.filters.extend(filters);
        self
    }

    pub fn with_software(mut self, software: Software) -> Self {
        self.software = Some(software);
        self
    }

    /// The login directive for this configuration.
    pub fn login(&self) -> Login<'_> {
        Login::new(&self.callsign, &self.filters).with_software(self.software.as_ref())
    }

    /// `host:port`, as passed to the resolver.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Line counts for the lifetime of a session.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SessionStats {
    /// `# aprsc` comment lines skipped after login.
    pub comments: u64,
    /// Data lines decoded into packets.
    pub packets: u64,
    /// Data lines the decoder rejected.
    pub dropped: u64,
}

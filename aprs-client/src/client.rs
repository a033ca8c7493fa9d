use std::ops::AsyncFnOnce;

use aprs_is_protocol::{LineKind, LoginResponse, ServerInfo};
use futures_core::Stream;
use tracing::{debug, info, trace, warn};

use crate::connection::Connection;
use crate::decode::{AprsDecoder, PacketDecoder};
use crate::error::{ClientError, Result};
use crate::state::{ClientConfig, SessionState, SessionStats};

/// Async read-only APRS-IS client.
///
/// Implements the login state machine:
/// `Closed` → `Connecting` → `AwaitingGreeting` → `AwaitingLoginResponse` →
/// `Authenticated` → `Closed`.
///
/// Dropping the client releases the socket. [`close()`](Self::close) does the
/// same gracefully, and [`scoped()`](Self::scoped) closes on every exit path.
///
/// # Example
///
/// ```no_run
/// # async fn example() -> aprs_is_client::Result<()> {
/// use aprs_is_client::{AprsIsClient, ClientConfig, Filter, Point};
///
/// let config = ClientConfig::new("N0CALL")
///     .with_filter(Filter::range(Point::new(39.1, -94.6), 50));
/// let mut client = AprsIsClient::connect(config).await?;
///
/// while let Some(packet) = client.next_packet().await? {
///     println!("{packet:?}");
/// }
/// # Ok(())
/// # }
/// ```
pub struct AprsIsClient<D = AprsDecoder> {
    config: ClientConfig,
    decoder: D,
    connection: Option<Connection>,
    state: SessionState,
    server_info: Option<ServerInfo>,
    stats: SessionStats,
}

impl AprsIsClient<AprsDecoder> {
    /// Create a closed client that decodes packets with `aprs-parser`.
    pub fn new(config: ClientConfig) -> Self {
        Self::with_decoder(config, AprsDecoder)
    }

    /// Create a client and run the login handshake.
    ///
    /// On success the client is in [`SessionState::Authenticated`].
    pub async fn connect(config: ClientConfig) -> Result<Self> {
        let mut client = Self::new(config);
        client.open().await?;
        Ok(client)
    }
}

impl<D: PacketDecoder> AprsIsClient<D> {
    /// Create a closed client using a custom packet decoder.
    pub fn with_decoder(config: ClientConfig, decoder: D) -> Self {
        Self {
            config,
            decoder,
            connection: None,
            state: SessionState::Closed,
            server_info: None,
            stats: SessionStats::default(),
        }
    }

    // -- Accessors --

    /// Returns the current session state.
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// True while the connection handles are held.
    pub fn is_open(&self) -> bool {
        self.connection.is_some()
    }

    /// Greeting and login-response details from the current or last session.
    pub fn server_info(&self) -> Option<&ServerInfo> {
        self.server_info.as_ref()
    }

    /// Line counts for the current or last session.
    pub fn stats(&self) -> SessionStats {
        self.stats
    }

    /// Returns the configuration used for this client.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// The login directive this client sends, without the delimiter.
    pub fn login_line(&self) -> String {
        self.config.login().format_line()
    }

    // -- Lifecycle --

    /// Connect and log in. A no-op if the session is already authenticated.
    ///
    /// Any failure leaves the client `Closed` with no handles held; nothing
    /// is retried.
    pub async fn open(&mut self) -> Result<()> {
        if self.state == SessionState::Authenticated && self.connection.is_some() {
            debug!("already authenticated, not logging in again");
            return Ok(());
        }

        self.connection = None;
        let mut state = StateGuard::new(&mut self.state);
        match handshake(&self.config, &mut state).await {
            Ok((connection, server_info)) => {
                state.commit(SessionState::Authenticated);
                info!(
                    callsign = %self.config.callsign,
                    server = server_info.server_name.as_deref().unwrap_or("unknown"),
                    "read-only login confirmed"
                );
                self.connection = Some(connection);
                self.server_info = Some(server_info);
                self.stats = SessionStats::default();
                Ok(())
            }
            Err(e) => {
                drop(state);
                warn!(error = %e, "login failed");
                Err(e)
            }
        }
    }

    /// Shut down the write side and release both halves. Idempotent.
    pub async fn close(&mut self) {
        if let Some(mut connection) = self.connection.take() {
            if let Err(e) = connection.shutdown().await {
                debug!(error = %e, "shutdown failed");
            }
            info!("connection closed");
        }
        self.state = SessionState::Closed;
    }

    /// Open the session, run `body`, then close it whether `body` succeeded
    /// or not.
    ///
    /// If the returned future is dropped mid-flight the client is dropped
    /// with it, which releases the socket.
    pub async fn scoped<T, F>(mut self, body: F) -> Result<T>
    where
        F: AsyncFnOnce(&mut Self) -> Result<T>,
    {
        self.open().await?;
        let result = body(&mut self).await;
        self.close().await;
        result
    }

    // -- Packet reading (Authenticated) --

    /// Read the next decoded packet.
    ///
    /// Server comments and blank lines are skipped. Lines the decoder rejects
    /// are dropped with a warning and counted in [`stats()`](Self::stats).
    /// Returns `Ok(None)` on clean end-of-stream and `Err` on any I/O fault
    /// or read timeout; both leave the client `Closed`.
    /// Requires state `Authenticated`.
    pub async fn next_packet(&mut self) -> Result<Option<D::Packet>> {
        loop {
            let read = match self.connection.as_mut() {
                Some(connection) => connection.read_line().await,
                None => return Err(invalid_state(self.state)),
            };

            let line = match read {
                Ok(Some(line)) => line,
                Ok(None) => {
                    info!("server closed the connection");
                    self.release();
                    return Ok(None);
                }
                Err(e) => {
                    warn!(error = %e, "stream failed");
                    self.release();
                    return Err(e);
                }
            };

            if line.is_empty() {
                continue;
            }

            match LineKind::classify(&line) {
                LineKind::ServerComment => {
                    self.stats.comments += 1;
                    debug!(line = %String::from_utf8_lossy(&line), "server comment");
                }
                LineKind::Data => match self.decoder.decode(&line) {
                    Ok(packet) => {
                        self.stats.packets += 1;
                        trace!(line = %String::from_utf8_lossy(&line), "packet");
                        return Ok(Some(packet));
                    }
                    Err(err) => {
                        self.stats.dropped += 1;
                        warn!(
                            error = ?err,
                            line = %String::from_utf8_lossy(&line),
                            "dropping undecodable line"
                        );
                    }
                },
            }
        }
    }

    // -- Stream conversion --

    /// Consume this client and return a [`Stream`] of packets.
    ///
    /// Logs in first if the client is not yet authenticated. The stream
    /// ends with `None` on EOF, or after yielding one `Err`.
    pub fn into_stream(self) -> impl Stream<Item = Result<D::Packet>> {
        crate::stream::packet_stream(self)
    }

    // -- Private helpers --

    fn release(&mut self) {
        self.connection = None;
        self.state = SessionState::Closed;
    }
}

/// Holds the session state during a handshake. Unless committed, the state
/// falls back to `Closed` when the guard is dropped, including when the
/// `open()` future itself is dropped mid-handshake.
struct StateGuard<'a> {
    state: &'a mut SessionState,
    committed: bool,
}

impl<'a> StateGuard<'a> {
    fn new(state: &'a mut SessionState) -> Self {
        Self {
            state,
            committed: false,
        }
    }

    fn set(&mut self, next: SessionState) {
        trace!(from = self.state.as_str(), to = next.as_str(), "state");
        *self.state = next;
    }

    fn commit(mut self, next: SessionState) {
        self.set(next);
        self.committed = true;
    }
}

impl Drop for StateGuard<'_> {
    fn drop(&mut self) {
        if !self.committed {
            *self.state = SessionState::Closed;
        }
    }
}

async fn handshake(
    config: &ClientConfig,
    state: &mut StateGuard<'_>,
) -> Result<(Connection, ServerInfo)> {
    for filter in &config.filters {
        filter.validate()?;
    }

    state.set(SessionState::Connecting);
    info!(addr = %config.addr(), callsign = %config.callsign, "connecting");
    let mut connection = Connection::connect(
        &config.host,
        config.port,
        config.connect_timeout,
        config.read_timeout,
    )
    .await?;

    state.set(SessionState::AwaitingGreeting);
    let greeting = read_handshake_line(&mut connection).await?;
    let mut server_info = ServerInfo::parse_greeting(&greeting)
        .map_err(|_| ClientError::NoGreeting { line: greeting.clone() })?;
    debug!(
        software = %server_info.software,
        version = %server_info.version,
        "server greeted"
    );

    let login = config.login();
    debug!(login = %login.format_line(), "logging in");
    connection.send_raw(&login.to_bytes()).await?;

    state.set(SessionState::AwaitingLoginResponse);
    let response = read_handshake_line(&mut connection).await?;
    if !LoginResponse::confirms_read_only(&response, &config.callsign) {
        return Err(ClientError::LoginNotConfirmed { line: response });
    }
    server_info.server_name = LoginResponse::parse(&response)
        .ok()
        .and_then(|r| r.server);

    Ok((connection, server_info))
}

fn invalid_state(actual: SessionState) -> ClientError {
    ClientError::InvalidState {
        expected: SessionState::Authenticated.as_str(),
        actual: actual.as_str(),
    }
}

async fn read_handshake_line(connection: &mut Connection) -> Result<String> {
    let line = connection
        .read_line()
        .await?
        .ok_or(ClientError::Disconnected)?;
    Ok(String::from_utf8_lossy(&line).into_owned())
}

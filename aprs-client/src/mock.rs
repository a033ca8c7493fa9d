use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpListener;
use tokio::sync::mpsc;

/// What the mock observed from the client.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MockEvent {
    /// First line sent by the client (the login directive), delimiter removed.
    Login(String),
    /// Any later line sent by the client.
    Line(String),
    /// The client closed its side of the connection.
    Disconnected,
}

pub struct MockConfig {
    /// Sent first, followed by CR LF.
    pub greeting: String,
    /// Reply to the login line. `None` answers `# logresp <call> unverified, server MOCK`.
    pub login_reply: Option<String>,
    /// Raw bytes written after the login reply.
    pub feed: Vec<Vec<u8>>,
    /// Close the connection once the feed is written.
    pub close_after_feed: bool,
    pub max_connections: usize,
}

impl MockConfig {
    /// An aprsc-like server that accepts read-only logins and sends `lines`.
    pub fn unverified(lines: &[&str]) -> Self {
        Self {
            greeting: "# aprsc 2.1.14-g5e22b37 MOCK 127.0.0.1:14580".to_owned(),
            login_reply: None,
            feed: lines
                .iter()
                .map(|line| format!("{line}\r\n").into_bytes())
                .collect(),
            close_after_feed: false,
            max_connections: 1,
        }
    }
}

pub struct MockServer {
    addr: SocketAddr,
    events: mpsc::UnboundedReceiver<MockEvent>,
    connections: Arc<AtomicUsize>,
}

impl MockServer {
    pub async fn start(config: MockConfig) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (tx, events) = mpsc::unbounded_channel();
        let connections = Arc::new(AtomicUsize::new(0));

        let counter = connections.clone();
        tokio::spawn(async move {
            Self::handle_connections(listener, Arc::new(config), tx, counter).await;
        });

        Self {
            addr,
            events,
            connections,
        }
    }

    pub fn host(&self) -> String {
        self.addr.ip().to_string()
    }

    pub fn port(&self) -> u16 {
        self.addr.port()
    }

    pub fn connections(&self) -> usize {
        self.connections.load(Ordering::SeqCst)
    }

    pub async fn next_event(&mut self) -> Option<MockEvent> {
        self.events.recv().await
    }

    /// Skip events until the client disconnects. Panics after five seconds.
    pub async fn wait_disconnected(&mut self) {
        let wait = async {
            while let Some(event) = self.events.recv().await {
                if event == MockEvent::Disconnected {
                    return;
                }
            }
        };
        tokio::time::timeout(std::time::Duration::from_secs(5), wait)
            .await
            .expect("client never disconnected");
    }

    async fn handle_connections(
        listener: TcpListener,
        config: Arc<MockConfig>,
        tx: mpsc::UnboundedSender<MockEvent>,
        connections: Arc<AtomicUsize>,
    ) {
        for _ in 0..config.max_connections {
            let Ok((stream, _)) = listener.accept().await else {
                return;
            };
            connections.fetch_add(1, Ordering::SeqCst);
            let config = config.clone();
            let tx = tx.clone();
            tokio::spawn(async move {
                Self::serve(stream, &config, &tx).await;
                let _ = tx.send(MockEvent::Disconnected);
            });
        }
    }

    async fn serve(
        stream: tokio::net::TcpStream,
        config: &MockConfig,
        tx: &mpsc::UnboundedSender<MockEvent>,
    ) {
        let (read_half, mut write_half) = stream.into_split();
        let mut reader = BufReader::new(read_half);
        let mut line = String::new();

        let greeting = format!("{}\r\n", config.greeting);
        if write_half.write_all(greeting.as_bytes()).await.is_err() {
            return;
        }
        let _ = write_half.flush().await;

        match reader.read_line(&mut line).await {
            Ok(0) | Err(_) => return,
            Ok(_) => {}
        }
        let login = line.trim_end().to_owned();
        let _ = tx.send(MockEvent::Login(login.clone()));

        let reply = match &config.login_reply {
            Some(reply) => reply.clone(),
            None => {
                let call = login.split_whitespace().nth(1).unwrap_or_default();
                format!("# logresp {call} unverified, server MOCK")
            }
        };
        if write_half
            .write_all(format!("{reply}\r\n").as_bytes())
            .await
            .is_err()
        {
            return;
        }

        for chunk in &config.feed {
            if write_half.write_all(chunk).await.is_err() {
                return;
            }
        }
        let _ = write_half.flush().await;

        if config.close_after_feed {
            let _ = write_half.shutdown().await;
            return;
        }

        loop {
            line.clear();
            match reader.read_line(&mut line).await {
                Ok(0) | Err(_) => break,
                Ok(_) => {
                    let _ = tx.send(MockEvent::Line(line.trim_end().to_owned()));
                }
            }
        }
    }
}

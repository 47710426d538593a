// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon client and the socket-backed sink.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use splice_core::{ConsoleFormatter, LogEvent};
use splice_daemon::protocol::{self, ProtocolError};
use splice_daemon::{Request, Response, DEFAULT_TIMEOUT, PROTOCOL_VERSION};
use thiserror::Error;
use tokio::net::UnixStream;
use tokio::sync::{mpsc, oneshot};

use crate::env;
use crate::sink::{Sink, SinkError};

/// Local queue capacity in front of the socket
pub const DEFAULT_LOCAL_CAPACITY: usize = 1024;

/// First wait after the daemon reports a full queue
const INITIAL_BACKOFF: Duration = Duration::from_millis(10);

/// Give up on a record once the backoff would exceed this
const MAX_BACKOFF: Duration = Duration::from_millis(640);

/// Client errors
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Daemon not running")]
    DaemonNotRunning,

    #[error("Could not determine daemon socket path")]
    NoSocketPath,

    #[error("Protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// The request went out but no response came back; it may or may not
    /// have been applied.
    #[error("No response from daemon: {0}")]
    NoResponse(#[source] ProtocolError),

    #[error("Daemon queue stayed full")]
    QueueFull,

    #[error("Request rejected: {0}")]
    Rejected(String),

    #[error("Unexpected response from daemon")]
    UnexpectedResponse,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ClientError {
    /// The connection failed before the request reached the daemon, so a
    /// fresh connection can safely send it again.
    fn is_connection_lost(&self) -> bool {
        matches!(
            self,
            ClientError::DaemonNotRunning
                | ClientError::Io(_)
                | ClientError::Protocol(
                    ProtocolError::Io(_)
                        | ProtocolError::ConnectionClosed
                        | ProtocolError::Timeout(_)
                )
        )
    }

    fn is_no_response(&self) -> bool {
        matches!(self, ClientError::NoResponse(_))
    }
}

/// Whether applying `request` twice is harmless.
fn resend_safe(request: &Request) -> bool {
    !matches!(request, Request::Log { .. })
}

/// Daemon status snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DaemonStatus {
    pub uptime_secs: u64,
    pub records_written: u64,
    pub write_failures: u64,
    pub queued: usize,
}

/// One-shot requests to the daemon, one connection per request.
#[derive(Debug, Clone)]
pub struct DaemonClient {
    socket_path: PathBuf,
}

impl DaemonClient {
    pub fn new(socket_path: impl Into<PathBuf>) -> Self {
        Self {
            socket_path: socket_path.into(),
        }
    }

    /// Client for the socket named by `SPLICE_SOCKET` or the state directory.
    pub fn from_env() -> Result<Self, ClientError> {
        env::socket_path()
            .map(Self::new)
            .ok_or(ClientError::NoSocketPath)
    }

    pub fn socket_path(&self) -> &Path {
        &self.socket_path
    }

    /// Send a request and receive a response
    pub async fn send(&self, request: &Request) -> Result<Response, ClientError> {
        let mut stream = connect(&self.socket_path).await?;
        exchange(&mut stream, request).await
    }

    pub async fn ping(&self) -> Result<(), ClientError> {
        match self.send(&Request::Ping).await? {
            Response::Pong => Ok(()),
            _ => Err(ClientError::UnexpectedResponse),
        }
    }

    pub async fn status(&self) -> Result<DaemonStatus, ClientError> {
        match self.send(&Request::Status).await? {
            Response::Status {
                uptime_secs,
                records_written,
                write_failures,
                queued,
            } => Ok(DaemonStatus {
                uptime_secs,
                records_written,
                write_failures,
                queued,
            }),
            Response::Error { message } => Err(ClientError::Rejected(message)),
            _ => Err(ClientError::UnexpectedResponse),
        }
    }

    /// Ask the daemon to drain its queue and exit
    pub async fn shutdown(&self) -> Result<(), ClientError> {
        match self.send(&Request::Shutdown).await? {
            Response::ShuttingDown => Ok(()),
            _ => Err(ClientError::UnexpectedResponse),
        }
    }
}

/// Send one request and wait for its response.
///
/// Failures after the request was written are [`ClientError::NoResponse`].
async fn exchange(stream: &mut UnixStream, request: &Request) -> Result<Response, ClientError> {
    protocol::send(stream, request, DEFAULT_TIMEOUT).await?;
    protocol::recv(stream, DEFAULT_TIMEOUT)
        .await
        .map_err(ClientError::NoResponse)
}

async fn connect(socket_path: &Path) -> Result<UnixStream, ClientError> {
    UnixStream::connect(socket_path).await.map_err(|e| match e.kind() {
        ErrorKind::NotFound | ErrorKind::ConnectionRefused => ClientError::DaemonNotRunning,
        _ => ClientError::Io(e),
    })
}

/// A long-lived connection that has completed the version handshake.
struct Connection {
    stream: UnixStream,
}

impl Connection {
    async fn open(socket_path: &Path) -> Result<Self, ClientError> {
        let mut conn = Self {
            stream: connect(socket_path).await?,
        };
        let hello = Request::Hello {
            version: PROTOCOL_VERSION.to_string(),
        };
        match conn.request(&hello).await? {
            Response::Hello { version } => {
                if version != PROTOCOL_VERSION {
                    tracing::warn!(
                        daemon = %version,
                        client = PROTOCOL_VERSION,
                        "daemon version differs from client"
                    );
                }
                Ok(conn)
            }
            _ => Err(ClientError::UnexpectedResponse),
        }
    }

    async fn request(&mut self, request: &Request) -> Result<Response, ClientError> {
        exchange(&mut self.stream, request).await
    }
}

enum Outgoing {
    Log(LogEvent),
    Flush(oneshot::Sender<Result<(), ClientError>>),
}

/// Sink that forwards events to `spliced` over its Unix socket.
///
/// Producers only push onto a local bounded queue; a background task owns
/// the connection and sends records in submission order.
#[derive(Clone)]
pub struct DaemonSink {
    tx: mpsc::Sender<Outgoing>,
}

impl DaemonSink {
    /// Connect and handshake, then start the forwarding task.
    ///
    /// Fails if the daemon is not reachable now; later outages are handled
    /// by the forwarder.
    pub async fn connect(socket_path: impl Into<PathBuf>) -> Result<Self, ClientError> {
        Self::connect_with(socket_path, DEFAULT_LOCAL_CAPACITY, ConsoleFormatter::new()).await
    }

    pub async fn connect_with(
        socket_path: impl Into<PathBuf>,
        capacity: usize,
        console: ConsoleFormatter,
    ) -> Result<Self, ClientError> {
        let socket_path = socket_path.into();
        let conn = Connection::open(&socket_path).await?;
        let (tx, rx) = mpsc::channel(capacity.max(1));
        let forwarder = Forwarder {
            socket_path,
            conn: Some(conn),
            console,
        };
        tokio::spawn(forwarder.run(rx));
        Ok(Self { tx })
    }
}

#[async_trait]
impl Sink for DaemonSink {
    fn submit(&self, event: LogEvent) -> Result<(), SinkError> {
        self.tx.try_send(Outgoing::Log(event)).map_err(|e| match e {
            mpsc::error::TrySendError::Full(_) => SinkError::QueueFull,
            mpsc::error::TrySendError::Closed(_) => SinkError::Closed,
        })
    }

    async fn flush(&self) -> Result<(), SinkError> {
        let (done_tx, done_rx) = oneshot::channel();
        self.tx
            .send(Outgoing::Flush(done_tx))
            .await
            .map_err(|_| SinkError::Closed)?;
        let result = done_rx.await.map_err(|_| SinkError::Closed)?;
        Ok(result?)
    }
}

struct Forwarder {
    socket_path: PathBuf,
    conn: Option<Connection>,
    console: ConsoleFormatter,
}

impl Forwarder {
    async fn run(mut self, mut rx: mpsc::Receiver<Outgoing>) {
        while let Some(outgoing) = rx.recv().await {
            match outgoing {
                Outgoing::Log(event) => {
                    if let Err(e) = self.deliver(&event).await {
                        tracing::warn!(error = %e, "dropping log record");
                        self.console.emit(&event);
                    }
                }
                Outgoing::Flush(done) => {
                    let result = self.flush().await;
                    let _ = done.send(result);
                }
            }
        }
    }

    async fn deliver(&mut self, event: &LogEvent) -> Result<(), ClientError> {
        let request = Request::Log {
            event: event.clone(),
        };
        let mut backoff = INITIAL_BACKOFF;
        loop {
            match self.request_with_reconnect(&request).await? {
                Response::Ok => return Ok(()),
                Response::QueueFull if backoff <= MAX_BACKOFF => {
                    tokio::time::sleep(backoff).await;
                    backoff *= 2;
                }
                Response::QueueFull => return Err(ClientError::QueueFull),
                Response::Error { message } => return Err(ClientError::Rejected(message)),
                _ => return Err(ClientError::UnexpectedResponse),
            }
        }
    }

    async fn flush(&mut self) -> Result<(), ClientError> {
        match self.request_with_reconnect(&Request::Flush).await? {
            Response::Flushed => Ok(()),
            Response::Error { message } => Err(ClientError::Rejected(message)),
            _ => Err(ClientError::UnexpectedResponse),
        }
    }

    /// Send on the current connection; on connection loss reconnect once.
    ///
    /// A `Log` whose response went missing is not sent again, since the
    /// daemon may already have queued it.
    async fn request_with_reconnect(&mut self, request: &Request) -> Result<Response, ClientError> {
        match self.request(request).await {
            Err(e) if e.is_connection_lost() || (e.is_no_response() && resend_safe(request)) => {
                tracing::debug!(error = %e, "daemon connection lost, reconnecting");
                self.conn = None;
                let result = self.request(request).await;
                if result.is_err() {
                    self.conn = None;
                }
                result
            }
            Err(e) => {
                self.conn = None;
                Err(e)
            }
            ok => ok,
        }
    }

    async fn request(&mut self, request: &Request) -> Result<Response, ClientError> {
        if self.conn.is_none() {
            self.conn = Some(Connection::open(&self.socket_path).await?);
        }
        let conn = self.conn.as_mut().ok_or(ClientError::DaemonNotRunning)?;
        conn.request(request).await
    }
}

#[cfg(test)]
#[path = "client_tests.rs"]
mod tests;

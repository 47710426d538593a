// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Listener task for handling socket I/O.
//!
//! The Listener runs in a spawned task, accepting connections and serving
//! each one on its own task. Log requests are handed to the writer queue;
//! the listener never touches log files itself.

use std::sync::Arc;
use std::time::{Duration, Instant};

use thiserror::Error;
use tokio::net::{UnixListener, UnixStream};
use tokio::sync::Notify;
use tracing::{debug, error, info, trace, warn};

use crate::protocol::{self, Request, Response, DEFAULT_TIMEOUT, PROTOCOL_VERSION};
use crate::writer::WriterHandle;

/// How long a `Log` request waits for writer queue space before the
/// daemon answers `QueueFull`.
///
/// Must stay well below the client's response deadline ([`DEFAULT_TIMEOUT`]).
pub const ENQUEUE_WAIT: Duration = Duration::from_secs(1);

/// Longest a `Flush` request waits for the writer. Also below [`DEFAULT_TIMEOUT`].
const FLUSH_WAIT: Duration = Duration::from_secs(3);

/// Listener task for accepting socket connections.
pub struct Listener {
    socket: UnixListener,
    ctx: ConnectionContext,
}

/// Shared state handed to every connection task.
#[derive(Clone)]
struct ConnectionContext {
    writer: WriterHandle,
    start_time: Instant,
    shutdown: Arc<Notify>,
    enqueue_wait: Duration,
}

/// Errors from connection handling.
#[derive(Debug, Error)]
pub enum ConnectionError {
    #[error("Protocol error: {0}")]
    Protocol(#[from] protocol::ProtocolError),
}

impl Listener {
    pub fn new(
        socket: UnixListener,
        writer: WriterHandle,
        start_time: Instant,
        shutdown: Arc<Notify>,
    ) -> Self {
        Self {
            socket,
            ctx: ConnectionContext {
                writer,
                start_time,
                shutdown,
                enqueue_wait: ENQUEUE_WAIT,
            },
        }
    }

    /// Override [`ENQUEUE_WAIT`].
    pub fn with_enqueue_wait(mut self, enqueue_wait: Duration) -> Self {
        self.ctx.enqueue_wait = enqueue_wait;
        self
    }

    /// Run the listener loop, spawning a task for each connection.
    pub async fn run(self) {
        loop {
            match self.socket.accept().await {
                Ok((stream, _)) => {
                    let ctx = self.ctx.clone();

                    tokio::spawn(async move {
                        if let Err(e) = handle_connection(stream, ctx).await {
                            match e {
                                ConnectionError::Protocol(
                                    protocol::ProtocolError::ConnectionClosed,
                                ) => debug!("Client disconnected"),
                                ConnectionError::Protocol(protocol::ProtocolError::Timeout(_)) => {
                                    warn!("Connection timeout")
                                }
                                _ => error!("Connection error: {}", e),
                            }
                        }
                    });
                }
                Err(e) => {
                    error!("Accept error: {}", e);
                }
            }
        }
    }
}

/// Serve requests on one connection until the client hangs up.
///
/// Each request is answered before the next is read, so records sent over
/// one connection reach the writer queue in the order they were sent.
async fn handle_connection(stream: UnixStream, ctx: ConnectionContext) -> Result<(), ConnectionError> {
    let (mut reader, mut socket_writer) = stream.into_split();

    loop {
        // Producers keep connections open between records, so no read timeout
        let bytes = protocol::read_frame(&mut reader).await?;
        let request: Request = match protocol::decode(&bytes) {
            Ok(request) => request,
            Err(e) => {
                warn!(error = %e, "malformed request");
                let response = Response::Error {
                    message: e.to_string(),
                };
                protocol::send(&mut socket_writer, &response, DEFAULT_TIMEOUT).await?;
                continue;
            }
        };

        if matches!(request, Request::Log { .. }) {
            trace!("received log request");
        } else {
            info!(request = ?request, "received request");
        }

        let response = handle_request(request, &ctx).await;
        debug!("Sending response: {:?}", response);
        protocol::send(&mut socket_writer, &response, DEFAULT_TIMEOUT).await?;
    }
}

/// Handle a single request and return a response.
async fn handle_request(request: Request, ctx: &ConnectionContext) -> Response {
    let writer = &ctx.writer;
    match request {
        Request::Ping => Response::Pong,

        Request::Hello { version } => {
            if version != PROTOCOL_VERSION {
                warn!(client = %version, daemon = PROTOCOL_VERSION, "protocol version mismatch");
            }
            Response::Hello {
                version: PROTOCOL_VERSION.to_string(),
            }
        }

        Request::Log { event } => {
            match tokio::time::timeout(ctx.enqueue_wait, writer.enqueue_wait(event)).await {
                Ok(Ok(())) => Response::Ok,
                Ok(Err(e)) => Response::Error {
                    message: e.to_string(),
                },
                Err(_) => Response::QueueFull,
            }
        }

        Request::Flush => match tokio::time::timeout(FLUSH_WAIT, writer.barrier()).await {
            Ok(Ok(())) => Response::Flushed,
            Ok(Err(e)) => Response::Error {
                message: e.to_string(),
            },
            Err(_) => Response::Error {
                message: "flush timed out".to_string(),
            },
        },

        Request::Status => {
            let stats = writer.stats();
            Response::Status {
                uptime_secs: ctx.start_time.elapsed().as_secs(),
                records_written: stats.records_written,
                write_failures: stats.write_failures,
                queued: stats.queued,
            }
        }

        Request::Shutdown => {
            ctx.shutdown.notify_one();
            Response::ShuttingDown
        }
    }
}

#[cfg(test)]
#[path = "listener_tests.rs"]
mod tests;

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::time::timeout;
use tracing::{debug, info, warn};

use crate::http::parser::parse_http_request;
use crate::http::request::Request;
use crate::http::response::Response;
use crate::http::router::Router;
use crate::http::writer::ResponseWriter;

pub struct Connection<S> {
    stream: S,
    router: Arc<Router>,
    buffer_size: usize,
    read_timeout: Option<Duration>,
    state: ConnectionState,
}

enum ConnectionState {
    Reading,
    Parsing(Vec<u8>, usize),
    Dispatching(Request),
    Writing(ResponseWriter),
    Closed,
}

impl<S> Connection<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    pub fn new(stream: S, router: Arc<Router>) -> Self {
        Self {
            stream,
            router,
            buffer_size: 1024,
            read_timeout: None,
            state: ConnectionState::Reading,
        }
    }

    /// Capacity of the single read. Anything the client sends beyond it is
    /// never looked at.
    pub fn with_buffer_size(mut self, size: usize) -> Self {
        self.buffer_size = size.max(1);
        self
    }

    pub fn with_read_timeout(mut self, read_timeout: Option<Duration>) -> Self {
        self.read_timeout = read_timeout;
        self
    }

    /// Serves exactly one request and closes.
    ///
    /// Takes the connection by value: the stream is dropped, and so closed,
    /// on every return path including errors.
    pub async fn run(mut self) -> anyhow::Result<()> {
        loop {
            match std::mem::replace(&mut self.state, ConnectionState::Closed) {
                ConnectionState::Reading => {
                    let (buf, n) = self.read_request().await;
                    self.state = ConnectionState::Parsing(buf, n);
                }

                ConnectionState::Parsing(buf, n) => match parse_http_request(&buf, n) {
                    Ok(req) => {
                        self.state = ConnectionState::Dispatching(req);
                    }
                    Err(e) => {
                        warn!(error = %e, bytes = n, "Rejecting request");
                        let response = Response::bad_request(format!("Bad Request: {e}"));
                        self.state = ConnectionState::Writing(ResponseWriter::new(&response));
                    }
                },

                ConnectionState::Dispatching(req) => {
                    let (response, matched) = self.router.dispatch(&req);
                    info!(
                        method = %req.method,
                        path = %req.path,
                        status = response.status.as_u16(),
                        matched,
                        "Request handled"
                    );
                    self.state = ConnectionState::Writing(ResponseWriter::new(&response));
                }

                ConnectionState::Writing(writer) => {
                    writer
                        .write_to_stream(&mut self.stream)
                        .await
                        .context("failed to write response")?;
                    self.state = ConnectionState::Closed;
                }

                ConnectionState::Closed => {
                    if let Err(e) = self.stream.shutdown().await {
                        debug!(error = %e, "Shutdown after response failed");
                    }
                    break;
                }
            }
        }

        Ok(())
    }

    /// Performs the single read.
    ///
    /// A failed or timed-out read is logged and reported as zero bytes, which
    /// the parser turns into an empty-request rejection.
    async fn read_request(&mut self) -> (Vec<u8>, usize) {
        let mut buf = vec![0u8; self.buffer_size];

        let result = match self.read_timeout {
            Some(limit) => match timeout(limit, self.stream.read(&mut buf)).await {
                Ok(res) => res,
                Err(_) => {
                    warn!(timeout = ?limit, "Timed out waiting for request");
                    return (buf, 0);
                }
            },
            None => self.stream.read(&mut buf).await,
        };

        match result {
            Ok(n) => (buf, n),
            Err(e) => {
                warn!(error = %e, "Error reading request");
                (buf, 0)
            }
        }
    }
}

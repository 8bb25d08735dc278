use std::sync::Arc;
use std::time::Duration;

use tokio::io::AsyncReadExt;
use tokio::net::TcpStream;
use tokio::time::timeout;

use crate::config::Config;
use crate::http::parser::{Progress, RequestParser};
use crate::http::request::{Request, Validity};
use crate::http::response::Response;
use crate::http::writer::ResponseWriter;
use crate::server::dispatcher::{self, ContentHandler};

pub struct Connection {
    stream: TcpStream,
    parser: RequestParser,
    state: ConnectionState,
    config: Arc<Config>,
    handler: Arc<dyn ContentHandler>,
    read_timeout: Duration,
}

pub enum ConnectionState {
    Reading,
    Processing(Request),
    Writing(ResponseWriter, WriteOutcome),
    Closed,
}

/// What to do with the connection once the queued response is flushed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    KeepAlive,
    Close,
}

enum ReadOutcome {
    /// A full request was assembled.
    Request(Request),
    /// The peer sent bytes the parser rejected; answer then close.
    ProtocolError(Response),
    /// Peer closed, read failed, or the idle timeout expired.
    Disconnected,
}

impl Connection {
    pub fn new(
        stream: TcpStream,
        config: Arc<Config>,
        handler: Arc<dyn ContentHandler>,
        read_timeout: Duration,
    ) -> Self {
        Self {
            stream,
            parser: RequestParser::new(),
            state: ConnectionState::Reading,
            config,
            handler,
            read_timeout,
        }
    }

    pub async fn run(&mut self) -> anyhow::Result<()> {
        loop {
            match &mut self.state {
                ConnectionState::Reading => match self.read_request().await? {
                    ReadOutcome::Request(req) => {
                        self.state = ConnectionState::Processing(req);
                    }
                    ReadOutcome::ProtocolError(response) => {
                        self.state = ConnectionState::Writing(
                            ResponseWriter::new(&response),
                            WriteOutcome::Close,
                        );
                    }
                    ReadOutcome::Disconnected => {
                        self.state = ConnectionState::Closed;
                    }
                },

                ConnectionState::Processing(request) => {
                    request.validate();
                    let response =
                        dispatcher::dispatch(&self.config, request, self.handler.as_ref());
                    let outcome = if request.validity == Validity::Valid && request.keep_alive() {
                        WriteOutcome::KeepAlive
                    } else {
                        WriteOutcome::Close
                    };
                    self.state =
                        ConnectionState::Writing(ResponseWriter::new(&response), outcome);
                }

                ConnectionState::Writing(writer, outcome) => {
                    writer.write_to_stream(&mut self.stream).await?;

                    self.state = match *outcome {
                        WriteOutcome::KeepAlive => ConnectionState::Reading,
                        WriteOutcome::Close => ConnectionState::Closed,
                    };
                }

                ConnectionState::Closed => {
                    break;
                }
            }
        }

        Ok(())
    }

    /// Reads until the parser assembles a full request. Every await on the
    /// socket is bounded by the idle timeout, which resets on each
    /// successful read.
    async fn read_request(&mut self) -> anyhow::Result<ReadOutcome> {
        // Bytes left over from the previous request may already contain a
        // complete one.
        let mut progress = match self.parser.feed(&[]) {
            Ok(p) => p,
            Err(_) => return Ok(ReadOutcome::ProtocolError(Response::bad_request())),
        };

        let mut chunk = [0u8; 1024];
        loop {
            if progress == Progress::Complete {
                let Some(request) = self.parser.take_request() else {
                    anyhow::bail!("request parser reported completion without a request");
                };
                return Ok(ReadOutcome::Request(request));
            }

            let n = match timeout(self.read_timeout, self.stream.read(&mut chunk)).await {
                Ok(read) => read?,
                Err(_) => {
                    tracing::warn!("connection idle past {:?}, closing", self.read_timeout);
                    return Ok(ReadOutcome::Disconnected);
                }
            };

            if n == 0 {
                // Peer closed; any partial request is discarded.
                return Ok(ReadOutcome::Disconnected);
            }

            progress = match self.parser.feed(&chunk[..n]) {
                Ok(p) => p,
                Err(e) => {
                    tracing::warn!(error = %e, "malformed request");
                    return Ok(ReadOutcome::ProtocolError(Response::bad_request()));
                }
            };
        }
    }
}

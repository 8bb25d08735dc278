//! Byte-incremental HTTP request parser.
//!
//! The reactor delivers bytes in whatever chunks the socket produces; this
//! parser accumulates them and advances an explicit state machine as far as
//! complete lines and chunks allow, never assuming a full request arrives in
//! one delivery. Framing is decided entirely from the finished header
//! section before any byte is attributed to the body.

use std::fmt;

use bytes::{Buf, BytesMut};

use crate::http::request::{Method, Request, Validity};

/// Protocol errors, fatal to the connection they occur on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseError {
    InvalidRequestLine,
    InvalidVersion,
    InvalidHeader,
    InvalidContentLength,
    InvalidChunk,
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            ParseError::InvalidRequestLine => "malformed request line",
            ParseError::InvalidVersion => "unsupported protocol version",
            ParseError::InvalidHeader => "malformed header line",
            ParseError::InvalidContentLength => "invalid Content-Length value",
            ParseError::InvalidChunk => "malformed chunked body",
        };
        f.write_str(msg)
    }
}

impl std::error::Error for ParseError {}

/// Result of feeding bytes: either the request is done or more bytes are
/// needed. "Needing more bytes" is normal operation, not an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Progress {
    Incomplete,
    Complete,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ChunkPhase {
    /// Expecting `<hex-size>\r\n`.
    Size,
    /// Consuming the declared number of chunk bytes.
    Data { remaining: usize },
    /// Expecting the CRLF that closes a data chunk.
    DataEnd,
    /// Expecting the CRLF after the zero-size chunk.
    Trailer,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    StartLine,
    Headers,
    BodyFixed { remaining: usize },
    BodyChunked(ChunkPhase),
    Complete,
    Failed(ParseError),
}

#[derive(Default)]
struct Partial {
    method: Option<Method>,
    path: String,
    query_string: String,
    protocol_version: u8,
    headers: Vec<(String, String)>,
    body: Vec<u8>,
}

/// Incremental parser, one per connection. Feed it bytes as they arrive;
/// once it reports [`Progress::Complete`], take the request out and the
/// machine resets for the next request on the same connection.
pub struct RequestParser {
    state: State,
    buf: BytesMut,
    partial: Partial,
}

impl RequestParser {
    pub fn new() -> Self {
        Self {
            state: State::StartLine,
            buf: BytesMut::with_capacity(4096),
            partial: Partial::default(),
        }
    }

    /// Appends newly delivered bytes and advances as far as they allow.
    /// Unconsumed partial input is retained for the next call. Once failed,
    /// the parser stays failed.
    pub fn feed(&mut self, bytes: &[u8]) -> Result<Progress, ParseError> {
        if let State::Failed(e) = self.state {
            return Err(e);
        }
        self.buf.extend_from_slice(bytes);
        if let Err(e) = self.advance() {
            self.state = State::Failed(e);
            return Err(e);
        }
        if self.state == State::Complete {
            Ok(Progress::Complete)
        } else {
            Ok(Progress::Incomplete)
        }
    }

    pub fn is_complete(&self) -> bool {
        self.state == State::Complete
    }

    /// Hands over the assembled request and resets for the next one. Returns
    /// `None` unless the parser has reported completion.
    pub fn take_request(&mut self) -> Option<Request> {
        if self.state != State::Complete {
            return None;
        }
        let partial = std::mem::take(&mut self.partial);
        self.state = State::StartLine;
        Some(Request {
            method: partial.method.unwrap_or(Method::UNKNOWN),
            path: partial.path,
            query_string: partial.query_string,
            protocol_version: partial.protocol_version,
            headers: partial.headers,
            body: partial.body,
            validity: Validity::Unevaluated,
        })
    }

    fn advance(&mut self) -> Result<(), ParseError> {
        loop {
            match self.state {
                State::StartLine => {
                    let Some(line) = self.take_line() else {
                        return Ok(());
                    };
                    self.parse_start_line(&line)?;
                    self.state = State::Headers;
                }

                State::Headers => {
                    let Some(line) = self.take_line() else {
                        return Ok(());
                    };
                    if line.is_empty() {
                        // Header section done: the body mode is now fully
                        // determined by the headers just parsed.
                        self.state = self.select_body_mode()?;
                    } else {
                        self.parse_header_line(&line)?;
                    }
                }

                State::BodyFixed { remaining } => {
                    if remaining == 0 {
                        self.state = State::Complete;
                        continue;
                    }
                    let take = remaining.min(self.buf.len());
                    if take == 0 {
                        return Ok(());
                    }
                    self.partial.body.extend_from_slice(&self.buf[..take]);
                    self.buf.advance(take);
                    self.state = State::BodyFixed {
                        remaining: remaining - take,
                    };
                }

                State::BodyChunked(phase) => match phase {
                    ChunkPhase::Size => {
                        let Some(line) = self.take_line() else {
                            return Ok(());
                        };
                        let size = parse_chunk_size(&line)?;
                        self.state = if size == 0 {
                            State::BodyChunked(ChunkPhase::Trailer)
                        } else {
                            State::BodyChunked(ChunkPhase::Data { remaining: size })
                        };
                    }
                    ChunkPhase::Data { remaining } => {
                        let take = remaining.min(self.buf.len());
                        if take == 0 {
                            return Ok(());
                        }
                        self.partial.body.extend_from_slice(&self.buf[..take]);
                        self.buf.advance(take);
                        let left = remaining - take;
                        self.state = if left == 0 {
                            State::BodyChunked(ChunkPhase::DataEnd)
                        } else {
                            State::BodyChunked(ChunkPhase::Data { remaining: left })
                        };
                    }
                    ChunkPhase::DataEnd => {
                        let Some(line) = self.take_line() else {
                            return Ok(());
                        };
                        // The declared size must run exactly up to the next
                        // terminator.
                        if !line.is_empty() {
                            return Err(ParseError::InvalidChunk);
                        }
                        self.state = State::BodyChunked(ChunkPhase::Size);
                    }
                    ChunkPhase::Trailer => {
                        let Some(line) = self.take_line() else {
                            return Ok(());
                        };
                        if !line.is_empty() {
                            return Err(ParseError::InvalidChunk);
                        }
                        self.state = State::Complete;
                    }
                },

                State::Complete | State::Failed(_) => return Ok(()),
            }
        }
    }

    /// Pops one CRLF-terminated line off the buffer, without the terminator.
    fn take_line(&mut self) -> Option<String> {
        let pos = self.buf.windows(2).position(|w| w == b"\r\n")?;
        let line = String::from_utf8_lossy(&self.buf[..pos]).into_owned();
        self.buf.advance(pos + 2);
        Some(line)
    }

    fn parse_start_line(&mut self, line: &str) -> Result<(), ParseError> {
        let mut parts = line.split_whitespace();
        let method = parts.next().ok_or(ParseError::InvalidRequestLine)?;
        let target = parts.next().ok_or(ParseError::InvalidRequestLine)?;
        let version = parts.next().ok_or(ParseError::InvalidRequestLine)?;
        if parts.next().is_some() {
            return Err(ParseError::InvalidRequestLine);
        }

        // An unrecognized method is recorded, not rejected: validation
        // answers it with an error response later.
        self.partial.method = Some(Method::parse(method));

        match target.split_once('?') {
            Some((path, query)) => {
                self.partial.path = path.to_string();
                self.partial.query_string = query.to_string();
            }
            None => {
                self.partial.path = target.to_string();
                self.partial.query_string = String::new();
            }
        }

        self.partial.protocol_version = parse_version(version)?;
        Ok(())
    }

    fn parse_header_line(&mut self, line: &str) -> Result<(), ParseError> {
        let (name, value) = line.split_once(':').ok_or(ParseError::InvalidHeader)?;
        let name = name.trim().to_ascii_lowercase();
        if name.is_empty() {
            return Err(ParseError::InvalidHeader);
        }
        // Duplicates are appended, preserving multi-value semantics.
        self.partial.headers.push((name, value.trim().to_string()));
        Ok(())
    }

    fn header(&self, name: &str) -> Option<&str> {
        self.partial
            .headers
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    fn select_body_mode(&self) -> Result<State, ParseError> {
        if let Some(te) = self.header("transfer-encoding") {
            if te.split(',').any(|t| t.trim().eq_ignore_ascii_case("chunked")) {
                return Ok(State::BodyChunked(ChunkPhase::Size));
            }
        }
        if let Some(cl) = self.header("content-length") {
            let len: usize = cl
                .trim()
                .parse()
                .map_err(|_| ParseError::InvalidContentLength)?;
            return Ok(State::BodyFixed { remaining: len });
        }
        Ok(State::Complete)
    }
}

impl Default for RequestParser {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_version(token: &str) -> Result<u8, ParseError> {
    let minor = token
        .strip_prefix("HTTP/1.")
        .ok_or(ParseError::InvalidVersion)?;
    let bytes = minor.as_bytes();
    if bytes.len() != 1 || !bytes[0].is_ascii_digit() {
        return Err(ParseError::InvalidVersion);
    }
    Ok(10 + (bytes[0] - b'0'))
}

fn parse_chunk_size(line: &str) -> Result<usize, ParseError> {
    let line = line.trim();
    if line.is_empty() {
        return Err(ParseError::InvalidChunk);
    }
    usize::from_str_radix(line, 16).map_err(|_| ParseError::InvalidChunk)
}

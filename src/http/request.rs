/// HTTP request methods.
///
/// Only the methods the router can gate on are represented; anything else
/// parses as `UNKNOWN`, which is recorded rather than rejected so that
/// semantic validation can answer it with a proper error response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Method {
    /// GET - Retrieve a resource
    GET,
    /// POST - Create or submit data
    POST,
    /// DELETE - Delete a resource
    DELETE,
    /// Any method token the server does not implement
    UNKNOWN,
}

impl Method {
    /// Maps a method token to a `Method`. Case-sensitive, per the RFC.
    pub fn parse(s: &str) -> Self {
        match s {
            "GET" => Method::GET,
            "POST" => Method::POST,
            "DELETE" => Method::DELETE,
            _ => Method::UNKNOWN,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Method::GET => "GET",
            Method::POST => "POST",
            Method::DELETE => "DELETE",
            Method::UNKNOWN => "UNKNOWN",
        }
    }
}

/// Outcome of semantic validation. A request starts `Unevaluated`; the
/// connection runs [`Request::validate`] once parsing completes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Validity {
    Unevaluated,
    Valid,
    Invalid,
}

/// A parsed HTTP request.
///
/// Immutable once the parser hands it over, except for `validity` which is
/// filled in by [`Request::validate`]. Headers are an ordered multimap with
/// lower-cased names: duplicates are appended, never overwritten.
#[derive(Debug, Clone)]
pub struct Request {
    pub method: Method,
    /// Request path with the query string already split off, e.g. `/search`.
    pub path: String,
    /// Portion after the first `?`, empty if none.
    pub query_string: String,
    /// Protocol version as major*10+minor, e.g. 11 for HTTP/1.1.
    pub protocol_version: u8,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
    pub validity: Validity,
}

/// Builder for constructing Request objects, mostly useful in tests and for
/// downstream handlers that synthesize requests.
pub struct RequestBuilder {
    method: Option<Method>,
    path: Option<String>,
    query_string: String,
    protocol_version: u8,
    headers: Vec<(String, String)>,
    body: Vec<u8>,
}

impl RequestBuilder {
    pub fn new() -> Self {
        Self {
            method: None,
            path: None,
            query_string: String::new(),
            protocol_version: 11,
            headers: Vec::new(),
            body: Vec::new(),
        }
    }

    pub fn method(mut self, method: Method) -> Self {
        self.method = Some(method);
        self
    }

    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn query_string(mut self, query: impl Into<String>) -> Self {
        self.query_string = query.into();
        self
    }

    pub fn protocol_version(mut self, version: u8) -> Self {
        self.protocol_version = version;
        self
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers
            .push((name.into().to_ascii_lowercase(), value.into()));
        self
    }

    pub fn body(mut self, body: Vec<u8>) -> Self {
        self.body = body;
        self
    }

    pub fn build(self) -> Result<Request, &'static str> {
        Ok(Request {
            method: self.method.ok_or("method missing")?,
            path: self.path.ok_or("path missing")?,
            query_string: self.query_string,
            protocol_version: self.protocol_version,
            headers: self.headers,
            body: self.body,
            validity: Validity::Unevaluated,
        })
    }
}

impl Default for RequestBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl Request {
    /// Retrieves the first value of a header by name, case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        let name = name.to_ascii_lowercase();
        self.headers
            .iter()
            .find(|(k, _)| *k == name)
            .map(|(_, v)| v.as_str())
    }

    /// All values of a repeated header, in arrival order.
    pub fn header_values(&self, name: &str) -> Vec<&str> {
        let name = name.to_ascii_lowercase();
        self.headers
            .iter()
            .filter(|(k, _)| *k == name)
            .map(|(_, v)| v.as_str())
            .collect()
    }

    pub fn has_header(&self, name: &str) -> bool {
        self.header(name).is_some()
    }

    pub fn has_body(&self) -> bool {
        !self.body.is_empty()
    }

    /// Determines whether the connection should remain open after the
    /// response. HTTP/1.1 defaults to keep-alive, HTTP/1.0 to close; an
    /// explicit Connection header overrides either way.
    pub fn keep_alive(&self) -> bool {
        match self.header("connection") {
            Some(v) if v.eq_ignore_ascii_case("close") => false,
            Some(v) if v.eq_ignore_ascii_case("keep-alive") => true,
            _ => self.protocol_version >= 11,
        }
    }

    pub fn is_method_valid(&self) -> bool {
        self.method != Method::UNKNOWN
    }

    /// The path must be absolute and free of `..` traversal segments.
    pub fn is_path_valid(&self) -> bool {
        self.path.starts_with('/') && !self.path.split('/').any(|seg| seg == "..")
    }

    pub fn is_query_string_valid(&self) -> bool {
        !self.query_string.chars().any(|c| c.is_ascii_control())
    }

    pub fn is_protocol_version_valid(&self) -> bool {
        matches!(self.protocol_version, 10 | 11)
    }

    /// HTTP/1.1 requires exactly one Host header.
    pub fn is_headers_valid(&self) -> bool {
        if self.protocol_version >= 11 {
            self.header_values("host").len() == 1
        } else {
            self.header_values("host").len() <= 1
        }
    }

    /// A declared Content-Length must agree with the body actually framed.
    /// Chunked requests carry no meaningful Content-Length.
    pub fn is_body_valid(&self) -> bool {
        if self.has_header("transfer-encoding") {
            return true;
        }
        match self.header("content-length") {
            Some(v) => v
                .trim()
                .parse::<usize>()
                .is_ok_and(|len| len == self.body.len()),
            None => true,
        }
    }

    /// Runs every semantic check and records the verdict. An invalid request
    /// still gets a well-formed error response downstream.
    pub fn validate(&mut self) -> Validity {
        let ok = self.is_method_valid()
            && self.is_path_valid()
            && self.is_query_string_valid()
            && self.is_protocol_version_valid()
            && self.is_headers_valid()
            && self.is_body_valid();
        self.validity = if ok { Validity::Valid } else { Validity::Invalid };
        self.validity
    }
}

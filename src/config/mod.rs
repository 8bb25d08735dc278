//! Routing configuration.
//!
//! The server is configured through a small textual DSL of nested
//! `server { ... }` and `location { ... }` blocks:
//!
//! ```text
//! server {
//!     host 127.0.0.1;
//!     root /var/www;
//!     index index.html;
//!     methods GET POST;
//!
//!     location /old {
//!         return 301 /new;
//!     }
//! }
//! ```
//!
//! [`lexer`] turns the raw text into a token stream, [`parser`] consumes the
//! tokens into a [`Config`] tree. The tree is built once at startup and
//! shared read-only with every connection; no directive is ever reinterpreted
//! after load. Merging of server-level defaults into locations happens at
//! request time in [`crate::router`], not here.

pub mod lexer;
pub mod parser;

pub use parser::{ConfigError, parse_file, parse_str};

use std::collections::BTreeSet;

use crate::http::request::Method;

/// A `return <status> <target>;` directive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Redirect {
    pub status: u16,
    pub target: String,
}

/// A `location <path> { ... }` block: a path-prefix-scoped override of the
/// enclosing server's defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Location {
    /// Path prefix the block applies to, e.g. `/images`.
    pub path: String,
    pub root: Option<String>,
    pub index_files: Vec<String>,
    /// Empty set means the directive was not given; the router treats that
    /// as "all methods allowed".
    pub methods: BTreeSet<Method>,
    pub redirect: Option<Redirect>,
}

/// A `server { ... }` block: one virtual host.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServerBlock {
    /// Value matched against the request's `Host` header. Empty if the
    /// directive was not given.
    pub host: String,
    /// Document root. Empty if the directive was not given.
    pub root: String,
    pub index_files: Vec<String>,
    pub methods: BTreeSet<Method>,
    pub redirect: Option<Redirect>,
    pub locations: Vec<Location>,
}

/// The parsed configuration tree. Immutable for the process lifetime.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Config {
    pub servers: Vec<ServerBlock>,
}

//! Recursive-descent parser for the configuration DSL.
//!
//! Consumes the token stream from [`crate::config::lexer`] with one token of
//! lookahead, using `accept`/`expect` primitives. Any grammar violation is a
//! [`ConfigError`] carrying the offending token's position where one is
//! available; a broken config is never partially applied.

use std::collections::BTreeSet;
use std::fmt;
use std::path::Path;

use crate::config::lexer::{Token, tokenize};
use crate::config::{Config, Location, Redirect, ServerBlock};
use crate::http::request::Method;

/// Error raised for an unparsable configuration. Fatal to startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigError {
    pub message: String,
    pub line: Option<usize>,
    pub col: Option<usize>,
}

impl ConfigError {
    fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            line: None,
            col: None,
        }
    }

    fn at(message: impl Into<String>, tok: &Token) -> Self {
        Self {
            message: message.into(),
            line: Some(tok.line),
            col: Some(tok.col),
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.line, self.col) {
            (Some(line), Some(col)) => {
                write!(f, "{} (line {}, col {})", self.message, line, col)
            }
            _ => write!(f, "{}", self.message),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Reads and parses the config file at `path`.
pub fn parse_file(path: impl AsRef<Path>) -> Result<Config, ConfigError> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).map_err(|e| {
        ConfigError::new(format!("cannot read config file {}: {}", path.display(), e))
    })?;
    parse_str(&text)
}

/// Parses config text into a [`Config`] tree.
pub fn parse_str(text: &str) -> Result<Config, ConfigError> {
    Parser::new(tokenize(text)).parse_config()
}

struct Parser {
    toks: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn new(toks: Vec<Token>) -> Self {
        Self { toks, pos: 0 }
    }

    fn eof(&self) -> bool {
        self.pos >= self.toks.len()
    }

    fn peek(&self) -> Option<&Token> {
        self.toks.get(self.pos)
    }

    fn next(&mut self) -> Result<Token, ConfigError> {
        let tok = self
            .toks
            .get(self.pos)
            .cloned()
            .ok_or_else(|| ConfigError::new("unexpected end of config"))?;
        self.pos += 1;
        Ok(tok)
    }

    /// Consumes the next token only if it matches `kw` exactly.
    fn accept(&mut self, kw: &str) -> bool {
        if self.peek().is_some_and(|t| t.text == kw) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    /// Like `accept`, but failure to match is a parse error.
    fn expect(&mut self, kw: &str, msg: &str) -> Result<(), ConfigError> {
        if self.accept(kw) {
            return Ok(());
        }
        match self.peek() {
            Some(tok) => Err(ConfigError::at(format!("{} (got '{}')", msg, tok.text), tok)),
            None => Err(ConfigError::new(format!("{} (got end of config)", msg))),
        }
    }

    /// Consumes a directive argument: the next token, which must not be
    /// punctuation. A `;` here means the argument is missing.
    fn value(&mut self, directive: &str) -> Result<Token, ConfigError> {
        let tok = self.next()?;
        if matches!(tok.text.as_str(), "{" | "}" | ";") {
            return Err(ConfigError::at(
                format!("missing value for '{}'", directive),
                &tok,
            ));
        }
        Ok(tok)
    }

    fn parse_config(mut self) -> Result<Config, ConfigError> {
        let mut servers = Vec::new();
        while !self.eof() {
            self.expect("server", "expected 'server'")?;
            self.expect("{", "expected '{' after server")?;
            servers.push(self.parse_server()?);
        }
        if servers.is_empty() {
            return Err(ConfigError::new("config declares no server block"));
        }
        Ok(Config { servers })
    }

    fn parse_server(&mut self) -> Result<ServerBlock, ConfigError> {
        let mut srv = ServerBlock::default();
        while !self.accept("}") {
            if self.eof() {
                return Err(ConfigError::new(
                    "unexpected end of config inside server block",
                ));
            }

            if self.accept("location") {
                srv.locations.push(self.parse_location()?);
            } else if self.accept("host") {
                srv.host = self.value("host")?.text;
                self.expect(";", "missing ';' after host")?;
            } else if self.accept("root") {
                srv.root = self.value("root")?.text;
                self.expect(";", "missing ';' after root")?;
            } else if self.accept("index") {
                self.parse_index(&mut srv.index_files)?;
            } else if self.accept("methods") {
                self.parse_methods(&mut srv.methods)?;
            } else if self.accept("return") {
                srv.redirect = Some(self.parse_return()?);
            } else {
                let tok = self.next()?;
                return Err(ConfigError::at(
                    format!("unknown directive '{}' in server block", tok.text),
                    &tok,
                ));
            }
        }
        Ok(srv)
    }

    fn parse_location(&mut self) -> Result<Location, ConfigError> {
        let path = self.value("location")?;
        let mut loc = Location {
            path: path.text,
            ..Location::default()
        };
        self.expect("{", "expected '{' after location path")?;

        // `host` is deliberately not recognized here: a location cannot
        // switch virtual hosts.
        while !self.accept("}") {
            if self.eof() {
                return Err(ConfigError::new(
                    "unexpected end of config inside location block",
                ));
            }

            if self.accept("root") {
                loc.root = Some(self.value("root")?.text);
                self.expect(";", "missing ';' after root")?;
            } else if self.accept("index") {
                self.parse_index(&mut loc.index_files)?;
            } else if self.accept("methods") {
                self.parse_methods(&mut loc.methods)?;
            } else if self.accept("return") {
                loc.redirect = Some(self.parse_return()?);
            } else {
                let tok = self.next()?;
                return Err(ConfigError::at(
                    format!("unknown directive '{}' in location block", tok.text),
                    &tok,
                ));
            }
        }
        Ok(loc)
    }

    fn parse_index(&mut self, files: &mut Vec<String>) -> Result<(), ConfigError> {
        let mut count = 0;
        while !self.accept(";") {
            if self.eof() {
                return Err(ConfigError::new("unexpected end of config in index directive"));
            }
            let tok = self.next()?;
            if matches!(tok.text.as_str(), "{" | "}") {
                return Err(ConfigError::at(
                    format!("unexpected '{}' in index directive", tok.text),
                    &tok,
                ));
            }
            files.push(tok.text);
            count += 1;
        }
        if count == 0 {
            return Err(ConfigError::new(
                "index directive requires at least one filename",
            ));
        }
        Ok(())
    }

    fn parse_methods(&mut self, methods: &mut BTreeSet<Method>) -> Result<(), ConfigError> {
        let mut count = 0;
        while !self.accept(";") {
            if self.eof() {
                return Err(ConfigError::new(
                    "unexpected end of config in methods directive",
                ));
            }
            let tok = self.next()?;
            let method = match tok.text.as_str() {
                "GET" => Method::GET,
                "POST" => Method::POST,
                "DELETE" => Method::DELETE,
                other => {
                    return Err(ConfigError::at(
                        format!("invalid method '{}' (allowed: GET POST DELETE)", other),
                        &tok,
                    ));
                }
            };
            methods.insert(method);
            count += 1;
        }
        if count == 0 {
            return Err(ConfigError::new(
                "methods directive requires at least one method",
            ));
        }
        Ok(())
    }

    fn parse_return(&mut self) -> Result<Redirect, ConfigError> {
        let status_tok = self.value("return")?;
        let target = self.value("return")?;
        let status: u16 = status_tok.text.parse().map_err(|_| {
            ConfigError::at(
                format!("invalid status code '{}' in return directive", status_tok.text),
                &status_tok,
            )
        })?;
        if status == 0 {
            return Err(ConfigError::at(
                "status code in return directive must be positive",
                &status_tok,
            ));
        }
        self.expect(";", "missing ';' after return")?;
        Ok(Redirect {
            status,
            target: target.text,
        })
    }
}

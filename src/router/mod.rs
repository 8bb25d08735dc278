//! Route resolution.
//!
//! Combines the configuration tree with a parsed request: selects the
//! virtual host by `Host` header, the location by longest path prefix, and
//! merges location-level overrides over server-level defaults field by
//! field. The resulting [`RouteDecision`] is a plain value; the dispatcher
//! turns it into a response.

use std::collections::BTreeSet;

use crate::config::{Config, Location, Redirect, ServerBlock};
use crate::http::request::{Method, Request};

/// What the dispatcher should do with the request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteOutcome {
    /// A configured `return` directive applies. Checked first: a redirect
    /// fires regardless of method restrictions or a missing root.
    Redirect { status: u16, target: String },
    /// The request method is not in the effective method set.
    MethodNotAllowed,
    /// Nothing is configured to serve this request.
    NotFound,
    /// Hand the request to the downstream content handler.
    Matched,
}

/// The effective routing parameters for one request, after location-level
/// values have shadowed server-level ones.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteDecision {
    pub root: Option<String>,
    pub index_files: Vec<String>,
    /// Empty set means no `methods` directive applied anywhere, which
    /// allows every method.
    pub methods: BTreeSet<Method>,
    pub redirect: Option<Redirect>,
    /// Path prefix of the matched location, if any location matched.
    pub matched_location: Option<String>,
    pub outcome: RouteOutcome,
}

/// Resolves a request against the configuration.
pub fn resolve(config: &Config, request: &Request) -> RouteDecision {
    let Some(server) = select_server(config, request.header("host")) else {
        return RouteDecision {
            root: None,
            index_files: Vec::new(),
            methods: BTreeSet::new(),
            redirect: None,
            matched_location: None,
            outcome: RouteOutcome::NotFound,
        };
    };
    let location = select_location(server, &request.path);

    // Location-level values shadow server-level ones field by field, not
    // wholesale.
    let root = location
        .and_then(|l| l.root.clone())
        .or_else(|| (!server.root.is_empty()).then(|| server.root.clone()));
    let index_files = match location {
        Some(l) if !l.index_files.is_empty() => l.index_files.clone(),
        _ => server.index_files.clone(),
    };
    let methods = match location {
        Some(l) if !l.methods.is_empty() => l.methods.clone(),
        _ => server.methods.clone(),
    };
    let redirect = location
        .and_then(|l| l.redirect.clone())
        .or_else(|| server.redirect.clone());
    let matched_location = location.map(|l| l.path.clone());

    let outcome = if let Some(redirect) = &redirect {
        RouteOutcome::Redirect {
            status: redirect.status,
            target: redirect.target.clone(),
        }
    } else if !methods.is_empty() && !methods.contains(&request.method) {
        RouteOutcome::MethodNotAllowed
    } else if root.is_none() {
        RouteOutcome::NotFound
    } else {
        RouteOutcome::Matched
    };

    RouteDecision {
        root,
        index_files,
        methods,
        redirect,
        matched_location,
        outcome,
    }
}

/// Picks the server block whose host matches the request's Host header
/// exactly; falls back to the first declared server.
fn select_server<'a>(config: &'a Config, host: Option<&str>) -> Option<&'a ServerBlock> {
    host.and_then(|h| config.servers.iter().find(|s| s.host == h))
        .or_else(|| config.servers.first())
}

/// Picks the location with the longest path prefix of the request path.
/// Ties go to the first declared, which strict `>` preserves.
fn select_location<'a>(server: &'a ServerBlock, path: &str) -> Option<&'a Location> {
    let mut best: Option<&Location> = None;
    for loc in &server.locations {
        if path.starts_with(&loc.path) && best.is_none_or(|b| loc.path.len() > b.path.len()) {
            best = Some(loc);
        }
    }
    best
}

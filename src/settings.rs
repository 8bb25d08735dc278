use std::time::Duration;

const DEFAULT_LISTEN: &str = "127.0.0.1:8080";
const DEFAULT_READ_TIMEOUT_SECS: u64 = 30;

/// Process-level settings, read from the environment.
///
/// The routing configuration lives in the config file passed on the command
/// line; these settings only cover where to bind and how patient the server
/// is with slow peers.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Addresses to listen on, e.g. `127.0.0.1:8080`.
    pub listen_addrs: Vec<String>,
    /// Idle limit for a connection waiting on request bytes.
    pub read_timeout: Duration,
}

impl Settings {
    pub fn load() -> Self {
        let listen_addrs = std::env::var("LISTEN")
            .unwrap_or_else(|_| DEFAULT_LISTEN.to_string())
            .split(',')
            .map(|a| a.trim().to_string())
            .filter(|a| !a.is_empty())
            .collect();

        let read_timeout = std::env::var("READ_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .map(Duration::from_secs)
            .unwrap_or_else(|| Duration::from_secs(DEFAULT_READ_TIMEOUT_SECS));

        Self {
            listen_addrs,
            read_timeout,
        }
    }
}

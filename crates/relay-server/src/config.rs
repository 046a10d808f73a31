//! Configuration for the relay server.
//!
//! Defaults can be overridden via a few environment variables:
//!
//! - `RELAY_BIND_ADDR`          (default: "0.0.0.0")
//! - `RELAY_PORT`               (default: "5002")
//! - `RELAY_MAX_CLIENTS`        (default: "1024")
//! - `RELAY_PING_INTERVAL_SECS` (default: "25")
//!
//! The socket path and the origin allow-list are fixed at compile time.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use anyhow::Context;

/// Path the WebSocket endpoint is mounted under.
pub const SOCKET_PATH: &str = "/ws/socket.io";

/// Origins allowed to open connections and make cross-origin requests.
pub const ALLOWED_ORIGINS: &[&str] = &[
    "https://dok-arealanalyse-api.azurewebsites.net",
    "http://localhost:5173",
    "http://localhost:5000",
    "http://localhost",
];

/// Server configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// IP address / interface to bind to (e.g. "0.0.0.0" or "127.0.0.1").
    pub bind_addr: String,

    /// TCP port to listen on. `0` picks a free port.
    pub port: u16,

    /// Maximum number of simultaneously connected sessions.
    pub max_clients: usize,

    /// How often each connection is pinged to detect dead peers.
    pub ping_interval: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            bind_addr: "0.0.0.0".to_string(),
            port: 5002,
            max_clients: 1024,
            ping_interval: Duration::from_secs(25),
        }
    }
}

impl Config {
    /// Construct a `Config` from environment variables, falling back
    /// to the defaults.
    pub fn from_env() -> anyhow::Result<Self> {
        let defaults = Config::default();

        let bind_addr = env::var("RELAY_BIND_ADDR").unwrap_or(defaults.bind_addr);
        let port = read_env_or_default("RELAY_PORT", defaults.port)?;
        let max_clients = read_env_or_default("RELAY_MAX_CLIENTS", defaults.max_clients)?;
        let ping_secs = read_env_or_default("RELAY_PING_INTERVAL_SECS", defaults.ping_interval.as_secs())?;

        if ping_secs == 0 {
            anyhow::bail!("RELAY_PING_INTERVAL_SECS must be greater than zero");
        }

        Ok(Config {
            bind_addr,
            port,
            max_clients,
            ping_interval: Duration::from_secs(ping_secs),
        })
    }

    /// Convenience: `addr:port` socket string.
    pub fn socket_addr_string(&self) -> String {
        format!("{}:{}", self.bind_addr, self.port)
    }
}

/// Whether `origin` is on the allow-list.
pub fn is_allowed_origin(origin: &str) -> bool {
    ALLOWED_ORIGINS.iter().any(|allowed| *allowed == origin)
}

fn read_env_or_default<T>(key: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(key) {
        Ok(val) => val
            .trim()
            .parse::<T>()
            .with_context(|| format!("invalid value for {key}: {val:?}")),
        Err(_) => Ok(default),
    }
}

//! Connection configuration.
//!
//! Built once at startup from command-line flags, optionally merged with a
//! MySQL client options file, and passed by reference into the collector.
//! Precedence: explicit flag, then options file, then built-in default.

mod options_file;

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

pub use options_file::{ConfigError, load_options_file};

/// Default server host.
pub const DEFAULT_HOST: &str = "localhost";
/// Default server port.
pub const DEFAULT_PORT: u16 = 3306;
/// Default account name.
pub const DEFAULT_USER: &str = "root";
/// Default bound for the connect handshake and for each query.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Fully resolved connection settings.
#[derive(Clone, PartialEq, Eq)]
pub struct ConnectionConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: Option<String>,
    /// Unix socket path. When set, TCP host and port are not used.
    pub socket: Option<PathBuf>,
    pub database: Option<String>,
    pub timeout: Duration,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            user: DEFAULT_USER.to_string(),
            password: None,
            socket: None,
            database: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl ConnectionConfig {
    /// Human-readable connection target for log lines.
    pub fn target(&self) -> String {
        match &self.socket {
            Some(path) => format!("{}@unix:{}", self.user, path.display()),
            None => format!("{}@{}:{}", self.user, self.host, self.port),
        }
    }
}

impl fmt::Debug for ConnectionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("socket", &self.socket)
            .field("database", &self.database)
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Partially specified settings from one configuration layer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConnectionOverrides {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub user: Option<String>,
    pub password: Option<String>,
    pub socket: Option<PathBuf>,
    pub database: Option<String>,
}

impl ConnectionOverrides {
    /// Fills every unset field from `fallback`.
    pub fn or(self, fallback: ConnectionOverrides) -> ConnectionOverrides {
        ConnectionOverrides {
            host: self.host.or(fallback.host),
            port: self.port.or(fallback.port),
            user: self.user.or(fallback.user),
            password: self.password.or(fallback.password),
            socket: self.socket.or(fallback.socket),
            database: self.database.or(fallback.database),
        }
    }

    /// Applies built-in defaults to whatever is still unset.
    ///
    /// An empty password or database name counts as unset.
    pub fn resolve(self, timeout: Duration) -> ConnectionConfig {
        ConnectionConfig {
            host: self.host.unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port: self.port.unwrap_or(DEFAULT_PORT),
            user: self.user.unwrap_or_else(|| DEFAULT_USER.to_string()),
            password: self.password.filter(|p| !p.is_empty()),
            socket: self.socket,
            database: self.database.filter(|d| !d.is_empty()),
            timeout,
        }
    }
}

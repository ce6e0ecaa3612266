//! MySQL introspection collector.
//!
//! Runs the three introspection queries over a single connection:
//! - `SHOW GLOBAL STATUS` — runtime counters
//! - `SHOW VARIABLES` — configuration values
//! - `SHOW SLAVE STATUS` — replica health (empty on a primary)
//!
//! `mysql_async` needs a Tokio runtime. The collector owns a private
//! current-thread runtime and blocks on every call, so callers get a plain
//! synchronous API and nothing runs concurrently.

mod queries;
mod rows;

use std::future::Future;
use std::time::Duration;

use mysql_async::prelude::Queryable;
use mysql_async::{Conn, Opts, OptsBuilder, Row};
use tokio::runtime::{Builder, Runtime};
use tracing::{debug, info, warn};

use crate::collector::traits::{FetchError, StatusSource, TextRow};
use crate::config::ConnectionConfig;
use queries::{GLOBAL_STATUS_QUERY, SLAVE_STATUS_QUERY, VARIABLES_QUERY};
use rows::{column_maps, name_value_map, row_cells, row_columns};

/// Error type for establishing the MySQL connection.
#[derive(Debug, thiserror::Error)]
pub enum ConnectError {
    /// The private I/O runtime could not be created.
    #[error("couldn't start I/O runtime: {0}")]
    Runtime(#[source] std::io::Error),
    /// Handshake or authentication failed.
    #[error("{}", format_mysql_error(.0))]
    Driver(#[source] mysql_async::Error),
    /// The server did not answer within the configured timeout.
    #[error("connect timed out after {0:?}")]
    Timeout(Duration),
}

/// Blocking MySQL collector over one connection.
pub struct MysqlCollector {
    runtime: Runtime,
    conn: Conn,
    timeout: Duration,
}

impl MysqlCollector {
    /// Connects to the server described by `config`.
    ///
    /// `config.timeout` bounds the handshake here and every query later.
    /// A zero timeout disables the bound.
    pub fn connect(config: &ConnectionConfig) -> Result<Self, ConnectError> {
        let runtime = Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(ConnectError::Runtime)?;

        let timeout = config.timeout;
        let opts = build_opts(config);
        info!(server = %config.target(), ?timeout, "connecting to MySQL");

        let conn = runtime
            .block_on(with_timeout(timeout, Conn::new(opts)))
            .ok_or(ConnectError::Timeout(timeout))?
            .map_err(ConnectError::Driver)?;

        debug!(server = %config.target(), "MySQL connection established");
        Ok(Self {
            runtime,
            conn,
            timeout,
        })
    }

    /// Runs one text-protocol query and returns all rows.
    fn query_rows(&mut self, sql: &'static str) -> Result<Vec<Row>, FetchError> {
        let Self {
            runtime,
            conn,
            timeout,
        } = self;
        let timeout = *timeout;

        let rows = runtime
            .block_on(with_timeout(timeout, conn.query::<Row, _>(sql)))
            .ok_or(FetchError::Timeout(timeout))??;

        debug!(query = sql, rows = rows.len(), "query executed");
        Ok(rows)
    }

    /// Closes the connection. Failures are logged, not returned.
    pub fn close(self) {
        let Self {
            runtime,
            conn,
            timeout,
        } = self;

        match runtime.block_on(with_timeout(timeout, conn.disconnect())) {
            Some(Ok(())) => debug!("MySQL connection closed"),
            Some(Err(e)) => {
                warn!(error = %format_mysql_error(&e), "failed to close MySQL connection")
            }
            None => warn!(?timeout, "timed out closing MySQL connection"),
        }
    }
}

impl StatusSource for MysqlCollector {
    fn fetch_status(&mut self) -> Result<TextRow, FetchError> {
        let result = self.query_rows(GLOBAL_STATUS_QUERY)?;
        name_value_map(result.iter().map(row_cells))
    }

    fn fetch_variables(&mut self) -> Result<TextRow, FetchError> {
        let result = self.query_rows(VARIABLES_QUERY)?;
        name_value_map(result.iter().map(row_cells))
    }

    fn fetch_replication_status(&mut self) -> Result<Vec<TextRow>, FetchError> {
        let result = self.query_rows(SLAVE_STATUS_QUERY)?;
        let Some(first) = result.first() else {
            return Ok(Vec::new());
        };
        let columns = row_columns(first);
        column_maps(&columns, result.iter().map(row_cells))
    }
}

/// Awaits `fut`, giving up after `limit`. Zero means no limit.
async fn with_timeout<F: Future>(limit: Duration, fut: F) -> Option<F::Output> {
    if limit.is_zero() {
        Some(fut.await)
    } else {
        tokio::time::timeout(limit, fut).await.ok()
    }
}

/// Translates connection settings into driver options.
fn build_opts(config: &ConnectionConfig) -> Opts {
    let builder = OptsBuilder::default()
        .user(Some(config.user.clone()))
        .pass(config.password.clone())
        .db_name(config.database.clone());

    let builder = match &config.socket {
        Some(path) => builder.socket(Some(path.to_string_lossy().into_owned())),
        None => builder
            .ip_or_hostname(config.host.clone())
            .tcp_port(config.port),
    };

    builder.into()
}

/// Formats a driver error into a short user-facing message.
pub(crate) fn format_mysql_error(e: &mysql_async::Error) -> String {
    match e {
        mysql_async::Error::Server(server) => {
            format!("ERROR {} ({}): {}", server.code, server.state, server.message)
        }
        other => {
            let msg = other.to_string();
            if msg.contains("Connection refused") {
                "connection refused".to_string()
            } else {
                msg
            }
        }
    }
}

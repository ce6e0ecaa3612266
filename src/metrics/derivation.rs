//! Metric derivation from raw introspection rows.
//!
//! Rules:
//! - No `SHOW SLAVE STATUS` row: not a replica, lag and both thread flags are 0.
//! - Otherwise `Seconds_Behind_Master`, `Slave_IO_Running` and
//!   `Slave_SQL_Running` must all be present in the first row.
//! - A thread flag is 1 only for the exact text `Yes`; anything else is 0.
//! - Thread and connection counters must be present and parse as integers.
//! - Utilization is not guarded against `max_connections = 0`.
//!
//! The first failing field aborts the whole derivation.

use tracing::{debug, warn};

use super::DerivedMetrics;
use crate::collector::{Stage, TextRow};

const SECONDS_BEHIND_MASTER: &str = "Seconds_Behind_Master";
const SLAVE_IO_RUNNING: &str = "Slave_IO_Running";
const SLAVE_SQL_RUNNING: &str = "Slave_SQL_Running";
const THREADS_RUNNING: &str = "Threads_running";
const THREADS_CONNECTED: &str = "Threads_connected";
const THREADS_CACHED: &str = "Threads_cached";
const MAX_CONNECTIONS: &str = "max_connections";
const THREAD_CACHE_SIZE: &str = "thread_cache_size";

/// Error type for metric derivation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DeriveError {
    /// A required column or variable is absent.
    #[error("no {field} in {stage} result")]
    MissingField { field: &'static str, stage: Stage },
    /// A required value is not an integer.
    #[error("failed parsing {field} from {stage} result: {value:?} is not an integer")]
    Parse {
        field: &'static str,
        stage: Stage,
        value: String,
    },
}

/// Replica lag and thread health, already normalized to integers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
struct ReplicationHealth {
    seconds_behind_master: i64,
    io_thread_running: i64,
    sql_thread_running: i64,
}

/// Derives the full metric set.
///
/// `captured_at` is stamped on every record unchanged.
pub fn derive(
    status: &TextRow,
    variables: &TextRow,
    replication: &[TextRow],
    captured_at: i32,
) -> Result<DerivedMetrics, DeriveError> {
    let health = replication_health(replication)?;

    let threads_running = integer(status, THREADS_RUNNING, Stage::Status)?;
    let threads_connected = integer(status, THREADS_CONNECTED, Stage::Status)?;
    let threads_cached = integer(status, THREADS_CACHED, Stage::Status)?;
    let max_connections = integer(variables, MAX_CONNECTIONS, Stage::Variables)?;
    let thread_cache_size = integer(variables, THREAD_CACHE_SIZE, Stage::Variables)?;

    Ok(DerivedMetrics {
        seconds_behind_master: health.seconds_behind_master,
        io_thread_running: health.io_thread_running,
        sql_thread_running: health.sql_thread_running,
        threads_running,
        threads_connected,
        threads_cached,
        max_connections,
        thread_cache_size,
        connection_utilization: connection_utilization(threads_connected, max_connections),
        captured_at,
    })
}

/// Connected sessions as a percentage of `max_connections`.
///
/// Follows IEEE-754 division: a zero `max_connections` yields `inf` for a
/// positive numerator and `NaN` for zero.
pub fn connection_utilization(threads_connected: i64, max_connections: i64) -> f64 {
    100.0 * threads_connected as f64 / max_connections as f64
}

fn replication_health(rows: &[TextRow]) -> Result<ReplicationHealth, DeriveError> {
    let Some(row) = rows.first() else {
        debug!("no slave status rows, treating server as primary");
        return Ok(ReplicationHealth::default());
    };

    if rows.len() > 1 {
        debug!(
            channels = rows.len(),
            "multiple replication channels, using the first"
        );
    }

    let lag = field(row, SECONDS_BEHIND_MASTER, Stage::SlaveStatus)?;
    if lag.is_empty() {
        warn!("Seconds_Behind_Master is NULL, replica SQL thread may be stopped");
    }
    let seconds_behind_master = parse_integer(lag, SECONDS_BEHIND_MASTER, Stage::SlaveStatus)?;

    Ok(ReplicationHealth {
        seconds_behind_master,
        io_thread_running: running_flag(row, SLAVE_IO_RUNNING)?,
        sql_thread_running: running_flag(row, SLAVE_SQL_RUNNING)?,
    })
}

/// `1` for exactly `Yes`, `0` for every other state.
fn running_flag(row: &TextRow, name: &'static str) -> Result<i64, DeriveError> {
    let value = field(row, name, Stage::SlaveStatus)?;
    Ok(if value == "Yes" { 1 } else { 0 })
}

fn field<'a>(row: &'a TextRow, name: &'static str, stage: Stage) -> Result<&'a str, DeriveError> {
    row.get(name)
        .map(String::as_str)
        .ok_or(DeriveError::MissingField { field: name, stage })
}

fn integer(row: &TextRow, name: &'static str, stage: Stage) -> Result<i64, DeriveError> {
    parse_integer(field(row, name, stage)?, name, stage)
}

/// Optional `-` then digits; a leading `+` is not accepted.
fn parse_integer(value: &str, name: &'static str, stage: Stage) -> Result<i64, DeriveError> {
    let parsed = if value.starts_with('+') {
        None
    } else {
        value.parse::<i64>().ok()
    };
    parsed.ok_or_else(|| DeriveError::Parse {
        field: name,
        stage,
        value: value.to_string(),
    })
}

//! Derived metric set and its output records.
//!
//! `derive` turns the three raw result sets into a `DerivedMetrics`;
//! `emit` renders it as tab-separated lines for the monitoring agent.

mod derivation;
mod emit;

use std::fmt;

pub use derivation::{DeriveError, connection_utilization, derive};
pub use emit::{render, write_metrics};

/// Replication lag in seconds (0 on a primary).
pub const REPLICATION_BEHIND_MASTER: &str = "mysql-lite.replication-behind-master.second";
/// Replica IO thread running, 1 or 0.
pub const REPLICATION_THREADS_IO: &str = "mysql-lite.replication-threads.io";
/// Replica SQL thread running, 1 or 0.
pub const REPLICATION_THREADS_SQL: &str = "mysql-lite.replication-threads.sql";
pub const THREADS_RUNNING: &str = "mysql-lite.threads.running";
pub const THREADS_CONNECTED: &str = "mysql-lite.threads.connected";
pub const THREADS_CACHED: &str = "mysql-lite.threads.cached";
pub const THREADS_MAX_CONNECTIONS: &str = "mysql-lite.threads.max-connections";
pub const THREADS_CACHE_SIZE: &str = "mysql-lite.threads.cache-size";
/// Connected sessions over `max_connections`, in percent.
pub const CONNECTIONS_UTILIZATION: &str = "mysql-lite.connections.utilization";

/// Numeric value of one metric.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MetricValue {
    Int(i64),
    Float(f64),
}

impl fmt::Display for MetricValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetricValue::Int(v) => write!(f, "{}", v),
            MetricValue::Float(v) => write!(f, "{}", v),
        }
    }
}

/// One output record.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Metric {
    pub name: &'static str,
    pub value: MetricValue,
}

/// Complete metric set from one probe cycle.
///
/// Every field is always populated; missing replication data has already
/// been replaced by zeros.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DerivedMetrics {
    pub seconds_behind_master: i64,
    pub io_thread_running: i64,
    pub sql_thread_running: i64,
    pub threads_running: i64,
    pub threads_connected: i64,
    pub threads_cached: i64,
    pub max_connections: i64,
    pub thread_cache_size: i64,
    /// `100 * threads_connected / max_connections`; IEEE-754 on zero max.
    pub connection_utilization: f64,
    /// Capture instant shared by every record, seconds since the epoch.
    pub captured_at: i32,
}

impl DerivedMetrics {
    /// The nine output records in emission order.
    pub fn metrics(&self) -> [Metric; 9] {
        use MetricValue::{Float, Int};

        [
            Metric {
                name: REPLICATION_BEHIND_MASTER,
                value: Int(self.seconds_behind_master),
            },
            Metric {
                name: REPLICATION_THREADS_IO,
                value: Int(self.io_thread_running),
            },
            Metric {
                name: REPLICATION_THREADS_SQL,
                value: Int(self.sql_thread_running),
            },
            Metric {
                name: THREADS_RUNNING,
                value: Int(self.threads_running),
            },
            Metric {
                name: THREADS_CONNECTED,
                value: Int(self.threads_connected),
            },
            Metric {
                name: THREADS_CACHED,
                value: Int(self.threads_cached),
            },
            Metric {
                name: THREADS_MAX_CONNECTIONS,
                value: Int(self.max_connections),
            },
            Metric {
                name: THREADS_CACHE_SIZE,
                value: Int(self.thread_cache_size),
            },
            Metric {
                name: CONNECTIONS_UTILIZATION,
                value: Float(self.connection_utilization),
            },
        ]
    }
}

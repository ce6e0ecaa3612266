//! One fetch-derive-emit cycle.
//!
//! Fetches status, variables and slave status in that order, captures one
//! timestamp, derives the metric set and writes it. Any failure aborts the
//! cycle before anything is written.

use std::io::{self, Write};

use chrono::Utc;
use tracing::debug;

use crate::collector::{ConnectError, FetchError, MysqlCollector, Stage, StatusSource};
use crate::config::{ConfigError, ConnectionConfig};
use crate::metrics::{DeriveError, DerivedMetrics, derive, write_metrics};

/// Error type for a probe cycle.
#[derive(Debug, thiserror::Error)]
pub enum ProbeError {
    /// The server could not be reached or refused the login.
    #[error("couldn't connect DB: {0}")]
    Connection(#[from] ConnectError),
    /// One of the introspection queries failed.
    #[error("couldn't fetch {stage}: {source}")]
    Fetch {
        stage: Stage,
        #[source]
        source: FetchError,
    },
    /// A required field was missing or not numeric.
    #[error(transparent)]
    Derive(#[from] DeriveError),
    /// Writing the metric lines failed.
    #[error("couldn't write metrics: {0}")]
    Output(#[from] io::Error),
    /// The options file could not be used.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl ProbeError {
    fn fetch(stage: Stage) -> impl FnOnce(FetchError) -> ProbeError {
        move |source| ProbeError::Fetch { stage, source }
    }
}

/// Fetches the three result sets from `source` and derives the metrics.
pub fn collect<S: StatusSource + ?Sized>(source: &mut S) -> Result<DerivedMetrics, ProbeError> {
    let status = source
        .fetch_status()
        .map_err(ProbeError::fetch(Stage::Status))?;
    debug!(entries = status.len(), "status fetched");

    let variables = source
        .fetch_variables()
        .map_err(ProbeError::fetch(Stage::Variables))?;
    debug!(entries = variables.len(), "variables fetched");

    let replication = source
        .fetch_replication_status()
        .map_err(ProbeError::fetch(Stage::SlaveStatus))?;
    debug!(rows = replication.len(), "slave status fetched");

    let captured_at = capture_timestamp();
    Ok(derive(&status, &variables, &replication, captured_at)?)
}

/// Runs a full cycle against `source`, writing the metric lines to `out`.
pub fn probe<S, W>(source: &mut S, out: &mut W) -> Result<DerivedMetrics, ProbeError>
where
    S: StatusSource + ?Sized,
    W: Write,
{
    let metrics = collect(source)?;
    write_metrics(&metrics, out)?;
    Ok(metrics)
}

/// Connects to the configured server and runs one cycle.
///
/// The connection is closed whether or not the cycle succeeded.
pub fn run<W: Write>(config: &ConnectionConfig, out: &mut W) -> Result<DerivedMetrics, ProbeError> {
    let mut collector = MysqlCollector::connect(config)?;
    let result = probe(&mut collector, out);
    collector.close();
    result
}

/// Current Unix time in seconds, saturated to the `i32` range.
pub fn capture_timestamp() -> i32 {
    let now = Utc::now().timestamp();
    i32::try_from(now).unwrap_or(if now < 0 { i32::MIN } else { i32::MAX })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collector::MockSource;

    #[test]
    fn primary_emits_nine_lines() {
        let mut source = MockSource::primary();
        let mut out = Vec::new();

        let metrics = probe(&mut source, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert_eq!(text.lines().count(), 9);
        assert_eq!(metrics.connection_utilization, 50.0);
        assert!(text.starts_with("mysql-lite.replication-behind-master.second\t0\t"));
        assert!(text.contains("mysql-lite.connections.utilization\t50\t"));
    }

    #[test]
    fn fetches_in_fixed_order() {
        let mut source = MockSource::replica("Yes", "Yes", "0");
        collect(&mut source).unwrap();
        assert_eq!(
            source.calls(),
            &[Stage::Status, Stage::Variables, Stage::SlaveStatus]
        );
    }

    #[test]
    fn fetch_failure_is_labelled_and_stops_later_stages() {
        let mut source = MockSource::primary();
        source.fail_at(Stage::Variables);

        let err = collect(&mut source).unwrap_err();
        assert!(matches!(
            err,
            ProbeError::Fetch {
                stage: Stage::Variables,
                ..
            }
        ));
        assert!(err.to_string().starts_with("couldn't fetch variables: "));
        assert_eq!(source.calls(), &[Stage::Status, Stage::Variables]);
    }

    #[test]
    fn slave_status_failure_label() {
        let mut source = MockSource::primary();
        source.fail_at(Stage::SlaveStatus);

        let err = collect(&mut source).unwrap_err();
        assert!(err.to_string().starts_with("couldn't fetch slave status: "));
    }

    #[test]
    fn derive_failure_writes_nothing() {
        let mut source = MockSource::primary();
        source.remove_variable("max_connections");
        let mut out = Vec::new();

        let err = probe(&mut source, &mut out).unwrap_err();
        assert!(matches!(
            err,
            ProbeError::Derive(DeriveError::MissingField {
                field: "max_connections",
                ..
            })
        ));
        assert!(out.is_empty());
    }

    #[test]
    fn missing_status_counter_writes_nothing() {
        let mut source = MockSource::primary();
        source.remove_status("Threads_running");
        let mut out = Vec::new();

        let err = probe(&mut source, &mut out).unwrap_err();
        assert!(matches!(
            err,
            ProbeError::Derive(DeriveError::MissingField {
                field: "Threads_running",
                stage: Stage::Status,
            })
        ));
        assert!(out.is_empty());
    }

    #[test]
    fn replica_without_io_thread_column_fails() {
        let mut source = MockSource::replica("Yes", "Yes", "0");
        source.remove_replication_field("Slave_IO_Running");
        let mut out = Vec::new();

        let err = probe(&mut source, &mut out).unwrap_err();
        assert!(matches!(
            err,
            ProbeError::Derive(DeriveError::MissingField {
                field: "Slave_IO_Running",
                stage: Stage::SlaveStatus,
            })
        ));
        assert_eq!(err.to_string(), "no Slave_IO_Running in slave status result");
        assert!(out.is_empty());
    }

    #[test]
    fn replica_metrics_flow_through() {
        let mut source = MockSource::replica("Yes", "No", "42");
        let mut out = Vec::new();

        probe(&mut source, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert!(lines[0].starts_with("mysql-lite.replication-behind-master.second\t42\t"));
        assert!(lines[1].starts_with("mysql-lite.replication-threads.io\t1\t"));
        assert!(lines[2].starts_with("mysql-lite.replication-threads.sql\t0\t"));
    }

    #[test]
    fn timestamp_is_current() {
        let mut source = MockSource::primary();
        let before = capture_timestamp();
        let metrics = collect(&mut source).unwrap();
        let after = capture_timestamp();
        assert!(metrics.captured_at >= before && metrics.captured_at <= after);
    }

    #[test]
    fn output_error_is_reported() {
        struct BrokenPipe;

        impl Write for BrokenPipe {
            fn write(&mut self, _: &[u8]) -> io::Result<usize> {
                Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
            }

            fn flush(&mut self) -> io::Result<()> {
                Ok(())
            }
        }

        let mut source = MockSource::primary();
        let err = probe(&mut source, &mut BrokenPipe).unwrap_err();
        assert!(matches!(err, ProbeError::Output(_)));
    }
}

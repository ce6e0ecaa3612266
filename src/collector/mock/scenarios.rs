//! Pre-built mock scenarios for testing.
//!
//! These scenarios mirror what a real server returns, including the
//! unrelated rows the probe has to ignore.

use super::source::MockSource;

impl MockSource {
    /// A primary (not a replica) with 50 of 100 connections in use.
    pub fn primary() -> Self {
        let mut source = Self::new();

        source
            .set_status("Aborted_clients", "12")
            .set_status("Connections", "48213")
            .set_status("Threads_cached", "8")
            .set_status("Threads_connected", "50")
            .set_status("Threads_created", "311")
            .set_status("Threads_running", "3")
            .set_status("Uptime", "1728000");

        source
            .set_variable("max_connections", "100")
            .set_variable("thread_cache_size", "16")
            .set_variable("version", "8.0.36")
            .set_variable("wait_timeout", "28800");

        source
    }

    /// A replica of `primary()` with the given thread states and lag.
    pub fn replica(io_running: &str, sql_running: &str, seconds_behind: &str) -> Self {
        let mut source = Self::primary();

        source.add_replication_row(&[
            ("Slave_IO_State", "Waiting for source to send event"),
            ("Master_Host", "10.0.0.1"),
            ("Master_User", "repl"),
            ("Master_Port", "3306"),
            ("Master_Log_File", "binlog.000042"),
            ("Read_Master_Log_Pos", "157"),
            ("Slave_IO_Running", io_running),
            ("Slave_SQL_Running", sql_running),
            ("Last_Errno", "0"),
            ("Last_Error", ""),
            ("Seconds_Behind_Master", seconds_behind),
            ("Channel_Name", ""),
        ]);

        source
    }
}

#[cfg(test)]
mod tests {
    use crate::collector::traits::StatusSource;

    use super::*;

    #[test]
    fn primary_has_no_replication_rows() {
        let mut source = MockSource::primary();
        assert!(source.fetch_replication_status().unwrap().is_empty());
    }

    #[test]
    fn replica_has_one_replication_row() {
        let mut source = MockSource::replica("Yes", "Yes", "0");
        let rows = source.fetch_replication_status().unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["Master_Host"], "10.0.0.1");
    }
}

//! Abstraction over where introspection rows come from.
//!
//! The `StatusSource` trait lets the probe run against a live MySQL server
//! or against an in-memory mock in tests.

use std::collections::HashMap;
use std::fmt;
use std::time::Duration;

use super::mysql_collector::format_mysql_error;

/// One decoded result row: column (or variable) name to its text value.
pub type TextRow = HashMap<String, String>;

/// The three introspection queries, in the order the probe runs them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    /// `SHOW GLOBAL STATUS`
    Status,
    /// `SHOW VARIABLES`
    Variables,
    /// `SHOW SLAVE STATUS`
    SlaveStatus,
}

impl Stage {
    /// Short label used in diagnostics.
    pub fn label(self) -> &'static str {
        match self {
            Stage::Status => "status",
            Stage::Variables => "variables",
            Stage::SlaveStatus => "slave status",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Failure of a single introspection query.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// The driver reported an error (network, protocol, privileges).
    #[error("{}", format_mysql_error(.0))]
    Driver(#[from] mysql_async::Error),
    /// The query did not finish within the configured timeout.
    #[error("query timed out after {0:?}")]
    Timeout(Duration),
    /// The result set does not have the expected shape.
    #[error("malformed result: {0}")]
    Malformed(String),
}

/// Source of raw introspection rows.
///
/// Implementations perform blocking calls; the probe invokes them one at a
/// time in `Stage` order.
pub trait StatusSource {
    /// Runs `SHOW GLOBAL STATUS` and returns it as a name/value mapping.
    fn fetch_status(&mut self) -> Result<TextRow, FetchError>;

    /// Runs `SHOW VARIABLES` and returns it as a name/value mapping.
    fn fetch_variables(&mut self) -> Result<TextRow, FetchError>;

    /// Runs `SHOW SLAVE STATUS`.
    ///
    /// Returns one mapping per row; an empty vector means the server is not
    /// a replica.
    fn fetch_replication_status(&mut self) -> Result<Vec<TextRow>, FetchError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stage_labels_match_diagnostics() {
        assert_eq!(Stage::Status.to_string(), "status");
        assert_eq!(Stage::Variables.to_string(), "variables");
        assert_eq!(Stage::SlaveStatus.to_string(), "slave status");
    }

    #[test]
    fn timeout_error_mentions_duration() {
        let err = FetchError::Timeout(Duration::from_secs(10));
        assert_eq!(err.to_string(), "query timed out after 10s");
    }
}

//! SQL text for the introspection queries.

/// Server runtime counters, two columns: `Variable_name`, `Value`.
pub(super) const GLOBAL_STATUS_QUERY: &str = "SHOW GLOBAL STATUS";

/// Server configuration values, two columns: `Variable_name`, `Value`.
pub(super) const VARIABLES_QUERY: &str = "SHOW VARIABLES";

/// Replica health, one row per replication channel (none on a primary).
pub(super) const SLAVE_STATUS_QUERY: &str = "SHOW SLAVE STATUS";

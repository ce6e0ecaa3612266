//! Introspection collector for MySQL-compatible servers.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────┐
//! │                        probe                         │
//! │   status ──▶ variables ──▶ slave status ──▶ derive   │
//! └──────────────────────────┬───────────────────────────┘
//!                            │
//!                     ┌──────▼───────┐
//!                     │ StatusSource │ (trait)
//!                     └──────┬───────┘
//!              ┌─────────────┴─────────────┐
//!       ┌──────▼─────────┐          ┌──────▼──────┐
//!       │ MysqlCollector │          │ MockSource  │
//!       │ (mysql_async)  │          │ (Testing)   │
//!       └────────────────┘          └─────────────┘
//! ```
//!
//! Every source hands back plain text rows (`TextRow`); typed coercion is
//! left to `metrics`.
//!
//! # Usage
//!
//! ```
//! use mysql_lite::collector::{MockSource, StatusSource};
//!
//! let mut source = MockSource::primary();
//! let status = source.fetch_status().unwrap();
//! assert_eq!(status["Threads_connected"], "50");
//! ```

pub mod mock;
mod mysql_collector;
mod traits;

pub use mock::MockSource;
pub use mysql_collector::{ConnectError, MysqlCollector};
pub use traits::{FetchError, Stage, StatusSource, TextRow};

//! Utility modules for mysql-lite.

mod duration_parser;

pub use duration_parser::{DurationParseError, parse_duration};

//! Mock status sources for testing.
//!
//! This module provides `MockSource` and pre-built scenarios for driving
//! the probe without a running MySQL server.

mod scenarios;
mod source;

pub use source::MockSource;

//! mysql-lite - one-shot MySQL metrics probe library.
//!
//! Provides:
//! - `collector` — introspection queries against a MySQL-compatible server
//! - `metrics` — derivation of the gauge set and its line output
//! - `probe` — one fetch-derive-emit cycle
//! - `config` — connection settings and options-file loading
//! - `util` — helper utilities

pub mod collector;
pub mod config;
pub mod metrics;
pub mod probe;
pub mod util;

//! Structured logging setup.
//!
//! Formats: pretty, compact, JSON. Output goes to stderr so that
//! `--dry-run` and `--format json` output on stdout stays parseable.

mod tracing_init;

pub use tracing_init::*;

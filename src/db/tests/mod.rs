//! Shared database repository test infrastructure
//!
//! Catalog tests are written once against `&dyn CatalogRepo` and run on:
//!
//! - **SQLite**: in-memory, runs with every `cargo test`
//! - **PostgreSQL**: testcontainers, run with `cargo test -- --ignored`
//! - **MySQL**: testcontainers, run with `cargo test -- --ignored`
//!
//! Row tests run on SQLite and MySQL, each with its own fixture, since key
//! reporting differs (rowid vs `AUTO_INCREMENT`).
//!
//! # Running tests
//!
//! ```bash
//! cargo test                       # Run fast SQLite tests only
//! cargo test -- --ignored          # Run PostgreSQL and MySQL integration tests (requires Docker)
//! cargo test -- --include-ignored  # Run all tests
//! ```

pub mod harness;

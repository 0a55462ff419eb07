//! CRUD smoke test
//!
//! Exercises SELECT, INSERT, UPDATE and DELETE against configured tables
//! using generated data. Each inserted row is deleted again when the table
//! has a primary key.

mod fake;
mod runner;

pub use fake::{FakeDataGenerator, FakeKind};
pub use runner::{SmokeError, SmokeRun, SmokeRunner};

//! Retention statement generator.
//!
//! For every table in a schema, datesweep finds the column recording when
//! each row was created and renders a `DELETE` statement that removes rows
//! dated on or before a cutoff. The statements are written to a file for
//! review and never executed.
//!
//! A separate CRUD smoke test checks that the configured connection can
//! read and write the tables it will be pointed at.

pub mod config;
pub mod db;
pub mod models;
pub mod observability;
pub mod purge;
pub mod smoke;

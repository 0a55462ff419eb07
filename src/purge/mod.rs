//! Deletion planning
//!
//! Finds the creation-time column of every table in a schema and renders a
//! `DELETE` statement that removes rows dated on or before a cutoff.
//!
//! - [`MetadataReader`]: catalog and MIN queries with a per-query timeout
//! - [`ColumnClassifier`]: picks the creation column for one table
//! - [`QueryGenerator`]: renders statements for the connected dialect
//! - [`SchemaPlanner`]: drives the above over a whole schema
//! - [`FileWriter`]: writes the plan as `<schema>_<date>.sql`

mod classifier;
mod generator;
mod metadata;
mod planner;
#[cfg(test)]
mod test_support;
mod writer;

pub use classifier::{ColumnClassifier, CreationColumnFilter, select_earliest};
pub use generator::QueryGenerator;
pub use metadata::{MetadataFetchError, MetadataReader};
pub use planner::{PlanError, SchemaPlanner};
pub use writer::{FileWriter, WriteError, render_plan};

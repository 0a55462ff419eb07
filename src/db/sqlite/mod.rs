mod catalog;
mod common;
mod rows;

pub use catalog::SqliteCatalogRepo;
pub use rows::SqliteRowRepo;

mod catalog;
mod rows;

pub use catalog::PostgresCatalogRepo;
pub use rows::PostgresRowRepo;

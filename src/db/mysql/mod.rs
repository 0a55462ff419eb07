mod catalog;
mod rows;

pub use catalog::MySqlCatalogRepo;
pub use rows::MySqlRowRepo;

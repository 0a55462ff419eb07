mod catalog;
mod rows;

pub use catalog::*;
pub use rows::*;

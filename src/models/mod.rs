mod column;
mod plan;
mod smoke;

pub use column::*;
pub use plan::*;
pub use smoke::*;

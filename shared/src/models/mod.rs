//! Domain models for CaneMap

mod field;
mod growth;
mod task;
mod variety;

pub use field::*;
pub use growth::*;
pub use task::*;
pub use variety::*;

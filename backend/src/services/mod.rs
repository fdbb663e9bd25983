//! Business logic services for the CaneMap server

pub mod field;
pub mod growth;
pub mod lockout;

pub use field::FieldService;
pub use growth::GrowthService;
pub use lockout::LockoutService;

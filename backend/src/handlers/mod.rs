//! HTTP handlers for the CaneMap server

pub mod field;
pub mod health;
pub mod login;
pub mod variety;

pub use field::*;
pub use health::*;
pub use login::*;
pub use variety::*;

//! Shared types and crop-growth logic for CaneMap
//!
//! This crate contains the growth stage engine, task recommendations and
//! domain models shared between the backend, the browser dashboards (via
//! WASM), and other components of the system. Nothing here performs I/O.

pub mod clock;
pub mod growth;
pub mod lockout;
pub mod models;
pub mod normalize;
pub mod recommendations;
pub mod validation;

pub use clock::*;
pub use growth::*;
pub use lockout::*;
pub use models::*;
pub use normalize::*;
pub use recommendations::*;
pub use validation::*;

//! Core modules of the avrowire crate.

pub mod client;
pub mod model;
pub mod schema;
pub mod serialization;

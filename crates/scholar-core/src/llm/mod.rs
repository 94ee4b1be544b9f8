//! Generation capability abstractions for Scholar.
//!
//! - `Generator`: RPITIT trait for concrete provider implementations
//! - `BoxGenerator`: Object-safe wrapper for dynamic dispatch

pub mod box_generator;
pub mod generator;

//! Application layer: services and use cases
//!
//! This layer applies configured limits and strategies to the domain logic.

pub mod error;
pub mod services;

pub use error::{ApplicationError, ApplicationResult};

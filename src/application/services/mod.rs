//! Application services
//!
//! Concrete service implementations that orchestrate domain logic under the
//! loaded [`Settings`](crate::config::Settings).

mod generation;
mod query;

pub use generation::GenerationService;
pub use query::QueryService;

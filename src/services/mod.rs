//! Business logic services.
//!
//! Services orchestrate the store and provide high-level operations.

mod resolver;

pub use resolver::{NameResolver, slugify};

//! Catalog navigation: category policy table and attribute resolver

pub mod policy;
pub mod resolver;

pub use policy::{CategoryKind, Dimension};
pub use resolver::{next_step, previous_dimension, ItemKey, ResolveStep, Selection};

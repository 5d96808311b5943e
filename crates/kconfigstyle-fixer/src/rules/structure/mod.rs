//! Structural rules

mod property_order;

pub use property_order::PropertyOrderRule;

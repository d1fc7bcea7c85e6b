//! Domain layer: value objects, aggregates, events and the pricing engine
pub mod aggregates;
pub mod events;
pub mod pricing;
pub mod value_objects;

//! Domain model: products, carts and the events cart mutations raise.
pub mod aggregates;
pub mod events;
pub mod value_objects;

//! Aggregates module
pub mod product;
pub mod cart;

pub use product::{Product, ProductDraft};
pub use cart::{Cart, CartDetail, CartHeader, CartLine, CartSubmission, MergedLine, RemovedLine};

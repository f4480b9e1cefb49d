//! Persistence boundary.
//!
//! Every find-or-create step the cart workflow needs is a single atomic
//! store call, so concurrent submissions for the same user cannot produce
//! duplicate headers or duplicate lines.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::aggregates::{Cart, MergedLine, Product, ProductDraft, RemovedLine};

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("migration error: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),
    #[error("line {line_id} count overflow")]
    Overflow { line_id: i32 },
    #[error("missing row: {0}")]
    MissingRow(String),
    #[error("constraint violated: {0}")]
    Constraint(String),
    #[error("{0} id space exhausted")]
    IdExhausted(&'static str),
}

#[async_trait]
pub trait ProductStore: Send + Sync {
    /// All products, ordered by id.
    async fn list_products(&self) -> Result<Vec<Product>, StoreError>;
    async fn find_product(&self, id: i32) -> Result<Option<Product>, StoreError>;
    /// Inserts with a store-assigned id; `draft.id` is ignored.
    async fn insert_product(&self, draft: ProductDraft) -> Result<Product, StoreError>;
    /// Returns `None` when no row has `product.id`.
    async fn update_product(&self, product: Product) -> Result<Option<Product>, StoreError>;
    /// Inserts `product` under its own id unless a row already exists.
    /// Returns whichever row is stored afterwards.
    async fn insert_product_if_absent(&self, product: Product) -> Result<Product, StoreError>;
    async fn delete_product(&self, id: i32) -> Result<bool, StoreError>;
}

#[async_trait]
pub trait CartStore: Send + Sync {
    async fn find_cart(&self, user_id: &str) -> Result<Option<Cart>, StoreError>;
    /// Finds or creates the user's header, then inserts the (header, product)
    /// line or adds `count` to it. Both happen as one atomic step, so a
    /// concurrent clear cannot remove the header in between.
    async fn merge_line_for_user(&self, user_id: &str, product_id: i32, count: i32) -> Result<MergedLine, StoreError>;
    /// Deletes a line, and its header when it was the last line.
    async fn remove_line(&self, line_id: i32) -> Result<Option<RemovedLine>, StoreError>;
    /// Sets or clears the coupon code. Returns `false` when the user has no header.
    async fn set_coupon(&self, user_id: &str, code: Option<&str>) -> Result<bool, StoreError>;
    /// Deletes the header and all its lines. Returns `false` when none existed.
    async fn clear_cart(&self, user_id: &str) -> Result<bool, StoreError>;
}

#[async_trait]
pub trait Store: ProductStore + CartStore {
    async fn ping(&self) -> Result<(), StoreError>;
}

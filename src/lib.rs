//! Mango Commerce Services
//!
//! Product catalog and shopping cart backend for the Mango storefront.
//!
//! ## Features
//! - Product catalog: list, lookup, create/update, delete
//! - Shopping cart: additive line upserts, line removal, coupons, clearing
//! - PostgreSQL store with conflict-resolving writes, plus an in-memory store
//! - Optional bearer-token check and NATS cart events
//!
//! Identity and token issuance live in a separate identity server; this
//! crate only checks the presented token.

pub mod api;
pub mod config;
pub mod domain;
pub mod error;
pub mod publisher;
pub mod services;
pub mod state;
pub mod store;

pub use config::{AppConfig, ConfigError};
pub use domain::aggregates::{Cart, CartDetail, CartHeader, CartLine, CartSubmission, Product, ProductDraft};
pub use error::{Result, ServiceError};
pub use publisher::EventPublisher;
pub use state::AppState;
pub use store::{MemoryStore, PgStore, Store, StoreError};

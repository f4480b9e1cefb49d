//! Cart Aggregate

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::domain::aggregates::product::{Product, ProductDraft};

/// One user's cart record. At most one exists per `user_id`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct CartHeader {
    pub id: i32,
    pub user_id: String,
    pub coupon_code: Option<String>,
}

/// Stored line shape, without the product resolved.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    pub id: i32,
    pub cart_header_id: i32,
    pub product_id: i32,
    pub count: i32,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartDetail {
    pub id: i32,
    pub cart_header_id: i32,
    pub product_id: i32,
    pub count: i32,
    pub product: Product,
}

impl CartDetail {
    pub fn from_line(line: CartLine, product: Product) -> Self {
        Self { id: line.id, cart_header_id: line.cart_header_id, product_id: line.product_id, count: line.count, product }
    }

    pub fn line_total(&self) -> Decimal { self.product.price * Decimal::from(self.count) }
}

/// Fully materialized cart: header, every line with its product, and the
/// derived subtotal.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cart {
    #[serde(rename = "cartHeader")]
    header: CartHeader,
    #[serde(rename = "cartDetails")]
    lines: Vec<CartDetail>,
    subtotal: Decimal,
}

impl Cart {
    pub fn new(header: CartHeader, mut lines: Vec<CartDetail>) -> Self {
        lines.sort_by_key(|l| l.id);
        let subtotal = lines.iter().map(CartDetail::line_total).sum();
        Self { header, lines, subtotal }
    }

    pub fn header(&self) -> &CartHeader { &self.header }
    pub fn lines(&self) -> &[CartDetail] { &self.lines }
    pub fn subtotal(&self) -> Decimal { self.subtotal }
    pub fn user_id(&self) -> &str { &self.header.user_id }
    pub fn coupon_code(&self) -> Option<&str> { self.header.coupon_code.as_deref() }
    pub fn item_count(&self) -> usize { self.lines.len() }
    pub fn is_empty(&self) -> bool { self.lines.is_empty() }

    pub fn line_for_product(&self, product_id: i32) -> Option<&CartDetail> {
        self.lines.iter().find(|l| l.product_id == product_id)
    }
}

/// A single cart-line submission from a client.
///
/// `product` only matters when the store has no row for `product_id` yet;
/// it is ignored otherwise.
#[derive(Clone, Debug, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CartSubmission {
    #[validate(length(min = 1, max = 450))]
    pub user_id: String,
    #[validate(range(min = 1))]
    pub product_id: i32,
    #[validate(range(min = 1))]
    pub quantity: i32,
    pub product: Option<ProductDraft>,
}

impl CartSubmission {
    pub fn new(user_id: impl Into<String>, product_id: i32, quantity: i32) -> Self {
        Self { user_id: user_id.into(), product_id, quantity, product: None }
    }

    pub fn with_product(mut self, draft: ProductDraft) -> Self {
        self.product = Some(draft);
        self
    }
}

/// Outcome of merging a submission into a user's cart.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MergedLine {
    pub header: CartHeader,
    pub line: CartLine,
}

/// Outcome of deleting a single line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RemovedLine {
    pub line: CartLine,
    pub user_id: String,
    pub header_removed: bool,
}

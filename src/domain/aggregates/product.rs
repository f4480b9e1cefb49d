//! Product Aggregate

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: i32,
    pub name: String,
    pub price: Decimal,
    pub description: Option<String>,
    pub category_name: Option<String>,
    pub image_url: Option<String>,
}

/// Client-supplied product payload, used by catalog writes and by cart
/// submissions that reference a product the store has not seen yet.
///
/// An `id` of zero (or absent) means "let the store assign one".
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ProductDraft {
    #[serde(default)]
    pub id: i32,
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[validate(custom = "non_negative_price")]
    pub price: Decimal,
    pub description: Option<String>,
    pub category_name: Option<String>,
    pub image_url: Option<String>,
}

impl ProductDraft {
    pub fn new(name: impl Into<String>, price: Decimal) -> Self {
        Self { id: 0, name: name.into(), price, description: None, category_name: None, image_url: None }
    }

    /// Whether this draft addresses an existing row rather than a new one.
    pub fn is_update(&self) -> bool { self.id >= 1 }

    pub fn into_product(self, id: i32) -> Product {
        Product {
            id,
            name: self.name,
            price: self.price,
            description: self.description,
            category_name: self.category_name,
            image_url: self.image_url,
        }
    }
}

impl From<Product> for ProductDraft {
    fn from(p: Product) -> Self {
        Self {
            id: p.id,
            name: p.name,
            price: p.price,
            description: p.description,
            category_name: p.category_name,
            image_url: p.image_url,
        }
    }
}

fn non_negative_price(price: &Decimal) -> Result<(), ValidationError> {
    if price.is_sign_negative() && !price.is_zero() {
        return Err(ValidationError::new("negative_price"));
    }
    Ok(())
}

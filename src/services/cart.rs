//! Cart aggregation: reconciles cart-line submissions against stored
//! headers and lines.

use std::sync::Arc;

use tracing::{debug, error, info, instrument};
use validator::Validate;

use crate::domain::aggregates::{Cart, CartSubmission, MergedLine};
use crate::domain::events::CartEvent;
use crate::domain::value_objects::CouponCode;
use crate::error::{Result, ServiceError};
use crate::publisher::EventPublisher;
use crate::store::{CartStore, ProductStore};

#[derive(Clone)]
pub struct CartService {
    products: Arc<dyn ProductStore>,
    carts: Arc<dyn CartStore>,
    events: EventPublisher,
}

impl CartService {
    pub fn new(products: Arc<dyn ProductStore>, carts: Arc<dyn CartStore>, events: EventPublisher) -> Self {
        Self { products, carts, events }
    }

    pub async fn get_cart(&self, user_id: &str) -> Result<Cart> {
        self.carts
            .find_cart(user_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("cart for user {user_id}")))
    }

    /// Adds the submitted quantity to the user's cart, creating the
    /// product, header and line as needed. Counts merge additively.
    #[instrument(skip(self, submission), fields(user_id = %submission.user_id, product_id = submission.product_id))]
    pub async fn upsert_cart(&self, submission: CartSubmission) -> Result<Cart> {
        submission.validate()?;
        if let Some(draft) = &submission.product {
            draft.validate()?;
        }

        self.ensure_product(&submission).await?;

        let MergedLine { header, line } = self
            .carts
            .merge_line_for_user(&submission.user_id, submission.product_id, submission.quantity)
            .await
            .map_err(ServiceError::AggregationFailed)?;
        debug!(header_id = header.id, line_id = line.id, count = line.count, "cart line merged");

        // A clear that commits after the merge leaves nothing to read back.
        let cart = self
            .carts
            .find_cart(&submission.user_id)
            .await
            .map_err(ServiceError::AggregationFailed)?
            .ok_or_else(|| ServiceError::CartNotFound(submission.user_id.clone()))?;

        info!(lines = cart.item_count(), "cart upserted");
        self.events
            .publish(CartEvent::CartUpdated {
                user_id: submission.user_id,
                product_id: line.product_id,
                line_id: line.id,
                count: line.count,
            })
            .await;
        Ok(cart)
    }

    async fn ensure_product(&self, submission: &CartSubmission) -> Result<()> {
        let existing = self.products.find_product(submission.product_id).await.map_err(ServiceError::AggregationFailed)?;
        if existing.is_some() {
            return Ok(());
        }
        let Some(draft) = submission.product.clone() else {
            return Err(ServiceError::ValidationFailed(format!(
                "product {} does not exist and no product details were supplied",
                submission.product_id
            )));
        };
        let product = self
            .products
            .insert_product_if_absent(draft.into_product(submission.product_id))
            .await
            .map_err(ServiceError::AggregationFailed)?;
        info!(product_id = product.id, "product materialized from cart submission");
        Ok(())
    }

    /// Removes one line, and the header with it when it was the last line.
    /// Store failures are logged and reported as `false`.
    #[instrument(skip(self))]
    pub async fn remove_line(&self, line_id: i32) -> bool {
        match self.carts.remove_line(line_id).await {
            Ok(Some(removed)) => {
                info!(user_id = %removed.user_id, header_removed = removed.header_removed, "cart line removed");
                self.events
                    .publish(CartEvent::CartLineRemoved {
                        user_id: removed.user_id,
                        line_id,
                        header_removed: removed.header_removed,
                    })
                    .await;
                true
            }
            Ok(None) => false,
            Err(e) => {
                error!(error = %e, "failed to remove cart line");
                false
            }
        }
    }

    #[instrument(skip(self))]
    pub async fn apply_coupon(&self, user_id: &str, code: &str) -> Result<bool> {
        let code = CouponCode::new(code).map_err(|e| ServiceError::ValidationFailed(e.to_string()))?;
        if !self.carts.set_coupon(user_id, Some(code.as_str())).await? {
            return Err(ServiceError::CartNotFound(user_id.to_string()));
        }
        self.events
            .publish(CartEvent::CouponApplied { user_id: user_id.to_string(), coupon_code: code.to_string() })
            .await;
        Ok(true)
    }

    #[instrument(skip(self))]
    pub async fn remove_coupon(&self, user_id: &str) -> Result<bool> {
        if !self.carts.set_coupon(user_id, None).await? {
            return Err(ServiceError::CartNotFound(user_id.to_string()));
        }
        self.events.publish(CartEvent::CouponRemoved { user_id: user_id.to_string() }).await;
        Ok(true)
    }

    /// Store failures are logged and reported as `false`.
    #[instrument(skip(self))]
    pub async fn clear_cart(&self, user_id: &str) -> bool {
        match self.carts.clear_cart(user_id).await {
            Ok(true) => {
                self.events.publish(CartEvent::CartCleared { user_id: user_id.to_string() }).await;
                true
            }
            Ok(false) => false,
            Err(e) => {
                error!(error = %e, "failed to clear cart");
                false
            }
        }
    }
}

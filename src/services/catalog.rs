use std::sync::Arc;

use tracing::{error, info, instrument};
use validator::Validate;

use crate::domain::aggregates::{Product, ProductDraft};
use crate::error::{Result, ServiceError};
use crate::store::ProductStore;

#[derive(Clone)]
pub struct CatalogService {
    products: Arc<dyn ProductStore>,
}

impl CatalogService {
    pub fn new(products: Arc<dyn ProductStore>) -> Self { Self { products } }

    pub async fn list_products(&self) -> Result<Vec<Product>> {
        Ok(self.products.list_products().await?)
    }

    pub async fn get_product(&self, id: i32) -> Result<Product> {
        self.products.find_product(id).await?.ok_or_else(|| ServiceError::NotFound(format!("product {id}")))
    }

    /// Updates when `draft.id >= 1`, otherwise inserts under a new id.
    #[instrument(skip(self, draft), fields(product_id = draft.id))]
    pub async fn upsert_product(&self, draft: ProductDraft) -> Result<Product> {
        draft.validate()?;
        if draft.is_update() {
            let id = draft.id;
            let product = self
                .products
                .update_product(draft.into_product(id))
                .await?
                .ok_or_else(|| ServiceError::NotFound(format!("product {id}")))?;
            info!("product updated");
            return Ok(product);
        }
        let product = self.products.insert_product(draft).await?;
        info!(assigned_id = product.id, "product created");
        Ok(product)
    }

    /// Store failures are logged and reported as `false`.
    #[instrument(skip(self))]
    pub async fn delete_product(&self, id: i32) -> bool {
        match self.products.delete_product(id).await {
            Ok(deleted) => deleted,
            Err(e) => {
                error!(error = %e, "failed to delete product");
                false
            }
        }
    }
}

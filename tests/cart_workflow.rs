use std::sync::Arc;

use async_trait::async_trait;
use mango_commerce::domain::aggregates::{MergedLine, RemovedLine};
use mango_commerce::services::{CartService, CatalogService};
use mango_commerce::store::{CartStore, ProductStore};
use mango_commerce::{Cart, CartSubmission, EventPublisher, MemoryStore, ProductDraft, ServiceError, StoreError};
use rust_decimal::Decimal;

fn services() -> (CartService, CatalogService) {
    let store = Arc::new(MemoryStore::new());
    let products: Arc<dyn ProductStore> = store.clone();
    let carts: Arc<dyn CartStore> = store.clone();
    let cart_service = CartService::new(products.clone(), carts, EventPublisher::disabled());
    (cart_service, CatalogService::new(products))
}

fn submission(user_id: &str, product_id: i32, quantity: i32) -> CartSubmission {
    CartSubmission::new(user_id, product_id, quantity)
        .with_product(ProductDraft::new(format!("Product {product_id}"), Decimal::new(1000, 2)))
}

fn counts(cart: &mango_commerce::Cart) -> Vec<(i32, i32)> {
    cart.lines().iter().map(|l| (l.product_id, l.count)).collect()
}

#[tokio::test]
async fn first_submission_creates_header_and_line() {
    let (carts, _) = services();
    let cart = carts.upsert_cart(submission("u1", 7, 2)).await.expect("upsert");

    assert_eq!(cart.user_id(), "u1");
    assert_eq!(counts(&cart), vec![(7, 2)]);
    assert_eq!(cart.subtotal(), Decimal::new(2000, 2));
}

#[tokio::test]
async fn repeat_submission_merges_additively() {
    let (carts, _) = services();
    carts.upsert_cart(submission("u1", 7, 2)).await.unwrap();
    let cart = carts.upsert_cart(CartSubmission::new("u1", 7, 3)).await.unwrap();

    assert_eq!(cart.item_count(), 1);
    assert_eq!(counts(&cart), vec![(7, 5)]);
}

#[tokio::test]
async fn full_cart_lifecycle() {
    let (carts, _) = services();

    let cart = carts.upsert_cart(submission("u1", 7, 2)).await.unwrap();
    assert_eq!(counts(&cart), vec![(7, 2)]);

    let cart = carts.upsert_cart(submission("u1", 7, 1)).await.unwrap();
    assert_eq!(counts(&cart), vec![(7, 3)]);

    let cart = carts.upsert_cart(submission("u1", 9, 1)).await.unwrap();
    assert_eq!(counts(&cart), vec![(7, 3), (9, 1)]);
    let line_7 = cart.line_for_product(7).unwrap().id;
    let line_9 = cart.line_for_product(9).unwrap().id;

    assert!(carts.remove_line(line_7).await);
    let cart = carts.get_cart("u1").await.unwrap();
    assert_eq!(counts(&cart), vec![(9, 1)]);

    assert!(carts.remove_line(line_9).await);
    let err = carts.get_cart("u1").await.unwrap_err();
    assert!(matches!(err, ServiceError::NotFound(_)));
}

#[tokio::test]
async fn removing_one_of_several_lines_keeps_header() {
    let (carts, _) = services();
    carts.upsert_cart(submission("u1", 7, 1)).await.unwrap();
    let cart = carts.upsert_cart(submission("u1", 9, 1)).await.unwrap();
    let header_id = cart.header().id;

    assert!(carts.remove_line(cart.line_for_product(9).unwrap().id).await);
    assert_eq!(carts.get_cart("u1").await.unwrap().header().id, header_id);
}

#[tokio::test]
async fn removing_unknown_line_is_negative_not_error() {
    let (carts, _) = services();
    assert!(!carts.remove_line(404).await);
}

#[tokio::test]
async fn clear_cart_reports_whether_header_existed() {
    let (carts, _) = services();
    assert!(!carts.clear_cart("nobody").await);

    carts.upsert_cart(submission("u1", 7, 1)).await.unwrap();
    carts.upsert_cart(submission("u1", 9, 4)).await.unwrap();
    assert!(carts.clear_cart("u1").await);
    assert!(carts.get_cart("u1").await.is_err());
}

#[tokio::test]
async fn coupon_apply_then_clear_leaves_code_empty() {
    let (carts, _) = services();
    carts.upsert_cart(submission("u1", 7, 1)).await.unwrap();

    assert!(carts.apply_coupon("u1", "10OFF").await.unwrap());
    assert_eq!(carts.get_cart("u1").await.unwrap().coupon_code(), Some("10OFF"));

    assert!(carts.remove_coupon("u1").await.unwrap());
    assert_eq!(carts.get_cart("u1").await.unwrap().coupon_code(), None);
}

#[tokio::test]
async fn coupon_operations_require_a_cart() {
    let (carts, _) = services();
    assert!(matches!(carts.apply_coupon("u1", "10OFF").await, Err(ServiceError::CartNotFound(_))));
    assert!(matches!(carts.remove_coupon("u1").await, Err(ServiceError::CartNotFound(_))));
}

#[tokio::test]
async fn invalid_submissions_are_rejected() {
    let (carts, _) = services();
    let zero = carts.upsert_cart(submission("u1", 7, 0)).await.unwrap_err();
    assert!(matches!(zero, ServiceError::ValidationFailed(_)));

    let unknown_without_details = carts.upsert_cart(CartSubmission::new("u1", 7, 1)).await.unwrap_err();
    assert!(matches!(unknown_without_details, ServiceError::ValidationFailed(_)));
    assert!(carts.get_cart("u1").await.is_err());
}

#[tokio::test]
async fn submission_never_overwrites_an_existing_product() {
    let (carts, catalog) = services();
    let product = catalog.upsert_product(ProductDraft::new("Samosa", Decimal::new(1599, 2))).await.unwrap();

    let spoofed = CartSubmission::new("u1", product.id, 1).with_product(ProductDraft::new("Free Samosa", Decimal::ZERO));
    let cart = carts.upsert_cart(spoofed).await.unwrap();

    assert_eq!(cart.lines()[0].product.name, "Samosa");
    assert_eq!(catalog.get_product(product.id).await.unwrap().price, Decimal::new(1599, 2));
}

#[tokio::test]
async fn concurrent_submissions_for_same_pair_merge() {
    let (carts, _) = services();
    carts.upsert_cart(submission("u1", 7, 1)).await.unwrap();

    let tasks: Vec<_> = (0..16)
        .map(|_| {
            let carts = carts.clone();
            tokio::spawn(async move { carts.upsert_cart(CartSubmission::new("u1", 7, 1)).await })
        })
        .collect();
    for task in tasks {
        task.await.expect("join").expect("upsert");
    }

    let cart = carts.get_cart("u1").await.unwrap();
    assert_eq!(counts(&cart), vec![(7, 17)]);
}

#[tokio::test]
async fn catalog_upsert_and_delete() {
    let (_, catalog) = services();
    let created = catalog.upsert_product(ProductDraft::new("Samosa", Decimal::new(1599, 2))).await.unwrap();
    assert_eq!(created.id, 1);

    let mut draft = ProductDraft::from(created.clone());
    draft.name = "Samosa (2 pc)".into();
    let updated = catalog.upsert_product(draft).await.unwrap();
    assert_eq!(updated.id, created.id);
    assert_eq!(updated.name, "Samosa (2 pc)");

    let mut missing = ProductDraft::new("Ghost", Decimal::ONE);
    missing.id = 99;
    assert!(matches!(catalog.upsert_product(missing).await, Err(ServiceError::NotFound(_))));

    let first = catalog.list_products().await.unwrap();
    let second = catalog.list_products().await.unwrap();
    assert_eq!(first, second);

    assert!(catalog.delete_product(created.id).await);
    assert!(!catalog.delete_product(created.id).await);
    assert!(matches!(catalog.get_product(created.id).await, Err(ServiceError::NotFound(_))));
}

/// Clears the user's cart right before every merge, as a competing
/// `ClearCart` request would.
struct ClearingCarts(Arc<MemoryStore>);

#[async_trait]
impl CartStore for ClearingCarts {
    async fn find_cart(&self, user_id: &str) -> Result<Option<Cart>, StoreError> {
        self.0.find_cart(user_id).await
    }

    async fn merge_line_for_user(&self, user_id: &str, product_id: i32, count: i32) -> Result<MergedLine, StoreError> {
        self.0.clear_cart(user_id).await?;
        self.0.merge_line_for_user(user_id, product_id, count).await
    }

    async fn remove_line(&self, line_id: i32) -> Result<Option<RemovedLine>, StoreError> {
        self.0.remove_line(line_id).await
    }

    async fn set_coupon(&self, user_id: &str, code: Option<&str>) -> Result<bool, StoreError> {
        self.0.set_coupon(user_id, code).await
    }

    async fn clear_cart(&self, user_id: &str) -> Result<bool, StoreError> {
        self.0.clear_cart(user_id).await
    }
}

#[tokio::test]
async fn clear_racing_a_submission_does_not_fail_it() {
    let store = Arc::new(MemoryStore::new());
    let products: Arc<dyn ProductStore> = store.clone();
    let carts = CartService::new(products, Arc::new(ClearingCarts(store.clone())), EventPublisher::disabled());

    let first = carts.upsert_cart(submission("u1", 7, 2)).await.expect("first submission");
    let cart = carts.upsert_cart(submission("u1", 9, 1)).await.expect("submission after clear");

    assert_ne!(cart.header().id, first.header().id);
    assert_eq!(counts(&cart), vec![(9, 1)]);
}

#[tokio::test]
async fn exhausted_product_ids_fail_without_panicking() {
    let (carts, catalog) = services();
    carts.upsert_cart(submission("u1", i32::MAX, 1)).await.expect("materialize highest id");

    let err = catalog.upsert_product(ProductDraft::new("Next", Decimal::ONE)).await.unwrap_err();
    assert!(matches!(err, ServiceError::StoreFailure(StoreError::IdExhausted(_))));
    assert_eq!(catalog.list_products().await.unwrap().len(), 1);
}

//! HTTP surface for the catalog and cart services.

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::state::AppState;

pub mod auth;
pub mod cart;
pub mod extract;
pub mod health;
pub mod products;

pub fn router(state: AppState) -> Router {
    let protected = Router::new()
        .route("/products", get(products::list_products).post(products::upsert_product).put(products::upsert_product))
        .route("/products/:id", get(products::get_product).delete(products::delete_product))
        .route("/cart", post(cart::upsert_cart))
        .route("/cart/:user_id", get(cart::get_cart))
        .route("/cart/remove/:line_id", post(cart::remove_line))
        .route("/cart/applyCoupon", post(cart::apply_coupon))
        .route("/cart/removeCoupon", post(cart::remove_coupon))
        .route("/cart/clear/:user_id", post(cart::clear_cart))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth::require_bearer));

    Router::new()
        .route("/health", get(health::health))
        .merge(protected)
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()).layer(CorsLayer::permissive()))
        .with_state(state)
}

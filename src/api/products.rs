use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::domain::aggregates::{Product, ProductDraft};
use crate::api::extract::ApiJson;
use crate::error::Result;
use crate::state::AppState;

pub async fn list_products(State(s): State<AppState>) -> Result<Json<Vec<Product>>> {
    Ok(Json(s.catalog.list_products().await?))
}

pub async fn get_product(State(s): State<AppState>, Path(id): Path<i32>) -> Result<Json<Product>> {
    Ok(Json(s.catalog.get_product(id).await?))
}

/// Serves both `POST` and `PUT`; the draft's id decides insert vs update.
pub async fn upsert_product(State(s): State<AppState>, ApiJson(draft): ApiJson<ProductDraft>) -> Result<Json<Product>> {
    Ok(Json(s.catalog.upsert_product(draft).await?))
}

pub async fn delete_product(State(s): State<AppState>, Path(id): Path<i32>) -> (StatusCode, Json<bool>) {
    let deleted = s.catalog.delete_product(id).await;
    let status = if deleted { StatusCode::OK } else { StatusCode::NOT_FOUND };
    (status, Json(deleted))
}

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Deserialize;

use crate::domain::aggregates::{Cart, CartSubmission};
use crate::api::extract::ApiJson;
use crate::error::Result;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplyCouponRequest {
    pub user_id: String,
    pub coupon_code: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoveCouponRequest {
    pub user_id: String,
}

pub async fn get_cart(State(s): State<AppState>, Path(user_id): Path<String>) -> Result<Json<Cart>> {
    Ok(Json(s.carts.get_cart(&user_id).await?))
}

pub async fn upsert_cart(State(s): State<AppState>, ApiJson(submission): ApiJson<CartSubmission>) -> Result<Json<Cart>> {
    Ok(Json(s.carts.upsert_cart(submission).await?))
}

pub async fn remove_line(State(s): State<AppState>, Path(line_id): Path<i32>) -> Json<bool> {
    Json(s.carts.remove_line(line_id).await)
}

pub async fn apply_coupon(State(s): State<AppState>, ApiJson(r): ApiJson<ApplyCouponRequest>) -> Result<Json<bool>> {
    Ok(Json(s.carts.apply_coupon(&r.user_id, &r.coupon_code).await?))
}

pub async fn remove_coupon(State(s): State<AppState>, ApiJson(r): ApiJson<RemoveCouponRequest>) -> Result<Json<bool>> {
    Ok(Json(s.carts.remove_coupon(&r.user_id).await?))
}

pub async fn clear_cart(State(s): State<AppState>, Path(user_id): Path<String>) -> Json<bool> {
    Json(s.carts.clear_cart(&user_id).await)
}

use axum::extract::FromRequest;

use crate::error::ServiceError;

/// `axum::Json` whose rejections render as `ServiceError` bodies, so
/// malformed or incomplete payloads get the same `{"error": ...}` shape
/// and a 400 like every other invalid input.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ServiceError))]
pub struct ApiJson<T>(pub T);

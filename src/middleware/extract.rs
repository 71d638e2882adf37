use crate::error::AppError;
use axum::extract::{FromRequest, FromRequestParts};

/// JSON request body whose decoding failures are reported as `AppError`.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct AppJson<T>(pub T);

/// Query string whose decoding failures are reported as `AppError`.
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(AppError))]
pub struct AppQuery<T>(pub T);

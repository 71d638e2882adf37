use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::{error::ErrorDetail, state::AppState};

/// In development, rewrites 5xx error bodies to include the underlying error.
pub async fn expose_error_detail(
    State(state): State<AppState>,
    req: Request<Body>,
    next: Next,
) -> Response {
    let response = next.run(req).await;

    if !state.config.environment.is_development() {
        return response;
    }

    match response.extensions().get::<ErrorDetail>().cloned() {
        Some(detail) => {
            let body = Json(json!({
                "success": false,
                "message": detail.message,
                "error": detail.detail,
            }));
            (response.status(), body).into_response()
        }
        None => response,
    }
}

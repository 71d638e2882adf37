use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::json;
use thiserror::Error;

/// A single rejected request field, reported back to the client.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<serde_json::Value>,
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    StoreUnavailable(#[from] sqlx::Error),

    #[error("Validation failed")]
    Validation(Vec<FieldError>),

    #[error("Not found: {0}")]
    NotFound(String),

    /// The identifier is not a well-formed UUID. Reported to clients exactly like `NotFound`.
    #[error("Malformed identifier: {0}")]
    InvalidIdentifier(String),

    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    #[error("Authentication error: {0}")]
    Authentication(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Malformed request body: {0}")]
    MalformedBody(#[from] JsonRejection),

    #[error("Malformed query string: {0}")]
    MalformedQuery(#[from] QueryRejection),

    #[error("Export error: {0}")]
    Export(#[from] rust_xlsxwriter::XlsxError),

    #[error("Internal server error")]
    InternalError,
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        let mut fields: Vec<FieldError> = err
            .field_errors()
            .into_iter()
            .flat_map(|(field, errors)| {
                let field = camel_case(&field);
                errors.iter().map(move |error| FieldError {
                    field: field.clone(),
                    message: error
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| format!("Invalid value for {}", field)),
                    value: error.params.get("value").cloned(),
                })
            })
            .collect();
        fields.sort_by(|a, b| a.field.cmp(&b.field));
        AppError::Validation(fields)
    }
}

/// Diagnostic detail attached to 5xx responses. Only surfaced to clients in development.
#[derive(Debug, Clone)]
pub struct ErrorDetail {
    pub message: &'static str,
    pub detail: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::StoreUnavailable(e) => {
                tracing::error!("Database error: {:?}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Server error".to_string())
            }
            AppError::Validation(errors) => {
                let body = Json(json!({
                    "success": false,
                    "message": "Validation failed",
                    "errors": errors,
                }));
                return (StatusCode::BAD_REQUEST, body).into_response();
            }
            AppError::MalformedBody(rejection) => {
                return malformed_request("body", rejection.body_text());
            }
            AppError::MalformedQuery(rejection) => {
                return malformed_request("query", rejection.body_text());
            }
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            AppError::InvalidIdentifier(_) => {
                (StatusCode::NOT_FOUND, "Task not found".to_string())
            }
            AppError::InvalidQuery(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::Authentication(msg) => (StatusCode::UNAUTHORIZED, msg.clone()),
            AppError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg.clone()),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::Export(e) => {
                tracing::error!("Export error: {:?}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Server error generating Excel file".to_string(),
                )
            }
            AppError::InternalError => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string())
            }
        };

        let body = Json(json!({
            "success": false,
            "message": message,
        }));
        let mut response = (status, body).into_response();

        if status.is_server_error() {
            response.extensions_mut().insert(ErrorDetail {
                message: match &self {
                    AppError::Export(_) => "Server error generating Excel file",
                    AppError::StoreUnavailable(_) => "Server error",
                    _ => "Internal server error",
                },
                detail: self.to_string(),
            });
        }

        response
    }
}

/// Undecodable input is reported with the same envelope as a failed field validation.
fn malformed_request(field: &str, message: String) -> Response {
    let body = Json(json!({
        "success": false,
        "message": "Validation failed",
        "errors": [FieldError {
            field: field.to_string(),
            message,
            value: None,
        }],
    }));
    (StatusCode::BAD_REQUEST, body).into_response()
}

fn camel_case(field: &str) -> String {
    let mut out = String::with_capacity(field.len());
    let mut upper = false;
    for c in field.chars() {
        if c == '_' {
            upper = true;
        } else if upper {
            out.extend(c.to_uppercase());
            upper = false;
        } else {
            out.push(c);
        }
    }
    out
}

pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_camel_case() {
        assert_eq!(camel_case("date_of_task"), "dateOfTask");
        assert_eq!(camel_case("author"), "author");
    }

    #[test]
    fn test_status_codes() {
        let cases = [
            (AppError::NotFound("Task not found".into()), StatusCode::NOT_FOUND),
            (AppError::InvalidIdentifier("xyz".into()), StatusCode::NOT_FOUND),
            (AppError::InvalidQuery("bad date".into()), StatusCode::BAD_REQUEST),
            (AppError::Validation(vec![]), StatusCode::BAD_REQUEST),
            (AppError::Unauthorized("no token".into()), StatusCode::UNAUTHORIZED),
            (AppError::InternalError, StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (error, expected) in cases {
            assert_eq!(error.into_response().status(), expected);
        }
    }

    #[test]
    fn test_server_errors_carry_detail() {
        let response = AppError::StoreUnavailable(sqlx::Error::PoolTimedOut).into_response();
        let detail = response.extensions().get::<ErrorDetail>().unwrap();
        assert_eq!(detail.message, "Server error");
        assert!(detail.detail.contains("pool timed out"));

        let response = AppError::NotFound("Task not found".into()).into_response();
        assert!(response.extensions().get::<ErrorDetail>().is_none());
    }
}

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};

use super::auth_dto::{AuthResponse, LoginRequest, ProfileResponse, SignupRequest};
use crate::{
    error::Result,
    middleware::{AppJson, AuthUser},
    state::AppState,
    task::task_dto::MessageResponse,
};

/// Register a new user
#[utoipa::path(
    post,
    path = "/api/auth/signup",
    request_body = SignupRequest,
    responses(
        (status = 201, description = "User registered successfully", body = AuthResponse),
        (status = 400, description = "Validation error or duplicate email")
    ),
    tag = "auth"
)]
pub async fn signup(
    State(state): State<AppState>,
    AppJson(payload): AppJson<SignupRequest>,
) -> Result<impl IntoResponse> {
    let (user, token) = state.auth_service.signup(payload).await?;

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            success: true,
            message: "User registered successfully".to_string(),
            token,
            user: user.into(),
        }),
    ))
}

/// Login with email and password
#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = AuthResponse),
        (status = 401, description = "Invalid credentials")
    ),
    tag = "auth"
)]
pub async fn login(
    State(state): State<AppState>,
    AppJson(payload): AppJson<LoginRequest>,
) -> Result<Json<AuthResponse>> {
    let (user, token) = state.auth_service.login(payload).await?;

    Ok(Json(AuthResponse {
        success: true,
        message: "Login successful".to_string(),
        token,
        user: user.into(),
    }))
}

/// Current user's profile
#[utoipa::path(
    get,
    path = "/api/auth/profile",
    responses(
        (status = 200, description = "Profile", body = ProfileResponse),
        (status = 401, description = "Unauthorized")
    ),
    tag = "auth",
    security(("bearer_auth" = []))
)]
pub async fn profile(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> Result<Json<ProfileResponse>> {
    let user = state.auth_service.profile(user.id).await?;

    Ok(Json(ProfileResponse {
        success: true,
        message: None,
        user: user.into(),
    }))
}

/// Check that the bearer token is still valid
#[utoipa::path(
    get,
    path = "/api/auth/verify",
    responses(
        (status = 200, description = "Token is valid", body = ProfileResponse),
        (status = 401, description = "Unauthorized")
    ),
    tag = "auth",
    security(("bearer_auth" = []))
)]
pub async fn verify(AuthUser(user): AuthUser) -> Json<ProfileResponse> {
    Json(ProfileResponse {
        success: true,
        message: Some("Token is valid".to_string()),
        user: user.into(),
    })
}

/// Logout. Tokens are stateless, so the client simply discards its token.
#[utoipa::path(
    post,
    path = "/api/auth/logout",
    responses(
        (status = 200, description = "Logged out", body = MessageResponse),
        (status = 401, description = "Unauthorized")
    ),
    tag = "auth",
    security(("bearer_auth" = []))
)]
pub async fn logout(AuthUser(user): AuthUser) -> Json<MessageResponse> {
    tracing::debug!("User {} logged out", user.id);
    Json(MessageResponse {
        success: true,
        message: "Logged out successfully. Please remove token from client.".to_string(),
    })
}

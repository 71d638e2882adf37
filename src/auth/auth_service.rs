use uuid::Uuid;
use validator::Validate;

use crate::auth::{create_token, hash_password, verify_password, verify_token};
use crate::auth::auth_dto::{LoginRequest, SignupRequest};
use crate::error::{AppError, Result};
use crate::user::{User, UserRepository};

/// Identity provider: credential checks and token issuance.
#[derive(Clone)]
pub struct AuthService {
    user_repo: UserRepository,
    jwt_secret: String,
    jwt_expires_in_days: i64,
}

impl AuthService {
    pub fn new(user_repo: UserRepository, jwt_secret: String, jwt_expires_in_days: i64) -> Self {
        Self {
            user_repo,
            jwt_secret,
            jwt_expires_in_days,
        }
    }

    pub async fn signup(&self, payload: SignupRequest) -> Result<(User, String)> {
        let payload = payload.normalized();
        payload.validate()?;

        if self.user_repo.find_by_email(&payload.email).await?.is_some() {
            return Err(AppError::BadRequest(
                "User with this email already exists".to_string(),
            ));
        }

        let password_hash = hash_password(&payload.password)?;
        let role = payload.role.as_deref().unwrap_or("user");
        let user = self
            .user_repo
            .create(&payload.name, &payload.email, &password_hash, role)
            .await?;

        let token = self.issue_token(&user)?;
        tracing::info!("Registered user {}", user.id);
        Ok((user, token))
    }

    pub async fn login(&self, payload: LoginRequest) -> Result<(User, String)> {
        let payload = payload.normalized();
        payload.validate()?;

        let user = self
            .user_repo
            .find_by_email(&payload.email)
            .await?
            .ok_or_else(invalid_credentials)?;

        if !verify_password(&payload.password, &user.password_hash) {
            return Err(invalid_credentials());
        }

        let user = self.user_repo.record_login(user.id).await?;
        let token = self.issue_token(&user)?;
        Ok((user, token))
    }

    /// Resolves a bearer token to the user it was issued for.
    pub async fn authenticate(&self, token: &str) -> Result<User> {
        let claims = verify_token(token, &self.jwt_secret)?;
        let user_id = Uuid::parse_str(&claims.sub)
            .map_err(|_| AppError::Unauthorized("Invalid token".to_string()))?;

        self.user_repo
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::Unauthorized("User not found".to_string()))
    }

    pub async fn profile(&self, user_id: Uuid) -> Result<User> {
        self.user_repo
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))
    }

    fn issue_token(&self, user: &User) -> Result<String> {
        create_token(user.id, &user.email, &self.jwt_secret, self.jwt_expires_in_days)
    }
}

fn invalid_credentials() -> AppError {
    AppError::Authentication("Invalid email or password".to_string())
}

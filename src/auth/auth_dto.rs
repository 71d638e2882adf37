use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

use crate::user::UserResponse;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct SignupRequest {
    #[validate(length(min = 2, max = 50, message = "Name must be between 2 and 50 characters"))]
    pub name: String,
    #[validate(email(message = "Please provide a valid email"))]
    pub email: String,
    #[validate(
        length(min = 6, message = "Password must be at least 6 characters long"),
        custom(function = "validate_contains_digit")
    )]
    pub password: String,
    #[validate(custom(function = "validate_role"))]
    pub role: Option<String>,
}

impl SignupRequest {
    pub fn normalized(mut self) -> Self {
        self.name = self.name.trim().to_string();
        self.email = self.email.trim().to_lowercase();
        self
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginRequest {
    #[validate(email(message = "Please provide a valid email"))]
    pub email: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

impl LoginRequest {
    pub fn normalized(mut self) -> Self {
        self.email = self.email.trim().to_lowercase();
        self
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AuthResponse {
    pub success: bool,
    pub message: String,
    pub token: String,
    pub user: UserResponse,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ProfileResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub user: UserResponse,
}

fn validate_contains_digit(password: &str) -> Result<(), ValidationError> {
    if password.chars().any(|c| c.is_ascii_digit()) {
        return Ok(());
    }
    let mut error = ValidationError::new("digit");
    error.message = Some("Password must contain at least one number".into());
    Err(error)
}

fn validate_role(role: &str) -> Result<(), ValidationError> {
    if matches!(role, "user" | "admin") {
        return Ok(());
    }
    let mut error = ValidationError::new("role");
    error.message = Some("Role must be either user or admin".into());
    Err(error)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signup(password: &str, role: Option<&str>) -> SignupRequest {
        SignupRequest {
            name: "  Alice  ".into(),
            email: " Alice@Example.COM ".into(),
            password: password.into(),
            role: role.map(Into::into),
        }
        .normalized()
    }

    #[test]
    fn test_signup_normalization() {
        let request = signup("secret1", None);
        assert_eq!(request.name, "Alice");
        assert_eq!(request.email, "alice@example.com");
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_password_rules() {
        assert!(signup("abc1", None).validate().is_err());
        assert!(signup("abcdefg", None).validate().is_err());
        assert!(signup("abcdef1", Some("admin")).validate().is_ok());
    }

    #[test]
    fn test_role_must_be_known() {
        assert!(signup("abcdef1", Some("root")).validate().is_err());
    }
}

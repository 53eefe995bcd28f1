//! Authentication Models
//! Mission: Define user records, token claims, and request validation

use crate::error::FieldError;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const DEFAULT_ROLE: &str = "User";

/// User account as stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String, // bcrypt hash - never serialize
    pub about: String,
    pub role: String,
    pub created_at: String,
}

/// JWT Claims payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // subject (user id)
    pub exp: usize,  // expiration timestamp
}

/// Whitelist projection of a user, safe to hand to clients.
///
/// Also attached to request extensions by the auth middleware, so
/// handlers never see the stored document.
#[derive(Debug, Clone, Serialize)]
pub struct AuthUser {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub about: String,
    pub role: String,
    pub created_at: String,
}

impl AuthUser {
    pub fn from_user(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
            about: user.about.clone(),
            role: user.role.clone(),
            created_at: user.created_at.clone(),
        }
    }
}

/// Registration request body
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Login request body
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Profile update request body; absent fields are left unchanged.
#[derive(Debug, Deserialize)]
pub struct UpdateProfileRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub about: Option<String>,
}

/// Minimal well-formedness check: one `@` with a dotted, non-empty domain.
pub fn is_valid_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.is_empty()
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && !email.contains(char::is_whitespace)
}

/// Validate a registration payload before any business logic runs.
pub fn validate_register(req: &RegisterRequest) -> Vec<FieldError> {
    let mut errors = Vec::new();
    if req.name.trim().is_empty() {
        errors.push(FieldError::field("name", "Name is required"));
    }
    if !is_valid_email(&req.email) {
        errors.push(FieldError::field("email", "Invalid email"));
    }
    if req.password.len() < 6 {
        errors.push(FieldError::field(
            "password",
            "Password must be at least 6 characters",
        ));
    }
    errors
}

/// Validate a login payload.
pub fn validate_login(req: &LoginRequest) -> Vec<FieldError> {
    let mut errors = Vec::new();
    if !is_valid_email(&req.email) {
        errors.push(FieldError::field("email", "Invalid email"));
    }
    if req.password.is_empty() {
        errors.push(FieldError::field("password", "Password is required"));
    }
    errors
}

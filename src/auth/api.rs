//! Authentication API Endpoints
//! Mission: Provide registration, login, and profile endpoints

use crate::auth::models::{
    validate_login, validate_register, AuthUser, LoginRequest, RegisterRequest,
    UpdateProfileRequest,
};
use crate::auth::user_store::UserStoreError;
use crate::error::{ApiError, FieldError};
use crate::server::AppState;
use axum::{extract::State, http::StatusCode, response::IntoResponse, Extension, Json};
use serde_json::json;
use tracing::{info, warn};

/// Register a new user - POST /contactmyst/register
///
/// No token is issued here; the client logs in separately.
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let errors = validate_register(&payload);
    if !errors.is_empty() {
        return Err(ApiError::Validation(errors));
    }

    let user = state
        .user_store
        .create_user(&payload.name, &payload.email, &payload.password)
        .map_err(|e| match e {
            UserStoreError::DuplicateEmail => {
                ApiError::Validation(vec![FieldError::message("User Already Existed")])
            }
            other => ApiError::Internal(other.into()),
        })?;

    info!("Registered user: {}", user.email);

    // Created-user projection, flattened alongside the success flag
    let mut body = serde_json::to_value(AuthUser::from_user(&user))
        .map_err(|e| ApiError::Internal(e.into()))?;
    body["success"] = json!(true);

    Ok((StatusCode::CREATED, Json(body)))
}

/// Login - POST /contactmyst/login
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let errors = validate_login(&payload);
    if !errors.is_empty() {
        return Err(ApiError::Validation(errors));
    }

    let Some(user) = state.user_store.find_by_email(&payload.email)? else {
        return Err(ApiError::Validation(vec![FieldError::message(
            "User Not Registered",
        )]));
    };

    let password_ok = bcrypt::verify(&payload.password, &user.password_hash)
        .map_err(|e| ApiError::Internal(e.into()))?;
    if !password_ok {
        warn!("Failed login attempt: {}", payload.email);
        return Err(ApiError::Validation(vec![FieldError::message(
            "Wrong Password",
        )]));
    }

    let (token, _expires_in) = state.jwt_handler.generate_token(&user.id)?;

    info!("Login successful: {}", user.email);

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "user": AuthUser::from_user(&user),
            "token": token,
        })),
    ))
}

/// Current user - GET /contactmyst/auth
///
/// The middleware already resolved and sanitized the identity; this just
/// echoes the whitelist projection.
pub async fn get_current_user(Extension(user): Extension<AuthUser>) -> Json<serde_json::Value> {
    Json(json!({ "success": true, "user": user }))
}

/// Update profile - PUT /contactmyst/update-profile
pub async fn update_profile(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(payload): Json<UpdateProfileRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if let Some(email) = payload.email.as_deref() {
        if !crate::auth::models::is_valid_email(email) {
            return Err(ApiError::Validation(vec![FieldError::field(
                "email",
                "Invalid email",
            )]));
        }
    }

    let updated = state
        .user_store
        .update_profile(
            &user.id,
            payload.name.as_deref(),
            payload.email.as_deref(),
            payload.about.as_deref(),
        )
        .map_err(|e| match e {
            UserStoreError::DuplicateEmail => ApiError::Conflict("Email already in use".to_string()),
            UserStoreError::NotFound => ApiError::NotFound("User not found".to_string()),
            other => ApiError::Internal(other.into()),
        })?;

    Ok(Json(json!({
        "success": true,
        "user": AuthUser::from_user(&updated),
    })))
}

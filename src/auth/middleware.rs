//! Authentication Middleware
//! Mission: Resolve bearer tokens into authenticated users before handlers run

use crate::auth::models::AuthUser;
use crate::error::ApiError;
use crate::server::AppState;
use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

/// Gate every protected route behind a fully resolved identity.
///
/// The status split is deliberate: a missing `Authorization` header is
/// 403, while a present-but-bad credential (malformed, bad signature,
/// expired, or pointing at a user that no longer exists) is 401.
/// Clients depend on the distinction.
pub async fn verify_user(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let auth_header = req
        .headers()
        .get(header::AUTHORIZATION)
        .ok_or(ApiError::Forbidden)?;

    let token = auth_header
        .to_str()
        .ok()
        .and_then(|h| h.split_whitespace().nth(1))
        .ok_or(ApiError::Unauthorized("Unauthorized"))?;

    let claims = state
        .jwt_handler
        .validate_token(token)
        .map_err(|_| ApiError::Unauthorized("Unauthorized"))?;

    let user_id =
        Uuid::parse_str(&claims.sub).map_err(|_| ApiError::Unauthorized("Unauthorized"))?;

    // Synchronous gate: the store lookup completes before any handler runs.
    let user = state
        .user_store
        .find_by_id(&user_id)?
        .ok_or(ApiError::Unauthorized("User not found"))?;

    req.extensions_mut().insert(AuthUser::from_user(&user));

    Ok(next.run(req).await)
}

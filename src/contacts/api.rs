//! Contact API Endpoints
//! Mission: Owner-scoped contact CRUD with search and pagination

use crate::auth::models::AuthUser;
use crate::contacts::models::{
    validate_new_contact, ListContactsQuery, NewContactRequest, UpdateContactRequest,
};
use crate::contacts::store::ContactStoreError;
use crate::error::{ApiError, FieldError};
use crate::server::AppState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};
use serde_json::json;
use uuid::Uuid;

fn map_conflict(err: ContactStoreError) -> ApiError {
    match err {
        ContactStoreError::DuplicateEmail | ContactStoreError::DuplicatePhone => {
            ApiError::Conflict(err.to_string())
        }
        ContactStoreError::NotFound => ApiError::NotFound("Contact not found".to_string()),
        ContactStoreError::Db(e) => ApiError::Internal(e),
    }
}

/// Flatten a contact next to the success flag, matching the list/detail
/// response shape.
fn contact_body(contact: &crate::contacts::models::Contact) -> Result<serde_json::Value, ApiError> {
    let mut body = serde_json::to_value(contact).map_err(|e| ApiError::Internal(e.into()))?;
    body["success"] = json!(true);
    Ok(body)
}

/// Create contact - POST /contactmyst/add-contacts
pub async fn add_contact(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(payload): Json<NewContactRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let errors = validate_new_contact(&payload);
    if !errors.is_empty() {
        return Err(ApiError::Validation(errors));
    }

    let contact = state
        .contact_store
        .create(
            &user.id,
            &payload.name,
            &payload.email,
            &payload.phone,
            payload.address.as_deref(),
        )
        .map_err(map_conflict)?;

    Ok((StatusCode::CREATED, Json(contact_body(&contact)?)))
}

/// List contacts - GET /contactmyst/contacts?search=&page=&limit=
pub async fn list_contacts(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Query(query): Query<ListContactsQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let page = query.page.unwrap_or(1);
    let limit = query.limit.unwrap_or(10);

    let result = state
        .contact_store
        .list(&user.id, query.search.as_deref(), page, limit)?;

    Ok(Json(json!({
        "success": true,
        "contacts": result.contacts,
        "pagination": {
            "total": result.total,
            "page": result.page,
            "pages": result.pages,
        },
    })))
}

/// Get contact - GET /contactmyst/contacts/:id
pub async fn get_contact(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let contact = state
        .contact_store
        .get(&user.id, &id)?
        .ok_or_else(|| ApiError::NotFound("Contact not found".to_string()))?;

    Ok(Json(contact_body(&contact)?))
}

/// Update contact - PUT /contactmyst/update-contacts/:id
pub async fn update_contact(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateContactRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if let Some(email) = payload.email.as_deref() {
        if !crate::auth::models::is_valid_email(email) {
            return Err(ApiError::Validation(vec![FieldError::field(
                "email",
                "Invalid email",
            )]));
        }
    }

    let contact = state
        .contact_store
        .update(
            &user.id,
            &id,
            payload.name.as_deref(),
            payload.email.as_deref(),
            payload.phone.as_deref(),
            payload.address.as_deref(),
        )
        .map_err(map_conflict)?;

    Ok(Json(contact_body(&contact)?))
}

/// Delete contact - DELETE /contactmyst/contacts/:id
///
/// Responds with the requester's remaining contacts so the client can
/// refresh its list without a second round trip.
pub async fn delete_contact(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let deleted = state.contact_store.delete(&user.id, &id)?;
    if !deleted {
        return Err(ApiError::NotFound("No Record Existed".to_string()));
    }

    let contacts = state.contact_store.list_owned(&user.id)?;

    Ok(Json(json!({
        "success": true,
        "contacts": contacts,
    })))
}

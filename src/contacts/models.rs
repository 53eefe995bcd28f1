//! Contact Models
//! Mission: Define contact records and their request/response shapes

use crate::auth::models::is_valid_email;
use crate::error::FieldError;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A contact record, always scoped to its owning user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Contact {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address: Option<String>,
    pub posted_by: Uuid,
    pub created_at: String,
}

/// Create-contact request body
#[derive(Debug, Deserialize)]
pub struct NewContactRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    pub address: Option<String>,
}

/// Update-contact request body; absent fields are left unchanged.
#[derive(Debug, Deserialize)]
pub struct UpdateContactRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
}

/// List query parameters
#[derive(Debug, Deserialize)]
pub struct ListContactsQuery {
    pub search: Option<String>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

/// One page of a contact listing.
#[derive(Debug, Serialize)]
pub struct ContactPage {
    pub contacts: Vec<Contact>,
    pub total: u64,
    pub page: u32,
    pub pages: u32,
}

/// Validate a create-contact payload.
pub fn validate_new_contact(req: &NewContactRequest) -> Vec<FieldError> {
    let mut errors = Vec::new();
    if req.name.trim().is_empty() {
        errors.push(FieldError::field("name", "Name is required"));
    }
    if !is_valid_email(&req.email) {
        errors.push(FieldError::field("email", "Invalid email"));
    }
    if req.phone.trim().is_empty() {
        errors.push(FieldError::field("phone", "Phone is required"));
    }
    errors
}

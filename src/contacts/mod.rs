//! Contacts Module
//! Mission: Per-user contact records with owner-scoped CRUD

pub mod api;
pub mod models;
pub mod store;

pub use models::Contact;
pub use store::ContactStore;

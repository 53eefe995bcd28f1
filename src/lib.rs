//! Contactmyst Backend Library
//!
//! Exposes core modules for use by the binary and integration tests.

pub mod auth;
pub mod contacts;
pub mod error;
pub mod middleware;
pub mod server;

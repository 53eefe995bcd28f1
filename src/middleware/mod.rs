//! Middleware for observability.
//!
//! Request logging with latency tracking; the auth gate lives in
//! `crate::auth::middleware`.

pub mod logging;

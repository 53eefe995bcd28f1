//! Authentication Module
//! Mission: Secure API access with JWT bearer tokens and bcrypt credentials

pub mod api;
pub mod jwt;
pub mod middleware;
pub mod models;
pub mod user_store;

pub use jwt::JwtHandler;
pub use middleware::verify_user;
pub use models::AuthUser;
pub use user_store::UserStore;

//! Contactmyst - Contact Management API
//! Mission: Bearer-token auth and per-user contact records over SQLite

use anyhow::{Context, Result};
use contactmyst_backend::{
    auth::{JwtHandler, UserStore},
    contacts::ContactStore,
    server::{self, AppState},
};
use dotenv::dotenv;
use std::path::{Path, PathBuf};
use std::{env, sync::Arc};
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize environment and logging
    load_env();
    init_tracing();

    info!("🚀 Contactmyst API starting");

    let db_path = resolve_data_path(env::var("CONTACTS_DB_PATH").ok(), "contactmyst.db");
    let jwt_secret = env::var("JWT_SECRET_KEY")
        .unwrap_or_else(|_| "dev-secret-change-in-production-minimum-32-characters".to_string());

    // Both stores share one SQLite file; WAL mode keeps their
    // connections from blocking each other.
    let user_store = Arc::new(UserStore::new(&db_path)?);
    let contact_store = Arc::new(ContactStore::new(&db_path)?);
    let jwt_handler = Arc::new(JwtHandler::new(jwt_secret));

    info!("🔐 Database initialized at: {}", db_path);

    let state = AppState {
        user_store,
        contact_store,
        jwt_handler,
    };

    let app = server::create_router(state);

    // Start server
    let port = env::var("PORT")
        .ok()
        .and_then(|v| v.parse::<u16>().ok())
        .unwrap_or(5000);
    let addr = format!("0.0.0.0:{port}");
    let listener = TcpListener::bind(&addr).await?;
    info!("🎯 API server listening on {}", addr);

    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}

/// Initialize tracing with env-filter overrides
fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "contactmyst_backend=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn default_data_path(filename: &str) -> String {
    // Anchor defaults to the crate directory
    let base = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    base.join(filename).to_string_lossy().to_string()
}

fn resolve_data_path(env_value: Option<String>, default_filename: &str) -> String {
    let base = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    let Some(raw) = env_value.filter(|v| !v.trim().is_empty()) else {
        return default_data_path(default_filename);
    };

    let p = PathBuf::from(raw);
    if p.is_absolute() {
        return p.to_string_lossy().to_string();
    }

    // Treat relative paths as relative to the crate, not the caller's cwd.
    base.join(p).to_string_lossy().to_string()
}

fn load_env() {
    // 1) Standard dotenv search (cwd + parents)
    let _ = dotenv();

    // 2) Also try crate-dir .env (common when running with --manifest-path
    // from elsewhere)
    let manifest_dir = Path::new(env!("CARGO_MANIFEST_DIR"));

    let candidates = [manifest_dir.join(".env"), manifest_dir.join("../.env")];

    for p in candidates {
        if p.exists() {
            let _ = dotenv::from_path(&p);
        }
    }
}

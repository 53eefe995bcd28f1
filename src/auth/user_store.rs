//! User Storage
//! Mission: Securely store and manage user accounts with SQLite

use crate::auth::models::{User, DEFAULT_ROLE};
use anyhow::{Context, Result};
use bcrypt::{hash, DEFAULT_COST};
use chrono::Utc;
use parking_lot::Mutex;
use rusqlite::{params, Connection, Row};
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

const SCHEMA_SQL: &str = r#"
PRAGMA journal_mode = WAL;
PRAGMA synchronous = NORMAL;

CREATE TABLE IF NOT EXISTS users (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    email TEXT UNIQUE NOT NULL,
    password_hash TEXT NOT NULL,
    about TEXT NOT NULL DEFAULT '',
    role TEXT NOT NULL DEFAULT 'User',
    created_at TEXT NOT NULL
);
"#;

/// Typed constraint violations so callers never sniff SQLite error codes.
#[derive(Debug)]
pub enum UserStoreError {
    DuplicateEmail,
    NotFound,
    Db(anyhow::Error),
}

impl std::fmt::Display for UserStoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UserStoreError::DuplicateEmail => write!(f, "Email already in use"),
            UserStoreError::NotFound => write!(f, "User not found"),
            UserStoreError::Db(err) => write!(f, "Database error: {err}"),
        }
    }
}

impl std::error::Error for UserStoreError {}

impl From<rusqlite::Error> for UserStoreError {
    fn from(err: rusqlite::Error) -> Self {
        UserStoreError::Db(err.into())
    }
}

/// User storage with SQLite backend.
///
/// All operations go through one shared WAL-mode connection; the mutex is
/// held across check-then-insert sequences so uniqueness checks cannot race.
pub struct UserStore {
    conn: Arc<Mutex<Connection>>,
}

impl UserStore {
    /// Open the store and initialize the schema
    pub fn new(db_path: &str) -> Result<Self> {
        let conn = Connection::open(db_path)
            .with_context(|| format!("Failed to open user database at {db_path}"))?;
        conn.execute_batch(SCHEMA_SQL)
            .context("Failed to initialize users schema")?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Create a new user with a freshly hashed password.
    ///
    /// The plaintext password never touches the database; bcrypt cost 12.
    pub fn create_user(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<User, UserStoreError> {
        let password_hash = hash(password, DEFAULT_COST)
            .context("Failed to hash password")
            .map_err(UserStoreError::Db)?;

        let user = User {
            id: Uuid::new_v4(),
            name: name.to_string(),
            email: email.to_string(),
            password_hash,
            about: String::new(),
            role: DEFAULT_ROLE.to_string(),
            created_at: Utc::now().to_rfc3339(),
        };

        let conn = self.conn.lock();

        let exists: bool = conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM users WHERE email = ?1)",
            params![user.email],
            |row| row.get(0),
        )?;
        if exists {
            return Err(UserStoreError::DuplicateEmail);
        }

        conn.execute(
            "INSERT INTO users (id, name, email, password_hash, about, role, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                user.id.to_string(),
                user.name,
                user.email,
                user.password_hash,
                user.about,
                user.role,
                user.created_at,
            ],
        )?;

        info!("Created user: {} ({})", user.email, user.id);

        Ok(user)
    }

    /// Get user by email
    pub fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare_cached(
            "SELECT id, name, email, password_hash, about, role, created_at
             FROM users WHERE email = ?1",
        )?;

        match stmt.query_row(params![email], user_from_row) {
            Ok(user) => Ok(Some(user)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Get user by id
    pub fn find_by_id(&self, id: &Uuid) -> Result<Option<User>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare_cached(
            "SELECT id, name, email, password_hash, about, role, created_at
             FROM users WHERE id = ?1",
        )?;

        match stmt.query_row(params![id.to_string()], user_from_row) {
            Ok(user) => Ok(Some(user)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Update name/email/about for a user; absent fields keep their value.
    /// Changing the email to one owned by another user is a conflict.
    pub fn update_profile(
        &self,
        id: &Uuid,
        name: Option<&str>,
        email: Option<&str>,
        about: Option<&str>,
    ) -> Result<User, UserStoreError> {
        let conn = self.conn.lock();

        if let Some(new_email) = email {
            let taken: bool = conn.query_row(
                "SELECT EXISTS(SELECT 1 FROM users WHERE email = ?1 AND id != ?2)",
                params![new_email, id.to_string()],
                |row| row.get(0),
            )?;
            if taken {
                return Err(UserStoreError::DuplicateEmail);
            }
        }

        let updated = conn.execute(
            "UPDATE users SET
                name = COALESCE(?2, name),
                email = COALESCE(?3, email),
                about = COALESCE(?4, about)
             WHERE id = ?1",
            params![id.to_string(), name, email, about],
        )?;
        if updated == 0 {
            return Err(UserStoreError::NotFound);
        }

        let mut stmt = conn.prepare_cached(
            "SELECT id, name, email, password_hash, about, role, created_at
             FROM users WHERE id = ?1",
        )?;
        let user = stmt.query_row(params![id.to_string()], user_from_row)?;

        Ok(user)
    }

    /// Delete a user by id. The API never exposes this; it exists for
    /// operational cleanup and for exercising the dangling-token path.
    pub fn delete_user(&self, id: &Uuid) -> Result<()> {
        let conn = self.conn.lock();
        let rows_affected = conn.execute("DELETE FROM users WHERE id = ?1", params![id.to_string()])?;

        if rows_affected == 0 {
            anyhow::bail!("User not found");
        }

        info!("Deleted user: {}", id);
        Ok(())
    }
}

fn user_from_row(row: &Row<'_>) -> rusqlite::Result<User> {
    let id_str: String = row.get(0)?;
    let id = Uuid::parse_str(&id_str).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(0, rusqlite::types::Type::Text, Box::new(e))
    })?;
    Ok(User {
        id,
        name: row.get(1)?,
        email: row.get(2)?,
        password_hash: row.get(3)?,
        about: row.get(4)?,
        role: row.get(5)?,
        created_at: row.get(6)?,
    })
}

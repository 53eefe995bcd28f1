//! Contact Storage
//! Mission: Owner-scoped contact persistence with search and pagination

use crate::contacts::models::{Contact, ContactPage};
use anyhow::{Context, Result};
use chrono::Utc;
use parking_lot::Mutex;
use rusqlite::{params, Connection, Row};
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

const SCHEMA_SQL: &str = r#"
PRAGMA journal_mode = WAL;
PRAGMA synchronous = NORMAL;

CREATE TABLE IF NOT EXISTS contacts (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    email TEXT UNIQUE NOT NULL,
    phone TEXT UNIQUE NOT NULL,
    address TEXT,
    posted_by TEXT NOT NULL,
    created_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_contacts_owner
    ON contacts(posted_by, name);
"#;

const SELECT_COLUMNS: &str = "id, name, email, phone, address, posted_by, created_at";

/// Typed constraint violations; email and phone uniqueness is global
/// across owners, not per-owner.
#[derive(Debug)]
pub enum ContactStoreError {
    DuplicateEmail,
    DuplicatePhone,
    NotFound,
    Db(anyhow::Error),
}

impl std::fmt::Display for ContactStoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ContactStoreError::DuplicateEmail => {
                write!(f, "Contact with this email already exists")
            }
            ContactStoreError::DuplicatePhone => {
                write!(f, "Contact with this phone number already exists")
            }
            ContactStoreError::NotFound => write!(f, "Contact not found"),
            ContactStoreError::Db(err) => write!(f, "Database error: {err}"),
        }
    }
}

impl std::error::Error for ContactStoreError {}

impl From<rusqlite::Error> for ContactStoreError {
    fn from(err: rusqlite::Error) -> Self {
        ContactStoreError::Db(err.into())
    }
}

/// Contact storage with SQLite backend.
///
/// The mutex is held across check-then-write sequences so the explicit
/// uniqueness checks cannot race; UNIQUE indexes remain as a backstop.
pub struct ContactStore {
    conn: Arc<Mutex<Connection>>,
}

impl ContactStore {
    /// Open the store and initialize the schema
    pub fn new(db_path: &str) -> Result<Self> {
        let conn = Connection::open(db_path)
            .with_context(|| format!("Failed to open contact database at {db_path}"))?;
        conn.execute_batch(SCHEMA_SQL)
            .context("Failed to initialize contacts schema")?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Create a contact owned by `owner`.
    pub fn create(
        &self,
        owner: &Uuid,
        name: &str,
        email: &str,
        phone: &str,
        address: Option<&str>,
    ) -> Result<Contact, ContactStoreError> {
        let contact = Contact {
            id: Uuid::new_v4(),
            name: name.to_string(),
            email: email.to_string(),
            phone: phone.to_string(),
            address: address.map(str::to_string),
            posted_by: *owner,
            created_at: Utc::now().to_rfc3339(),
        };

        let conn = self.conn.lock();
        Self::check_unique(&conn, &contact.email, &contact.phone, None)?;

        conn.execute(
            "INSERT INTO contacts (id, name, email, phone, address, posted_by, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                contact.id.to_string(),
                contact.name,
                contact.email,
                contact.phone,
                contact.address,
                contact.posted_by.to_string(),
                contact.created_at,
            ],
        )?;

        info!("Created contact {} for user {}", contact.id, owner);

        Ok(contact)
    }

    /// List one page of `owner`'s contacts, optionally filtered by a
    /// case-insensitive substring match on name/email/phone. Sorted by name.
    pub fn list(
        &self,
        owner: &Uuid,
        search: Option<&str>,
        page: u32,
        limit: u32,
    ) -> Result<ContactPage> {
        let page = page.max(1);
        let limit = limit.max(1);
        // Client-supplied page/limit can multiply past u32; SQLite binds
        // i64, so saturate there instead of wrapping to a bogus offset.
        let offset = i64::from(page - 1).saturating_mul(i64::from(limit));

        let conn = self.conn.lock();

        let (contacts, total) = match search.filter(|s| !s.is_empty()) {
            Some(term) => {
                let pattern = format!("%{}%", term.to_lowercase());
                let mut stmt = conn.prepare_cached(&format!(
                    "SELECT {SELECT_COLUMNS} FROM contacts
                     WHERE posted_by = ?1
                       AND (lower(name) LIKE ?2 OR lower(email) LIKE ?2 OR lower(phone) LIKE ?2)
                     ORDER BY name ASC LIMIT ?3 OFFSET ?4"
                ))?;
                let contacts = stmt
                    .query_map(
                        params![owner.to_string(), pattern, limit, offset],
                        contact_from_row,
                    )?
                    .collect::<Result<Vec<_>, _>>()?;

                let total: u64 = conn.query_row(
                    "SELECT COUNT(*) FROM contacts
                     WHERE posted_by = ?1
                       AND (lower(name) LIKE ?2 OR lower(email) LIKE ?2 OR lower(phone) LIKE ?2)",
                    params![owner.to_string(), pattern],
                    |row| row.get(0),
                )?;
                (contacts, total)
            }
            None => {
                let mut stmt = conn.prepare_cached(&format!(
                    "SELECT {SELECT_COLUMNS} FROM contacts
                     WHERE posted_by = ?1
                     ORDER BY name ASC LIMIT ?2 OFFSET ?3"
                ))?;
                let contacts = stmt
                    .query_map(params![owner.to_string(), limit, offset], contact_from_row)?
                    .collect::<Result<Vec<_>, _>>()?;

                let total: u64 = conn.query_row(
                    "SELECT COUNT(*) FROM contacts WHERE posted_by = ?1",
                    params![owner.to_string()],
                    |row| row.get(0),
                )?;
                (contacts, total)
            }
        };

        // pages = ceil(total / limit); zero rows means zero pages
        let pages = total.div_ceil(limit as u64) as u32;

        Ok(ContactPage {
            contacts,
            total,
            page,
            pages,
        })
    }

    /// All of `owner`'s contacts, unpaginated (the delete response shape).
    pub fn list_owned(&self, owner: &Uuid) -> Result<Vec<Contact>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare_cached(&format!(
            "SELECT {SELECT_COLUMNS} FROM contacts WHERE posted_by = ?1 ORDER BY name ASC"
        ))?;
        let contacts = stmt
            .query_map(params![owner.to_string()], contact_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(contacts)
    }

    /// Fetch one of `owner`'s contacts by id. A contact owned by another
    /// user is indistinguishable from a missing one.
    pub fn get(&self, owner: &Uuid, id: &Uuid) -> Result<Option<Contact>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare_cached(&format!(
            "SELECT {SELECT_COLUMNS} FROM contacts WHERE id = ?1 AND posted_by = ?2"
        ))?;

        match stmt.query_row(params![id.to_string(), owner.to_string()], contact_from_row) {
            Ok(contact) => Ok(Some(contact)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Update fields of one of `owner`'s contacts; absent fields keep
    /// their value. Email/phone changes re-check global uniqueness.
    pub fn update(
        &self,
        owner: &Uuid,
        id: &Uuid,
        name: Option<&str>,
        email: Option<&str>,
        phone: Option<&str>,
        address: Option<&str>,
    ) -> Result<Contact, ContactStoreError> {
        let conn = self.conn.lock();

        let exists: bool = conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM contacts WHERE id = ?1 AND posted_by = ?2)",
            params![id.to_string(), owner.to_string()],
            |row| row.get(0),
        )?;
        if !exists {
            return Err(ContactStoreError::NotFound);
        }

        if email.is_some() || phone.is_some() {
            Self::check_unique(
                &conn,
                email.unwrap_or_default(),
                phone.unwrap_or_default(),
                Some(id),
            )?;
        }

        conn.execute(
            "UPDATE contacts SET
                name = COALESCE(?3, name),
                email = COALESCE(?4, email),
                phone = COALESCE(?5, phone),
                address = COALESCE(?6, address)
             WHERE id = ?1 AND posted_by = ?2",
            params![
                id.to_string(),
                owner.to_string(),
                name,
                email,
                phone,
                address
            ],
        )?;

        let mut stmt = conn.prepare_cached(&format!(
            "SELECT {SELECT_COLUMNS} FROM contacts WHERE id = ?1"
        ))?;
        let contact = stmt.query_row(params![id.to_string()], contact_from_row)?;

        Ok(contact)
    }

    /// Delete one of `owner`'s contacts. Returns false when no owned row
    /// matched.
    pub fn delete(&self, owner: &Uuid, id: &Uuid) -> Result<bool> {
        let conn = self.conn.lock();
        let rows_affected = conn.execute(
            "DELETE FROM contacts WHERE id = ?1 AND posted_by = ?2",
            params![id.to_string(), owner.to_string()],
        )?;

        if rows_affected > 0 {
            info!("Deleted contact {} for user {}", id, owner);
        }

        Ok(rows_affected > 0)
    }

    /// Field-specific conflict check; `exclude` skips the row being
    /// updated so a contact can keep its own email/phone.
    fn check_unique(
        conn: &Connection,
        email: &str,
        phone: &str,
        exclude: Option<&Uuid>,
    ) -> Result<(), ContactStoreError> {
        let exclude_id = exclude.map(Uuid::to_string).unwrap_or_default();

        if !email.is_empty() {
            let taken: bool = conn.query_row(
                "SELECT EXISTS(SELECT 1 FROM contacts WHERE email = ?1 AND id != ?2)",
                params![email, exclude_id],
                |row| row.get(0),
            )?;
            if taken {
                return Err(ContactStoreError::DuplicateEmail);
            }
        }

        if !phone.is_empty() {
            let taken: bool = conn.query_row(
                "SELECT EXISTS(SELECT 1 FROM contacts WHERE phone = ?1 AND id != ?2)",
                params![phone, exclude_id],
                |row| row.get(0),
            )?;
            if taken {
                return Err(ContactStoreError::DuplicatePhone);
            }
        }

        Ok(())
    }
}

fn contact_from_row(row: &Row<'_>) -> rusqlite::Result<Contact> {
    let parse_uuid = |idx: usize, s: String| {
        Uuid::parse_str(&s).map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
        })
    };
    let id = parse_uuid(0, row.get::<_, String>(0)?)?;
    let posted_by = parse_uuid(5, row.get::<_, String>(5)?)?;
    Ok(Contact {
        id,
        name: row.get(1)?,
        email: row.get(2)?,
        phone: row.get(3)?,
        address: row.get(4)?,
        posted_by,
        created_at: row.get(6)?,
    })
}

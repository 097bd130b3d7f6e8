//! Local persistence for users, profiles, the catalog, and wishes.
//!
//! Everything lives in one `SQLite` database under the storage root:
//!
//! ```text
//! <root>/wishes.sqlite
//!   users      # Registered users and how they sign in
//!   profiles   # One optional-attribute row per user
//!   catalog    # Shared base wishes
//!   wishes     # User-owned wishes, unique per (owner, source_id)
//! ```
//!
//! The core only talks to storage through [`WishStore`], so tests and other
//! backends can stand in for [`Storage`].

mod catalog;
mod profile;
mod wish;

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::{fs, io};

use jiff::fmt::temporal::DateTimePrinter;
use rusqlite::Connection;
use uuid::Uuid;

use crate::model::{AuthMethod, CatalogEntry, Profile, ProfileUpdate, User, Wish, WishStatus};

/// Errors that can occur during storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("wish not found: {0}")]
    WishNotFound(Uuid),

    #[error("catalog entry not found: {0}")]
    CatalogEntryNotFound(Uuid),

    #[error("no wish of {owner} from catalog entry {source_id}")]
    SourceNotFound { owner: String, source_id: Uuid },

    #[error("user not found: {0}")]
    UserNotFound(String),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("value out of range: {0}")]
    OutOfRange(String),

    #[error("corrupt data: {0}")]
    Corrupt(String),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = core::result::Result<T, StorageError>;

/// Result of a write guarded by the want-soon cap.
#[derive(Debug, Clone, PartialEq)]
pub enum WriteOutcome {
    /// The row was written; carries the stored wish with fresh timestamps.
    Written(Wish),

    /// The owner already holds the limit; nothing was written.
    CapReached,

    /// The stored wish changed after it was read; carries the current row.
    /// Nothing was written.
    Stale(Wish),
}

/// What the core needs from a storage backend.
///
/// Every wish operation is scoped to an owner. Writes that take a `limit`
/// must check and write atomically: when the wish being written is
/// [`WishStatus::WantSoon`] and the owner's *other* want-soon wishes already
/// number `limit`, nothing is written and [`WriteOutcome::CapReached`] is returned.
pub trait WishStore {
    /// Looks up a registered user.
    fn load_user(&self, id: &str) -> Result<Option<User>>;

    /// All of an owner's wishes, oldest first.
    fn list_wishes(&self, owner: &str) -> Result<Vec<Wish>>;

    /// An owner's wishes in one status, oldest first.
    fn find_wishes(&self, owner: &str, status: WishStatus) -> Result<Vec<Wish>>;

    /// A single wish. Fails with [`StorageError::WishNotFound`] if the owner has no such wish.
    fn load_wish(&self, owner: &str, id: Uuid) -> Result<Wish>;

    /// Inserts a new wish.
    fn insert_wish(&self, wish: &Wish, limit: Option<usize>) -> Result<WriteOutcome>;

    /// Replaces an existing wish's fields.
    ///
    /// Writes only if the stored `updated_at` still equals `wish.updated_at`,
    /// checked in the same transaction as the write; otherwise returns
    /// [`WriteOutcome::Stale`].
    fn update_wish(&self, wish: &Wish, limit: Option<usize>) -> Result<WriteOutcome>;

    /// Deletes the owner's wish instantiated from `source_id`.
    fn delete_wish_by_source(&self, owner: &str, source_id: Uuid) -> Result<()>;

    /// The whole catalog in a stable order.
    fn list_catalog(&self) -> Result<Vec<CatalogEntry>>;

    fn load_catalog_entry(&self, id: Uuid) -> Result<CatalogEntry>;

    /// Source ids of every wish the owner holds, whatever its status.
    fn rated_source_ids(&self, owner: &str) -> Result<HashSet<Uuid>>;

    fn load_profile(&self, owner: &str) -> Result<Option<Profile>>;

    /// Applies a partial update to an owner's profile in one write.
    fn update_profile(&self, owner: &str, update: &ProfileUpdate) -> Result<()>;
}

/// `SQLite`-backed storage.
pub struct Storage {
    path: PathBuf,
}

impl Storage {
    /// Opens (or creates) the database under `root`.
    ///
    /// The directory is created if it doesn't exist, and the schema is
    /// applied idempotently.
    pub fn new(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        let storage = Self {
            path: root.join("wishes.sqlite"),
        };
        storage.migrate()?;
        tracing::debug!(path = %storage.path.display(), "storage ready");
        Ok(storage)
    }

    /// Returns the default storage root: `~/.wishes/`.
    pub fn default_root() -> Option<PathBuf> {
        dirs::home_dir().map(|h| h.join(".wishes"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    // ── Users ──

    /// Registers a user with an empty profile.
    pub fn create_user(&self, id: &str, auth_method: AuthMethod) -> Result<User> {
        let mut conn = self.open()?;
        profile::create_user(&mut conn, id, auth_method)
    }

    // ── Catalog ──

    /// Adds an entry to the shared catalog.
    pub fn insert_catalog_entry(&self, entry: &CatalogEntry) -> Result<()> {
        let conn = self.open()?;
        catalog::insert_entry(&conn, entry)
    }

    fn open(&self) -> Result<Connection> {
        let conn = Connection::open(&self.path)?;
        conn.busy_timeout(std::time::Duration::from_secs(5))?;
        conn.pragma_update(None, "foreign_keys", "ON")?;
        Ok(conn)
    }

    fn migrate(&self) -> Result<()> {
        let conn = self.open()?;
        conn.execute_batch(
            r"
            PRAGMA journal_mode=WAL;

            CREATE TABLE IF NOT EXISTS users (
              id TEXT PRIMARY KEY,
              auth_method TEXT NOT NULL,
              created_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS profiles (
              user_id TEXT PRIMARY KEY REFERENCES users(id) ON DELETE CASCADE,
              nickname TEXT,
              age INTEGER,
              gender TEXT,
              postal_code TEXT,
              address TEXT,
              interests TEXT NOT NULL DEFAULT '[]',
              updated_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS catalog (
              id TEXT PRIMARY KEY,
              title TEXT NOT NULL,
              detail TEXT NOT NULL,
              duration TEXT NOT NULL,
              cost INTEGER NOT NULL CHECK (cost >= 0),
              image_url TEXT,
              created_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS wishes (
              id TEXT PRIMARY KEY,
              owner TEXT NOT NULL,
              title TEXT NOT NULL,
              detail TEXT NOT NULL,
              duration TEXT NOT NULL,
              cost INTEGER NOT NULL CHECK (cost >= 0),
              image_url TEXT,
              source_id TEXT,
              status TEXT NOT NULL,
              goal TEXT,
              action_plan TEXT,
              achieved_on TEXT,
              reflection TEXT,
              created_at TEXT NOT NULL,
              updated_at TEXT NOT NULL,
              UNIQUE (owner, source_id)
            );

            CREATE INDEX IF NOT EXISTS wishes_owner_status ON wishes (owner, status);
            ",
        )?;
        Ok(())
    }
}

impl WishStore for Storage {
    fn load_user(&self, id: &str) -> Result<Option<User>> {
        let conn = self.open()?;
        profile::load_user(&conn, id)
    }

    fn list_wishes(&self, owner: &str) -> Result<Vec<Wish>> {
        let conn = self.open()?;
        wish::select(&conn, owner, None)
    }

    fn find_wishes(&self, owner: &str, status: WishStatus) -> Result<Vec<Wish>> {
        let conn = self.open()?;
        wish::select(&conn, owner, Some(status))
    }

    fn load_wish(&self, owner: &str, id: Uuid) -> Result<Wish> {
        let conn = self.open()?;
        wish::load(&conn, owner, id)
    }

    fn insert_wish(&self, wish: &Wish, limit: Option<usize>) -> Result<WriteOutcome> {
        let mut conn = self.open()?;
        wish::insert(&mut conn, wish, limit)
    }

    fn update_wish(&self, wish: &Wish, limit: Option<usize>) -> Result<WriteOutcome> {
        let mut conn = self.open()?;
        wish::update(&mut conn, wish, limit)
    }

    fn delete_wish_by_source(&self, owner: &str, source_id: Uuid) -> Result<()> {
        let conn = self.open()?;
        wish::delete_by_source(&conn, owner, source_id)
    }

    fn list_catalog(&self) -> Result<Vec<CatalogEntry>> {
        let conn = self.open()?;
        catalog::list_entries(&conn)
    }

    fn load_catalog_entry(&self, id: Uuid) -> Result<CatalogEntry> {
        let conn = self.open()?;
        catalog::load_entry(&conn, id)
    }

    fn rated_source_ids(&self, owner: &str) -> Result<HashSet<Uuid>> {
        let conn = self.open()?;
        wish::source_ids(&conn, owner)
    }

    fn load_profile(&self, owner: &str) -> Result<Option<Profile>> {
        let conn = self.open()?;
        profile::load_profile(&conn, owner)
    }

    fn update_profile(&self, owner: &str, update: &ProfileUpdate) -> Result<()> {
        let mut conn = self.open()?;
        profile::update_profile(&mut conn, owner, update)
    }
}

/// Maps a uniqueness violation to [`StorageError::Conflict`].
fn conflict_or(err: rusqlite::Error, what: impl FnOnce() -> String) -> StorageError {
    match err {
        rusqlite::Error::SqliteFailure(e, _) if e.code == rusqlite::ErrorCode::ConstraintViolation => {
            StorageError::Conflict(what())
        }
        other => other.into(),
    }
}

fn parse_uuid(s: &str, column: &str) -> Result<Uuid> {
    s.parse::<Uuid>()
        .map_err(|e| StorageError::Corrupt(format!("invalid {column}: {e}")))
}

/// Fixed nanosecond precision so text order matches time order.
fn timestamp_to_sql(ts: jiff::Timestamp) -> String {
    DateTimePrinter::new().precision(Some(9)).timestamp_to_string(&ts)
}

fn parse_timestamp(s: &str, column: &str) -> Result<jiff::Timestamp> {
    s.parse::<jiff::Timestamp>()
        .map_err(|e| StorageError::Corrupt(format!("invalid {column}: {e}")))
}

fn cost_to_sql(cost: u64) -> Result<i64> {
    i64::try_from(cost).map_err(|_| StorageError::OutOfRange(format!("cost {cost}")))
}

fn cost_from_sql(cost: i64) -> Result<u64> {
    u64::try_from(cost).map_err(|_| StorageError::Corrupt(format!("negative cost {cost}")))
}

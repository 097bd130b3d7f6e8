//! Catalog storage: the shared base wishes.

use rusqlite::{Connection, OptionalExtension, Row, params};
use uuid::Uuid;

use crate::model::CatalogEntry;

use super::{
    Result, StorageError, conflict_or, cost_from_sql, cost_to_sql, parse_timestamp, parse_uuid,
    timestamp_to_sql,
};

pub(super) fn insert_entry(conn: &Connection, entry: &CatalogEntry) -> Result<()> {
    conn.execute(
        "INSERT INTO catalog (id, title, detail, duration, cost, image_url, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            entry.id.to_string(),
            &entry.title,
            &entry.detail,
            &entry.duration,
            cost_to_sql(entry.cost)?,
            &entry.image_url,
            timestamp_to_sql(entry.created_at),
        ],
    )
    .map_err(|e| conflict_or(e, || format!("catalog entry {} already exists", entry.id)))?;
    Ok(())
}

/// Lists the catalog, oldest first. Ties break on id so the order is stable.
pub(super) fn list_entries(conn: &Connection) -> Result<Vec<CatalogEntry>> {
    let mut stmt = conn.prepare(
        "SELECT id, title, detail, duration, cost, image_url, created_at
         FROM catalog ORDER BY created_at, id",
    )?;
    let raws = stmt
        .query_map([], RawEntry::from_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    raws.into_iter().map(RawEntry::into_entry).collect()
}

pub(super) fn load_entry(conn: &Connection, id: Uuid) -> Result<CatalogEntry> {
    conn.query_row(
        "SELECT id, title, detail, duration, cost, image_url, created_at
         FROM catalog WHERE id = ?1",
        [id.to_string()],
        RawEntry::from_row,
    )
    .optional()?
    .ok_or(StorageError::CatalogEntryNotFound(id))?
    .into_entry()
}

struct RawEntry {
    id: String,
    title: String,
    detail: String,
    duration: String,
    cost: i64,
    image_url: Option<String>,
    created_at: String,
}

impl RawEntry {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            title: row.get(1)?,
            detail: row.get(2)?,
            duration: row.get(3)?,
            cost: row.get(4)?,
            image_url: row.get(5)?,
            created_at: row.get(6)?,
        })
    }

    fn into_entry(self) -> Result<CatalogEntry> {
        Ok(CatalogEntry {
            id: parse_uuid(&self.id, "catalog id")?,
            title: self.title,
            detail: self.detail,
            duration: self.duration,
            cost: cost_from_sql(self.cost)?,
            image_url: self.image_url,
            created_at: parse_timestamp(&self.created_at, "created_at")?,
        })
    }
}

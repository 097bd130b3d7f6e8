//! Wish storage: select, insert, update, and delete wish rows.

use std::collections::HashSet;

use jiff::Timestamp;
use jiff::civil::Date;
use rusqlite::{Connection, OptionalExtension, Row, Transaction, TransactionBehavior, params};
use uuid::Uuid;

use crate::model::{Wish, WishStatus};

use super::{
    Result, StorageError, WriteOutcome, conflict_or, cost_from_sql, cost_to_sql, parse_timestamp,
    parse_uuid, timestamp_to_sql,
};

const COLUMNS: &str = "id, owner, title, detail, duration, cost, image_url, source_id, status, \
     goal, action_plan, achieved_on, reflection, created_at, updated_at";

/// Selects an owner's wishes, optionally narrowed to one status.
pub(super) fn select(conn: &Connection, owner: &str, status: Option<WishStatus>) -> Result<Vec<Wish>> {
    let sql = format!(
        "SELECT {COLUMNS} FROM wishes
         WHERE owner = ?1 AND (?2 IS NULL OR status = ?2)
         ORDER BY created_at, id"
    );
    let mut stmt = conn.prepare(&sql)?;
    let raws = stmt
        .query_map(params![owner, status.map(WishStatus::as_str)], RawWish::from_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    raws.into_iter().map(RawWish::into_wish).collect()
}

pub(super) fn load(conn: &Connection, owner: &str, id: Uuid) -> Result<Wish> {
    load_optional(conn, owner, id)?.ok_or(StorageError::WishNotFound(id))
}

fn load_optional(conn: &Connection, owner: &str, id: Uuid) -> Result<Option<Wish>> {
    let sql = format!("SELECT {COLUMNS} FROM wishes WHERE owner = ?1 AND id = ?2");
    conn.query_row(&sql, params![owner, id.to_string()], RawWish::from_row)
        .optional()?
        .map(RawWish::into_wish)
        .transpose()
}

/// Inserts a wish, stamping both timestamps.
pub(super) fn insert(conn: &mut Connection, wish: &Wish, limit: Option<usize>) -> Result<WriteOutcome> {
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
    if cap_reached(&tx, wish, limit)? {
        return Ok(WriteOutcome::CapReached);
    }

    let now = Timestamp::now();
    let stored = Wish {
        created_at: now,
        updated_at: now,
        ..wish.clone()
    };
    tx.execute(
        &format!(
            "INSERT INTO wishes ({COLUMNS})
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)"
        ),
        params![
            stored.id.to_string(),
            &stored.owner,
            &stored.title,
            &stored.detail,
            &stored.duration,
            cost_to_sql(stored.cost)?,
            &stored.image_url,
            stored.source_id.map(|id| id.to_string()),
            stored.status.as_str(),
            &stored.goal,
            &stored.action_plan,
            stored.achieved_on.map(|d| d.to_string()),
            &stored.reflection,
            timestamp_to_sql(stored.created_at),
            timestamp_to_sql(stored.updated_at),
        ],
    )
    .map_err(|e| {
        conflict_or(e, || match stored.source_id {
            Some(source) => format!("{} already has a wish from catalog entry {source}", stored.owner),
            None => format!("wish {} already exists", stored.id),
        })
    })?;
    tx.commit()?;

    Ok(WriteOutcome::Written(stored))
}

/// Rewrites a wish's mutable fields, stamping `updated_at`.
///
/// `wish.updated_at` must still match the stored row; otherwise the wish was
/// written since it was read and nothing is written. `created_at` is kept
/// from the stored row.
pub(super) fn update(conn: &mut Connection, wish: &Wish, limit: Option<usize>) -> Result<WriteOutcome> {
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
    let Some(current) = load_optional(&tx, &wish.owner, wish.id)? else {
        return Err(StorageError::WishNotFound(wish.id));
    };
    if current.updated_at != wish.updated_at {
        tracing::debug!(owner = %wish.owner, wish = %wish.id, "stale wish snapshot");
        return Ok(WriteOutcome::Stale(current));
    }
    if cap_reached(&tx, wish, limit)? {
        return Ok(WriteOutcome::CapReached);
    }

    let stored = Wish {
        created_at: current.created_at,
        updated_at: Timestamp::now(),
        ..wish.clone()
    };
    tx.execute(
        "UPDATE wishes
         SET title = ?1, detail = ?2, duration = ?3, cost = ?4, image_url = ?5,
             status = ?6, goal = ?7, action_plan = ?8, achieved_on = ?9, reflection = ?10,
             updated_at = ?11
         WHERE owner = ?12 AND id = ?13",
        params![
            &stored.title,
            &stored.detail,
            &stored.duration,
            cost_to_sql(stored.cost)?,
            &stored.image_url,
            stored.status.as_str(),
            &stored.goal,
            &stored.action_plan,
            stored.achieved_on.map(|d| d.to_string()),
            &stored.reflection,
            timestamp_to_sql(stored.updated_at),
            &stored.owner,
            stored.id.to_string(),
        ],
    )?;
    tx.commit()?;

    Ok(WriteOutcome::Written(stored))
}

pub(super) fn delete_by_source(conn: &Connection, owner: &str, source_id: Uuid) -> Result<()> {
    let rows = conn.execute(
        "DELETE FROM wishes WHERE owner = ?1 AND source_id = ?2",
        params![owner, source_id.to_string()],
    )?;
    if rows == 0 {
        return Err(StorageError::SourceNotFound {
            owner: owner.to_string(),
            source_id,
        });
    }
    Ok(())
}

pub(super) fn source_ids(conn: &Connection, owner: &str) -> Result<HashSet<Uuid>> {
    let mut stmt =
        conn.prepare("SELECT source_id FROM wishes WHERE owner = ?1 AND source_id IS NOT NULL")?;
    let ids = stmt
        .query_map([owner], |row| row.get::<_, String>(0))?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    ids.iter().map(|id| parse_uuid(id, "source_id")).collect()
}

/// Whether writing `wish` would push its owner past `limit` want-soon wishes.
fn cap_reached(tx: &Transaction<'_>, wish: &Wish, limit: Option<usize>) -> Result<bool> {
    let Some(limit) = limit else {
        return Ok(false);
    };
    if wish.status != WishStatus::WantSoon {
        return Ok(false);
    }
    let others: i64 = tx.query_row(
        "SELECT COUNT(*) FROM wishes WHERE owner = ?1 AND status = ?2 AND id != ?3",
        params![&wish.owner, WishStatus::WantSoon.as_str(), wish.id.to_string()],
        |row| row.get(0),
    )?;
    let reached = usize::try_from(others).unwrap_or(usize::MAX) >= limit;
    if reached {
        tracing::warn!(owner = %wish.owner, wish = %wish.id, limit, "want-soon cap reached");
    }
    Ok(reached)
}

/// Column values as read, before parsing.
struct RawWish {
    id: String,
    owner: String,
    title: String,
    detail: String,
    duration: String,
    cost: i64,
    image_url: Option<String>,
    source_id: Option<String>,
    status: String,
    goal: Option<String>,
    action_plan: Option<String>,
    achieved_on: Option<String>,
    reflection: Option<String>,
    created_at: String,
    updated_at: String,
}

impl RawWish {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            owner: row.get(1)?,
            title: row.get(2)?,
            detail: row.get(3)?,
            duration: row.get(4)?,
            cost: row.get(5)?,
            image_url: row.get(6)?,
            source_id: row.get(7)?,
            status: row.get(8)?,
            goal: row.get(9)?,
            action_plan: row.get(10)?,
            achieved_on: row.get(11)?,
            reflection: row.get(12)?,
            created_at: row.get(13)?,
            updated_at: row.get(14)?,
        })
    }

    fn into_wish(self) -> Result<Wish> {
        let status = self
            .status
            .parse::<WishStatus>()
            .map_err(|e| StorageError::Corrupt(e.to_string()))?;
        let achieved_on = self
            .achieved_on
            .as_deref()
            .map(|d| {
                d.parse::<Date>()
                    .map_err(|e| StorageError::Corrupt(format!("invalid achieved_on: {e}")))
            })
            .transpose()?;

        Ok(Wish {
            id: parse_uuid(&self.id, "wish id")?,
            owner: self.owner,
            title: self.title,
            detail: self.detail,
            duration: self.duration,
            cost: cost_from_sql(self.cost)?,
            image_url: self.image_url,
            source_id: self
                .source_id
                .as_deref()
                .map(|id| parse_uuid(id, "source_id"))
                .transpose()?,
            status,
            goal: self.goal,
            action_plan: self.action_plan,
            achieved_on,
            reflection: self.reflection,
            created_at: parse_timestamp(&self.created_at, "created_at")?,
            updated_at: parse_timestamp(&self.updated_at, "updated_at")?,
        })
    }
}

#[cfg(test)]
mod tests {
    use jiff::civil::date;

    use crate::model::WishDraft;
    use crate::storage::testing::*;
    use crate::storage::{Storage, WishStore};

    use super::*;

    fn authored(owner: &str, title: &str, status: WishStatus) -> Wish {
        let draft = WishDraft {
            title: title.into(),
            detail: "Somewhere new.".into(),
            duration: "a weekend".into(),
            cost: 12_000,
            image_url: None,
        };
        Wish::authored(owner, draft, status)
    }

    fn written(outcome: WriteOutcome) -> Wish {
        match outcome {
            WriteOutcome::Written(wish) => wish,
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    fn fill_want_soon(storage: &Storage, owner: &str, n: usize) {
        for i in 0..n {
            let wish = authored(owner, &format!("soon {i}"), WishStatus::WantSoon);
            written(storage.insert_wish(&wish, None).unwrap());
        }
    }

    #[test]
    fn insert_and_load_wish() {
        let (_dir, storage) = test_storage();
        let mut wish = authored("alice", "Learn to surf", WishStatus::AchievedWithDate);
        wish.achieved_on = Some(date(2024, 3, 15));
        wish.reflection = Some("great".into());

        let stored = written(storage.insert_wish(&wish, None).unwrap());
        let loaded = storage.load_wish("alice", wish.id).unwrap();

        assert_eq!(loaded, stored);
        assert_eq!(loaded.achieved_on, Some(date(2024, 3, 15)));
    }

    #[test]
    fn load_is_scoped_to_owner() {
        let (_dir, storage) = test_storage();
        let wish = authored("alice", "Learn to surf", WishStatus::Candidate);
        storage.insert_wish(&wish, None).unwrap();

        let err = storage.load_wish("bob", wish.id).unwrap_err();
        assert!(matches!(err, StorageError::WishNotFound(_)));
    }

    #[test]
    fn find_wishes_filters_by_status() {
        let (_dir, storage) = test_storage();
        storage
            .insert_wish(&authored("alice", "a", WishStatus::Candidate), None)
            .unwrap();
        storage
            .insert_wish(&authored("alice", "b", WishStatus::WantSoon), None)
            .unwrap();
        storage
            .insert_wish(&authored("bob", "c", WishStatus::WantSoon), None)
            .unwrap();

        let soon = storage.find_wishes("alice", WishStatus::WantSoon).unwrap();
        assert_eq!(soon.len(), 1);
        assert_eq!(soon[0].title, "b");
        assert_eq!(storage.list_wishes("alice").unwrap().len(), 2);
    }

    #[test]
    fn duplicate_source_for_owner_conflicts() {
        let (_dir, storage) = test_storage();
        let entry = seed_catalog(&storage, &["Climb Mt. Fuji"]).remove(0);

        storage
            .insert_wish(&Wish::from_entry("alice", &entry, WishStatus::Candidate), None)
            .unwrap();
        let err = storage
            .insert_wish(&Wish::from_entry("alice", &entry, WishStatus::WantSoon), None)
            .unwrap_err();
        assert!(matches!(err, StorageError::Conflict(_)));

        // Another owner may adopt the same entry.
        storage
            .insert_wish(&Wish::from_entry("bob", &entry, WishStatus::Candidate), None)
            .unwrap();
    }

    #[test]
    fn guarded_insert_stops_at_limit() {
        let (_dir, storage) = test_storage();
        fill_want_soon(&storage, "alice", 5);

        let sixth = authored("alice", "sixth", WishStatus::WantSoon);
        let outcome = storage.insert_wish(&sixth, Some(5)).unwrap();

        assert_eq!(outcome, WriteOutcome::CapReached);
        assert_eq!(storage.find_wishes("alice", WishStatus::WantSoon).unwrap().len(), 5);
        assert!(storage.load_wish("alice", sixth.id).is_err());
    }

    #[test]
    fn guard_counts_only_the_owner() {
        let (_dir, storage) = test_storage();
        fill_want_soon(&storage, "bob", 5);

        let wish = authored("alice", "mine", WishStatus::WantSoon);
        assert!(matches!(
            storage.insert_wish(&wish, Some(5)).unwrap(),
            WriteOutcome::Written(_)
        ));
    }

    #[test]
    fn guarded_update_excludes_the_wish_itself() {
        let (_dir, storage) = test_storage();
        fill_want_soon(&storage, "alice", 4);
        let wish = written(
            storage
                .insert_wish(&authored("alice", "fifth", WishStatus::WantSoon), None)
                .unwrap(),
        );

        // Rewriting a wish already in the set does not count it twice.
        let mut edited = wish.clone();
        edited.goal = Some("Book the trip".into());
        let stored = written(storage.update_wish(&edited, Some(5)).unwrap());

        assert_eq!(stored.goal.as_deref(), Some("Book the trip"));
        assert_eq!(stored.created_at, wish.created_at);
        assert!(stored.updated_at >= wish.updated_at);
    }

    #[test]
    fn update_from_stale_snapshot_writes_nothing() {
        let (_dir, storage) = test_storage();
        let wish = written(
            storage
                .insert_wish(&authored("alice", "Learn to surf", WishStatus::Candidate), None)
                .unwrap(),
        );

        let mut completed = wish.clone();
        completed.status = WishStatus::AchievedWithDate;
        completed.achieved_on = Some(date(2024, 5, 1));
        completed.reflection = Some("cold water".into());
        let completed = written(storage.update_wish(&completed, None).unwrap());

        // Written from the snapshot taken before completion.
        let mut promoted = wish;
        promoted.status = WishStatus::WantSoon;
        let outcome = storage.update_wish(&promoted, Some(5)).unwrap();

        assert_eq!(outcome, WriteOutcome::Stale(completed.clone()));
        assert_eq!(storage.load_wish("alice", completed.id).unwrap(), completed);
    }

    #[test]
    fn update_nonexistent_wish_fails() {
        let (_dir, storage) = test_storage();
        let wish = authored("alice", "ghost", WishStatus::Candidate);

        let err = storage.update_wish(&wish, None).unwrap_err();
        assert!(matches!(err, StorageError::WishNotFound(_)));
    }

    #[test]
    fn delete_by_source_removes_only_that_owner() {
        let (_dir, storage) = test_storage();
        let entry = seed_catalog(&storage, &["Climb Mt. Fuji"]).remove(0);
        storage
            .insert_wish(&Wish::from_entry("alice", &entry, WishStatus::Candidate), None)
            .unwrap();
        storage
            .insert_wish(&Wish::from_entry("bob", &entry, WishStatus::Candidate), None)
            .unwrap();

        storage.delete_wish_by_source("alice", entry.id).unwrap();

        assert!(storage.rated_source_ids("alice").unwrap().is_empty());
        assert!(storage.rated_source_ids("bob").unwrap().contains(&entry.id));
    }

    #[test]
    fn delete_missing_source_fails() {
        let (_dir, storage) = test_storage();
        let err = storage
            .delete_wish_by_source("alice", Uuid::new_v4())
            .unwrap_err();
        assert!(matches!(err, StorageError::SourceNotFound { .. }));
    }

    #[test]
    fn rated_source_ids_ignore_status_and_authored_wishes() {
        let (_dir, storage) = test_storage();
        let entries = seed_catalog(&storage, &["a", "b"]);
        storage
            .insert_wish(&Wish::from_entry("alice", &entries[0], WishStatus::NotInterested), None)
            .unwrap();
        storage
            .insert_wish(&authored("alice", "mine", WishStatus::Candidate), None)
            .unwrap();

        let ids = storage.rated_source_ids("alice").unwrap();
        assert_eq!(ids, HashSet::from([entries[0].id]));
    }
}

//! Triage: one-at-a-time classification of unrated catalog entries, with undo.
//!
//! A session walks a snapshot of the owner's unrated entries. Each swipe
//! instantiates a wish and pushes an undo frame; undo deletes that wish again
//! and moves the cursor back. The session ends cleanly after the last entry;
//! it never wraps around.

use crate::error::{Result, WishError};
use crate::lifecycle::Wishlist;
use crate::model::{CatalogEntry, Wish, WishDraft, WishStatus};
use crate::storage::WishStore;

/// The three triage gestures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Swipe {
    /// Want to do it.
    Left,

    /// Not interested.
    Down,

    /// Already done, date unknown.
    Right,
}

impl Swipe {
    /// The status a swiped entry is instantiated with.
    pub fn status(self) -> WishStatus {
        match self {
            Self::Left => WishStatus::Candidate,
            Self::Down => WishStatus::NotInterested,
            Self::Right => WishStatus::AchievedUnknownDate,
        }
    }
}

/// Where the session stands after a classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Progress {
    /// This many entries are still waiting.
    Remaining(usize),

    /// Every entry has been classified.
    Complete,
}

#[derive(Debug, Clone)]
struct Frame {
    entry: CatalogEntry,
    status: WishStatus,
    previous_cursor: usize,
}

/// A transient triage session for one owner.
pub struct TriageSession<'a, S: WishStore> {
    wishlist: Wishlist<'a, S>,
    owner: String,
    queue: Vec<CatalogEntry>,
    cursor: usize,
    undo: Vec<Frame>,
}

impl<'a, S: WishStore> TriageSession<'a, S> {
    /// Starts a session over the owner's currently unrated entries.
    pub fn start(store: &'a S, owner: &str) -> Result<Self> {
        let wishlist = Wishlist::new(store);
        let queue = wishlist.unrated(owner)?;
        tracing::debug!(owner, entries = queue.len(), "triage started");
        Ok(Self {
            wishlist,
            owner: owner.to_string(),
            queue,
            cursor: 0,
            undo: Vec::new(),
        })
    }

    /// Re-queries unrated entries and starts over. The undo history is dropped.
    pub fn restart(&mut self) -> Result<()> {
        self.queue = self.wishlist.unrated(&self.owner)?;
        self.cursor = 0;
        self.undo.clear();
        tracing::debug!(owner = %self.owner, entries = self.queue.len(), "triage restarted");
        Ok(())
    }

    /// The entry awaiting classification, if any.
    pub fn current(&self) -> Option<&CatalogEntry> {
        self.queue.get(self.cursor)
    }

    /// The entry after the current one, for previewing.
    pub fn upcoming(&self) -> Option<&CatalogEntry> {
        self.queue.get(self.cursor + 1)
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn remaining(&self) -> usize {
        self.queue.len().saturating_sub(self.cursor)
    }

    pub fn is_complete(&self) -> bool {
        self.cursor >= self.queue.len()
    }

    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    /// Classifies the current entry.
    ///
    /// On failure nothing is pushed and the cursor stays put.
    pub fn classify(&mut self, swipe: Swipe) -> Result<Progress> {
        let Some(entry) = self.current().cloned() else {
            return Err(WishError::NotFound("no catalog entry left to triage".to_string()));
        };
        let status = swipe.status();

        self.wishlist.instantiate(&self.owner, &entry, status)?;

        self.undo.push(Frame {
            entry,
            status,
            previous_cursor: self.cursor,
        });
        self.cursor += 1;
        tracing::debug!(owner = %self.owner, cursor = self.cursor, ?swipe, "classified");

        Ok(if self.is_complete() {
            Progress::Complete
        } else {
            Progress::Remaining(self.remaining())
        })
    }

    /// Reverts the most recent classification.
    ///
    /// Returns the entry that is current again, or `None` when there is
    /// nothing to undo. If the compensating delete fails, the frame stays on
    /// the stack and the cursor is unchanged: the wish still exists and the
    /// undo can be retried.
    pub fn undo(&mut self) -> Result<Option<&CatalogEntry>> {
        let Some(frame) = self.undo.last() else {
            return Ok(None);
        };

        if let Err(err) = self
            .wishlist
            .store()
            .delete_wish_by_source(&self.owner, frame.entry.id)
        {
            tracing::warn!(
                owner = %self.owner,
                source = %frame.entry.id,
                error = %err,
                "undo failed; classified wish still stored"
            );
            return Err(err.into());
        }

        let Some(frame) = self.undo.pop() else {
            return Ok(None);
        };
        self.cursor = frame.previous_cursor;
        tracing::info!(
            owner = %self.owner,
            source = %frame.entry.id,
            status = %frame.status,
            "undid classification"
        );
        Ok(self.current())
    }

    /// Creates a user-authored wish, offered once triage is complete.
    pub fn create_own(&self, draft: WishDraft) -> Result<Wish> {
        self.wishlist.create(&self.owner, draft)
    }
}

#[cfg(test)]
mod tests {
    use crate::storage::testing::*;

    use super::*;

    #[test]
    fn swipes_map_to_statuses() {
        assert_eq!(Swipe::Left.status(), WishStatus::Candidate);
        assert_eq!(Swipe::Down.status(), WishStatus::NotInterested);
        assert_eq!(Swipe::Right.status(), WishStatus::AchievedUnknownDate);
    }

    #[test]
    fn classify_then_undo_restores_everything() {
        let (_dir, storage) = test_storage();
        let entries = seed_catalog(&storage, &["A", "B", "C"]);
        let mut session = TriageSession::start(&storage, "alice").unwrap();

        assert_eq!(session.current().unwrap().id, entries[0].id);
        assert_eq!(session.classify(Swipe::Left).unwrap(), Progress::Remaining(2));
        assert_eq!(session.current().unwrap().id, entries[1].id);

        let wishes = storage.list_wishes("alice").unwrap();
        assert_eq!(wishes.len(), 1);
        assert_eq!(wishes[0].source_id, Some(entries[0].id));
        assert_eq!(wishes[0].status, WishStatus::Candidate);

        let current = session.undo().unwrap().unwrap();
        assert_eq!(current.id, entries[0].id);
        assert_eq!(session.cursor(), 0);
        assert!(storage.list_wishes("alice").unwrap().is_empty());
        assert!(!session.can_undo());
    }

    #[test]
    fn undo_on_empty_stack_is_a_noop() {
        let (_dir, storage) = test_storage();
        seed_catalog(&storage, &["A"]);
        let mut session = TriageSession::start(&storage, "alice").unwrap();

        assert!(session.undo().unwrap().is_none());
        assert_eq!(session.cursor(), 0);
    }

    #[test]
    fn undo_unwinds_in_reverse_order() {
        let (_dir, storage) = test_storage();
        let entries = seed_catalog(&storage, &["A", "B", "C"]);
        let mut session = TriageSession::start(&storage, "alice").unwrap();

        session.classify(Swipe::Left).unwrap();
        session.classify(Swipe::Down).unwrap();

        assert_eq!(session.undo().unwrap().unwrap().id, entries[1].id);
        assert_eq!(session.undo().unwrap().unwrap().id, entries[0].id);
        assert!(session.undo().unwrap().is_none());
        assert!(storage.list_wishes("alice").unwrap().is_empty());
    }

    #[test]
    fn session_completes_without_wrapping() {
        let (_dir, storage) = test_storage();
        seed_catalog(&storage, &["A", "B"]);
        let mut session = TriageSession::start(&storage, "alice").unwrap();

        assert_eq!(session.classify(Swipe::Right).unwrap(), Progress::Remaining(1));
        assert_eq!(session.classify(Swipe::Down).unwrap(), Progress::Complete);
        assert!(session.is_complete());
        assert!(session.current().is_none());

        let err = session.classify(Swipe::Left).unwrap_err();
        assert!(matches!(err, WishError::NotFound(_)));
        assert_eq!(storage.list_wishes("alice").unwrap().len(), 2);
    }

    #[test]
    fn undo_after_completion_reopens_last_entry() {
        let (_dir, storage) = test_storage();
        let entries = seed_catalog(&storage, &["A"]);
        let mut session = TriageSession::start(&storage, "alice").unwrap();

        session.classify(Swipe::Left).unwrap();
        assert!(session.is_complete());

        assert_eq!(session.undo().unwrap().unwrap().id, entries[0].id);
        assert!(!session.is_complete());
    }

    #[test]
    fn already_rated_entries_are_skipped() {
        let (_dir, storage) = test_storage();
        let entries = seed_catalog(&storage, &["A", "B"]);
        Wishlist::new(&storage)
            .instantiate("alice", &entries[0], WishStatus::NotInterested)
            .unwrap();

        let session = TriageSession::start(&storage, "alice").unwrap();
        assert_eq!(session.len(), 1);
        assert_eq!(session.current().unwrap().id, entries[1].id);
        assert!(session.upcoming().is_none());
    }

    #[test]
    fn failed_instantiation_pushes_nothing() {
        let (_dir, storage) = test_storage();
        seed_catalog(&storage, &["A", "B"]);
        let store = FlakyStore::new(storage);
        let mut session = TriageSession::start(&store, "alice").unwrap();

        store.fail_inserts.set(true);
        let err = session.classify(Swipe::Left).unwrap_err();

        assert!(matches!(err, WishError::Storage(_)));
        assert_eq!(session.cursor(), 0);
        assert!(!session.can_undo());
        assert!(store.list_wishes("alice").unwrap().is_empty());
    }

    #[test]
    fn failed_undo_keeps_frame_for_retry() {
        let (_dir, storage) = test_storage();
        seed_catalog(&storage, &["A", "B"]);
        let store = FlakyStore::new(storage);
        let mut session = TriageSession::start(&store, "alice").unwrap();
        session.classify(Swipe::Left).unwrap();

        store.fail_deletes.set(true);
        assert!(session.undo().is_err());
        assert_eq!(session.cursor(), 1);
        assert!(session.can_undo());
        assert_eq!(store.list_wishes("alice").unwrap().len(), 1);

        store.fail_deletes.set(false);
        session.undo().unwrap();
        assert_eq!(session.cursor(), 0);
        assert!(store.list_wishes("alice").unwrap().is_empty());
    }

    #[test]
    fn restart_picks_up_new_entries_and_drops_history() {
        let (_dir, storage) = test_storage();
        seed_catalog(&storage, &["A"]);
        let mut session = TriageSession::start(&storage, "alice").unwrap();
        session.classify(Swipe::Left).unwrap();

        storage.insert_catalog_entry(&sample_entry("B")).unwrap();
        session.restart().unwrap();

        assert_eq!(session.len(), 1);
        assert_eq!(session.current().unwrap().title, "B");
        assert!(!session.can_undo());
    }

    #[test]
    fn create_own_after_completion() {
        let (_dir, storage) = test_storage();
        let session = TriageSession::start(&storage, "alice").unwrap();
        assert!(session.is_complete());

        let wish = session
            .create_own(WishDraft {
                title: "Open a photo exhibition".into(),
                detail: "Rent a small gallery for a week.".into(),
                ..WishDraft::default()
            })
            .unwrap();

        assert_eq!(wish.status, WishStatus::Candidate);
        assert!(wish.source_id.is_none());
    }
}

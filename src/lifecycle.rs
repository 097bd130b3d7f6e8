//! Wish lifecycle: legal status changes, the want-soon cap, and catalog instantiation.
//!
//! [`Wishlist`] is the only way the core mutates wishes. Every method is a
//! single store write: it either lands with all accompanying fields, or the
//! stored wish is left exactly as it was.

use jiff::civil::Date;
use uuid::Uuid;

use crate::error::{Result, WishError};
use crate::model::{CatalogEntry, MAX_COST, Wish, WishDraft, WishStatus};
use crate::storage::{StorageError, WishStore, WriteOutcome};

/// Most wishes one owner may hold in [`WishStatus::WantSoon`] at once.
pub const WANT_SOON_LIMIT: usize = 5;

/// Read-modify-write attempts before giving up on a wish that keeps changing underneath.
const REWRITE_ATTEMPTS: usize = 3;

/// A requested status change for an existing wish.
#[derive(Debug, Clone, PartialEq)]
pub enum Transition {
    /// `Candidate → WantSoon`, subject to the cap.
    Promote,

    /// `WantSoon → Candidate`.
    Demote,

    /// Completion with a known date. Both fields are required.
    Complete { on: Date, reflection: String },

    /// Completion with the month unknown. Any reflection is kept.
    CompleteUndated { reflection: Option<String> },
}

impl Transition {
    /// The status this transition lands in.
    pub fn target(&self) -> WishStatus {
        match self {
            Self::Promote => WishStatus::WantSoon,
            Self::Demote => WishStatus::Candidate,
            Self::Complete { .. } => WishStatus::AchievedWithDate,
            Self::CompleteUndated { .. } => WishStatus::AchievedUnknownDate,
        }
    }

    /// Moving into one of the three buckets, as a drag-and-drop would.
    pub fn into_bucket(target: WishStatus, on: Option<Date>, reflection: Option<String>) -> Result<Self> {
        match target {
            WishStatus::WantSoon => Ok(Self::Promote),
            WishStatus::Candidate => Ok(Self::Demote),
            WishStatus::AchievedWithDate => match (on, reflection) {
                (Some(on), Some(reflection)) => Ok(Self::Complete { on, reflection }),
                _ => Err(WishError::Validation(
                    "completing a wish needs a date and a reflection".to_string(),
                )),
            },
            WishStatus::AchievedUnknownDate => Ok(Self::CompleteUndated { reflection }),
            WishStatus::NotInterested => Err(WishError::Validation(
                "existing wishes cannot be marked not interested".to_string(),
            )),
        }
    }
}

/// Wish operations for one store, scoped per call to an owner.
pub struct Wishlist<'a, S: WishStore> {
    store: &'a S,
}

impl<'a, S: WishStore> Wishlist<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &'a S {
        self.store
    }

    // ── Queries ──

    pub fn wishes(&self, owner: &str, status: WishStatus) -> Result<Vec<Wish>> {
        tracing::debug!(owner, %status, "finding wishes");
        Ok(self.store.find_wishes(owner, status)?)
    }

    pub fn all_wishes(&self, owner: &str) -> Result<Vec<Wish>> {
        Ok(self.store.list_wishes(owner)?)
    }

    pub fn wish(&self, owner: &str, id: Uuid) -> Result<Wish> {
        Ok(self.store.load_wish(owner, id)?)
    }

    /// Catalog entries the owner holds no wish for, in catalog order.
    ///
    /// Any existing wish counts as rated, whatever its status.
    pub fn unrated(&self, owner: &str) -> Result<Vec<CatalogEntry>> {
        let rated = self.store.rated_source_ids(owner)?;
        let entries: Vec<_> = self
            .store
            .list_catalog()?
            .into_iter()
            .filter(|entry| !rated.contains(&entry.id))
            .collect();
        tracing::debug!(owner, unrated = entries.len(), rated = rated.len(), "listed unrated entries");
        Ok(entries)
    }

    // ── Creation ──

    /// Creates the owner's wish from a catalog entry.
    ///
    /// A dated completion carries a date and reflection, so it goes through
    /// [`Wishlist::instantiate_completed`] instead.
    pub fn instantiate(&self, owner: &str, entry: &CatalogEntry, status: WishStatus) -> Result<Wish> {
        if status == WishStatus::AchievedWithDate {
            return Err(WishError::Validation(
                "a dated completion needs a date and a reflection".to_string(),
            ));
        }
        self.insert_from_entry(Wish::from_entry(owner, entry, status))
    }

    /// Creates the owner's wish from a catalog entry, already achieved on `on`.
    ///
    /// Checked like [`Transition::Complete`]: the date may not be after
    /// `today` and the reflection may not be blank.
    pub fn instantiate_completed(
        &self,
        owner: &str,
        entry: &CatalogEntry,
        on: Date,
        reflection: String,
        today: Date,
    ) -> Result<Wish> {
        validate_completion(on, &reflection, today)?;
        let mut wish = Wish::from_entry(owner, entry, WishStatus::AchievedWithDate);
        wish.achieved_on = Some(on);
        wish.reflection = Some(reflection);
        self.insert_from_entry(wish)
    }

    fn insert_from_entry(&self, wish: Wish) -> Result<Wish> {
        let stored = written(self.store.insert_wish(&wish, Some(WANT_SOON_LIMIT))?)?;
        tracing::info!(
            owner = %stored.owner,
            wish = %stored.id,
            source = ?stored.source_id,
            status = %stored.status,
            "instantiated wish"
        );
        Ok(stored)
    }

    /// Creates a user-authored wish as a candidate.
    pub fn create(&self, owner: &str, draft: WishDraft) -> Result<Wish> {
        if draft.title.trim().is_empty() {
            return Err(WishError::Validation("title cannot be empty".to_string()));
        }
        if draft.detail.trim().is_empty() {
            return Err(WishError::Validation("detail cannot be empty".to_string()));
        }
        if draft.cost > MAX_COST {
            return Err(WishError::Validation(format!(
                "cost {} is too large: at most {MAX_COST}",
                draft.cost
            )));
        }
        let wish = Wish::authored(owner, draft, WishStatus::Candidate);
        let stored = written(self.store.insert_wish(&wish, None)?)?;
        tracing::info!(owner, wish = %stored.id, "created wish");
        Ok(stored)
    }

    // ── Transitions ──

    /// Applies `transition` to the owner's wish.
    ///
    /// `today` is the recording date; completion dates after it are rejected.
    /// The legality check runs against the row actually replaced: if the wish
    /// changes between read and write, the check is repeated on the fresh row.
    pub fn transition(&self, owner: &str, id: Uuid, transition: Transition, today: Date) -> Result<Wish> {
        if let Transition::Complete { on, reflection } = &transition {
            validate_completion(*on, reflection, today)?;
        }
        let to = transition.target();

        let mut from = None;
        let stored = self.rewrite(owner, id, Some(WANT_SOON_LIMIT), |mut wish| {
            if !wish.status.can_become(to) {
                return Err(WishError::InvalidTransition { from: wish.status, to });
            }
            from = Some(wish.status);
            wish.status = to;
            match &transition {
                Transition::Promote | Transition::Demote => {}
                Transition::Complete { on, reflection } => {
                    wish.achieved_on = Some(*on);
                    wish.reflection = Some(reflection.clone());
                }
                Transition::CompleteUndated { reflection } => {
                    wish.achieved_on = None;
                    if let Some(reflection) = reflection.as_ref().filter(|r| !r.trim().is_empty()) {
                        wish.reflection = Some(reflection.clone());
                    }
                }
            }
            Ok(wish)
        })?;

        tracing::info!(owner, wish = %id, from = ?from, %to, "moved wish");
        Ok(stored)
    }

    /// Fills in the date of a wish completed with the month unknown.
    ///
    /// An edit, not a transition: the status stays [`WishStatus::AchievedUnknownDate`].
    pub fn set_achievement_date(&self, owner: &str, id: Uuid, on: Date, today: Date) -> Result<Wish> {
        validate_completion_date(on, today)?;
        let stored = self.rewrite(owner, id, None, |mut wish| {
            if wish.status != WishStatus::AchievedUnknownDate {
                return Err(WishError::Validation(format!(
                    "only wishes marked '{}' take a late date",
                    WishStatus::AchievedUnknownDate.label()
                )));
            }
            wish.achieved_on = Some(on);
            Ok(wish)
        })?;

        tracing::info!(owner, wish = %id, %on, "dated achievement");
        Ok(stored)
    }

    /// Replaces the goal and action plan texts. `None` leaves a text unchanged.
    pub fn set_plan(&self, owner: &str, id: Uuid, goal: Option<String>, action_plan: Option<String>) -> Result<Wish> {
        let stored = self.rewrite(owner, id, None, |mut wish| {
            if goal.is_some() {
                wish.goal.clone_from(&goal);
            }
            if action_plan.is_some() {
                wish.action_plan.clone_from(&action_plan);
            }
            Ok(wish)
        })?;

        tracing::info!(owner, wish = %id, "updated plan");
        Ok(stored)
    }

    /// Loads a wish, applies `edit`, and writes the result back.
    ///
    /// The write only lands if the wish is unchanged since it was loaded.
    /// Otherwise `edit` runs again on the fresh row, so its checks always
    /// hold for what is replaced.
    fn rewrite(
        &self,
        owner: &str,
        id: Uuid,
        limit: Option<usize>,
        mut edit: impl FnMut(Wish) -> Result<Wish>,
    ) -> Result<Wish> {
        let mut current = self.store.load_wish(owner, id)?;
        for _ in 0..REWRITE_ATTEMPTS {
            let next = edit(current)?;
            match self.store.update_wish(&next, limit)? {
                WriteOutcome::Stale(fresh) => current = fresh,
                outcome => return written(outcome),
            }
        }
        tracing::warn!(owner, wish = %id, attempts = REWRITE_ATTEMPTS, "wish kept changing");
        Err(WishError::Storage(StorageError::Conflict(format!(
            "wish {id} changed while it was being written; try again"
        ))))
    }
}

fn written(outcome: WriteOutcome) -> Result<Wish> {
    match outcome {
        WriteOutcome::Written(wish) => Ok(wish),
        WriteOutcome::CapReached => Err(WishError::CapacityExceeded {
            limit: WANT_SOON_LIMIT,
        }),
        WriteOutcome::Stale(current) => Err(WishError::Storage(StorageError::Conflict(format!(
            "wish {} changed while it was being written",
            current.id
        )))),
    }
}

fn validate_completion(on: Date, reflection: &str, today: Date) -> Result<()> {
    validate_completion_date(on, today)?;
    if reflection.trim().is_empty() {
        return Err(WishError::Validation(
            "a reflection is required to complete a wish".to_string(),
        ));
    }
    Ok(())
}

fn validate_completion_date(on: Date, today: Date) -> Result<()> {
    if on > today {
        return Err(WishError::Validation(format!(
            "achievement date {on} is in the future"
        )));
    }
    Ok(())
}

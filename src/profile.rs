//! Profile editing: field-by-field edits committed in one save.
//!
//! Each field is either not entered, entered, or being edited. Editing is
//! transient and never stored. Saving writes only the fields touched since the
//! last save; a field cleared back to "not entered" is stored as null.

use std::collections::BTreeSet;

use crate::error::{Result, WishError};
use crate::model::{AuthMethod, Profile, ProfileField, ProfileUpdate};
use crate::storage::WishStore;

/// What a field looks like right now.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldState {
    NotEntered,
    Entered(String),
    Editing,
}

pub struct ProfileEditor<'a, S: WishStore> {
    store: &'a S,
    owner: String,
    auth_method: AuthMethod,
    draft: Profile,
    editing: Option<ProfileField>,
    edited: BTreeSet<ProfileField>,
}

impl<'a, S: WishStore> ProfileEditor<'a, S> {
    pub fn load(store: &'a S, owner: &str) -> Result<Self> {
        let user = store
            .load_user(owner)?
            .ok_or_else(|| WishError::NotFound(format!("user {owner}")))?;
        let draft = store
            .load_profile(owner)?
            .ok_or_else(|| WishError::NotFound(format!("profile of {owner}")))?;
        Ok(Self {
            store,
            owner: owner.to_string(),
            auth_method: user.auth_method,
            draft,
            editing: None,
            edited: BTreeSet::new(),
        })
    }

    /// How the owner signs in. Read-only.
    pub fn auth_method(&self) -> AuthMethod {
        self.auth_method
    }

    /// The profile including unsaved edits.
    pub fn profile(&self) -> &Profile {
        &self.draft
    }

    pub fn state(&self, field: ProfileField) -> FieldState {
        if self.editing == Some(field) {
            return FieldState::Editing;
        }
        if self.draft.is_entered(field) {
            FieldState::Entered(self.draft.display(field))
        } else {
            FieldState::NotEntered
        }
    }

    /// Opens a field for editing. Only one field is open at a time.
    pub fn begin(&mut self, field: ProfileField) {
        self.editing = Some(field);
    }

    /// Closes the open field without changing it.
    pub fn cancel(&mut self) {
        self.editing = None;
    }

    /// Sets a field from user input. Blank input clears it.
    ///
    /// Invalid input is rejected and the draft is left untouched.
    pub fn set(&mut self, field: ProfileField, input: &str) -> Result<()> {
        let input = input.trim();
        let mut update = ProfileUpdate::default();
        match field {
            ProfileField::Nickname => update.nickname = Some(non_blank(input)),
            ProfileField::Age => update.age = Some(parse_age(input)?),
            ProfileField::Gender => update.gender = Some(non_blank(input)),
            ProfileField::PostalCode => update.postal_code = Some(parse_postal_code(input)?),
            ProfileField::Address => update.address = Some(non_blank(input)),
            ProfileField::Interests => update.interests = Some(parse_interests(input)),
        }
        self.draft.apply(&update);
        self.edited.insert(field);
        if self.editing == Some(field) {
            self.editing = None;
        }
        Ok(())
    }

    /// Returns a field to "not entered".
    pub fn clear(&mut self, field: ProfileField) -> Result<()> {
        self.set(field, "")
    }

    pub fn is_dirty(&self) -> bool {
        !self.edited.is_empty()
    }

    /// Writes every field edited since the last save in one update.
    ///
    /// Returns `false` when there was nothing to save.
    pub fn save(&mut self) -> Result<bool> {
        self.editing = None;
        let update = self.pending_update();
        if update.is_empty() {
            return Ok(false);
        }

        self.store.update_profile(&self.owner, &update)?;
        tracing::info!(
            owner = %self.owner,
            fields = ?self.edited,
            "saved profile"
        );
        self.edited.clear();
        Ok(true)
    }

    fn pending_update(&self) -> ProfileUpdate {
        let mut update = ProfileUpdate::default();
        for field in &self.edited {
            match field {
                ProfileField::Nickname => update.nickname = Some(self.draft.nickname.clone()),
                ProfileField::Age => update.age = Some(self.draft.age),
                ProfileField::Gender => update.gender = Some(self.draft.gender.clone()),
                ProfileField::PostalCode => update.postal_code = Some(self.draft.postal_code.clone()),
                ProfileField::Address => update.address = Some(self.draft.address.clone()),
                ProfileField::Interests => update.interests = Some(self.draft.interests.clone()),
            }
        }
        update
    }
}

fn non_blank(input: &str) -> Option<String> {
    (!input.is_empty()).then(|| input.to_string())
}

fn parse_age(input: &str) -> Result<Option<u8>> {
    if input.is_empty() {
        return Ok(None);
    }
    match input.parse::<u8>() {
        Ok(age) if age <= 150 => Ok(Some(age)),
        _ => Err(WishError::Validation(format!(
            "invalid age '{input}': expected a whole number from 0 to 150"
        ))),
    }
}

/// Accepts `NNN-NNNN` or `NNNNNNN`, normalized to `NNN-NNNN`.
fn parse_postal_code(input: &str) -> Result<Option<String>> {
    if input.is_empty() {
        return Ok(None);
    }
    let digits: String = match input.split_once('-') {
        Some((head, tail)) if head.len() == 3 && tail.len() == 4 => format!("{head}{tail}"),
        Some(_) => String::new(),
        None => input.to_string(),
    };
    if digits.len() != 7 || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(WishError::Validation(format!(
            "invalid postal code '{input}': expected NNN-NNNN"
        )));
    }
    Ok(Some(format!("{}-{}", &digits[..3], &digits[3..])))
}

/// Comma-separated, trimmed, de-duplicated in first-seen order.
fn parse_interests(input: &str) -> Vec<String> {
    let mut seen = BTreeSet::new();
    input
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty() && seen.insert(s.to_string()))
        .map(String::from)
        .collect()
}

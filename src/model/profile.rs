//! Profile and user types.

use std::fmt;
use std::str::FromStr;

use jiff::Timestamp;
use serde::{Deserialize, Serialize};

/// Rendered in place of any profile field that has never been entered.
pub const NOT_ENTERED: &str = "not entered";

/// A registered user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub auth_method: AuthMethod,
    pub created_at: Timestamp,
}

/// How a user signs in. Derived from registration; never edited through the profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AuthMethod {
    Password,
    Google,
}

impl AuthMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Password => "password",
            Self::Google => "google",
        }
    }
}

impl FromStr for AuthMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "password" => Ok(Self::Password),
            "google" => Ok(Self::Google),
            other => Err(format!("unknown auth method: {other}")),
        }
    }
}

/// Optional per-user attributes. `None` (or an empty list) means "not entered".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub nickname: Option<String>,
    pub age: Option<u8>,
    pub gender: Option<String>,
    pub postal_code: Option<String>,
    pub address: Option<String>,
    pub interests: Vec<String>,
}

impl Profile {
    /// Whether a value is stored for `field`.
    pub fn is_entered(&self, field: ProfileField) -> bool {
        match field {
            ProfileField::Nickname => self.nickname.is_some(),
            ProfileField::Age => self.age.is_some(),
            ProfileField::Gender => self.gender.is_some(),
            ProfileField::PostalCode => self.postal_code.is_some(),
            ProfileField::Address => self.address.is_some(),
            ProfileField::Interests => !self.interests.is_empty(),
        }
    }

    /// The display value of a field, or [`NOT_ENTERED`].
    pub fn display(&self, field: ProfileField) -> String {
        match field {
            ProfileField::Nickname => or_sentinel(self.nickname.as_deref()),
            ProfileField::Age => self
                .age
                .map_or_else(|| NOT_ENTERED.to_string(), |age| age.to_string()),
            ProfileField::Gender => or_sentinel(self.gender.as_deref()),
            ProfileField::PostalCode => or_sentinel(self.postal_code.as_deref()),
            ProfileField::Address => or_sentinel(self.address.as_deref()),
            ProfileField::Interests if self.interests.is_empty() => NOT_ENTERED.to_string(),
            ProfileField::Interests => self.interests.join(", "),
        }
    }

    /// Apply a partial update in place.
    pub fn apply(&mut self, update: &ProfileUpdate) {
        if let Some(v) = &update.nickname {
            self.nickname.clone_from(v);
        }
        if let Some(v) = update.age {
            self.age = v;
        }
        if let Some(v) = &update.gender {
            self.gender.clone_from(v);
        }
        if let Some(v) = &update.postal_code {
            self.postal_code.clone_from(v);
        }
        if let Some(v) = &update.address {
            self.address.clone_from(v);
        }
        if let Some(v) = &update.interests {
            self.interests.clone_from(v);
        }
    }
}

fn or_sentinel(value: Option<&str>) -> String {
    value.unwrap_or(NOT_ENTERED).to_string()
}

/// Fields to change in one profile write.
///
/// Outer `None` leaves the stored value alone; `Some(None)` clears it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProfileUpdate {
    pub nickname: Option<Option<String>>,
    pub age: Option<Option<u8>>,
    pub gender: Option<Option<String>>,
    pub postal_code: Option<Option<String>>,
    pub address: Option<Option<String>>,
    pub interests: Option<Vec<String>>,
}

impl ProfileUpdate {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Names of the editable profile fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ProfileField {
    Nickname,
    Age,
    Gender,
    PostalCode,
    Address,
    Interests,
}

impl ProfileField {
    pub const ALL: [Self; 6] = [
        Self::Nickname,
        Self::Age,
        Self::Gender,
        Self::PostalCode,
        Self::Address,
        Self::Interests,
    ];
}

impl fmt::Display for ProfileField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Nickname => "nickname",
            Self::Age => "age",
            Self::Gender => "gender",
            Self::PostalCode => "postal code",
            Self::Address => "address",
            Self::Interests => "interests",
        })
    }
}

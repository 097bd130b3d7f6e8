//! Core data model.
//!
//! Wishes and their lifecycle status, the catalog they are drawn from,
//! user profiles, and the calendar months achievements are grouped by.

mod catalog;
mod month;
mod profile;
mod status;
mod wish;

pub use catalog::CatalogEntry;
pub use month::Month;
pub use profile::{AuthMethod, NOT_ENTERED, Profile, ProfileField, ProfileUpdate, User};
pub use status::{UnknownStatus, WishStatus};
pub use wish::{FALLBACK_IMAGE_URL, MAX_COST, Wish, WishDraft, parse_cost};

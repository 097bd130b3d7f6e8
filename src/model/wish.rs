//! Wish types: the user-owned record at the center of everything.

use jiff::Timestamp;
use jiff::civil::Date;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{catalog::CatalogEntry, status::WishStatus};

/// Largest cost that can be stored, in whole currency units.
pub const MAX_COST: u64 = i64::MAX.unsigned_abs();

/// Shown whenever a wish has no usable image.
pub const FALLBACK_IMAGE_URL: &str = "/placeholder.svg?height=400&width=400";

/// A goal or activity owned by one user, and where it stands.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Wish {
    pub id: Uuid,
    pub owner: String,
    pub title: String,
    pub detail: String,

    /// Free-text time commitment ("2 days", "half a day"). Never parsed.
    pub duration: String,

    /// Whole currency units.
    pub cost: u64,
    pub image_url: Option<String>,

    /// The catalog entry this wish was instantiated from, if any.
    pub source_id: Option<Uuid>,
    pub status: WishStatus,

    /// Long-form markdown. Opaque to the core.
    pub goal: Option<String>,
    pub action_plan: Option<String>,

    pub achieved_on: Option<Date>,
    pub reflection: Option<String>,

    /// Stamped by the store on insert.
    pub created_at: Timestamp,

    /// Stamped by the store on every write.
    pub updated_at: Timestamp,
}

impl Wish {
    /// A user-authored wish with no catalog source.
    pub fn authored(owner: &str, draft: WishDraft, status: WishStatus) -> Self {
        let now = Timestamp::now();
        Self {
            id: Uuid::new_v4(),
            owner: owner.to_string(),
            title: draft.title,
            detail: draft.detail,
            duration: draft.duration,
            cost: draft.cost,
            image_url: draft.image_url,
            source_id: None,
            status,
            goal: None,
            action_plan: None,
            achieved_on: None,
            reflection: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// A wish copied from a catalog entry.
    pub fn from_entry(owner: &str, entry: &CatalogEntry, status: WishStatus) -> Self {
        let draft = WishDraft {
            title: entry.title.clone(),
            detail: entry.detail.clone(),
            duration: entry.duration.clone(),
            cost: entry.cost,
            image_url: entry.image_url.clone(),
        };
        Self {
            source_id: Some(entry.id),
            ..Self::authored(owner, draft, status)
        }
    }

    /// The image to display: the stored URL if it looks usable, otherwise the placeholder.
    pub fn image_or_fallback(&self) -> &str {
        match self.image_url.as_deref() {
            Some(url) if is_usable_image_url(url) => url,
            _ => FALLBACK_IMAGE_URL,
        }
    }
}

/// The descriptive fields a user supplies when authoring a wish.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WishDraft {
    pub title: String,
    pub detail: String,
    #[serde(default)]
    pub duration: String,
    #[serde(default)]
    pub cost: u64,
    #[serde(default)]
    pub image_url: Option<String>,
}

fn is_usable_image_url(url: &str) -> bool {
    let rest = url
        .strip_prefix("https://")
        .or_else(|| url.strip_prefix("http://"));
    matches!(rest, Some(host) if !host.is_empty() && !host.starts_with('/') && !url.contains(char::is_whitespace))
}

/// Parse a cost as typed by a user: `30000`, `30,000`, `¥30,000`, `￥500`.
///
/// Negative, fractional, or non-numeric input is rejected.
pub fn parse_cost(input: &str) -> Result<u64, String> {
    let trimmed = input.trim();
    let digits = trimmed
        .strip_prefix('¥')
        .or_else(|| trimmed.strip_prefix('￥'))
        .unwrap_or(trimmed)
        .replace(',', "");

    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(format!("invalid cost '{input}': expected a non-negative whole amount"));
    }

    match digits.parse::<u64>() {
        Ok(cost) if cost <= MAX_COST => Ok(cost),
        _ => Err(format!("invalid cost '{input}': at most {MAX_COST}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_entry() -> CatalogEntry {
        CatalogEntry {
            id: Uuid::new_v4(),
            title: "Climb Mt. Fuji".into(),
            detail: "See the sunrise from the summit.".into(),
            duration: "2 days".into(),
            cost: 30_000,
            image_url: Some("https://images.example.com/fuji.jpg".into()),
            created_at: Timestamp::now(),
        }
    }

    #[test]
    fn from_entry_copies_fields_and_source() {
        let entry = sample_entry();
        let wish = Wish::from_entry("alice", &entry, WishStatus::Candidate);

        assert_eq!(wish.source_id, Some(entry.id));
        assert_eq!(wish.owner, "alice");
        assert_eq!(wish.title, entry.title);
        assert_eq!(wish.cost, 30_000);
        assert_eq!(wish.status, WishStatus::Candidate);
        assert_ne!(wish.id, entry.id);
    }

    #[test]
    fn authored_wish_has_no_source() {
        let draft = WishDraft {
            title: "Open a photo exhibition".into(),
            detail: "Rent a small gallery.".into(),
            ..WishDraft::default()
        };
        let wish = Wish::authored("alice", draft, WishStatus::Candidate);
        assert!(wish.source_id.is_none());
    }

    #[test]
    fn image_falls_back_when_missing_or_invalid() {
        let mut wish = Wish::from_entry("alice", &sample_entry(), WishStatus::Candidate);
        assert_eq!(wish.image_or_fallback(), "https://images.example.com/fuji.jpg");

        wish.image_url = None;
        assert_eq!(wish.image_or_fallback(), FALLBACK_IMAGE_URL);

        wish.image_url = Some("not a url".into());
        assert_eq!(wish.image_or_fallback(), FALLBACK_IMAGE_URL);

        wish.image_url = Some("https://".into());
        assert_eq!(wish.image_or_fallback(), FALLBACK_IMAGE_URL);
    }

    #[test]
    fn parse_cost_accepts_yen_formatting() {
        assert_eq!(parse_cost("30000").unwrap(), 30_000);
        assert_eq!(parse_cost("¥30,000").unwrap(), 30_000);
        assert_eq!(parse_cost(" ￥500 ").unwrap(), 500);
        assert_eq!(parse_cost("0").unwrap(), 0);
    }

    #[test]
    fn parse_cost_rejects_bad_input() {
        for bad in ["", "-5", "12.5", "abc", "¥", "1e3"] {
            assert!(parse_cost(bad).is_err(), "{bad:?} should be rejected");
        }
    }

    #[test]
    fn parse_cost_stops_at_storable_maximum() {
        assert_eq!(parse_cost("9223372036854775807").unwrap(), MAX_COST);
        assert!(parse_cost("9223372036854775808").is_err());
        assert!(parse_cost("10,000,000,000,000,000,000").is_err());
    }
}

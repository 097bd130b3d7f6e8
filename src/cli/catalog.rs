//! Catalog commands: import, list.
//!
//! Imports read a JSON array of base wishes:
//!
//! ```json
//! [{ "title": "Sky diving", "detail": "Tandem jump", "duration": "1 day", "cost": "¥40,000" }]
//! ```
//!
//! `cost` may be a number or a yen-formatted string. `duration`, `cost`, and
//! `imageUrl` are optional.

use std::fs;
use std::path::{Path, PathBuf};

use clap::Subcommand;
use jiff::civil::Date;
use jiff::{SignedDuration, Timestamp};
use serde::Deserialize;
use uuid::Uuid;
use wishes::lifecycle::Wishlist;
use wishes::model::{CatalogEntry, MAX_COST, User, WishStatus, parse_cost};
use wishes::storage::{Storage, WishStore};

use super::format::{format_cost, short_id};

#[derive(Debug, Subcommand)]
pub enum CatalogCommand {
    /// Add base wishes from a JSON file. Prints one ID per entry.
    Import { file: PathBuf },

    /// List catalog entries in triage order.
    List {
        /// Only entries the signed-in user has not classified yet.
        #[arg(long)]
        unrated: bool,
    },
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct ImportedEntry {
    title: String,
    detail: String,
    #[serde(default)]
    duration: String,
    #[serde(default)]
    cost: ImportedCost,
    #[serde(default)]
    image_url: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ImportedCost {
    Amount(u64),
    Text(String),
}

impl Default for ImportedCost {
    fn default() -> Self {
        Self::Amount(0)
    }
}

pub(super) fn cmd_import(storage: &Storage, file: &Path) -> Result<(), String> {
    let json = fs::read_to_string(file)
        .map_err(|e| format!("failed to read {}: {e}", file.display()))?;
    let entries = parse_entries(&json, Timestamp::now())
        .map_err(|e| format!("invalid catalog file {}: {e}", file.display()))?;

    for entry in &entries {
        storage
            .insert_catalog_entry(entry)
            .map_err(|e| format!("failed to import '{}': {e}", entry.title))?;
        println!("{}", entry.id);
    }

    eprintln!("Imported {} catalog entries", entries.len());
    Ok(())
}

pub(super) fn cmd_list(storage: &Storage, unrated_for: Option<&User>) -> Result<(), String> {
    let entries = match unrated_for {
        Some(user) => Wishlist::new(storage).unrated(&user.id).map_err(|e| e.to_string())?,
        None => storage
            .list_catalog()
            .map_err(|e| format!("failed to list catalog: {e}"))?,
    };

    if entries.is_empty() {
        println!("No catalog entries");
        return Ok(());
    }

    for entry in &entries {
        println!(
            "{}  {}  ({}, {})",
            short_id(entry.id),
            entry.title,
            if entry.duration.is_empty() { "-" } else { entry.duration.as_str() },
            format_cost(entry.cost),
        );
    }

    Ok(())
}

pub(super) fn cmd_pick(
    storage: &Storage,
    user: &User,
    reference: &str,
    status: WishStatus,
    on: Option<Date>,
    reflection: Option<String>,
    today: Date,
) -> Result<(), String> {
    let entry = resolve_entry(storage, reference)?;
    let wishlist = Wishlist::new(storage);

    let wish = match (status, on, reflection) {
        (WishStatus::AchievedWithDate, Some(on), Some(reflection)) => {
            wishlist.instantiate_completed(&user.id, &entry, on, reflection, today)
        }
        (WishStatus::AchievedWithDate, _, _) => {
            return Err("--status achieved needs --on and --reflection".to_string());
        }
        (status, None, None) => wishlist.instantiate(&user.id, &entry, status),
        (_, _, _) => {
            return Err("--on and --reflection only apply to --status achieved".to_string());
        }
    }
    .map_err(|e| format!("failed to pick '{}': {e}", entry.title))?;

    println!("{}", wish.id);
    Ok(())
}

/// Resolve a catalog reference (full UUID or unambiguous prefix) to an entry.
fn resolve_entry(store: &impl WishStore, reference: &str) -> Result<CatalogEntry, String> {
    // Try full UUID first.
    if let Ok(id) = reference.parse::<Uuid>() {
        return store.load_catalog_entry(id).map_err(|e| e.to_string());
    }

    let entries = store
        .list_catalog()
        .map_err(|e| format!("failed to list catalog: {e}"))?;
    let matches: Vec<&CatalogEntry> = entries
        .iter()
        .filter(|e| e.id.to_string().starts_with(reference))
        .collect();

    match matches[..] {
        [] => Err(format!("no catalog entry matching '{reference}'")),
        [entry] => Ok(entry.clone()),
        _ => {
            let ids: Vec<String> = matches.iter().map(|e| short_id(e.id)).collect();
            Err(format!(
                "'{reference}' is ambiguous: matches {} entries: {}",
                matches.len(),
                ids.join(", ")
            ))
        }
    }
}

/// Parse an import file. Entries keep file order: each is stamped one
/// microsecond after the previous so the catalog lists them as written.
fn parse_entries(json: &str, now: Timestamp) -> Result<Vec<CatalogEntry>, String> {
    let imported: Vec<ImportedEntry> = serde_json::from_str(json).map_err(|e| e.to_string())?;

    let mut entries = Vec::with_capacity(imported.len());
    for (i, item) in (0_i64..).zip(imported) {
        let title = item.title.trim().to_string();
        if title.is_empty() || item.detail.trim().is_empty() {
            return Err(format!("entry {} needs a title and a detail", i + 1));
        }
        let cost = match item.cost {
            ImportedCost::Amount(n) if n <= MAX_COST => n,
            ImportedCost::Amount(n) => {
                return Err(format!("entry {}: cost {n} is too large: at most {MAX_COST}", i + 1));
            }
            ImportedCost::Text(s) => parse_cost(&s)?,
        };
        let created_at = now
            .checked_add(SignedDuration::from_micros(i))
            .map_err(|e| e.to_string())?;

        entries.push(CatalogEntry {
            id: Uuid::new_v4(),
            title,
            detail: item.detail,
            duration: item.duration,
            cost,
            image_url: item.image_url,
            created_at,
        });
    }
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use wishes::model::AuthMethod;

    use super::*;

    fn imported(storage: &Storage, json: &str) -> Vec<CatalogEntry> {
        let entries = parse_entries(json, Timestamp::UNIX_EPOCH).unwrap();
        for entry in &entries {
            storage.insert_catalog_entry(entry).unwrap();
        }
        entries
    }

    #[test]
    fn resolves_entries_by_id_and_prefix() {
        let dir = tempfile::tempdir().unwrap();
        let storage = Storage::new(dir.path()).unwrap();
        let entries = imported(
            &storage,
            r#"[{"title": "Sky diving", "detail": "x"}, {"title": "Onsen", "detail": "y"}]"#,
        );

        let by_id = resolve_entry(&storage, &entries[1].id.to_string()).unwrap();
        assert_eq!(by_id.title, "Onsen");
        let by_prefix = resolve_entry(&storage, &short_id(entries[0].id)).unwrap();
        assert_eq!(by_prefix.title, "Sky diving");

        assert!(resolve_entry(&storage, "").unwrap_err().contains("ambiguous"));
        assert!(resolve_entry(&storage, &Uuid::new_v4().to_string()).is_err());
    }

    #[test]
    fn pick_records_a_dated_completion() {
        let dir = tempfile::tempdir().unwrap();
        let storage = Storage::new(dir.path()).unwrap();
        let user = storage.create_user("alice", AuthMethod::Password).unwrap();
        let entry = imported(&storage, r#"[{"title": "Sky diving", "detail": "x"}]"#).remove(0);
        let today = jiff::civil::date(2024, 6, 1);
        let reference = entry.id.to_string();

        let missing_date = cmd_pick(
            &storage,
            &user,
            &reference,
            WishStatus::AchievedWithDate,
            None,
            Some("Loud.".into()),
            today,
        );
        assert!(missing_date.is_err());

        cmd_pick(
            &storage,
            &user,
            &reference,
            WishStatus::AchievedWithDate,
            Some(jiff::civil::date(2024, 4, 20)),
            Some("Loud.".into()),
            today,
        )
        .unwrap();

        let wishes = storage.list_wishes("alice").unwrap();
        assert_eq!(wishes.len(), 1);
        assert_eq!(wishes[0].status, WishStatus::AchievedWithDate);
        assert_eq!(wishes[0].achieved_on, Some(jiff::civil::date(2024, 4, 20)));
    }

    #[test]
    fn parses_numbers_and_yen_strings() {
        let json = r#"[
            {"title": "Sky diving", "detail": "Tandem jump", "duration": "1 day", "cost": "¥40,000"},
            {"title": "Onsen", "detail": "Weekend away", "cost": 25000, "imageUrl": "https://img/onsen.jpg"},
            {"title": "Sunrise", "detail": "Watch one"}
        ]"#;
        let entries = parse_entries(json, Timestamp::UNIX_EPOCH).unwrap();

        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0].cost, 40_000);
        assert_eq!(entries[1].cost, 25_000);
        assert_eq!(entries[1].image_url.as_deref(), Some("https://img/onsen.jpg"));
        assert_eq!(entries[2].cost, 0);
        assert!(entries[2].duration.is_empty());
    }

    #[test]
    fn keeps_file_order() {
        let json = r#"[{"title": "a", "detail": "x"}, {"title": "b", "detail": "x"}]"#;
        let entries = parse_entries(json, Timestamp::UNIX_EPOCH).unwrap();
        assert!(entries[0].created_at < entries[1].created_at);
    }

    #[test]
    fn rejects_bad_entries() {
        let blank = r#"[{"title": " ", "detail": "x"}]"#;
        assert!(parse_entries(blank, Timestamp::UNIX_EPOCH).is_err());

        let negative = r#"[{"title": "a", "detail": "x", "cost": "-5"}]"#;
        assert!(parse_entries(negative, Timestamp::UNIX_EPOCH).is_err());

        assert!(parse_entries("{}", Timestamp::UNIX_EPOCH).is_err());
    }

    #[test]
    fn rejects_costs_beyond_storable_maximum() {
        let max = format!(r#"[{{"title": "a", "detail": "x", "cost": {MAX_COST}}}]"#);
        assert_eq!(parse_entries(&max, Timestamp::UNIX_EPOCH).unwrap()[0].cost, MAX_COST);

        let number = r#"[{"title": "a", "detail": "x", "cost": 10000000000000000000}]"#;
        let err = parse_entries(number, Timestamp::UNIX_EPOCH).unwrap_err();
        assert!(err.contains("too large"), "{err}");

        let text = r#"[{"title": "a", "detail": "x", "cost": "¥10,000,000,000,000,000,000"}]"#;
        assert!(parse_entries(text, Timestamp::UNIX_EPOCH).is_err());
    }
}

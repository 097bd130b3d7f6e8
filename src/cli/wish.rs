//! Single-wish commands: add, list, show, and status moves.

use jiff::civil::Date;
use uuid::Uuid;
use wishes::lifecycle::{Transition, WANT_SOON_LIMIT, Wishlist};
use wishes::model::{User, Wish, WishDraft, WishStatus};
use wishes::storage::{Storage, WishStore};

use super::format::{format_cost, format_wish_line, short_id};

pub(super) fn cmd_add(storage: &Storage, user: &User, draft: WishDraft) -> Result<(), String> {
    let wish = Wishlist::new(storage)
        .create(&user.id, draft)
        .map_err(|e| format!("failed to add wish: {e}"))?;

    println!("{}", wish.id);
    Ok(())
}

pub(super) fn cmd_list(
    storage: &Storage,
    user: &User,
    status: Option<WishStatus>,
    json: bool,
) -> Result<(), String> {
    let wishlist = Wishlist::new(storage);
    let wishes = match status {
        Some(status) => wishlist.wishes(&user.id, status),
        None => wishlist.all_wishes(&user.id),
    }
    .map_err(|e| format!("failed to list wishes: {e}"))?;

    if json {
        let json = serde_json::to_string_pretty(&wishes)
            .map_err(|e| format!("failed to serialize wishes: {e}"))?;
        println!("{json}");
        return Ok(());
    }

    if wishes.is_empty() {
        println!("No wishes");
        return Ok(());
    }

    // Not-interested wishes only show up when asked for.
    let shown = status.map_or_else(|| WishStatus::ALL[..4].to_vec(), |s| vec![s]);
    let mut first = true;
    for group in shown {
        let members: Vec<&Wish> = wishes.iter().filter(|w| w.status == group).collect();
        if members.is_empty() {
            continue;
        }
        if !first {
            println!();
        }
        first = false;

        if group == WishStatus::WantSoon {
            println!("{} ({}/{WANT_SOON_LIMIT})", group.label(), members.len());
        } else {
            println!("{} ({})", group.label(), members.len());
        }
        for wish in members {
            println!("  {}", format_wish_line(wish));
        }
    }

    Ok(())
}

pub(super) fn cmd_show(storage: &Storage, user: &User, reference: &str) -> Result<(), String> {
    let wish = resolve_wish(storage, user, reference)?;

    println!("{}", wish.title);
    println!("  id:        {}", wish.id);
    println!("  status:    {}", wish.status.label());
    if !wish.duration.is_empty() {
        println!("  duration:  {}", wish.duration);
    }
    println!("  cost:      {}", format_cost(wish.cost));
    println!("  image:     {}", wish.image_or_fallback());
    if let Some(on) = wish.achieved_on {
        println!("  achieved:  {on}");
    }
    println!();
    println!("{}", wish.detail);

    for (heading, text) in [
        ("Reflection", &wish.reflection),
        ("Goal", &wish.goal),
        ("Action plan", &wish.action_plan),
    ] {
        if let Some(text) = text {
            println!();
            println!("{heading}:");
            println!("{text}");
        }
    }

    Ok(())
}

pub(super) fn cmd_move(
    storage: &Storage,
    user: &User,
    reference: &str,
    transition: Transition,
    today: Date,
) -> Result<(), String> {
    let wish = resolve_wish(storage, user, reference)?;
    let moved = Wishlist::new(storage)
        .transition(&user.id, wish.id, transition, today)
        .map_err(|e| format!("failed to move '{}': {e}", wish.title))?;

    eprintln!(
        "{} → {}",
        format_wish_line(&moved),
        moved.status.label()
    );
    Ok(())
}

pub(super) fn cmd_date(
    storage: &Storage,
    user: &User,
    reference: &str,
    on: Date,
    today: Date,
) -> Result<(), String> {
    let wish = resolve_wish(storage, user, reference)?;
    let dated = Wishlist::new(storage)
        .set_achievement_date(&user.id, wish.id, on, today)
        .map_err(|e| format!("failed to date '{}': {e}", wish.title))?;

    eprintln!("{}", format_wish_line(&dated));
    Ok(())
}

pub(super) fn cmd_plan(
    storage: &Storage,
    user: &User,
    reference: &str,
    goal: Option<String>,
    action_plan: Option<String>,
) -> Result<(), String> {
    if goal.is_none() && action_plan.is_none() {
        return Err("specify --goal, --action, or both".to_string());
    }

    let wish = resolve_wish(storage, user, reference)?;
    Wishlist::new(storage)
        .set_plan(&user.id, wish.id, goal, action_plan)
        .map_err(|e| format!("failed to update plan for '{}': {e}", wish.title))?;

    eprintln!("Plan updated for {}", short_id(wish.id));
    Ok(())
}

/// Resolve a wish reference (full UUID or unambiguous prefix) among the user's wishes.
fn resolve_wish(store: &impl WishStore, user: &User, reference: &str) -> Result<Wish, String> {
    // Try full UUID first.
    if let Ok(id) = reference.parse::<Uuid>() {
        return store.load_wish(&user.id, id).map_err(|e| e.to_string());
    }

    let wishes = store
        .list_wishes(&user.id)
        .map_err(|e| format!("failed to list wishes: {e}"))?;

    let matches: Vec<&Wish> = wishes
        .iter()
        .filter(|w| w.id.to_string().starts_with(reference))
        .collect();

    match matches[..] {
        [] => Err(format!("no wish matching '{reference}'")),
        [wish] => Ok(wish.clone()),
        _ => {
            let ids: Vec<String> = matches.iter().map(|w| short_id(w.id)).collect();
            Err(format!(
                "'{reference}' is ambiguous: matches {} wishes: {}",
                matches.len(),
                ids.join(", ")
            ))
        }
    }
}

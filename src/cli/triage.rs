//! Interactive triage: one catalog entry at a time, one key per line.

use std::io::{self, BufRead, Write};

use wishes::model::{CatalogEntry, User, WishDraft};
use wishes::storage::{Storage, WishStore};
use wishes::triage::{Swipe, TriageSession};

use super::format::format_cost;

const KEYS: &str = "[l] want it  [d] not interested  [r] already done  [u] undo  [q] quit";

pub(super) fn cmd_triage(storage: &Storage, user: &User) -> Result<(), String> {
    let stdin = io::stdin();
    let stdout = io::stdout();
    run_session(storage, &user.id, stdin.lock(), stdout.lock())
}

#[derive(Debug, PartialEq, Eq)]
enum Key {
    Swipe(Swipe),
    Undo,
    Quit,
}

fn parse_key(line: &str) -> Option<Key> {
    match line.trim() {
        "l" | "left" => Some(Key::Swipe(Swipe::Left)),
        "d" | "down" => Some(Key::Swipe(Swipe::Down)),
        "r" | "right" => Some(Key::Swipe(Swipe::Right)),
        "u" | "undo" => Some(Key::Undo),
        "q" | "quit" => Some(Key::Quit),
        _ => None,
    }
}

/// Drives a session from `input` until the catalog is exhausted, the user
/// quits, or input ends.
fn run_session<S: WishStore>(
    store: &S,
    owner: &str,
    mut input: impl BufRead,
    mut out: impl Write,
) -> Result<(), String> {
    let mut session = TriageSession::start(store, owner).map_err(|e| e.to_string())?;
    let io_err = |e: io::Error| format!("terminal error: {e}");

    if session.is_empty() {
        writeln!(out, "Nothing to triage: every catalog entry is already classified.").map_err(io_err)?;
        return offer_own_wish(&session, &mut input, &mut out);
    }

    loop {
        let Some(entry) = session.current() else {
            writeln!(out, "All {} entries classified.", session.len()).map_err(io_err)?;
            return offer_own_wish(&session, &mut input, &mut out);
        };
        show_entry(&mut out, entry, session.cursor() + 1, session.len()).map_err(io_err)?;
        write!(out, "{KEYS}\n> ").map_err(io_err)?;
        out.flush().map_err(io_err)?;

        let Some(line) = read_line(&mut input).map_err(io_err)? else {
            return Ok(());
        };
        match parse_key(&line) {
            Some(Key::Swipe(swipe)) => match session.classify(swipe) {
                Ok(_) => {}
                Err(e) => writeln!(out, "Could not classify: {e}").map_err(io_err)?,
            },
            Some(Key::Undo) if !session.can_undo() => {
                writeln!(out, "Nothing to undo.").map_err(io_err)?;
            }
            Some(Key::Undo) => {
                if let Err(e) = session.undo() {
                    writeln!(out, "Could not undo: {e}").map_err(io_err)?;
                }
            }
            Some(Key::Quit) => return Ok(()),
            None => writeln!(out, "Unknown key '{}'.", line.trim()).map_err(io_err)?,
        }
    }
}

fn show_entry(out: &mut impl Write, entry: &CatalogEntry, position: usize, total: usize) -> io::Result<()> {
    writeln!(out)?;
    writeln!(out, "[{position}/{total}] {}", entry.title)?;
    writeln!(out, "  {}", entry.detail)?;
    if !entry.duration.is_empty() {
        writeln!(out, "  duration: {}", entry.duration)?;
    }
    writeln!(out, "  cost: {}", format_cost(entry.cost))
}

/// Offered once nothing is left: a title and a detail make a new candidate.
fn offer_own_wish<S: WishStore>(
    session: &TriageSession<'_, S>,
    input: &mut impl BufRead,
    out: &mut impl Write,
) -> Result<(), String> {
    let io_err = |e: io::Error| format!("terminal error: {e}");

    write!(out, "Add a wish of your own? Title (blank to finish): ").map_err(io_err)?;
    out.flush().map_err(io_err)?;
    let Some(title) = read_line(input).map_err(io_err)?.filter(|t| !t.trim().is_empty()) else {
        return Ok(());
    };

    write!(out, "Detail: ").map_err(io_err)?;
    out.flush().map_err(io_err)?;
    let detail = read_line(input).map_err(io_err)?.unwrap_or_default();

    let draft = WishDraft {
        title: title.trim().to_string(),
        detail: detail.trim().to_string(),
        ..WishDraft::default()
    };
    let wish = session
        .create_own(draft)
        .map_err(|e| format!("failed to add wish: {e}"))?;
    writeln!(out, "Added '{}' to your candidates.", wish.title).map_err(io_err)?;
    Ok(())
}

/// The next line without its terminator, or `None` at end of input.
fn read_line(input: &mut impl BufRead) -> io::Result<Option<String>> {
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
}

//! Achievement history: a bar per month, then an optional drill-down.

use jiff::civil::Date;
use wishes::achievements::{AchievementView, Window};
use wishes::model::{Month, User};
use wishes::storage::Storage;

use super::format::{bar, format_wish_line};

const BAR_WIDTH: usize = 30;

pub(super) fn cmd_history(
    storage: &Storage,
    user: &User,
    window: Window,
    month: Option<Month>,
    today: Date,
) -> Result<(), String> {
    let mut view = AchievementView::load(storage, &user.id)
        .map_err(|e| format!("failed to load history: {e}"))?;
    view.select_window(window);

    let series = view.series(today);
    if series.is_empty() {
        println!("No dated achievements yet");
    }
    let max = series.iter().map(|m| m.count).max().unwrap_or(0);
    for point in &series {
        println!("{}  {:>3}  {}", point.month, point.count, bar(point.count, max, BAR_WIDTH));
    }

    let Some(month) = month else {
        return Ok(());
    };
    view.select_month(month);
    let found = view.drill_down();

    println!();
    if found.is_empty() {
        println!("Nothing achieved in {month}");
        return Ok(());
    }
    println!("Achieved in {month}:");
    for wish in found {
        println!("  {}", format_wish_line(wish));
        if let Some(reflection) = &wish.reflection {
            println!("      {reflection}");
        }
    }

    Ok(())
}

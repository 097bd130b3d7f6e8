//! Output formatting for CLI display.

use uuid::Uuid;
use wishes::model::Wish;

/// The first eight characters of an ID, as shown in listings.
pub(super) fn short_id(id: Uuid) -> String {
    id.to_string()[..8].to_string()
}

/// A cost in yen with thousands separators, e.g. `¥30,000`.
pub(super) fn format_cost(cost: u64) -> String {
    let digits = cost.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    out.push('¥');
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// One line per wish: id, title, and whatever is known about effort.
pub(super) fn format_wish_line(wish: &Wish) -> String {
    let mut extras = Vec::new();
    if !wish.duration.is_empty() {
        extras.push(wish.duration.clone());
    }
    if wish.cost > 0 {
        extras.push(format_cost(wish.cost));
    }
    if let Some(on) = wish.achieved_on {
        extras.push(format!("achieved {on}"));
    }

    let short = short_id(wish.id);
    if extras.is_empty() {
        format!("{short}  {}", wish.title)
    } else {
        format!("{short}  {}  ({})", wish.title, extras.join(", "))
    }
}

/// A horizontal bar scaled so `max` fills `width` cells.
pub(super) fn bar(count: usize, max: usize, width: usize) -> String {
    if max == 0 || count == 0 {
        return String::new();
    }
    let cells = (count * width).div_ceil(max).min(width);
    "█".repeat(cells)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cost_groups_thousands() {
        assert_eq!(format_cost(0), "¥0");
        assert_eq!(format_cost(500), "¥500");
        assert_eq!(format_cost(30_000), "¥30,000");
        assert_eq!(format_cost(1_234_567), "¥1,234,567");
    }

    #[test]
    fn bar_scales_to_max() {
        assert_eq!(bar(0, 4, 8), "");
        assert_eq!(bar(4, 4, 8).chars().count(), 8);
        assert_eq!(bar(1, 4, 8).chars().count(), 2);
        assert_eq!(bar(1, 3, 8).chars().count(), 3);
        assert_eq!(bar(3, 0, 8), "");
    }
}

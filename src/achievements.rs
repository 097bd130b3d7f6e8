//! Monthly achievement history: fixed-length series for charting, plus drill-down.

use jiff::civil::Date;
use serde::Serialize;

use crate::error::Result;
use crate::model::{Month, Wish};
use crate::storage::WishStore;

/// How far back the history reaches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Window {
    /// The current month only.
    OneMonth,

    /// The current month and the two before it.
    #[default]
    ThreeMonths,

    /// Twelve months ending with the current one.
    OneYear,

    /// From the month of the earliest achievement through the current month.
    AllTime,
}

impl Window {
    /// The months covered, oldest first, given today's date and the owner's achievements.
    pub fn months(self, today: Date, achievements: &[&Wish]) -> Vec<Month> {
        let current = Month::of(today);
        let first = match self {
            Self::OneMonth => current,
            Self::ThreeMonths => current.back(2),
            Self::OneYear => current.back(11),
            Self::AllTime => {
                let Some(earliest) = achievements.iter().filter_map(|w| w.achieved_on).min() else {
                    return Vec::new();
                };
                Month::of(earliest).min(current)
            }
        };
        first.through(current)
    }
}

/// One bar of the chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MonthCount {
    pub month: Month,
    pub count: usize,
}

/// Counts achievements per month across `window`, including empty months.
///
/// Only achieved wishes with a date are counted; dates outside the window are ignored.
pub fn monthly_counts(wishes: &[Wish], window: Window, today: Date) -> Vec<MonthCount> {
    let dated = dated_achievements(wishes);
    window
        .months(today, &dated)
        .into_iter()
        .map(|month| MonthCount {
            month,
            count: dated
                .iter()
                .filter(|w| w.achieved_on.is_some_and(|on| month.contains(on)))
                .count(),
        })
        .collect()
}

/// The achieved wishes dated within `month`, earliest first.
pub fn achieved_in(wishes: &[Wish], month: Month) -> Vec<&Wish> {
    let mut found: Vec<_> = dated_achievements(wishes)
        .into_iter()
        .filter(|w| w.achieved_on.is_some_and(|on| month.contains(on)))
        .collect();
    found.sort_by_key(|w| w.achieved_on);
    found
}

fn dated_achievements(wishes: &[Wish]) -> Vec<&Wish> {
    wishes
        .iter()
        .filter(|w| w.status.is_achieved() && w.achieved_on.is_some())
        .collect()
}

/// The history screen's state: a window and an optional month drilled into.
pub struct AchievementView {
    wishes: Vec<Wish>,
    window: Window,
    selected: Option<Month>,
}

impl AchievementView {
    /// Loads the owner's wishes once; later selections work on that snapshot.
    pub fn load(store: &impl WishStore, owner: &str) -> Result<Self> {
        let wishes = store.list_wishes(owner)?;
        tracing::debug!(owner, wishes = wishes.len(), "loaded achievement history");
        Ok(Self::from_wishes(wishes))
    }

    pub fn from_wishes(wishes: Vec<Wish>) -> Self {
        Self {
            wishes,
            window: Window::default(),
            selected: None,
        }
    }

    pub fn window(&self) -> Window {
        self.window
    }

    pub fn selected(&self) -> Option<Month> {
        self.selected
    }

    /// Switches the window, clearing any month drill-down.
    pub fn select_window(&mut self, window: Window) {
        self.window = window;
        self.selected = None;
    }

    /// Drills into one month.
    pub fn select_month(&mut self, month: Month) {
        self.selected = Some(month);
    }

    pub fn series(&self, today: Date) -> Vec<MonthCount> {
        monthly_counts(&self.wishes, self.window, today)
    }

    /// Wishes achieved in the selected month; empty when none is selected.
    pub fn drill_down(&self) -> Vec<&Wish> {
        self.selected
            .map(|month| achieved_in(&self.wishes, month))
            .unwrap_or_default()
    }
}

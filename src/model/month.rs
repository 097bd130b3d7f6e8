//! Calendar months as sortable `YYYY-MM` keys.

use std::fmt;
use std::str::FromStr;

use jiff::civil::Date;
use serde::{Deserialize, Serialize};

/// A calendar month.
///
/// Ordered chronologically; displayed and parsed as `YYYY-MM`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Month {
    year: i16,
    month: i8,
}

impl Month {
    /// Returns `None` when `month` is not in `1..=12`.
    pub fn new(year: i16, month: i8) -> Option<Self> {
        (1..=12).contains(&month).then_some(Self { year, month })
    }

    /// The month containing `date`.
    pub fn of(date: Date) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn year(self) -> i16 {
        self.year
    }

    pub fn month(self) -> i8 {
        self.month
    }

    /// The following month.
    pub fn next(self) -> Self {
        if self.month == 12 {
            Self {
                year: self.year + 1,
                month: 1,
            }
        } else {
            Self {
                month: self.month + 1,
                ..self
            }
        }
    }

    /// The month `n` months before this one.
    pub fn back(self, n: u32) -> Self {
        let index = i64::from(self.year) * 12 + i64::from(self.month - 1) - i64::from(n);
        #[allow(clippy::cast_possible_truncation)]
        Self {
            year: index.div_euclid(12) as i16,
            month: index.rem_euclid(12) as i8 + 1,
        }
    }

    pub fn contains(self, date: Date) -> bool {
        Self::of(date) == self
    }

    /// Every month from `self` through `last`, inclusive. Empty if `last` is earlier.
    pub fn through(self, last: Self) -> Vec<Self> {
        let mut months = Vec::new();
        let mut cursor = self;
        while cursor <= last {
            months.push(cursor);
            cursor = cursor.next();
        }
        months
    }
}

impl fmt::Display for Month {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for Month {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || format!("invalid month '{s}': expected YYYY-MM");
        let (year, month) = s.split_once('-').ok_or_else(invalid)?;
        if year.len() != 4 || month.len() != 2 {
            return Err(invalid());
        }
        let year = year.parse::<i16>().map_err(|_| invalid())?;
        let month = month.parse::<i8>().map_err(|_| invalid())?;
        Self::new(year, month).ok_or_else(invalid)
    }
}

impl TryFrom<String> for Month {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Month> for String {
    fn from(month: Month) -> Self {
        month.to_string()
    }
}

#[cfg(test)]
mod tests {
    use jiff::civil::date;

    use super::*;

    fn m(year: i16, month: i8) -> Month {
        Month::new(year, month).unwrap()
    }

    #[test]
    fn next_wraps_year() {
        assert_eq!(m(2024, 12).next(), m(2025, 1));
        assert_eq!(m(2024, 3).next(), m(2024, 4));
    }

    #[test]
    fn back_crosses_years() {
        assert_eq!(m(2024, 2).back(2), m(2023, 12));
        assert_eq!(m(2024, 2).back(0), m(2024, 2));
        assert_eq!(m(2024, 12).back(11), m(2024, 1));
        assert_eq!(m(2024, 1).back(25), m(2021, 12));
    }

    #[test]
    fn through_is_inclusive_and_ordered() {
        let months = m(2023, 11).through(m(2024, 2));
        assert_eq!(months, vec![m(2023, 11), m(2023, 12), m(2024, 1), m(2024, 2)]);
        assert!(m(2024, 3).through(m(2024, 2)).is_empty());
    }

    #[test]
    fn display_and_parse() {
        assert_eq!(m(2024, 3).to_string(), "2024-03");
        assert_eq!("2024-03".parse::<Month>().unwrap(), m(2024, 3));
        for bad in ["2024-13", "2024-3", "24-03", "2024/03", "march"] {
            assert!(bad.parse::<Month>().is_err(), "{bad}");
        }
    }

    #[test]
    fn contains_checks_calendar_month() {
        assert!(m(2024, 3).contains(date(2024, 3, 31)));
        assert!(!m(2024, 3).contains(date(2024, 4, 1)));
    }
}

#![warn(clippy::pedantic)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod aggregate;
pub mod cache;
pub mod config;
pub mod generate;
pub mod parse;
pub mod report;
pub mod state;
pub mod tracker;

use std::fmt::{Display, Formatter};

pub use chrono::NaiveDate;
use chrono::{Datelike, Days, Local};
use derive_more::{Add, AddAssign, From, Sum};
use serde::{Deserialize, Serialize};

const MONTH_NAMES: [&str; 12] = [
    "Januari",
    "Februari",
    "Mac",
    "April",
    "Mei",
    "Jun",
    "Julai",
    "Ogos",
    "September",
    "Oktober",
    "November",
    "Disember",
];

const SHORT_MONTH_NAMES: [&str; 12] = [
    "Jan", "Feb", "Mac", "Apr", "Mei", "Jun", "Jul", "Ogo", "Sep", "Okt", "Nov", "Dis",
];

#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Date(pub NaiveDate);

impl Date {
    #[must_use]
    pub fn new(date: NaiveDate) -> Self {
        Self(date)
    }

    #[must_use]
    pub fn today() -> Self {
        Self(Local::now().date_naive())
    }

    #[must_use]
    pub fn month_key(self) -> MonthKey {
        MonthKey {
            year: self.0.year(),
            index: self.0.month0(),
        }
    }

    #[must_use]
    pub fn next_week(self) -> Option<Self> {
        self.0.checked_add_days(Days::new(7)).map(Self)
    }
}

impl Display for Date {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} {} {}",
            self.0.day(),
            SHORT_MONTH_NAMES[self.0.month0() as usize],
            self.0.year()
        )
    }
}

/// A calendar month as persisted: the year and the zero-based month index.
///
/// The string form is `"{year}-{index}"`, so October 2025 is `"2025-9"`.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MonthKey {
    pub year: i32,
    pub index: u32,
}

impl MonthKey {
    #[must_use]
    pub fn new(year: i32, index: u32) -> Option<Self> {
        (index < 12).then_some(Self { year, index })
    }

    /// Display name such as `Oktober 2025`.
    #[must_use]
    pub fn name(self) -> String {
        format!("{} {}", MONTH_NAMES[self.index as usize], self.year)
    }
}

impl Display for MonthKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}", self.year, self.index)
    }
}

impl From<MonthKey> for String {
    fn from(value: MonthKey) -> Self {
        value.to_string()
    }
}

impl TryFrom<String> for MonthKey {
    type Error = parse::MonthKeyError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Whole ringgit.
#[derive(
    Debug,
    Default,
    Copy,
    Clone,
    Eq,
    PartialEq,
    Ord,
    PartialOrd,
    Hash,
    From,
    Add,
    AddAssign,
    Sum,
    Serialize,
    Deserialize,
)]
#[serde(transparent)]
pub struct Amount(u64);

impl Amount {
    #[must_use]
    pub fn into_inner(self) -> u64 {
        self.0
    }

    /// Saturates at `u64::MAX`.
    #[must_use]
    pub fn times(self, weeks: u32) -> Self {
        Self(self.0.saturating_mul(u64::from(weeks)))
    }

    #[must_use]
    pub fn checked_times(self, weeks: u32) -> Option<Self> {
        self.0.checked_mul(u64::from(weeks)).map(Self)
    }

    #[must_use]
    pub fn saturating_sub(self, rhs: Self) -> Self {
        Self(self.0.saturating_sub(rhs.0))
    }
}

impl Display for Amount {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let digits = self.0.to_string();
        let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
        for (i, c) in digits.chars().enumerate() {
            if i > 0 && (digits.len() - i) % 3 == 0 {
                grouped.push(',');
            }
            grouped.push(c);
        }
        write!(f, "RM {grouped}")
    }
}

#[cfg(test)]
mod test {
    use chrono::NaiveDate;

    use crate::{Amount, Date, MonthKey};

    #[test]
    fn test_amount_display() {
        assert_eq!(Amount::from(0).to_string(), "RM 0");
        assert_eq!(Amount::from(480).to_string(), "RM 480");
        assert_eq!(Amount::from(5500).to_string(), "RM 5,500");
        assert_eq!(Amount::from(1_234_567).to_string(), "RM 1,234,567");
    }

    #[test]
    fn test_amount_arithmetic() {
        assert_eq!(Amount::from(110).times(4), Amount::from(440));
        assert_eq!(
            Amount::from(5500).saturating_sub(Amount::from(440)),
            Amount::from(5060)
        );
        assert_eq!(
            Amount::from(1).saturating_sub(Amount::from(2)),
            Amount::default()
        );
        assert_eq!(Amount::from(u64::MAX).times(2), Amount::from(u64::MAX));
        assert_eq!(Amount::from(u64::MAX).checked_times(2), None);
        assert_eq!(Amount::from(110).checked_times(50), Some(Amount::from(5500)));
        let sum: Amount = [Amount::from(1), Amount::from(2)].into_iter().sum();
        assert_eq!(sum, Amount::from(3));
    }

    #[test]
    fn test_date() {
        let date = Date::new(NaiveDate::from_ymd_opt(2025, 10, 13).unwrap());
        assert_eq!(date.to_string(), "13 Okt 2025");
        assert_eq!(
            date.next_week(),
            Some(Date::new(NaiveDate::from_ymd_opt(2025, 10, 20).unwrap()))
        );
        assert_eq!(date.month_key(), MonthKey::new(2025, 9).unwrap());
    }

    #[test]
    fn test_month_key() {
        let key = MonthKey::new(2026, 0).unwrap();
        assert_eq!(key.to_string(), "2026-0");
        assert_eq!(key.name(), "Januari 2026");
        assert!(MonthKey::new(2025, 11).unwrap() < key);
        assert_eq!(MonthKey::new(2025, 12), None);
    }
}

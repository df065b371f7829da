use std::str::FromStr;

use chrono::format::{Item, Numeric, Pad, Parsed};
use thiserror::Error;

use crate::{Date, MonthKey};

#[derive(Debug, Error, Eq, PartialEq)]
pub enum DateError {
    #[error("Expected a date in the format <year>-<month>-<day>")]
    Format,
    #[error("Invalid date")]
    Date,
}

#[derive(Debug, Error, Eq, PartialEq)]
pub enum MonthKeyError {
    #[error("Expected a month in the format <year>-<zero based month>")]
    Format,
    #[error("Month index {0} is out of range, expected 0 to 11")]
    Month(u32),
}

pub fn parse_date(s: &str) -> Result<Date, DateError> {
    const ITEMS: &[Item<'static>] = &[
        Item::Numeric(Numeric::Year, Pad::Zero),
        Item::Literal("-"),
        Item::Numeric(Numeric::Month, Pad::Zero),
        Item::Literal("-"),
        Item::Numeric(Numeric::Day, Pad::Zero),
    ];

    let mut parsed = Parsed::new();
    chrono::format::parse(&mut parsed, s.trim(), ITEMS.iter()).map_err(|_| DateError::Format)?;
    parsed.to_naive_date().map(Date).map_err(|_| DateError::Date)
}

impl FromStr for MonthKey {
    type Err = MonthKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (year, index) = s.trim().split_once('-').ok_or(MonthKeyError::Format)?;
        if year.is_empty() || index.is_empty() {
            return Err(MonthKeyError::Format);
        }
        let year = year.parse().map_err(|_| MonthKeyError::Format)?;
        let index = index.parse().map_err(|_| MonthKeyError::Format)?;
        MonthKey::new(year, index).ok_or(MonthKeyError::Month(index))
    }
}

use std::collections::BTreeMap;

use ecow::EcoString;
use thiserror::Error;

use crate::{Date, MonthKey};

#[derive(Debug, Error, Eq, PartialEq)]
pub enum Error {
    #[error("Target payment weeks must be positive")]
    NonPositiveTarget,
    #[error("Schedule runs past the last representable date after {0}")]
    DateOutOfRange(Date),
}

/// Dates that do not count as payment weeks, with their display names.
#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct Holidays(BTreeMap<Date, EcoString>);

impl Holidays {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, date: Date, name: impl Into<EcoString>) {
        self.0.insert(date, name.into());
    }

    #[must_use]
    pub fn get(&self, date: Date) -> Option<&EcoString> {
        self.0.get(&date)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(Date, EcoString)> for Holidays {
    fn from_iter<T: IntoIterator<Item = (Date, EcoString)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub enum Label {
    Week(u32),
    Holiday(EcoString),
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct WeekEntry {
    pub label: Label,
    pub date: Date,
}

impl WeekEntry {
    #[must_use]
    pub fn is_holiday(&self) -> bool {
        matches!(self.label, Label::Holiday(_))
    }

    #[must_use]
    pub fn holiday_name(&self) -> Option<&str> {
        match &self.label {
            Label::Holiday(name) => Some(name.as_str()),
            Label::Week(_) => None,
        }
    }

    #[must_use]
    pub fn week(&self) -> Option<u32> {
        match self.label {
            Label::Week(week) => Some(week),
            Label::Holiday(_) => None,
        }
    }

    #[must_use]
    pub fn month_key(&self) -> MonthKey {
        self.date.month_key()
    }
}

/// Emits one entry per week starting at `start` until `target_weeks` payable
/// weeks have been emitted. Holiday weeks are emitted too but do not advance
/// the week counter.
pub fn generate(start: Date, target_weeks: u32, holidays: &Holidays) -> Result<Vec<WeekEntry>, Error> {
    if target_weeks == 0 {
        return Err(Error::NonPositiveTarget);
    }

    let mut weeks = Vec::with_capacity(target_weeks as usize + holidays.len());
    let mut cursor = start;
    let mut counter = 1;
    loop {
        let label = match holidays.get(cursor) {
            Some(name) => Label::Holiday(name.clone()),
            None => {
                let label = Label::Week(counter);
                counter += 1;
                label
            }
        };
        weeks.push(WeekEntry {
            label,
            date: cursor,
        });
        if counter > target_weeks {
            break;
        }
        cursor = cursor.next_week().ok_or(Error::DateOutOfRange(cursor))?;
    }
    Ok(weeks)
}

/// Date of the final entry, i.e. the week the schedule is paid off.
#[must_use]
pub fn target_date(weeks: &[WeekEntry]) -> Option<Date> {
    weeks.last().map(|w| w.date)
}

#[cfg(test)]
mod test {
    use chrono::NaiveDate;

    use crate::generate::{generate, target_date, Error, Holidays, Label};
    use crate::Date;

    fn date(year: i32, month: u32, day: u32) -> Date {
        Date(NaiveDate::from_ymd_opt(year, month, day).unwrap())
    }

    fn holidays() -> Holidays {
        let mut holidays = Holidays::new();
        holidays.insert(date(2025, 10, 20), "Cuti Deepavali");
        holidays.insert(date(2026, 2, 2), "Cuti Thaipusam");
        holidays.insert(date(2026, 3, 23), "Cuti Raya Puasa");
        holidays.insert(date(2026, 6, 1), "Hari Keputeraan Agong");
        holidays.insert(date(2026, 8, 31), "Hari Merdeka");
        holidays
    }

    #[test]
    fn test_first_weeks() {
        let weeks = generate(date(2025, 10, 13), 50, &holidays()).unwrap();

        assert_eq!(weeks[0].date, date(2025, 10, 13));
        assert_eq!(weeks[0].label, Label::Week(1));
        assert!(!weeks[0].is_holiday());

        assert_eq!(weeks[1].date, date(2025, 10, 20));
        assert!(weeks[1].is_holiday());
        assert_eq!(weeks[1].holiday_name(), Some("Cuti Deepavali"));
        assert_eq!(weeks[1].week(), None);

        assert_eq!(weeks[2].date, date(2025, 10, 27));
        assert_eq!(weeks[2].label, Label::Week(2));
    }

    #[test]
    fn test_payable_count_and_spacing() {
        let holidays = holidays();
        for target in [1, 2, 7, 50, 120] {
            let weeks = generate(date(2025, 10, 13), target, &holidays).unwrap();
            let holiday_count = weeks.iter().filter(|w| w.is_holiday()).count();
            assert_eq!(weeks.len() - holiday_count, target as usize, "{target}");

            for (a, b) in weeks.iter().zip(weeks.iter().skip(1)) {
                assert_eq!((b.date.0 - a.date.0).num_days(), 7);
            }

            let numbers = weeks.iter().filter_map(|w| w.week()).collect::<Vec<_>>();
            assert_eq!(numbers, (1..=target).collect::<Vec<_>>());
        }
    }

    #[test]
    fn test_full_schedule() {
        let weeks = generate(date(2025, 10, 13), 50, &holidays()).unwrap();
        assert_eq!(weeks.len(), 55);
        assert!(weeks.iter().filter(|w| w.is_holiday()).all(|w| holidays().get(w.date).is_some()));
        assert!(!weeks.last().unwrap().is_holiday());
        assert_eq!(target_date(&weeks), Some(date(2026, 10, 26)));
    }

    #[test]
    fn test_holiday_on_start() {
        let mut holidays = Holidays::new();
        holidays.insert(date(2025, 10, 13), "Cuti");
        let weeks = generate(date(2025, 10, 13), 1, &holidays).unwrap();
        assert_eq!(weeks.len(), 2);
        assert!(weeks[0].is_holiday());
        assert_eq!(weeks[1].label, Label::Week(1));
    }

    #[test]
    fn test_zero_target() {
        assert_eq!(
            generate(date(2025, 10, 13), 0, &Holidays::new()),
            Err(Error::NonPositiveTarget)
        );
        assert_eq!(target_date(&[]), None);
    }
}

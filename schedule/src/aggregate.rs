use std::collections::BTreeMap;

use crate::config::Config;
use crate::generate::{target_date, WeekEntry};
use crate::state::PaymentState;
use crate::{Amount, Date, MonthKey};

/// How a month's payable weeks are shared between the two payers.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct Split {
    pub first_weeks: u32,
    pub second_weeks: u32,
    pub first: Amount,
    pub second: Amount,
}

impl Split {
    #[must_use]
    pub fn new(payable_weeks: u32, first_fixed_weeks: u32, rate: Amount) -> Self {
        let first_weeks = first_fixed_weeks.min(payable_weeks);
        let second_weeks = payable_weeks - first_weeks;
        Self {
            first_weeks,
            second_weeks,
            first: rate.times(first_weeks),
            second: rate.times(second_weeks),
        }
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum WeekStatus {
    Holiday,
    Done,
    Pending,
    Upcoming,
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct MonthGroup {
    pub key: MonthKey,
    pub weeks: Vec<WeekEntry>,
    pub payable_weeks: u32,
    /// At the display rate.
    pub total: Amount,
    pub split: Split,
    pub paid: bool,
}

impl MonthGroup {
    #[must_use]
    pub fn name(&self) -> String {
        self.key.name()
    }

    #[must_use]
    pub fn week_status(&self, week: &WeekEntry, today: Date) -> WeekStatus {
        if week.is_holiday() {
            WeekStatus::Holiday
        } else if self.paid {
            WeekStatus::Done
        } else if week.date < today {
            WeekStatus::Pending
        } else {
            WeekStatus::Upcoming
        }
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct Summary {
    pub target_weeks: u32,
    pub paid_weeks: u32,
    pub total_owed: Amount,
    pub total_paid: Amount,
    pub remaining: Amount,
    pub target_date: Option<Date>,
}

impl Summary {
    #[must_use]
    pub fn progress(&self) -> f64 {
        (f64::from(self.paid_weeks) / f64::from(self.target_weeks)).clamp(0.0, 1.0)
    }
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct View {
    pub months: Vec<MonthGroup>,
    pub summary: Summary,
    pub today: Date,
}

impl View {
    #[must_use]
    pub fn month(&self, key: MonthKey) -> Option<&MonthGroup> {
        self.months
            .binary_search_by(|m| m.key.cmp(&key))
            .ok()
            .map(|i| &self.months[i])
    }
}

/// Buckets weeks by calendar month, chronologically.
#[must_use]
pub fn group_by_month(weeks: &[WeekEntry]) -> BTreeMap<MonthKey, Vec<WeekEntry>> {
    let mut months = BTreeMap::<MonthKey, Vec<WeekEntry>>::new();
    for week in weeks {
        months.entry(week.month_key()).or_default().push(week.clone());
    }
    months
}

/// Rebuilds everything shown to the user from the schedule and the paid
/// flags. Paid weeks are summed from the paid months on every call.
#[must_use]
pub fn derive_view(weeks: &[WeekEntry], state: &PaymentState, config: &Config, today: Date) -> View {
    let rates = config.rates;
    let months = group_by_month(weeks)
        .into_iter()
        .map(|(key, weeks)| {
            let payable_weeks = u32::try_from(weeks.iter().filter(|w| !w.is_holiday()).count())
                .unwrap_or(u32::MAX);
            MonthGroup {
                key,
                payable_weeks,
                total: rates.display.times(payable_weeks),
                split: Split::new(payable_weeks, config.payers.first_weeks, rates.display),
                paid: state.is_paid(key),
                weeks,
            }
        })
        .collect::<Vec<_>>();

    let paid_weeks = months
        .iter()
        .filter(|m| m.paid)
        .map(|m| m.payable_weeks)
        .sum::<u32>();
    let total_owed = rates.calc.times(config.target_weeks);
    let total_paid = rates.calc.times(paid_weeks);

    View {
        months,
        summary: Summary {
            target_weeks: config.target_weeks,
            paid_weeks,
            total_owed,
            total_paid,
            remaining: total_owed.saturating_sub(total_paid),
            target_date: target_date(weeks),
        },
        today,
    }
}

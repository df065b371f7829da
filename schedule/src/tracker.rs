use std::collections::BTreeSet;

use thiserror::Error;
use tracing::{info, warn};

use crate::aggregate::{derive_view, View};
use crate::config::Config;
use crate::generate::{generate, WeekEntry};
use crate::state::{KeyValueStore, PaymentState, PaymentStore, StoreError};
use crate::{Date, MonthKey};

#[derive(Debug, Error)]
pub enum Error {
    #[error("Invalid schedule: {0}")]
    Schedule(#[from] crate::generate::Error),
    #[error("Month {0} is not part of the schedule")]
    UnknownMonth(MonthKey),
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Command {
    ToggleMonthPaid { month: MonthKey, paid: bool },
}

/// Owns the schedule and the authoritative in-memory paid flags.
///
/// Storage failures never abort: they are handed back to the caller as a
/// warning and the in-memory state keeps the change for this session.
pub struct Tracker<S> {
    config: Config,
    weeks: Vec<WeekEntry>,
    months: BTreeSet<MonthKey>,
    state: PaymentState,
    store: PaymentStore<S>,
}

impl<S: KeyValueStore> Tracker<S> {
    pub fn open(config: Config, store: S) -> Result<(Self, Option<StoreError>), Error> {
        let weeks = generate(config.start, config.target_weeks, &config.holidays)?;
        let months = weeks.iter().map(WeekEntry::month_key).collect();
        let mut store = PaymentStore::from_config(store, &config);
        let (state, warning) = match store.load() {
            Ok(state) => (state, None),
            Err(e) => {
                warn!("failed to load payment state, continuing with the seed: {e}");
                (store.seed(), Some(e))
            }
        };
        info!(
            weeks = weeks.len(),
            target = config.target_weeks,
            "schedule generated"
        );
        Ok((
            Self {
                config,
                weeks,
                months,
                state,
                store,
            },
            warning,
        ))
    }

    pub fn handle(&mut self, command: Command) -> Result<Option<StoreError>, Error> {
        match command {
            Command::ToggleMonthPaid { month, paid } => {
                if !self.months.contains(&month) {
                    return Err(Error::UnknownMonth(month));
                }
                self.state.set(month, paid);
                match self.store.persist(&self.state) {
                    Ok(()) => {
                        info!(%month, paid, "month toggled");
                        Ok(None)
                    }
                    Err(e) => {
                        warn!(%month, paid, "failed to persist month toggle: {e}");
                        Ok(Some(e))
                    }
                }
            }
        }
    }

    #[must_use]
    pub fn view(&self, today: Date) -> View {
        derive_view(&self.weeks, &self.state, &self.config, today)
    }

    #[must_use]
    pub fn is_paid(&self, month: MonthKey) -> bool {
        self.state.is_paid(month)
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn state(&self) -> &PaymentState {
        &self.state
    }

    pub fn store(&self) -> &S {
        self.store.store()
    }
}

//! Tracker configuration.
//!
//! Every field has a built-in default, so a missing file or a file that only
//! overrides a few keys is fine. The raw TOML shape is validated into a
//! [`Config`] once at startup; nothing downstream re-checks it.

use std::collections::BTreeMap;
use std::path::Path;

use ecow::EcoString;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::generate::Holidays;
use crate::parse::{parse_date, DateError, MonthKeyError};
use crate::{Amount, Date, MonthKey};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Target payment weeks must be positive")]
    NonPositiveTarget,
    #[error("Invalid start date {0:?}: {1}")]
    StartDate(String, DateError),
    #[error("Invalid holiday date {0:?}: {1}")]
    HolidayDate(String, DateError),
    #[error("Invalid seed month {0:?}: {1}")]
    SeedMonth(String, MonthKeyError),
    #[error("Rate {0} overflows the total over the target weeks")]
    RateTooLarge(u64),
    #[error("Storage key must not be empty")]
    EmptyStorageKey,
    #[error("Cache name must not be empty")]
    EmptyCacheName,
}

#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawConfig {
    pub start_date: String,
    pub target_weeks: u32,
    pub calc_rate: u64,
    /// Shown per week; the calc rate plus the savings margin.
    pub display_rate: u64,
    pub storage_key: String,
    pub seed_paid: Vec<String>,
    pub holidays: BTreeMap<String, String>,
    pub payers: Payers,
    pub cache: CacheConfig,
}

impl Default for RawConfig {
    fn default() -> Self {
        let holidays = [
            ("2025-10-20", "Cuti Deepavali"),
            ("2026-02-02", "Cuti Thaipusam"),
            ("2026-03-23", "Cuti Raya Puasa"),
            ("2026-06-01", "Hari Keputeraan Agong"),
            ("2026-08-31", "Hari Merdeka"),
        ];
        Self {
            start_date: "2025-10-13".to_owned(),
            target_weeks: 50,
            calc_rate: 110,
            display_rate: 120,
            storage_key: "aim_schedule_data_v1".to_owned(),
            seed_paid: ["2025-9", "2025-10", "2025-11", "2026-0"]
                .map(str::to_owned)
                .to_vec(),
            holidays: holidays
                .into_iter()
                .map(|(date, name)| (date.to_owned(), name.to_owned()))
                .collect(),
            payers: Payers::default(),
            cache: CacheConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Payers {
    pub first: String,
    /// Weeks per month covered by the first payer; the rest go to the second.
    pub first_weeks: u32,
    pub second: String,
}

impl Default for Payers {
    fn default() -> Self {
        Self {
            first: "Mak".to_owned(),
            first_weeks: 3,
            second: "Mujib".to_owned(),
        }
    }
}

#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub name: String,
    pub assets: Vec<String>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            name: "aim-schedule-v4.9".to_owned(),
            assets: [
                "./",
                "./index.html",
                "./style.css",
                "./app.js",
                "./manifest.json",
                "./icon.svg",
            ]
            .map(str::to_owned)
            .to_vec(),
        }
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct Rates {
    pub calc: Amount,
    pub display: Amount,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub start: Date,
    pub target_weeks: u32,
    pub rates: Rates,
    pub storage_key: String,
    pub seed_paid: Vec<MonthKey>,
    pub holidays: Holidays,
    pub payers: Payers,
    pub cache: CacheConfig,
}

impl Default for Config {
    fn default() -> Self {
        Config::try_from(RawConfig::default()).expect("default config is valid")
    }
}

impl TryFrom<RawConfig> for Config {
    type Error = ConfigError;

    fn try_from(raw: RawConfig) -> Result<Self, Self::Error> {
        let RawConfig {
            start_date,
            target_weeks,
            calc_rate,
            display_rate,
            storage_key,
            seed_paid,
            holidays,
            payers,
            cache,
        } = raw;

        if target_weeks == 0 {
            return Err(ConfigError::NonPositiveTarget);
        }
        if storage_key.trim().is_empty() {
            return Err(ConfigError::EmptyStorageKey);
        }
        if cache.name.trim().is_empty() {
            return Err(ConfigError::EmptyCacheName);
        }
        for rate in [calc_rate, display_rate] {
            if Amount::from(rate).checked_times(target_weeks).is_none() {
                return Err(ConfigError::RateTooLarge(rate));
            }
        }
        let start = parse_date(&start_date).map_err(|e| ConfigError::StartDate(start_date, e))?;
        let holidays = holidays
            .into_iter()
            .map(|(date, name)| match parse_date(&date) {
                Ok(parsed) => Ok((parsed, EcoString::from(name))),
                Err(e) => Err(ConfigError::HolidayDate(date, e)),
            })
            .collect::<Result<Holidays, _>>()?;
        let seed_paid = seed_paid
            .into_iter()
            .map(|key| key.parse().map_err(|e| ConfigError::SeedMonth(key, e)))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            start,
            target_weeks,
            rates: Rates {
                calc: Amount::from(calc_rate),
                display: Amount::from(display_rate),
            },
            storage_key,
            seed_paid,
            holidays,
            payers,
            cache,
        })
    }
}

impl Config {
    pub fn from_toml(s: &str) -> Result<Self, ConfigError> {
        let raw: RawConfig = toml::from_str(s)?;
        Self::try_from(raw)
    }

    /// Reads the config at `path`, falling back to the defaults if the file
    /// does not exist.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        match fs_err::read_to_string(path) {
            Ok(text) => {
                tracing::debug!(path = %path.display(), "loading config");
                Self::from_toml(&text)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "no config file, using defaults");
                Ok(Self::default())
            }
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod test {
    use chrono::NaiveDate;

    use crate::config::{Config, ConfigError, RawConfig};
    use crate::parse::{DateError, MonthKeyError};
    use crate::{Amount, Date, MonthKey};

    #[test]
    fn test_default() {
        let config = Config::default();
        assert_eq!(
            config.start,
            Date(NaiveDate::from_ymd_opt(2025, 10, 13).unwrap())
        );
        assert_eq!(config.target_weeks, 50);
        assert_eq!(config.rates.calc, Amount::from(110));
        assert_eq!(config.rates.display, Amount::from(120));
        assert_eq!(config.holidays.len(), 5);
        assert_eq!(
            config
                .holidays
                .get(Date(NaiveDate::from_ymd_opt(2025, 10, 20).unwrap()))
                .map(|n| n.as_str()),
            Some("Cuti Deepavali")
        );
        assert_eq!(
            config.seed_paid,
            vec![
                MonthKey::new(2025, 9).unwrap(),
                MonthKey::new(2025, 10).unwrap(),
                MonthKey::new(2025, 11).unwrap(),
                MonthKey::new(2026, 0).unwrap(),
            ]
        );
        assert_eq!(config.payers.first_weeks, 3);
    }

    #[test]
    fn test_partial_toml() {
        let config = Config::from_toml(
            r#"
            target_weeks = 10
            calc_rate = 100

            [payers]
            first = "A"

            [holidays]
            "2025-12-25" = "Krismas"
            "#,
        )
        .unwrap();
        assert_eq!(config.target_weeks, 10);
        assert_eq!(config.rates.calc, Amount::from(100));
        assert_eq!(config.rates.display, Amount::from(120));
        assert_eq!(config.payers.first, "A");
        assert_eq!(config.payers.second, "Mujib");
        assert_eq!(config.holidays.len(), 1);
        assert_eq!(config.storage_key, "aim_schedule_data_v1");
    }

    #[test]
    fn test_invalid() {
        let invalid = |raw: RawConfig| Config::try_from(raw).unwrap_err();

        assert!(matches!(
            invalid(RawConfig {
                target_weeks: 0,
                ..RawConfig::default()
            }),
            ConfigError::NonPositiveTarget
        ));
        assert!(matches!(
            invalid(RawConfig {
                start_date: "13.10.2025".to_owned(),
                ..RawConfig::default()
            }),
            ConfigError::StartDate(_, DateError::Format)
        ));
        assert!(matches!(
            invalid(RawConfig {
                holidays: [("2026-02-30".to_owned(), "x".to_owned())].into(),
                ..RawConfig::default()
            }),
            ConfigError::HolidayDate(_, DateError::Date)
        ));
        assert!(matches!(
            invalid(RawConfig {
                seed_paid: vec!["2025-12".to_owned()],
                ..RawConfig::default()
            }),
            ConfigError::SeedMonth(_, MonthKeyError::Month(12))
        ));
        assert!(matches!(
            invalid(RawConfig {
                storage_key: " ".to_owned(),
                ..RawConfig::default()
            }),
            ConfigError::EmptyStorageKey
        ));
        assert!(matches!(
            Config::from_toml("calc_rate = 1000000000000000000"),
            Err(ConfigError::RateTooLarge(1_000_000_000_000_000_000))
        ));
        assert!(matches!(
            invalid(RawConfig {
                display_rate: u64::MAX,
                target_weeks: 2,
                ..RawConfig::default()
            }),
            ConfigError::RateTooLarge(u64::MAX)
        ));
        assert!(matches!(
            Config::from_toml("target_weeks = \"many\""),
            Err(ConfigError::Toml(_))
        ));
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load(&dir.path().join("config.toml")).unwrap();
        assert_eq!(config.target_weeks, 50);
    }
}

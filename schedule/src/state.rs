//! Paid/unpaid status per month, persisted as one JSON object in a key-value
//! store.

use std::collections::{BTreeMap, HashMap};
use std::io::ErrorKind;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::MonthKey;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Storage unavailable: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to serialize payment state: {0}")]
    Serialize(#[from] serde_json::Error),
}

pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError>;
}

/// Keeps every key in a file of its own below `dir`.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", urlencoding::encode(key)))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        match fs_err::read_to_string(self.path(key)) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        fs_err::create_dir_all(&self.dir)?;
        let path = self.path(key);
        let tmp = path.with_extension("json.tmp");
        fs_err::write(&tmp, value)?;
        fs_err::rename(&tmp, &path)?;
        Ok(())
    }
}

#[derive(Debug, Clone, Default)]
pub struct MemoryStore(HashMap<String, String>);

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.0.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.0.insert(key.to_owned(), value.to_owned());
        Ok(())
    }
}

#[derive(Debug, Clone, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PaymentState(BTreeMap<MonthKey, bool>);

impl PaymentState {
    #[must_use]
    pub fn seeded(paid: &[MonthKey]) -> Self {
        Self(paid.iter().map(|key| (*key, true)).collect())
    }

    #[must_use]
    pub fn is_paid(&self, key: MonthKey) -> bool {
        self.0.get(&key).copied().unwrap_or_default()
    }

    pub fn set(&mut self, key: MonthKey, paid: bool) {
        self.0.insert(key, paid);
    }

    pub fn iter(&self) -> impl Iterator<Item = (MonthKey, bool)> + '_ {
        self.0.iter().map(|(key, paid)| (*key, *paid))
    }
}

pub struct PaymentStore<S> {
    store: S,
    key: String,
    seed: Vec<MonthKey>,
}

impl<S: KeyValueStore> PaymentStore<S> {
    pub fn new(store: S, key: impl Into<String>, seed: Vec<MonthKey>) -> Self {
        Self {
            store,
            key: key.into(),
            seed,
        }
    }

    pub fn from_config(store: S, config: &Config) -> Self {
        Self::new(store, config.storage_key.clone(), config.seed_paid.clone())
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    #[must_use]
    pub fn seed(&self) -> PaymentState {
        PaymentState::seeded(&self.seed)
    }

    /// Returns the persisted state. Without a readable stored state the seed
    /// is written back and returned instead.
    pub fn load(&mut self) -> Result<PaymentState, StoreError> {
        if let Some(state) = self.read()? {
            return Ok(state);
        }
        let seed = self.seed();
        self.write(&seed)?;
        Ok(seed)
    }

    /// Overwrites the paid flag of `month` and persists the whole state in a
    /// single write. Returns the state as persisted.
    pub fn save(&mut self, month: MonthKey, paid: bool) -> Result<PaymentState, StoreError> {
        let mut state = self.read()?.unwrap_or_else(|| self.seed());
        state.set(month, paid);
        self.write(&state)?;
        debug!(%month, paid, "saved payment state");
        Ok(state)
    }

    /// Replaces the persisted state with `state`.
    pub fn persist(&mut self, state: &PaymentState) -> Result<(), StoreError> {
        self.write(state)?;
        debug!(months = state.0.len(), "persisted payment state");
        Ok(())
    }

    /// `None` when nothing usable is stored.
    fn read(&self) -> Result<Option<PaymentState>, StoreError> {
        let Some(raw) = self.store.get(&self.key)? else {
            info!(key = %self.key, "no payment state stored yet, seeding");
            return Ok(None);
        };
        match serde_json::from_str(&raw) {
            Ok(state) => Ok(Some(state)),
            Err(e) => {
                warn!(key = %self.key, "discarding unreadable payment state: {e}");
                Ok(None)
            }
        }
    }

    fn write(&mut self, state: &PaymentState) -> Result<(), StoreError> {
        let raw = serde_json::to_string(state)?;
        self.store.set(&self.key, &raw)
    }
}

#[cfg(test)]
pub(crate) mod test {
    use crate::state::{
        FileStore, KeyValueStore, MemoryStore, PaymentState, PaymentStore, StoreError,
    };
    use crate::MonthKey;

    const KEY: &str = "aim_schedule_data_v1";

    /// Reads like a [`MemoryStore`] but refuses every write.
    #[derive(Default)]
    pub(crate) struct FullStore(pub MemoryStore);

    impl KeyValueStore for FullStore {
        fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
            self.0.get(key)
        }

        fn set(&mut self, _: &str, _: &str) -> Result<(), StoreError> {
            Err(std::io::Error::other("quota exceeded").into())
        }
    }

    /// Counts writes, failing the first `failures` of them.
    #[derive(Default)]
    pub(crate) struct FlakyStore {
        pub inner: MemoryStore,
        pub failures: usize,
        pub writes: usize,
    }

    impl FlakyStore {
        pub(crate) fn failing(failures: usize) -> Self {
            Self {
                failures,
                ..Self::default()
            }
        }
    }

    impl KeyValueStore for FlakyStore {
        fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
            self.inner.get(key)
        }

        fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
            self.writes += 1;
            if self.failures > 0 {
                self.failures -= 1;
                return Err(std::io::Error::other("disk busy").into());
            }
            self.inner.set(key, value)
        }
    }

    fn month(s: &str) -> MonthKey {
        s.parse().unwrap()
    }

    fn seed() -> Vec<MonthKey> {
        ["2025-9", "2025-10", "2025-11", "2026-0"]
            .into_iter()
            .map(month)
            .collect()
    }

    #[test]
    fn test_seed_on_empty_store() {
        let mut store = PaymentStore::new(MemoryStore::new(), KEY, seed());
        let state = store.load().unwrap();
        assert_eq!(state, PaymentState::seeded(&seed()));
        assert!(state.is_paid(month("2025-9")));
        assert!(!state.is_paid(month("2026-1")));
        assert_eq!(
            store.store().get(KEY).unwrap().as_deref(),
            Some(r#"{"2025-9":true,"2025-10":true,"2025-11":true,"2026-0":true}"#)
        );
    }

    #[test]
    fn test_load_is_idempotent() {
        let mut store = PaymentStore::new(MemoryStore::new(), KEY, seed());
        let first = store.load().unwrap();
        let second = store.load().unwrap();
        assert_eq!(first, second);

        store.save(month("2026-3"), true).unwrap();
        assert_eq!(store.load().unwrap(), store.load().unwrap());
    }

    #[test]
    fn test_save_round_trip() {
        let mut store = PaymentStore::new(MemoryStore::new(), KEY, seed());
        store.save(month("2026-4"), true).unwrap();
        assert!(store.load().unwrap().is_paid(month("2026-4")));

        store.save(month("2026-4"), false).unwrap();
        let state = store.load().unwrap();
        assert!(!state.is_paid(month("2026-4")));
        assert_eq!(
            state.iter().find(|(key, _)| *key == month("2026-4")),
            Some((month("2026-4"), false))
        );
        assert!(state.is_paid(month("2025-10")));
    }

    #[test]
    fn test_existing_state_is_kept() {
        let mut memory = MemoryStore::new();
        memory.set(KEY, r#"{"2025-9":false,"2026-5":true}"#).unwrap();
        let mut store = PaymentStore::new(memory, KEY, seed());
        let state = store.load().unwrap();
        assert!(!state.is_paid(month("2025-9")));
        assert!(state.is_paid(month("2026-5")));
        assert!(!state.is_paid(month("2025-10")));
    }

    #[test]
    fn test_unparseable_state_is_reseeded() {
        let mut memory = MemoryStore::new();
        memory.set(KEY, "{not json").unwrap();
        let mut store = PaymentStore::new(memory, KEY, seed());
        assert_eq!(store.load().unwrap(), PaymentState::seeded(&seed()));
        let raw = store.store().get(KEY).unwrap().unwrap();
        assert_eq!(
            serde_json::from_str::<PaymentState>(&raw).unwrap(),
            PaymentState::seeded(&seed())
        );
    }

    #[test]
    fn test_save_over_unparseable_state_writes_once() {
        let mut flaky = FlakyStore::default();
        flaky.inner.set(KEY, "{not json").unwrap();
        let mut store = PaymentStore::new(flaky, KEY, seed());
        let state = store.save(month("2026-1"), true).unwrap();
        assert_eq!(store.store().writes, 1);

        let mut expected = PaymentState::seeded(&seed());
        expected.set(month("2026-1"), true);
        assert_eq!(state, expected);
        assert_eq!(store.load().unwrap(), expected);
    }

    #[test]
    fn test_persist_replaces_state() {
        let mut store = PaymentStore::new(MemoryStore::new(), KEY, seed());
        store.save(month("2026-4"), true).unwrap();
        let mut state = PaymentState::default();
        state.set(month("2026-5"), true);
        store.persist(&state).unwrap();
        assert_eq!(store.load().unwrap(), state);
    }

    #[test]
    fn test_write_failure_propagates() {
        let mut store = PaymentStore::new(FullStore::default(), KEY, seed());
        assert!(matches!(store.load(), Err(StoreError::Io(_))));
        assert!(matches!(
            store.save(month("2026-1"), true),
            Err(StoreError::Io(_))
        ));
    }

    #[test]
    fn test_file_store() {
        let dir = tempfile::tempdir().unwrap();
        let mut files = FileStore::new(dir.path().join("state"));
        assert_eq!(files.get(KEY).unwrap(), None);
        files.set(KEY, "{}").unwrap();
        assert_eq!(files.get(KEY).unwrap().as_deref(), Some("{}"));
        files.set(KEY, r#"{"2025-9":true}"#).unwrap();
        assert_eq!(files.get(KEY).unwrap().as_deref(), Some(r#"{"2025-9":true}"#));
        assert_eq!(files.get("other").unwrap(), None);

        let mut store = PaymentStore::new(files, KEY, seed());
        store.save(month("2026-2"), true).unwrap();
        let reopened = PaymentStore::new(FileStore::new(dir.path().join("state")), KEY, seed())
            .load()
            .unwrap();
        assert!(reopened.is_paid(month("2026-2")));
        assert!(reopened.is_paid(month("2025-9")));
    }
}

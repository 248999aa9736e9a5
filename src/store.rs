use log::warn;
use rusqlite::{params, Connection, OptionalExtension};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use crate::error::Result;
use crate::ledger::{DailyEntry, DailyLedger};
use crate::setup::SetupParameters;

/// Key the single saved calculation lives under
pub const STORAGE_KEY: &str = "workHourCalculatorData";

/// Minimal string key-value storage, overwritten in place
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&mut self, key: &str, value: &str) -> Result<()>;
    fn remove(&mut self, key: &str) -> Result<()>;
}

/// SQLite-backed store with one `kv` table
#[derive(Debug)]
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Open (or create) the database file, creating parent directories as needed
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        Self::init(Connection::open(path)?)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self> {
        conn.execute(
            r#"
            CREATE TABLE IF NOT EXISTS kv (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                updated_at DATETIME DEFAULT CURRENT_TIMESTAMP
            )
            "#,
            [],
        )?;
        Ok(Self { conn })
    }
}

impl KeyValueStore for SqliteStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let value: Option<String> = self
            .conn
            .query_row("SELECT value FROM kv WHERE key = ?1", params![key], |row| {
                row.get(0)
            })
            .optional()?;
        Ok(value)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.conn.execute(
            r#"
            INSERT INTO kv (key, value, updated_at) VALUES (?1, ?2, CURRENT_TIMESTAMP)
            ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = CURRENT_TIMESTAMP
            "#,
            params![key, value],
        )?;
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        self.conn
            .execute("DELETE FROM kv WHERE key = ?1", params![key])?;
        Ok(())
    }
}

/// Volatile store for tests and throwaway sessions
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    values: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        self.values.remove(key);
        Ok(())
    }
}

/// Memory store whose writes can be switched to fail, like a full disk
#[cfg(test)]
#[derive(Debug, Default, Clone)]
pub(crate) struct FlakyStore {
    inner: MemoryStore,
    pub fail_writes: std::rc::Rc<std::cell::Cell<bool>>,
}

#[cfg(test)]
impl KeyValueStore for FlakyStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        self.inner.get(key)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        if self.fail_writes.get() {
            return Err(std::io::Error::new(std::io::ErrorKind::Other, "disk full").into());
        }
        self.inner.set(key, value)
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        self.inner.remove(key)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedEntry {
    pub hours: String,
    pub minutes: String,
}

/// On-disk shape of a calculation. Field names match the record written by
/// the browser version of the tracker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedRecord {
    pub total_days: String,
    pub total_hours: String,
    #[serde(default)]
    pub daily_inputs: BTreeMap<String, SavedEntry>,
}

impl SavedRecord {
    /// Snapshot the raw setup strings and every present entry
    pub fn capture(setup: &SetupParameters, ledger: &DailyLedger) -> Self {
        let daily_inputs = ledger
            .iter()
            .filter(|(_, entry)| entry.is_present())
            .map(|(day, entry)| {
                (
                    day.to_string(),
                    SavedEntry {
                        hours: entry.hours.clone(),
                        minutes: entry.minutes.clone(),
                    },
                )
            })
            .collect();

        Self {
            total_days: setup.raw_total_days().to_string(),
            total_hours: setup.raw_total_hours().to_string(),
            daily_inputs,
        }
    }

    /// Entries keyed by numeric day. Keys that are not day numbers are dropped.
    pub fn entries(&self) -> impl Iterator<Item = (u32, DailyEntry)> + '_ {
        self.daily_inputs.iter().filter_map(|(day, saved)| {
            let day = day.trim().parse::<u32>().ok()?;
            Some((day, DailyEntry::new(saved.hours.clone(), saved.minutes.clone())))
        })
    }
}

/// What is currently stored under the session key
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Stored {
    Absent,
    Unparsable,
    Record(SavedRecord),
}

/// Persists the single saved calculation as JSON text under [`STORAGE_KEY`]
#[derive(Debug)]
pub struct SessionStore<K: KeyValueStore> {
    kv: K,
}

impl<K: KeyValueStore> SessionStore<K> {
    pub fn new(kv: K) -> Self {
        Self { kv }
    }

    pub fn save(&mut self, setup: &SetupParameters, ledger: &DailyLedger) -> Result<()> {
        let record = SavedRecord::capture(setup, ledger);
        let text = serde_json::to_string(&record)?;
        self.kv.set(STORAGE_KEY, &text)
    }

    /// Read the record, distinguishing a missing key from unreadable JSON
    pub fn read(&self) -> Result<Stored> {
        let Some(text) = self.kv.get(STORAGE_KEY)? else {
            return Ok(Stored::Absent);
        };
        match serde_json::from_str::<SavedRecord>(&text) {
            Ok(record) => Ok(Stored::Record(record)),
            Err(err) => {
                warn!("event=load_record status=unparsable error={err}");
                Ok(Stored::Unparsable)
            }
        }
    }

    /// The parsed record, or `None` when absent or unparsable
    pub fn load(&self) -> Result<Option<SavedRecord>> {
        match self.read()? {
            Stored::Record(record) => Ok(Some(record)),
            Stored::Absent | Stored::Unparsable => Ok(None),
        }
    }

    pub fn delete(&mut self) -> Result<()> {
        self.kv.remove(STORAGE_KEY)
    }

    pub fn kv(&self) -> &K {
        &self.kv
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use tempfile::tempdir;

    fn sample() -> (SetupParameters, DailyLedger) {
        let setup = SetupParameters::parse("5", "40").unwrap();
        let mut ledger = DailyLedger::new();
        ledger.set(1, DailyEntry::new("9", ""));
        ledger.set(3, DailyEntry::new("0", "0"));
        (setup, ledger)
    }

    #[test]
    fn test_record_uses_browser_field_names() {
        let (setup, ledger) = sample();
        let record = SavedRecord::capture(&setup, &ledger);
        let json: serde_json::Value = serde_json::to_value(&record).unwrap();

        assert_eq!(json["totalDays"], "5");
        assert_eq!(json["totalHours"], "40");
        assert_eq!(json["dailyInputs"]["1"]["hours"], "9");
        assert_eq!(json["dailyInputs"]["1"]["minutes"], "");
        assert_eq!(json["dailyInputs"]["3"]["hours"], "0");
        assert!(json["dailyInputs"].get("2").is_none());
    }

    #[test]
    fn test_save_then_load_reproduces_strings() {
        let (setup, ledger) = sample();
        let mut store = SessionStore::new(MemoryStore::new());
        store.save(&setup, &ledger).unwrap();

        let record = store.load().unwrap().unwrap();
        assert_eq!(record.total_days, "5");
        assert_eq!(record.total_hours, "40");

        let entries: Vec<(u32, DailyEntry)> = record.entries().collect();
        assert_eq!(
            entries,
            vec![(1, DailyEntry::new("9", "")), (3, DailyEntry::new("0", "0"))]
        );
    }

    #[test]
    fn test_save_overwrites_previous_record() {
        let (setup, mut ledger) = sample();
        let mut store = SessionStore::new(MemoryStore::new());
        store.save(&setup, &ledger).unwrap();

        ledger.set(1, DailyEntry::default());
        store.save(&setup, &ledger).unwrap();

        let record = store.load().unwrap().unwrap();
        assert!(!record.daily_inputs.contains_key("1"));
        assert_eq!(record.daily_inputs.len(), 1);
    }

    #[test]
    fn test_missing_daily_inputs_defaults_to_empty() {
        let mut kv = MemoryStore::new();
        kv.set(STORAGE_KEY, r#"{"totalDays":"3","totalHours":"24"}"#)
            .unwrap();
        let store = SessionStore::new(kv);

        let record = store.load().unwrap().unwrap();
        assert!(record.daily_inputs.is_empty());
    }

    #[test]
    fn test_unparsable_record_reads_as_unparsable() {
        let mut kv = MemoryStore::new();
        kv.set(STORAGE_KEY, "{not json").unwrap();
        let store = SessionStore::new(kv);

        assert_matches!(store.read(), Ok(Stored::Unparsable));
        assert_matches!(store.load(), Ok(None));
    }

    #[test]
    fn test_absent_record() {
        let store = SessionStore::new(MemoryStore::new());
        assert_matches!(store.read(), Ok(Stored::Absent));
    }

    #[test]
    fn test_delete_removes_record() {
        let (setup, ledger) = sample();
        let mut store = SessionStore::new(MemoryStore::new());
        store.save(&setup, &ledger).unwrap();
        store.delete().unwrap();
        assert_matches!(store.read(), Ok(Stored::Absent));
    }

    #[test]
    fn test_non_numeric_day_keys_are_skipped() {
        let mut kv = MemoryStore::new();
        kv.set(
            STORAGE_KEY,
            r#"{"totalDays":"3","totalHours":"24","dailyInputs":{"x":{"hours":"1","minutes":""},"2":{"hours":"4","minutes":"30"}}}"#,
        )
        .unwrap();
        let store = SessionStore::new(kv);

        let record = store.load().unwrap().unwrap();
        let entries: Vec<(u32, DailyEntry)> = record.entries().collect();
        assert_eq!(entries, vec![(2, DailyEntry::new("4", "30"))]);
    }

    #[test]
    fn test_sqlite_store_roundtrip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("state.db");

        {
            let mut kv = SqliteStore::open(&path).unwrap();
            kv.set("a", "1").unwrap();
            kv.set("a", "2").unwrap();
        }

        let mut kv = SqliteStore::open(&path).unwrap();
        assert_eq!(kv.get("a").unwrap(), Some("2".to_string()));
        kv.remove("a").unwrap();
        assert_eq!(kv.get("a").unwrap(), None);
    }

    #[test]
    fn test_sqlite_session_store() {
        let (setup, ledger) = sample();
        let mut store = SessionStore::new(SqliteStore::open_in_memory().unwrap());
        store.save(&setup, &ledger).unwrap();

        let record = store.load().unwrap().unwrap();
        assert_eq!(record, SavedRecord::capture(&setup, &ledger));
    }
}

// src/record_store.rs
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::time_utils::month_string;

// --- Stored document ---

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayRecord {
    pub day: String,
    #[serde(rename = "monthString")]
    pub month_string: String,
    pub punches: Vec<String>,
}

impl DayRecord {
    pub fn new(day: &str, first_punch: &str) -> Self {
        Self {
            day: day.to_string(),
            month_string: month_string(day),
            punches: vec![first_punch.to_string()],
        }
    }
}

// --- Errors ---

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("File I/O error: {context}")]
    Io {
        #[source]
        source: std::io::Error,
        context: String,
    },

    #[error("JSON serialization/deserialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Record for day {0} already exists")]
    AlreadyExists(String),

    #[error("No record for day {0}")]
    NotFound(String),

    #[error("Record for day {day} holds {found} punches, expected {expected}")]
    StaleRecord {
        day: String,
        expected: usize,
        found: usize,
    },

    #[error("Record store is disconnected")]
    Disconnected,
}

fn io_context<S: Into<String>>(source: std::io::Error, context: S) -> StoreError {
    StoreError::Io {
        source,
        context: context.into(),
    }
}

// --- Store seam ---

/// Keyed document store for day records. One handle is created at startup and
/// shared (as `Arc<dyn RecordStore>`) by the recorder and the report builder.
#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn find_by_day(&self, day: &str) -> Result<Option<DayRecord>, StoreError>;

    /// All records of a `YYYY-MM` month, ascending by day.
    async fn find_by_month(&self, month: &str) -> Result<Vec<DayRecord>, StoreError>;

    /// Fails with [`StoreError::AlreadyExists`] when the day is already stored.
    async fn insert(&self, record: DayRecord) -> Result<(), StoreError>;

    /// Appends `punch` only if the stored record still has `expected_len`
    /// punches, otherwise fails with [`StoreError::StaleRecord`].
    async fn append_punch(
        &self,
        day: &str,
        expected_len: usize,
        punch: &str,
    ) -> Result<DayRecord, StoreError>;

    async fn disconnect(&self) -> Result<(), StoreError>;
}

// --- Shared in-memory table ---

#[derive(Debug)]
struct RecordTable {
    records: BTreeMap<String, DayRecord>,
    connected: bool,
}

impl RecordTable {
    fn new(records: BTreeMap<String, DayRecord>) -> Self {
        Self {
            records,
            connected: true,
        }
    }

    fn ensure_connected(&self) -> Result<(), StoreError> {
        if self.connected {
            Ok(())
        } else {
            Err(StoreError::Disconnected)
        }
    }

    fn find_by_day(&self, day: &str) -> Result<Option<DayRecord>, StoreError> {
        self.ensure_connected()?;
        Ok(self.records.get(day).cloned())
    }

    fn find_by_month(&self, month: &str) -> Result<Vec<DayRecord>, StoreError> {
        self.ensure_connected()?;
        Ok(self
            .records
            .values()
            .filter(|record| record.month_string == month)
            .cloned()
            .collect())
    }

    fn insert(&mut self, record: DayRecord) -> Result<(), StoreError> {
        self.ensure_connected()?;
        if self.records.contains_key(&record.day) {
            return Err(StoreError::AlreadyExists(record.day));
        }
        self.records.insert(record.day.clone(), record);
        Ok(())
    }

    fn append_punch(
        &mut self,
        day: &str,
        expected_len: usize,
        punch: &str,
    ) -> Result<DayRecord, StoreError> {
        self.ensure_connected()?;
        let record = self
            .records
            .get_mut(day)
            .ok_or_else(|| StoreError::NotFound(day.to_string()))?;
        if record.punches.len() != expected_len {
            return Err(StoreError::StaleRecord {
                day: day.to_string(),
                expected: expected_len,
                found: record.punches.len(),
            });
        }
        record.punches.push(punch.to_string());
        Ok(record.clone())
    }

    fn remove(&mut self, day: &str) {
        self.records.remove(day);
    }

    fn pop_punch(&mut self, day: &str) {
        if let Some(record) = self.records.get_mut(day) {
            record.punches.pop();
        }
    }
}

// --- In-memory store ---

/// Process-local store, used when no `DB_PATH` is configured and in tests.
pub struct MemoryRecordStore {
    table: Mutex<RecordTable>,
}

impl MemoryRecordStore {
    pub fn new() -> Self {
        Self {
            table: Mutex::new(RecordTable::new(BTreeMap::new())),
        }
    }
}

impl Default for MemoryRecordStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RecordStore for MemoryRecordStore {
    async fn find_by_day(&self, day: &str) -> Result<Option<DayRecord>, StoreError> {
        self.table.lock().await.find_by_day(day)
    }

    async fn find_by_month(&self, month: &str) -> Result<Vec<DayRecord>, StoreError> {
        self.table.lock().await.find_by_month(month)
    }

    async fn insert(&self, record: DayRecord) -> Result<(), StoreError> {
        self.table.lock().await.insert(record)
    }

    async fn append_punch(
        &self,
        day: &str,
        expected_len: usize,
        punch: &str,
    ) -> Result<DayRecord, StoreError> {
        self.table.lock().await.append_punch(day, expected_len, punch)
    }

    async fn disconnect(&self) -> Result<(), StoreError> {
        self.table.lock().await.connected = false;
        Ok(())
    }
}

// --- JSON document file store ---

/// Keeps every record in memory and rewrites the whole document file after
/// each successful mutation. A mutation whose write fails is rolled back.
pub struct JsonFileRecordStore {
    path: PathBuf,
    table: Mutex<RecordTable>,
}

impl JsonFileRecordStore {
    /// Opens the document file at `path`. A missing file yields an empty store.
    pub fn connect(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let records = Self::load_records(&path)?;
        info!(
            "Record store connected: {} ({} day records)",
            path.display(),
            records.len()
        );
        Ok(Self {
            path,
            table: Mutex::new(RecordTable::new(records)),
        })
    }

    fn load_records(path: &Path) -> Result<BTreeMap<String, DayRecord>, StoreError> {
        if !path.exists() {
            return Ok(BTreeMap::new());
        }

        let json_string = fs::read_to_string(path)
            .map_err(|e| io_context(e, format!("Failed to read record file: {:?}", path)))?;
        if json_string.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        let records: Vec<DayRecord> = serde_json::from_str(&json_string)?;

        Ok(records
            .into_iter()
            .map(|record| (record.day.clone(), record))
            .collect())
    }

    fn persist(&self, table: &RecordTable) -> Result<(), StoreError> {
        let documents: Vec<&DayRecord> = table.records.values().collect();
        let json_string = serde_json::to_string_pretty(&documents)?;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| {
                    io_context(
                        e,
                        format!("Failed to create directory for record file: {:?}", parent),
                    )
                })?;
            }
        }

        // Write next to the target and rename so readers never see a partial file.
        let tmp_path = self.path.with_extension("json.tmp");
        let mut file = File::create(&tmp_path)
            .map_err(|e| io_context(e, format!("Failed to create record file: {:?}", tmp_path)))?;
        file.write_all(json_string.as_bytes()).map_err(|e| {
            io_context(e, format!("Failed to write record file: {:?}", tmp_path))
        })?;
        file.sync_all()
            .map_err(|e| io_context(e, format!("Failed to sync record file: {:?}", tmp_path)))?;
        fs::rename(&tmp_path, &self.path).map_err(|e| {
            io_context(
                e,
                format!("Failed to move {:?} into place at {:?}", tmp_path, self.path),
            )
        })?;

        debug!(
            "Persisted {} day records to {}",
            table.records.len(),
            self.path.display()
        );
        Ok(())
    }
}

#[async_trait]
impl RecordStore for JsonFileRecordStore {
    async fn find_by_day(&self, day: &str) -> Result<Option<DayRecord>, StoreError> {
        self.table.lock().await.find_by_day(day)
    }

    async fn find_by_month(&self, month: &str) -> Result<Vec<DayRecord>, StoreError> {
        self.table.lock().await.find_by_month(month)
    }

    async fn insert(&self, record: DayRecord) -> Result<(), StoreError> {
        let mut table = self.table.lock().await;
        let day = record.day.clone();
        table.insert(record)?;
        if let Err(e) = self.persist(&table) {
            table.remove(&day);
            return Err(e);
        }
        Ok(())
    }

    async fn append_punch(
        &self,
        day: &str,
        expected_len: usize,
        punch: &str,
    ) -> Result<DayRecord, StoreError> {
        let mut table = self.table.lock().await;
        let updated = table.append_punch(day, expected_len, punch)?;
        if let Err(e) = self.persist(&table) {
            table.pop_punch(day);
            return Err(e);
        }
        Ok(updated)
    }

    async fn disconnect(&self) -> Result<(), StoreError> {
        let mut table = self.table.lock().await;
        if !table.connected {
            return Ok(());
        }
        self.persist(&table)?;
        table.connected = false;
        info!("Record store disconnected: {}", self.path.display());
        Ok(())
    }
}

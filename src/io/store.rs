use std::fmt::Display;
use std::fs;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

use log::{debug, error, info, warn};
use serde::{Deserialize, Serialize};

use crate::io::atomic::atomic_write;
use crate::model::config::AppConfig;
use crate::model::entity::{Entity, RecordId, ValidationErrors};

/// Error type for store mutations
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("invalid record: {0}")]
    Validation(ValidationErrors),
    #[error("already taken: {}", .0.join(", "))]
    Duplicate(Vec<String>),
    #[error("record not found: {0}")]
    NotFound(RecordId),
    #[error("no identifiers left after {0}")]
    IdsExhausted(RecordId),
    #[error("could not write {path}: {source}")]
    WriteError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not serialize {path}: {source}")]
    SerializeError {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// On-disk collection document: `{"data": [...]}`
#[derive(Deserialize)]
struct Collection<T> {
    #[serde(default = "Vec::new")]
    data: Vec<T>,
}

#[derive(Serialize)]
struct CollectionRef<'a, T> {
    data: &'a [T],
}

/// A collection of `T` kept in one JSON document.
///
/// Every call reads the document afresh and every mutation rewrites it
/// whole. There is no locking: one store owns its path, and calls are
/// expected to come from a single thread.
pub struct RecordStore<T: Entity> {
    path: PathBuf,
    config: AppConfig,
    _entity: PhantomData<fn() -> T>,
}

impl<T: Entity> RecordStore<T> {
    pub fn new(path: impl Into<PathBuf>, config: &AppConfig) -> Self {
        RecordStore {
            path: path.into(),
            config: config.clone(),
            _entity: PhantomData,
        }
    }

    /// Store at `<dir>/<collection>.json`
    pub fn in_dir(dir: &Path, config: &AppConfig) -> Self {
        Self::new(dir.join(format!("{}.json", T::COLLECTION)), config)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load every record.
    ///
    /// A missing document is an empty collection. An unreadable or
    /// unparsable document is logged, copied aside as `<file>.bak`, and
    /// also read as empty.
    pub fn read_all(&self) -> Vec<T> {
        if !self.path.exists() {
            return Vec::new();
        }
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) => {
                self.back_up("read", &e);
                return Vec::new();
            }
        };
        match serde_json::from_slice::<Collection<T>>(&bytes) {
            Ok(doc) => doc.data,
            Err(e) => {
                self.back_up("parse", &e);
                Vec::new()
            }
        }
    }

    /// Copy the current document to `<file>.bak` before it is treated as empty.
    fn back_up(&self, action: &str, cause: &dyn Display) {
        let bak = backup_path(&self.path);
        match fs::copy(&self.path, &bak) {
            Ok(_) => warn!(
                "could not {} {} (backed up as {}): {}",
                action,
                self.path.display(),
                bak.display(),
                cause
            ),
            Err(copy_err) => warn!(
                "could not {} {}: {} (backup failed: {})",
                action,
                self.path.display(),
                cause,
                copy_err
            ),
        }
    }

    /// Replace the document with `records`.
    pub fn write_all(&self, records: &[T]) -> Result<(), StoreError> {
        let content = serde_json::to_string_pretty(&CollectionRef { data: records }).map_err(|e| {
            error!("could not serialize {}: {}", self.path.display(), e);
            StoreError::SerializeError {
                path: self.path.clone(),
                source: e,
            }
        })?;
        atomic_write(&self.path, content.as_bytes()).map_err(|e| {
            error!("could not write {}: {}", self.path.display(), e);
            StoreError::WriteError {
                path: self.path.clone(),
                source: e,
            }
        })?;
        debug!("wrote {} record(s) to {}", records.len(), self.path.display());
        Ok(())
    }

    /// The identifier the next successful `add` will assign, or `None` once
    /// the largest identifier is in use.
    pub fn next_id(&self) -> Option<RecordId> {
        next_id(&self.read_all())
    }

    /// Validate, check uniqueness, assign the next identifier, and persist.
    /// Returns the stored record.
    pub fn add(&self, mut record: T) -> Result<T, StoreError> {
        self.check_valid(&record)?;
        let mut records = self.read_all();
        let taken = taken_fields(&record, &records, None);
        if !taken.is_empty() {
            return Err(StoreError::Duplicate(taken));
        }
        let Some(id) = next_id(&records) else {
            return Err(StoreError::IdsExhausted(RecordId::MAX));
        };
        record.set_id(id);
        records.push(record.clone());
        self.write_all(&records)?;
        info!("added {} #{}", T::COLLECTION, id);
        Ok(record)
    }

    /// Replace the stored record with the same identifier.
    ///
    /// Uniqueness is checked against every other record, so re-saving a
    /// record with its unique fields unchanged succeeds.
    pub fn update(&self, record: &T) -> Result<(), StoreError> {
        self.check_valid(record)?;
        let mut records = self.read_all();
        let id = record.id();
        let Some(pos) = records.iter().position(|r| r.id() == id) else {
            return Err(StoreError::NotFound(id));
        };
        let taken = taken_fields(record, &records, Some(id));
        if !taken.is_empty() {
            return Err(StoreError::Duplicate(taken));
        }
        records[pos] = record.clone();
        self.write_all(&records)?;
        info!("updated {} #{}", T::COLLECTION, id);
        Ok(())
    }

    /// Remove the record with `id`. Returns `false`, without writing, when
    /// there is no such record.
    pub fn delete(&self, id: RecordId) -> Result<bool, StoreError> {
        let mut records = self.read_all();
        let Some(pos) = records.iter().position(|r| r.id() == id) else {
            debug!("delete {} #{}: no such record", T::COLLECTION, id);
            return Ok(false);
        };
        records.remove(pos);
        self.write_all(&records)?;
        info!("deleted {} #{}", T::COLLECTION, id);
        Ok(true)
    }

    /// Apply `change` to every record matching `pred` and persist them in a
    /// single write. Every changed record passes the same gate as `update`;
    /// if any fails, nothing is written. Returns how many records changed.
    pub fn update_matching(
        &self,
        pred: impl Fn(&T) -> bool,
        change: impl Fn(&mut T),
    ) -> Result<usize, StoreError> {
        let mut records = self.read_all();
        let mut changed = Vec::new();
        for (pos, record) in records.iter_mut().enumerate() {
            if pred(record) {
                change(record);
                changed.push(pos);
            }
        }
        if changed.is_empty() {
            return Ok(0);
        }
        for &pos in &changed {
            let record = &records[pos];
            self.check_valid(record)?;
            let taken = taken_fields(record, &records, Some(record.id()));
            if !taken.is_empty() {
                return Err(StoreError::Duplicate(taken));
            }
        }
        self.write_all(&records)?;
        info!("updated {} {} record(s)", changed.len(), T::COLLECTION);
        Ok(changed.len())
    }

    pub fn get_by_id(&self, id: RecordId) -> Option<T> {
        self.read_all().into_iter().find(|r| r.id() == id)
    }

    /// Records matching `pred`, in document order.
    pub fn find(&self, pred: impl Fn(&T) -> bool) -> Vec<T> {
        self.read_all().into_iter().filter(|r| pred(r)).collect()
    }

    /// Whether some persisted record already holds `value` in the unique
    /// field `field`, comparing rendered strings. Fields that are not
    /// declared unique never report a duplicate.
    pub fn is_duplicate(&self, field: &str, value: &dyn Display) -> bool {
        let Some(key) = T::unique_key(field) else {
            debug!("{} has no unique field {:?}", T::COLLECTION, field);
            return false;
        };
        let needle = value.to_string();
        self.read_all()
            .iter()
            .any(|r| (key.value)(r).as_deref() == Some(needle.as_str()))
    }

    fn check_valid(&self, record: &T) -> Result<(), StoreError> {
        let violations = record.validate(&self.config.validation_context());
        if violations.is_empty() {
            Ok(())
        } else {
            debug!(
                "rejected {} record: {} violation(s)",
                T::COLLECTION,
                violations.len()
            );
            Err(StoreError::Validation(ValidationErrors(violations)))
        }
    }
}

/// Max identifier + 1, or 0 for an empty collection. `None` on overflow.
fn next_id<T: Entity>(records: &[T]) -> Option<RecordId> {
    match records.iter().map(|r| r.id()).max() {
        Some(max) => max.checked_add(1),
        None => Some(0),
    }
}

/// Unique fields of `record` whose value another record already holds.
fn taken_fields<T: Entity>(record: &T, existing: &[T], exclude: Option<RecordId>) -> Vec<String> {
    T::UNIQUE_KEYS
        .iter()
        .filter(|key| {
            let Some(value) = (key.value)(record) else {
                return false;
            };
            existing
                .iter()
                .filter(|r| Some(r.id()) != exclude)
                .any(|r| (key.value)(r).as_deref() == Some(value.as_str()))
        })
        .map(|key| key.field.to_string())
        .collect()
}

fn backup_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".bak");
    path.with_file_name(name)
}

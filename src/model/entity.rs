use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use serde::de::DeserializeOwned;

/// Identifier assigned by a `RecordStore` to each record of a collection.
pub type RecordId = u32;

/// One failed field constraint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Violation {
    pub field: String,
    pub message: String,
}

impl Violation {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Violation {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Every violation reported for a single record, in declaration order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors(pub Vec<Violation>);

impl ValidationErrors {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Violation> {
        self.0.iter()
    }

    /// Names of the fields that failed, in order, without repeats.
    pub fn fields(&self) -> Vec<&str> {
        let mut out: Vec<&str> = Vec::new();
        for v in &self.0 {
            if !out.contains(&v.field.as_str()) {
                out.push(&v.field);
            }
        }
        out
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.0.iter().map(|v| v.to_string()).collect();
        write!(f, "{}", parts.join("; "))
    }
}

/// A field whose rendered value must differ across all records of a collection.
///
/// `value` returns the canonical string form of the field, or `None` when the
/// field is empty. Empty values never collide.
pub struct UniqueKey<T> {
    pub field: &'static str,
    pub value: fn(&T) -> Option<String>,
}

/// Inputs that field rules need besides the record itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidationContext {
    pub now: DateTime<Utc>,
    pub min_age_years: u32,
}

impl ValidationContext {
    pub fn new(now: DateTime<Utc>, min_age_years: u32) -> Self {
        ValidationContext { now, min_age_years }
    }

    pub fn today(&self) -> NaiveDate {
        self.now.date_naive()
    }
}

/// A record type that a `RecordStore` can persist.
pub trait Entity: Serialize + DeserializeOwned + Clone + 'static {
    /// File stem of the collection document (`users` → `users.json`).
    const COLLECTION: &'static str;

    /// Fields whose values must be unique within the collection.
    const UNIQUE_KEYS: &'static [UniqueKey<Self>] = &[];

    fn id(&self) -> RecordId;

    fn set_id(&mut self, id: RecordId);

    /// Check every field constraint. An empty list means the record is valid.
    fn validate(&self, _ctx: &ValidationContext) -> Vec<Violation> {
        Vec::new()
    }

    /// Look up a declared unique key by field name.
    fn unique_key(field: &str) -> Option<&'static UniqueKey<Self>> {
        Self::UNIQUE_KEYS.iter().find(|k| k.field == field)
    }
}

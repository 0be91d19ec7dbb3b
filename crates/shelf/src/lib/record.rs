use serde_json::{Map, Value};
use thiserror::Error;
use tracing::trace;

use crate::entry::{Entry, EntryKey, FieldKind};

/// An entry as stored in the document store: a JSON object keyed by
/// [`EntryKey`] strings, possibly carrying other attributes as well.
pub type Record = Map<String, Value>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecordError {
    #[error("malformed record: `{key}` must be a {expected}, found {found}")]
    MalformedRecord {
        key: EntryKey,
        expected: FieldKind,
        found: &'static str,
    },
    #[error("malformed record: expected a JSON object, found {found}")]
    NotAnObject { found: &'static str },
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

impl Entry {
    /// Builds an entry from a store record.
    ///
    /// Missing keys keep their defaults and unknown keys are ignored. Text
    /// fields only accept strings and flags only accept booleans, so a present
    /// `null` is malformed.
    pub fn from_record(record: &Record) -> Result<Self, RecordError> {
        let mut entry = Entry::default();

        for key in EntryKey::ALL {
            let Some(value) = record.get(key.as_str()) else {
                continue;
            };
            let malformed = || RecordError::MalformedRecord {
                key,
                expected: key.kind(),
                found: json_kind(value),
            };

            match key.kind() {
                FieldKind::Text => {
                    let text = value.as_str().ok_or_else(malformed)?;
                    if let Some(slot) = entry.text_mut(key) {
                        text.clone_into(slot);
                    }
                }
                FieldKind::Flag => {
                    let flag = value.as_bool().ok_or_else(malformed)?;
                    if let Some(slot) = entry.flag_mut(key) {
                        *slot = flag;
                    }
                }
            }
        }

        let ignored = record
            .keys()
            .filter(|name| EntryKey::parse(name).is_none())
            .count();
        trace!(id = %entry.id, ignored, "decoded record");

        Ok(entry)
    }

    /// Canonical record: every external key, in [`EntryKey::ALL`] order.
    pub fn to_record(&self) -> Record {
        EntryKey::ALL
            .into_iter()
            .map(|key| (key.as_str().to_owned(), Value::from(self.get(key))))
            .collect()
    }
}

impl TryFrom<Record> for Entry {
    type Error = RecordError;

    fn try_from(record: Record) -> Result<Self, Self::Error> {
        Entry::from_record(&record)
    }
}

impl TryFrom<&Value> for Entry {
    type Error = RecordError;

    fn try_from(value: &Value) -> Result<Self, Self::Error> {
        match value {
            Value::Object(record) => Entry::from_record(record),
            other => Err(RecordError::NotAnObject {
                found: json_kind(other),
            }),
        }
    }
}

impl From<&Entry> for Record {
    fn from(entry: &Entry) -> Self {
        entry.to_record()
    }
}

impl From<&Entry> for Value {
    fn from(entry: &Entry) -> Self {
        Value::Object(entry.to_record())
    }
}

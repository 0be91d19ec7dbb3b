pub mod entry;
pub mod jsonl;
pub mod record;

pub use entry::{Entry, EntryKey, FieldKind, FieldValue};
pub use record::{Record, RecordError};

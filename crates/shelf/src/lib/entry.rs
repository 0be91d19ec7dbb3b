use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::record::Record;

/// One catalogued content item: an article, bookmark or crawled document.
///
/// Absent fields default to an empty string or `false`. Serializing always
/// yields every external key in [`EntryKey::ALL`] order; deserializing goes
/// through [`Entry::from_record`], so both paths apply the same coercion rules.
#[cfg_attr(test, derive(proptest_derive::Arbitrary))]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Record")]
pub struct Entry {
    #[serde(rename = "_id")]
    pub id: String,
    pub file_type: String,
    pub readlater: bool,
    pub crawler: bool,
    pub starred: bool,
    pub disabled: bool,
    pub saved: bool,
    pub unread: bool,
    pub extract: bool,
    pub language: String,
    pub url: String,
    pub pure_content: String,
    pub title: String,
}

impl Entry {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    pub fn get(&self, key: EntryKey) -> FieldValue<'_> {
        match key {
            EntryKey::Id => FieldValue::Text(&self.id),
            EntryKey::FileType => FieldValue::Text(&self.file_type),
            EntryKey::ReadLater => FieldValue::Flag(self.readlater),
            EntryKey::Crawler => FieldValue::Flag(self.crawler),
            EntryKey::Starred => FieldValue::Flag(self.starred),
            EntryKey::Disabled => FieldValue::Flag(self.disabled),
            EntryKey::Saved => FieldValue::Flag(self.saved),
            EntryKey::Unread => FieldValue::Flag(self.unread),
            EntryKey::Extract => FieldValue::Flag(self.extract),
            EntryKey::Language => FieldValue::Text(&self.language),
            EntryKey::Url => FieldValue::Text(&self.url),
            EntryKey::PureContent => FieldValue::Text(&self.pure_content),
            EntryKey::Title => FieldValue::Text(&self.title),
        }
    }

    pub(crate) fn text_mut(&mut self, key: EntryKey) -> Option<&mut String> {
        match key {
            EntryKey::Id => Some(&mut self.id),
            EntryKey::FileType => Some(&mut self.file_type),
            EntryKey::Language => Some(&mut self.language),
            EntryKey::Url => Some(&mut self.url),
            EntryKey::PureContent => Some(&mut self.pure_content),
            EntryKey::Title => Some(&mut self.title),
            _ => None,
        }
    }

    pub(crate) fn flag_mut(&mut self, key: EntryKey) -> Option<&mut bool> {
        match key {
            EntryKey::ReadLater => Some(&mut self.readlater),
            EntryKey::Crawler => Some(&mut self.crawler),
            EntryKey::Starred => Some(&mut self.starred),
            EntryKey::Disabled => Some(&mut self.disabled),
            EntryKey::Saved => Some(&mut self.saved),
            EntryKey::Unread => Some(&mut self.unread),
            EntryKey::Extract => Some(&mut self.extract),
            _ => None,
        }
    }
}

/// External key of an [`Entry`] attribute in the document store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryKey {
    Id,
    FileType,
    ReadLater,
    Crawler,
    Starred,
    Disabled,
    Saved,
    Unread,
    Extract,
    Language,
    Url,
    PureContent,
    Title,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Flag,
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldKind::Text => f.write_str("string"),
            FieldKind::Flag => f.write_str("boolean"),
        }
    }
}

impl EntryKey {
    /// Canonical order, matching the field order of [`Entry`].
    pub const ALL: [EntryKey; 13] = [
        EntryKey::Id,
        EntryKey::FileType,
        EntryKey::ReadLater,
        EntryKey::Crawler,
        EntryKey::Starred,
        EntryKey::Disabled,
        EntryKey::Saved,
        EntryKey::Unread,
        EntryKey::Extract,
        EntryKey::Language,
        EntryKey::Url,
        EntryKey::PureContent,
        EntryKey::Title,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EntryKey::Id => "_id",
            EntryKey::FileType => "file_type",
            EntryKey::ReadLater => "readlater",
            EntryKey::Crawler => "crawler",
            EntryKey::Starred => "starred",
            EntryKey::Disabled => "disabled",
            EntryKey::Saved => "saved",
            EntryKey::Unread => "unread",
            EntryKey::Extract => "extract",
            EntryKey::Language => "language",
            EntryKey::Url => "url",
            EntryKey::PureContent => "pure_content",
            EntryKey::Title => "title",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        EntryKey::ALL.into_iter().find(|key| key.as_str() == s)
    }

    pub fn kind(&self) -> FieldKind {
        match self {
            EntryKey::ReadLater
            | EntryKey::Crawler
            | EntryKey::Starred
            | EntryKey::Disabled
            | EntryKey::Saved
            | EntryKey::Unread
            | EntryKey::Extract => FieldKind::Flag,
            _ => FieldKind::Text,
        }
    }

    pub fn names() -> impl Iterator<Item = &'static str> {
        EntryKey::ALL.into_iter().map(|key| key.as_str())
    }
}

impl fmt::Display for EntryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown entry key: {0}")]
pub struct UnknownKey(pub String);

impl FromStr for EntryKey {
    type Err = UnknownKey;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EntryKey::parse(s).ok_or_else(|| UnknownKey(s.to_owned()))
    }
}

/// Borrowed view of a single [`Entry`] attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldValue<'a> {
    Text(&'a str),
    Flag(bool),
}

impl FieldValue<'_> {
    pub fn kind(&self) -> FieldKind {
        match self {
            FieldValue::Text(_) => FieldKind::Text,
            FieldValue::Flag(_) => FieldKind::Flag,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            FieldValue::Flag(_) => None,
        }
    }

    pub fn as_flag(&self) -> Option<bool> {
        match self {
            FieldValue::Flag(b) => Some(*b),
            FieldValue::Text(_) => None,
        }
    }
}

impl From<FieldValue<'_>> for Value {
    fn from(value: FieldValue<'_>) -> Self {
        match value {
            FieldValue::Text(s) => Value::String(s.to_owned()),
            FieldValue::Flag(b) => Value::Bool(b),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn keys_are_distinct_and_parse_back() {
        let names: HashSet<_> = EntryKey::names().collect();
        assert_eq!(names.len(), EntryKey::ALL.len());

        for key in EntryKey::ALL {
            assert_eq!(EntryKey::parse(key.as_str()), Some(key));
            assert_eq!(key.to_string().parse::<EntryKey>(), Ok(key));
        }
    }

    #[test]
    fn key_strings_match_store_schema() {
        let names: Vec<_> = EntryKey::names().collect();
        assert_eq!(
            names,
            [
                "_id",
                "file_type",
                "readlater",
                "crawler",
                "starred",
                "disabled",
                "saved",
                "unread",
                "extract",
                "language",
                "url",
                "pure_content",
                "title",
            ]
        );
    }

    #[test]
    fn unknown_key_is_rejected() {
        assert_eq!(EntryKey::parse("id"), None);
        assert_eq!(
            "Title".parse::<EntryKey>(),
            Err(UnknownKey("Title".to_owned()))
        );
    }

    #[test]
    fn seven_flags_and_six_text_fields() {
        let flags = EntryKey::ALL
            .iter()
            .filter(|key| key.kind() == FieldKind::Flag)
            .count();
        assert_eq!(flags, 7);
        assert_eq!(EntryKey::ALL.len() - flags, 6);
    }

    #[test]
    fn get_reads_each_attribute_by_key() {
        let entry = Entry {
            id: "abc123".into(),
            starred: true,
            title: "Hello".into(),
            ..Entry::default()
        };

        assert_eq!(entry.get(EntryKey::Id), FieldValue::Text("abc123"));
        assert_eq!(entry.get(EntryKey::Starred).as_flag(), Some(true));
        assert_eq!(entry.get(EntryKey::Unread).as_flag(), Some(false));
        assert_eq!(entry.get(EntryKey::Title).as_text(), Some("Hello"));
        for key in EntryKey::ALL {
            assert_eq!(entry.get(key).kind(), key.kind(), "{key}");
        }
    }

    #[test]
    fn mutable_accessors_follow_kind() {
        let mut entry = Entry::new("x");
        for key in EntryKey::ALL {
            match key.kind() {
                FieldKind::Text => {
                    assert!(entry.text_mut(key).is_some());
                    assert!(entry.flag_mut(key).is_none());
                }
                FieldKind::Flag => {
                    assert!(entry.flag_mut(key).is_some());
                    assert!(entry.text_mut(key).is_none());
                }
            }
        }
    }
}

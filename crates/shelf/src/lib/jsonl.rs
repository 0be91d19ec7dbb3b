use std::{
    io::{self, BufRead, Write},
    string::FromUtf8Error,
};

use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

use crate::{entry::Entry, record::RecordError};

#[derive(Debug, Error)]
pub enum LineError {
    #[error("line {line}: failed to read input: {source}")]
    Io { line: usize, source: io::Error },
    #[error("line {line}: invalid UTF-8: {source}")]
    Encoding {
        line: usize,
        source: FromUtf8Error,
    },
    #[error("line {line}: invalid JSON: {source}")]
    Json {
        line: usize,
        source: serde_json::Error,
    },
    #[error("line {line}: {source}")]
    Record { line: usize, source: RecordError },
}

impl LineError {
    pub fn line(&self) -> usize {
        match self {
            LineError::Io { line, .. }
            | LineError::Encoding { line, .. }
            | LineError::Json { line, .. }
            | LineError::Record { line, .. } => *line,
        }
    }
}

/// Parses one JSON Lines record. `line` is only used for error reporting.
pub fn parse_line(text: &str, line: usize) -> Result<Entry, LineError> {
    let value: Value =
        serde_json::from_str(text).map_err(|source| LineError::Json { line, source })?;
    Entry::try_from(&value).map_err(|source| LineError::Record { line, source })
}

/// Streams entries out of JSON Lines input, one result per non-blank line.
/// Line numbers in errors are 1-based and count blank lines. Lines that are
/// not valid UTF-8 are reported as `Encoding` errors; `Io` is reserved for
/// failures of the reader itself.
pub fn read_entries<R: BufRead>(reader: R) -> impl Iterator<Item = Result<Entry, LineError>> {
    reader
        .split(b'\n')
        .enumerate()
        .filter_map(|(index, bytes)| {
            let line = index + 1;
            let text = match bytes {
                Ok(bytes) => String::from_utf8(bytes),
                Err(source) => return Some(Err(LineError::Io { line, source })),
            };
            match text {
                Ok(text) if text.trim().is_empty() => None,
                Ok(text) => Some(parse_line(&text, line)),
                Err(source) => Some(Err(LineError::Encoding { line, source })),
            }
        })
}

/// Writes the canonical record of `entry` as a single line.
pub fn write_entry<W: Write>(mut writer: W, entry: &Entry) -> io::Result<()> {
    serde_json::to_writer(&mut writer, entry).map_err(io::Error::from)?;
    writer.write_all(b"\n")
}

/// Returns the first entry whose id matches. Malformed lines are skipped.
pub fn find_by_id<R: BufRead>(reader: R, id: &str) -> io::Result<Option<Entry>> {
    for result in read_entries(reader) {
        match result {
            Ok(entry) if entry.id == id => return Ok(Some(entry)),
            Ok(_) => {}
            Err(LineError::Io { source, .. }) => return Err(source),
            Err(e) => warn!(line = e.line(), error = %e, "skipping malformed record"),
        }
    }
    debug!(%id, "no entry with matching id");
    Ok(None)
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Summary {
    pub valid: usize,
    pub invalid: usize,
}

impl Summary {
    pub fn record<T, E>(&mut self, result: &Result<T, E>) {
        match result {
            Ok(_) => self.valid += 1,
            Err(_) => self.invalid += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.valid + self.invalid
    }

    pub fn is_clean(&self) -> bool {
        self.invalid == 0
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;
    use crate::entry::EntryKey;

    const DUMP: &str = r#"{"_id": "a1", "title": "First", "unread": true}

{"_id": "a2", "readlater": "soon"}
not json
{"_id": "a3", "crawler": true, "url": "https://example.com/"}
"#;

    #[test]
    fn reads_valid_lines_and_reports_bad_ones() {
        let results: Vec<_> = read_entries(Cursor::new(DUMP)).collect();
        assert_eq!(results.len(), 4);

        let first = results[0].as_ref().unwrap();
        assert_eq!(first.title, "First");
        assert!(first.unread);

        match &results[1] {
            Err(LineError::Record {
                line: 3,
                source: RecordError::MalformedRecord { key, .. },
            }) => assert_eq!(*key, EntryKey::ReadLater),
            other => panic!("unexpected: {other:?}"),
        }
        assert!(matches!(results[2], Err(LineError::Json { line: 4, .. })));
        assert_eq!(results[3].as_ref().unwrap().id, "a3");
    }

    #[test]
    fn summary_counts_results() {
        let mut summary = Summary::default();
        for result in read_entries(Cursor::new(DUMP)) {
            summary.record(&result);
        }
        assert_eq!(summary, Summary { valid: 2, invalid: 2 });
        assert_eq!(summary.total(), 4);
        assert!(!summary.is_clean());
    }

    #[test]
    fn top_level_array_is_a_record_error() {
        let err = parse_line("[1, 2]", 7).unwrap_err();
        assert_eq!(err.line(), 7);
        assert!(matches!(
            err,
            LineError::Record {
                source: RecordError::NotAnObject { found: "array" },
                ..
            }
        ));
    }

    #[test]
    fn written_line_is_canonical() {
        let mut out = Vec::new();
        write_entry(&mut out, &Entry::new("w1")).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert!(text.ends_with('\n'));
        assert_eq!(text.lines().count(), 1);
        assert!(text.starts_with(r#"{"_id":"w1","file_type":"","readlater":false"#));
        assert!(text.trim_end().ends_with(r#""pure_content":"","title":""}"#));
    }

    #[test]
    fn find_by_id_skips_malformed_lines() {
        let found = find_by_id(Cursor::new(DUMP), "a3").unwrap().unwrap();
        assert!(found.crawler);
        assert_eq!(found.url, "https://example.com/");

        assert_eq!(find_by_id(Cursor::new(DUMP), "a2").unwrap(), None);
        assert_eq!(find_by_id(Cursor::new(DUMP), "zz").unwrap(), None);
    }

    const LATIN1_DUMP: &[u8] = b"{\"_id\": \"caf\xe9\"}\r\n\xff\xfe\n{\"_id\": \"b\", \"saved\": true}\r\n";

    #[test]
    fn invalid_utf8_line_is_a_per_line_error() {
        let results: Vec<_> = read_entries(Cursor::new(LATIN1_DUMP)).collect();
        assert_eq!(results.len(), 3);
        assert!(matches!(results[0], Err(LineError::Encoding { line: 1, .. })));
        assert!(matches!(results[1], Err(LineError::Encoding { line: 2, .. })));

        let entry = results[2].as_ref().unwrap();
        assert_eq!(entry.id, "b");
        assert!(entry.saved);
    }

    #[test]
    fn find_by_id_reads_past_invalid_utf8() {
        let found = find_by_id(Cursor::new(LATIN1_DUMP), "b").unwrap();
        assert_eq!(found.map(|entry| entry.id), Some("b".to_owned()));
    }
}

use litmerge_core::{SourceRecord, SourceTag};
use tracing::warn;

use crate::identifiers::{CanonicalIsbn, normalize_identifier};
use crate::text::normalize_field;

/// A source record together with everything matching needs from it,
/// computed once on ingestion.
#[derive(Debug, Clone)]
pub struct KeyedRecord<'a> {
    pub record: &'a SourceRecord,
    pub source: SourceTag,
    /// Position within its source collection as supplied.
    pub position: usize,
    pub title_key: String,
    pub author_key: String,
    /// Distinct canonical identifiers, sorted.
    pub isbns: Vec<CanonicalIsbn>,
    /// Raw identifiers that could not be normalized.
    pub malformed_identifiers: usize,
}

impl<'a> KeyedRecord<'a> {
    pub fn new(record: &'a SourceRecord, position: usize) -> Self {
        let source = record.source();
        let mut isbns = Vec::with_capacity(record.identifiers.len());
        let mut malformed_identifiers = 0;

        for raw in &record.identifiers {
            match normalize_identifier(raw) {
                Some(isbn) => isbns.push(isbn),
                None => {
                    malformed_identifiers += 1;
                    warn!(%source, position, raw = %raw, "skipping malformed identifier");
                }
            }
        }
        isbns.sort();
        isbns.dedup();

        Self {
            record,
            source,
            position,
            title_key: normalize_field(record.title.as_deref()),
            author_key: normalize_field(record.author.as_deref()),
            isbns,
            malformed_identifiers,
        }
    }

    /// Stable ordering key: enumeration order of the source, then position.
    pub fn order_key(&self) -> (SourceTag, usize) {
        (self.source, self.position)
    }

    pub fn has_text_keys(&self) -> bool {
        !self.title_key.is_empty() && !self.author_key.is_empty()
    }
}

/// Key every record of one collection, preserving its order.
pub fn key_collection(records: &[SourceRecord]) -> Vec<KeyedRecord<'_>> {
    records
        .iter()
        .enumerate()
        .map(|(position, record)| KeyedRecord::new(record, position))
        .collect()
}

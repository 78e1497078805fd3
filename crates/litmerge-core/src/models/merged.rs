use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::award::AwardEntry;
use super::source::{SourceRecord, SourceTag};

/// How a cluster got linked to at least one secondary record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchMethod {
    Identifier,
    Fuzzy,
}

/// Title and author similarities that produced a fuzzy link.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FuzzyScore {
    pub title: f64,
    pub author: f64,
}

impl FuzzyScore {
    pub fn combined(&self) -> f64 {
        self.title + self.author
    }

    /// The weaker of the two component similarities.
    pub fn min(&self) -> f64 {
        self.title.min(self.author)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExternalIds {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub google_books_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub openlibrary_key: Option<String>,
}

impl ExternalIds {
    pub fn is_empty(&self) -> bool {
        self.google_books_id.is_none() && self.openlibrary_key.is_none()
    }
}

/// Public reception, present only when a reception record contributed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReceptionMetrics {
    pub ratings_average: Option<f64>,
    pub ratings_count: u64,
    pub want_to_read_count: u64,
    pub currently_reading_count: u64,
    pub already_read_count: u64,
}

/// Commercial performance, present only when bestseller records contributed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommercialMetrics {
    pub bestseller_appearances: u32,
    pub total_weeks_on_list: u32,
    pub highest_rank: Option<u32>,
    pub bestseller_dates: Vec<String>,
    pub lists: Vec<String>,
}

/// One output book.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MergedBook {
    pub book_id: u64,
    pub title: Option<String>,
    pub author: Option<String>,
    pub year: Option<i32>,

    /// Canonical ISBN-13 values, sorted.
    pub isbns: Vec<String>,
    pub isbn_13: Option<String>,
    pub isbn_10: Option<String>,
    #[serde(default, skip_serializing_if = "ExternalIds::is_empty")]
    pub external_ids: ExternalIds,

    pub publisher: Option<String>,
    pub page_count: Option<u32>,
    pub language: Option<String>,
    pub categories: Vec<String>,

    pub awards: Vec<AwardEntry>,
    pub award_count: usize,
    pub won_award: bool,
    pub shortlisted: bool,

    pub reception: Option<ReceptionMetrics>,
    pub commercial: Option<CommercialMetrics>,

    /// Distinct contributing sources in enumeration order.
    pub sources: Vec<SourceTag>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub match_method: Option<MatchMethod>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub match_score: Option<FuzzyScore>,
}

impl MergedBook {
    pub fn has_awards(&self) -> bool {
        !self.awards.is_empty()
    }

    pub fn has_reception(&self) -> bool {
        self.reception.is_some()
    }

    pub fn has_commercial(&self) -> bool {
        self.commercial.is_some()
    }

    pub fn is_multi_source(&self) -> bool {
        self.sources.len() >= 2
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetMetadata {
    /// Stamped by the caller when persisting; the engine leaves it empty.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_date: Option<DateTime<Utc>>,
    pub total_books: usize,
    pub primary_source: SourceTag,
    pub sources: Vec<SourceTag>,
    pub matching_method: String,
    pub similarity_threshold: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MergedDataset {
    pub metadata: DatasetMetadata,
    pub books: Vec<MergedBook>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnmatchedMetadata {
    pub source: SourceTag,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_date: Option<DateTime<Utc>>,
    pub total_unmatched: usize,
}

/// Residual records of one secondary source never linked to a primary cluster.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnmatchedCollection {
    pub metadata: UnmatchedMetadata,
    pub entries: Vec<SourceRecord>,
}

impl UnmatchedCollection {
    pub fn new(source: SourceTag, entries: Vec<SourceRecord>) -> Self {
        Self {
            metadata: UnmatchedMetadata {
                source,
                created_date: None,
                total_unmatched: entries.len(),
            },
            entries,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

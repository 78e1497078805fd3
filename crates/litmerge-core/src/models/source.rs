use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::award::AwardStatus;
use crate::error::LitmergeError;

/// The fixed set of upstream sources. Declaration order is the enumeration
/// order used for tie-breaking and for listing contributing sources.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceTag {
    Award,
    BibliographicApi,
    ReceptionApi,
    BestsellerApi,
}

impl SourceTag {
    pub const ALL: [SourceTag; 4] = [
        SourceTag::Award,
        SourceTag::BibliographicApi,
        SourceTag::ReceptionApi,
        SourceTag::BestsellerApi,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Award => "award",
            Self::BibliographicApi => "bibliographic_api",
            Self::ReceptionApi => "reception_api",
            Self::BestsellerApi => "bestseller_api",
        }
    }
}

impl fmt::Display for SourceTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SourceTag {
    type Err = LitmergeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SourceTag::ALL
            .into_iter()
            .find(|tag| tag.as_str() == s.trim())
            .ok_or_else(|| LitmergeError::ConfigError(format!("unknown source tag: {s}")))
    }
}

/// One book observation from one source. Immutable once ingested.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,

    /// Raw ISBN strings as the source reported them (ISBN-10 or ISBN-13).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub identifiers: Vec<String>,

    #[serde(flatten)]
    pub attributes: SourceAttributes,
}

/// Source-specific attributes. The variant decides the record's source tag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum SourceAttributes {
    Award(AwardAttributes),
    BibliographicApi(BibliographicAttributes),
    ReceptionApi(ReceptionAttributes),
    BestsellerApi(BestsellerAttributes),
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AwardAttributes {
    pub award: String,
    pub status: AwardStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub publisher: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BibliographicAttributes {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub publisher: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub published_date: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub categories: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_count: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub google_books_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ReceptionAttributes {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub publishers: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub subjects: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub languages: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub number_of_pages: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ratings_average: Option<f64>,
    pub ratings_count: u64,
    pub want_to_read_count: u64,
    pub currently_reading_count: u64,
    pub already_read_count: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub openlibrary_key: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BestsellerAttributes {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub publisher: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rank: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rank_last_week: Option<u32>,
    pub weeks_on_list: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bestseller_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub list_name: Option<String>,
}

impl SourceRecord {
    pub fn new(title: &str, author: &str, attributes: SourceAttributes) -> Self {
        Self {
            title: non_empty(title),
            author: non_empty(author),
            year: None,
            identifiers: Vec::new(),
            attributes,
        }
    }

    pub fn with_year(mut self, year: i32) -> Self {
        self.year = Some(year);
        self
    }

    pub fn with_identifier(mut self, raw: &str) -> Self {
        self.identifiers.push(raw.to_string());
        self
    }

    pub fn source(&self) -> SourceTag {
        match self.attributes {
            SourceAttributes::Award(_) => SourceTag::Award,
            SourceAttributes::BibliographicApi(_) => SourceTag::BibliographicApi,
            SourceAttributes::ReceptionApi(_) => SourceTag::ReceptionApi,
            SourceAttributes::BestsellerApi(_) => SourceTag::BestsellerApi,
        }
    }

    pub fn award(&self) -> Option<&AwardAttributes> {
        match &self.attributes {
            SourceAttributes::Award(attrs) => Some(attrs),
            _ => None,
        }
    }

    pub fn bibliographic(&self) -> Option<&BibliographicAttributes> {
        match &self.attributes {
            SourceAttributes::BibliographicApi(attrs) => Some(attrs),
            _ => None,
        }
    }

    pub fn reception(&self) -> Option<&ReceptionAttributes> {
        match &self.attributes {
            SourceAttributes::ReceptionApi(attrs) => Some(attrs),
            _ => None,
        }
    }

    pub fn bestseller(&self) -> Option<&BestsellerAttributes> {
        match &self.attributes {
            SourceAttributes::BestsellerApi(attrs) => Some(attrs),
            _ => None,
        }
    }

    /// Publisher as reported by this record, whatever its source.
    pub fn publisher(&self) -> Option<&str> {
        match &self.attributes {
            SourceAttributes::Award(a) => a.publisher.as_deref(),
            SourceAttributes::BibliographicApi(b) => b.publisher.as_deref(),
            SourceAttributes::ReceptionApi(r) => r.publishers.first().map(String::as_str),
            SourceAttributes::BestsellerApi(b) => b.publisher.as_deref(),
        }
    }
}

fn non_empty(s: &str) -> Option<String> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Input collections keyed by source tag, each in source-listed order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SourceCollections {
    collections: BTreeMap<SourceTag, Vec<SourceRecord>>,
}

impl SourceCollections {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a record to the collection its attributes belong to.
    pub fn push(&mut self, record: SourceRecord) {
        self.collections
            .entry(record.source())
            .or_default()
            .push(record);
    }

    pub fn extend<I: IntoIterator<Item = SourceRecord>>(&mut self, records: I) {
        for record in records {
            self.push(record);
        }
    }

    pub fn get(&self, source: SourceTag) -> &[SourceRecord] {
        self.collections
            .get(&source)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Collections in enumeration order, including empty ones.
    pub fn iter(&self) -> impl Iterator<Item = (SourceTag, &[SourceRecord])> {
        SourceTag::ALL.into_iter().map(|tag| (tag, self.get(tag)))
    }

    pub fn total_len(&self) -> usize {
        self.collections.values().map(Vec::len).sum()
    }
}

impl FromIterator<SourceRecord> for SourceCollections {
    fn from_iter<I: IntoIterator<Item = SourceRecord>>(iter: I) -> Self {
        let mut collections = Self::new();
        collections.extend(iter);
        collections
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tag_round_trips_through_str() {
        for tag in SourceTag::ALL {
            assert_eq!(tag.as_str().parse::<SourceTag>().unwrap(), tag);
        }
        assert!("goodreads".parse::<SourceTag>().is_err());
    }

    #[test]
    fn record_source_follows_attributes() {
        let record = SourceRecord::new(
            "The Nickel Boys",
            "Colson Whitehead",
            SourceAttributes::BestsellerApi(BestsellerAttributes::default()),
        );
        assert_eq!(record.source(), SourceTag::BestsellerApi);
        assert!(record.bestseller().is_some());
        assert!(record.award().is_none());
    }

    #[test]
    fn blank_title_becomes_none() {
        let record = SourceRecord::new(
            "   ",
            "Someone",
            SourceAttributes::Award(AwardAttributes::default()),
        );
        assert_eq!(record.title, None);
        assert_eq!(record.author.as_deref(), Some("Someone"));
    }

    #[test]
    fn serialized_record_carries_source_tag() {
        let record = SourceRecord::new(
            "Shuggie Bain",
            "Douglas Stuart",
            SourceAttributes::Award(AwardAttributes {
                award: "Booker Prize".to_string(),
                status: AwardStatus::Winner,
                publisher: None,
            }),
        )
        .with_year(2020);

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["source"], "award");
        assert_eq!(json["status"], "Winner");

        let back: SourceRecord = serde_json::from_value(json).unwrap();
        assert_eq!(back, record);
    }

    #[test]
    fn collections_group_by_source_in_order() {
        let collections: SourceCollections = vec![
            SourceRecord::new(
                "B",
                "Y",
                SourceAttributes::ReceptionApi(ReceptionAttributes::default()),
            ),
            SourceRecord::new("A", "X", SourceAttributes::Award(AwardAttributes::default())),
        ]
        .into_iter()
        .collect();

        let tags: Vec<SourceTag> = collections
            .iter()
            .filter(|(_, records)| !records.is_empty())
            .map(|(tag, _)| tag)
            .collect();
        assert_eq!(tags, vec![SourceTag::Award, SourceTag::ReceptionApi]);
        assert_eq!(collections.total_len(), 2);
        assert!(collections.get(SourceTag::BestsellerApi).is_empty());
    }
}

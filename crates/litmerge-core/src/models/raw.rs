//! JSON shapes written by the upstream collectors, and their conversion into
//! [`SourceRecord`]s. Collectors use `"N/A"` and zero as "unknown"; both are
//! folded into `None` here so the engine never sees them.

use serde::{Deserialize, Deserializer, Serialize};

use super::award::AwardStatus;
use super::source::{
    AwardAttributes, BestsellerAttributes, BibliographicAttributes, ReceptionAttributes,
    SourceAttributes, SourceRecord,
};

/// `{"books": [...]}` wrapper used by the API collectors.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BooksEnvelope<T> {
    #[serde(default = "Vec::new")]
    pub books: Vec<T>,
}

/// One row of an award listing (Booker, National Book Award, Pulitzer).
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AwardListing {
    #[serde(rename = "Title", default)]
    pub title: Option<String>,
    #[serde(rename = "Author", default)]
    pub author: Option<String>,
    #[serde(rename = "Year", default, deserialize_with = "lenient_year")]
    pub year: Option<i32>,
    #[serde(rename = "Award", default)]
    pub award: Option<String>,
    #[serde(rename = "Status", default)]
    pub status: Option<String>,
    #[serde(rename = "Publisher", default)]
    pub publisher: Option<String>,
    #[serde(rename = "ISBN", default)]
    pub isbn: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct BibliographicBook {
    pub title: Option<String>,
    pub authors: Vec<String>,
    pub publisher: Option<String>,
    pub published_date: Option<String>,
    #[serde(deserialize_with = "lenient_year")]
    pub year: Option<i32>,
    pub categories: Vec<String>,
    pub page_count: Option<u32>,
    pub language: Option<String>,
    pub isbn_10: Option<String>,
    pub isbn_13: Option<String>,
    pub google_books_id: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct ReceptionBook {
    pub title: Option<String>,
    pub authors: Vec<String>,
    #[serde(deserialize_with = "lenient_year")]
    pub year: Option<i32>,
    pub publishers: Vec<String>,
    pub isbn: Vec<String>,
    pub subjects: Vec<String>,
    pub language: Vec<String>,
    pub number_of_pages: Option<u32>,
    pub ratings_average: Option<f64>,
    pub ratings_count: Option<u64>,
    pub want_to_read_count: Option<u64>,
    pub currently_reading_count: Option<u64>,
    pub already_read_count: Option<u64>,
    pub openlibrary_key: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct BestsellerEntry {
    pub title: Option<String>,
    pub author: Option<String>,
    pub publisher: Option<String>,
    pub description: Option<String>,
    pub primary_isbn13: Option<String>,
    pub primary_isbn10: Option<String>,
    pub rank: Option<u32>,
    pub rank_last_week: Option<u32>,
    pub weeks_on_list: Option<u32>,
    pub bestseller_date: Option<String>,
    pub list_name: Option<String>,
}

impl From<AwardListing> for SourceRecord {
    fn from(raw: AwardListing) -> Self {
        let status = raw
            .status
            .as_deref()
            .map(AwardStatus::from_label)
            .unwrap_or_default();
        SourceRecord {
            title: clean(raw.title),
            author: clean(raw.author),
            year: raw.year,
            identifiers: clean(raw.isbn).into_iter().collect(),
            attributes: SourceAttributes::Award(AwardAttributes {
                award: clean(raw.award).unwrap_or_default(),
                status,
                publisher: clean(raw.publisher),
            }),
        }
    }
}

impl From<BibliographicBook> for SourceRecord {
    fn from(raw: BibliographicBook) -> Self {
        let identifiers = [raw.isbn_13, raw.isbn_10]
            .into_iter()
            .filter_map(clean)
            .collect();
        SourceRecord {
            title: clean(raw.title),
            author: join_authors(&raw.authors),
            year: raw.year,
            identifiers,
            attributes: SourceAttributes::BibliographicApi(BibliographicAttributes {
                publisher: clean(raw.publisher),
                published_date: clean(raw.published_date),
                categories: clean_list(raw.categories),
                page_count: raw.page_count.filter(|&n| n > 0),
                language: clean(raw.language),
                google_books_id: clean(raw.google_books_id),
            }),
        }
    }
}

impl From<ReceptionBook> for SourceRecord {
    fn from(raw: ReceptionBook) -> Self {
        SourceRecord {
            title: clean(raw.title),
            author: join_authors(&raw.authors),
            year: raw.year,
            identifiers: clean_list(raw.isbn),
            attributes: SourceAttributes::ReceptionApi(ReceptionAttributes {
                publishers: clean_list(raw.publishers),
                subjects: clean_list(raw.subjects),
                languages: clean_list(raw.language),
                number_of_pages: raw.number_of_pages.filter(|&n| n > 0),
                ratings_average: raw.ratings_average,
                ratings_count: raw.ratings_count.unwrap_or(0),
                want_to_read_count: raw.want_to_read_count.unwrap_or(0),
                currently_reading_count: raw.currently_reading_count.unwrap_or(0),
                already_read_count: raw.already_read_count.unwrap_or(0),
                openlibrary_key: clean(raw.openlibrary_key),
            }),
        }
    }
}

impl From<BestsellerEntry> for SourceRecord {
    fn from(raw: BestsellerEntry) -> Self {
        let identifiers = [raw.primary_isbn13, raw.primary_isbn10]
            .into_iter()
            .filter_map(clean)
            .collect();
        SourceRecord {
            title: clean(raw.title),
            author: clean(raw.author),
            year: None,
            identifiers,
            attributes: SourceAttributes::BestsellerApi(BestsellerAttributes {
                publisher: clean(raw.publisher),
                description: clean(raw.description),
                rank: raw.rank.filter(|&r| r > 0),
                rank_last_week: raw.rank_last_week.filter(|&r| r > 0),
                weeks_on_list: raw.weeks_on_list.unwrap_or(0),
                bestseller_date: clean(raw.bestseller_date),
                list_name: clean(raw.list_name),
            }),
        }
    }
}

fn clean(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty() && s != "N/A")
}

fn clean_list(values: Vec<String>) -> Vec<String> {
    values.into_iter().filter_map(|v| clean(Some(v))).collect()
}

fn join_authors(authors: &[String]) -> Option<String> {
    let names: Vec<&str> = authors
        .iter()
        .map(|a| a.trim())
        .filter(|a| !a.is_empty() && *a != "N/A")
        .collect();
    if names.is_empty() {
        None
    } else {
        Some(names.join(", "))
    }
}

/// Accepts `2020`, `"2020"`, `"2020-05-01"` or null.
fn lenient_year<'de, D>(deserializer: D) -> std::result::Result<Option<i32>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::Number(n)) => n.as_i64().and_then(|y| i32::try_from(y).ok()),
        Some(serde_json::Value::String(s)) => s.get(..4).and_then(|y| y.parse().ok()),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SourceTag;

    #[test]
    fn award_listing_converts_status_and_drops_placeholders() {
        let raw: AwardListing = serde_json::from_str(
            r#"{"Title":"The Nickel Boys","Author":"Colson Whitehead","Year":2020,
                "Award":"Pulitzer Prize for Fiction","Status":"Winner","Publisher":"N/A"}"#,
        )
        .unwrap();
        let record = SourceRecord::from(raw);

        assert_eq!(record.source(), SourceTag::Award);
        assert_eq!(record.year, Some(2020));
        let award = record.award().unwrap();
        assert_eq!(award.status, AwardStatus::Winner);
        assert_eq!(award.publisher, None);
    }

    #[test]
    fn bibliographic_book_joins_authors_and_collects_isbns() {
        let raw: BibliographicBook = serde_json::from_str(
            r#"{"title":"Piranesi","authors":["Susanna Clarke"],"year":"2020",
                "isbn_10":"N/A","isbn_13":"9781635575637","page_count":0}"#,
        )
        .unwrap();
        let record = SourceRecord::from(raw);

        assert_eq!(record.author.as_deref(), Some("Susanna Clarke"));
        assert_eq!(record.year, Some(2020));
        assert_eq!(record.identifiers, vec!["9781635575637".to_string()]);
        assert_eq!(record.bibliographic().unwrap().page_count, None);
    }

    #[test]
    fn reception_envelope_parses() {
        let envelope: BooksEnvelope<ReceptionBook> = serde_json::from_str(
            r#"{"metadata":{"source":"x"},"books":[{"title":"Klara and the Sun",
                "authors":["Kazuo Ishiguro"],"isbn":["9780593318171"],
                "ratings_average":3.9,"ratings_count":120}]}"#,
        )
        .unwrap();
        let record = SourceRecord::from(envelope.books[0].clone());
        let reception = record.reception().unwrap();

        assert_eq!(reception.ratings_count, 120);
        assert_eq!(reception.want_to_read_count, 0);
        assert_eq!(record.identifiers.len(), 1);
    }

    #[test]
    fn bestseller_zero_rank_is_unknown() {
        let raw = BestsellerEntry {
            title: Some("Where the Crawdads Sing".to_string()),
            author: Some("Delia Owens".to_string()),
            rank: Some(0),
            weeks_on_list: Some(12),
            ..Default::default()
        };
        let record = SourceRecord::from(raw);
        let bestseller = record.bestseller().unwrap();

        assert_eq!(bestseller.rank, None);
        assert_eq!(bestseller.weeks_on_list, 12);
        assert!(record.identifiers.is_empty());
    }
}

use std::collections::BTreeSet;

use litmerge_core::{
    AwardEntry, CommercialMetrics, ExternalIds, MergedBook, ReceptionMetrics, SourceRecord,
    SourceTag,
};

use crate::identifiers::{CanonicalIsbn, Isbn};
use crate::matcher::MatchCluster;

/// Bibliographic fields resolved by source priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Title,
    Author,
    Year,
    Publisher,
    PageCount,
    Language,
}

impl Field {
    /// The one precedence table. The first source in the list that is present
    /// in the cluster with a non-empty value wins.
    pub fn priority(&self) -> &'static [SourceTag] {
        use SourceTag::*;
        match self {
            Field::Title | Field::Author => &[Award, BibliographicApi, ReceptionApi, BestsellerApi],
            Field::Year => &[BibliographicApi, Award, ReceptionApi, BestsellerApi],
            Field::Publisher => &[BibliographicApi, Award, BestsellerApi, ReceptionApi],
            Field::PageCount | Field::Language => &[BibliographicApi, ReceptionApi],
        }
    }
}

/// Build one output record from a cluster. Never fails; missing fields stay
/// `None` and are surfaced by the report.
pub fn merge_cluster(cluster: &MatchCluster<'_>, book_id: u64) -> MergedBook {
    let title = first_by(cluster, Field::Title, |r| r.title.clone());
    let author = first_by(cluster, Field::Author, |r| r.author.clone());
    let year = first_by(cluster, Field::Year, |r| r.year);
    let publisher = first_by(cluster, Field::Publisher, |r| {
        r.publisher().map(str::to_string)
    });
    let page_count = first_by(cluster, Field::PageCount, |r| {
        r.bibliographic()
            .and_then(|b| b.page_count)
            .or_else(|| r.reception().and_then(|rc| rc.number_of_pages))
    });
    let language = first_by(cluster, Field::Language, |r| {
        r.bibliographic()
            .and_then(|b| b.language.clone())
            .or_else(|| r.reception().and_then(|rc| rc.languages.first().cloned()))
    });

    let isbns = union_isbns(cluster);
    let isbn_13 = isbns.first().cloned();
    let isbn_10 = isbns
        .iter()
        .find_map(|isbn| Isbn::parse(isbn).ok().and_then(|parsed| parsed.isbn10));

    let awards = collect_awards(cluster);
    let award_count = awards.len();
    let won_award = awards.iter().any(|a| a.status.is_win());
    let shortlisted = !won_award && awards.iter().any(|a| a.status.is_shortlisted());

    let sources: Vec<SourceTag> = cluster
        .records()
        .map(|r| r.source)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    MergedBook {
        book_id,
        title,
        author,
        year,
        isbns,
        isbn_13,
        isbn_10,
        external_ids: external_ids(cluster),
        publisher,
        page_count,
        language,
        categories: union_categories(cluster),
        awards,
        award_count,
        won_award,
        shortlisted,
        reception: reception_metrics(cluster),
        commercial: commercial_metrics(cluster),
        sources,
        match_method: cluster.link.map(|link| link.method()),
        match_score: cluster.link.and_then(|link| link.fuzzy_score()),
    }
}

fn records_from<'c, 'a: 'c>(
    cluster: &'c MatchCluster<'a>,
    source: SourceTag,
) -> impl Iterator<Item = &'a SourceRecord> + 'c {
    cluster
        .records()
        .filter(move |r| r.source == source)
        .map(|r| r.record)
}

fn first_by<T>(
    cluster: &MatchCluster<'_>,
    field: Field,
    value: impl Fn(&SourceRecord) -> Option<T>,
) -> Option<T> {
    field
        .priority()
        .iter()
        .flat_map(|&source| records_from(cluster, source))
        .find_map(value)
}

fn union_isbns(cluster: &MatchCluster<'_>) -> Vec<String> {
    cluster
        .records()
        .flat_map(|r| r.isbns.iter())
        .collect::<BTreeSet<&CanonicalIsbn>>()
        .into_iter()
        .map(|isbn| isbn.as_str().to_string())
        .collect()
}

/// Categories and subjects, first occurrence wins, case-insensitive dedup.
fn union_categories(cluster: &MatchCluster<'_>) -> Vec<String> {
    let mut seen = BTreeSet::new();
    let mut categories = Vec::new();
    let bibliographic = records_from(cluster, SourceTag::BibliographicApi)
        .filter_map(|r| r.bibliographic())
        .flat_map(|b| b.categories.iter());
    let reception = records_from(cluster, SourceTag::ReceptionApi)
        .filter_map(|r| r.reception())
        .flat_map(|rc| rc.subjects.iter());

    for category in bibliographic.chain(reception) {
        if seen.insert(category.to_lowercase()) {
            categories.push(category.clone());
        }
    }
    categories
}

fn collect_awards(cluster: &MatchCluster<'_>) -> Vec<AwardEntry> {
    records_from(cluster, SourceTag::Award)
        .filter_map(|r| {
            r.award().map(|a| AwardEntry {
                award: a.award.clone(),
                year: r.year,
                status: a.status,
                publisher: a.publisher.clone(),
            })
        })
        .collect()
}

fn external_ids(cluster: &MatchCluster<'_>) -> ExternalIds {
    ExternalIds {
        google_books_id: records_from(cluster, SourceTag::BibliographicApi)
            .find_map(|r| r.bibliographic().and_then(|b| b.google_books_id.clone())),
        openlibrary_key: records_from(cluster, SourceTag::ReceptionApi)
            .find_map(|r| r.reception().and_then(|rc| rc.openlibrary_key.clone())),
    }
}

fn reception_metrics(cluster: &MatchCluster<'_>) -> Option<ReceptionMetrics> {
    records_from(cluster, SourceTag::ReceptionApi)
        .find_map(|r| r.reception())
        .map(|rc| ReceptionMetrics {
            ratings_average: rc.ratings_average,
            ratings_count: rc.ratings_count,
            want_to_read_count: rc.want_to_read_count,
            currently_reading_count: rc.currently_reading_count,
            already_read_count: rc.already_read_count,
        })
}

/// Weekly bestseller entries accumulate into one set of metrics.
fn commercial_metrics(cluster: &MatchCluster<'_>) -> Option<CommercialMetrics> {
    let entries: Vec<_> = records_from(cluster, SourceTag::BestsellerApi)
        .filter_map(|r| r.bestseller())
        .collect();
    if entries.is_empty() {
        return None;
    }

    let dates: BTreeSet<&String> = entries
        .iter()
        .filter_map(|e| e.bestseller_date.as_ref())
        .collect();
    let lists: BTreeSet<&String> = entries.iter().filter_map(|e| e.list_name.as_ref()).collect();

    Some(CommercialMetrics {
        bestseller_appearances: entries.len() as u32,
        total_weeks_on_list: entries.iter().map(|e| e.weeks_on_list).sum(),
        highest_rank: entries.iter().filter_map(|e| e.rank).min(),
        bestseller_dates: dates.into_iter().cloned().collect(),
        lists: lists.into_iter().cloned().collect(),
    })
}

use std::collections::BTreeMap;

use litmerge_core::{
    DataQuality, MergeReport, MergedBook, MergedTotals, SourceCollections, SourceStats, SourceTag,
    UnmatchedCollection,
};

use crate::matcher::MatchOutcome;

/// Per-source linkage counts taken from the finished clusters.
fn matched_counts(outcome: &MatchOutcome<'_>) -> BTreeMap<SourceTag, usize> {
    let mut matched: BTreeMap<SourceTag, usize> = BTreeMap::new();
    for cluster in outcome.clusters.iter().filter(|c| c.is_linked()) {
        for record in cluster.records() {
            *matched.entry(record.source).or_default() += 1;
        }
    }
    matched
}

pub fn build_report(
    collections: &SourceCollections,
    outcome: &MatchOutcome<'_>,
    books: &[MergedBook],
    threshold: f64,
    malformed_identifiers: usize,
) -> MergeReport {
    let matched = matched_counts(outcome);
    let source_datasets = collections
        .iter()
        .map(|(tag, records)| {
            SourceStats::new(tag, records.len(), matched.get(&tag).copied().unwrap_or(0))
        })
        .collect();

    let merged_dataset = MergedTotals {
        total_unique_books: books.len(),
        books_with_awards: books.iter().filter(|b| b.has_awards()).count(),
        books_with_reception_data: books.iter().filter(|b| b.has_reception()).count(),
        books_with_commercial_data: books.iter().filter(|b| b.has_commercial()).count(),
        books_with_multiple_sources: books.iter().filter(|b| b.is_multi_source()).count(),
    };

    let data_quality = DataQuality {
        missing_title: books.iter().filter(|b| b.title.is_none()).count(),
        missing_author: books.iter().filter(|b| b.author.is_none()).count(),
        missing_year: books.iter().filter(|b| b.year.is_none()).count(),
        books_with_isbn: books.iter().filter(|b| !b.isbns.is_empty()).count(),
        books_with_ratings: books
            .iter()
            .filter(|b| {
                b.reception
                    .as_ref()
                    .is_some_and(|r| r.ratings_average.is_some())
            })
            .count(),
        award_winning_books: books.iter().filter(|b| b.won_award).count(),
        malformed_identifiers,
    };

    MergeReport {
        created_date: None,
        similarity_threshold: threshold,
        source_datasets,
        merged_dataset,
        data_quality,
    }
}

/// Residual records per secondary source, in input order. Every secondary
/// source gets a collection, possibly empty.
pub fn unmatched_collections(
    outcome: &MatchOutcome<'_>,
    primary: SourceTag,
) -> Vec<UnmatchedCollection> {
    let mut residual: Vec<_> = outcome
        .residual
        .iter()
        .flat_map(|cluster| cluster.records())
        .collect();
    residual.sort_by_key(|r| r.order_key());

    SourceTag::ALL
        .into_iter()
        .filter(|&tag| tag != primary)
        .map(|tag| {
            let entries = residual
                .iter()
                .filter(|r| r.source == tag)
                .map(|r| r.record.clone())
                .collect();
            UnmatchedCollection::new(tag, entries)
        })
        .collect()
}

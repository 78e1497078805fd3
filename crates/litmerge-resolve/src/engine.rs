use litmerge_core::{
    DatasetMetadata, MatchingConfig, MergeReport, MergedBook, MergedDataset, PrimaryOrder,
    SourceCollections, SourceTag, UnmatchedCollection,
};
use tracing::{info, warn};

use crate::error::{ResolveError, Result};
use crate::index::build_index;
use crate::ingest::{KeyedRecord, key_collection};
use crate::matcher::{Matcher, MatcherOptions, Resolution};
use crate::merge::merge_cluster;
use crate::report::{build_report, unmatched_collections};

pub const DEFAULT_THRESHOLD: f64 = 0.85;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolveOptions {
    pub primary_source: SourceTag,
    pub threshold: f64,
    pub primary_order: PrimaryOrder,
    pub fold_primary_duplicates: bool,
}

impl Default for ResolveOptions {
    fn default() -> Self {
        Self {
            primary_source: SourceTag::Award,
            threshold: DEFAULT_THRESHOLD,
            primary_order: PrimaryOrder::AsListed,
            fold_primary_duplicates: true,
        }
    }
}

impl ResolveOptions {
    pub fn from_config(config: &MatchingConfig) -> Result<Self> {
        let options = Self {
            primary_source: config.primary_source,
            threshold: config.similarity_threshold,
            primary_order: config.primary_order,
            fold_primary_duplicates: config.fold_primary_duplicates,
        };
        options.validate()?;
        Ok(options)
    }

    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.threshold) {
            return Err(ResolveError::InvalidThreshold(self.threshold));
        }
        Ok(())
    }

    fn matcher_options(&self) -> MatcherOptions {
        MatcherOptions {
            threshold: self.threshold,
            fold_primary_duplicates: self.fold_primary_duplicates,
        }
    }
}

/// The three artifacts of one pass.
#[derive(Debug, Clone)]
pub struct MergeOutcome {
    pub dataset: MergedDataset,
    /// One collection per secondary source, in enumeration order.
    pub unmatched: Vec<UnmatchedCollection>,
    pub report: MergeReport,
}

/// Runs a full resolution pass over in-memory collections.
///
/// A pass never fails once the options are valid, and the same input in the
/// same order always yields the same output, including `book_id` assignment.
#[derive(Debug, Clone)]
pub struct Resolver {
    options: ResolveOptions,
}

impl Resolver {
    pub fn new(options: ResolveOptions) -> Result<Self> {
        options.validate()?;
        Ok(Self { options })
    }

    pub fn options(&self) -> &ResolveOptions {
        &self.options
    }

    pub fn run(&self, collections: &SourceCollections) -> MergeOutcome {
        let primary_tag = self.options.primary_source;

        let mut primary = key_collection(collections.get(primary_tag));
        if self.options.primary_order == PrimaryOrder::ByYear {
            primary.sort_by_key(|r| (r.record.year.is_none(), r.record.year));
        }
        let secondary: Vec<KeyedRecord<'_>> = SourceTag::ALL
            .into_iter()
            .filter(|&tag| tag != primary_tag)
            .flat_map(|tag| key_collection(collections.get(tag)))
            .collect();

        let malformed = primary
            .iter()
            .chain(secondary.iter())
            .map(|r| r.malformed_identifiers)
            .sum();
        let untitled = primary.iter().filter(|r| !r.has_text_keys()).count();
        if untitled > 0 {
            warn!(
                source = %primary_tag,
                count = untitled,
                "primary records without title or author can only match by identifier"
            );
        }

        let (index, pool) = build_index(secondary);
        info!(
            primary = primary.len(),
            identifiers = index.len(),
            candidate_groups = pool.remaining(),
            "identifier index built"
        );
        if index.is_empty() && pool.remaining() > 0 {
            warn!("no secondary record carries a valid ISBN, matching by text only");
        }

        let outcome = Matcher::new(self.options.matcher_options(), index, pool).run(primary);

        let books: Vec<MergedBook> = outcome
            .clusters
            .iter()
            .chain(outcome.residual.iter())
            .zip(1u64..)
            .map(|(cluster, book_id)| merge_cluster(cluster, book_id))
            .collect();

        let report = build_report(collections, &outcome, &books, self.options.threshold, malformed);
        let unmatched = unmatched_collections(&outcome, primary_tag);

        let mut by_identifier = 0usize;
        let mut by_fuzzy = 0usize;
        for decision in &outcome.decisions {
            match decision.resolution {
                Resolution::IdentifierMatched => by_identifier += 1,
                Resolution::FuzzyMatched(_) => by_fuzzy += 1,
                Resolution::Unmatched => {}
            }
        }
        info!(
            books = books.len(),
            clusters = outcome.clusters.len(),
            residual = outcome.residual.len(),
            by_identifier,
            by_fuzzy,
            "merge pass complete"
        );

        let dataset = MergedDataset {
            metadata: DatasetMetadata {
                created_date: None,
                total_books: books.len(),
                primary_source: primary_tag,
                sources: SourceTag::ALL.to_vec(),
                matching_method: matching_method(self.options.threshold),
                similarity_threshold: self.options.threshold,
            },
            books,
        };

        MergeOutcome {
            dataset,
            unmatched,
            report,
        }
    }
}

fn matching_method(threshold: f64) -> String {
    format!("ISBN exact match, then fuzzy title and author match (both >= {threshold})")
}

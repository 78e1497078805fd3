//! Greedy identity resolution driven by the primary source.
//!
//! Primary records are offered one at a time, in the order the caller
//! supplies; that order is part of the observable result because an
//! ambiguous fuzzy candidate goes to whichever primary record asks first.
//! For each primary record:
//!
//! 1. optionally fold it into an earlier primary cluster for the same book
//!    (repeated award listings);
//! 2. look up the identifier index with each canonical identifier and claim
//!    every hit group;
//! 3. with no identifier hit and nothing linked yet, claim the unclaimed group
//!    with the best title+author similarity, provided both reach the threshold;
//! 4. otherwise leave the cluster as it is; a folded record inherits the
//!    cluster's existing link.
//!
//! Decisions are final. Groups left in the pool afterwards become residual
//! singleton clusters.

use std::collections::HashMap;

use litmerge_core::{FuzzyScore, MatchMethod};
use tracing::debug;

use crate::identifiers::CanonicalIsbn;
use crate::index::{CandidateGroup, CandidatePool, GroupId, IdentifierIndex};
use crate::ingest::KeyedRecord;
use crate::similarity::similarity;

/// First link that attached secondary records to a cluster.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ClusterLink {
    Identifier,
    Fuzzy(FuzzyScore),
}

impl ClusterLink {
    pub fn method(&self) -> MatchMethod {
        match self {
            Self::Identifier => MatchMethod::Identifier,
            Self::Fuzzy(_) => MatchMethod::Fuzzy,
        }
    }

    pub fn fuzzy_score(&self) -> Option<FuzzyScore> {
        match self {
            Self::Identifier => None,
            Self::Fuzzy(score) => Some(*score),
        }
    }
}

/// Records judged to be one book. Built and consumed within one run.
#[derive(Debug, Clone, Default)]
pub struct MatchCluster<'a> {
    pub primary: Vec<KeyedRecord<'a>>,
    /// Secondary records in claim order.
    pub linked: Vec<KeyedRecord<'a>>,
    pub link: Option<ClusterLink>,
}

impl<'a> MatchCluster<'a> {
    fn from_residual(group: CandidateGroup<'a>) -> Self {
        Self {
            primary: Vec::new(),
            linked: group.members,
            link: None,
        }
    }

    fn absorb(&mut self, group: CandidateGroup<'a>, link: ClusterLink) {
        self.linked.extend(group.members);
        if self.link.is_none() {
            self.link = Some(link);
        }
    }

    pub fn is_residual(&self) -> bool {
        self.primary.is_empty()
    }

    pub fn is_linked(&self) -> bool {
        !self.primary.is_empty() && !self.linked.is_empty()
    }

    /// Primary records first, then linked records.
    pub fn records(&self) -> impl Iterator<Item = &KeyedRecord<'a>> {
        self.primary.iter().chain(self.linked.iter())
    }
}

/// Terminal state of one primary record.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Resolution {
    IdentifierMatched,
    FuzzyMatched(FuzzyScore),
    Unmatched,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PrimaryDecision {
    pub position: usize,
    /// Index of the cluster the record ended up in.
    pub cluster: usize,
    /// Joined an earlier primary cluster rather than opening a new one.
    pub folded: bool,
    pub resolution: Resolution,
}

#[derive(Debug, Clone, Copy)]
pub struct MatcherOptions {
    pub threshold: f64,
    pub fold_primary_duplicates: bool,
}

#[derive(Debug)]
pub struct MatchOutcome<'a> {
    /// One cluster per distinct primary book, in creation order.
    pub clusters: Vec<MatchCluster<'a>>,
    /// Never-claimed secondary groups, in pool order.
    pub residual: Vec<MatchCluster<'a>>,
    pub decisions: Vec<PrimaryDecision>,
}

/// Owns the pool for the duration of one pass.
pub struct Matcher<'a> {
    options: MatcherOptions,
    index: IdentifierIndex,
    pool: CandidatePool<'a>,
    clusters: Vec<MatchCluster<'a>>,
    primary_isbns: HashMap<CanonicalIsbn, usize>,
    decisions: Vec<PrimaryDecision>,
}

impl<'a> Matcher<'a> {
    pub fn new(options: MatcherOptions, index: IdentifierIndex, pool: CandidatePool<'a>) -> Self {
        Self {
            options,
            index,
            pool,
            clusters: Vec::new(),
            primary_isbns: HashMap::new(),
            decisions: Vec::new(),
        }
    }

    /// Resolve every primary record in the given order, then hand back the
    /// clusters and whatever the pool still holds.
    pub fn run<I>(mut self, primary: I) -> MatchOutcome<'a>
    where
        I: IntoIterator<Item = KeyedRecord<'a>>,
    {
        for record in primary {
            self.resolve(record);
        }

        let residual = self
            .pool
            .into_remaining()
            .into_iter()
            .map(MatchCluster::from_residual)
            .collect();

        MatchOutcome {
            clusters: self.clusters,
            residual,
            decisions: self.decisions,
        }
    }

    fn resolve(&mut self, record: KeyedRecord<'a>) {
        let position = record.position;
        let folded_into = if self.options.fold_primary_duplicates {
            self.find_primary_cluster(&record)
        } else {
            None
        };

        let hits = self.identifier_hits(&record);
        let cluster_idx = match folded_into {
            Some(idx) => idx,
            None => {
                self.clusters.push(MatchCluster::default());
                self.clusters.len() - 1
            }
        };
        for isbn in &record.isbns {
            self.primary_isbns.entry(isbn.clone()).or_insert(cluster_idx);
        }

        let resolution = if !hits.is_empty() {
            for id in hits {
                if let Some(group) = self.pool.claim(id) {
                    self.clusters[cluster_idx].absorb(group, ClusterLink::Identifier);
                }
            }
            Resolution::IdentifierMatched
        } else if self.clusters[cluster_idx].linked.is_empty()
            && let Some((id, score)) = self.best_fuzzy_candidate(&record)
        {
            if let Some(group) = self.pool.claim(id) {
                self.clusters[cluster_idx].absorb(group, ClusterLink::Fuzzy(score));
            }
            Resolution::FuzzyMatched(score)
        } else {
            match self.clusters[cluster_idx].link {
                Some(ClusterLink::Identifier) => Resolution::IdentifierMatched,
                Some(ClusterLink::Fuzzy(score)) => Resolution::FuzzyMatched(score),
                None => Resolution::Unmatched,
            }
        };

        debug!(
            position,
            title = %record.title_key,
            cluster = cluster_idx,
            folded = folded_into.is_some(),
            ?resolution,
            "resolved primary record"
        );

        self.clusters[cluster_idx].primary.push(record);

        self.decisions.push(PrimaryDecision {
            position,
            cluster: cluster_idx,
            folded: folded_into.is_some(),
            resolution,
        });
    }

    /// Unclaimed groups hit by any of the record's identifiers, deduplicated,
    /// in group order (source enumeration order, then input position).
    fn identifier_hits(&self, record: &KeyedRecord<'a>) -> Vec<GroupId> {
        let mut hits: Vec<GroupId> = record
            .isbns
            .iter()
            .filter_map(|isbn| self.index.lookup(isbn))
            .filter(|&id| !self.pool.is_claimed(id))
            .collect();
        hits.sort();
        hits.dedup();
        hits
    }

    /// An earlier primary cluster for the same book: shared identifier first,
    /// else the best fuzzy match against each cluster's first primary record.
    fn find_primary_cluster(&self, record: &KeyedRecord<'a>) -> Option<usize> {
        if let Some(&idx) = record
            .isbns
            .iter()
            .find_map(|isbn| self.primary_isbns.get(isbn))
        {
            return Some(idx);
        }

        let mut best: Option<(usize, FuzzyScore)> = None;
        for (idx, cluster) in self.clusters.iter().enumerate() {
            let Some(lead) = cluster.primary.first() else {
                continue;
            };
            if let Some(score) = self.qualifying_score(record, lead)
                && best.is_none_or(|(_, b)| score.combined() > b.combined())
            {
                best = Some((idx, score));
            }
        }
        best.map(|(idx, _)| idx)
    }

    /// Highest combined score among unclaimed groups whose best member clears
    /// the threshold on both title and author. Earlier groups win ties, which
    /// puts sources in enumeration order and then input order.
    fn best_fuzzy_candidate(&self, record: &KeyedRecord<'a>) -> Option<(GroupId, FuzzyScore)> {
        if !record.has_text_keys() {
            return None;
        }

        let mut best: Option<(GroupId, FuzzyScore)> = None;
        for group in self.pool.unclaimed() {
            let group_score = group
                .members
                .iter()
                .filter_map(|member| self.qualifying_score(record, member))
                .fold(None, |acc: Option<FuzzyScore>, s| match acc {
                    Some(a) if a.combined() >= s.combined() => Some(a),
                    _ => Some(s),
                });

            if let Some(score) = group_score
                && best.is_none_or(|(_, b)| score.combined() > b.combined())
            {
                best = Some((group.id, score));
            }
        }
        best
    }

    fn qualifying_score(&self, a: &KeyedRecord<'_>, b: &KeyedRecord<'_>) -> Option<FuzzyScore> {
        let score = FuzzyScore {
            title: similarity(&a.title_key, &b.title_key),
            author: similarity(&a.author_key, &b.author_key),
        };
        (score.min() >= self.options.threshold).then_some(score)
    }
}

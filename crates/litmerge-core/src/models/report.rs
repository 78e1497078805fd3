use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::source::SourceTag;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceStats {
    pub source: SourceTag,
    pub total_entries: usize,
    pub matched: usize,
    pub unmatched: usize,
    /// matched / total, 0.0 for an empty source.
    pub match_rate: f64,
    /// Entries loaded but dropped before matching. Counted in the total and
    /// as unmatched.
    #[serde(default, skip_serializing_if = "is_zero")]
    pub excluded: usize,
}

fn is_zero(n: &usize) -> bool {
    *n == 0
}

impl SourceStats {
    pub fn new(source: SourceTag, total_entries: usize, matched: usize) -> Self {
        let match_rate = if total_entries == 0 {
            0.0
        } else {
            matched as f64 / total_entries as f64
        };
        Self {
            source,
            total_entries,
            matched,
            unmatched: total_entries.saturating_sub(matched),
            match_rate,
            excluded: 0,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergedTotals {
    pub total_unique_books: usize,
    pub books_with_awards: usize,
    pub books_with_reception_data: usize,
    pub books_with_commercial_data: usize,
    pub books_with_multiple_sources: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataQuality {
    pub missing_title: usize,
    pub missing_author: usize,
    pub missing_year: usize,
    pub books_with_isbn: usize,
    pub books_with_ratings: usize,
    pub award_winning_books: usize,
    pub malformed_identifiers: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MergeReport {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_date: Option<DateTime<Utc>>,
    pub similarity_threshold: f64,
    pub source_datasets: Vec<SourceStats>,
    pub merged_dataset: MergedTotals,
    pub data_quality: DataQuality,
}

impl MergeReport {
    pub fn source(&self, tag: SourceTag) -> Option<&SourceStats> {
        self.source_datasets.iter().find(|s| s.source == tag)
    }

    /// Fold entries filtered out before the pass back into a source's totals,
    /// so the table reflects everything that was loaded.
    pub fn record_excluded(&mut self, tag: SourceTag, count: usize) {
        if count == 0 {
            return;
        }
        if let Some(stats) = self.source_datasets.iter_mut().find(|s| s.source == tag) {
            let excluded = stats.excluded + count;
            *stats = SourceStats {
                excluded,
                ..SourceStats::new(tag, stats.total_entries + count, stats.matched)
            };
        }
    }
}

impl fmt::Display for MergeReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rule = "=".repeat(70);
        writeln!(f, "MERGE STATISTICS:")?;
        writeln!(f, "{rule}")?;
        writeln!(
            f,
            "{:<20} {:<10} {:<10} {:<10} {:<10}",
            "Source", "Total", "Matched", "Unmatched", "Match Rate"
        )?;
        writeln!(f, "{}", "-".repeat(70))?;
        for stats in &self.source_datasets {
            let rate = format!("{:.1}%", stats.match_rate * 100.0);
            writeln!(
                f,
                "{:<20} {:<10} {:<10} {:<10} {:<10}",
                stats.source.as_str(),
                stats.total_entries,
                stats.matched,
                stats.unmatched,
                rate
            )?;
        }
        writeln!(f, "{rule}")?;

        let totals = &self.merged_dataset;
        writeln!(f)?;
        writeln!(f, "MERGED DATASET:")?;
        writeln!(f, "   Total unique books: {}", totals.total_unique_books)?;
        writeln!(f, "   Books with awards: {}", totals.books_with_awards)?;
        writeln!(f, "   Books with reception data: {}", totals.books_with_reception_data)?;
        writeln!(f, "   Books on bestseller list: {}", totals.books_with_commercial_data)?;
        writeln!(f, "   Books from multiple sources: {}", totals.books_with_multiple_sources)?;

        let quality = &self.data_quality;
        writeln!(f)?;
        writeln!(f, "DATA QUALITY:")?;
        writeln!(f, "   Missing title: {}", quality.missing_title)?;
        writeln!(f, "   Missing author: {}", quality.missing_author)?;
        writeln!(f, "   Missing year: {}", quality.missing_year)?;
        write!(f, "   Malformed identifiers skipped: {}", quality.malformed_identifiers)
    }
}

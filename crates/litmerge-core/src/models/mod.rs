pub mod award;
pub mod merged;
pub mod raw;
pub mod report;
pub mod source;

pub use award::{AwardEntry, AwardStatus};
pub use merged::{
    CommercialMetrics, DatasetMetadata, ExternalIds, FuzzyScore, MatchMethod, MergedBook,
    MergedDataset, ReceptionMetrics, UnmatchedCollection, UnmatchedMetadata,
};
pub use raw::{AwardListing, BestsellerEntry, BibliographicBook, BooksEnvelope, ReceptionBook};
pub use report::{DataQuality, MergeReport, MergedTotals, SourceStats};
pub use source::{
    AwardAttributes, BestsellerAttributes, BibliographicAttributes, ReceptionAttributes,
    SourceAttributes, SourceCollections, SourceRecord, SourceTag,
};

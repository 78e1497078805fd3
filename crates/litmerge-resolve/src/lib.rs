//! Litmerge resolve: entity resolution and record merging for book records.
//!
//! One primary source drives matching; every other source is indexed by
//! canonical ISBN and offered to the primary records first by identifier,
//! then by fuzzy title and author similarity. [`Resolver`] runs a full pass.

pub mod engine;
pub mod error;
pub mod identifiers;
pub mod index;
pub mod ingest;
pub mod matcher;
pub mod merge;
pub mod report;
pub mod similarity;
pub mod text;

pub use engine::{DEFAULT_THRESHOLD, MergeOutcome, ResolveOptions, Resolver};
pub use error::{ResolveError, Result};
pub use identifiers::{CanonicalIsbn, Isbn, normalize_identifier};
pub use merge::{Field, merge_cluster};
pub use similarity::similarity;
pub use text::normalize_text;

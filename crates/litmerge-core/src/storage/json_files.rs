use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::{LitmergeError, Result};
use crate::models::{
    AwardListing, BestsellerEntry, BibliographicBook, BooksEnvelope, MergeReport, MergedDataset,
    ReceptionBook, SourceRecord, UnmatchedCollection,
};

pub const MERGED_FILE: &str = "merged_books.json";
pub const REPORT_FILE: &str = "merge_report.json";

/// Award files are bare JSON arrays of listings.
pub fn load_award_listings(path: &Path) -> Result<Vec<SourceRecord>> {
    let listings: Vec<AwardListing> = read_json(path)?;
    Ok(listings.into_iter().map(SourceRecord::from).collect())
}

pub fn load_bibliographic_books(path: &Path) -> Result<Vec<SourceRecord>> {
    load_envelope::<BibliographicBook>(path)
}

pub fn load_reception_books(path: &Path) -> Result<Vec<SourceRecord>> {
    load_envelope::<ReceptionBook>(path)
}

pub fn load_bestseller_entries(path: &Path) -> Result<Vec<SourceRecord>> {
    load_envelope::<BestsellerEntry>(path)
}

fn load_envelope<T>(path: &Path) -> Result<Vec<SourceRecord>>
where
    T: DeserializeOwned + Into<SourceRecord>,
{
    let envelope: BooksEnvelope<T> = read_json(path)?;
    Ok(envelope.books.into_iter().map(Into::into).collect())
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    if !path.exists() {
        return Err(LitmergeError::InputNotFound(path.display().to_string()));
    }
    let contents = fs::read_to_string(path)?;
    serde_json::from_str(&contents).map_err(|e| LitmergeError::InvalidInput {
        file: path.display().to_string(),
        message: e.to_string(),
    })
}

/// Write any serializable artifact, creating parent directories.
pub fn save_json<T: Serialize>(path: &Path, value: &T, pretty: bool) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let json = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    fs::write(path, json)?;
    Ok(())
}

pub fn unmatched_file_name(collection: &UnmatchedCollection) -> String {
    format!("unmatched_{}.json", collection.metadata.source)
}

/// Persist the merged dataset, the non-empty unmatched sets, and the report.
/// Returns the paths written, in that order.
pub fn save_artifacts(
    output_dir: &Path,
    dataset: &MergedDataset,
    unmatched: &[UnmatchedCollection],
    report: &MergeReport,
    pretty: bool,
) -> Result<Vec<PathBuf>> {
    let mut written = Vec::new();

    let merged_path = output_dir.join(MERGED_FILE);
    save_json(&merged_path, dataset, pretty)?;
    written.push(merged_path);

    for collection in unmatched.iter().filter(|c| !c.is_empty()) {
        let path = output_dir.join(unmatched_file_name(collection));
        save_json(&path, collection, pretty)?;
        written.push(path);
    }

    let report_path = output_dir.join(REPORT_FILE);
    save_json(&report_path, report, pretty)?;
    written.push(report_path);

    Ok(written)
}

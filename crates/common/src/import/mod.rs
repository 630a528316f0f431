//! JSON import pipeline
//!
//! Converts a flat JSON document (top-level `papers` array, nested
//! `journal_info` sub-object per record) into paper rows. The whole batch
//! lands in one transaction: either every record is written or none are.
//! Upserting by id leaves star_rating and notes alone, so re-running an
//! import never erases a user's annotations.

use crate::db::models::PaperActiveModel;
use crate::db::Repository;
use crate::errors::Result;
use sea_orm::Set;
use serde::Deserialize;
use std::path::Path;
use tracing::info;

/// Top-level import document
#[derive(Debug, Default, Deserialize)]
pub struct ImportDocument {
    #[serde(default)]
    pub papers: Vec<PaperRecord>,
}

/// One paper as it appears in the source document
#[derive(Debug, Deserialize)]
pub struct PaperRecord {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub authors: Option<Vec<String>>,
    pub year: Option<i32>,
    pub venue: Option<String>,
    #[serde(rename = "abstract")]
    pub abstract_text: Option<String>,
    pub institution: Option<String>,
    #[serde(default)]
    pub citations: Option<i32>,
    pub bibtex: Option<String>,
    #[serde(default)]
    pub key_contributions: Option<Vec<String>>,
    #[serde(default)]
    pub evaluation_method: Option<serde_json::Map<String, serde_json::Value>>,
    #[serde(default)]
    pub trust_dimensions: Option<serde_json::Map<String, serde_json::Value>>,
    #[serde(default)]
    pub journal_info: Option<JournalInfoRecord>,
}

/// Nested journal sub-object, flattened into columns on write
#[derive(Debug, Default, Deserialize)]
pub struct JournalInfoRecord {
    pub ranking: Option<String>,
    pub impact_factor: Option<f64>,
    pub impact_factor_label: Option<String>,
    pub publisher: Option<String>,
    pub access_url: Option<String>,
    pub doi: Option<String>,
}

/// Import every record of the document, all-or-nothing.
///
/// Returns the number of records written.
pub async fn import_document(repo: &Repository, document: &ImportDocument) -> Result<usize> {
    let now = chrono::Utc::now().naive_utc();

    let rows = document
        .papers
        .iter()
        .map(|record| to_active_model(record, now))
        .collect::<Result<Vec<_>>>()?;

    let count = repo.upsert_papers(rows).await?;

    info!(count, "Imported papers");

    Ok(count)
}

/// Read and parse a JSON source file, then import it
pub async fn import_from_file(repo: &Repository, path: impl AsRef<Path>) -> Result<usize> {
    let raw = tokio::fs::read_to_string(path.as_ref()).await?;
    let document: ImportDocument = serde_json::from_str(&raw)?;

    import_document(repo, &document).await
}

/// Serialize a record's nested fields and lay it out as a full row.
///
/// Absent nested fields are stored as their empty-container form so reads
/// always decode to something iterable. star_rating starts at 0 (unrated);
/// both it and notes are skipped by the upsert's conflict clause.
fn to_active_model(record: &PaperRecord, now: sea_orm::prelude::DateTime) -> Result<PaperActiveModel> {
    let journal = record.journal_info.as_ref();

    Ok(PaperActiveModel {
        id: Set(record.id.clone()),
        title: Set(record.title.clone()),
        authors: Set(Some(serde_json::to_string(
            record.authors.as_deref().unwrap_or_default(),
        )?)),
        year: Set(record.year),
        venue: Set(record.venue.clone()),
        abstract_text: Set(record.abstract_text.clone()),
        institution: Set(record.institution.clone()),
        citations: Set(Some(record.citations.unwrap_or(0))),
        ranking: Set(journal.and_then(|j| j.ranking.clone())),
        impact_factor: Set(journal.and_then(|j| j.impact_factor)),
        impact_factor_label: Set(journal.and_then(|j| j.impact_factor_label.clone())),
        publisher: Set(journal.and_then(|j| j.publisher.clone())),
        access_url: Set(journal.and_then(|j| j.access_url.clone())),
        doi: Set(journal.and_then(|j| j.doi.clone())),
        bibtex: Set(record.bibtex.clone()),
        key_contributions: Set(Some(serde_json::to_string(
            record.key_contributions.as_deref().unwrap_or_default(),
        )?)),
        evaluation_method: Set(Some(serde_json::to_string(
            record
                .evaluation_method
                .as_ref()
                .unwrap_or(&serde_json::Map::new()),
        )?)),
        trust_dimensions: Set(Some(serde_json::to_string(
            record
                .trust_dimensions
                .as_ref()
                .unwrap_or(&serde_json::Map::new()),
        )?)),
        star_rating: Set(Some(0)),
        notes: Set(None),
        created_at: Set(Some(now)),
        updated_at: Set(Some(now)),
    })
}

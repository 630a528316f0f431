//! Paper entity
//!
//! Flat row shape plus the read-side view with nested fields decoded.
//! Nested data (authors, key contributions, evaluation method, trust
//! dimensions) lives in JSON text columns; absent or malformed blobs
//! always decode to the empty container, never null.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "papers")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    #[sea_orm(column_type = "Text")]
    pub title: String,

    /// JSON array of author names, ordered
    #[sea_orm(column_type = "Text", nullable)]
    pub authors: Option<String>,

    pub year: Option<i32>,

    #[sea_orm(column_type = "Text", nullable)]
    pub venue: Option<String>,

    #[sea_orm(column_name = "abstract", column_type = "Text", nullable)]
    pub abstract_text: Option<String>,

    #[sea_orm(column_type = "Text", nullable)]
    pub institution: Option<String>,

    pub citations: Option<i32>,

    #[sea_orm(column_type = "Text", nullable)]
    pub ranking: Option<String>,

    pub impact_factor: Option<f64>,

    #[sea_orm(column_type = "Text", nullable)]
    pub impact_factor_label: Option<String>,

    #[sea_orm(column_type = "Text", nullable)]
    pub publisher: Option<String>,

    #[sea_orm(column_type = "Text", nullable)]
    pub access_url: Option<String>,

    #[sea_orm(column_type = "Text", nullable)]
    pub doi: Option<String>,

    #[sea_orm(column_type = "Text", nullable)]
    pub bibtex: Option<String>,

    /// JSON array of contribution summaries, ordered
    #[sea_orm(column_type = "Text", nullable)]
    pub key_contributions: Option<String>,

    /// JSON object describing the evaluation method
    #[sea_orm(column_type = "Text", nullable)]
    pub evaluation_method: Option<String>,

    /// JSON object; non-empty marks membership in the trust-literature set
    #[sea_orm(column_type = "Text", nullable)]
    pub trust_dimensions: Option<String>,

    /// 0..=5, 0 means not yet rated
    pub star_rating: Option<i32>,

    #[sea_orm(column_type = "Text", nullable)]
    pub notes: Option<String>,

    pub created_at: Option<DateTime>,

    pub updated_at: Option<DateTime>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::pdf_file::Entity")]
    PdfFiles,
}

impl Related<super::pdf_file::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PdfFiles.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Denormalized journal sub-object assembled at read time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JournalInfo {
    pub ranking: Option<String>,
    pub impact_factor: Option<f64>,
    pub impact_factor_label: Option<String>,
    pub publisher: Option<String>,
    pub access_url: Option<String>,
    pub doi: Option<String>,
}

/// Fully reconstructed paper as served to the presentation layer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaperView {
    pub id: String,
    pub title: String,
    pub authors: Vec<String>,
    pub year: Option<i32>,
    pub venue: Option<String>,
    #[serde(rename = "abstract")]
    pub abstract_text: Option<String>,
    pub institution: Option<String>,
    pub citations: i32,
    pub bibtex: Option<String>,
    pub key_contributions: Vec<String>,
    pub evaluation_method: serde_json::Map<String, serde_json::Value>,
    pub trust_dimensions: serde_json::Map<String, serde_json::Value>,
    pub journal_info: JournalInfo,
    pub star_rating: i32,
    pub notes: String,
    pub created_at: Option<DateTime>,
    pub updated_at: Option<DateTime>,
}

impl From<Model> for PaperView {
    fn from(row: Model) -> Self {
        Self {
            journal_info: JournalInfo {
                ranking: row.ranking,
                impact_factor: row.impact_factor,
                impact_factor_label: row.impact_factor_label,
                publisher: row.publisher,
                access_url: row.access_url,
                doi: row.doi,
            },
            id: row.id,
            title: row.title,
            authors: decode_list(row.authors.as_deref()),
            year: row.year,
            venue: row.venue,
            abstract_text: row.abstract_text,
            institution: row.institution,
            citations: row.citations.unwrap_or(0),
            bibtex: row.bibtex,
            key_contributions: decode_list(row.key_contributions.as_deref()),
            evaluation_method: decode_map(row.evaluation_method.as_deref()),
            trust_dimensions: decode_map(row.trust_dimensions.as_deref()),
            star_rating: row.star_rating.unwrap_or(0),
            notes: row.notes.unwrap_or_default(),
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

fn decode_list(raw: Option<&str>) -> Vec<String> {
    raw.and_then(|s| serde_json::from_str(s).ok())
        .unwrap_or_default()
}

fn decode_map(raw: Option<&str>) -> serde_json::Map<String, serde_json::Value> {
    raw.and_then(|s| serde_json::from_str(s).ok())
        .unwrap_or_default()
}

//! Repository pattern for database operations
//!
//! Provides a clean interface for all data access operations
//! with proper error handling and transaction support.

use crate::db::models::*;
use crate::db::DbPool;
use crate::errors::{AppError, Result};
use crate::TRUST_LITERATURE_PROJECT;
use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set, TransactionError, TransactionTrait,
};
use serde::{Deserialize, Serialize};

/// Ranking statistics over the full paper table.
///
/// The tallies are independent substring matches, not a partition:
/// a ranking label may count toward more than one bucket.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankingStats {
    pub total: u64,
    pub q1: u64,
    pub q2: u64,
    pub q3: u64,
    pub ei: u64,
}

/// Per-paper star rating and note projection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Mark {
    pub id: String,
    pub star_rating: i32,
    pub notes: String,
    pub updated_at: Option<sea_orm::prelude::DateTime>,
}

impl From<Paper> for Mark {
    fn from(row: Paper) -> Self {
        Self {
            id: row.id,
            star_rating: row.star_rating.unwrap_or(0),
            notes: row.notes.unwrap_or_default(),
            updated_at: row.updated_at,
        }
    }
}

/// Partial update of a paper's user-owned fields
#[derive(Debug, Clone, Default)]
pub struct MarkUpdate {
    pub star_rating: Option<i32>,
    pub notes: Option<String>,
}

impl MarkUpdate {
    fn is_empty(&self) -> bool {
        self.star_rating.is_none() && self.notes.is_none()
    }
}

/// Repository for data access operations
#[derive(Clone)]
pub struct Repository {
    pool: DbPool,
}

impl Repository {
    /// Create a new repository with the given connection pool
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    fn conn(&self) -> &DatabaseConnection {
        self.pool.conn()
    }

    // ========================================================================
    // Health Check
    // ========================================================================

    /// Ping the database
    pub async fn ping(&self) -> Result<()> {
        self.pool.ping().await
    }

    // ========================================================================
    // Paper Operations
    // ========================================================================

    /// List papers, fully reconstructed, ordered year DESC then
    /// impact_factor DESC. SQLite sorts NULLs last under DESC, which keeps
    /// rows with missing years or impact factors at the tail.
    ///
    /// The trust-literature project restricts the result to rows whose
    /// trust_dimensions blob is non-empty; any other filter value returns
    /// the full set.
    pub async fn list_papers(&self, project: Option<&str>) -> Result<Vec<PaperView>> {
        let mut query = PaperEntity::find();

        if project == Some(TRUST_LITERATURE_PROJECT) {
            query = query
                .filter(PaperColumn::TrustDimensions.is_not_null())
                .filter(PaperColumn::TrustDimensions.ne("{}"))
                .filter(PaperColumn::TrustDimensions.ne(""));
        }

        let rows = query
            .order_by_desc(PaperColumn::Year)
            .order_by_desc(PaperColumn::ImpactFactor)
            .all(self.conn())
            .await?;

        Ok(rows.into_iter().map(PaperView::from).collect())
    }

    /// Count all paper rows
    pub async fn count_papers(&self) -> Result<u64> {
        PaperEntity::find()
            .count(self.conn())
            .await
            .map_err(Into::into)
    }

    /// Compute ranking statistics over the full table (never project-filtered)
    pub async fn compute_stats(&self) -> Result<RankingStats> {
        let rankings: Vec<Option<String>> = PaperEntity::find()
            .select_only()
            .column(PaperColumn::Ranking)
            .into_tuple()
            .all(self.conn())
            .await?;

        let mut stats = RankingStats {
            total: rankings.len() as u64,
            ..RankingStats::default()
        };

        for ranking in rankings.iter().flatten() {
            if ranking_matches(ranking, &["Q1", "CCF-A"]) {
                stats.q1 += 1;
            }
            if ranking_matches(ranking, &["Q2", "CCF-B"]) {
                stats.q2 += 1;
            }
            if ranking_matches(ranking, &["Q3", "CCF-C"]) {
                stats.q3 += 1;
            }
            if ranking_matches(ranking, &["EI"]) {
                stats.ei += 1;
            }
        }

        Ok(stats)
    }

    /// Bulk upsert of paper rows inside a single transaction.
    ///
    /// Conflicting ids overwrite every source column but leave the
    /// user-owned columns (star_rating, notes) and created_at untouched,
    /// so re-importing never discards annotations.
    pub async fn upsert_papers(&self, records: Vec<PaperActiveModel>) -> Result<usize> {
        if records.is_empty() {
            return Ok(0);
        }

        let count = records.len();

        let conflict = OnConflict::column(PaperColumn::Id)
            .update_columns([
                PaperColumn::Title,
                PaperColumn::Authors,
                PaperColumn::Year,
                PaperColumn::Venue,
                PaperColumn::AbstractText,
                PaperColumn::Institution,
                PaperColumn::Citations,
                PaperColumn::Ranking,
                PaperColumn::ImpactFactor,
                PaperColumn::ImpactFactorLabel,
                PaperColumn::Publisher,
                PaperColumn::AccessUrl,
                PaperColumn::Doi,
                PaperColumn::Bibtex,
                PaperColumn::KeyContributions,
                PaperColumn::EvaluationMethod,
                PaperColumn::TrustDimensions,
                PaperColumn::UpdatedAt,
            ])
            .to_owned();

        self.conn()
            .transaction::<_, usize, AppError>(|txn| {
                Box::pin(async move {
                    // exec_without_returning: the TEXT primary key has no
                    // meaningful last-insert id
                    PaperEntity::insert_many(records)
                        .on_conflict(conflict)
                        .exec_without_returning(txn)
                        .await?;

                    Ok(count)
                })
            })
            .await
            .map_err(|e| match e {
                TransactionError::Connection(err) => AppError::Database(err),
                TransactionError::Transaction(err) => err,
            })
    }

    // ========================================================================
    // Mark Operations
    // ========================================================================

    /// Get a paper's mark projection
    pub async fn get_mark(&self, id: &str) -> Result<Mark> {
        let paper = PaperEntity::find_by_id(id)
            .one(self.conn())
            .await?
            .ok_or_else(|| AppError::PaperNotFound { id: id.to_string() })?;

        Ok(Mark::from(paper))
    }

    /// Update a paper's star rating and/or notes, stamping updated_at.
    ///
    /// Validation runs before any write: an out-of-range rating or an empty
    /// update never reaches storage. Unknown ids fail with PaperNotFound
    /// instead of silently updating zero rows, so a mark write can never
    /// create a paper.
    pub async fn update_mark(&self, id: &str, update: MarkUpdate) -> Result<Mark> {
        if let Some(rating) = update.star_rating {
            if !(0..=5).contains(&rating) {
                return Err(AppError::Validation {
                    message: "star_rating must be between 0 and 5".to_string(),
                    field: Some("star_rating".to_string()),
                });
            }
        }

        if update.is_empty() {
            return Err(AppError::Validation {
                message: "no updatable fields provided".to_string(),
                field: None,
            });
        }

        let paper = PaperEntity::find_by_id(id)
            .one(self.conn())
            .await?
            .ok_or_else(|| AppError::PaperNotFound { id: id.to_string() })?;

        let mut active: PaperActiveModel = paper.into();

        if let Some(rating) = update.star_rating {
            active.star_rating = Set(Some(rating));
        }

        if let Some(notes) = update.notes {
            active.notes = Set(Some(notes));
        }

        active.updated_at = Set(Some(chrono::Utc::now().naive_utc()));

        let updated = active.update(self.conn()).await?;

        Ok(Mark::from(updated))
    }
}

/// Case-insensitive substring match against any of the given needles
fn ranking_matches(ranking: &str, needles: &[&str]) -> bool {
    let haystack = ranking.to_uppercase();
    needles.iter().any(|needle| haystack.contains(needle))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DatabaseConfig;

    async fn test_repo() -> Repository {
        let config = DatabaseConfig {
            url: "sqlite::memory:".to_string(),
            ..DatabaseConfig::default()
        };
        let pool = DbPool::new(&config).await.unwrap();
        pool.init_schema().await.unwrap();
        pool.seed_projects().await.unwrap();
        Repository::new(pool)
    }

    // insert_many needs every model to set the same column set, so the
    // helper fills every column explicitly
    fn paper_row(id: &str) -> PaperActiveModel {
        let now = chrono::Utc::now().naive_utc();
        PaperActiveModel {
            id: Set(id.to_string()),
            title: Set(format!("Paper {}", id)),
            authors: Set(None),
            year: Set(None),
            venue: Set(None),
            abstract_text: Set(None),
            institution: Set(None),
            citations: Set(Some(0)),
            ranking: Set(None),
            impact_factor: Set(None),
            impact_factor_label: Set(None),
            publisher: Set(None),
            access_url: Set(None),
            doi: Set(None),
            bibtex: Set(None),
            key_contributions: Set(None),
            evaluation_method: Set(None),
            trust_dimensions: Set(None),
            star_rating: Set(Some(0)),
            notes: Set(None),
            created_at: Set(Some(now)),
            updated_at: Set(Some(now)),
        }
    }

    #[tokio::test]
    async fn test_mark_round_trip_for_all_valid_ratings() {
        let repo = test_repo().await;
        repo.upsert_papers(vec![paper_row("p1")]).await.unwrap();

        for rating in 0..=5 {
            let mark = repo
                .update_mark(
                    "p1",
                    MarkUpdate {
                        star_rating: Some(rating),
                        notes: None,
                    },
                )
                .await
                .unwrap();
            assert_eq!(mark.star_rating, rating);

            let fetched = repo.get_mark("p1").await.unwrap();
            assert_eq!(fetched.star_rating, rating);
        }
    }

    #[tokio::test]
    async fn test_out_of_range_rating_rejected_without_mutation() {
        let repo = test_repo().await;
        repo.upsert_papers(vec![paper_row("p1")]).await.unwrap();

        repo.update_mark(
            "p1",
            MarkUpdate {
                star_rating: Some(3),
                notes: Some("keep me".to_string()),
            },
        )
        .await
        .unwrap();

        for bad in [-1, 6, 42] {
            let err = repo
                .update_mark(
                    "p1",
                    MarkUpdate {
                        star_rating: Some(bad),
                        notes: None,
                    },
                )
                .await
                .unwrap_err();
            assert!(matches!(err, AppError::Validation { .. }));
        }

        let mark = repo.get_mark("p1").await.unwrap();
        assert_eq!(mark.star_rating, 3);
        assert_eq!(mark.notes, "keep me");
    }

    #[tokio::test]
    async fn test_empty_update_rejected() {
        let repo = test_repo().await;
        repo.upsert_papers(vec![paper_row("p1")]).await.unwrap();

        let err = repo
            .update_mark("p1", MarkUpdate::default())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation { .. }));
    }

    #[tokio::test]
    async fn test_update_unknown_id_fails_and_creates_nothing() {
        let repo = test_repo().await;

        let err = repo
            .update_mark(
                "ghost",
                MarkUpdate {
                    star_rating: Some(3),
                    notes: None,
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::PaperNotFound { .. }));
        assert_eq!(repo.count_papers().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_get_mark_unknown_id_is_not_found() {
        let repo = test_repo().await;
        let err = repo.get_mark("ghost").await.unwrap_err();
        assert!(matches!(err, AppError::PaperNotFound { .. }));
    }

    #[tokio::test]
    async fn test_notes_update_leaves_rating_alone() {
        let repo = test_repo().await;
        repo.upsert_papers(vec![paper_row("p1")]).await.unwrap();

        repo.update_mark(
            "p1",
            MarkUpdate {
                star_rating: Some(4),
                notes: None,
            },
        )
        .await
        .unwrap();

        let mark = repo
            .update_mark(
                "p1",
                MarkUpdate {
                    star_rating: None,
                    notes: Some("solid evaluation section".to_string()),
                },
            )
            .await
            .unwrap();

        assert_eq!(mark.star_rating, 4);
        assert_eq!(mark.notes, "solid evaluation section");
    }

    #[tokio::test]
    async fn test_trust_filter_excludes_empty_dimensions() {
        let repo = test_repo().await;

        let mut tagged = paper_row("tagged");
        tagged.trust_dimensions = Set(Some(r#"{"transparency":1}"#.to_string()));
        let mut untagged = paper_row("untagged");
        untagged.trust_dimensions = Set(Some("{}".to_string()));
        let bare = paper_row("bare");

        repo.upsert_papers(vec![tagged, untagged, bare])
            .await
            .unwrap();

        let trusted = repo.list_papers(Some("trust-literature")).await.unwrap();
        assert_eq!(trusted.len(), 1);
        assert_eq!(trusted[0].id, "tagged");

        let all = repo.list_papers(None).await.unwrap();
        assert_eq!(all.len(), 3);
    }

    #[tokio::test]
    async fn test_ordering_year_then_impact_factor_nulls_last() {
        let repo = test_repo().await;

        let mut a = paper_row("a");
        a.year = Set(Some(2023));
        a.impact_factor = Set(Some(2.0));
        let mut b = paper_row("b");
        b.year = Set(Some(2023));
        b.impact_factor = Set(Some(8.0));
        let mut c = paper_row("c");
        c.year = Set(Some(2024));
        c.impact_factor = Set(None);
        let mut d = paper_row("d");
        d.year = Set(Some(2023));
        d.impact_factor = Set(None);
        let e = paper_row("e"); // no year at all

        repo.upsert_papers(vec![a, b, c, d, e]).await.unwrap();

        let papers = repo.list_papers(None).await.unwrap();
        let ids: Vec<&str> = papers.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["c", "b", "a", "d", "e"]);
    }

    #[tokio::test]
    async fn test_stats_tallies_overlap_and_case() {
        let repo = test_repo().await;

        let rankings = ["SCI Q1", "CCF-A", "SCI Q2"];
        let rows = rankings
            .iter()
            .enumerate()
            .map(|(i, r)| {
                let mut row = paper_row(&format!("p{}", i));
                row.ranking = Set(Some(r.to_string()));
                row
            })
            .collect();
        repo.upsert_papers(rows).await.unwrap();

        let stats = repo.compute_stats().await.unwrap();
        assert_eq!(stats.total, 3);
        assert_eq!(stats.q1, 2);
        assert_eq!(stats.q2, 1);
        assert_eq!(stats.q3, 0);
        assert_eq!(stats.ei, 0);
    }

    #[tokio::test]
    async fn test_stats_never_project_filtered() {
        let repo = test_repo().await;

        let mut tagged = paper_row("tagged");
        tagged.ranking = Set(Some("SCI Q1".to_string()));
        tagged.trust_dimensions = Set(Some(r#"{"x":1}"#.to_string()));
        let mut untagged = paper_row("untagged");
        untagged.ranking = Set(Some("EI".to_string()));

        repo.upsert_papers(vec![tagged, untagged]).await.unwrap();

        let stats = repo.compute_stats().await.unwrap();
        assert_eq!(stats.total, 2);
        assert_eq!(stats.q1, 1);
        assert_eq!(stats.ei, 1);
    }

    #[test]
    fn test_ranking_matches_is_case_insensitive() {
        assert!(ranking_matches("sci q1", &["Q1", "CCF-A"]));
        assert!(ranking_matches("ccf-a", &["Q1", "CCF-A"]));
        assert!(!ranking_matches("SCI Q4", &["Q1", "CCF-A"]));
    }
}

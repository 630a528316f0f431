//! Paper listing handler

use axum::{
    extract::{Query, State},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::AppState;
use litshelf_common::{
    db::models::PaperView,
    db::{RankingStats, Repository},
    errors::Result,
    import,
};

#[derive(Debug, Deserialize)]
pub struct ListPapersParams {
    pub project: Option<String>,
}

#[derive(Serialize)]
pub struct ListPapersResponse {
    pub papers: Vec<PaperView>,
    pub stats: RankingStats,
    /// Present only when this request triggered the lazy first import
    #[serde(skip_serializing_if = "Option::is_none")]
    pub imported: Option<usize>,
}

/// List papers with ranking statistics.
///
/// The full filtered set is always returned: the presentation layer does all
/// further search/sort narrowing client-side. Stats are computed over the
/// whole table regardless of the project filter.
///
/// An empty store triggers one import attempt from the configured source;
/// a failed import is logged and the empty result served without error.
pub async fn list_papers(
    State(state): State<AppState>,
    Query(params): Query<ListPapersParams>,
) -> Result<Json<ListPapersResponse>> {
    let repo = Repository::new(state.db.clone());

    let mut imported = None;
    if repo.count_papers().await? == 0 {
        match import::import_from_file(&repo, &state.config.import.source_path).await {
            Ok(count) if count > 0 => {
                tracing::info!(count, "Seeded paper store from import source");
                imported = Some(count);
            }
            Ok(_) => {}
            Err(e) => {
                tracing::warn!(error = %e, "Lazy import failed, serving empty result");
            }
        }
    }

    let papers = repo.list_papers(params.project.as_deref()).await?;
    let stats = repo.compute_stats().await?;

    Ok(Json(ListPapersResponse {
        papers,
        stats,
        imported,
    }))
}

//! Star rating and notes handlers

use axum::{
    extract::{Query, State},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::AppState;
use litshelf_common::{
    db::{Mark, MarkUpdate, Repository},
    errors::{AppError, Result},
};

#[derive(Debug, Deserialize)]
pub struct MarkParams {
    pub id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateMarkRequest {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub star_rating: Option<i32>,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Serialize)]
pub struct UpdateMarkResponse {
    pub success: bool,
    pub data: Mark,
}

/// Get a paper's star rating and notes
pub async fn get_mark(
    State(state): State<AppState>,
    Query(params): Query<MarkParams>,
) -> Result<Json<Mark>> {
    let id = require_id(params.id)?;

    let repo = Repository::new(state.db.clone());
    let mark = repo.get_mark(&id).await?;

    Ok(Json(mark))
}

/// Update a paper's star rating and/or notes.
///
/// Range and empty-update validation happen in the store before any write;
/// an unknown id is a 404, never an upsert.
pub async fn update_mark(
    State(state): State<AppState>,
    Json(request): Json<UpdateMarkRequest>,
) -> Result<Json<UpdateMarkResponse>> {
    let id = require_id(request.id)?;

    let repo = Repository::new(state.db.clone());
    let mark = repo
        .update_mark(
            &id,
            MarkUpdate {
                star_rating: request.star_rating,
                notes: request.notes,
            },
        )
        .await?;

    tracing::info!(paper_id = %id, star_rating = mark.star_rating, "Paper mark updated");

    Ok(Json(UpdateMarkResponse {
        success: true,
        data: mark,
    }))
}

fn require_id(id: Option<String>) -> Result<String> {
    id.filter(|id| !id.trim().is_empty())
        .ok_or_else(|| AppError::MissingField {
            field: "id".to_string(),
        })
}

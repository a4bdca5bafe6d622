use axum::extract::State;
use axum::Json;
use std::sync::Arc;

use hostelhub_shared::errors::AppResult;
use hostelhub_shared::types::ApiResponse;

use crate::models::CommitteeMember;
use crate::AppState;

// --- GET /public/committee ---

pub async fn committee(State(state): State<Arc<AppState>>) -> AppResult<Json<ApiResponse<Vec<CommitteeMember>>>> {
    let members = state.store.list_committee()?;
    Ok(Json(ApiResponse::ok(members)))
}

use axum::extract::{Multipart, State};
use axum::http::HeaderMap;
use axum::Json;
use std::sync::Arc;

use hostelhub_shared::errors::{AppError, AppResult, ErrorCode};
use hostelhub_shared::middleware::StudentUser;
use hostelhub_shared::types::ApiResponse;

use crate::models::StudentProfile;
use crate::routes::form::ProfileForm;
use crate::services::photo_storage::public_base_url;
use crate::AppState;

// --- GET /api/student/profile ---

pub async fn get_my_profile(
    user: StudentUser,
    State(state): State<Arc<AppState>>,
) -> AppResult<Json<ApiResponse<StudentProfile>>> {
    let profile = state
        .store
        .student_profile(user.id)?
        .ok_or_else(|| AppError::new(ErrorCode::ProfileNotFound, "student profile not found"))?;
    Ok(Json(ApiResponse::ok(profile)))
}

// --- POST /api/student/profile (multipart) ---

/// Admin bookkeeping is never read from the form; only role transitions write it.
pub async fn save_my_profile(
    user: StudentUser,
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    multipart: Multipart,
) -> AppResult<Json<ApiResponse<StudentProfile>>> {
    let mut form = ProfileForm::read(multipart, &state.photos).await?;
    let fields = form.student_fields()?;

    let photo_url = match form.take_photo() {
        Some(photo) => Some(state.photos.save(photo, &public_base_url(&headers)).await?),
        None => None,
    };

    let profile = state.store.upsert_student_profile(user.id, fields, photo_url)?;
    tracing::info!(user_id = %user.id, profile_id = %profile.id, "student profile saved");
    Ok(Json(ApiResponse::ok_with_message(profile, "profile saved successfully")))
}

use axum::extract::{Multipart, Path, State};
use axum::http::HeaderMap;
use axum::Json;
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;

use hostelhub_shared::errors::{AppError, AppResult, ErrorCode};
use hostelhub_shared::middleware::StaffUser;
use hostelhub_shared::types::{ApiResponse, Created};

use crate::models::{
    ActionChanges, ActionEntry, ActionStatus, ActionType, DisciplinaryAction, NewDisciplinaryAction,
    StaffProfile, StudentDetails,
};
use crate::routes::form::ProfileForm;
use crate::routes::ApiJson;
use crate::services::photo_storage::public_base_url;
use crate::AppState;

// --- Request types ---

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateActionRequest {
    pub student_profile_id: Option<Uuid>,
    pub action_type: Option<ActionType>,
    pub reason: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateActionRequest {
    pub reason: Option<String>,
    pub status: Option<ActionStatus>,
}

// --- GET /api/staff/profile ---

pub async fn get_my_profile(
    user: StaffUser,
    State(state): State<Arc<AppState>>,
) -> AppResult<Json<ApiResponse<StaffProfile>>> {
    let profile = state
        .store
        .staff_profile(user.id)?
        .ok_or_else(|| AppError::new(ErrorCode::ProfileNotFound, "staff profile not found"))?;
    Ok(Json(ApiResponse::ok(profile)))
}

// --- POST /api/staff/profile (multipart) ---

pub async fn save_my_profile(
    user: StaffUser,
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    multipart: Multipart,
) -> AppResult<Json<ApiResponse<StaffProfile>>> {
    let mut form = ProfileForm::read(multipart, &state.photos).await?;
    let fields = form.staff_fields()?;

    let photo_url = match form.take_photo() {
        Some(photo) => Some(state.photos.save(photo, &public_base_url(&headers)).await?),
        None => None,
    };

    let profile = state.store.upsert_staff_profile(user.id, fields, photo_url)?;
    tracing::info!(user_id = %user.id, profile_id = %profile.id, "staff profile saved");
    Ok(Json(ApiResponse::ok_with_message(profile, "profile saved successfully")))
}

// --- GET /api/staff/:studentProfileId/details ---

pub async fn student_details(
    _staff: StaffUser,
    State(state): State<Arc<AppState>>,
    Path(student_profile_id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<StudentDetails>>> {
    let details = state.store.student_details(student_profile_id)?;
    Ok(Json(ApiResponse::ok(details)))
}

// --- GET /api/staff/:studentProfileId/actions ---

pub async fn list_actions(
    _staff: StaffUser,
    State(state): State<Arc<AppState>>,
    Path(student_profile_id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<Vec<ActionEntry>>>> {
    let actions = state.store.actions_for_student(student_profile_id)?;
    Ok(Json(ApiResponse::ok(actions)))
}

// --- POST /api/staff/action ---

pub async fn create_action(
    staff: StaffUser,
    State(state): State<Arc<AppState>>,
    ApiJson(req): ApiJson<CreateActionRequest>,
) -> AppResult<Created<DisciplinaryAction>> {
    let reason = req.reason.map(|r| r.trim().to_string()).filter(|r| !r.is_empty());
    let (Some(student_profile_id), Some(action_type), Some(reason)) =
        (req.student_profile_id, req.action_type, reason)
    else {
        return Err(AppError::bad_request("studentProfileId, actionType and reason are required"));
    };

    let action = state.store.create_action(NewDisciplinaryAction {
        student_profile_id,
        issued_by_id: staff.id,
        action_type,
        reason,
    })?;

    tracing::info!(
        action_id = %action.id,
        student_profile_id = %student_profile_id,
        issued_by = %staff.id,
        action_type = %action.action_type,
        "disciplinary action recorded"
    );
    Ok(Created(ApiResponse::ok_with_message(action, "disciplinary action created")))
}

// --- PATCH /api/staff/action/:actionId ---

pub async fn update_action(
    staff: StaffUser,
    State(state): State<Arc<AppState>>,
    Path(action_id): Path<Uuid>,
    ApiJson(req): ApiJson<UpdateActionRequest>,
) -> AppResult<Json<ApiResponse<DisciplinaryAction>>> {
    let changes = ActionChanges {
        reason: req.reason.map(|r| r.trim().to_string()).filter(|r| !r.is_empty()),
        status: req.status,
    };
    if changes.is_empty() {
        return Err(AppError::bad_request("provide a reason or a status to update"));
    }

    let action = state.store.update_action(action_id, changes)?;
    tracing::info!(action_id = %action_id, updated_by = %staff.id, status = %action.status, "disciplinary action updated");
    Ok(Json(ApiResponse::ok_with_message(action, "disciplinary action updated")))
}

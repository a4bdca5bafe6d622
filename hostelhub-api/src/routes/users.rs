use axum::extract::{Path, Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

use hostelhub_shared::errors::{AppError, AppResult};
use hostelhub_shared::middleware::WardenUser;
use hostelhub_shared::types::{ApiResponse, Created};

use crate::models::{StudentListItem, User};
use crate::routes::auth::AccountRequest;
use crate::routes::ApiJson;
use crate::services::{auth_service, role_service};
use crate::AppState;

// --- Request / Response types ---

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromoteRequest {
    pub student_user_id: Option<Uuid>,
    pub new_role: Option<String>,
    pub admin_sub_role: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DemoteRequest {
    pub student_user_id: Option<Uuid>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateStaffRequest {
    #[serde(flatten)]
    #[validate]
    pub account: AccountRequest,
    pub role: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusRequest {
    pub is_active: bool,
}

#[derive(Debug, Default, Deserialize)]
pub struct StudentSearch {
    #[serde(default)]
    pub search: String,
}

#[derive(Debug, Serialize)]
pub struct UserEnvelope {
    pub user: User,
}

// --- POST /api/users/promote ---

pub async fn promote(
    warden: WardenUser,
    State(state): State<Arc<AppState>>,
    ApiJson(req): ApiJson<PromoteRequest>,
) -> AppResult<Json<ApiResponse<UserEnvelope>>> {
    let (Some(user_id), Some(new_role), Some(sub_role)) = (req.student_user_id, req.new_role, req.admin_sub_role)
    else {
        return Err(AppError::bad_request("studentUserId, newRole and adminSubRole are required"));
    };

    let user = role_service::promote(state.store.as_ref(), user_id, &new_role, &sub_role)?;
    tracing::info!(user_id = %user_id, by = %warden.id, role = %user.role, "promotion applied");
    Ok(Json(ApiResponse::ok_with_message(UserEnvelope { user }, "student promoted successfully")))
}

// --- POST /api/users/demote ---

pub async fn demote(
    warden: WardenUser,
    State(state): State<Arc<AppState>>,
    ApiJson(req): ApiJson<DemoteRequest>,
) -> AppResult<Json<ApiResponse<UserEnvelope>>> {
    let user_id = req
        .student_user_id
        .ok_or_else(|| AppError::bad_request("studentUserId is required"))?;

    let user = role_service::demote(state.store.as_ref(), user_id)?;
    tracing::info!(user_id = %user_id, by = %warden.id, "demotion applied");
    Ok(Json(ApiResponse::ok_with_message(UserEnvelope { user }, "student demoted successfully")))
}

// --- POST /api/users/create-student ---

pub async fn create_student(
    _warden: WardenUser,
    State(state): State<Arc<AppState>>,
    ApiJson(req): ApiJson<AccountRequest>,
) -> AppResult<Created<User>> {
    req.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;
    let user = auth_service::create_student_account(state.store.as_ref(), req.into())?;
    Ok(Created(ApiResponse::ok_with_message(user, "student account created")))
}

// --- POST /api/users/create-staff ---

pub async fn create_staff(
    _warden: WardenUser,
    State(state): State<Arc<AppState>>,
    ApiJson(req): ApiJson<CreateStaffRequest>,
) -> AppResult<Created<User>> {
    req.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;
    let user = auth_service::create_staff_account(state.store.as_ref(), req.account.into(), &req.role)?;
    Ok(Created(ApiResponse::ok_with_message(user, "staff account created")))
}

// --- GET /api/users/students?search= ---

pub async fn list_students(
    _warden: WardenUser,
    State(state): State<Arc<AppState>>,
    Query(params): Query<StudentSearch>,
) -> AppResult<Json<ApiResponse<Vec<StudentListItem>>>> {
    let students = state.store.list_students(&params.search)?;
    Ok(Json(ApiResponse::ok(students)))
}

// --- PATCH /api/users/:userId/status ---

pub async fn set_status(
    warden: WardenUser,
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<Uuid>,
    ApiJson(req): ApiJson<StatusRequest>,
) -> AppResult<Json<ApiResponse<User>>> {
    if user_id == warden.id && !req.is_active {
        return Err(AppError::bad_request("you cannot deactivate your own account"));
    }
    let user = state.store.set_user_active(user_id, req.is_active)?;
    tracing::info!(user_id = %user_id, by = %warden.id, is_active = req.is_active, "account status changed");
    Ok(Json(ApiResponse::ok(user)))
}

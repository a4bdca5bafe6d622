use axum::extract::State;
use axum::Json;
use serde::Deserialize;
use std::sync::Arc;
use validator::Validate;

use hostelhub_shared::errors::{AppError, AppResult};
use hostelhub_shared::middleware::{RegistrarUser, WardenUser};
use hostelhub_shared::types::{ApiResponse, Created};

use crate::models::{StaffProfileFields, StudentProfileFields, UserWithProfiles};
use crate::routes::{field_edit, parse_date, ApiJson};
use crate::services::auth_service::{self, AccountInput, LoginOutcome};
use crate::AppState;

// --- Request types ---

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AccountRequest {
    #[validate(length(min = 1, message = "first name is required"))]
    pub first_name: String,
    #[validate(length(min = 1, message = "last name is required"))]
    pub last_name: String,
    #[validate(email(message = "invalid email format"))]
    pub email: String,
    #[validate(length(min = 1, message = "password is required"))]
    pub password: String,
}

impl From<AccountRequest> for AccountInput {
    fn from(req: AccountRequest) -> Self {
        AccountInput {
            first_name: req.first_name,
            last_name: req.last_name,
            email: req.email,
            password: req.password,
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegisterStudentRequest {
    #[serde(flatten)]
    #[validate]
    pub account: AccountRequest,
    #[validate(length(min = 1))]
    pub roll_number: String,
    pub room_number: Option<String>,
    pub current_sem: Option<String>,
    pub sgpa: Option<f64>,
    pub cgpa: Option<f64>,
    #[validate(length(min = 1))]
    pub department: String,
    #[validate(length(min = 1))]
    pub school: String,
    #[validate(length(min = 1))]
    pub student_contact_number: String,
    #[validate(length(min = 1))]
    pub guardian_name: String,
    #[validate(length(min = 1))]
    pub guardian_contact: String,
    pub course_start_date: String,
    pub expected_course_end_date: String,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegisterStaffRequest {
    #[serde(flatten)]
    #[validate]
    pub account: AccountRequest,
    pub role: String,
    #[validate(length(min = 1))]
    pub staff_contact_number: String,
    #[validate(length(min = 1))]
    pub department: String,
    #[validate(length(min = 1))]
    pub job_title: String,
    pub office_location: Option<String>,
    pub description: Option<String>,
}

fn validate<T: Validate>(req: &T) -> AppResult<()> {
    req.validate()
        .map_err(|e| AppError::Validation(e.to_string()))
}

// --- POST /api/auth/login ---

pub async fn login(
    State(state): State<Arc<AppState>>,
    ApiJson(req): ApiJson<LoginRequest>,
) -> AppResult<Json<ApiResponse<LoginOutcome>>> {
    if req.email.trim().is_empty() || req.password.is_empty() {
        return Err(AppError::bad_request("email and password are required"));
    }

    let outcome = auth_service::login(
        state.store.as_ref(),
        &state.jwt,
        state.config.jwt_ttl_secs,
        &req.email,
        &req.password,
    )?;
    Ok(Json(ApiResponse::ok(outcome)))
}

// --- POST /api/auth/register/student ---

pub async fn register_student(
    registrar: RegistrarUser,
    State(state): State<Arc<AppState>>,
    ApiJson(req): ApiJson<RegisterStudentRequest>,
) -> AppResult<Created<UserWithProfiles>> {
    validate(&req)?;

    let fields = StudentProfileFields {
        roll_number: req.roll_number.trim().to_string(),
        room_number: field_edit(req.room_number.as_deref()),
        current_sem: field_edit(req.current_sem.as_deref()),
        sgpa: req.sgpa,
        cgpa: req.cgpa,
        department: req.department.trim().to_string(),
        school: req.school.trim().to_string(),
        student_contact_number: req.student_contact_number.trim().to_string(),
        guardian_name: req.guardian_name.trim().to_string(),
        guardian_contact: req.guardian_contact.trim().to_string(),
        course_start_date: parse_date("courseStartDate", &req.course_start_date)?,
        expected_course_end_date: parse_date("expectedCourseEndDate", &req.expected_course_end_date)?,
    };

    let registered = auth_service::register_student(state.store.as_ref(), req.account.into(), fields)?;
    tracing::debug!(registrar_id = %registrar.id, user_id = %registered.user.id, "student enrolled");
    Ok(Created(ApiResponse::ok_with_message(registered, "student registered successfully")))
}

// --- POST /api/auth/register/staff ---

pub async fn register_staff(
    _warden: WardenUser,
    State(state): State<Arc<AppState>>,
    ApiJson(req): ApiJson<RegisterStaffRequest>,
) -> AppResult<Created<UserWithProfiles>> {
    validate(&req)?;

    let fields = StaffProfileFields {
        staff_contact_number: req.staff_contact_number.trim().to_string(),
        department: req.department.trim().to_string(),
        job_title: req.job_title.trim().to_string(),
        office_location: field_edit(req.office_location.as_deref()),
        description: field_edit(req.description.as_deref()),
    };

    let registered = auth_service::register_staff(state.store.as_ref(), req.account.into(), &req.role, fields)?;
    Ok(Created(ApiResponse::ok_with_message(registered, "staff registered successfully")))
}

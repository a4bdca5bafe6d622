use axum::extract::multipart::{MultipartError, MultipartRejection};
use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use serde::{Deserialize, Serialize};

use crate::types::ApiErrorBody;

/// Application error codes following the pattern E{area}{sequence}
///
/// Ranges:
/// - E0xxx: Shared/infrastructure errors
/// - E1xxx: Authentication and accounts
/// - E2xxx: Profiles and uploads
/// - E3xxx: Role transitions
/// - E4xxx: Disciplinary ledger
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorCode {
    // Shared (E0xxx)
    InternalError,
    ValidationError,
    NotFound,
    Unauthorized,
    Forbidden,
    BadRequest,
    PayloadTooLarge,
    Conflict,

    // Auth (E1xxx)
    InvalidCredentials,
    EmailAlreadyExists,
    TokenExpired,
    TokenInvalid,
    AccountDeactivated,
    InvalidStaffRole,

    // Profiles (E2xxx)
    ProfileNotFound,
    StudentNotFound,
    MissingProfileFields,
    PhotoUploadFailed,

    // Role transitions (E3xxx)
    InvalidSubRole,
    NotPromotable,
    NotDemotable,

    // Disciplinary ledger (E4xxx)
    ActionNotFound,
}

impl ErrorCode {
    pub fn code(&self) -> &'static str {
        match self {
            Self::InternalError => "E0001",
            Self::ValidationError => "E0002",
            Self::NotFound => "E0003",
            Self::Unauthorized => "E0004",
            Self::Forbidden => "E0005",
            Self::BadRequest => "E0006",
            Self::PayloadTooLarge => "E0007",
            Self::Conflict => "E0008",

            Self::InvalidCredentials => "E1001",
            Self::EmailAlreadyExists => "E1002",
            Self::TokenExpired => "E1003",
            Self::TokenInvalid => "E1004",
            Self::AccountDeactivated => "E1005",
            Self::InvalidStaffRole => "E1006",

            Self::ProfileNotFound => "E2001",
            Self::StudentNotFound => "E2002",
            Self::MissingProfileFields => "E2003",
            Self::PhotoUploadFailed => "E2004",

            Self::InvalidSubRole => "E3001",
            Self::NotPromotable => "E3002",
            Self::NotDemotable => "E3003",

            Self::ActionNotFound => "E4001",
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
            Self::ValidationError | Self::BadRequest | Self::InvalidStaffRole
            | Self::MissingProfileFields | Self::PhotoUploadFailed
            | Self::InvalidSubRole => StatusCode::BAD_REQUEST,
            Self::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            Self::NotFound | Self::ProfileNotFound | Self::StudentNotFound
            | Self::NotPromotable | Self::NotDemotable | Self::ActionNotFound => StatusCode::NOT_FOUND,
            Self::Unauthorized | Self::InvalidCredentials | Self::TokenExpired => StatusCode::UNAUTHORIZED,
            Self::Forbidden | Self::TokenInvalid | Self::AccountDeactivated => StatusCode::FORBIDDEN,
            Self::Conflict | Self::EmailAlreadyExists => StatusCode::CONFLICT,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{message}")]
    Known {
        code: ErrorCode,
        message: String,
        details: Option<serde_json::Value>,
    },

    #[error("internal server error")]
    Internal(#[from] anyhow::Error),

    #[error("database error: {0}")]
    Database(#[from] DieselError),

    #[error("validation error: {0}")]
    Validation(String),
}

impl AppError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self::Known {
            code,
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(code: ErrorCode, message: impl Into<String>, details: serde_json::Value) -> Self {
        Self::Known {
            code,
            message: message.into(),
            details: Some(details),
        }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Unauthorized, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::NotFound, message)
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::BadRequest, message)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Forbidden, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }

    /// The taxonomy code this error will be reported with.
    pub fn code(&self) -> ErrorCode {
        match self {
            AppError::Known { code, .. } => *code,
            AppError::Internal(_) => ErrorCode::InternalError,
            AppError::Database(DieselError::NotFound) => ErrorCode::NotFound,
            AppError::Database(DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _)) => {
                ErrorCode::Conflict
            }
            AppError::Database(_) => ErrorCode::InternalError,
            AppError::Validation(_) => ErrorCode::ValidationError,
        }
    }

    /// Rewrites a unique-constraint violation into `code`, leaving other errors untouched.
    pub fn on_unique_violation(self, code: ErrorCode, message: &str) -> Self {
        match self {
            AppError::Database(DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _)) => {
                AppError::new(code, message)
            }
            other => other,
        }
    }
}

// Extractor rejections render through the same envelope as handler errors.

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::bad_request(rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError::bad_request(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::bad_request(rejection.body_text())
    }
}

impl From<MultipartRejection> for AppError {
    fn from(rejection: MultipartRejection) -> Self {
        AppError::bad_request(rejection.body_text())
    }
}

impl From<MultipartError> for AppError {
    fn from(err: MultipartError) -> Self {
        if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
            AppError::new(ErrorCode::PayloadTooLarge, "upload exceeds the size limit")
        } else {
            AppError::bad_request(err.body_text())
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let code = self.code();
        let body = match &self {
            AppError::Known { message, details, .. } => {
                ApiErrorBody::new(code.code(), message, details.clone())
            }
            AppError::Internal(err) => {
                tracing::error!(error = %err, "internal server error");
                ApiErrorBody::new(code.code(), "internal server error", None)
            }
            AppError::Database(err) => {
                tracing::error!(error = %err, "database error");
                let message = match code {
                    ErrorCode::NotFound => "resource not found",
                    ErrorCode::Conflict => "resource already exists",
                    _ => "database error",
                };
                ApiErrorBody::new(code.code(), message, None)
            }
            AppError::Validation(msg) => ApiErrorBody::new(code.code(), msg, None),
        };

        (code.status_code(), Json(body)).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;

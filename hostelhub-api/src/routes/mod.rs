use axum::extract::FromRequest;
use chrono::{DateTime, NaiveDate};

use hostelhub_shared::errors::{AppError, AppResult};

use crate::models::FieldEdit;

pub mod auth;
pub mod health;
pub mod public;
pub mod staff;
pub mod student;
pub mod users;

mod form;

/// `Json` whose rejections render as `AppError` (400) instead of axum's plain text.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct ApiJson<T>(pub T);

/// Accepts `YYYY-MM-DD` or a full RFC 3339 timestamp.
pub(crate) fn parse_date(field: &str, raw: &str) -> AppResult<NaiveDate> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .or_else(|_| DateTime::parse_from_rfc3339(raw).map(|dt| dt.date_naive()))
        .map_err(|_| AppError::bad_request(format!("{field} must be a date (YYYY-MM-DD)")))
}

/// Blank input means "no value".
pub(crate) fn parse_grade(field: &str, raw: Option<&str>) -> AppResult<Option<f64>> {
    match raw.map(str::trim).filter(|v| !v.is_empty()) {
        None => Ok(None),
        Some(v) => v
            .parse::<f64>()
            .ok()
            .filter(|g| g.is_finite())
            .map(Some)
            .ok_or_else(|| AppError::bad_request(format!("{field} must be a number"))),
    }
}

/// Trims, and treats blank as absent.
pub(crate) fn non_blank(raw: &str) -> Option<String> {
    Some(raw.trim().to_string()).filter(|v| !v.is_empty())
}

/// A submitted optional field: absent keeps, blank clears.
pub(crate) fn field_edit(raw: Option<&str>) -> FieldEdit {
    raw.map(non_blank)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dates_accept_plain_and_rfc3339() {
        let expected = NaiveDate::from_ymd_opt(2024, 8, 1).unwrap();
        assert_eq!(parse_date("courseStartDate", "2024-08-01").unwrap(), expected);
        assert_eq!(parse_date("courseStartDate", "2024-08-01T00:00:00.000Z").unwrap(), expected);
        assert!(parse_date("courseStartDate", "01/08/2024").is_err());
    }

    #[test]
    fn grades_blank_is_none() {
        assert_eq!(parse_grade("sgpa", None).unwrap(), None);
        assert_eq!(parse_grade("sgpa", Some("  ")).unwrap(), None);
        assert_eq!(parse_grade("sgpa", Some("8.25")).unwrap(), Some(8.25));
        assert!(parse_grade("sgpa", Some("NaN")).is_err());
        assert!(parse_grade("sgpa", Some("eight")).is_err());
    }

    #[test]
    fn blank_edit_clears_and_absent_keeps() {
        assert_eq!(field_edit(None), None);
        assert_eq!(field_edit(Some("   ")), Some(None));
        assert_eq!(field_edit(Some(" B-204 ")), Some(Some("B-204".to_string())));
    }
}

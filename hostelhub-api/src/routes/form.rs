use std::collections::HashMap;

use axum::extract::Multipart;

use hostelhub_shared::errors::{AppError, AppResult, ErrorCode};

use crate::models::{FieldEdit, StaffProfileFields, StudentProfileFields};
use crate::services::photo_storage::{PendingPhoto, PhotoStorage};

use super::{field_edit, non_blank, parse_date, parse_grade};

pub const PHOTO_FIELD: &str = "profilePhoto";

const STAFF_REQUIRED: &[&str] = &["staffContactNumber", "department", "jobTitle", "officeLocation"];

const STUDENT_REQUIRED: &[&str] = &[
    "rollNumber",
    "department",
    "school",
    "studentContactNumber",
    "guardianName",
    "guardianContact",
    "courseStartDate",
    "expectedCourseEndDate",
];

/// A fully buffered profile submission. The photo has been type- and
/// size-checked but not written.
#[derive(Debug, Default)]
pub struct ProfileForm {
    fields: HashMap<String, String>,
    photo: Option<PendingPhoto>,
}

impl ProfileForm {
    pub async fn read(mut multipart: Multipart, photos: &PhotoStorage) -> AppResult<Self> {
        let mut form = ProfileForm::default();
        while let Some(field) = multipart.next_field().await? {
            let name = field.name().unwrap_or_default().to_string();
            if name == PHOTO_FIELD {
                let content_type = field.content_type().map(str::to_owned);
                let file_name = field.file_name().map(str::to_owned);
                let bytes = field.bytes().await?;
                // Browsers send an empty part for an untouched file input.
                if bytes.is_empty() && file_name.as_deref().unwrap_or_default().is_empty() {
                    continue;
                }
                form.photo = Some(photos.accept(content_type.as_deref(), file_name.as_deref(), bytes.to_vec())?);
            } else {
                let value = field.text().await?;
                form.fields.insert(name, value);
            }
        }
        Ok(form)
    }

    pub fn take_photo(&mut self) -> Option<PendingPhoto> {
        self.photo.take()
    }

    fn text(&self, name: &str) -> Option<String> {
        self.fields.get(name).and_then(|v| non_blank(v))
    }

    fn edit(&self, name: &str) -> FieldEdit {
        field_edit(self.fields.get(name).map(String::as_str))
    }

    fn ensure_present(&self, required: &[&str]) -> AppResult<()> {
        let missing: Vec<&str> = required.iter().copied().filter(|f| self.text(f).is_none()).collect();
        if missing.is_empty() {
            return Ok(());
        }
        Err(AppError::with_details(
            ErrorCode::MissingProfileFields,
            "please fill all required fields",
            serde_json::json!({ "missing": missing }),
        ))
    }

    fn required(&self, name: &str) -> String {
        self.text(name).unwrap_or_default()
    }

    pub fn staff_fields(&self) -> AppResult<StaffProfileFields> {
        self.ensure_present(STAFF_REQUIRED)?;
        Ok(StaffProfileFields {
            staff_contact_number: self.required("staffContactNumber"),
            department: self.required("department"),
            job_title: self.required("jobTitle"),
            office_location: self.edit("officeLocation"),
            description: self.edit("description"),
        })
    }

    pub fn student_fields(&self) -> AppResult<StudentProfileFields> {
        self.ensure_present(STUDENT_REQUIRED)?;
        Ok(StudentProfileFields {
            roll_number: self.required("rollNumber"),
            room_number: self.edit("roomNumber"),
            current_sem: self.edit("currentSem"),
            sgpa: parse_grade("sgpa", self.fields.get("sgpa").map(String::as_str))?,
            cgpa: parse_grade("cgpa", self.fields.get("cgpa").map(String::as_str))?,
            department: self.required("department"),
            school: self.required("school"),
            student_contact_number: self.required("studentContactNumber"),
            guardian_name: self.required("guardianName"),
            guardian_contact: self.required("guardianContact"),
            course_start_date: parse_date("courseStartDate", &self.required("courseStartDate"))?,
            expected_course_end_date: parse_date(
                "expectedCourseEndDate",
                &self.required("expectedCourseEndDate"),
            )?,
        })
    }
}

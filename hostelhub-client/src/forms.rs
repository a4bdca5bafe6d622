//! Multipart profile submissions.

use chrono::NaiveDate;
use reqwest::multipart::{Form, Part};

use crate::error::ClientError;

const PHOTO_FIELD: &str = "profilePhoto";

#[derive(Debug, Clone)]
pub struct Photo {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl Photo {
    fn into_part(self) -> Result<Part, ClientError> {
        Ok(Part::bytes(self.bytes)
            .file_name(self.file_name)
            .mime_str(&self.content_type)?)
    }
}

#[derive(Debug, Clone, Default)]
pub struct StaffProfileForm {
    pub staff_contact_number: String,
    pub department: String,
    pub job_title: String,
    pub office_location: String,
    /// `None` leaves the stored value; `Some("")` clears it.
    pub description: Option<String>,
    pub photo: Option<Photo>,
}

impl StaffProfileForm {
    pub fn into_multipart(self) -> Result<Form, ClientError> {
        let mut form = Form::new()
            .text("staffContactNumber", self.staff_contact_number)
            .text("department", self.department)
            .text("jobTitle", self.job_title)
            .text("officeLocation", self.office_location);
        if let Some(description) = self.description {
            form = form.text("description", description);
        }
        attach(form, self.photo)
    }
}

#[derive(Debug, Clone)]
pub struct StudentProfileForm {
    pub roll_number: String,
    /// Like the description: `None` is not sent, `Some("")` clears.
    pub room_number: Option<String>,
    pub current_sem: Option<String>,
    /// Always sent. `None` clears the stored grade.
    pub sgpa: Option<f64>,
    pub cgpa: Option<f64>,
    pub department: String,
    pub school: String,
    pub student_contact_number: String,
    pub guardian_name: String,
    pub guardian_contact: String,
    pub course_start_date: NaiveDate,
    pub expected_course_end_date: NaiveDate,
    pub photo: Option<Photo>,
}

impl StudentProfileForm {
    pub fn into_multipart(self) -> Result<Form, ClientError> {
        let grade = |g: Option<f64>| g.map(|v| v.to_string()).unwrap_or_default();
        let mut form = Form::new()
            .text("rollNumber", self.roll_number)
            .text("sgpa", grade(self.sgpa))
            .text("cgpa", grade(self.cgpa))
            .text("department", self.department)
            .text("school", self.school)
            .text("studentContactNumber", self.student_contact_number)
            .text("guardianName", self.guardian_name)
            .text("guardianContact", self.guardian_contact)
            .text("courseStartDate", self.course_start_date.to_string())
            .text("expectedCourseEndDate", self.expected_course_end_date.to_string());
        if let Some(room) = self.room_number {
            form = form.text("roomNumber", room);
        }
        if let Some(sem) = self.current_sem {
            form = form.text("currentSem", sem);
        }
        attach(form, self.photo)
    }
}

fn attach(form: Form, photo: Option<Photo>) -> Result<Form, ClientError> {
    match photo {
        Some(photo) => Ok(form.part(PHOTO_FIELD, photo.into_part()?)),
        None => Ok(form),
    }
}

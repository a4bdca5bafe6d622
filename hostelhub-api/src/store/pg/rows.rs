//! Diesel row shapes. Enum columns arrive as text and are parsed here, so
//! nothing above the store ever sees a raw VARCHAR role or status.

use chrono::{DateTime, NaiveDate, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use hostelhub_shared::errors::{AppError, AppResult};
use hostelhub_shared::types::auth::AdminSubRole;

use crate::models::{
    CommitteeUser, DisciplinaryAction, IssuerName, StaffCard, StaffProfile, StaffProfileFields,
    StudentAdminCard, StudentProfile, StudentProfileFields, User, UserCredentials,
};
use crate::schema::{disciplinary_actions, staff_profiles, student_profiles, users};

fn parse<T: std::str::FromStr<Err = String>>(raw: &str) -> AppResult<T> {
    raw.parse::<T>().map_err(|e| AppError::internal(format!("corrupt enum column: {e}")))
}

fn parse_opt<T: std::str::FromStr<Err = String>>(raw: Option<&str>) -> AppResult<Option<T>> {
    raw.map(parse).transpose()
}

// --- users ---

#[derive(Debug, Queryable, Selectable)]
#[diesel(table_name = users, check_for_backend(diesel::pg::Pg))]
pub(super) struct UserRow {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password_hash: String,
    pub role: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UserRow {
    pub fn into_credentials(mut self) -> AppResult<UserCredentials> {
        let password_hash = std::mem::take(&mut self.password_hash);
        Ok(UserCredentials { user: self.try_into()?, password_hash })
    }
}

impl TryFrom<UserRow> for User {
    type Error = AppError;

    fn try_from(row: UserRow) -> AppResult<Self> {
        Ok(User {
            id: row.id,
            first_name: row.first_name,
            last_name: row.last_name,
            email: row.email,
            role: parse(&row.role)?,
            is_active: row.is_active,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Insertable)]
#[diesel(table_name = users)]
pub(super) struct NewUserRow<'a> {
    pub first_name: &'a str,
    pub last_name: &'a str,
    pub email: &'a str,
    pub password_hash: &'a str,
    pub role: &'a str,
}

#[derive(Queryable, Selectable)]
#[diesel(table_name = users, check_for_backend(diesel::pg::Pg))]
pub(super) struct CommitteeUserRow {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub role: String,
}

impl TryFrom<CommitteeUserRow> for CommitteeUser {
    type Error = AppError;

    fn try_from(row: CommitteeUserRow) -> AppResult<Self> {
        Ok(CommitteeUser {
            id: row.id,
            first_name: row.first_name,
            last_name: row.last_name,
            email: row.email,
            role: parse(&row.role)?,
        })
    }
}

#[derive(Queryable, Selectable)]
#[diesel(table_name = users, check_for_backend(diesel::pg::Pg))]
pub(super) struct IssuerRow {
    pub first_name: String,
    pub last_name: String,
}

impl From<IssuerRow> for IssuerName {
    fn from(row: IssuerRow) -> Self {
        IssuerName { first_name: row.first_name, last_name: row.last_name }
    }
}

// --- staff_profiles ---

#[derive(Queryable, Selectable)]
#[diesel(table_name = staff_profiles, check_for_backend(diesel::pg::Pg))]
pub(super) struct StaffProfileRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub staff_contact_number: String,
    pub department: String,
    pub job_title: String,
    pub office_location: Option<String>,
    pub description: Option<String>,
    pub profile_photo_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<StaffProfileRow> for StaffProfile {
    fn from(row: StaffProfileRow) -> Self {
        StaffProfile {
            id: row.id,
            user_id: row.user_id,
            staff_contact_number: row.staff_contact_number,
            department: row.department,
            job_title: row.job_title,
            office_location: row.office_location,
            description: row.description,
            profile_photo_url: row.profile_photo_url,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Insertable)]
#[diesel(table_name = staff_profiles)]
pub(super) struct NewStaffProfileRow<'a> {
    pub user_id: Uuid,
    pub staff_contact_number: &'a str,
    pub department: &'a str,
    pub job_title: &'a str,
    pub office_location: Option<&'a str>,
    pub description: Option<&'a str>,
    pub profile_photo_url: Option<&'a str>,
}

/// Merge set for an existing staff profile. An outer `None` leaves the
/// column untouched, `Some(None)` writes NULL.
#[derive(AsChangeset)]
#[diesel(table_name = staff_profiles)]
pub(super) struct StaffProfileChanges<'a> {
    pub staff_contact_number: &'a str,
    pub department: &'a str,
    pub job_title: &'a str,
    pub office_location: Option<Option<&'a str>>,
    pub description: Option<Option<&'a str>>,
    pub profile_photo_url: Option<&'a str>,
    pub updated_at: DateTime<Utc>,
}

impl<'a> NewStaffProfileRow<'a> {
    pub fn new(user_id: Uuid, fields: &'a StaffProfileFields, photo_url: Option<&'a str>) -> Self {
        Self {
            user_id,
            staff_contact_number: &fields.staff_contact_number,
            department: &fields.department,
            job_title: &fields.job_title,
            office_location: fields.office_location.as_ref().and_then(|v| v.as_deref()),
            description: fields.description.as_ref().and_then(|v| v.as_deref()),
            profile_photo_url: photo_url,
        }
    }
}

impl<'a> StaffProfileChanges<'a> {
    pub fn new(fields: &'a StaffProfileFields, photo_url: Option<&'a str>) -> Self {
        Self {
            staff_contact_number: &fields.staff_contact_number,
            department: &fields.department,
            job_title: &fields.job_title,
            office_location: fields.office_location.as_ref().map(|v| v.as_deref()),
            description: fields.description.as_ref().map(|v| v.as_deref()),
            profile_photo_url: photo_url,
            updated_at: Utc::now(),
        }
    }
}

#[derive(Queryable, Selectable)]
#[diesel(table_name = staff_profiles, check_for_backend(diesel::pg::Pg))]
pub(super) struct StaffCardRow {
    pub id: Uuid,
    pub staff_contact_number: String,
    pub profile_photo_url: Option<String>,
    pub job_title: String,
}

impl From<StaffCardRow> for StaffCard {
    fn from(row: StaffCardRow) -> Self {
        StaffCard {
            id: row.id,
            staff_contact_number: row.staff_contact_number,
            profile_photo_url: row.profile_photo_url,
            job_title: row.job_title,
        }
    }
}

// --- student_profiles ---

#[derive(Queryable, Selectable)]
#[diesel(table_name = student_profiles, check_for_backend(diesel::pg::Pg))]
pub(super) struct StudentProfileRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub roll_number: String,
    pub room_number: Option<String>,
    pub current_sem: Option<String>,
    pub sgpa: Option<f64>,
    pub cgpa: Option<f64>,
    pub department: String,
    pub school: String,
    pub student_contact_number: String,
    pub guardian_name: String,
    pub guardian_contact: String,
    pub course_start_date: NaiveDate,
    pub expected_course_end_date: NaiveDate,
    pub profile_photo_url: Option<String>,
    pub admin_sub_role: Option<String>,
    pub admin_role_assigned_at: Option<DateTime<Utc>>,
    pub admin_role_ended_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<StudentProfileRow> for StudentProfile {
    type Error = AppError;

    fn try_from(row: StudentProfileRow) -> AppResult<Self> {
        Ok(StudentProfile {
            admin_sub_role: parse_opt::<AdminSubRole>(row.admin_sub_role.as_deref())?,
            id: row.id,
            user_id: row.user_id,
            roll_number: row.roll_number,
            room_number: row.room_number,
            current_sem: row.current_sem,
            sgpa: row.sgpa,
            cgpa: row.cgpa,
            department: row.department,
            school: row.school,
            student_contact_number: row.student_contact_number,
            guardian_name: row.guardian_name,
            guardian_contact: row.guardian_contact,
            course_start_date: row.course_start_date,
            expected_course_end_date: row.expected_course_end_date,
            profile_photo_url: row.profile_photo_url,
            admin_role_assigned_at: row.admin_role_assigned_at,
            admin_role_ended_at: row.admin_role_ended_at,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Insertable)]
#[diesel(table_name = student_profiles)]
pub(super) struct NewStudentProfileRow<'a> {
    pub user_id: Uuid,
    pub roll_number: &'a str,
    pub room_number: Option<&'a str>,
    pub current_sem: Option<&'a str>,
    pub sgpa: Option<f64>,
    pub cgpa: Option<f64>,
    pub department: &'a str,
    pub school: &'a str,
    pub student_contact_number: &'a str,
    pub guardian_name: &'a str,
    pub guardian_contact: &'a str,
    pub course_start_date: NaiveDate,
    pub expected_course_end_date: NaiveDate,
    pub profile_photo_url: Option<&'a str>,
}

impl<'a> NewStudentProfileRow<'a> {
    pub fn new(user_id: Uuid, fields: &'a StudentProfileFields, photo_url: Option<&'a str>) -> Self {
        Self {
            user_id,
            roll_number: &fields.roll_number,
            room_number: fields.room_number.as_ref().and_then(|v| v.as_deref()),
            current_sem: fields.current_sem.as_ref().and_then(|v| v.as_deref()),
            sgpa: fields.sgpa,
            cgpa: fields.cgpa,
            department: &fields.department,
            school: &fields.school,
            student_contact_number: &fields.student_contact_number,
            guardian_name: &fields.guardian_name,
            guardian_contact: &fields.guardian_contact,
            course_start_date: fields.course_start_date,
            expected_course_end_date: fields.expected_course_end_date,
            profile_photo_url: photo_url,
        }
    }
}

/// Merge set for an existing student profile. `sgpa`/`cgpa` are written
/// separately so that an absent grade clears the column.
#[derive(AsChangeset)]
#[diesel(table_name = student_profiles)]
pub(super) struct StudentProfileChanges<'a> {
    pub roll_number: &'a str,
    pub room_number: Option<Option<&'a str>>,
    pub current_sem: Option<Option<&'a str>>,
    pub department: &'a str,
    pub school: &'a str,
    pub student_contact_number: &'a str,
    pub guardian_name: &'a str,
    pub guardian_contact: &'a str,
    pub course_start_date: NaiveDate,
    pub expected_course_end_date: NaiveDate,
    pub profile_photo_url: Option<&'a str>,
    pub updated_at: DateTime<Utc>,
}

impl<'a> StudentProfileChanges<'a> {
    pub fn new(fields: &'a StudentProfileFields, photo_url: Option<&'a str>) -> Self {
        Self {
            roll_number: &fields.roll_number,
            room_number: fields.room_number.as_ref().map(|v| v.as_deref()),
            current_sem: fields.current_sem.as_ref().map(|v| v.as_deref()),
            department: &fields.department,
            school: &fields.school,
            student_contact_number: &fields.student_contact_number,
            guardian_name: &fields.guardian_name,
            guardian_contact: &fields.guardian_contact,
            course_start_date: fields.course_start_date,
            expected_course_end_date: fields.expected_course_end_date,
            profile_photo_url: photo_url,
            updated_at: Utc::now(),
        }
    }
}

#[derive(Queryable, Selectable)]
#[diesel(table_name = student_profiles, check_for_backend(diesel::pg::Pg))]
pub(super) struct StudentAdminCardRow {
    pub id: Uuid,
    pub student_contact_number: String,
    pub profile_photo_url: Option<String>,
    pub admin_sub_role: Option<String>,
}

impl TryFrom<StudentAdminCardRow> for StudentAdminCard {
    type Error = AppError;

    fn try_from(row: StudentAdminCardRow) -> AppResult<Self> {
        Ok(StudentAdminCard {
            admin_sub_role: parse_opt(row.admin_sub_role.as_deref())?,
            id: row.id,
            student_contact_number: row.student_contact_number,
            profile_photo_url: row.profile_photo_url,
        })
    }
}

#[derive(Queryable, Selectable)]
#[diesel(table_name = student_profiles, check_for_backend(diesel::pg::Pg))]
pub(super) struct StudentSummaryRow {
    pub id: Uuid,
    pub roll_number: String,
    pub room_number: Option<String>,
}

// --- disciplinary_actions ---

#[derive(Queryable, Selectable)]
#[diesel(table_name = disciplinary_actions, check_for_backend(diesel::pg::Pg))]
pub(super) struct ActionRow {
    pub id: Uuid,
    pub student_profile_id: Uuid,
    pub issued_by_id: Uuid,
    pub action_type: String,
    pub reason: String,
    pub date_issued: DateTime<Utc>,
    pub status: String,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<ActionRow> for DisciplinaryAction {
    type Error = AppError;

    fn try_from(row: ActionRow) -> AppResult<Self> {
        Ok(DisciplinaryAction {
            action_type: parse(&row.action_type)?,
            status: parse(&row.status)?,
            id: row.id,
            student_profile_id: row.student_profile_id,
            issued_by_id: row.issued_by_id,
            reason: row.reason,
            date_issued: row.date_issued,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Insertable)]
#[diesel(table_name = disciplinary_actions)]
pub(super) struct NewActionRow<'a> {
    pub student_profile_id: Uuid,
    pub issued_by_id: Uuid,
    pub action_type: &'a str,
    pub reason: &'a str,
}

#[derive(AsChangeset)]
#[diesel(table_name = disciplinary_actions)]
pub(super) struct ActionChangesRow<'a> {
    pub reason: Option<&'a str>,
    pub status: Option<&'a str>,
    pub updated_at: DateTime<Utc>,
}


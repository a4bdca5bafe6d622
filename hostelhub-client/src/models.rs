//! Wire shapes as the client sees them. Fields the client never reads
//! (timestamps, foreign keys) are left out and ignored on decode.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use hostelhub_shared::types::auth::{AdminSubRole, Role};
use hostelhub_shared::types::ledger::{ActionStatus, ActionType};

// --- Accounts ---

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub role: Role,
    pub is_active: bool,
}

/// A user with whichever profile rows exist. This is what a session holds.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    #[serde(flatten)]
    pub user: User,
    #[serde(default)]
    pub staff_profile: Option<StaffProfile>,
    #[serde(default)]
    pub student_profile: Option<StudentProfile>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginOutcome {
    pub token: String,
    pub user: Account,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct UserEnvelope {
    pub user: User,
}

// --- Profiles ---

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StaffProfile {
    pub id: Uuid,
    pub staff_contact_number: String,
    pub department: String,
    pub job_title: String,
    pub office_location: Option<String>,
    pub description: Option<String>,
    pub profile_photo_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StudentProfile {
    pub id: Uuid,
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
    pub admin_sub_role: Option<AdminSubRole>,
    pub admin_role_assigned_at: Option<DateTime<Utc>>,
    pub admin_role_ended_at: Option<DateTime<Utc>>,
}

// --- Disciplinary ledger ---

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct IssuerName {
    pub first_name: String,
    pub last_name: String,
}

/// `issued_by` is only present on ledger reads, not on create/update replies.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Action {
    pub id: Uuid,
    pub student_profile_id: Uuid,
    pub action_type: ActionType,
    pub reason: String,
    pub date_issued: DateTime<Utc>,
    pub status: ActionStatus,
    #[serde(default)]
    pub issued_by: Option<IssuerName>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentDetails {
    #[serde(flatten)]
    pub profile: StudentProfile,
    pub user: User,
    pub disciplinary_actions: Vec<Action>,
}

// --- Listings ---

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentListItem {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub role: Role,
    pub student_profile: Option<StudentListProfile>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentListProfile {
    pub id: Uuid,
    pub roll_number: String,
    pub room_number: Option<String>,
    pub disciplinary_action_count: i64,
}

impl StudentListItem {
    /// Drives the red/green discipline marker in the roster.
    pub fn has_actions(&self) -> bool {
        self.student_profile
            .as_ref()
            .is_some_and(|p| p.disciplinary_action_count > 0)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommitteeUser {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub role: Role,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StaffCard {
    pub id: Uuid,
    pub staff_contact_number: String,
    pub profile_photo_url: Option<String>,
    pub job_title: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentAdminCard {
    pub id: Uuid,
    pub student_contact_number: String,
    pub profile_photo_url: Option<String>,
    pub admin_sub_role: Option<AdminSubRole>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StaffMember {
    #[serde(flatten)]
    pub user: CommitteeUser,
    pub staff_profile: Option<StaffCard>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentAdminMember {
    #[serde(flatten)]
    pub user: CommitteeUser,
    pub student_profile: Option<StudentAdminCard>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CommitteeMember {
    Staff(StaffMember),
    StudentAdmin(StudentAdminMember),
}

impl CommitteeMember {
    pub fn user(&self) -> &CommitteeUser {
        match self {
            CommitteeMember::Staff(m) => &m.user,
            CommitteeMember::StudentAdmin(m) => &m.user,
        }
    }
}

// --- Requests ---

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAccount {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentRegistration {
    #[serde(flatten)]
    pub account: NewAccount,
    pub roll_number: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub room_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_sem: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sgpa: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cgpa: Option<f64>,
    pub department: String,
    pub school: String,
    pub student_contact_number: String,
    pub guardian_name: String,
    pub guardian_contact: String,
    pub course_start_date: NaiveDate,
    pub expected_course_end_date: NaiveDate,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StaffRegistration {
    #[serde(flatten)]
    pub account: NewAccount,
    pub role: Role,
    pub staff_contact_number: String,
    pub department: String,
    pub job_title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub office_location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAction {
    pub student_profile_id: Uuid,
    pub action_type: ActionType,
    pub reason: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ActionUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<ActionStatus>,
}

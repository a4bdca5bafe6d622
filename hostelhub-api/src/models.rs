use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use hostelhub_shared::types::auth::{AdminSubRole, Role};
pub use hostelhub_shared::types::ledger::{ActionStatus, ActionType};

// --- Users ---

/// A user record with the password hash stripped.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub role: Role,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Login lookup result. Never serialized.
#[derive(Debug, Clone)]
pub struct UserCredentials {
    pub user: User,
    pub password_hash: String,
}

#[derive(Debug, Clone)]
pub struct NewAccount {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserWithProfiles {
    #[serde(flatten)]
    pub user: User,
    pub staff_profile: Option<StaffProfile>,
    pub student_profile: Option<StudentProfile>,
}

// --- Profiles ---

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StaffProfile {
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

/// A nullable column in a merge: `None` was not submitted and keeps the
/// stored value, `Some(None)` was submitted blank and clears it.
pub type FieldEdit = Option<Option<String>>;

/// Owner-editable staff fields.
#[derive(Debug, Clone, Default)]
pub struct StaffProfileFields {
    pub staff_contact_number: String,
    pub department: String,
    pub job_title: String,
    pub office_location: FieldEdit,
    pub description: FieldEdit,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StudentProfile {
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
    pub admin_sub_role: Option<AdminSubRole>,
    pub admin_role_assigned_at: Option<DateTime<Utc>>,
    pub admin_role_ended_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Owner-editable student fields. Admin bookkeeping is absent: only role
/// transitions write it. `sgpa`/`cgpa` are always written, so `None`
/// clears them.
#[derive(Debug, Clone)]
pub struct StudentProfileFields {
    pub roll_number: String,
    pub room_number: FieldEdit,
    pub current_sem: FieldEdit,
    pub sgpa: Option<f64>,
    pub cgpa: Option<f64>,
    pub department: String,
    pub school: String,
    pub student_contact_number: String,
    pub guardian_name: String,
    pub guardian_contact: String,
    pub course_start_date: NaiveDate,
    pub expected_course_end_date: NaiveDate,
}

// --- Disciplinary ledger ---

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DisciplinaryAction {
    pub id: Uuid,
    pub student_profile_id: Uuid,
    pub issued_by_id: Uuid,
    pub action_type: ActionType,
    pub reason: String,
    pub date_issued: DateTime<Utc>,
    pub status: ActionStatus,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewDisciplinaryAction {
    pub student_profile_id: Uuid,
    pub issued_by_id: Uuid,
    pub action_type: ActionType,
    pub reason: String,
}

#[derive(Debug, Clone, Default)]
pub struct ActionChanges {
    pub reason: Option<String>,
    pub status: Option<ActionStatus>,
}

impl ActionChanges {
    pub fn is_empty(&self) -> bool {
        self.reason.is_none() && self.status.is_none()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct IssuerName {
    pub first_name: String,
    pub last_name: String,
}

/// An action with its issuer's name joined in.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionEntry {
    #[serde(flatten)]
    pub action: DisciplinaryAction,
    pub issued_by: IssuerName,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentDetails {
    #[serde(flatten)]
    pub profile: StudentProfile,
    pub user: User,
    /// Newest first.
    pub disciplinary_actions: Vec<ActionEntry>,
}

// --- Listings ---

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentListItem {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub role: Role,
    pub student_profile: Option<StudentListProfile>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentListProfile {
    pub id: Uuid,
    pub roll_number: String,
    pub room_number: Option<String>,
    pub disciplinary_action_count: i64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommitteeUser {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub role: Role,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StaffCard {
    pub id: Uuid,
    pub staff_contact_number: String,
    pub profile_photo_url: Option<String>,
    pub job_title: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentAdminCard {
    pub id: Uuid,
    pub student_contact_number: String,
    pub profile_photo_url: Option<String>,
    pub admin_sub_role: Option<AdminSubRole>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StaffMember {
    #[serde(flatten)]
    pub user: CommitteeUser,
    pub staff_profile: Option<StaffCard>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentAdminMember {
    #[serde(flatten)]
    pub user: CommitteeUser,
    pub student_profile: Option<StudentAdminCard>,
}

/// Public committee roster entry, discriminated by role family.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CommitteeMember {
    Staff(StaffMember),
    StudentAdmin(StudentAdminMember),
}

impl CommitteeMember {
    /// Picks the variant from the user's role. Plain students are not committee members.
    pub fn resolve(
        user: CommitteeUser,
        staff: Option<StaffCard>,
        student: Option<StudentAdminCard>,
    ) -> Option<Self> {
        if user.role.is_staff() {
            Some(Self::Staff(StaffMember { user, staff_profile: staff }))
        } else if user.role.is_student_admin() {
            Some(Self::StudentAdmin(StudentAdminMember { user, student_profile: student }))
        } else {
            None
        }
    }

    pub fn user(&self) -> &CommitteeUser {
        match self {
            Self::Staff(m) => &m.user,
            Self::StudentAdmin(m) => &m.user,
        }
    }
}

/// Roster order: role declaration order, then first name.
pub fn sort_committee(members: &mut [CommitteeMember]) {
    members.sort_by(|a, b| {
        let (a, b) = (a.user(), b.user());
        a.role.cmp(&b.role).then_with(|| a.first_name.cmp(&b.first_name))
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn committee_user(role: Role, first_name: &str) -> CommitteeUser {
        CommitteeUser {
            id: Uuid::new_v4(),
            first_name: first_name.into(),
            last_name: "Doe".into(),
            email: format!("{}@x.edu", first_name.to_lowercase()),
            role,
        }
    }

    #[test]
    fn committee_member_is_tagged_by_role_family() {
        let warden = CommitteeMember::resolve(committee_user(Role::Warden, "Ankit"), None, None).unwrap();
        let json = serde_json::to_value(&warden).unwrap();
        assert_eq!(json["kind"], "STAFF");
        assert_eq!(json["firstName"], "Ankit");
        assert!(json["staffProfile"].is_null());

        let prefect = CommitteeMember::resolve(
            committee_user(Role::HostelAdmin, "Bela"),
            None,
            Some(StudentAdminCard {
                id: Uuid::new_v4(),
                student_contact_number: "555".into(),
                profile_photo_url: None,
                admin_sub_role: Some(AdminSubRole::Prefect),
            }),
        )
        .unwrap();
        let json = serde_json::to_value(&prefect).unwrap();
        assert_eq!(json["kind"], "STUDENT_ADMIN");
        assert_eq!(json["studentProfile"]["adminSubRole"], "PREFECT");

        assert!(CommitteeMember::resolve(committee_user(Role::Student, "Cy"), None, None).is_none());
    }

    #[test]
    fn committee_sorts_by_role_then_first_name() {
        let mut members: Vec<_> = [
            (Role::MessAdmin, "Zed"),
            (Role::Caretaker, "Omar"),
            (Role::Warden, "Yara"),
            (Role::HostelAdmin, "Ali"),
            (Role::Warden, "Ben"),
        ]
        .into_iter()
        .filter_map(|(role, name)| CommitteeMember::resolve(committee_user(role, name), None, None))
        .collect();

        sort_committee(&mut members);
        let order: Vec<_> = members.iter().map(|m| m.user().first_name.as_str()).collect();
        assert_eq!(order, ["Ben", "Yara", "Omar", "Ali", "Zed"]);
    }

    #[test]
    fn action_entry_flattens_action_fields() {
        let entry = ActionEntry {
            action: DisciplinaryAction {
                id: Uuid::new_v4(),
                student_profile_id: Uuid::new_v4(),
                issued_by_id: Uuid::new_v4(),
                action_type: ActionType::Warning,
                reason: "noise after curfew".into(),
                date_issued: Utc::now(),
                status: ActionStatus::Active,
                updated_at: Utc::now(),
            },
            issued_by: IssuerName { first_name: "Ankit".into(), last_name: "Warden".into() },
        };
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["actionType"], "WARNING");
        assert_eq!(json["status"], "ACTIVE");
        assert_eq!(json["issuedBy"]["firstName"], "Ankit");
    }
}

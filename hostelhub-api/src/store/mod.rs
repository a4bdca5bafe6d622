//! Persistence seam. Every method is one unit of work: multi-table writes either
//! commit together or leave no trace.

mod memory;
mod pg;

pub use memory::MemoryStore;
pub use pg::PgStore;

use uuid::Uuid;

use hostelhub_shared::errors::AppResult;
use hostelhub_shared::types::auth::{AdminSubRole, Role};

use crate::models::{
    ActionChanges, ActionEntry, CommitteeMember, DisciplinaryAction, NewAccount,
    NewDisciplinaryAction, StaffProfile, StaffProfileFields, StudentDetails, StudentListItem,
    StudentProfile, StudentProfileFields, User, UserCredentials, UserWithProfiles,
};

pub trait HostelStore: Send + Sync {
    /// Cheap round-trip used by the health check.
    fn ping(&self) -> AppResult<()>;

    // --- Credentials ---

    /// Looks up by already-normalised email.
    fn find_credentials(&self, email: &str) -> AppResult<Option<UserCredentials>>;

    fn user_with_profiles(&self, user_id: Uuid) -> AppResult<UserWithProfiles>;

    /// Inserts a bare user. Duplicate email yields `EmailAlreadyExists`.
    fn create_user(&self, account: NewAccount) -> AppResult<User>;

    fn register_staff(&self, account: NewAccount, fields: StaffProfileFields) -> AppResult<UserWithProfiles>;

    fn register_student(&self, account: NewAccount, fields: StudentProfileFields) -> AppResult<UserWithProfiles>;

    fn set_user_active(&self, user_id: Uuid, is_active: bool) -> AppResult<User>;

    // --- Profiles ---

    fn staff_profile(&self, user_id: Uuid) -> AppResult<Option<StaffProfile>>;

    /// Inserts or merges. `photo_url` replaces the stored one only when `Some`.
    fn upsert_staff_profile(
        &self,
        user_id: Uuid,
        fields: StaffProfileFields,
        photo_url: Option<String>,
    ) -> AppResult<StaffProfile>;

    fn student_profile(&self, user_id: Uuid) -> AppResult<Option<StudentProfile>>;

    fn upsert_student_profile(
        &self,
        user_id: Uuid,
        fields: StudentProfileFields,
        photo_url: Option<String>,
    ) -> AppResult<StudentProfile>;

    fn student_details(&self, student_profile_id: Uuid) -> AppResult<StudentDetails>;

    /// Student-family users whose name, roll number or room number contains
    /// `search` case-insensitively, ordered by first name. Empty matches all.
    fn list_students(&self, search: &str) -> AppResult<Vec<StudentListItem>>;

    /// Active committee members, ordered by role then first name.
    fn list_committee(&self) -> AppResult<Vec<CommitteeMember>>;

    // --- Disciplinary ledger ---

    fn create_action(&self, action: NewDisciplinaryAction) -> AppResult<DisciplinaryAction>;

    fn update_action(&self, action_id: Uuid, changes: ActionChanges) -> AppResult<DisciplinaryAction>;

    /// Newest first.
    fn actions_for_student(&self, student_profile_id: Uuid) -> AppResult<Vec<ActionEntry>>;

    // --- Role transitions ---

    /// STUDENT -> `role`, stamping the admin bookkeeping on the student profile.
    fn promote(&self, user_id: Uuid, role: Role, sub_role: AdminSubRole) -> AppResult<User>;

    /// HOSTEL_ADMIN / MESS_ADMIN -> STUDENT, closing the admin tenure.
    fn demote(&self, user_id: Uuid) -> AppResult<User>;
}

/// Escapes LIKE metacharacters so a search term matches literally.
pub(crate) fn like_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for c in term.chars() {
        if matches!(c, '\\' | '%' | '_') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use chrono::Utc;
use uuid::Uuid;

use hostelhub_shared::errors::{AppError, AppResult, ErrorCode};
use hostelhub_shared::types::auth::{AdminSubRole, Role};

use crate::models::{
    sort_committee, ActionChanges, ActionEntry, ActionStatus, CommitteeMember, CommitteeUser,
    DisciplinaryAction, IssuerName, NewAccount, NewDisciplinaryAction, StaffCard, StaffProfile,
    StaffProfileFields, StudentAdminCard, StudentDetails, StudentListItem, StudentListProfile,
    StudentProfile, StudentProfileFields, User, UserCredentials, UserWithProfiles,
};

use super::HostelStore;

#[derive(Default)]
struct Tables {
    users: HashMap<Uuid, UserCredentials>,
    /// Keyed by owning user id.
    staff: HashMap<Uuid, StaffProfile>,
    /// Keyed by owning user id.
    students: HashMap<Uuid, StudentProfile>,
    actions: Vec<DisciplinaryAction>,
}

impl Tables {
    fn user(&self, user_id: Uuid) -> Option<&User> {
        self.users.get(&user_id).map(|c| &c.user)
    }

    fn student_by_profile_id(&self, profile_id: Uuid) -> Option<&StudentProfile> {
        self.students.values().find(|p| p.id == profile_id)
    }

    fn insert_user(&mut self, account: NewAccount) -> AppResult<User> {
        if self.users.values().any(|c| c.user.email == account.email) {
            return Err(AppError::new(ErrorCode::EmailAlreadyExists, "email already registered"));
        }
        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            first_name: account.first_name,
            last_name: account.last_name,
            email: account.email,
            role: account.role,
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        self.users.insert(
            user.id,
            UserCredentials { user: user.clone(), password_hash: account.password_hash },
        );
        Ok(user)
    }

    fn actions_for(&self, profile_id: Uuid) -> Vec<ActionEntry> {
        let mut entries: Vec<ActionEntry> = self
            .actions
            .iter()
            .filter(|a| a.student_profile_id == profile_id)
            .map(|a| ActionEntry {
                issued_by: self
                    .user(a.issued_by_id)
                    .map(|u| IssuerName { first_name: u.first_name.clone(), last_name: u.last_name.clone() })
                    .unwrap_or_else(|| IssuerName { first_name: String::new(), last_name: String::new() }),
                action: a.clone(),
            })
            .collect();
        entries.sort_by(|a, b| b.action.date_issued.cmp(&a.action.date_issued));
        entries
    }

    /// Sets the role and returns the updated user. Caller has already checked existence.
    fn set_role(&mut self, user_id: Uuid, role: Role) -> AppResult<User> {
        let creds = self
            .users
            .get_mut(&user_id)
            .ok_or_else(|| AppError::not_found("user not found"))?;
        creds.user.role = role;
        creds.user.updated_at = Utc::now();
        Ok(creds.user.clone())
    }
}

fn new_staff_profile(user_id: Uuid, fields: StaffProfileFields, photo_url: Option<String>) -> StaffProfile {
    let now = Utc::now();
    StaffProfile {
        id: Uuid::new_v4(),
        user_id,
        staff_contact_number: fields.staff_contact_number,
        department: fields.department,
        job_title: fields.job_title,
        office_location: fields.office_location.flatten(),
        description: fields.description.flatten(),
        profile_photo_url: photo_url,
        created_at: now,
        updated_at: now,
    }
}

fn new_student_profile(user_id: Uuid, fields: StudentProfileFields, photo_url: Option<String>) -> StudentProfile {
    let now = Utc::now();
    StudentProfile {
        id: Uuid::new_v4(),
        user_id,
        roll_number: fields.roll_number,
        room_number: fields.room_number.flatten(),
        current_sem: fields.current_sem.flatten(),
        sgpa: fields.sgpa,
        cgpa: fields.cgpa,
        department: fields.department,
        school: fields.school,
        student_contact_number: fields.student_contact_number,
        guardian_name: fields.guardian_name,
        guardian_contact: fields.guardian_contact,
        course_start_date: fields.course_start_date,
        expected_course_end_date: fields.expected_course_end_date,
        profile_photo_url: photo_url,
        admin_sub_role: None,
        admin_role_assigned_at: None,
        admin_role_ended_at: None,
        created_at: now,
        updated_at: now,
    }
}

/// Process-local store for demos and tests. One lock guards all tables, and
/// every operation validates fully before it mutates anything.
#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> AppResult<MutexGuard<'_, Tables>> {
        self.tables
            .lock()
            .map_err(|_| AppError::internal("memory store lock poisoned"))
    }
}

impl HostelStore for MemoryStore {
    fn ping(&self) -> AppResult<()> {
        self.lock().map(|_| ())
    }

    fn find_credentials(&self, email: &str) -> AppResult<Option<UserCredentials>> {
        let tables = self.lock()?;
        Ok(tables.users.values().find(|c| c.user.email == email).cloned())
    }

    fn user_with_profiles(&self, user_id: Uuid) -> AppResult<UserWithProfiles> {
        let tables = self.lock()?;
        let user = tables
            .user(user_id)
            .cloned()
            .ok_or_else(|| AppError::not_found("user not found"))?;
        Ok(UserWithProfiles {
            user,
            staff_profile: tables.staff.get(&user_id).cloned(),
            student_profile: tables.students.get(&user_id).cloned(),
        })
    }

    fn create_user(&self, account: NewAccount) -> AppResult<User> {
        self.lock()?.insert_user(account)
    }

    fn register_staff(&self, account: NewAccount, fields: StaffProfileFields) -> AppResult<UserWithProfiles> {
        let mut tables = self.lock()?;
        let user = tables.insert_user(account)?;
        let profile = new_staff_profile(user.id, fields, None);
        tables.staff.insert(user.id, profile.clone());
        Ok(UserWithProfiles { user, staff_profile: Some(profile), student_profile: None })
    }

    fn register_student(&self, account: NewAccount, fields: StudentProfileFields) -> AppResult<UserWithProfiles> {
        let mut tables = self.lock()?;
        let user = tables.insert_user(account)?;
        let profile = new_student_profile(user.id, fields, None);
        tables.students.insert(user.id, profile.clone());
        Ok(UserWithProfiles { user, staff_profile: None, student_profile: Some(profile) })
    }

    fn set_user_active(&self, user_id: Uuid, is_active: bool) -> AppResult<User> {
        let mut tables = self.lock()?;
        let creds = tables
            .users
            .get_mut(&user_id)
            .ok_or_else(|| AppError::not_found("user not found"))?;
        creds.user.is_active = is_active;
        creds.user.updated_at = Utc::now();
        Ok(creds.user.clone())
    }

    fn staff_profile(&self, user_id: Uuid) -> AppResult<Option<StaffProfile>> {
        Ok(self.lock()?.staff.get(&user_id).cloned())
    }

    fn upsert_staff_profile(
        &self,
        user_id: Uuid,
        fields: StaffProfileFields,
        photo_url: Option<String>,
    ) -> AppResult<StaffProfile> {
        let mut tables = self.lock()?;
        if tables.user(user_id).is_none() {
            return Err(AppError::not_found("user not found"));
        }
        let profile = match tables.staff.get_mut(&user_id) {
            Some(existing) => {
                existing.staff_contact_number = fields.staff_contact_number;
                existing.department = fields.department;
                existing.job_title = fields.job_title;
                if let Some(office_location) = fields.office_location {
                    existing.office_location = office_location;
                }
                if let Some(description) = fields.description {
                    existing.description = description;
                }
                if photo_url.is_some() {
                    existing.profile_photo_url = photo_url;
                }
                existing.updated_at = Utc::now();
                existing.clone()
            }
            None => {
                let profile = new_staff_profile(user_id, fields, photo_url);
                tables.staff.insert(user_id, profile.clone());
                profile
            }
        };
        Ok(profile)
    }

    fn student_profile(&self, user_id: Uuid) -> AppResult<Option<StudentProfile>> {
        Ok(self.lock()?.students.get(&user_id).cloned())
    }

    fn upsert_student_profile(
        &self,
        user_id: Uuid,
        fields: StudentProfileFields,
        photo_url: Option<String>,
    ) -> AppResult<StudentProfile> {
        let mut tables = self.lock()?;
        if tables.user(user_id).is_none() {
            return Err(AppError::not_found("user not found"));
        }
        let profile = match tables.students.get_mut(&user_id) {
            Some(existing) => {
                existing.roll_number = fields.roll_number;
                if let Some(room_number) = fields.room_number {
                    existing.room_number = room_number;
                }
                if let Some(current_sem) = fields.current_sem {
                    existing.current_sem = current_sem;
                }
                existing.sgpa = fields.sgpa;
                existing.cgpa = fields.cgpa;
                existing.department = fields.department;
                existing.school = fields.school;
                existing.student_contact_number = fields.student_contact_number;
                existing.guardian_name = fields.guardian_name;
                existing.guardian_contact = fields.guardian_contact;
                existing.course_start_date = fields.course_start_date;
                existing.expected_course_end_date = fields.expected_course_end_date;
                if photo_url.is_some() {
                    existing.profile_photo_url = photo_url;
                }
                existing.updated_at = Utc::now();
                existing.clone()
            }
            None => {
                let profile = new_student_profile(user_id, fields, photo_url);
                tables.students.insert(user_id, profile.clone());
                profile
            }
        };
        Ok(profile)
    }

    fn student_details(&self, student_profile_id: Uuid) -> AppResult<StudentDetails> {
        let tables = self.lock()?;
        let profile = tables
            .student_by_profile_id(student_profile_id)
            .cloned()
            .ok_or_else(|| AppError::new(ErrorCode::StudentNotFound, "student not found"))?;
        let user = tables
            .user(profile.user_id)
            .cloned()
            .ok_or_else(|| AppError::internal("student profile without owner"))?;
        Ok(StudentDetails {
            disciplinary_actions: tables.actions_for(profile.id),
            profile,
            user,
        })
    }

    fn list_students(&self, search: &str) -> AppResult<Vec<StudentListItem>> {
        let tables = self.lock()?;
        let term = search.trim().to_lowercase();
        let contains = |value: &str| value.to_lowercase().contains(&term);

        let mut items: Vec<StudentListItem> = tables
            .users
            .values()
            .map(|c| &c.user)
            .filter(|u| Role::STUDENT_FAMILY.contains(&u.role))
            .filter_map(|u| {
                let profile = tables.students.get(&u.id);
                let matched = term.is_empty()
                    || contains(&u.first_name)
                    || contains(&u.last_name)
                    || profile.is_some_and(|p| {
                        contains(&p.roll_number) || p.room_number.as_deref().is_some_and(contains)
                    });
                matched.then(|| StudentListItem {
                    id: u.id,
                    first_name: u.first_name.clone(),
                    last_name: u.last_name.clone(),
                    role: u.role,
                    student_profile: profile.map(|p| StudentListProfile {
                        id: p.id,
                        roll_number: p.roll_number.clone(),
                        room_number: p.room_number.clone(),
                        disciplinary_action_count: tables
                            .actions
                            .iter()
                            .filter(|a| a.student_profile_id == p.id)
                            .count() as i64,
                    }),
                })
            })
            .collect();
        items.sort_by(|a, b| a.first_name.cmp(&b.first_name));
        Ok(items)
    }

    fn list_committee(&self) -> AppResult<Vec<CommitteeMember>> {
        let tables = self.lock()?;
        let mut members: Vec<CommitteeMember> = tables
            .users
            .values()
            .map(|c| &c.user)
            .filter(|u| u.is_active && Role::COMMITTEE.contains(&u.role))
            .filter_map(|u| {
                let staff = tables.staff.get(&u.id).map(|p| StaffCard {
                    id: p.id,
                    staff_contact_number: p.staff_contact_number.clone(),
                    profile_photo_url: p.profile_photo_url.clone(),
                    job_title: p.job_title.clone(),
                });
                let student = tables.students.get(&u.id).map(|p| StudentAdminCard {
                    id: p.id,
                    student_contact_number: p.student_contact_number.clone(),
                    profile_photo_url: p.profile_photo_url.clone(),
                    admin_sub_role: p.admin_sub_role,
                });
                let user = CommitteeUser {
                    id: u.id,
                    first_name: u.first_name.clone(),
                    last_name: u.last_name.clone(),
                    email: u.email.clone(),
                    role: u.role,
                };
                CommitteeMember::resolve(user, staff, student)
            })
            .collect();
        sort_committee(&mut members);
        Ok(members)
    }

    fn create_action(&self, action: NewDisciplinaryAction) -> AppResult<DisciplinaryAction> {
        let mut tables = self.lock()?;
        if tables.student_by_profile_id(action.student_profile_id).is_none() {
            return Err(AppError::new(ErrorCode::StudentNotFound, "student not found"));
        }
        if tables.user(action.issued_by_id).is_none() {
            return Err(AppError::not_found("issuing user not found"));
        }
        let now = Utc::now();
        let created = DisciplinaryAction {
            id: Uuid::new_v4(),
            student_profile_id: action.student_profile_id,
            issued_by_id: action.issued_by_id,
            action_type: action.action_type,
            reason: action.reason,
            date_issued: now,
            status: ActionStatus::Active,
            updated_at: now,
        };
        tables.actions.push(created.clone());
        Ok(created)
    }

    fn update_action(&self, action_id: Uuid, changes: ActionChanges) -> AppResult<DisciplinaryAction> {
        let mut tables = self.lock()?;
        let action = tables
            .actions
            .iter_mut()
            .find(|a| a.id == action_id)
            .ok_or_else(|| AppError::new(ErrorCode::ActionNotFound, "disciplinary action not found"))?;
        if let Some(reason) = changes.reason {
            action.reason = reason;
        }
        if let Some(status) = changes.status {
            action.status = status;
        }
        action.updated_at = Utc::now();
        Ok(action.clone())
    }

    fn actions_for_student(&self, student_profile_id: Uuid) -> AppResult<Vec<ActionEntry>> {
        let tables = self.lock()?;
        if tables.student_by_profile_id(student_profile_id).is_none() {
            return Err(AppError::new(ErrorCode::StudentNotFound, "student not found"));
        }
        Ok(tables.actions_for(student_profile_id))
    }

    fn promote(&self, user_id: Uuid, role: Role, sub_role: AdminSubRole) -> AppResult<User> {
        let mut tables = self.lock()?;
        if tables.user(user_id).map(|u| u.role) != Some(Role::Student) {
            return Err(AppError::new(ErrorCode::NotPromotable, "user not found or is not a student"));
        }
        if !tables.students.contains_key(&user_id) {
            return Err(AppError::new(ErrorCode::ProfileNotFound, "student profile not found"));
        }

        let user = tables.set_role(user_id, role)?;
        if let Some(profile) = tables.students.get_mut(&user_id) {
            profile.admin_sub_role = Some(sub_role);
            profile.admin_role_assigned_at = Some(user.updated_at);
            profile.admin_role_ended_at = None;
            profile.updated_at = user.updated_at;
        }
        tracing::info!(user_id = %user_id, role = %role, sub_role = %sub_role, "student promoted");
        Ok(user)
    }

    fn demote(&self, user_id: Uuid) -> AppResult<User> {
        let mut tables = self.lock()?;
        if !tables.user(user_id).is_some_and(|u| u.role.is_student_admin()) {
            return Err(AppError::new(ErrorCode::NotDemotable, "user not found or is not a student admin"));
        }
        if !tables.students.contains_key(&user_id) {
            return Err(AppError::new(ErrorCode::ProfileNotFound, "student profile not found"));
        }

        let user = tables.set_role(user_id, Role::Student)?;
        if let Some(profile) = tables.students.get_mut(&user_id) {
            profile.admin_sub_role = None;
            profile.admin_role_ended_at = Some(user.updated_at);
            profile.updated_at = user.updated_at;
        }
        tracing::info!(user_id = %user_id, "student admin demoted");
        Ok(user)
    }
}

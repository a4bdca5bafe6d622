use uuid::Uuid;

use hostelhub_shared::errors::{AppError, AppResult, ErrorCode};
use hostelhub_shared::types::auth::{AdminSubRole, Role};

use crate::models::User;
use crate::store::HostelStore;

/// Resolves and checks a promotion request without touching the store.
pub fn validate_promotion(new_role: &str, sub_role: &str) -> AppResult<(Role, AdminSubRole)> {
    let role = new_role
        .parse::<Role>()
        .ok()
        .filter(Role::is_student_admin)
        .ok_or_else(|| {
            AppError::new(
                ErrorCode::InvalidSubRole,
                format!("invalid role '{new_role}', expected HOSTEL_ADMIN or MESS_ADMIN"),
            )
        })?;

    let sub = sub_role
        .parse::<AdminSubRole>()
        .ok()
        .filter(|s| s.belongs_to(role))
        .ok_or_else(|| {
            let allowed: Vec<&str> = AdminSubRole::allowed_for(role).iter().map(|s| s.as_str()).collect();
            AppError::with_details(
                ErrorCode::InvalidSubRole,
                format!("invalid sub-role '{sub_role}' for '{role}'"),
                serde_json::json!({ "allowed": allowed }),
            )
        })?;

    Ok((role, sub))
}

pub fn promote(store: &dyn HostelStore, user_id: Uuid, new_role: &str, sub_role: &str) -> AppResult<User> {
    let (role, sub) = validate_promotion(new_role, sub_role)?;
    store.promote(user_id, role, sub)
}

pub fn demote(store: &dyn HostelStore, user_id: Uuid) -> AppResult<User> {
    store.demote(user_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{NewAccount, StudentProfileFields};
    use crate::store::MemoryStore;
    use chrono::NaiveDate;

    fn enrolled(store: &MemoryStore) -> Uuid {
        store
            .register_student(
                NewAccount {
                    first_name: "Sam".into(),
                    last_name: "Student".into(),
                    email: "sam@x.edu".into(),
                    password_hash: "hash".into(),
                    role: Role::Student,
                },
                StudentProfileFields {
                    roll_number: "21CS001".into(),
                    room_number: Some(Some("B-204".into())),
                    current_sem: None,
                    sgpa: None,
                    cgpa: None,
                    department: "CSE".into(),
                    school: "Engineering".into(),
                    student_contact_number: "9000000000".into(),
                    guardian_name: "Guardian".into(),
                    guardian_contact: "9111111111".into(),
                    course_start_date: NaiveDate::from_ymd_opt(2021, 8, 1).unwrap(),
                    expected_course_end_date: NaiveDate::from_ymd_opt(2025, 5, 31).unwrap(),
                },
            )
            .unwrap()
            .user
            .id
    }

    #[test]
    fn sub_role_must_belong_to_role() {
        assert!(validate_promotion("HOSTEL_ADMIN", "PREFECT").is_ok());
        assert!(validate_promotion("HOSTEL_ADMIN", "ASSISTANT_PREFECT").is_ok());
        assert!(validate_promotion("MESS_ADMIN", "MESS_MANAGER").is_ok());

        let err = validate_promotion("MESS_ADMIN", "PREFECT").unwrap_err();
        assert_eq!(err.code(), ErrorCode::InvalidSubRole);
        assert_eq!(validate_promotion("WARDEN", "PREFECT").unwrap_err().code(), ErrorCode::InvalidSubRole);
        assert_eq!(validate_promotion("HOSTEL_ADMIN", "CAPTAIN").unwrap_err().code(), ErrorCode::InvalidSubRole);
    }

    #[test]
    fn bad_sub_role_leaves_student_untouched() {
        let store = MemoryStore::new();
        let id = enrolled(&store);

        let err = promote(&store, id, "HOSTEL_ADMIN", "MESS_MANAGER").unwrap_err();
        assert_eq!(err.code(), ErrorCode::InvalidSubRole);

        let after = store.user_with_profiles(id).unwrap();
        assert_eq!(after.user.role, Role::Student);
        let profile = after.student_profile.unwrap();
        assert!(profile.admin_sub_role.is_none());
        assert!(profile.admin_role_assigned_at.is_none());
    }

    #[test]
    fn repeated_promotion_fails_once_promoted() {
        let store = MemoryStore::new();
        let id = enrolled(&store);
        promote(&store, id, "HOSTEL_ADMIN", "PREFECT").unwrap();

        let err = promote(&store, id, "MESS_ADMIN", "MESS_MANAGER").unwrap_err();
        assert_eq!(err.code(), ErrorCode::NotPromotable);
        let profile = store.student_profile(id).unwrap().unwrap();
        assert_eq!(profile.admin_sub_role, Some(AdminSubRole::Prefect));
    }

    #[test]
    fn demote_twice_fails_second_time() {
        let store = MemoryStore::new();
        let id = enrolled(&store);
        promote(&store, id, "MESS_ADMIN", "MESS_MANAGER").unwrap();
        assert_eq!(demote(&store, id).unwrap().role, Role::Student);
        assert_eq!(demote(&store, id).unwrap_err().code(), ErrorCode::NotDemotable);
    }
}

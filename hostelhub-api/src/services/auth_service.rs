use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use serde::Serialize;

use hostelhub_shared::errors::{AppError, AppResult, ErrorCode};
use hostelhub_shared::middleware::JwtSecret;
use hostelhub_shared::types::auth::Role;

use crate::models::{NewAccount, StaffProfileFields, StudentProfileFields, User, UserWithProfiles};
use crate::services::token_service;
use crate::store::HostelStore;

pub fn hash_password(password: &str) -> Result<String, AppError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| AppError::internal(format!("password hashing failed: {e}")))
}

pub fn verify_password(password: &str, hash: &str) -> Result<bool, AppError> {
    let parsed_hash = PasswordHash::new(hash)
        .map_err(|e| AppError::internal(format!("invalid password hash: {e}")))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Identity fields shared by every account-creating endpoint.
#[derive(Debug, Clone)]
pub struct AccountInput {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
}

impl AccountInput {
    fn into_new_account(self, role: Role) -> AppResult<NewAccount> {
        Ok(NewAccount {
            password_hash: hash_password(&self.password)?,
            first_name: self.first_name.trim().to_string(),
            last_name: self.last_name.trim().to_string(),
            email: normalize_email(&self.email),
            role,
        })
    }
}

/// Staff accounts may only carry WARDEN or CARETAKER.
pub fn parse_staff_role(raw: &str) -> AppResult<Role> {
    raw.parse::<Role>()
        .ok()
        .filter(Role::is_staff)
        .ok_or_else(|| {
            AppError::new(
                ErrorCode::InvalidStaffRole,
                format!("invalid staff role '{raw}', expected WARDEN or CARETAKER"),
            )
        })
}

#[derive(Debug, Serialize)]
pub struct LoginOutcome {
    pub token: String,
    pub user: UserWithProfiles,
}

/// Unknown email and wrong password are indistinguishable to the caller. A
/// deactivated account is refused before its password is looked at.
pub fn login(
    store: &dyn HostelStore,
    secret: &JwtSecret,
    ttl_secs: i64,
    email: &str,
    password: &str,
) -> AppResult<LoginOutcome> {
    let invalid = || AppError::new(ErrorCode::InvalidCredentials, "invalid email or password");

    let credentials = store.find_credentials(&normalize_email(email))?.ok_or_else(invalid)?;
    if !credentials.user.is_active {
        tracing::info!(user_id = %credentials.user.id, "login refused for deactivated account");
        return Err(AppError::new(ErrorCode::AccountDeactivated, "account is deactivated"));
    }
    if !verify_password(password, &credentials.password_hash)? {
        return Err(invalid());
    }

    let user = credentials.user;
    let token = token_service::issue_session_token(user.id, user.role, secret, ttl_secs)?;
    tracing::info!(user_id = %user.id, role = %user.role, "user logged in");

    Ok(LoginOutcome { token, user: store.user_with_profiles(user.id)? })
}

/// Bare STUDENT account, no profile.
pub fn create_student_account(store: &dyn HostelStore, input: AccountInput) -> AppResult<User> {
    let user = store.create_user(input.into_new_account(Role::Student)?)?;
    tracing::info!(user_id = %user.id, "student account created");
    Ok(user)
}

/// Bare staff account, no profile.
pub fn create_staff_account(store: &dyn HostelStore, input: AccountInput, role: &str) -> AppResult<User> {
    let role = parse_staff_role(role)?;
    let user = store.create_user(input.into_new_account(role)?)?;
    tracing::info!(user_id = %user.id, role = %role, "staff account created");
    Ok(user)
}

pub fn register_student(
    store: &dyn HostelStore,
    input: AccountInput,
    fields: StudentProfileFields,
) -> AppResult<UserWithProfiles> {
    let registered = store.register_student(input.into_new_account(Role::Student)?, fields)?;
    tracing::info!(user_id = %registered.user.id, "student registered");
    Ok(registered)
}

pub fn register_staff(
    store: &dyn HostelStore,
    input: AccountInput,
    role: &str,
    fields: StaffProfileFields,
) -> AppResult<UserWithProfiles> {
    let role = parse_staff_role(role)?;
    let registered = store.register_staff(input.into_new_account(role)?, fields)?;
    tracing::info!(user_id = %registered.user.id, role = %role, "staff registered");
    Ok(registered)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use hostelhub_shared::middleware::validate_jwt;

    const TTL: i64 = 86_400;

    fn input(email: &str, password: &str) -> AccountInput {
        AccountInput {
            first_name: " Wen ".into(),
            last_name: "Warden".into(),
            email: email.into(),
            password: password.into(),
        }
    }

    fn staff_fields() -> StaffProfileFields {
        StaffProfileFields {
            staff_contact_number: "8000000000".into(),
            department: "Hostel".into(),
            job_title: "Chief Warden".into(),
            office_location: Some(Some("Block A".into())),
            description: None,
        }
    }

    #[test]
    fn password_hash_roundtrip() {
        let hash = hash_password("correct horse").unwrap();
        assert!(hash.starts_with("$argon2"));
        assert!(verify_password("correct horse", &hash).unwrap());
        assert!(!verify_password("wrong horse", &hash).unwrap());
    }

    #[test]
    fn staff_role_must_be_warden_or_caretaker() {
        assert_eq!(parse_staff_role("CARETAKER").unwrap(), Role::Caretaker);
        for bad in ["STUDENT", "HOSTEL_ADMIN", "caretaker", "Warden"] {
            assert_eq!(parse_staff_role(bad).unwrap_err().code(), ErrorCode::InvalidStaffRole);
        }
    }

    #[test]
    fn login_token_carries_stored_role() {
        let store = MemoryStore::new();
        let secret = JwtSecret::new("login-test");
        register_staff(&store, input("Warden@X.edu ", "correct"), "WARDEN", staff_fields()).unwrap();

        let outcome = login(&store, &secret, TTL, "warden@x.edu", "correct").unwrap();
        let claims = validate_jwt(&outcome.token, &secret).unwrap();
        assert_eq!(claims.role, Role::Warden);
        assert_eq!(claims.user_id, outcome.user.user.id);
        assert_eq!(outcome.user.user.first_name, "Wen");
        assert!(outcome.user.staff_profile.is_some());
    }

    #[test]
    fn login_rejects_bad_credentials() {
        let store = MemoryStore::new();
        let secret = JwtSecret::new("login-test");
        create_student_account(&store, input("s@x.edu", "correct")).unwrap();

        let wrong = login(&store, &secret, TTL, "s@x.edu", "nope").unwrap_err();
        assert_eq!(wrong.code(), ErrorCode::InvalidCredentials);
        let unknown = login(&store, &secret, TTL, "ghost@x.edu", "correct").unwrap_err();
        assert_eq!(unknown.code(), ErrorCode::InvalidCredentials);
    }

    #[test]
    fn deactivated_account_is_forbidden_regardless_of_password() {
        let store = MemoryStore::new();
        let secret = JwtSecret::new("login-test");
        let user = create_student_account(&store, input("s@x.edu", "correct")).unwrap();
        store.set_user_active(user.id, false).unwrap();

        for password in ["correct", "wrong"] {
            let err = login(&store, &secret, TTL, "s@x.edu", password).unwrap_err();
            assert_eq!(err.code(), ErrorCode::AccountDeactivated);
        }
    }

    #[test]
    fn staff_account_rejects_student_role_without_writing() {
        let store = MemoryStore::new();
        let err = create_staff_account(&store, input("x@x.edu", "pw"), "STUDENT").unwrap_err();
        assert_eq!(err.code(), ErrorCode::InvalidStaffRole);
        assert!(store.find_credentials("x@x.edu").unwrap().is_none());
    }
}

use hostelhub_shared::errors::AppResult;

use crate::config::AppConfig;
use crate::models::User;
use crate::services::auth_service::{self, AccountInput};
use crate::store::HostelStore;

/// Creates the first WARDEN from config. Returns `None` when the email is
/// already taken, so reruns are harmless.
pub fn ensure_default_warden(store: &dyn HostelStore, config: &AppConfig) -> AppResult<Option<User>> {
    let email = auth_service::normalize_email(&config.default_warden_email);
    if let Some(existing) = store.find_credentials(&email)? {
        tracing::info!(user_id = %existing.user.id, email = %email, "default warden already present");
        return Ok(None);
    }

    let user = auth_service::create_staff_account(
        store,
        AccountInput {
            first_name: config.default_warden_first_name.clone(),
            last_name: config.default_warden_last_name.clone(),
            email,
            password: config.default_warden_password.clone(),
        },
        "WARDEN",
    )?;
    Ok(Some(user))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use hostelhub_shared::types::auth::Role;

    #[test]
    fn seeding_is_idempotent() {
        let store = MemoryStore::new();
        let config = AppConfig {
            default_warden_email: "Chief@Hostel.edu".into(),
            default_warden_password: "changeme".into(),
            ..AppConfig::default()
        };

        let created = ensure_default_warden(&store, &config).unwrap().unwrap();
        assert_eq!(created.role, Role::Warden);
        assert_eq!(created.email, "chief@hostel.edu");

        assert!(ensure_default_warden(&store, &config).unwrap().is_none());
    }
}

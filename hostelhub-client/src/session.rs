//! Session lifecycle: restored once at start-up, begun on login, ended on
//! logout or when the server rejects the token.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use hostelhub_shared::types::auth::Role;

use crate::error::ClientError;
use crate::models::{Account, LoginOutcome, StaffProfile, StudentProfile};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Session {
    pub token: String,
    pub user: Account,
}

impl Session {
    pub fn role(&self) -> Role {
        self.user.user.role
    }

    pub fn has_staff_profile(&self) -> bool {
        self.user.staff_profile.is_some()
    }

    pub fn has_student_profile(&self) -> bool {
        self.user.student_profile.is_some()
    }
}

impl From<LoginOutcome> for Session {
    fn from(outcome: LoginOutcome) -> Self {
        Self { token: outcome.token, user: outcome.user }
    }
}

/// Owns the persisted session file and the in-memory copy of it.
#[derive(Debug)]
pub struct SessionStore {
    path: PathBuf,
    current: Option<Session>,
}

impl SessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into(), current: None }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn current(&self) -> Option<&Session> {
        self.current.as_ref()
    }

    /// Loads the persisted session. A missing or unreadable file means signed out.
    pub fn restore(&mut self) -> Option<&Session> {
        self.current = match std::fs::read(&self.path) {
            Ok(bytes) => match serde_json::from_slice::<Session>(&bytes) {
                Ok(session) => Some(session),
                Err(e) => {
                    tracing::warn!(path = %self.path.display(), error = %e, "discarding unreadable session file");
                    None
                }
            },
            Err(e) if e.kind() == ErrorKind::NotFound => None,
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "failed to read session file");
                None
            }
        };
        self.current.as_ref()
    }

    pub fn begin(&mut self, session: Session) -> Result<&Session, ClientError> {
        self.persist(&session)?;
        tracing::debug!(user_id = %session.user.user.id, role = %session.role(), "session started");
        Ok(self.current.insert(session))
    }

    /// Clears the session file. Ending an absent session is not an error.
    pub fn end(&mut self) -> Result<(), ClientError> {
        self.current = None;
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    /// Records a freshly saved staff profile so the navigation gate lets the user through.
    pub fn record_staff_profile(&mut self, profile: StaffProfile) -> Result<(), ClientError> {
        self.update(|session| session.user.staff_profile = Some(profile))
    }

    pub fn record_student_profile(&mut self, profile: StudentProfile) -> Result<(), ClientError> {
        self.update(|session| session.user.student_profile = Some(profile))
    }

    fn update(&mut self, change: impl FnOnce(&mut Session)) -> Result<(), ClientError> {
        let Some(mut session) = self.current.take() else {
            return Err(ClientError::NotSignedIn);
        };
        change(&mut session);
        let persisted = self.persist(&session);
        self.current = Some(session);
        persisted
    }

    fn persist(&self, session: &Session) -> Result<(), ClientError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, serde_json::to_vec_pretty(session)?)?;
        Ok(())
    }
}

use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Role tag carried by every user and embedded in every session token.
///
/// Variant order is significant: committee listings sort by it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Student,
    Warden,
    Caretaker,
    HostelAdmin,
    MessAdmin,
}

/// Which profile table applies to a role.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileKind {
    Staff,
    Student,
}

impl Role {
    pub const STAFF: [Role; 2] = [Role::Warden, Role::Caretaker];
    pub const STUDENT_FAMILY: [Role; 3] = [Role::Student, Role::HostelAdmin, Role::MessAdmin];
    pub const COMMITTEE: [Role; 4] = [Role::Warden, Role::Caretaker, Role::HostelAdmin, Role::MessAdmin];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Student => "STUDENT",
            Role::Warden => "WARDEN",
            Role::Caretaker => "CARETAKER",
            Role::HostelAdmin => "HOSTEL_ADMIN",
            Role::MessAdmin => "MESS_ADMIN",
        }
    }

    pub fn is_staff(&self) -> bool {
        matches!(self, Role::Warden | Role::Caretaker)
    }

    pub fn is_student_admin(&self) -> bool {
        matches!(self, Role::HostelAdmin | Role::MessAdmin)
    }

    pub fn profile_kind(&self) -> ProfileKind {
        if self.is_staff() {
            ProfileKind::Staff
        } else {
            ProfileKind::Student
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "STUDENT" => Ok(Role::Student),
            "WARDEN" => Ok(Role::Warden),
            "CARETAKER" => Ok(Role::Caretaker),
            "HOSTEL_ADMIN" => Ok(Role::HostelAdmin),
            "MESS_ADMIN" => Ok(Role::MessAdmin),
            _ => Err(format!("unknown role: {s}")),
        }
    }
}

/// Title held by a student admin. Each admin role accepts a fixed set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AdminSubRole {
    Prefect,
    AssistantPrefect,
    MessManager,
}

impl AdminSubRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            AdminSubRole::Prefect => "PREFECT",
            AdminSubRole::AssistantPrefect => "ASSISTANT_PREFECT",
            AdminSubRole::MessManager => "MESS_MANAGER",
        }
    }

    /// Sub-roles a promotion to `role` may carry. Empty for non-admin roles.
    pub fn allowed_for(role: Role) -> &'static [AdminSubRole] {
        match role {
            Role::HostelAdmin => &[AdminSubRole::Prefect, AdminSubRole::AssistantPrefect],
            Role::MessAdmin => &[AdminSubRole::MessManager],
            _ => &[],
        }
    }

    pub fn belongs_to(&self, role: Role) -> bool {
        Self::allowed_for(role).contains(self)
    }
}

impl std::fmt::Display for AdminSubRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for AdminSubRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PREFECT" => Ok(AdminSubRole::Prefect),
            "ASSISTANT_PREFECT" => Ok(AdminSubRole::AssistantPrefect),
            "MESS_MANAGER" => Ok(AdminSubRole::MessManager),
            _ => Err(format!("unknown admin sub-role: {s}")),
        }
    }
}

/// Session token payload: `{userId, role}` plus issue and expiry timestamps.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    #[serde(rename = "userId")]
    pub user_id: Uuid,
    pub role: Role,
    pub iat: i64,
    pub exp: i64,
}

impl Claims {
    pub fn new(user_id: Uuid, role: Role, duration_secs: i64) -> Self {
        let now = Utc::now().timestamp();
        Self {
            user_id,
            role,
            iat: now,
            exp: now + duration_secs,
        }
    }

    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() > self.exp
    }
}

/// Identity attached to a request once the access gate has accepted its token.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: Uuid,
    pub role: Role,
}

impl From<Claims> for AuthUser {
    fn from(claims: Claims) -> Self {
        Self {
            id: claims.user_id,
            role: claims.role,
        }
    }
}

use reqwest::StatusCode;

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("not signed in")]
    NotSignedIn,

    /// The server rejected the session token. The caller must end the session.
    #[error("session expired, sign in again")]
    SessionExpired,

    #[error("{message}")]
    Api {
        status: StatusCode,
        code: String,
        message: String,
        details: Option<serde_json::Value>,
    },

    #[error("unexpected response ({status}): {body}")]
    UnexpectedResponse { status: StatusCode, body: String },

    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("session storage error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ClientError {
    /// Server error code (`E1002`, ...) when the failure came from the API envelope.
    pub fn code(&self) -> Option<&str> {
        match self {
            ClientError::Api { code, .. } => Some(code),
            _ => None,
        }
    }

    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ClientError::Api { status, .. } | ClientError::UnexpectedResponse { status, .. } => Some(*status),
            ClientError::SessionExpired => Some(StatusCode::UNAUTHORIZED),
            ClientError::Http(err) => err.status(),
            _ => None,
        }
    }

    /// Whether the caller should drop the session and return to the login page.
    pub fn ends_session(&self) -> bool {
        matches!(self, ClientError::SessionExpired | ClientError::NotSignedIn)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_error_exposes_code_and_status() {
        let err = ClientError::Api {
            status: StatusCode::CONFLICT,
            code: "E1002".into(),
            message: "email already registered".into(),
            details: None,
        };
        assert_eq!(err.code(), Some("E1002"));
        assert_eq!(err.status(), Some(StatusCode::CONFLICT));
        assert_eq!(err.to_string(), "email already registered");
        assert!(!err.ends_session());
    }

    #[test]
    fn expiry_ends_session() {
        assert!(ClientError::SessionExpired.ends_session());
        assert_eq!(ClientError::SessionExpired.status(), Some(StatusCode::UNAUTHORIZED));
    }
}

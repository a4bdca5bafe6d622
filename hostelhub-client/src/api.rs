use reqwest::{Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use uuid::Uuid;

use hostelhub_shared::types::auth::{AdminSubRole, Role};
use hostelhub_shared::types::{ApiErrorBody, ApiResponse};

use crate::error::ClientError;
use crate::forms::{StaffProfileForm, StudentProfileForm};
use crate::models::{
    Account, Action, ActionUpdate, CommitteeMember, LoginOutcome, NewAccount, NewAction, StaffProfile,
    StaffRegistration, StudentDetails, StudentListItem, StudentProfile, StudentRegistration, User,
    UserEnvelope,
};
use crate::session::Session;

/// Error code the server uses for a token that fails verification.
const TOKEN_INVALID: &str = "E1004";

/// Typed access to every HostelHub endpoint.
///
/// Carries the bearer token of the current session, if any. Requests that
/// need a session fail with [`ClientError::NotSignedIn`] before hitting the
/// network, and a rejected token surfaces as [`ClientError::SessionExpired`].
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_http(reqwest::Client::new(), base_url)
    }

    pub fn with_http(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: None,
        }
    }

    pub fn set_session(&mut self, session: Option<&Session>) {
        self.token = session.map(|s| s.token.clone());
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    // --- Auth ---

    pub async fn login(&self, email: &str, password: &str) -> Result<LoginOutcome, ClientError> {
        let body = serde_json::json!({ "email": email, "password": password });
        let request = self.http.post(self.url("/api/auth/login")).json(&body);
        decode(request, false).await
    }

    pub async fn register_student(&self, registration: &StudentRegistration) -> Result<Account, ClientError> {
        self.send_json(Method::POST, "/api/auth/register/student", registration).await
    }

    pub async fn register_staff(&self, registration: &StaffRegistration) -> Result<Account, ClientError> {
        self.send_json(Method::POST, "/api/auth/register/staff", registration).await
    }

    // --- Own profiles ---

    pub async fn my_staff_profile(&self) -> Result<StaffProfile, ClientError> {
        decode(self.authed(Method::GET, "/api/staff/profile")?, true).await
    }

    pub async fn save_staff_profile(&self, form: StaffProfileForm) -> Result<StaffProfile, ClientError> {
        let request = self.authed(Method::POST, "/api/staff/profile")?.multipart(form.into_multipart()?);
        decode(request, true).await
    }

    pub async fn my_student_profile(&self) -> Result<StudentProfile, ClientError> {
        decode(self.authed(Method::GET, "/api/student/profile")?, true).await
    }

    pub async fn save_student_profile(&self, form: StudentProfileForm) -> Result<StudentProfile, ClientError> {
        let request = self.authed(Method::POST, "/api/student/profile")?.multipart(form.into_multipart()?);
        decode(request, true).await
    }

    // --- Staff views and the disciplinary ledger ---

    pub async fn student_details(&self, student_profile_id: Uuid) -> Result<StudentDetails, ClientError> {
        let path = format!("/api/staff/{student_profile_id}/details");
        decode(self.authed(Method::GET, &path)?, true).await
    }

    pub async fn student_actions(&self, student_profile_id: Uuid) -> Result<Vec<Action>, ClientError> {
        let path = format!("/api/staff/{student_profile_id}/actions");
        decode(self.authed(Method::GET, &path)?, true).await
    }

    pub async fn create_action(&self, action: &NewAction) -> Result<Action, ClientError> {
        self.send_json(Method::POST, "/api/staff/action", action).await
    }

    pub async fn update_action(&self, action_id: Uuid, update: &ActionUpdate) -> Result<Action, ClientError> {
        self.send_json(Method::PATCH, &format!("/api/staff/action/{action_id}"), update).await
    }

    // --- Warden administration ---

    pub async fn promote(&self, student_user_id: Uuid, new_role: Role, sub_role: AdminSubRole) -> Result<User, ClientError> {
        let body = serde_json::json!({
            "studentUserId": student_user_id,
            "newRole": new_role,
            "adminSubRole": sub_role,
        });
        let envelope: UserEnvelope = self.send_json(Method::POST, "/api/users/promote", &body).await?;
        Ok(envelope.user)
    }

    pub async fn demote(&self, student_user_id: Uuid) -> Result<User, ClientError> {
        let body = serde_json::json!({ "studentUserId": student_user_id });
        let envelope: UserEnvelope = self.send_json(Method::POST, "/api/users/demote", &body).await?;
        Ok(envelope.user)
    }

    pub async fn create_student(&self, account: &NewAccount) -> Result<User, ClientError> {
        self.send_json(Method::POST, "/api/users/create-student", account).await
    }

    pub async fn create_staff(&self, account: &NewAccount, role: Role) -> Result<User, ClientError> {
        let mut body = serde_json::to_value(account)?;
        body["role"] = serde_json::to_value(role)?;
        self.send_json(Method::POST, "/api/users/create-staff", &body).await
    }

    pub async fn list_students(&self, search: &str) -> Result<Vec<StudentListItem>, ClientError> {
        let request = self.authed(Method::GET, "/api/users/students")?.query(&[("search", search)]);
        decode(request, true).await
    }

    pub async fn set_user_active(&self, user_id: Uuid, is_active: bool) -> Result<User, ClientError> {
        let body = serde_json::json!({ "isActive": is_active });
        self.send_json(Method::PATCH, &format!("/api/users/{user_id}/status"), &body).await
    }

    // --- Public ---

    pub async fn committee(&self) -> Result<Vec<CommitteeMember>, ClientError> {
        decode(self.http.get(self.url("/public/committee")), false).await
    }

    pub async fn is_healthy(&self) -> Result<bool, ClientError> {
        let response = self.http.get(self.url("/api/health")).send().await?;
        Ok(response.status().is_success())
    }

    // --- Plumbing ---

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authed(&self, method: Method, path: &str) -> Result<RequestBuilder, ClientError> {
        let token = self.token.as_deref().ok_or(ClientError::NotSignedIn)?;
        Ok(self.http.request(method, self.url(path)).bearer_auth(token))
    }

    async fn send_json<B, T>(&self, method: Method, path: &str, body: &B) -> Result<T, ClientError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned + Serialize,
    {
        decode(self.authed(method, path)?.json(body), true).await
    }
}

/// Sends `request` and unwraps the `{success, data}` envelope.
async fn decode<T>(request: RequestBuilder, authed: bool) -> Result<T, ClientError>
where
    T: DeserializeOwned + Serialize,
{
    let response = request.send().await?;
    let status = response.status();
    let bytes = response.bytes().await?;

    if status.is_success() {
        let envelope: ApiResponse<T> = serde_json::from_slice(&bytes)?;
        return Ok(envelope.data);
    }

    let error = serde_json::from_slice::<ApiErrorBody>(&bytes).ok();
    if authed && session_rejected(status, error.as_ref()) {
        tracing::debug!(status = %status, "session rejected by server");
        return Err(ClientError::SessionExpired);
    }

    Err(match error {
        Some(body) => ClientError::Api {
            status,
            code: body.error.code,
            message: body.error.message,
            details: body.error.details,
        },
        None => ClientError::UnexpectedResponse {
            status,
            body: String::from_utf8_lossy(&bytes).into_owned(),
        },
    })
}

fn session_rejected(status: StatusCode, error: Option<&ApiErrorBody>) -> bool {
    status == StatusCode::UNAUTHORIZED
        || (status == StatusCode::FORBIDDEN && error.is_some_and(|e| e.error.code == TOKEN_INVALID))
}

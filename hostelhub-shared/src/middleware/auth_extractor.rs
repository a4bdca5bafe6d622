//! Access gate: bearer-token authentication followed by role authorization.
//!
//! `AuthUser` alone only authenticates. Handlers that need authorization take a
//! `RequireRole<P>` instead, whose policy `P` names the route's allow-list.

use std::marker::PhantomData;
use std::ops::Deref;
use std::sync::Arc;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::{header, HeaderMap};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};

use crate::errors::{AppError, ErrorCode};
use crate::types::auth::{AuthUser, Claims, Role};

/// HMAC secret used to verify session tokens. Cheap to clone.
#[derive(Clone)]
pub struct JwtSecret(Arc<str>);

impl JwtSecret {
    pub fn new(secret: impl Into<Arc<str>>) -> Self {
        Self(secret.into())
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

impl std::fmt::Debug for JwtSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("JwtSecret(..)")
    }
}

/// Router state the gate can pull the verification secret from.
pub trait GateState {
    fn jwt_secret(&self) -> &JwtSecret;
}

impl GateState for JwtSecret {
    fn jwt_secret(&self) -> &JwtSecret {
        self
    }
}

impl<T: GateState> GateState for Arc<T> {
    fn jwt_secret(&self) -> &JwtSecret {
        (**self).jwt_secret()
    }
}

#[axum::async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: GateState + Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let token = extract_bearer_token(&parts.headers)?;
        let claims = validate_jwt(token, state.jwt_secret())?;

        if claims.is_expired() {
            return Err(AppError::new(ErrorCode::TokenExpired, "token has expired"));
        }

        Ok(AuthUser::from(claims))
    }
}

fn extract_bearer_token(headers: &HeaderMap) -> Result<&str, AppError> {
    let auth_header = headers
        .get(header::AUTHORIZATION)
        .ok_or_else(|| AppError::unauthorized("access denied, no token provided"))?
        .to_str()
        .map_err(|_| AppError::unauthorized("invalid authorization header"))?;

    auth_header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| AppError::unauthorized("authorization header must use Bearer scheme"))
}

/// Expired tokens map to `TokenExpired` (401), any other failure to `TokenInvalid` (403).
pub fn validate_jwt(token: &str, secret: &JwtSecret) -> Result<Claims, AppError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = true;
    validation.leeway = 0;

    let token_data = decode::<Claims>(token, &DecodingKey::from_secret(secret.as_bytes()), &validation)
        .map_err(|e| match e.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => {
                AppError::new(ErrorCode::TokenExpired, "token has expired")
            }
            _ => AppError::new(ErrorCode::TokenInvalid, format!("invalid token: {e}")),
        })?;

    Ok(token_data.claims)
}

/// Rejects `user` unless its role is in `allowed`.
pub fn authorize(user: &AuthUser, allowed: &[Role]) -> Result<(), AppError> {
    if allowed.contains(&user.role) {
        Ok(())
    } else {
        tracing::debug!(user_id = %user.id, role = %user.role, "role not permitted on route");
        Err(AppError::forbidden("you do not have permission to perform this action"))
    }
}

/// A route's role allow-list.
pub trait RolePolicy: Send + Sync + 'static {
    const ALLOWED: &'static [Role];
}

/// Authenticated identity whose role passed policy `P`.
pub struct RequireRole<P> {
    pub user: AuthUser,
    _policy: PhantomData<fn() -> P>,
}

impl<P> Deref for RequireRole<P> {
    type Target = AuthUser;

    fn deref(&self) -> &AuthUser {
        &self.user
    }
}

#[axum::async_trait]
impl<S, P> FromRequestParts<S> for RequireRole<P>
where
    P: RolePolicy,
    S: GateState + Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        authorize(&user, P::ALLOWED)?;
        Ok(Self { user, _policy: PhantomData })
    }
}

pub struct StaffPolicy;
impl RolePolicy for StaffPolicy {
    const ALLOWED: &'static [Role] = &Role::STAFF;
}

pub struct StudentPolicy;
impl RolePolicy for StudentPolicy {
    const ALLOWED: &'static [Role] = &Role::STUDENT_FAMILY;
}

pub struct WardenPolicy;
impl RolePolicy for WardenPolicy {
    const ALLOWED: &'static [Role] = &[Role::Warden];
}

/// Who may enrol new students.
pub struct RegistrarPolicy;
impl RolePolicy for RegistrarPolicy {
    const ALLOWED: &'static [Role] = &[Role::Warden, Role::HostelAdmin];
}

pub type StaffUser = RequireRole<StaffPolicy>;
pub type StudentUser = RequireRole<StudentPolicy>;
pub type WardenUser = RequireRole<WardenPolicy>;
pub type RegistrarUser = RequireRole<RegistrarPolicy>;

use jsonwebtoken::{encode, EncodingKey, Header};
use uuid::Uuid;

use hostelhub_shared::errors::AppError;
use hostelhub_shared::middleware::JwtSecret;
use hostelhub_shared::types::auth::{Claims, Role};

/// Signs an HS256 session token carrying `{userId, role}`.
pub fn issue_session_token(
    user_id: Uuid,
    role: Role,
    secret: &JwtSecret,
    ttl_secs: i64,
) -> Result<String, AppError> {
    let claims = Claims::new(user_id, role, ttl_secs);
    encode(&Header::default(), &claims, &EncodingKey::from_secret(secret.as_bytes()))
        .map_err(|e| AppError::internal(format!("JWT encoding failed: {e}")))
}

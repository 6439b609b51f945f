use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::db::models::{Role, User};
use crate::error::{AppError, AppResult};

/// Identity carried by a signed token. Stateless: verification trusts the
/// signature alone, there is no server-side session record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: i64,
    pub username: String,
    pub role: Role,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exp: Option<u64>,
}

/// Sign a claim for the given user. `token_hours` unset means the token
/// never expires.
pub fn issue(secret: &str, user: &User, token_hours: Option<u64>) -> AppResult<String> {
    let exp = token_hours.map(|hours| {
        let now = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs();
        now + hours * 3600
    });

    let claims = Claims {
        sub: user.id,
        username: user.username.clone(),
        role: user.role,
        exp,
    };

    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(format!("token signing failed: {}", e)))
}

/// Verify signature and structure; an `exp` claim, when present, must not
/// have passed. Every failure collapses to `Unauthorized`.
pub fn verify(secret: &str, token: &str) -> AppResult<Claims> {
    let mut validation = Validation::new(Algorithm::HS256);
    // exp is optional: tokens without one never expire
    validation.required_spec_claims.clear();

    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map(|data| data.claims)
    .map_err(|_| AppError::Unauthorized)
}

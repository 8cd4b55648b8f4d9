/// Session tokens
///
/// Tokens are HS256-signed JWTs whose payload is the caller's [`Identity`]
/// plus the registered claims. There is no refresh flow: once a token
/// expires the user signs in again.
///
/// # Example
///
/// ```
/// use projectdesk_shared::auth::jwt::{create_token, validate_token, Claims};
/// use projectdesk_shared::auth::middleware::Identity;
/// use projectdesk_shared::models::user::{Role, UserStatus};
/// use chrono::Duration;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let identity = Identity {
///     id: 7,
///     email: Some("olga@example.com".into()),
///     first_name: Some("Olga".into()),
///     last_name: None,
///     middle_name: None,
///     role: Role::Specialist,
///     status: UserStatus::Specialist,
/// };
///
/// let secret = "a-secret-of-at-least-thirty-two-bytes!";
/// let token = create_token(&Claims::new(identity, Duration::days(14)), secret)?;
/// assert_eq!(validate_token(&token, secret)?.identity.id, 7);
/// # Ok(())
/// # }
/// ```

use super::middleware::Identity;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

/// `iss` claim of every token this service issues.
pub const ISSUER: &str = "projectdesk";

/// Default token lifetime.
pub const DEFAULT_EXPIRY_DAYS: i64 = 14;

#[derive(Debug, thiserror::Error)]
pub enum JwtError {
    #[error("Failed to create token: {0}")]
    CreateError(String),

    #[error("Token has expired")]
    Expired,

    #[error("Invalid token: {0}")]
    Invalid(String),
}

/// Registered claims plus the identity payload, flattened into one object:
/// `{id, email, firstName, lastName, middleName, role, status, iss, iat, exp, nbf}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    #[serde(flatten)]
    pub identity: Identity,
    pub iss: String,
    pub iat: i64,
    pub exp: i64,
    pub nbf: i64,
}

impl Claims {
    pub fn new(identity: Identity, expires_in: Duration) -> Self {
        let now = Utc::now();
        Self {
            identity,
            iss: ISSUER.to_string(),
            iat: now.timestamp(),
            exp: (now + expires_in).timestamp(),
            nbf: now.timestamp(),
        }
    }

    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() >= self.exp
    }
}

pub fn create_token(claims: &Claims, secret: &str) -> Result<String, JwtError> {
    encode(
        &Header::new(Algorithm::HS256),
        claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| JwtError::CreateError(e.to_string()))
}

/// Checks signature, issuer, `exp` and `nbf`, then returns the claims.
pub fn validate_token(token: &str, secret: &str) -> Result<Claims, JwtError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_issuer(&[ISSUER]);
    validation.validate_exp = true;
    validation.validate_nbf = true;
    validation.leeway = 0;

    decode::<Claims>(token, &DecodingKey::from_secret(secret.as_bytes()), &validation)
        .map(|data| data.claims)
        .map_err(|e| match e.kind() {
            ErrorKind::ExpiredSignature => JwtError::Expired,
            _ => JwtError::Invalid(e.to_string()),
        })
}

/// Request identity and guard rejections
///
/// The guard layer in the API crate verifies the bearer token and stores the
/// resulting [`Identity`] in the request extensions. Handlers obtain it only
/// through the [`Identity`] extractor and pass it explicitly to services.
///
/// # Example
///
/// ```no_run
/// use projectdesk_shared::auth::middleware::Identity;
///
/// async fn whoami(identity: Identity) -> String {
///     format!("{} ({})", identity.id, identity.role)
/// }
/// ```

use crate::models::user::{Role, UserStatus};
use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{request::Parts, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use super::jwt::JwtError;

/// Authenticated caller, decoded from the session token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Identity {
    pub id: i32,
    pub email: Option<String>,
    #[serde(rename = "firstName")]
    pub first_name: Option<String>,
    #[serde(rename = "lastName")]
    pub last_name: Option<String>,
    #[serde(rename = "middleName")]
    pub middle_name: Option<String>,
    pub role: Role,
    pub status: UserStatus,
}

/// Why the guard refused a request.
#[derive(Debug, thiserror::Error)]
pub enum GuardError {
    #[error("Missing authorization header")]
    MissingToken,

    #[error("Expected a Bearer token")]
    MalformedToken,

    #[error("{0}")]
    InvalidToken(#[from] JwtError),

    #[error("Role {role} is not allowed to access this resource")]
    Forbidden { role: Role },
}

impl GuardError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            GuardError::Forbidden { .. } => StatusCode::FORBIDDEN,
            _ => StatusCode::UNAUTHORIZED,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            GuardError::Forbidden { .. } => "forbidden",
            _ => "unauthorized",
        }
    }
}

impl IntoResponse for GuardError {
    fn into_response(self) -> Response {
        let body = serde_json::json!({
            "error": self.error_code(),
            "message": self.to_string(),
        });
        (self.status_code(), Json(body)).into_response()
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for Identity
where
    S: Send + Sync,
{
    type Rejection = GuardError;

    /// Reads the identity attached by the guard. Using this extractor on a
    /// route without a guard is rejected as unauthenticated.
    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Identity>()
            .cloned()
            .ok_or(GuardError::MissingToken)
    }
}

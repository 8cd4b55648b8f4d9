/// Error handling for the API server
///
/// Handlers return [`ApiResult`]; every library error converts into
/// [`ApiError`], which renders as `{error, message, details?}` JSON.
///
/// Storage failures are reported as `400 Bad Request` carrying the driver
/// message, so clients see constraint violations and similar faults directly.
///
/// # Example
///
/// ```no_run
/// use projectdesk_api::error::ApiResult;
/// use projectdesk_shared::services::CompetencyService;
/// use projectdesk_shared::models::competency::Competency;
/// use axum::Json;
/// use sqlx::PgPool;
///
/// async fn handler(pool: PgPool) -> ApiResult<Json<Vec<Competency>>> {
///     Ok(Json(CompetencyService::new(&pool).all().await?))
/// }
/// ```

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use projectdesk_shared::auth::middleware::GuardError;
use projectdesk_shared::export::ExportError;
use projectdesk_shared::services::ServiceError;
use serde::{Deserialize, Serialize};
use std::fmt;

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug)]
pub enum ApiError {
    /// 400
    BadRequest(String),

    /// 401
    Unauthorized(String),

    /// 403
    Forbidden(String),

    /// 404
    NotFound(String),

    /// 400 with the offending fields
    ValidationError(Vec<ValidationErrorDetail>),

    /// 500
    InternalError(String),

    /// 503
    ServiceUnavailable(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationErrorDetail {
    pub field: String,
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Machine-readable code, e.g. `bad_request`
    pub error: String,

    pub message: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<ValidationErrorDetail>>,
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) | ApiError::ValidationError(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            ApiError::BadRequest(_) => "bad_request",
            ApiError::Unauthorized(_) => "unauthorized",
            ApiError::Forbidden(_) => "forbidden",
            ApiError::NotFound(_) => "not_found",
            ApiError::ValidationError(_) => "validation_error",
            ApiError::InternalError(_) => "internal_error",
            ApiError::ServiceUnavailable(_) => "service_unavailable",
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            ApiError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            ApiError::Forbidden(msg) => write!(f, "Forbidden: {}", msg),
            ApiError::NotFound(msg) => write!(f, "Not found: {}", msg),
            ApiError::ValidationError(errors) => write!(f, "Validation failed: {} errors", errors.len()),
            ApiError::InternalError(msg) => write!(f, "Internal error: {}", msg),
            ApiError::ServiceUnavailable(msg) => write!(f, "Service unavailable: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let error = self.error_code().to_string();

        let (message, details) = match self {
            ApiError::ValidationError(errors) => ("Request validation failed".to_string(), Some(errors)),
            ApiError::InternalError(msg) => {
                tracing::error!(error = %msg, "Internal error");
                ("An internal error occurred".to_string(), None)
            }
            ApiError::BadRequest(msg)
            | ApiError::Unauthorized(msg)
            | ApiError::Forbidden(msg)
            | ApiError::NotFound(msg)
            | ApiError::ServiceUnavailable(msg) => (msg, None),
        };

        (status, Json(ErrorResponse { error, message, details })).into_response()
    }
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Storage(e) => {
                tracing::warn!(error = %e, "Storage error reported as bad request");
                ApiError::BadRequest(e.to_string())
            }
            ServiceError::NotFound { .. } => ApiError::NotFound(err.to_string()),
            ServiceError::InvalidUser
            | ServiceError::WrongCredentials
            | ServiceError::UserExists
            | ServiceError::PasswordConfirmation => ApiError::BadRequest(err.to_string()),
            ServiceError::Export(ExportError::NotConfigured) => {
                ApiError::ServiceUnavailable("Export storage is not configured".to_string())
            }
            ServiceError::Token(e) => ApiError::InternalError(format!("Token creation failed: {}", e)),
            ServiceError::Password(e) => ApiError::InternalError(format!("Password operation failed: {}", e)),
            ServiceError::Mail(e) => ApiError::InternalError(format!("Mail delivery failed: {}", e)),
            ServiceError::Export(e) => ApiError::InternalError(format!("Export failed: {}", e)),
            ServiceError::Internal(msg) => ApiError::InternalError(msg),
        }
    }
}

impl From<GuardError> for ApiError {
    fn from(err: GuardError) -> Self {
        match err {
            GuardError::Forbidden { .. } => ApiError::Forbidden(err.to_string()),
            _ => ApiError::Unauthorized(err.to_string()),
        }
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut details: Vec<ValidationErrorDetail> = errors
            .field_errors()
            .iter()
            .flat_map(|(field, errors)| {
                errors.iter().map(move |error| ValidationErrorDetail {
                    field: field.to_string(),
                    message: error
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| format!("invalid ({})", error.code)),
                })
            })
            .collect();
        details.sort_by(|a, b| a.field.cmp(&b.field));
        ApiError::ValidationError(details)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use projectdesk_shared::models::user::Role;
    use validator::Validate;

    #[test]
    fn test_error_display() {
        let err = ApiError::BadRequest("Invalid input".to_string());
        assert_eq!(err.to_string(), "Bad request: Invalid input");

        let err = ApiError::NotFound("Task 4 not found".to_string());
        assert_eq!(err.to_string(), "Not found: Task 4 not found");
    }

    #[test]
    fn test_service_error_mapping() {
        let cases = [
            (ServiceError::InvalidUser, StatusCode::BAD_REQUEST),
            (ServiceError::WrongCredentials, StatusCode::BAD_REQUEST),
            (ServiceError::UserExists, StatusCode::BAD_REQUEST),
            (ServiceError::Storage(sqlx::Error::RowNotFound), StatusCode::BAD_REQUEST),
            (ServiceError::not_found("Project", 1), StatusCode::NOT_FOUND),
            (ServiceError::Export(ExportError::NotConfigured), StatusCode::SERVICE_UNAVAILABLE),
            (ServiceError::Internal("boom".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];

        for (err, status) in cases {
            assert_eq!(ApiError::from(err).status_code(), status);
        }
    }

    #[test]
    fn test_credential_messages_pass_through() {
        match ApiError::from(ServiceError::InvalidUser) {
            ApiError::BadRequest(msg) => assert_eq!(msg, "INVALID USER"),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_guard_error_mapping() {
        assert_eq!(
            ApiError::from(GuardError::MissingToken).status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ApiError::from(GuardError::Forbidden { role: Role::Guest }).status_code(),
            StatusCode::FORBIDDEN
        );
    }

    #[derive(Validate)]
    struct Probe {
        #[validate(email(message = "Invalid email format"))]
        login: String,
        #[validate(length(min = 1))]
        title: String,
    }

    #[test]
    fn test_validation_errors_list_fields() {
        let probe = Probe {
            login: "nope".into(),
            title: String::new(),
        };
        let err = ApiError::from(probe.validate().unwrap_err());

        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        match err {
            ApiError::ValidationError(details) => {
                let fields: Vec<_> = details.iter().map(|d| d.field.as_str()).collect();
                assert_eq!(fields, vec!["login", "title"]);
                assert_eq!(details[0].message, "Invalid email format");
                assert_eq!(details[1].message, "invalid (length)");
            }
            other => panic!("unexpected {:?}", other),
        }
    }
}

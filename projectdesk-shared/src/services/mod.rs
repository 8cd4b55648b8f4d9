/// Entity services
///
/// Each service borrows the pool for the duration of a request and combines
/// query shaping, visibility rules and model calls. Multi-step writes run in
/// one transaction. The caller's [`Identity`](crate::auth::middleware::Identity)
/// is passed explicitly wherever results depend on who is asking.

pub mod association;
pub mod auth;
pub mod competency;
pub mod project;
pub mod task;
pub mod user;

pub use association::{diff, AssociationDiff, Mode};
pub use auth::AuthService;
pub use competency::CompetencyService;
pub use project::ProjectService;
pub use task::TaskService;
pub use user::UserService;

use crate::auth::jwt::JwtError;
use crate::auth::password::PasswordError;
use crate::export::ExportError;
use crate::notify::MailError;
use thiserror::Error;

pub type ServiceResult<T> = Result<T, ServiceError>;

#[derive(Debug, Error)]
pub enum ServiceError {
    /// Any storage failure. Surfaces to clients as a bad request carrying
    /// the driver's message.
    #[error("{0}")]
    Storage(#[from] sqlx::Error),

    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: i32 },

    #[error("INVALID USER")]
    InvalidUser,

    #[error("ERROR USER DATA")]
    WrongCredentials,

    #[error("USER ALREADY EXISTS")]
    UserExists,

    #[error("ERROR PASSWORD CONFIRMATION")]
    PasswordConfirmation,

    #[error(transparent)]
    Password(#[from] PasswordError),

    #[error(transparent)]
    Token(#[from] JwtError),

    #[error(transparent)]
    Mail(#[from] MailError),

    #[error(transparent)]
    Export(#[from] ExportError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ServiceError {
    pub fn not_found(entity: &'static str, id: i32) -> Self {
        ServiceError::NotFound { entity, id }
    }

    /// Errors the client caused or can correct, as opposed to server faults.
    pub fn is_client_error(&self) -> bool {
        !matches!(
            self,
            ServiceError::Password(_)
                | ServiceError::Token(_)
                | ServiceError::Mail(_)
                | ServiceError::Export(_)
                | ServiceError::Internal(_)
        )
    }
}

/// Runs password hashing off the async workers.
pub(crate) async fn blocking<T, F>(f: F) -> ServiceResult<T>
where
    F: FnOnce() -> Result<T, PasswordError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| ServiceError::Internal(e.to_string()))?
        .map_err(ServiceError::from)
}

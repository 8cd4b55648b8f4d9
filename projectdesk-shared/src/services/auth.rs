/// Credential verification and session issuance.

use super::user::{UserService, Welcome};
use super::{blocking, ServiceError, ServiceResult};
use crate::auth::jwt::{create_token, Claims};
use crate::auth::middleware::Identity;
use crate::auth::password::{verify_password, PasswordCost};
use crate::models::user::{CreateUser, User};
use crate::notify::Mailer;
use chrono::Duration;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use validator::Validate;

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1, message = "Login is required"))]
    pub login: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Sign-in result: the token plus the identity it encodes.
#[derive(Debug, Clone, Serialize)]
pub struct SignIn {
    pub access_token: String,
    #[serde(flatten)]
    pub identity: Identity,
}

pub struct AuthService<'a> {
    pool: &'a PgPool,
    secret: &'a str,
    expires_in: Duration,
}

impl<'a> AuthService<'a> {
    pub fn new(pool: &'a PgPool, secret: &'a str, expires_in: Duration) -> Self {
        Self {
            pool,
            secret,
            expires_in,
        }
    }

    /// Unknown login and wrong password are reported differently.
    pub async fn sign_in(&self, request: LoginRequest) -> ServiceResult<SignIn> {
        let user = User::find_by_login(self.pool, &request.login)
            .await?
            .ok_or(ServiceError::InvalidUser)?;

        let hash = user.password.clone();
        let password = request.password;
        if !blocking(move || verify_password(&password, &hash)).await? {
            tracing::debug!(user_id = user.id, "Password mismatch");
            return Err(ServiceError::WrongCredentials);
        }

        let identity = identity_of(&user);
        let access_token = create_token(&Claims::new(identity.clone(), self.expires_in), self.secret)?;

        tracing::info!(user_id = user.id, role = %user.role, "User signed in");
        Ok(SignIn { access_token, identity })
    }

    /// Self-service sign-up: same path as an admin-created account.
    pub async fn register(
        &self,
        dto: CreateUser,
        cost: PasswordCost,
        mailer: &dyn Mailer,
        welcome: &Welcome,
    ) -> ServiceResult<User> {
        UserService::new(self.pool, cost).create(dto, mailer, welcome).await
    }
}

/// The token payload for `user`.
pub fn identity_of(user: &User) -> Identity {
    Identity {
        id: user.id,
        email: user.email.clone(),
        first_name: user.first_name.clone(),
        last_name: user.last_name.clone(),
        middle_name: user.middle_name.clone(),
        role: user.role,
        status: user.status,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::user::{Role, UserStatus};

    #[test]
    fn test_login_request_requires_both_fields() {
        let request = LoginRequest {
            login: String::new(),
            password: "secret".into(),
        };
        assert!(request.validate().is_err());

        let request = LoginRequest {
            login: "anna@example.com".into(),
            password: "secret".into(),
        };
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_sign_in_serializes_flat() {
        let sign_in = SignIn {
            access_token: "tok".into(),
            identity: Identity {
                id: 3,
                email: None,
                first_name: Some("Anna".into()),
                last_name: None,
                middle_name: None,
                role: Role::Customer,
                status: UserStatus::Specialist,
            },
        };

        let json = serde_json::to_value(&sign_in).unwrap();
        assert_eq!(json["access_token"], "tok");
        assert_eq!(json["id"], 3);
        assert_eq!(json["firstName"], "Anna");
        assert_eq!(json["role"], "CUSTOMER");
    }
}

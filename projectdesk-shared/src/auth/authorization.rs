/// Route access decisions
///
/// Every route declares a [`RouteAccess`]: either public, or a set of roles.
/// [`admit`] is the whole guard chain as a pure function of that declaration,
/// the raw `Authorization` header and the signing secret:
///
/// 1. public route: admitted, no identity
/// 2. header absent or not `Bearer <token>`: unauthorized
/// 3. token signature, issuer or expiry invalid: unauthorized
/// 4. role outside the declared set: forbidden
///
/// # Example
///
/// ```
/// use projectdesk_shared::auth::authorization::{admit, RouteAccess, ADMIN_ONLY};
/// use projectdesk_shared::auth::middleware::GuardError;
///
/// let public = admit(&RouteAccess::Public, None, "secret");
/// assert!(matches!(public, Ok(None)));
///
/// let missing = admit(&RouteAccess::Roles(ADMIN_ONLY), None, "secret");
/// assert!(matches!(missing, Err(GuardError::MissingToken)));
/// ```

use super::jwt::validate_token;
use super::middleware::{GuardError, Identity};
use crate::models::user::Role;

pub const ADMIN_ONLY: &[Role] = &[Role::Admin];

/// Admins, customers and specialists.
pub const STAFF: &[Role] = &[Role::Admin, Role::Customer, Role::Specialist];

pub const ADMIN_OR_SPECIALIST: &[Role] = &[Role::Admin, Role::Specialist];

pub const ANY_ROLE: &[Role] = &[Role::Admin, Role::Customer, Role::Specialist, Role::Guest];

/// Access declaration attached to a route.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteAccess {
    Public,
    Roles(&'static [Role]),
}

impl RouteAccess {
    pub fn permits(&self, role: Role) -> bool {
        match self {
            RouteAccess::Public => true,
            RouteAccess::Roles(roles) => roles.contains(&role),
        }
    }
}

/// Extracts the token from an `Authorization` header value.
pub fn bearer_token(header: &str) -> Result<&str, GuardError> {
    let token = header
        .strip_prefix("Bearer ")
        .ok_or(GuardError::MalformedToken)?
        .trim();

    if token.is_empty() {
        return Err(GuardError::MalformedToken);
    }
    Ok(token)
}

/// Decides whether a request may reach a route.
///
/// `Ok(None)` is an anonymous admission to a public route; `Ok(Some(_))`
/// carries the verified caller.
pub fn admit(
    access: &RouteAccess,
    authorization: Option<&str>,
    secret: &str,
) -> Result<Option<Identity>, GuardError> {
    let roles = match access {
        RouteAccess::Public => return Ok(None),
        RouteAccess::Roles(roles) => roles,
    };

    let header = authorization.ok_or(GuardError::MissingToken)?;
    let claims = validate_token(bearer_token(header)?, secret)?;
    let identity = claims.identity;

    if !roles.contains(&identity.role) {
        return Err(GuardError::Forbidden { role: identity.role });
    }

    Ok(Some(identity))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::jwt::{create_token, Claims, JwtError};
    use crate::models::user::UserStatus;
    use chrono::Duration;

    const SECRET: &str = "guard-test-secret-guard-test-secret";

    fn token_for(role: Role, expires_in: Duration) -> String {
        let identity = Identity {
            id: 5,
            email: None,
            first_name: None,
            last_name: None,
            middle_name: None,
            role,
            status: UserStatus::Specialist,
        };
        create_token(&Claims::new(identity, expires_in), SECRET).unwrap()
    }

    #[test]
    fn test_public_route_ignores_token() {
        assert!(matches!(admit(&RouteAccess::Public, None, SECRET), Ok(None)));
        assert!(matches!(
            admit(&RouteAccess::Public, Some("Bearer garbage"), SECRET),
            Ok(None)
        ));
    }

    #[test]
    fn test_missing_and_malformed_headers() {
        let access = RouteAccess::Roles(ANY_ROLE);
        let token = token_for(Role::Admin, Duration::hours(1));

        assert!(matches!(admit(&access, None, SECRET), Err(GuardError::MissingToken)));
        assert!(matches!(
            admit(&access, Some(&format!("Token {}", token)), SECRET),
            Err(GuardError::MalformedToken)
        ));
        assert!(matches!(admit(&access, Some("Bearer "), SECRET), Err(GuardError::MalformedToken)));
    }

    #[test]
    fn test_invalid_and_expired_tokens() {
        let access = RouteAccess::Roles(ANY_ROLE);
        let expired = format!("Bearer {}", token_for(Role::Admin, Duration::seconds(-60)));

        assert!(matches!(
            admit(&access, Some("Bearer abc.def.ghi"), SECRET),
            Err(GuardError::InvalidToken(JwtError::Invalid(_)))
        ));
        assert!(matches!(
            admit(&access, Some(&expired), SECRET),
            Err(GuardError::InvalidToken(JwtError::Expired))
        ));
    }

    #[test]
    fn test_role_outside_set_is_forbidden() {
        let header = format!("Bearer {}", token_for(Role::Guest, Duration::hours(1)));

        let result = admit(&RouteAccess::Roles(STAFF), Some(&header), SECRET);
        assert!(matches!(result, Err(GuardError::Forbidden { role: Role::Guest })));
    }

    #[test]
    fn test_role_inside_set_is_admitted_with_identity() {
        let header = format!("Bearer {}", token_for(Role::Specialist, Duration::hours(1)));

        let identity = admit(&RouteAccess::Roles(ADMIN_OR_SPECIALIST), Some(&header), SECRET)
            .unwrap()
            .expect("identity attached");
        assert_eq!(identity.id, 5);
        assert_eq!(identity.role, Role::Specialist);
    }

    #[test]
    fn test_role_sets() {
        assert!(RouteAccess::Roles(ADMIN_ONLY).permits(Role::Admin));
        assert!(!RouteAccess::Roles(ADMIN_ONLY).permits(Role::Customer));
        assert!(!RouteAccess::Roles(STAFF).permits(Role::Guest));
        assert!(RouteAccess::Roles(ANY_ROLE).permits(Role::Guest));
        assert!(RouteAccess::Public.permits(Role::Guest));
    }
}

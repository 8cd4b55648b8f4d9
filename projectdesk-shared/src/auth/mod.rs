/// Authentication and authorization
///
/// # Modules
///
/// - [`password`]: Argon2id hashing, verification and initial password generation
/// - [`jwt`]: HS256 session tokens carrying the caller identity
/// - [`middleware`]: the request [`middleware::Identity`] and guard rejections
/// - [`authorization`]: per-route access declarations and the admission decision
///
/// # Example
///
/// ```no_run
/// use projectdesk_shared::auth::authorization::{admit, RouteAccess, STAFF};
///
/// # fn example(header: Option<&str>) -> Result<(), Box<dyn std::error::Error>> {
/// let identity = admit(&RouteAccess::Roles(STAFF), header, "jwt-secret")?;
/// # Ok(())
/// # }
/// ```

pub mod authorization;
pub mod jwt;
pub mod middleware;
pub mod password;

/// Middleware for the API server
///
/// - `guard`: per-route authentication and role checks
/// - `security`: security response headers

pub mod guard;
pub mod security;

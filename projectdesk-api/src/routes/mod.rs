/// HTTP handlers, one module per resource
///
/// Handlers validate input, call the matching shared service and return the
/// payload as-is. Route paths and guards are assembled in [`crate::app`].

pub mod auth;
pub mod competency;
pub mod health;
pub mod project;
pub mod task;
pub mod user;

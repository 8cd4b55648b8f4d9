//! # ProjectDesk API Server Library
//!
//! ## Modules
//!
//! - `app`: application state and router
//! - `config`: environment configuration
//! - `error`: error type and HTTP response mapping
//! - `middleware`: route guard and security headers
//! - `routes`: handlers per resource

pub mod app;
pub mod config;
pub mod error;
pub mod middleware;
pub mod routes;

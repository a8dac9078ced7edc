//! Application services: login, password recovery, user administration and
//! the employee report, with request/response mapping.
//!
//! Services are framework-agnostic; an HTTP layer only has to turn a
//! [`app::errors::ApiError`] or a DTO into a response.

pub mod app;
pub mod context;

//! Application services and their request/response mapping.
//!
//! - `services.rs`: collaborator wiring shared by every service
//! - `login.rs`, `recovery.rs`, `users.rs`, `report.rs`: one service per area
//! - `api_key.rs`: shared-key guard for the spreadsheet sync
//! - `dto.rs`: request/response DTOs
//! - `errors.rs`: consistent error responses

pub mod api_key;
pub mod dto;
pub mod errors;
pub mod login;
pub mod recovery;
pub mod report;
pub mod services;
pub mod users;

#[cfg(test)]
pub(crate) mod testing;

pub use api_key::ApiKeyGuard;
pub use login::{CaptchaPolicy, LoginService};
pub use recovery::RecoveryService;
pub use report::{ReportEndpoint, SheetSyncEndpoint};
pub use services::{AppServices, Collaborators};
pub use users::UserAdminService;

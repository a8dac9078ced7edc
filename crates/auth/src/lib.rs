//! `roster-auth` - pure authentication/authorization boundary.
//!
//! This crate is intentionally decoupled from HTTP, storage and crypto: password
//! hashing and token signing are reached through [`PasswordHasher`] and
//! [`TokenIssuer`].

pub mod authorize;
pub mod claims;
pub mod credentials;
pub mod hierarchy;
pub mod principal;
pub mod roles;
pub mod user;

pub use authorize::{AuthzError, ensure_can_assign, ensure_can_edit, require_role};
pub use claims::{JwtClaims, TokenValidationError, validate_claims};
pub use credentials::{CredentialError, PasswordHasher, TokenIssuer};
pub use hierarchy::{can_assign, can_edit, level};
pub use principal::Principal;
pub use roles::Role;
pub use user::{NewUser, User, UserPatch, UserStatus};

//! `roster-infra` - infrastructure adapters (storage, mail, captcha, tokens)
//! and process configuration.

pub mod audit_log;
pub mod captcha;
pub mod config;
pub mod jwt;
pub mod mailer;
pub mod secrets;
pub mod store;
pub mod templates;
pub mod user_store;

pub use audit_log::{AuditEntry, AuditLog, InMemoryAuditLog};
pub use captcha::{CachedCaptcha, CaptchaError, CaptchaVerifier, RecaptchaClient};
pub use config::{AppConfig, AuthConfig, ConfigError, MailConfig, NextiConfig, SheetsConfig};
pub use jwt::Hs256TokenIssuer;
pub use mailer::{MailError, Mailer, OutgoingMail, RecordingMailer};
pub use store::{Paged, StoreError};
pub use user_store::{InMemoryUserStore, UserQuery, UserStore};

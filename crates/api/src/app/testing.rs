//! Shared fixtures for the service tests.

use std::sync::Arc;

use async_trait::async_trait;

use roster_auth::{CredentialError, PasswordHasher, Principal, Role, User, UserStatus};
use roster_core::UserId;
use roster_infra::{
    CaptchaError, CaptchaVerifier, Hs256TokenIssuer, InMemoryAuditLog, InMemoryUserStore, MailConfig,
    RecordingMailer,
};

use crate::app::login::CaptchaPolicy;
use crate::app::services::{AppServices, Collaborators};

pub(crate) struct FakeHasher;

impl PasswordHasher for FakeHasher {
    fn hash(&self, password: &str) -> Result<String, CredentialError> {
        Ok(format!("hashed:{password}"))
    }

    fn verify(&self, password: &str, hash: &str) -> bool {
        hash == format!("hashed:{password}")
    }
}

/// Accepts only the token `"human"`.
pub(crate) struct FixedCaptcha;

#[async_trait]
impl CaptchaVerifier for FixedCaptcha {
    async fn verify(&self, token: &str) -> Result<bool, CaptchaError> {
        Ok(token == "human")
    }
}

pub(crate) struct Harness {
    pub store: Arc<InMemoryUserStore>,
    pub audit: Arc<InMemoryAuditLog>,
    pub mailer: Arc<RecordingMailer>,
    pub tokens: Arc<Hs256TokenIssuer>,
    pub services: AppServices,
}

impl Harness {
    pub fn new() -> Self {
        Self::build(CaptchaPolicy::Disabled, RecordingMailer::new())
    }

    pub fn with_captcha() -> Self {
        Self::build(CaptchaPolicy::Required(Arc::new(FixedCaptcha)), RecordingMailer::new())
    }

    pub fn with_failing_mailer() -> Self {
        Self::build(CaptchaPolicy::Disabled, RecordingMailer::failing())
    }

    fn build(captcha: CaptchaPolicy, mailer: RecordingMailer) -> Self {
        let store = InMemoryUserStore::arc();
        let audit = InMemoryAuditLog::arc();
        let mailer = Arc::new(mailer);
        let tokens = Arc::new(Hs256TokenIssuer::new("test-secret"));

        let services = AppServices::new(
            Collaborators {
                users: store.clone(),
                audit: audit.clone(),
                mailer: mailer.clone(),
                hasher: Arc::new(FakeHasher),
                tokens: tokens.clone(),
                captcha,
            },
            MailConfig {
                frontend_url: "https://panel.test".into(),
                default_sender: "tec@panel.test".into(),
            },
            chrono::Duration::hours(8),
        );

        Self {
            store,
            audit,
            mailer,
            tokens,
            services,
        }
    }

    /// Seed a user whose password is `"password-{username}"`.
    pub fn seed(&self, id: i64, username: &str, role: Role, status: UserStatus) -> User {
        let user = User::new(UserId::new(id), username, format!("{username}@example.com"), role)
            .with_status(status)
            .with_password_hash(format!("hashed:password-{username}"));
        self.store.seed(user.clone()).unwrap();
        user
    }

    pub fn principal(user: &User) -> Principal {
        Principal::new(user.id, user.username.clone(), user.role.clone())
    }
}

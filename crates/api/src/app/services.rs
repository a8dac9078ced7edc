//! Collaborator wiring shared by the application services.

use std::sync::Arc;

use roster_auth::{PasswordHasher, TokenIssuer};
use roster_infra::{AuditLog, MailConfig, Mailer, UserStore};

use crate::app::login::{CaptchaPolicy, LoginService};
use crate::app::recovery::RecoveryService;
use crate::app::users::UserAdminService;
use crate::context::Authenticator;

/// Every backend the services talk to.
#[derive(Clone)]
pub struct Collaborators {
    pub users: Arc<dyn UserStore>,
    pub audit: Arc<dyn AuditLog>,
    pub mailer: Arc<dyn Mailer>,
    pub hasher: Arc<dyn PasswordHasher>,
    pub tokens: Arc<dyn TokenIssuer>,
    pub captcha: CaptchaPolicy,
}

/// The assembled application services.
#[derive(Clone)]
pub struct AppServices {
    pub authenticator: Authenticator,
    pub login: LoginService,
    pub recovery: RecoveryService,
    pub users: UserAdminService,
}

impl AppServices {
    pub fn new(collaborators: Collaborators, mail: MailConfig, token_ttl: chrono::Duration) -> Self {
        let Collaborators {
            users,
            audit,
            mailer,
            hasher,
            tokens,
            captcha,
        } = collaborators;

        Self {
            authenticator: Authenticator::new(tokens.clone()),
            login: LoginService::new(users.clone(), hasher.clone(), tokens, captcha, token_ttl),
            recovery: RecoveryService::new(users.clone(), hasher.clone(), mailer.clone(), mail.clone()),
            users: UserAdminService::new(users, audit, mailer, hasher, mail),
        }
    }
}

use std::sync::Arc;

use roster_auth::PasswordHasher;
use roster_infra::{MailConfig, Mailer, OutgoingMail, UserStore, secrets, templates};

use crate::app::dto::{NewPasswordRequest, RecoveryRequest, Reply};
use crate::app::errors::ServiceError;

pub const MIN_PASSWORD_LEN: usize = 8;

/// Same answer whether or not the account exists.
pub const NEUTRAL_RECOVERY_MESSAGE: &str =
    "Se um usuário com este e-mail existir e estiver ativo, um link de recuperação foi enviado.";

/// Forgotten-password flow: mail a one-shot link, then accept a new password.
#[derive(Clone)]
pub struct RecoveryService {
    users: Arc<dyn UserStore>,
    hasher: Arc<dyn PasswordHasher>,
    mailer: Arc<dyn Mailer>,
    mail: MailConfig,
}

impl RecoveryService {
    pub fn new(
        users: Arc<dyn UserStore>,
        hasher: Arc<dyn PasswordHasher>,
        mailer: Arc<dyn Mailer>,
        mail: MailConfig,
    ) -> Self {
        Self {
            users,
            hasher,
            mailer,
            mail,
        }
    }

    pub async fn request_recovery(&self, request: &RecoveryRequest) -> Result<Reply, ServiceError> {
        let email = request
            .email
            .as_deref()
            .filter(|e| !e.is_empty())
            .ok_or_else(|| ServiceError::BadRequest("O campo email é obrigatório".into()))?;

        let mut user = match self.users.find_by_email(email)? {
            Some(user) if user.status.is_active() => user,
            _ => {
                tracing::info!("recovery requested for unknown or inactive account");
                return Ok(Reply::ok(NEUTRAL_RECOVERY_MESSAGE));
            }
        };

        let token = secrets::recovery_token();
        user.recovery_token = Some(token.clone());
        self.users.update(&user)?;

        let link = self.mail.recovery_link(&token);
        self.mailer
            .send(OutgoingMail {
                to: user.email.clone(),
                from: self.mail.default_sender.clone(),
                subject: templates::RECOVERY_SUBJECT.into(),
                html_body: templates::recovery(&user.username, &link),
            })
            .await?;

        tracing::info!(user_id = %user.id, "recovery link sent");
        Ok(Reply::ok(NEUTRAL_RECOVERY_MESSAGE))
    }

    pub async fn save_new_password(&self, request: &NewPasswordRequest) -> Result<Reply, ServiceError> {
        let (Some(token), Some(password)) = (
            request.token.as_deref().filter(|t| !t.is_empty()),
            request.password.as_deref().filter(|p| !p.is_empty()),
        ) else {
            return Err(ServiceError::BadRequest("Token e nova senha são obrigatórios.".into()));
        };

        if password.chars().count() < MIN_PASSWORD_LEN {
            return Err(ServiceError::BadRequest(
                "A nova senha deve ter pelo menos 8 caracteres.".into(),
            ));
        }

        let mut user = self
            .users
            .find_by_recovery_token(token)?
            .ok_or_else(|| ServiceError::NotFound("Token de recuperação inválido ou expirado.".into()))?;

        user.password_hash = self.hasher.hash(password)?;
        user.recovery_token = None;
        self.users.update(&user)?;
        tracing::info!(user_id = %user.id, "password reset");

        let confirmation = OutgoingMail {
            to: user.email.clone(),
            from: self.mail.default_sender.clone(),
            subject: templates::PASSWORD_CHANGED_SUBJECT.into(),
            html_body: templates::password_changed(&user.username),
        };
        if let Err(e) = self.mailer.send(confirmation).await {
            tracing::warn!(user_id = %user.id, error = %e, "password change confirmation not sent");
        }

        Ok(Reply::ok("Senha alterada com sucesso!"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::testing::Harness;
    use roster_auth::{Role, UserStatus};
    use roster_core::UserId;

    fn recovery_for(email: &str) -> RecoveryRequest {
        RecoveryRequest {
            email: Some(email.into()),
        }
    }

    fn new_password(token: &str, password: &str) -> NewPasswordRequest {
        NewPasswordRequest {
            token: Some(token.into()),
            password: Some(password.into()),
        }
    }

    #[tokio::test]
    async fn active_users_get_a_recovery_link() {
        let h = Harness::new();
        h.seed(1, "ana", Role::RH, UserStatus::Ativo);

        let reply = h.services.recovery.request_recovery(&recovery_for("ana@example.com")).await.unwrap();
        assert_eq!(reply.message, NEUTRAL_RECOVERY_MESSAGE);

        let token = h.store.get(UserId::new(1)).unwrap().unwrap().recovery_token.unwrap();
        assert_eq!(token.len(), 64);

        let sent = h.mailer.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].to, "ana@example.com");
        assert!(sent[0].html_body.contains(&format!("https://panel.test/recuperar/{token}")));
    }

    #[tokio::test]
    async fn unknown_and_inactive_accounts_get_the_same_answer() {
        let h = Harness::new();
        h.seed(1, "ana", Role::RH, UserStatus::Inativo);

        for email in ["ana@example.com", "ghost@example.com"] {
            let reply = h.services.recovery.request_recovery(&recovery_for(email)).await.unwrap();
            assert_eq!(reply.message, NEUTRAL_RECOVERY_MESSAGE);
        }
        assert!(h.mailer.sent().is_empty());
    }

    #[tokio::test]
    async fn mail_failure_fails_the_request() {
        let h = Harness::with_failing_mailer();
        h.seed(1, "ana", Role::RH, UserStatus::Ativo);

        let err = h
            .services
            .recovery
            .request_recovery(&recovery_for("ana@example.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Mail(_)));
    }

    #[tokio::test]
    async fn missing_email_is_a_bad_request() {
        let h = Harness::new();
        let err = h
            .services
            .recovery
            .request_recovery(&RecoveryRequest::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::BadRequest(_)));
    }

    #[tokio::test]
    async fn reset_replaces_the_password_and_burns_the_token() {
        let h = Harness::new();
        let mut ana = h.seed(1, "ana", Role::RH, UserStatus::Ativo);
        ana.recovery_token = Some("tok".into());
        h.store.update(&ana).unwrap();

        h.services
            .recovery
            .save_new_password(&new_password("tok", "brand-new-pass"))
            .await
            .unwrap();

        let stored = h.store.get(UserId::new(1)).unwrap().unwrap();
        assert_eq!(stored.password_hash, "hashed:brand-new-pass");
        assert!(stored.recovery_token.is_none());
        assert_eq!(h.mailer.sent()[0].subject, templates::PASSWORD_CHANGED_SUBJECT);

        let reused = h
            .services
            .recovery
            .save_new_password(&new_password("tok", "another-pass"))
            .await
            .unwrap_err();
        assert!(matches!(reused, ServiceError::NotFound(_)));
    }

    #[tokio::test]
    async fn short_passwords_are_rejected() {
        let h = Harness::new();
        let err = h
            .services
            .recovery
            .save_new_password(&new_password("tok", "1234567"))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::BadRequest(msg) if msg.contains("8 caracteres")));
    }

    #[tokio::test]
    async fn confirmation_mail_failure_does_not_fail_the_reset() {
        let h = Harness::with_failing_mailer();
        let mut ana = h.seed(1, "ana", Role::RH, UserStatus::Ativo);
        ana.recovery_token = Some("tok".into());
        h.store.update(&ana).unwrap();

        assert!(
            h.services
                .recovery
                .save_new_password(&new_password("tok", "brand-new-pass"))
                .await
                .is_ok()
        );
    }
}

use std::sync::Arc;

use chrono::Utc;

use roster_auth::{JwtClaims, PasswordHasher, TokenIssuer};
use roster_infra::{CaptchaVerifier, UserStore};

use crate::app::dto::{LoginRequest, LoginResponse};
use crate::app::errors::ServiceError;

/// Whether login needs a captcha token.
#[derive(Clone)]
pub enum CaptchaPolicy {
    Required(Arc<dyn CaptchaVerifier>),
    /// Local and test environments.
    Disabled,
}

/// Email/password login issuing access tokens.
#[derive(Clone)]
pub struct LoginService {
    users: Arc<dyn UserStore>,
    hasher: Arc<dyn PasswordHasher>,
    tokens: Arc<dyn TokenIssuer>,
    captcha: CaptchaPolicy,
    token_ttl: chrono::Duration,
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

impl LoginService {
    pub fn new(
        users: Arc<dyn UserStore>,
        hasher: Arc<dyn PasswordHasher>,
        tokens: Arc<dyn TokenIssuer>,
        captcha: CaptchaPolicy,
        token_ttl: chrono::Duration,
    ) -> Self {
        Self {
            users,
            hasher,
            tokens,
            captcha,
            token_ttl,
        }
    }

    pub async fn login(&self, request: &LoginRequest) -> Result<LoginResponse, ServiceError> {
        let (Some(email), Some(password)) = (non_empty(&request.email), non_empty(&request.password)) else {
            return Err(ServiceError::BadRequest("Email e senha são obrigatórios".into()));
        };

        self.check_captcha(request.recaptcha.as_deref()).await?;

        let user = self
            .users
            .find_by_email(email)?
            .ok_or_else(|| ServiceError::NotFound("Credenciais inválidas".into()))?;

        if !user.status.is_active() {
            return Err(ServiceError::Forbidden("Usuário inativo ou bloqueado".into()));
        }
        if !self.hasher.verify(password, &user.password_hash) {
            tracing::info!(user_id = %user.id, "login rejected: wrong password");
            return Err(ServiceError::Unauthorized("Senha errada".into()));
        }

        let claims = JwtClaims::for_user(&user, Utc::now(), self.token_ttl);
        let access_token = self.tokens.issue(&claims)?;
        tracing::info!(user_id = %user.id, role = %user.role, "login succeeded");

        Ok(LoginResponse {
            success: true,
            message: "Login realizado com sucesso".into(),
            access_token,
        })
    }

    async fn check_captcha(&self, token: Option<&str>) -> Result<(), ServiceError> {
        let verifier = match &self.captcha {
            CaptchaPolicy::Required(verifier) => verifier,
            CaptchaPolicy::Disabled => {
                tracing::debug!("captcha check skipped");
                return Ok(());
            }
        };

        let token = token
            .filter(|t| !t.is_empty())
            .ok_or_else(|| ServiceError::BadRequest("reCAPTCHA é obrigatório".into()))?;

        let valid = verifier.verify(token).await.unwrap_or_else(|e| {
            tracing::error!(error = %e, "captcha verification failed");
            false
        });
        if valid {
            Ok(())
        } else {
            Err(ServiceError::BadRequest("reCAPTCHA inválido".into()))
        }
    }
}

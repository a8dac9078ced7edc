use std::sync::Arc;

use chrono::Utc;

use roster_auth::{Principal, TokenIssuer, validate_claims};

use crate::app::errors::ServiceError;

/// Resolves the bearer token of a request into a [`Principal`].
#[derive(Clone)]
pub struct Authenticator {
    tokens: Arc<dyn TokenIssuer>,
}

impl Authenticator {
    pub fn new(tokens: Arc<dyn TokenIssuer>) -> Self {
        Self { tokens }
    }

    /// `authorization` is the raw `Authorization` header value.
    pub fn authenticate(&self, authorization: Option<&str>) -> Result<Principal, ServiceError> {
        let token = extract_bearer(authorization)?;
        let claims = self
            .tokens
            .verify(token)
            .map_err(|e| ServiceError::Unauthorized(e.to_string()))?;
        validate_claims(&claims, Utc::now()).map_err(|e| ServiceError::Unauthorized(e.to_string()))?;
        Ok(Principal::from(&claims))
    }
}

fn extract_bearer(header: Option<&str>) -> Result<&str, ServiceError> {
    let missing = || ServiceError::Unauthorized("missing bearer token".to_string());
    let token = header
        .ok_or_else(missing)?
        .strip_prefix("Bearer ")
        .ok_or_else(missing)?
        .trim();
    if token.is_empty() {
        return Err(missing());
    }
    Ok(token)
}

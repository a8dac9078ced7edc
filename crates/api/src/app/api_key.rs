//! Shared-key guard for machine clients (the spreadsheet sync).

use md5::{Digest, Md5};

use roster_infra::SheetsConfig;

use crate::app::errors::ServiceError;

/// Header carrying the plain key.
pub const API_KEY_HEADER: &str = "X-API-KEY";

/// Accepts a request when the MD5 of its key matches the configured hash.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKeyGuard {
    expected_hash: Option<String>,
    salt: Option<String>,
}

impl core::fmt::Debug for ApiKeyGuard {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ApiKeyGuard")
            .field("configured", &self.is_configured())
            .finish()
    }
}

impl ApiKeyGuard {
    pub fn new(config: &SheetsConfig) -> Self {
        Self {
            expected_hash: config.api_key_hash.clone(),
            salt: config.salt.clone(),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.expected_hash.is_some() && self.salt.is_some()
    }

    /// `api_key` is the raw header value.
    pub fn check(&self, api_key: Option<&str>) -> Result<(), ServiceError> {
        let key = api_key.map(str::trim).filter(|k| !k.is_empty());
        let (Some(expected), Some(_salt), Some(key)) = (&self.expected_hash, &self.salt, key) else {
            return Err(ServiceError::Unauthorized(
                "Acesso não autorizado. Configuração inválida ou chave não fornecida.".into(),
            ));
        };

        if digest(key) != *expected {
            tracing::warn!("api key rejected");
            return Err(ServiceError::Unauthorized(
                "Acesso não autorizado (chave incorreta)".into(),
            ));
        }
        Ok(())
    }
}

fn digest(key: &str) -> String {
    hex::encode(Md5::digest(key.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;

    // md5("secret")
    const SECRET_HASH: &str = "5ebe2294ecd0e0f08eab7690d2a6ee69";

    fn guard(hash: Option<&str>, salt: Option<&str>) -> ApiKeyGuard {
        ApiKeyGuard::new(&SheetsConfig {
            api_key_hash: hash.map(String::from),
            salt: salt.map(String::from),
        })
    }

    #[test]
    fn digest_is_lowercase_hex_md5() {
        assert_eq!(digest("secret"), SECRET_HASH);
    }

    #[test]
    fn matching_key_passes() {
        assert!(guard(Some(SECRET_HASH), Some("pepper")).check(Some("secret")).is_ok());
    }

    #[test]
    fn wrong_or_missing_key_is_unauthorized() {
        let g = guard(Some(SECRET_HASH), Some("pepper"));
        assert!(matches!(g.check(Some("guess")), Err(ServiceError::Unauthorized(_))));
        assert!(matches!(g.check(None), Err(ServiceError::Unauthorized(_))));
        assert!(matches!(g.check(Some("  ")), Err(ServiceError::Unauthorized(_))));
    }

    #[test]
    fn unconfigured_guard_refuses_everything() {
        assert!(guard(None, Some("pepper")).check(Some("secret")).is_err());
        assert!(guard(Some(SECRET_HASH), None).check(Some("secret")).is_err());
        assert!(!guard(Some(SECRET_HASH), None).is_configured());
    }
}

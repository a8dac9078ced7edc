//! Process configuration, read once from the environment into typed structs.
//!
//! Every loader has a `from_lookup` twin taking a key lookup function so the
//! parsing rules can be tested without touching the process environment.

use std::time::Duration;

use thiserror::Error;

use roster_nexti::{ActiveSituations, NextiSettings, ReportSettings, SituationId};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("invalid value for {key}: {value:?}")]
    Invalid { key: &'static str, value: String },
}

type Lookup<'a> = &'a dyn Fn(&str) -> Option<String>;

fn env_lookup(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

fn optional(lookup: Lookup<'_>, key: &'static str) -> Option<String> {
    lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

fn required(lookup: Lookup<'_>, key: &'static str) -> Result<String, ConfigError> {
    optional(lookup, key).ok_or(ConfigError::Missing(key))
}

fn parsed<T: core::str::FromStr>(lookup: Lookup<'_>, key: &'static str, default: T) -> Result<T, ConfigError> {
    match optional(lookup, key) {
        None => Ok(default),
        Some(value) => value.parse().map_err(|_| ConfigError::Invalid { key, value }),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Nexti
// ─────────────────────────────────────────────────────────────────────────────

pub const DEFAULT_NEXTI_BASE_URL: &str = "https://api.nexti.com";

/// Upstream credentials and report tunables.
#[derive(Clone)]
pub struct NextiConfig {
    pub base_url: String,
    pub client_id: String,
    pub client_secret: String,
    pub page_size: u32,
    pub active_situations: ActiveSituations,
}

impl core::fmt::Debug for NextiConfig {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("NextiConfig")
            .field("base_url", &self.base_url)
            .field("client_id", &self.client_id)
            .field("page_size", &self.page_size)
            .field("active_situations", &self.active_situations)
            .finish_non_exhaustive()
    }
}

impl NextiConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(&env_lookup)
    }

    pub fn from_lookup(lookup: Lookup<'_>) -> Result<Self, ConfigError> {
        let defaults = ReportSettings::default();
        let active_situations = match optional(lookup, "NEXTI_ACTIVE_SITUATIONS") {
            None => defaults.active_situations,
            Some(raw) => parse_situations(&raw).ok_or(ConfigError::Invalid {
                key: "NEXTI_ACTIVE_SITUATIONS",
                value: raw,
            })?,
        };
        let page_size: u32 = parsed(lookup, "NEXTI_PAGE_SIZE", defaults.page_size)?;
        if page_size == 0 {
            return Err(ConfigError::Invalid {
                key: "NEXTI_PAGE_SIZE",
                value: page_size.to_string(),
            });
        }

        Ok(Self {
            base_url: optional(lookup, "NEXTI_BASE_URL").unwrap_or_else(|| DEFAULT_NEXTI_BASE_URL.to_string()),
            client_id: required(lookup, "NEXTI_CLIENT_ID")?,
            client_secret: required(lookup, "NEXTI_CLIENT_SECRET")?,
            page_size,
            active_situations,
        })
    }

    pub fn settings(&self) -> NextiSettings {
        NextiSettings::new(&self.base_url, &self.client_id, &self.client_secret)
    }

    pub fn report_settings(&self) -> ReportSettings {
        ReportSettings {
            page_size: self.page_size,
            active_situations: self.active_situations.clone(),
        }
    }
}

/// `"1, 2"` → situations {1, 2}. Empty lists are rejected.
fn parse_situations(raw: &str) -> Option<ActiveSituations> {
    let ids = raw
        .split(',')
        .map(|part| part.trim().parse::<i64>().ok().map(SituationId::new))
        .collect::<Option<Vec<_>>>()?;
    (!ids.is_empty()).then(|| ActiveSituations::new(ids))
}

// ─────────────────────────────────────────────────────────────────────────────
// Auth
// ─────────────────────────────────────────────────────────────────────────────

pub const DEFAULT_TOKEN_TTL_HOURS: i64 = 8;

#[derive(Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub token_ttl: chrono::Duration,
    pub recaptcha_required: bool,
    pub recaptcha_secret: Option<String>,
    pub recaptcha_timeout: Duration,
}

impl core::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("token_ttl", &self.token_ttl)
            .field("recaptcha_required", &self.recaptcha_required)
            .finish_non_exhaustive()
    }
}

impl AuthConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(&env_lookup)
    }

    /// `RECAPTCHA_REQUIRED=0` turns the captcha off; anything else keeps it on.
    pub fn from_lookup(lookup: Lookup<'_>) -> Result<Self, ConfigError> {
        let hours: i64 = parsed(lookup, "JWT_EXPIRES_HOURS", DEFAULT_TOKEN_TTL_HOURS)?;
        if hours <= 0 {
            return Err(ConfigError::Invalid {
                key: "JWT_EXPIRES_HOURS",
                value: hours.to_string(),
            });
        }
        let recaptcha_required = optional(lookup, "RECAPTCHA_REQUIRED").as_deref() != Some("0");
        let recaptcha_secret = optional(lookup, "RECAPTCHA_SECRET");
        if recaptcha_required && recaptcha_secret.is_none() {
            return Err(ConfigError::Missing("RECAPTCHA_SECRET"));
        }

        Ok(Self {
            jwt_secret: required(lookup, "JWT_SECRET_KEY")?,
            token_ttl: chrono::Duration::hours(hours),
            recaptcha_required,
            recaptcha_secret,
            recaptcha_timeout: Duration::from_secs(5),
        })
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Mail
// ─────────────────────────────────────────────────────────────────────────────

pub const DEFAULT_FRONTEND_URL: &str = "https://paineltelaviv.bybrain.com.br";
pub const DEFAULT_SENDER: &str = "tec@telaviv.com.br";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MailConfig {
    pub frontend_url: String,
    pub default_sender: String,
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            frontend_url: DEFAULT_FRONTEND_URL.to_string(),
            default_sender: DEFAULT_SENDER.to_string(),
        }
    }
}

impl MailConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(&env_lookup)
    }

    pub fn from_lookup(lookup: Lookup<'_>) -> Self {
        let defaults = Self::default();
        Self {
            frontend_url: optional(lookup, "FRONTEND_URL")
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or(defaults.frontend_url),
            default_sender: optional(lookup, "MAIL_DEFAULT_SENDER").unwrap_or(defaults.default_sender),
        }
    }

    /// Password reset link for `token`.
    pub fn recovery_link(&self, token: &str) -> String {
        format!("{}/recuperar/{}", self.frontend_url, token)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Sheets sync
// ─────────────────────────────────────────────────────────────────────────────

/// Shared-key access for the spreadsheet sync. Both values are optional here;
/// a request is refused while either is unset.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct SheetsConfig {
    /// Lowercase hex MD5 of the accepted `X-API-KEY` value.
    pub api_key_hash: Option<String>,
    pub salt: Option<String>,
}

impl core::fmt::Debug for SheetsConfig {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SheetsConfig")
            .field("api_key_hash", &self.api_key_hash.as_ref().map(|_| "***"))
            .field("salt", &self.salt.as_ref().map(|_| "***"))
            .finish()
    }
}

impl SheetsConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(&env_lookup)
    }

    pub fn from_lookup(lookup: Lookup<'_>) -> Self {
        Self {
            api_key_hash: optional(lookup, "FLASK_API_KEY").map(|h| h.to_ascii_lowercase()),
            salt: optional(lookup, "SALT"),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// App
// ─────────────────────────────────────────────────────────────────────────────

/// Everything the full service stack needs.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub nexti: NextiConfig,
    pub auth: AuthConfig,
    pub mail: MailConfig,
    pub sheets: SheetsConfig,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(&env_lookup)
    }

    pub fn from_lookup(lookup: Lookup<'_>) -> Result<Self, ConfigError> {
        Ok(Self {
            nexti: NextiConfig::from_lookup(lookup)?,
            auth: AuthConfig::from_lookup(lookup)?,
            mail: MailConfig::from_lookup(lookup),
            sheets: SheetsConfig::from_lookup(lookup),
        })
    }
}

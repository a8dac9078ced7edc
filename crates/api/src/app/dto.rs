use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use roster_auth::{Role, User, UserStatus};
use roster_infra::AuditEntry;

// -------------------------
// Request DTOs
// -------------------------

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
    /// Captcha token from the login form.
    pub recaptcha: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RecoveryRequest {
    pub email: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewPasswordRequest {
    #[serde(rename = "tokena2")]
    pub token: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserListQuery {
    #[serde(rename = "busca")]
    pub search: Option<String>,
    pub status: Option<UserStatus>,
    pub role: Option<Role>,
    #[serde(rename = "pagina")]
    pub page: Option<u32>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuditLogQuery {
    #[serde(rename = "busca")]
    pub search: Option<String>,
    pub page: Option<u32>,
}

// -------------------------
// Response DTOs
// -------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoginResponse {
    pub success: bool,
    pub message: String,
    pub access_token: String,
}

/// Plain success message with the status it should be sent with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub status: StatusCode,
    pub message: String,
}

impl Reply {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::OK,
            message: message.into(),
        }
    }

    pub fn created(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::CREATED,
            message: message.into(),
        }
    }

    pub fn body(&self) -> Value {
        json!({ "success": true, "message": self.message })
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct UserListResponse {
    #[serde(rename = "usuarios")]
    pub users: Vec<User>,
    #[serde(rename = "totalPaginas")]
    pub total_pages: usize,
    #[serde(rename = "paginaAtual")]
    pub page: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct AuditLogResponse {
    pub logs: Vec<AuditEntry>,
    pub page: u32,
    pub per_page: usize,
    pub total: usize,
}

use reqwest::StatusCode;
use serde_json::{Value, json};
use thiserror::Error;

use roster_auth::{AuthzError, CredentialError};
use roster_core::DomainError;
use roster_infra::{MailError, StoreError};
use roster_nexti::{ReportError, UpstreamError};

/// Error shape handed to the transport layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    pub status: StatusCode,
    pub code: &'static str,
    pub message: String,
}

impl ApiError {
    /// JSON body: `{"success": false, "error": code, "message": ...}`.
    pub fn body(&self) -> Value {
        json!({
            "success": false,
            "error": self.code,
            "message": self.message,
        })
    }
}

pub fn json_error(status: StatusCode, code: &'static str, message: impl Into<String>) -> ApiError {
    ApiError {
        status,
        code,
        message: message.into(),
    }
}

/// Failure of an application service.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Mail(#[from] MailError),

    #[error(transparent)]
    Credential(#[from] CredentialError),

    #[error(transparent)]
    Report(#[from] ReportError),
}

impl From<AuthzError> for ServiceError {
    fn from(err: AuthzError) -> Self {
        let message = match err {
            AuthzError::RoleNotAllowed(_) => "Acesso não autorizado para este perfil",
            AuthzError::CannotEdit => "Você não tem permissão para editar este usuário.",
            AuthzError::CannotAssign(_) => "Você não tem permissão para atribuir este perfil.",
        };
        ServiceError::Forbidden(message.to_string())
    }
}

impl From<DomainError> for ServiceError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::Validation(msg) | DomainError::InvalidId(msg) => ServiceError::BadRequest(msg),
        }
    }
}

const UNEXPECTED: &str = "Ocorreu um erro inesperado.";

pub fn service_error_to_response(err: &ServiceError) -> ApiError {
    match err {
        ServiceError::BadRequest(msg) => json_error(StatusCode::BAD_REQUEST, "validation_error", msg.clone()),
        ServiceError::Unauthorized(msg) => json_error(StatusCode::UNAUTHORIZED, "unauthorized", msg.clone()),
        ServiceError::Forbidden(msg) => json_error(StatusCode::FORBIDDEN, "forbidden", msg.clone()),
        ServiceError::NotFound(msg) => json_error(StatusCode::NOT_FOUND, "not_found", msg.clone()),
        ServiceError::Conflict(msg) => json_error(StatusCode::CONFLICT, "conflict", msg.clone()),
        ServiceError::Store(StoreError::NotFound(msg)) => json_error(StatusCode::NOT_FOUND, "not_found", msg.clone()),
        ServiceError::Store(StoreError::Conflict(msg)) => json_error(StatusCode::CONFLICT, "conflict", msg.clone()),
        ServiceError::Store(StoreError::Storage(_)) => {
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "store_error", UNEXPECTED)
        }
        ServiceError::Mail(_) => json_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            "mail_error",
            "Não foi possível enviar o e-mail.",
        ),
        ServiceError::Credential(CredentialError::InvalidToken(msg)) => {
            json_error(StatusCode::UNAUTHORIZED, "unauthorized", msg.clone())
        }
        ServiceError::Credential(_) => json_error(StatusCode::INTERNAL_SERVER_ERROR, "credential_error", UNEXPECTED),
        ServiceError::Report(err) => report_error_to_response(err),
    }
}

fn report_error_to_response(err: &ReportError) -> ApiError {
    match err {
        ReportError::InvalidWindow(e) => json_error(StatusCode::BAD_REQUEST, "invalid_window", e.detail()),
        ReportError::Authentication(e) => json_error(
            StatusCode::BAD_GATEWAY,
            "upstream_auth",
            format!("Falha na autenticação com a API da Nexti: {e}"),
        ),
        ReportError::PersonListing(e) => {
            let status = match e {
                UpstreamError::Status { status } => {
                    StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY)
                }
                _ => StatusCode::BAD_GATEWAY,
            };
            json_error(status, "upstream_error", format!("Erro na API Nexti: {e}"))
        }
    }
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        let response = service_error_to_response(&err);
        if response.status.is_server_error() {
            tracing::error!(error = %err, code = response.code, "service failed");
        }
        response
    }
}

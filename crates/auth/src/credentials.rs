//! Seams for password hashing and token signing.

use thiserror::Error;

use crate::JwtClaims;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CredentialError {
    #[error("password hashing failed: {0}")]
    Hashing(String),

    #[error("token signing failed: {0}")]
    Signing(String),

    #[error("invalid token: {0}")]
    InvalidToken(String),
}

/// One-way password hashing.
pub trait PasswordHasher: Send + Sync {
    fn hash(&self, password: &str) -> Result<String, CredentialError>;

    fn verify(&self, password: &str, hash: &str) -> bool;
}

/// Signs and verifies access tokens.
pub trait TokenIssuer: Send + Sync {
    fn issue(&self, claims: &JwtClaims) -> Result<String, CredentialError>;

    fn verify(&self, token: &str) -> Result<JwtClaims, CredentialError>;
}

impl<T: PasswordHasher + ?Sized> PasswordHasher for std::sync::Arc<T> {
    fn hash(&self, password: &str) -> Result<String, CredentialError> {
        (**self).hash(password)
    }

    fn verify(&self, password: &str, hash: &str) -> bool {
        (**self).verify(password, hash)
    }
}

impl<T: TokenIssuer + ?Sized> TokenIssuer for std::sync::Arc<T> {
    fn issue(&self, claims: &JwtClaims) -> Result<String, CredentialError> {
        (**self).issue(claims)
    }

    fn verify(&self, token: &str) -> Result<JwtClaims, CredentialError> {
        (**self).verify(token)
    }
}

//! Panel user accounts.
//!
//! Validation of new users and partial updates lives here; persistence and the
//! uniqueness checks that need it live behind `UserStore` in infra.

use core::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use roster_core::{DomainError, DomainResult, Entity, UserId};

use crate::Role;

// ─────────────────────────────────────────────────────────────────────────────
// User Status
// ─────────────────────────────────────────────────────────────────────────────

/// Account status. Only active accounts may log in or recover passwords.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum UserStatus {
    #[default]
    Ativo,
    Inativo,
    Bloqueado,
}

impl UserStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserStatus::Ativo => "ativo",
            UserStatus::Inativo => "inativo",
            UserStatus::Bloqueado => "bloqueado",
        }
    }

    pub fn is_active(&self) -> bool {
        *self == UserStatus::Ativo
    }
}

impl core::fmt::Display for UserStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UserStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "ativo" => Ok(UserStatus::Ativo),
            "inativo" => Ok(UserStatus::Inativo),
            "bloqueado" => Ok(UserStatus::Bloqueado),
            other => Err(DomainError::validation(format!("unknown user status '{other}'"))),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// User
// ─────────────────────────────────────────────────────────────────────────────

/// A panel user.
///
/// # Invariants
/// - `email` is non-empty and contains `@`.
/// - `password_hash` and `recovery_token` never leave the process.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub email: String,
    #[serde(rename = "telefone")]
    pub phone: Option<String>,
    pub role: Role,
    pub status: UserStatus,
    #[serde(skip)]
    pub password_hash: String,
    #[serde(skip)]
    pub recovery_token: Option<String>,
    #[serde(rename = "data_cadastro")]
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn new(id: UserId, username: impl Into<String>, email: impl Into<String>, role: Role) -> Self {
        Self {
            id,
            username: username.into(),
            email: email.into(),
            phone: None,
            role,
            status: UserStatus::Ativo,
            password_hash: String::new(),
            recovery_token: None,
            created_at: Utc::now(),
        }
    }

    pub fn with_status(mut self, status: UserStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_password_hash(mut self, hash: impl Into<String>) -> Self {
        self.password_hash = hash.into();
        self
    }

    /// Apply a validated patch in place.
    pub fn apply(&mut self, patch: &UserPatch) {
        if let Some(username) = &patch.username {
            self.username = username.trim().to_string();
        }
        if let Some(email) = &patch.email {
            self.email = email.trim().to_string();
        }
        if let Some(phone) = &patch.phone {
            self.phone = Some(phone.clone());
        }
        if let Some(role) = &patch.role {
            self.role = role.clone();
        }
        if let Some(status) = patch.status {
            self.status = status;
        }
    }
}

impl Entity for User {
    type Id = UserId;

    fn id(&self) -> Self::Id {
        self.id
    }
}

fn validate_email(email: &str) -> DomainResult<()> {
    if email.trim().is_empty() || !email.contains('@') {
        return Err(DomainError::validation("invalid email format"));
    }
    Ok(())
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

// ─────────────────────────────────────────────────────────────────────────────
// Inputs
// ─────────────────────────────────────────────────────────────────────────────

/// Request to create a user. Username, email and role are required.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct NewUser {
    pub username: Option<String>,
    pub email: Option<String>,
    #[serde(rename = "telefone")]
    pub phone: Option<String>,
    pub role: Option<Role>,
    pub status: Option<UserStatus>,
}

impl NewUser {
    /// The requested role, if one was given.
    pub fn requested_role(&self) -> Option<&Role> {
        self.role.as_ref().filter(|r| !r.as_str().trim().is_empty())
    }

    /// Check required fields.
    pub fn validate(&self) -> DomainResult<()> {
        if present(&self.username).is_none() || present(&self.email).is_none() || self.requested_role().is_none() {
            return Err(DomainError::validation("missing required fields"));
        }
        validate_email(present(&self.email).unwrap_or_default())
    }

    /// Build the account. `password_hash` is the hash of the temporary password.
    pub fn into_user(self, id: UserId, password_hash: String, created_at: DateTime<Utc>) -> DomainResult<User> {
        self.validate()?;
        let role = self
            .requested_role()
            .cloned()
            .ok_or_else(|| DomainError::validation("missing required fields"))?;
        Ok(User {
            id,
            username: present(&self.username).unwrap_or_default().to_string(),
            email: present(&self.email).unwrap_or_default().to_string(),
            phone: self.phone,
            role,
            status: self.status.unwrap_or_default(),
            password_hash,
            recovery_token: None,
            created_at,
        })
    }
}

/// Partial update of a user. Absent fields are left alone.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct UserPatch {
    pub username: Option<String>,
    pub email: Option<String>,
    #[serde(rename = "telefone")]
    pub phone: Option<String>,
    pub role: Option<Role>,
    pub status: Option<UserStatus>,
}

impl UserPatch {
    pub fn is_empty(&self) -> bool {
        self.username.is_none()
            && self.email.is_none()
            && self.phone.is_none()
            && self.role.is_none()
            && self.status.is_none()
    }

    pub fn validate(&self) -> DomainResult<()> {
        if self.is_empty() {
            return Err(DomainError::validation("nothing to update"));
        }
        if let Some(email) = &self.email {
            validate_email(email)?;
        }
        if matches!(&self.username, Some(name) if name.trim().is_empty()) {
            return Err(DomainError::validation("username cannot be empty"));
        }
        Ok(())
    }

    /// `field='value'` pairs for the audit trail.
    pub fn describe(&self) -> String {
        let mut changes = Vec::new();
        if let Some(v) = &self.username {
            changes.push(format!("username='{v}'"));
        }
        if let Some(v) = &self.email {
            changes.push(format!("email='{v}'"));
        }
        if let Some(v) = &self.phone {
            changes.push(format!("telefone='{v}'"));
        }
        if let Some(v) = &self.role {
            changes.push(format!("Perfil de usuário='{v}'"));
        }
        if let Some(v) = &self.status {
            changes.push(format!("status='{v}'"));
        }
        if changes.is_empty() {
            "sem mudanças".to_string()
        } else {
            changes.join(", ")
        }
    }
}

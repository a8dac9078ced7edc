use serde::{Deserialize, Serialize};

use roster_core::UserId;

use crate::Role;

/// The authenticated panel user acting on a request.
///
/// Built from verified token claims; never from client-supplied fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    pub user_id: UserId,
    pub username: String,
    pub role: Role,
}

impl Principal {
    pub fn new(user_id: UserId, username: impl Into<String>, role: Role) -> Self {
        Self {
            user_id,
            username: username.into(),
            role,
        }
    }
}

impl From<&crate::JwtClaims> for Principal {
    fn from(claims: &crate::JwtClaims) -> Self {
        Self {
            user_id: claims.sub,
            username: claims.username.clone(),
            role: claims.role.clone(),
        }
    }
}
